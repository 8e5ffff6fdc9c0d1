//! Read-only checks over an ordered transcript.

use super::{Message, Role};

/// Returns true if messages are in non-decreasing `(created_at, sequence)` order.
pub fn is_ordered(messages: &[Message]) -> bool {
    messages
        .windows(2)
        .all(|pair| pair[0].order_key() <= pair[1].order_key())
}

/// Returns the trailing user message that has no assistant reply yet.
///
/// An orphan is a valid intermediate state left behind when generation fails
/// after the user's text was stored.
pub fn pending_user_message(messages: &[Message]) -> Option<&Message> {
    messages.last().filter(|m| m.is_user())
}

/// Returns true if roles strictly alternate starting with `user`.
///
/// A trailing orphan user message still counts as alternating.
pub fn alternates(messages: &[Message]) -> bool {
    messages.iter().enumerate().all(|(i, m)| {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        m.role() == expected
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::NewMessage;
    use crate::domain::foundation::{MessageId, SessionId, Timestamp};

    fn transcript(roles: &[Role]) -> Vec<Message> {
        let session_id = SessionId::new();
        let start = Timestamp::now();
        roles
            .iter()
            .enumerate()
            .map(|(i, role)| {
                NewMessage::new(session_id, *role, format!("m{}", i))
                    .unwrap()
                    .into_message(MessageId::new(), start.plus_millis(i as i64), i as i64 + 1)
            })
            .collect()
    }

    #[test]
    fn empty_transcript_is_ordered_and_has_no_pending() {
        assert!(is_ordered(&[]));
        assert!(alternates(&[]));
        assert!(pending_user_message(&[]).is_none());
    }

    #[test]
    fn trailing_user_message_is_pending() {
        let messages = transcript(&[Role::User, Role::Assistant, Role::User]);
        let pending = pending_user_message(&messages).unwrap();
        assert_eq!(pending.content(), "m2");
        assert!(alternates(&messages));
    }

    #[test]
    fn answered_transcript_has_no_pending() {
        let messages = transcript(&[Role::User, Role::Assistant]);
        assert!(pending_user_message(&messages).is_none());
    }

    #[test]
    fn back_to_back_user_messages_do_not_alternate() {
        let messages = transcript(&[Role::User, Role::User, Role::Assistant]);
        assert!(!alternates(&messages));
    }

    #[test]
    fn reversed_transcript_is_not_ordered() {
        let mut messages = transcript(&[Role::User, Role::Assistant, Role::User]);
        assert!(is_ordered(&messages));
        messages.reverse();
        assert!(!is_ordered(&messages));
    }
}
