//! Property tests for transcript ordering in the message log.
//!
//! Arbitrary interleavings of appends across several sessions must always
//! read back per session, in append order, with non-decreasing order keys.

use proptest::prelude::*;

use parley::adapters::memory::InMemoryMessageLog;
use parley::domain::conversation::{transcript, NewMessage, Role};
use parley::domain::foundation::SessionId;
use parley::ports::MessageLog;

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::User), Just(Role::Assistant)]
}

/// (session index, role, content) triples.
fn appends_strategy() -> impl Strategy<Value = Vec<(usize, Role, String)>> {
    prop::collection::vec((0usize..4, role_strategy(), "[a-z]{1,12}"), 1..60)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn interleaved_appends_read_back_in_order(appends in appends_strategy()) {
        let rt = runtime();
        let sessions: Vec<SessionId> = (0..4).map(|_| SessionId::new()).collect();

        rt.block_on(async {
            let log = InMemoryMessageLog::new();
            let mut expected: Vec<Vec<String>> = vec![Vec::new(); sessions.len()];

            for (index, role, content) in &appends {
                let message = NewMessage::new(sessions[*index], *role, content.clone()).unwrap();
                log.append(message).await.unwrap();
                expected[*index].push(content.clone());
            }

            for (index, session_id) in sessions.iter().enumerate() {
                let messages = log.list_by_session(session_id).await.unwrap();

                prop_assert!(transcript::is_ordered(&messages));
                prop_assert!(messages.iter().all(|m| m.session_id() == session_id));
                let contents: Vec<String> =
                    messages.iter().map(|m| m.content().to_string()).collect();
                prop_assert_eq!(&contents, &expected[index]);
            }
            Ok(())
        })?;
    }

    #[test]
    fn sequences_are_unique_and_increasing(count in 1usize..40) {
        let rt = runtime();
        let session_id = SessionId::new();

        rt.block_on(async {
            let log = InMemoryMessageLog::new();
            for i in 0..count {
                log.append(NewMessage::user(session_id, format!("m{}", i)).unwrap())
                    .await
                    .unwrap();
            }

            let messages = log.list_by_session(&session_id).await.unwrap();
            prop_assert_eq!(messages.len(), count);
            prop_assert!(messages.windows(2).all(|w| w[0].sequence() < w[1].sequence()));
            Ok(())
        })?;
    }
}
