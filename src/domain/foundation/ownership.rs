//! Ownership trait for user-owned resources.
//!
//! The comparison is always `owner_id() == requester`: the stored owner on
//! the left, the identity making the request on the right.

use super::{DomainError, ErrorCode, UserId};

/// Trait for aggregates that have a single, immutable owner.
pub trait OwnedByUser {
    /// Returns the ID of the user who owns this resource.
    fn owner_id(&self) -> &UserId;

    /// Checks if the given user is the owner.
    fn is_owner(&self, requester: &UserId) -> bool {
        self.owner_id() == requester
    }

    /// Validates ownership, returning `Forbidden` if the requester is not the owner.
    fn check_ownership(&self, requester: &UserId) -> Result<(), DomainError> {
        if self.is_owner(requester) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User does not own this resource",
            )
            .with_detail("owner_id", self.owner_id().to_string())
            .with_detail("requested_by", requester.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owned(UserId);

    impl OwnedByUser for Owned {
        fn owner_id(&self) -> &UserId {
            &self.0
        }
    }

    #[test]
    fn owner_passes_check() {
        let resource = Owned(UserId::new(7));
        assert!(resource.is_owner(&UserId::new(7)));
        assert!(resource.check_ownership(&UserId::new(7)).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden_with_details() {
        let resource = Owned(UserId::new(7));
        let err = resource.check_ownership(&UserId::new(9)).unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.details.get("owner_id"), Some(&"7".to_string()));
        assert_eq!(err.details.get("requested_by"), Some(&"9".to_string()));
    }
}
