//! Ownership-based authorization.
//!
//! Every tenant-owned record names the user accountable for it. Admins
//! may touch anything; everyone else only what they own. Records that
//! belong to a pet are checked through that pet.

use uuid::Uuid;

use super::user::UserRole;
use crate::errors::{AppError, AppResult};

/// Authenticated requester, resolved by the auth middleware
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub is_veterinarian: bool,
}

/// A record with an accountable owner.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The ownership predicate.
    pub fn can_access(&self, record: &impl Owned) -> bool {
        self.is_admin() || record.owner_id() == self.id
    }

    /// Explicit object check: 403 when the predicate fails.
    pub fn authorize(&self, record: &impl Owned) -> AppResult<()> {
        if self.can_access(record) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.id, owner_id = %record.owner_id(), "Ownership check failed");
            Err(AppError::forbidden())
        }
    }

    /// Scoped lookup: records outside the requester's scope read as missing.
    pub fn scope<T: Owned>(&self, record: T) -> AppResult<T> {
        if self.can_access(&record) {
            Ok(record)
        } else {
            Err(AppError::NotFound)
        }
    }

    /// Owner filter for list queries; admins see every tenant.
    pub fn owner_filter(&self) -> Option<Uuid> {
        if self.is_admin() {
            None
        } else {
            Some(self.id)
        }
    }
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record(Uuid);

    impl Owned for Record {
        fn owner_id(&self) -> Uuid {
            self.0
        }
    }

    fn requester(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role,
            is_veterinarian: false,
        }
    }

    #[test]
    fn test_owner_is_granted() {
        let user = requester(UserRole::User);
        assert!(user.can_access(&Record(user.id)));
        assert!(user.authorize(&Record(user.id)).is_ok());
    }

    #[test]
    fn test_other_tenant_is_denied() {
        let user = requester(UserRole::User);
        let foreign = Record(Uuid::new_v4());
        assert!(matches!(user.authorize(&foreign), Err(AppError::Forbidden(_))));
        assert!(matches!(user.scope(foreign), Err(AppError::NotFound)));
    }

    #[test]
    fn test_admin_is_granted_everything() {
        let admin = requester(UserRole::Admin);
        assert!(admin.can_access(&Record(Uuid::new_v4())));
        assert_eq!(admin.owner_filter(), None);
        assert!(require_admin(&admin).is_ok());
    }

    #[test]
    fn test_owner_filter_for_regular_user() {
        let user = requester(UserRole::User);
        assert_eq!(user.owner_filter(), Some(user.id));
        assert!(require_admin(&user).is_err());
    }
}
