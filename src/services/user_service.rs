//! User service - accounts, password changes and profiles.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    require_admin, ChangePassword, CurrentUser, Password, ProfileResponse, UpdateProfile,
    UpdateUser, User, UserProfile, UserRole,
};
use crate::domain::user::normalize_email;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::UserRepository;
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

pub const SELF_DELETE_MESSAGE: &str = "You cannot delete your own account.";

/// User service trait for dependency injection.
///
/// Accounts are never removed: deleting one deactivates it.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Every account including inactive ones (admin only)
    async fn list_users(&self, requester: &CurrentUser, params: PaginationParams)
        -> AppResult<Page<User>>;

    /// Self or admin
    async fn get_user(&self, requester: &CurrentUser, id: Uuid) -> AppResult<User>;

    /// Self or admin; role and is_active are admin only
    async fn update_user(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateUser,
    ) -> AppResult<User>;

    async fn change_password(&self, requester: &CurrentUser, input: ChangePassword)
        -> AppResult<()>;

    /// Deactivate another account (admin only); deleting yourself is refused
    async fn delete_user(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()>;

    /// Profile of `user_id`, created on first access
    async fn get_profile(&self, requester: &CurrentUser, user_id: Uuid)
        -> AppResult<ProfileResponse>;

    async fn update_profile(
        &self,
        requester: &CurrentUser,
        user_id: Uuid,
        changes: UpdateProfile,
    ) -> AppResult<ProfileResponse>;

    /// Create an administrator, or promote and re-key an existing account
    async fn create_admin(
        &self,
        email: &str,
        password: &str,
        first_name: String,
        last_name: String,
    ) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

/// Load an account the requester may see; 404 when missing, 403 when foreign.
async fn visible_user(
    users: &dyn UserRepository,
    requester: &CurrentUser,
    id: Uuid,
) -> AppResult<User> {
    let user = users.find_by_id(id).await?.ok_or_not_found()?;
    requester.authorize(&user)?;
    Ok(user)
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn list_users(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<User>> {
        require_admin(requester)?;
        self.uow.users().list(params).await
    }

    async fn get_user(&self, requester: &CurrentUser, id: Uuid) -> AppResult<User> {
        visible_user(self.uow.users().as_ref(), requester, id).await
    }

    async fn update_user(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateUser,
    ) -> AppResult<User> {
        let txn = self.uow.begin().await?;
        let mut user = visible_user(txn.users(), requester, id).await?;
        if changes.touches_privileged_fields() && !requester.is_admin() {
            return Err(AppError::forbidden_with(
                "Only administrators can change role or active status.",
            ));
        }

        user.apply(changes, requester.is_admin()).into_result()?;
        let user = txn.users().update(user).await?;
        txn.commit().await?;

        tracing::info!(user_id = %user.id, updated_by = %requester.id, "User updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        requester: &CurrentUser,
        input: ChangePassword,
    ) -> AppResult<()> {
        let txn = self.uow.begin().await?;
        let mut user = txn
            .users()
            .find_by_id(requester.id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let mut errors = input.check();
        if !Password::from_hash(user.password_hash.clone()).verify(&input.old_password) {
            errors.add("old_password", "Old password is incorrect.");
        }
        for problem in Password::policy_violations(&input.new_password) {
            errors.add("new_password", problem);
        }
        errors.into_result()?;

        let hash = Password::new(&input.new_password, "new_password")?.into_string();
        user.set_password_hash(hash);
        txn.users().update(user).await?;
        txn.commit().await?;

        tracing::info!(user_id = %requester.id, "Password changed");
        Ok(())
    }

    async fn delete_user(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()> {
        if id == requester.id {
            return Err(AppError::bad_request(SELF_DELETE_MESSAGE));
        }
        require_admin(requester)?;

        let txn = self.uow.begin().await?;
        let mut user = txn.users().find_by_id(id).await?.ok_or_not_found()?;
        user.deactivate();
        txn.users().update(user).await?;
        txn.commit().await?;

        tracing::info!(user_id = %id, deactivated_by = %requester.id, "User deactivated");
        Ok(())
    }

    async fn get_profile(
        &self,
        requester: &CurrentUser,
        user_id: Uuid,
    ) -> AppResult<ProfileResponse> {
        let user = visible_user(self.uow.users().as_ref(), requester, user_id).await?;
        let profile = match self.uow.profiles().find_by_user(user_id).await? {
            Some(profile) => profile,
            None => self.uow.profiles().create(UserProfile::new(user_id)).await?,
        };
        Ok(ProfileResponse::new(profile, &user))
    }

    async fn update_profile(
        &self,
        requester: &CurrentUser,
        user_id: Uuid,
        changes: UpdateProfile,
    ) -> AppResult<ProfileResponse> {
        let user = visible_user(self.uow.users().as_ref(), requester, user_id).await?;

        let txn = self.uow.begin().await?;
        let existing = txn.profiles().find_by_user(user_id).await?;
        let is_new = existing.is_none();
        let mut profile = existing.unwrap_or_else(|| UserProfile::new(user_id));

        profile.apply(changes).into_result()?;
        let profile = if is_new {
            txn.profiles().create(profile).await?
        } else {
            txn.profiles().update(profile).await?
        };
        txn.commit().await?;

        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(ProfileResponse::new(profile, &user))
    }

    async fn create_admin(
        &self,
        email: &str,
        password: &str,
        first_name: String,
        last_name: String,
    ) -> AppResult<User> {
        let email = normalize_email(email);
        let hash = Password::new(password, "password")?.into_string();

        let txn = self.uow.begin().await?;
        let admin = match txn.users().find_by_email(&email).await? {
            Some(mut user) => {
                user.role = UserRole::Admin;
                user.is_active = true;
                user.set_password_hash(hash);
                txn.users().update(user).await?
            }
            None => {
                let mut user = User::new(&email, hash, first_name, last_name);
                user.role = UserRole::Admin;
                let user = txn.users().create(user).await?;
                txn.profiles().create(UserProfile::new(user.id)).await?;
                user
            }
        };
        txn.commit().await?;

        tracing::info!(user_id = %admin.id, "Administrator ensured");
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{requester, user_with_id, Mocks};

    #[tokio::test]
    async fn test_self_delete_is_rejected_even_for_admin() {
        let admin = requester(UserRole::Admin);
        let service = UserManager::new(Mocks::default().into_uow());

        let err = service.delete_user(&admin, admin.id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == SELF_DELETE_MESSAGE));
    }

    #[tokio::test]
    async fn test_admin_delete_deactivates_instead_of_removing() {
        let admin = requester(UserRole::Admin);
        let target = Uuid::new_v4();

        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_with_id(id))));
        mocks
            .users
            .expect_update()
            .withf(move |user| user.id == target && !user.is_active)
            .times(1)
            .returning(Ok);
        let uow = mocks.into_uow();
        let service = UserManager::new(uow.clone());

        service.delete_user(&admin, target).await.unwrap();
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_regular_user_cannot_delete_others() {
        let user = requester(UserRole::User);
        let service = UserManager::new(Mocks::default().into_uow());

        let err = service.delete_user(&user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_other_user_is_forbidden() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_with_id(id))));
        let service = UserManager::new(mocks.into_uow());

        let err = service.get_user(&user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_promote_self() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_with_id(id))));
        let service = UserManager::new(mocks.into_uow());

        let changes = UpdateUser {
            role: Some(UserRole::Admin),
            ..Default::default()
        };
        let err = service.update_user(&user, user.id, changes).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_change_password_requires_correct_old_password() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks.users.expect_find_by_id().returning(|id| {
            let mut stored = user_with_id(id);
            stored.password_hash = Password::new("OldSecret123", "password").unwrap().into_string();
            Ok(Some(stored))
        });
        let service = UserManager::new(mocks.into_uow());

        let err = service
            .change_password(
                &user,
                ChangePassword {
                    old_password: "NotTheOldOne1".into(),
                    new_password: "NewSecret456".into(),
                    new_password_confirm: "NewSecret456".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().get("old_password").unwrap()[0],
            "Old password is incorrect."
        );
    }

    #[tokio::test]
    async fn test_profile_is_created_lazily() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_with_id(id))));
        mocks.profiles.expect_find_by_user().returning(|_| Ok(None));
        mocks.profiles.expect_create().times(1).returning(Ok);
        let service = UserManager::new(mocks.into_uow());

        let profile = service.get_profile(&user, user.id).await.unwrap();
        assert_eq!(profile.user_id, user.id);
        assert!(profile.is_active);
    }

    #[tokio::test]
    async fn test_profile_of_missing_user_is_not_found() {
        let admin = requester(UserRole::Admin);
        let mut mocks = Mocks::default();
        mocks.users.expect_find_by_id().returning(|_| Ok(None));
        let service = UserManager::new(mocks.into_uow());

        let err = service.get_profile(&admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
