//! Authentication service - registration, login and JWT handling.
//!
//! Access and refresh tokens share one signing secret and are told apart
//! by the `kind` claim. Every authenticated request reloads the account so
//! a deactivated user loses access immediately.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, TOKEN_KIND_ACCESS, TOKEN_KIND_REFRESH};
use crate::domain::user::normalize_email;
use crate::domain::{CurrentUser, Password, RegisterUser, User, UserProfile, UserResponse};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    /// `access` or `refresh`
    pub kind: String,
    pub exp: i64,
    pub iat: i64,
}

/// Access/refresh token pair
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub refresh: String,
}

/// Returned by register and login
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthPayload {
    pub user: UserResponse,
    pub tokens: TokenPair,
}

/// Returned by token refresh
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and its profile, then issue tokens
    async fn register(&self, input: RegisterUser) -> AppResult<AuthPayload>;

    /// Check credentials, stamp the login and issue tokens
    async fn login(&self, email: String, password: String) -> AppResult<AuthPayload>;

    /// Exchange a refresh token for a new access token
    async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken>;

    /// Check signature and expiry of any token we issued
    fn verify(&self, token: &str) -> AppResult<Claims>;

    /// Resolve the requester behind an access token
    async fn authenticate(&self, access_token: &str) -> AppResult<CurrentUser>;
}

fn sign(user: &User, kind: &str, lifetime: Duration, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        kind: kind.to_string(),
        exp: (now + lifetime).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;
    Ok(token)
}

fn issue_tokens(user: &User, config: &Config) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access: sign(
            user,
            TOKEN_KIND_ACCESS,
            Duration::minutes(config.jwt_access_expiration_minutes),
            config,
        )?,
        refresh: sign(
            user,
            TOKEN_KIND_REFRESH,
            Duration::days(config.jwt_refresh_expiration_days),
            config,
        )?,
    })
}

fn decode_claims(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    /// Load the active account a token was issued to.
    async fn token_owner(&self, claims: &Claims, kind: &str) -> AppResult<User> {
        if claims.kind != kind {
            return Err(AppError::Unauthorized);
        }
        match self.uow.users().find_by_id(claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::Unauthorized),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterUser) -> AppResult<AuthPayload> {
        let mut errors = FieldErrors::new();

        if input.role.is_some_and(|role| role.is_admin()) {
            errors.add("role", "Cannot register with ADMIN role. Contact administrator.");
        }
        if input.password != input.password_confirm {
            errors.add("password_confirm", "Passwords do not match.");
        }
        for problem in Password::policy_violations(&input.password) {
            errors.add("password", problem);
        }

        let email = normalize_email(&input.email);
        if self.uow.users().find_by_email(&email).await?.is_some() {
            errors.add("email", "A user with this email already exists.");
        }
        errors.into_result()?;

        let password_hash = Password::new(&input.password, "password")?.into_string();
        let mut user = User::new(&email, password_hash, input.first_name, input.last_name);
        user.phone_number = input
            .phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        user.is_veterinarian = input.is_veterinarian;

        let txn = self.uow.begin().await?;
        let user = txn.users().create(user).await?;
        txn.profiles().create(UserProfile::new(user.id)).await?;
        txn.commit().await?;

        tracing::info!(user_id = %user.id, "User registered");

        let tokens = issue_tokens(&user, &self.config)?;
        Ok(AuthPayload {
            user: user.into(),
            tokens,
        })
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthPayload> {
        let email = normalize_email(&email);
        let found = self.uow.users().find_by_email(&email).await?;

        // Verify against a dummy hash for unknown emails so both paths cost the same
        let stored = found
            .as_ref()
            .map(|user| Password::from_hash(user.password_hash.clone()))
            .unwrap_or_else(Password::dummy);
        let password_valid = stored.verify(&password);

        let mut user = match found {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };
        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        user.record_login(Utc::now());
        let txn = self.uow.begin().await?;
        let user = txn.users().update(user).await?;
        txn.commit().await?;
        tracing::info!(user_id = %user.id, "User logged in");

        let tokens = issue_tokens(&user, &self.config)?;
        Ok(AuthPayload {
            user: user.into(),
            tokens,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<AccessToken> {
        let claims = decode_claims(refresh_token, &self.config)?;
        let user = self.token_owner(&claims, TOKEN_KIND_REFRESH).await?;

        let access = sign(
            &user,
            TOKEN_KIND_ACCESS,
            Duration::minutes(self.config.jwt_access_expiration_minutes),
            &self.config,
        )?;
        Ok(AccessToken { access })
    }

    fn verify(&self, token: &str) -> AppResult<Claims> {
        decode_claims(token, &self.config)
    }

    async fn authenticate(&self, access_token: &str) -> AppResult<CurrentUser> {
        let claims = decode_claims(access_token, &self.config)?;
        let user = self.token_owner(&claims, TOKEN_KIND_ACCESS).await?;

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            role: user.role,
            is_veterinarian: user.is_veterinarian,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::services::testing::{user_with_id, Mocks};
    use mockall::predicate::eq;

    fn registration() -> RegisterUser {
        RegisterUser {
            email: "New.Owner@Example.COM".to_string(),
            password: "SecurePass123!".to_string(),
            password_confirm: "SecurePass123!".to_string(),
            first_name: "New".to_string(),
            last_name: "Owner".to_string(),
            phone_number: None,
            role: None,
            is_veterinarian: false,
        }
    }

    fn stored_user(password: &str) -> User {
        let hash = Password::new(password, "password").unwrap().into_string();
        User::new("jane@example.com", hash, "Jane".into(), "Doe".into())
    }

    #[tokio::test]
    async fn test_register_creates_user_and_profile_in_one_transaction() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_email()
            .with(eq("New.Owner@example.com"))
            .returning(|_| Ok(None));
        mocks.users.expect_create().times(1).returning(Ok);
        mocks.profiles.expect_create().times(1).returning(Ok);
        let uow = mocks.into_uow();

        let service = Authenticator::new(uow.clone(), Config::for_tests());
        let payload = service.register(registration()).await.unwrap();

        assert_eq!(payload.user.email, "New.Owner@example.com");
        assert_eq!(payload.user.role, UserRole::User);
        assert!(!payload.tokens.access.is_empty());
        assert_ne!(payload.tokens.access, payload.tokens.refresh);
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_admin_role() {
        let mut mocks = Mocks::default();
        mocks.users.expect_find_by_email().returning(|_| Ok(None));
        let service = Authenticator::new(mocks.into_uow(), Config::for_tests());

        let mut input = registration();
        input.role = Some(UserRole::Admin);
        let err = service.register(input).await.unwrap_err();

        let errors = err.field_errors().unwrap();
        assert_eq!(
            errors.get("role").unwrap()[0],
            "Cannot register with ADMIN role. Contact administrator."
        );
    }

    #[tokio::test]
    async fn test_register_reports_duplicate_email_and_mismatch() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("SecurePass123!"))));
        let service = Authenticator::new(mocks.into_uow(), Config::for_tests());

        let mut input = registration();
        input.password_confirm = "Different123!".to_string();
        let err = service.register(input).await.unwrap_err();

        let errors = err.field_errors().unwrap();
        assert!(errors.get("email").is_some());
        assert!(errors.get("password_confirm").is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("SecurePass123!"))));
        let service = Authenticator::new(mocks.into_uow(), Config::for_tests());

        let result = service
            .login("jane@example.com".into(), "WrongPass999".into())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut mocks = Mocks::default();
        mocks.users.expect_find_by_email().returning(|_| Ok(None));
        let service = Authenticator::new(mocks.into_uow(), Config::for_tests());

        let result = service
            .login("ghost@example.com".into(), "SecurePass123!".into())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_disabled_account() {
        let mut mocks = Mocks::default();
        mocks.users.expect_find_by_email().returning(|_| {
            let mut user = stored_user("SecurePass123!");
            user.deactivate();
            Ok(Some(user))
        });
        let service = Authenticator::new(mocks.into_uow(), Config::for_tests());

        let result = service
            .login("jane@example.com".into(), "SecurePass123!".into())
            .await;
        assert!(matches!(result, Err(AppError::AccountDisabled)));
    }

    #[tokio::test]
    async fn test_login_stamps_last_login() {
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_email()
            .returning(|_| Ok(Some(stored_user("SecurePass123!"))));
        mocks
            .users
            .expect_update()
            .withf(|user| user.last_login.is_some())
            .times(1)
            .returning(Ok);
        let uow = mocks.into_uow();
        let service = Authenticator::new(uow.clone(), Config::for_tests());

        let payload = service
            .login("jane@example.com".into(), "SecurePass123!".into())
            .await
            .unwrap();
        assert!(payload.user.last_login.is_some());
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_access_and_refresh_tokens_are_not_interchangeable() {
        let user_id = Uuid::new_v4();
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(move |id| Ok(Some(user_with_id(id))));
        let service = Authenticator::new(mocks.into_uow(), Config::for_tests());

        let tokens = issue_tokens(&user_with_id(user_id), &Config::for_tests()).unwrap();

        let requester = service.authenticate(&tokens.access).await.unwrap();
        assert_eq!(requester.id, user_id);
        assert!(matches!(
            service.authenticate(&tokens.refresh).await,
            Err(AppError::Unauthorized)
        ));

        let refreshed = service.refresh(&tokens.refresh).await.unwrap();
        assert!(service.authenticate(&refreshed.access).await.is_ok());
        assert!(matches!(
            service.refresh(&tokens.access).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_deactivated_user_token_rejected() {
        let mut mocks = Mocks::default();
        mocks.users.expect_find_by_id().returning(|id| {
            let mut user = user_with_id(id);
            user.deactivate();
            Ok(Some(user))
        });
        let service = Authenticator::new(mocks.into_uow(), Config::for_tests());

        let tokens = issue_tokens(&user_with_id(Uuid::new_v4()), &Config::for_tests()).unwrap();
        assert!(matches!(
            service.authenticate(&tokens.access).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let service = Authenticator::new(Mocks::default().into_uow(), Config::for_tests());
        assert!(matches!(service.verify("not-a-token"), Err(AppError::Jwt(_))));
    }
}
