//! User accounts and profiles.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::access::Owned;
use crate::errors::FieldErrors;
use crate::types::patch;

/// Accepted phone number shape: optional `+`, optional leading 1, 9-15 digits.
pub static PHONE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?1?\d{9,15}$").expect("phone number pattern is valid")
});

pub const PHONE_NUMBER_MESSAGE: &str =
    "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed.";

/// User roles enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

choice_enum!(UserRole { Admin => "ADMIN", User => "USER" });

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// Lower-case the domain part of an email and trim surrounding space.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Record a phone format error when the value does not match.
fn check_phone(errors: &mut FieldErrors, field: &str, phone: Option<&str>) {
    if let Some(phone) = phone {
        if !PHONE_NUMBER_RE.is_match(phone) {
            errors.add(field, PHONE_NUMBER_MESSAGE);
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub is_veterinarian: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user with the default role
    pub fn new(email: &str, password_hash: String, first_name: String, last_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash,
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            phone_number: None,
            role: UserRole::User,
            is_veterinarian: false,
            is_active: true,
            date_joined: now,
            last_login: None,
            updated_at: now,
        }
    }

    /// "First Last", falling back to the email when both are blank.
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Stamp a successful login.
    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
    }

    /// Replace the stored password hash.
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
        self.updated_at = Utc::now();
    }

    /// Disable the account without removing the row.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Apply an update; `role` and `is_active` are only honoured when
    /// `privileged` is set. Returns field errors for invalid values.
    pub fn apply(&mut self, changes: UpdateUser, privileged: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if let Some(first_name) = changes.first_name {
            self.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name.trim().to_string();
        }
        if let Some(phone) = changes.phone_number {
            let phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
            check_phone(&mut errors, "phone_number", phone.as_deref());
            self.phone_number = phone;
        }
        if let Some(is_veterinarian) = changes.is_veterinarian {
            self.is_veterinarian = is_veterinarian;
        }
        if privileged {
            if let Some(role) = changes.role {
                self.role = role;
            }
            if let Some(is_active) = changes.is_active {
                self.is_active = is_active;
            }
        }

        self.updated_at = Utc::now();
        errors
    }
}

impl Owned for User {
    fn owner_id(&self) -> Uuid {
        self.id
    }
}

fn reject_admin_role(role: &UserRole) -> Result<(), ValidationError> {
    if role.is_admin() {
        let mut err = ValidationError::new("admin_role");
        err.message = Some(Cow::Borrowed(
            "Cannot register with ADMIN role. Contact administrator.",
        ));
        return Err(err);
    }
    Ok(())
}

/// Self-service registration payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "owner@example.com")]
    pub email: String,
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    #[schema(example = "SecurePass123!")]
    pub password_confirm: String,
    #[validate(length(min = 1, max = 100, message = "First name is required."))]
    #[schema(example = "Jane")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required."))]
    #[schema(example = "Doe")]
    pub last_name: String,
    #[validate(regex(path = *PHONE_NUMBER_RE, message = "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed."))]
    #[schema(example = "+15551234567")]
    pub phone_number: Option<String>,
    /// Only USER may be requested here
    #[validate(custom(function = "reject_admin_role"))]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub is_veterinarian: bool,
}

/// Account update payload (PUT and PATCH)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    /// `null` clears the stored number
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>, example = "+15551234567")]
    pub phone_number: Option<Option<String>>,
    pub is_veterinarian: Option<bool>,
    /// Admin only
    pub role: Option<UserRole>,
    /// Admin only
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// Whether the payload touches fields reserved for admins.
    pub fn touches_privileged_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

/// Password change payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    #[validate(length(min = 1, message = "Old password is required."))]
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

impl ChangePassword {
    /// Checks that do not need the stored hash.
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.new_password != self.new_password_confirm {
            errors.add("new_password_confirm", "New passwords do not match.");
        }
        if self.new_password == self.old_password {
            errors.add("new_password", "New password must be different from old password.");
        }
        errors
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "owner@example.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    pub is_veterinarian: bool,
    pub is_active: bool,
    pub is_admin: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name(),
            is_admin: user.is_admin(),
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            role: user.role,
            is_veterinarian: user.is_veterinarian,
            is_active: user.is_active,
            date_joined: user.date_joined,
            last_login: user.last_login,
        }
    }
}

/// Extended profile, one per user, created on first access
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            phone: None,
            location: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a profile update, returning field errors for invalid values.
    pub fn apply(&mut self, changes: UpdateProfile) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if let Some(phone) = changes.phone {
            let phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
            check_phone(&mut errors, "phone", phone.as_deref());
            self.phone = phone;
        }
        patch::apply(&mut self.location, changes.location);
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }

        self.updated_at = Utc::now();
        errors
    }
}

impl Owned for UserProfile {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Profile update payload (PUT and PATCH)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>, example = "+15551234567")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>, example = "Lisbon")]
    pub location: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Profile response with the owning account's identity
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub user_email: String,
    pub user_full_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn new(profile: UserProfile, user: &User) -> Self {
        Self {
            user_id: profile.user_id,
            user_email: user.email.clone(),
            user_full_name: user.full_name(),
            phone: profile.phone,
            location: profile.location,
            is_active: profile.is_active,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}
