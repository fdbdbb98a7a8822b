//! Domain layer - Core business entities and logic
//!
//! Entities, request/response shapes, status derivation and the ownership
//! predicate. Nothing in here touches the database or HTTP.

/// Implements `as_str`, `Display` and `FromStr` for a closed set of
/// string choices stored as text columns.
macro_rules! choice_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("\"{}\" is not a valid choice.", other)),
                }
            }
        }
    };
}

pub mod access;
pub mod appointment;
pub mod health;
pub mod notification;
pub mod password;
pub mod pet;
pub mod subscription;
pub mod user;

pub use access::{require_admin, CurrentUser, Owned};
pub use appointment::{Appointment, AppointmentResponse, AppointmentStatus, CreateAppointment, UpdateAppointment};
pub use health::{
    CreateHealthRecord, CreateVaccination, HealthRecord, HealthRecordResponse, UpdateHealthRecord,
    UpdateVaccination, Vaccination, VaccinationResponse, VaccinationStatus,
};
pub use notification::{
    CreateNotification, Notification, NotificationResponse, NotificationType, UpdateNotification,
};
pub use password::Password;
pub use pet::{CreatePet, Gender, Pet, PetResponse, PetType, UpdatePet};
pub use subscription::{
    CreatePlan, CreateSubscription, PlanResponse, PlanType, SubscriptionPlan, SubscriptionResponse,
    SubscriptionStatus, UpdatePlan, UpdateSubscription, UserSubscription,
};
pub use user::{
    ChangePassword, ProfileResponse, RegisterUser, UpdateProfile, UpdateUser, User, UserProfile,
    UserResponse, UserRole,
};
