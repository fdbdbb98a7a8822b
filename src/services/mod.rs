//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! Authorization happens here: every operation takes the requesting
//! [`CurrentUser`](crate::domain::CurrentUser) and applies the ownership
//! rules before touching storage. Writes that read before they write run
//! inside one Unit of Work transaction.

mod appointment_service;
mod auth_service;
mod checks;
pub mod container;
mod health_record_service;
pub mod maintenance;
mod notification_service;
mod pet_service;
mod subscription_service;
mod user_service;
mod vaccination_service;

#[cfg(test)]
mod testing;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use appointment_service::{AppointmentManager, AppointmentService};
pub use auth_service::{AccessToken, AuthPayload, AuthService, Authenticator, Claims, TokenPair};
pub use health_record_service::{HealthRecordManager, HealthRecordService};
pub use notification_service::{NotificationManager, NotificationService};
pub use pet_service::{PetManager, PetService};
pub use subscription_service::{
    PlanManager, PlanService, SubscriptionManager, SubscriptionService, PLAN_IN_USE_MESSAGE,
    PLAN_NAME_TAKEN_MESSAGE, PLAN_TYPE_TAKEN_MESSAGE,
};
pub use user_service::{UserManager, UserService, SELF_DELETE_MESSAGE};
pub use vaccination_service::{VaccinationManager, VaccinationService};
