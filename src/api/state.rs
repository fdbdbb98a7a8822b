//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{
    AppointmentService, AuthService, HealthRecordService, NotificationService, PetService,
    PlanService, ServiceContainer, Services, SubscriptionService, UserService,
    VaccinationService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub pet_service: Arc<dyn PetService>,
    pub vaccination_service: Arc<dyn VaccinationService>,
    pub health_record_service: Arc<dyn HealthRecordService>,
    pub appointment_service: Arc<dyn AppointmentService>,
    pub notification_service: Arc<dyn NotificationService>,
    pub plan_service: Arc<dyn PlanService>,
    pub subscription_service: Arc<dyn SubscriptionService>,
    /// Redis cache; `None` disables rate limiting and reports Redis as disabled
    pub cache: Option<Arc<Cache>>,
    /// `None` reports the database as disabled on `/health`
    pub database: Option<Arc<Database>>,
    pub rate_limit_enabled: bool,
    /// Empty allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl AppState {
    /// State over the given services with no infrastructure attached.
    pub fn new(services: &dyn ServiceContainer) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            pet_service: services.pets(),
            vaccination_service: services.vaccinations(),
            health_record_service: services.health_records(),
            appointment_service: services.appointments(),
            notification_service: services.notifications(),
            plan_service: services.plans(),
            subscription_service: services.subscriptions(),
            cache: None,
            database: None,
            rate_limit_enabled: false,
            cors_allowed_origins: Vec::new(),
        }
    }

    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, cache: Option<Arc<Cache>>, config: Config) -> Self {
        let rate_limit_enabled = config.rate_limit_enabled;
        let cors_allowed_origins = config.cors_allowed_origins.clone();
        let services = Services::from_connection(database.get_connection(), config);

        Self {
            cache,
            database: Some(database),
            rate_limit_enabled,
            cors_allowed_origins,
            ..Self::new(&services)
        }
    }
}
