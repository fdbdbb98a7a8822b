//! Service Container - Centralized service access.
//!
//! Handlers reach every use case through one container so that the HTTP
//! layer depends on service traits only.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AppointmentManager, AppointmentService, AuthService, Authenticator, HealthRecordManager,
    HealthRecordService, NotificationManager, NotificationService, PetManager, PetService,
    PlanManager, PlanService, SubscriptionManager, SubscriptionService, UserManager, UserService,
    VaccinationManager, VaccinationService,
};
use crate::config::Config;
use crate::infra::Persistence;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;
    fn users(&self) -> Arc<dyn UserService>;
    fn pets(&self) -> Arc<dyn PetService>;
    fn vaccinations(&self) -> Arc<dyn VaccinationService>;
    fn health_records(&self) -> Arc<dyn HealthRecordService>;
    fn appointments(&self) -> Arc<dyn AppointmentService>;
    fn notifications(&self) -> Arc<dyn NotificationService>;
    fn plans(&self) -> Arc<dyn PlanService>;
    fn subscriptions(&self) -> Arc<dyn SubscriptionService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub pets: Arc<dyn PetService>,
    pub vaccinations: Arc<dyn VaccinationService>,
    pub health_records: Arc<dyn HealthRecordService>,
    pub appointments: Arc<dyn AppointmentService>,
    pub notifications: Arc<dyn NotificationService>,
    pub plans: Arc<dyn PlanService>,
    pub subscriptions: Arc<dyn SubscriptionService>,
}

impl Services {
    /// Wire every service over one pooled unit of work.
    pub fn from_connection(db: DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config)),
            users: Arc::new(UserManager::new(uow.clone())),
            pets: Arc::new(PetManager::new(uow.clone())),
            vaccinations: Arc::new(VaccinationManager::new(uow.clone())),
            health_records: Arc::new(HealthRecordManager::new(uow.clone())),
            appointments: Arc::new(AppointmentManager::new(uow.clone())),
            notifications: Arc::new(NotificationManager::new(uow.clone())),
            plans: Arc::new(PlanManager::new(uow.clone())),
            subscriptions: Arc::new(SubscriptionManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn pets(&self) -> Arc<dyn PetService> {
        self.pets.clone()
    }

    fn vaccinations(&self) -> Arc<dyn VaccinationService> {
        self.vaccinations.clone()
    }

    fn health_records(&self) -> Arc<dyn HealthRecordService> {
        self.health_records.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentService> {
        self.appointments.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notifications.clone()
    }

    fn plans(&self) -> Arc<dyn PlanService> {
        self.plans.clone()
    }

    fn subscriptions(&self) -> Arc<dyn SubscriptionService> {
        self.subscriptions.clone()
    }
}
