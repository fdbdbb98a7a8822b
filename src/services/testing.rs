//! Mock-backed unit of work for service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CreatePet, CurrentUser, Pet, User, UserRole};
use crate::errors::AppResult;
use crate::infra::repositories::{
    AppointmentRepository, HealthRecordRepository, MockAppointmentRepository,
    MockHealthRecordRepository, MockNotificationRepository, MockPetRepository,
    MockPlanRepository, MockProfileRepository, MockSubscriptionRepository, MockUserRepository,
    MockVaccinationRepository, NotificationRepository, PetRepository, PlanRepository,
    ProfileRepository, SubscriptionRepository, UserRepository, VaccinationRepository,
};
use crate::infra::{TransactionContext, UnitOfWork};

/// Repository mocks, configured before being frozen into a [`TestUnitOfWork`].
#[derive(Default)]
pub struct Mocks {
    pub users: MockUserRepository,
    pub profiles: MockProfileRepository,
    pub pets: MockPetRepository,
    pub vaccinations: MockVaccinationRepository,
    pub health_records: MockHealthRecordRepository,
    pub appointments: MockAppointmentRepository,
    pub notifications: MockNotificationRepository,
    pub plans: MockPlanRepository,
    pub subscriptions: MockSubscriptionRepository,
}

impl Mocks {
    pub fn into_uow(self) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            repos: Repos {
                users: Arc::new(self.users),
                profiles: Arc::new(self.profiles),
                pets: Arc::new(self.pets),
                vaccinations: Arc::new(self.vaccinations),
                health_records: Arc::new(self.health_records),
                appointments: Arc::new(self.appointments),
                notifications: Arc::new(self.notifications),
                plans: Arc::new(self.plans),
                subscriptions: Arc::new(self.subscriptions),
            },
            commits: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[derive(Clone)]
struct Repos {
    users: Arc<MockUserRepository>,
    profiles: Arc<MockProfileRepository>,
    pets: Arc<MockPetRepository>,
    vaccinations: Arc<MockVaccinationRepository>,
    health_records: Arc<MockHealthRecordRepository>,
    appointments: Arc<MockAppointmentRepository>,
    notifications: Arc<MockNotificationRepository>,
    plans: Arc<MockPlanRepository>,
    subscriptions: Arc<MockSubscriptionRepository>,
}

/// Pooled and transactional access both resolve to the same mocks.
pub struct TestUnitOfWork {
    repos: Repos,
    commits: Arc<AtomicUsize>,
}

impl TestUnitOfWork {
    /// Number of transactions committed so far
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.repos.users.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileRepository> {
        self.repos.profiles.clone()
    }

    fn pets(&self) -> Arc<dyn PetRepository> {
        self.repos.pets.clone()
    }

    fn vaccinations(&self) -> Arc<dyn VaccinationRepository> {
        self.repos.vaccinations.clone()
    }

    fn health_records(&self) -> Arc<dyn HealthRecordRepository> {
        self.repos.health_records.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentRepository> {
        self.repos.appointments.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.repos.notifications.clone()
    }

    fn plans(&self) -> Arc<dyn PlanRepository> {
        self.repos.plans.clone()
    }

    fn subscriptions(&self) -> Arc<dyn SubscriptionRepository> {
        self.repos.subscriptions.clone()
    }

    async fn begin(&self) -> AppResult<Box<dyn TransactionContext>> {
        Ok(Box::new(TestTransaction {
            repos: self.repos.clone(),
            commits: self.commits.clone(),
        }))
    }
}

struct TestTransaction {
    repos: Repos,
    commits: Arc<AtomicUsize>,
}

#[async_trait]
impl TransactionContext for TestTransaction {
    fn users(&self) -> &dyn UserRepository {
        &*self.repos.users
    }

    fn profiles(&self) -> &dyn ProfileRepository {
        &*self.repos.profiles
    }

    fn pets(&self) -> &dyn PetRepository {
        &*self.repos.pets
    }

    fn vaccinations(&self) -> &dyn VaccinationRepository {
        &*self.repos.vaccinations
    }

    fn health_records(&self) -> &dyn HealthRecordRepository {
        &*self.repos.health_records
    }

    fn appointments(&self) -> &dyn AppointmentRepository {
        &*self.repos.appointments
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &*self.repos.notifications
    }

    fn plans(&self) -> &dyn PlanRepository {
        &*self.repos.plans
    }

    fn subscriptions(&self) -> &dyn SubscriptionRepository {
        &*self.repos.subscriptions
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn requester(role: UserRole) -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        email: "requester@example.com".to_string(),
        role,
        is_veterinarian: false,
    }
}

pub fn user_with_id(id: Uuid) -> User {
    let mut user = User::new("owner@example.com", "hash".to_string(), "Jane".into(), "Doe".into());
    user.id = id;
    user
}

pub fn veterinarian() -> User {
    let mut vet = User::new("vet@example.com", "hash".to_string(), "Sam".into(), "Vet".into());
    vet.is_veterinarian = true;
    vet
}

pub fn pet_owned_by(owner_id: Uuid) -> Pet {
    Pet::new(
        owner_id,
        CreatePet {
            name: "Rex".into(),
            ..Default::default()
        },
    )
}
