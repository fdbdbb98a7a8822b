//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and transaction management:
//! - pooled repositories for reads and single-statement writes
//! - `begin()` opens a transaction whose repositories share one connection
//! - an uncommitted transaction rolls back when dropped

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};

use super::repositories::{
    AppointmentRepository, AppointmentStore, HealthRecordRepository, HealthRecordStore,
    NotificationRepository, NotificationStore, PetRepository, PetStore, PlanRepository, PlanStore,
    ProfileRepository, ProfileStore, SubscriptionRepository, SubscriptionStore, UserRepository,
    UserStore, VaccinationRepository, VaccinationStore,
};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn profiles(&self) -> Arc<dyn ProfileRepository>;
    fn pets(&self) -> Arc<dyn PetRepository>;
    fn vaccinations(&self) -> Arc<dyn VaccinationRepository>;
    fn health_records(&self) -> Arc<dyn HealthRecordRepository>;
    fn appointments(&self) -> Arc<dyn AppointmentRepository>;
    fn notifications(&self) -> Arc<dyn NotificationRepository>;
    fn plans(&self) -> Arc<dyn PlanRepository>;
    fn subscriptions(&self) -> Arc<dyn SubscriptionRepository>;

    /// Begin a read-committed, read-write transaction.
    async fn begin(&self) -> AppResult<Box<dyn TransactionContext>>;
}

/// Repository access within one open transaction.
///
/// Every repository handed out here runs on the same transaction.
/// Dropping the context without calling [`commit`](Self::commit)
/// rolls the transaction back.
#[async_trait]
pub trait TransactionContext: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn profiles(&self) -> &dyn ProfileRepository;
    fn pets(&self) -> &dyn PetRepository;
    fn vaccinations(&self) -> &dyn VaccinationRepository;
    fn health_records(&self) -> &dyn HealthRecordRepository;
    fn appointments(&self) -> &dyn AppointmentRepository;
    fn notifications(&self) -> &dyn NotificationRepository;
    fn plans(&self) -> &dyn PlanRepository;
    fn subscriptions(&self) -> &dyn SubscriptionRepository;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Repositories bound to one kind of connection.
struct Stores<C> {
    users: UserStore<C>,
    profiles: ProfileStore<C>,
    pets: PetStore<C>,
    vaccinations: VaccinationStore<C>,
    health_records: HealthRecordStore<C>,
    appointments: AppointmentStore<C>,
    notifications: NotificationStore<C>,
    plans: PlanStore<C>,
    subscriptions: SubscriptionStore<C>,
}

impl<C> Stores<C> {
    fn new(conn: &Arc<C>) -> Self {
        Self {
            users: UserStore::new(conn.clone()),
            profiles: ProfileStore::new(conn.clone()),
            pets: PetStore::new(conn.clone()),
            vaccinations: VaccinationStore::new(conn.clone()),
            health_records: HealthRecordStore::new(conn.clone()),
            appointments: AppointmentStore::new(conn.clone()),
            notifications: NotificationStore::new(conn.clone()),
            plans: PlanStore::new(conn.clone()),
            subscriptions: SubscriptionStore::new(conn.clone()),
        }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    users: Arc<UserStore<DatabaseConnection>>,
    profiles: Arc<ProfileStore<DatabaseConnection>>,
    pets: Arc<PetStore<DatabaseConnection>>,
    vaccinations: Arc<VaccinationStore<DatabaseConnection>>,
    health_records: Arc<HealthRecordStore<DatabaseConnection>>,
    appointments: Arc<AppointmentStore<DatabaseConnection>>,
    notifications: Arc<NotificationStore<DatabaseConnection>>,
    plans: Arc<PlanStore<DatabaseConnection>>,
    subscriptions: Arc<SubscriptionStore<DatabaseConnection>>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let stores = Stores::new(&Arc::new(db.clone()));
        Self {
            db,
            users: Arc::new(stores.users),
            profiles: Arc::new(stores.profiles),
            pets: Arc::new(stores.pets),
            vaccinations: Arc::new(stores.vaccinations),
            health_records: Arc::new(stores.health_records),
            appointments: Arc::new(stores.appointments),
            notifications: Arc::new(stores.notifications),
            plans: Arc::new(stores.plans),
            subscriptions: Arc::new(stores.subscriptions),
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileRepository> {
        self.profiles.clone()
    }

    fn pets(&self) -> Arc<dyn PetRepository> {
        self.pets.clone()
    }

    fn vaccinations(&self) -> Arc<dyn VaccinationRepository> {
        self.vaccinations.clone()
    }

    fn health_records(&self) -> Arc<dyn HealthRecordRepository> {
        self.health_records.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentRepository> {
        self.appointments.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.notifications.clone()
    }

    fn plans(&self) -> Arc<dyn PlanRepository> {
        self.plans.clone()
    }

    fn subscriptions(&self) -> Arc<dyn SubscriptionRepository> {
        self.subscriptions.clone()
    }

    async fn begin(&self) -> AppResult<Box<dyn TransactionContext>> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let txn = Arc::new(txn);
        let stores = Stores::new(&txn);
        Ok(Box::new(DbTransaction { txn, stores }))
    }
}

/// Open database transaction and the repositories bound to it
struct DbTransaction {
    txn: Arc<DatabaseTransaction>,
    stores: Stores<DatabaseTransaction>,
}

#[async_trait]
impl TransactionContext for DbTransaction {
    fn users(&self) -> &dyn UserRepository {
        &self.stores.users
    }

    fn profiles(&self) -> &dyn ProfileRepository {
        &self.stores.profiles
    }

    fn pets(&self) -> &dyn PetRepository {
        &self.stores.pets
    }

    fn vaccinations(&self) -> &dyn VaccinationRepository {
        &self.stores.vaccinations
    }

    fn health_records(&self) -> &dyn HealthRecordRepository {
        &self.stores.health_records
    }

    fn appointments(&self) -> &dyn AppointmentRepository {
        &self.stores.appointments
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.stores.notifications
    }

    fn plans(&self) -> &dyn PlanRepository {
        &self.stores.plans
    }

    fn subscriptions(&self) -> &dyn SubscriptionRepository {
        &self.stores.subscriptions
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let DbTransaction { txn, stores } = *self;
        // The stores hold the remaining handles on the transaction
        drop(stores);

        let txn = Arc::try_unwrap(txn)
            .map_err(|_| AppError::internal("Transaction still in use at commit"))?;
        txn.commit().await.map_err(AppError::from)
    }
}
