//! Repository layer - Data access abstraction
//!
//! Every store is generic over the connection, so the same code runs
//! against the pool or inside an open transaction.

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};

use crate::errors::AppResult;
use crate::types::{Page, PaginationParams};

pub(crate) mod entities;
mod appointment_repository;
mod health_record_repository;
mod notification_repository;
mod pet_repository;
mod profile_repository;
mod subscription_repository;
mod user_repository;
mod vaccination_repository;

pub use appointment_repository::{AppointmentRepository, AppointmentStore};
pub use health_record_repository::{HealthRecordRepository, HealthRecordStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use pet_repository::{PetRepository, PetStore};
pub use profile_repository::{ProfileRepository, ProfileStore};
pub use subscription_repository::{PlanRepository, PlanStore, SubscriptionRepository, SubscriptionStore};
pub use user_repository::{UserRepository, UserStore};
pub use vaccination_repository::{VaccinationFilter, VaccinationRepository, VaccinationStore};

#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
#[cfg(test)]
pub use health_record_repository::MockHealthRecordRepository;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
#[cfg(test)]
pub use pet_repository::MockPetRepository;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
#[cfg(test)]
pub use subscription_repository::{MockPlanRepository, MockSubscriptionRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use vaccination_repository::MockVaccinationRepository;

/// Run a select through the paginator and return the page plus total.
async fn fetch_page<E, C>(
    select: Select<E>,
    conn: &C,
    params: PaginationParams,
) -> AppResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let paginator = select.paginate(conn, params.limit());
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(params.page_index()).await?;
    Ok(Page::new(items, total))
}
