//! Appointment service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::checks::{attachable_pet, check_veterinarian};
use crate::domain::{Appointment, CreateAppointment, CurrentUser, UpdateAppointment};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

#[async_trait]
pub trait AppointmentService: Send + Sync {
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Appointment>>;

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Appointment>;

    /// Book an appointment. The owner is always the pet's owner.
    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateAppointment,
    ) -> AppResult<Appointment>;

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateAppointment,
    ) -> AppResult<Appointment>;

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()>;
}

pub struct AppointmentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AppointmentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AppointmentService for AppointmentManager<U> {
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Appointment>> {
        self.uow
            .appointments()
            .list(requester.owner_filter(), params)
            .await
    }

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Appointment> {
        let appointment = self
            .uow
            .appointments()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        requester.scope(appointment)
    }

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateAppointment,
    ) -> AppResult<Appointment> {
        let txn = self.uow.begin().await?;
        let pet = attachable_pet(txn.pets(), requester, input.pet_id).await?;
        check_veterinarian(txn.users(), input.veterinarian_id).await?;

        let mut appointment = Appointment::new(pet.owner_id, input);
        appointment.normalize(Utc::now(), true).into_result()?;

        let appointment = txn.appointments().create(appointment).await?;
        txn.commit().await?;

        tracing::info!(
            appointment_id = %appointment.id,
            pet_id = %appointment.pet_id,
            owner_id = %appointment.owner_id,
            "Appointment created"
        );
        Ok(appointment)
    }

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateAppointment,
    ) -> AppResult<Appointment> {
        let txn = self.uow.begin().await?;
        let appointment = txn
            .appointments()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        let mut appointment = requester.scope(appointment)?;

        if let Some(pet_id) = changes.pet_id.filter(|p| *p != appointment.pet_id) {
            let pet = attachable_pet(txn.pets(), requester, pet_id).await?;
            appointment.owner_id = pet.owner_id;
        }
        if let Some(vet) = changes.veterinarian_id {
            check_veterinarian(txn.users(), vet).await?;
        }

        let date_changed = changes
            .appointment_date
            .is_some_and(|date| date != appointment.appointment_date);
        appointment.apply(changes);
        appointment
            .normalize(Utc::now(), date_changed)
            .into_result()?;

        let appointment = txn.appointments().update(appointment).await?;
        txn.commit().await?;

        tracing::info!(appointment_id = %appointment.id, status = %appointment.status, "Appointment updated");
        Ok(appointment)
    }

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()> {
        let txn = self.uow.begin().await?;
        let appointment = txn
            .appointments()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        requester.scope(appointment)?;
        txn.appointments().delete(id).await?;
        txn.commit().await?;

        tracing::info!(appointment_id = %id, "Appointment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentStatus, UserRole};
    use crate::errors::AppError;
    use crate::services::testing::{pet_owned_by, requester, Mocks};
    use chrono::{DateTime, Duration};

    fn input(pet_id: Uuid, at: DateTime<Utc>) -> CreateAppointment {
        CreateAppointment {
            pet_id,
            veterinarian_id: None,
            appointment_date: at,
            reason: "Annual check-up".into(),
            status: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_admin_booking_belongs_to_pet_owner() {
        let admin = requester(UserRole::Admin);
        let pet_owner = Uuid::new_v4();
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(pet_owner))));
        mocks
            .appointments
            .expect_create()
            .withf(move |a| a.owner_id == pet_owner)
            .times(1)
            .returning(Ok);
        let service = AppointmentManager::new(mocks.into_uow());

        let booked = service
            .create(&admin, input(Uuid::new_v4(), Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        assert_eq!(booked.status, AppointmentStatus::Scheduled);
    }

    #[tokio::test]
    async fn test_past_date_rejected_at_creation() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks
            .pets
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pet_owned_by(owner))));
        let service = AppointmentManager::new(mocks.into_uow());

        let err = service
            .create(&user, input(Uuid::new_v4(), Utc::now() - Duration::hours(2)))
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().get("appointment_date").is_some());
    }

    #[tokio::test]
    async fn test_status_change_keeps_past_date() {
        let user = requester(UserRole::User);
        let existing = Appointment::new(user.id, input(Uuid::new_v4(), Utc::now() - Duration::days(1)));
        let mut mocks = Mocks::default();
        mocks
            .appointments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks.appointments.expect_update().returning(Ok);
        let service = AppointmentManager::new(mocks.into_uow());

        let changes = UpdateAppointment {
            status: Some(AppointmentStatus::Completed),
            ..Default::default()
        };
        let updated = service.update(&user, Uuid::new_v4(), changes).await.unwrap();
        assert_eq!(updated.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn test_moving_to_past_date_rejected() {
        let user = requester(UserRole::User);
        let existing = Appointment::new(user.id, input(Uuid::new_v4(), Utc::now() + Duration::days(3)));
        let mut mocks = Mocks::default();
        mocks
            .appointments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        let service = AppointmentManager::new(mocks.into_uow());

        let changes = UpdateAppointment {
            appointment_date: Some(Utc::now() - Duration::days(1)),
            ..Default::default()
        };
        let err = service.update(&user, Uuid::new_v4(), changes).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_foreign_appointment_reads_as_missing() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks.appointments.expect_find_by_id().returning(|_| {
            Ok(Some(Appointment::new(
                Uuid::new_v4(),
                input(Uuid::new_v4(), Utc::now() + Duration::days(1)),
            )))
        });
        let service = AppointmentManager::new(mocks.into_uow());

        let err = service.delete(&user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_commits_in_one_transaction() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let mut mocks = Mocks::default();
        mocks.appointments.expect_find_by_id().returning(move |_| {
            Ok(Some(Appointment::new(
                owner,
                input(Uuid::new_v4(), Utc::now() + Duration::days(1)),
            )))
        });
        mocks
            .appointments
            .expect_delete()
            .times(1)
            .returning(|_| Ok(()));
        let uow = mocks.into_uow();
        let service = AppointmentManager::new(uow.clone());

        service.delete(&user, Uuid::new_v4()).await.unwrap();
        assert_eq!(uow.commits(), 1);
    }
}
