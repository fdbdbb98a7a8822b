//! Veterinary appointments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::access::Owned;
use crate::errors::FieldErrors;
use crate::types::patch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

choice_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Confirmed => "confirmed",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

/// Appointment domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub pet_id: Uuid,
    /// Always the pet's owner
    pub owner_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub appointment_date: DateTime<Utc>,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(owner_id: Uuid, input: CreateAppointment) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            pet_id: input.pet_id,
            owner_id,
            veterinarian_id: input.veterinarian_id,
            appointment_date: input.appointment_date,
            reason: input.reason,
            status: input.status.unwrap_or_default(),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update. Pet and owner changes are resolved by the caller.
    pub fn apply(&mut self, changes: UpdateAppointment) {
        if let Some(pet_id) = changes.pet_id {
            self.pet_id = pet_id;
        }
        patch::apply(&mut self.veterinarian_id, changes.veterinarian_id);
        if let Some(date) = changes.appointment_date {
            self.appointment_date = date;
        }
        if let Some(reason) = changes.reason {
            self.reason = reason;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        patch::apply(&mut self.notes, changes.notes);
        self.updated_at = Utc::now();
    }

    /// Field checks. The date must lie after `now` when `date_changed`
    /// is set, which is always the case for a new appointment.
    pub fn normalize(&mut self, now: DateTime<Utc>, date_changed: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();

        self.reason = self.reason.trim().to_string();
        if self.reason.is_empty() {
            errors.add("reason", "Reason cannot be empty.");
        }
        self.notes = self
            .notes
            .take()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if date_changed && self.appointment_date <= now {
            errors.add("appointment_date", "Appointment date must be in the future.");
        }

        errors
    }
}

impl Owned for Appointment {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Appointment creation payload, also used for full replacement (PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAppointment {
    pub pet_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub appointment_date: DateTime<Utc>,
    #[schema(example = "Annual check-up")]
    pub reason: String,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

/// Partial appointment update payload (PATCH)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointment {
    pub pet_id: Option<Uuid>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub veterinarian_id: Option<Option<Uuid>>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl From<CreateAppointment> for UpdateAppointment {
    fn from(input: CreateAppointment) -> Self {
        Self {
            pet_id: Some(input.pet_id),
            veterinarian_id: Some(input.veterinarian_id),
            appointment_date: Some(input.appointment_date),
            reason: Some(input.reason),
            status: Some(input.status.unwrap_or_default()),
            notes: Some(input.notes),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub owner_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub appointment_date: DateTime<Utc>,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            pet_id: a.pet_id,
            owner_id: a.owner_id,
            veterinarian_id: a.veterinarian_id,
            appointment_date: a.appointment_date,
            reason: a.reason,
            status: a.status,
            notes: a.notes,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
