//! In-app notifications addressed to a single user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::access::Owned;
use crate::errors::FieldErrors;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    AppointmentReminder,
    VaccinationDue,
    MedicationReminder,
    HealthUpdate,
    System,
    #[default]
    Other,
}

choice_enum!(NotificationType {
    AppointmentReminder => "appointment_reminder",
    VaccinationDue => "vaccination_due",
    MedicationReminder => "medication_reminder",
    HealthUpdate => "health_update",
    System => "system",
    Other => "other",
});

/// Notification domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(input: CreateNotification) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            notification_type: input.notification_type.unwrap_or_default(),
            title: input.title,
            message: input.message,
            is_read: input.is_read,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateNotification) {
        if let Some(user_id) = changes.user_id {
            self.user_id = user_id;
        }
        if let Some(kind) = changes.notification_type {
            self.notification_type = kind;
        }
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(message) = changes.message {
            self.message = message;
        }
        if let Some(is_read) = changes.is_read {
            self.is_read = is_read;
        }
        self.updated_at = Utc::now();
    }

    pub fn normalize(&mut self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            errors.add("title", "This field may not be blank.");
        } else if self.title.chars().count() > 200 {
            errors.add("title", "Ensure this field has no more than 200 characters.");
        }
        if self.message.trim().is_empty() {
            errors.add("message", "This field may not be blank.");
        }
        errors
    }

    /// Returns whether the flag changed.
    pub fn mark_read(&mut self) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.updated_at = Utc::now();
        true
    }
}

impl Owned for Notification {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// Notification creation payload, also used for full replacement (PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNotification {
    /// Recipient
    pub user_id: Uuid,
    pub notification_type: Option<NotificationType>,
    #[schema(example = "Vaccination due")]
    pub title: String,
    #[schema(example = "Rex is due for the rabies booster next week.")]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
}

/// Partial notification update payload (PATCH)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateNotification {
    pub user_id: Option<Uuid>,
    pub notification_type: Option<NotificationType>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_read: Option<bool>,
}

impl From<CreateNotification> for UpdateNotification {
    fn from(input: CreateNotification) -> Self {
        Self {
            user_id: Some(input.user_id),
            notification_type: Some(input.notification_type.unwrap_or_default()),
            title: Some(input.title),
            message: Some(input.message),
            is_read: Some(input.is_read),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            notification_type: n.notification_type,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}
