//! Vaccination schedules and health records.
//!
//! Both belong to a pet; ownership is always resolved through that pet.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::FieldErrors;
use crate::types::patch;

/// Heaviest weight accepted on a health record, in kilograms
const MAX_RECORD_WEIGHT_KG: f64 = 500.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VaccinationStatus {
    #[default]
    Pending,
    Completed,
    Overdue,
    Scheduled,
}

choice_enum!(VaccinationStatus {
    Pending => "pending",
    Completed => "completed",
    Overdue => "overdue",
    Scheduled => "scheduled",
});

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Vaccination domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct Vaccination {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub vaccine_name: String,
    pub due_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub status: VaccinationStatus,
    pub veterinarian_id: Option<Uuid>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vaccination {
    pub fn new(input: CreateVaccination) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            pet_id: input.pet_id,
            vaccine_name: input.vaccine_name,
            due_date: input.due_date,
            administered_date: input.administered_date,
            status: input.status.unwrap_or_default(),
            veterinarian_id: input.veterinarian_id,
            batch_number: input.batch_number,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update. A changed `pet_id` must be re-authorized by the caller.
    pub fn apply(&mut self, changes: UpdateVaccination) {
        if let Some(pet_id) = changes.pet_id {
            self.pet_id = pet_id;
        }
        if let Some(vaccine_name) = changes.vaccine_name {
            self.vaccine_name = vaccine_name;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        patch::apply(&mut self.administered_date, changes.administered_date);
        if let Some(status) = changes.status {
            self.status = status;
        }
        patch::apply(&mut self.veterinarian_id, changes.veterinarian_id);
        patch::apply(&mut self.batch_number, changes.batch_number);
        patch::apply(&mut self.notes, changes.notes);
        self.updated_at = Utc::now();
    }

    /// Validate the merged record, then derive its status for `today`.
    pub fn normalize(&mut self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();

        self.vaccine_name = self.vaccine_name.trim().to_string();
        if self.vaccine_name.is_empty() {
            errors.add("vaccine_name", "Vaccine name cannot be empty.");
        } else if self.vaccine_name.chars().count() > 200 {
            errors.add("vaccine_name", "Ensure this field has no more than 200 characters.");
        }
        self.batch_number = clean(self.batch_number.take());
        if self.batch_number.as_ref().is_some_and(|b| b.chars().count() > 100) {
            errors.add("batch_number", "Ensure this field has no more than 100 characters.");
        }
        self.notes = clean(self.notes.take());

        match self.administered_date {
            Some(given) if given > today => {
                errors.add("administered_date", "Administered date cannot be in the future.");
            }
            Some(given) if given < self.due_date => {
                errors.add("administered_date", "Administered date cannot be before due date.");
            }
            Some(_) => {}
            None if self.status == VaccinationStatus::Completed => {
                errors.add(
                    "administered_date",
                    "Administered date is required for completed vaccinations.",
                );
            }
            None => {}
        }

        if errors.is_empty() {
            self.derive_status(today);
        }
        errors
    }

    /// Status rules applied on every save.
    pub fn derive_status(&mut self, today: NaiveDate) {
        if self.administered_date.is_some() {
            self.status = VaccinationStatus::Completed;
        } else if self.due_date < today {
            if self.status != VaccinationStatus::Completed {
                self.status = VaccinationStatus::Overdue;
            }
        } else if self.status == VaccinationStatus::Overdue {
            self.status = VaccinationStatus::Pending;
        }
    }
}

/// Vaccination creation payload, also used for full replacement (PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVaccination {
    pub pet_id: Uuid,
    #[schema(example = "Rabies")]
    pub vaccine_name: String,
    pub due_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub status: Option<VaccinationStatus>,
    pub veterinarian_id: Option<Uuid>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
}

/// Partial vaccination update payload (PATCH)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVaccination {
    pub pet_id: Option<Uuid>,
    pub vaccine_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<NaiveDate>)]
    pub administered_date: Option<Option<NaiveDate>>,
    pub status: Option<VaccinationStatus>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub veterinarian_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub batch_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl From<CreateVaccination> for UpdateVaccination {
    fn from(input: CreateVaccination) -> Self {
        Self {
            pet_id: Some(input.pet_id),
            vaccine_name: Some(input.vaccine_name),
            due_date: Some(input.due_date),
            administered_date: Some(input.administered_date),
            status: Some(input.status.unwrap_or_default()),
            veterinarian_id: Some(input.veterinarian_id),
            batch_number: Some(input.batch_number),
            notes: Some(input.notes),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VaccinationResponse {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub vaccine_name: String,
    pub due_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub status: VaccinationStatus,
    pub veterinarian_id: Option<Uuid>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vaccination> for VaccinationResponse {
    fn from(v: Vaccination) -> Self {
        Self {
            id: v.id,
            pet_id: v.pet_id,
            vaccine_name: v.vaccine_name,
            due_date: v.due_date,
            administered_date: v.administered_date,
            status: v.status,
            veterinarian_id: v.veterinarian_id,
            batch_number: v.batch_number,
            notes: v.notes,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

/// Health record domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecord {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    /// Kilograms
    pub weight: f64,
    pub record_date: NaiveDate,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Beats per minute
    pub heart_rate: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthRecord {
    pub fn new(input: CreateHealthRecord) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            pet_id: input.pet_id,
            veterinarian_id: input.veterinarian_id,
            weight: input.weight,
            record_date: input.record_date,
            temperature: input.temperature,
            heart_rate: input.heart_rate,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateHealthRecord) {
        if let Some(pet_id) = changes.pet_id {
            self.pet_id = pet_id;
        }
        patch::apply(&mut self.veterinarian_id, changes.veterinarian_id);
        if let Some(weight) = changes.weight {
            self.weight = weight;
        }
        if let Some(record_date) = changes.record_date {
            self.record_date = record_date;
        }
        patch::apply(&mut self.temperature, changes.temperature);
        patch::apply(&mut self.heart_rate, changes.heart_rate);
        patch::apply(&mut self.notes, changes.notes);
        self.updated_at = Utc::now();
    }

    pub fn normalize(&mut self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if !self.weight.is_finite() || self.weight <= 0.0 {
            errors.add("weight", "Weight must be greater than 0.");
        } else if self.weight > MAX_RECORD_WEIGHT_KG {
            errors.add("weight", "Weight cannot exceed 500 kg.");
        } else {
            self.weight = (self.weight * 100.0).round() / 100.0;
        }

        if self.record_date > today {
            errors.add("record_date", "Record date cannot be in the future.");
        }

        if let Some(temperature) = self.temperature {
            if !(30.0..=45.0).contains(&temperature) {
                errors.add("temperature", "Temperature must be between 30°C and 45°C.");
            }
        }

        if let Some(heart_rate) = self.heart_rate {
            if !(40..=300).contains(&heart_rate) {
                errors.add("heart_rate", "Heart rate must be between 40 and 300 bpm.");
            }
        }

        self.notes = clean(self.notes.take());
        errors
    }
}

/// Health record creation payload, also used for full replacement (PUT)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateHealthRecord {
    pub pet_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    #[schema(example = 12.4)]
    pub weight: f64,
    pub record_date: NaiveDate,
    #[schema(example = 38.5)]
    pub temperature: Option<f64>,
    #[schema(example = 90)]
    pub heart_rate: Option<i32>,
    pub notes: Option<String>,
}

/// Partial health record update payload (PATCH)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateHealthRecord {
    pub pet_id: Option<Uuid>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub veterinarian_id: Option<Option<Uuid>>,
    pub weight: Option<f64>,
    pub record_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<f64>)]
    pub temperature: Option<Option<f64>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<i32>)]
    pub heart_rate: Option<Option<i32>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl From<CreateHealthRecord> for UpdateHealthRecord {
    fn from(input: CreateHealthRecord) -> Self {
        Self {
            pet_id: Some(input.pet_id),
            veterinarian_id: Some(input.veterinarian_id),
            weight: Some(input.weight),
            record_date: Some(input.record_date),
            temperature: Some(input.temperature),
            heart_rate: Some(input.heart_rate),
            notes: Some(input.notes),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthRecordResponse {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub weight: f64,
    pub record_date: NaiveDate,
    pub temperature: Option<f64>,
    pub heart_rate: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HealthRecord> for HealthRecordResponse {
    fn from(r: HealthRecord) -> Self {
        Self {
            id: r.id,
            pet_id: r.pet_id,
            veterinarian_id: r.veterinarian_id,
            weight: r.weight,
            record_date: r.record_date,
            temperature: r.temperature,
            heart_rate: r.heart_rate,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn vaccination(due: NaiveDate, administered: Option<NaiveDate>) -> Vaccination {
        Vaccination::new(CreateVaccination {
            pet_id: Uuid::new_v4(),
            vaccine_name: "Rabies".into(),
            due_date: due,
            administered_date: administered,
            status: None,
            veterinarian_id: None,
            batch_number: None,
            notes: None,
        })
    }

    fn record(weight: f64, date: NaiveDate) -> HealthRecord {
        HealthRecord::new(CreateHealthRecord {
            pet_id: Uuid::new_v4(),
            veterinarian_id: None,
            weight,
            record_date: date,
            temperature: None,
            heart_rate: None,
            notes: None,
        })
    }

    #[test]
    fn test_past_due_without_administration_is_overdue() {
        let today = day(2024, 5, 10);
        let mut v = vaccination(day(2024, 5, 1), None);
        assert!(v.normalize(today).is_empty());
        assert_eq!(v.status, VaccinationStatus::Overdue);
    }

    #[test]
    fn test_administered_date_always_completes() {
        let today = day(2024, 5, 10);
        for prior in VaccinationStatus::ALL {
            let mut v = vaccination(day(2024, 5, 1), Some(day(2024, 5, 2)));
            v.status = *prior;
            assert!(v.normalize(today).is_empty());
            assert_eq!(v.status, VaccinationStatus::Completed);
        }
    }

    #[test]
    fn test_overdue_reverts_when_due_date_moves_forward() {
        let today = day(2024, 5, 10);
        let mut v = vaccination(day(2024, 5, 1), None);
        v.normalize(today);
        assert_eq!(v.status, VaccinationStatus::Overdue);

        v.apply(UpdateVaccination {
            due_date: Some(day(2024, 6, 1)),
            ..Default::default()
        });
        assert!(v.normalize(today).is_empty());
        assert_eq!(v.status, VaccinationStatus::Pending);
    }

    #[test]
    fn test_scheduled_kept_while_due_in_future() {
        let mut v = vaccination(day(2024, 6, 1), None);
        v.status = VaccinationStatus::Scheduled;
        v.normalize(day(2024, 5, 10));
        assert_eq!(v.status, VaccinationStatus::Scheduled);
    }

    #[test]
    fn test_administered_date_rules() {
        let today = day(2024, 5, 10);

        let mut future = vaccination(day(2024, 5, 1), Some(day(2024, 5, 20)));
        assert_eq!(
            future.normalize(today).get("administered_date").unwrap()[0],
            "Administered date cannot be in the future."
        );

        let mut early = vaccination(day(2024, 5, 5), Some(day(2024, 5, 1)));
        assert_eq!(
            early.normalize(today).get("administered_date").unwrap()[0],
            "Administered date cannot be before due date."
        );

        let mut completed = vaccination(day(2024, 5, 5), None);
        completed.status = VaccinationStatus::Completed;
        assert_eq!(
            completed.normalize(today).get("administered_date").unwrap()[0],
            "Administered date is required for completed vaccinations."
        );
    }

    #[test]
    fn test_health_record_limits() {
        let today = day(2024, 5, 10);

        let mut zero = record(0.0, today);
        assert_eq!(zero.normalize(today).get("weight").unwrap()[0], "Weight must be greater than 0.");

        let mut heavy = record(500.5, today);
        assert_eq!(heavy.normalize(today).get("weight").unwrap()[0], "Weight cannot exceed 500 kg.");

        let mut future = record(10.0, day(2024, 5, 11));
        assert!(future.normalize(today).get("record_date").is_some());

        let mut vitals = record(10.0, today);
        vitals.temperature = Some(46.0);
        vitals.heart_rate = Some(20);
        let errors = vitals.normalize(today);
        assert!(errors.get("temperature").is_some());
        assert!(errors.get("heart_rate").is_some());
    }

    #[test]
    fn test_health_record_boundaries_accepted() {
        let today = day(2024, 5, 10);
        let mut r = record(500.0, today);
        r.temperature = Some(30.0);
        r.heart_rate = Some(300);
        assert!(r.normalize(today).is_empty());
    }
}
