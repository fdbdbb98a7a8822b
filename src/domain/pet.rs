//! Pet profiles with soft delete.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::access::Owned;
use crate::config::{MAX_PET_AGE_YEARS, MAX_PET_WEIGHT_KG, PET_AGE_TOLERANCE_YEARS};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::types::patch;

pub const MICROCHIP_TAKEN_MESSAGE: &str = "A pet with this microchip number already exists.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

choice_enum!(Gender { Male => "male", Female => "female", Unknown => "unknown" });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    #[default]
    Dog,
    Cat,
    Bird,
    Rabbit,
    Other,
}

choice_enum!(PetType {
    Dog => "dog",
    Cat => "cat",
    Bird => "bird",
    Rabbit => "rabbit",
    Other => "other",
});

/// Whole years elapsed between `born` and `today`.
pub fn age_in_years(born: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    years.max(0)
}

/// Trim a free-text value, treating blank as absent.
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_length(errors: &mut FieldErrors, field: &str, value: Option<&str>, max: usize) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", max),
        );
    }
}

/// Pet domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub gender: Gender,
    pub pet_type: PetType,
    pub date_of_birth: Option<NaiveDate>,
    pub color: Option<String>,
    pub microchip_number: Option<String>,
    pub profile_picture: Option<String>,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    /// Build an unsaved pet for `owner_id`; call [`Pet::normalize`] before storing.
    pub fn new(owner_id: Uuid, input: CreatePet) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: input.name,
            breed: input.breed,
            age: input.age,
            weight: input.weight,
            gender: input.gender.unwrap_or_default(),
            pet_type: input.pet_type.unwrap_or_default(),
            date_of_birth: input.date_of_birth,
            color: input.color,
            microchip_number: input.microchip_number,
            profile_picture: input.profile_picture,
            notes: input.notes,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update into the pet. Ownership changes are handled by the caller.
    pub fn apply(&mut self, changes: UpdatePet) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        patch::apply(&mut self.breed, changes.breed);
        patch::apply(&mut self.age, changes.age);
        patch::apply(&mut self.weight, changes.weight);
        if let Some(gender) = changes.gender {
            self.gender = gender;
        }
        if let Some(pet_type) = changes.pet_type {
            self.pet_type = pet_type;
        }
        patch::apply(&mut self.date_of_birth, changes.date_of_birth);
        patch::apply(&mut self.color, changes.color);
        patch::apply(&mut self.microchip_number, changes.microchip_number);
        patch::apply(&mut self.profile_picture, changes.profile_picture);
        patch::apply(&mut self.notes, changes.notes);
        self.updated_at = Utc::now();
    }

    /// Canonicalise stored values and check every field rule.
    ///
    /// Runs before each save: trims text, upper-cases the microchip,
    /// rounds the weight to cents and derives a missing age from the
    /// date of birth.
    pub fn normalize(&mut self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();

        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            errors.add("name", "Pet name cannot be empty.");
        }
        check_length(&mut errors, "name", Some(&self.name), 100);

        self.breed = clean(self.breed.take());
        check_length(&mut errors, "breed", self.breed.as_deref(), 100);
        self.color = clean(self.color.take());
        check_length(&mut errors, "color", self.color.as_deref(), 50);
        self.microchip_number = clean(self.microchip_number.take()).map(|m| m.to_uppercase());
        check_length(&mut errors, "microchip_number", self.microchip_number.as_deref(), 50);
        self.profile_picture = clean(self.profile_picture.take());
        self.notes = clean(self.notes.take());

        if let Some(age) = self.age {
            if age < 0 {
                errors.add("age", "Ensure this value is greater than or equal to 0.");
            } else if age > MAX_PET_AGE_YEARS {
                errors.add(
                    "age",
                    format!("Ensure this value is less than or equal to {}.", MAX_PET_AGE_YEARS),
                );
            }
        }

        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight < 0.0 {
                errors.add("weight", "Ensure this value is greater than or equal to 0.");
            } else if weight > MAX_PET_WEIGHT_KG {
                errors.add(
                    "weight",
                    format!("Ensure this value is less than or equal to {}.", MAX_PET_WEIGHT_KG),
                );
            } else {
                self.weight = Some((weight * 100.0).round() / 100.0);
            }
        }

        if let Some(born) = self.date_of_birth {
            if born > today {
                errors.add("date_of_birth", "Date of birth cannot be in the future.");
            } else {
                let computed = age_in_years(born, today);
                match self.age {
                    None => self.age = Some(computed),
                    // an out-of-range age already carries its own error
                    Some(age)
                        if (0..=MAX_PET_AGE_YEARS).contains(&age)
                            && age.abs_diff(computed) > PET_AGE_TOLERANCE_YEARS.unsigned_abs() =>
                    {
                        errors.add("age", "Age does not match date of birth. Please verify.");
                    }
                    Some(_) => {}
                }
            }
        }

        errors
    }

    /// Hide the pet from default queries.
    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
        self.updated_at = at;
    }

    /// Bring a soft-deleted pet back.
    ///
    /// # Errors
    /// `BadRequest` when the pet is not deleted.
    pub fn restore(&mut self) -> AppResult<()> {
        if !self.is_deleted {
            return Err(AppError::bad_request("Pet is not deleted."));
        }
        self.is_deleted = false;
        self.deleted_at = None;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Owned for Pet {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Pet creation payload, also used for full replacement (PUT)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreatePet {
    #[schema(example = "Rex")]
    pub name: String,
    #[schema(example = "Beagle")]
    pub breed: Option<String>,
    #[schema(example = 3)]
    pub age: Option<i32>,
    #[schema(example = 12.5)]
    pub weight: Option<f64>,
    pub gender: Option<Gender>,
    pub pet_type: Option<PetType>,
    pub date_of_birth: Option<NaiveDate>,
    pub color: Option<String>,
    #[schema(example = "985112345678901")]
    pub microchip_number: Option<String>,
    pub profile_picture: Option<String>,
    pub notes: Option<String>,
    /// Admin only; defaults to the requester
    pub owner_id: Option<Uuid>,
}

/// Partial pet update payload (PATCH)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePet {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub breed: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<i32>)]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<f64>)]
    pub weight: Option<Option<f64>>,
    pub gender: Option<Gender>,
    pub pet_type: Option<PetType>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub microchip_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    /// Admin only
    pub owner_id: Option<Uuid>,
}

/// A full replacement sets every field; omitted optionals are cleared.
impl From<CreatePet> for UpdatePet {
    fn from(input: CreatePet) -> Self {
        Self {
            name: Some(input.name),
            breed: Some(input.breed),
            age: Some(input.age),
            weight: Some(input.weight),
            gender: Some(input.gender.unwrap_or_default()),
            pet_type: Some(input.pet_type.unwrap_or_default()),
            date_of_birth: Some(input.date_of_birth),
            color: Some(input.color),
            microchip_number: Some(input.microchip_number),
            profile_picture: Some(input.profile_picture),
            notes: Some(input.notes),
            owner_id: input.owner_id,
        }
    }
}

/// Pet response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PetResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub gender: Gender,
    pub pet_type: PetType,
    pub date_of_birth: Option<NaiveDate>,
    pub color: Option<String>,
    pub microchip_number: Option<String>,
    pub profile_picture: Option<String>,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Pet> for PetResponse {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id,
            owner_id: pet.owner_id,
            name: pet.name,
            breed: pet.breed,
            age: pet.age,
            weight: pet.weight,
            gender: pet.gender,
            pet_type: pet.pet_type,
            date_of_birth: pet.date_of_birth,
            color: pet.color,
            microchip_number: pet.microchip_number,
            profile_picture: pet.profile_picture,
            notes: pet.notes,
            is_deleted: pet.is_deleted,
            deleted_at: pet.deleted_at,
            created_at: pet.created_at,
            updated_at: pet.updated_at,
        }
    }
}
