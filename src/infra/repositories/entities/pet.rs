//! Pet database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::Pet;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub gender: String,
    pub pet_type: String,
    pub date_of_birth: Option<Date>,
    pub color: Option<String>,
    pub microchip_number: Option<String>,
    pub profile_picture: Option<String>,
    pub notes: Option<String>,
    /// Soft delete flag (true = hidden from default queries)
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::vaccination::Entity")]
    Vaccinations,
    #[sea_orm(has_many = "super::health_record::Entity")]
    HealthRecords,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::vaccination::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vaccinations.def()
    }
}

impl Related<super::health_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Pet {
    fn from(model: Model) -> Self {
        Pet {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            breed: model.breed,
            age: model.age,
            weight: model.weight,
            gender: model.gender.parse().unwrap_or_default(),
            pet_type: model.pet_type.parse().unwrap_or_default(),
            date_of_birth: model.date_of_birth,
            color: model.color,
            microchip_number: model.microchip_number,
            profile_picture: model.profile_picture,
            notes: model.notes,
            is_deleted: model.is_deleted,
            deleted_at: model.deleted_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Pet> for ActiveModel {
    fn from(pet: Pet) -> Self {
        ActiveModel {
            id: Set(pet.id),
            owner_id: Set(pet.owner_id),
            name: Set(pet.name),
            breed: Set(pet.breed),
            age: Set(pet.age),
            weight: Set(pet.weight),
            gender: Set(pet.gender.as_str().to_string()),
            pet_type: Set(pet.pet_type.as_str().to_string()),
            date_of_birth: Set(pet.date_of_birth),
            color: Set(pet.color),
            microchip_number: Set(pet.microchip_number),
            profile_picture: Set(pet.profile_picture),
            notes: Set(pet.notes),
            is_deleted: Set(pet.is_deleted),
            deleted_at: Set(pet.deleted_at),
            created_at: Set(pet.created_at),
            updated_at: Set(pet.updated_at),
        }
    }
}
