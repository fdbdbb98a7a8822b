//! Appointment database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::Appointment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pet_id: Uuid,
    pub owner_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub appointment_date: DateTimeUtc,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pet::Entity",
        from = "Column::PetId",
        to = "super::pet::Column::Id",
        on_delete = "Cascade"
    )]
    Pet,
}

impl Related<super::pet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Appointment {
    fn from(model: Model) -> Self {
        Appointment {
            id: model.id,
            pet_id: model.pet_id,
            owner_id: model.owner_id,
            veterinarian_id: model.veterinarian_id,
            appointment_date: model.appointment_date,
            reason: model.reason,
            status: model.status.parse().unwrap_or_default(),
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Appointment> for ActiveModel {
    fn from(a: Appointment) -> Self {
        ActiveModel {
            id: Set(a.id),
            pet_id: Set(a.pet_id),
            owner_id: Set(a.owner_id),
            veterinarian_id: Set(a.veterinarian_id),
            appointment_date: Set(a.appointment_date),
            reason: Set(a.reason),
            status: Set(a.status.as_str().to_string()),
            notes: Set(a.notes),
            created_at: Set(a.created_at),
            updated_at: Set(a.updated_at),
        }
    }
}
