//! Health record database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::HealthRecord;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "health_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pet_id: Uuid,
    pub veterinarian_id: Option<Uuid>,
    pub weight: f64,
    pub record_date: Date,
    pub temperature: Option<f64>,
    pub heart_rate: Option<i32>,
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

impl From<Model> for HealthRecord {
    fn from(model: Model) -> Self {
        HealthRecord {
            id: model.id,
            pet_id: model.pet_id,
            veterinarian_id: model.veterinarian_id,
            weight: model.weight,
            record_date: model.record_date,
            temperature: model.temperature,
            heart_rate: model.heart_rate,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<HealthRecord> for ActiveModel {
    fn from(r: HealthRecord) -> Self {
        ActiveModel {
            id: Set(r.id),
            pet_id: Set(r.pet_id),
            veterinarian_id: Set(r.veterinarian_id),
            weight: Set(r.weight),
            record_date: Set(r.record_date),
            temperature: Set(r.temperature),
            heart_rate: Set(r.heart_rate),
            notes: Set(r.notes),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        }
    }
}
