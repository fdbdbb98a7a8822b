//! Vaccination database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::Vaccination;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vaccinations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pet_id: Uuid,
    pub vaccine_name: String,
    pub due_date: Date,
    pub administered_date: Option<Date>,
    pub status: String,
    pub veterinarian_id: Option<Uuid>,
    pub batch_number: Option<String>,
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

impl From<Model> for Vaccination {
    fn from(model: Model) -> Self {
        Vaccination {
            id: model.id,
            pet_id: model.pet_id,
            vaccine_name: model.vaccine_name,
            due_date: model.due_date,
            administered_date: model.administered_date,
            status: model.status.parse().unwrap_or_default(),
            veterinarian_id: model.veterinarian_id,
            batch_number: model.batch_number,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Vaccination> for ActiveModel {
    fn from(v: Vaccination) -> Self {
        ActiveModel {
            id: Set(v.id),
            pet_id: Set(v.pet_id),
            vaccine_name: Set(v.vaccine_name),
            due_date: Set(v.due_date),
            administered_date: Set(v.administered_date),
            status: Set(v.status.as_str().to_string()),
            veterinarian_id: Set(v.veterinarian_id),
            batch_number: Set(v.batch_number),
            notes: Set(v.notes),
            created_at: Set(v.created_at),
            updated_at: Set(v.updated_at),
        }
    }
}
