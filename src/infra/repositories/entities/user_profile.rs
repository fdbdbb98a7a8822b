//! User profile database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::UserProfile;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserProfile {
    fn from(model: Model) -> Self {
        UserProfile {
            user_id: model.user_id,
            phone: model.phone,
            location: model.location,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<UserProfile> for ActiveModel {
    fn from(profile: UserProfile) -> Self {
        ActiveModel {
            user_id: Set(profile.user_id),
            phone: Set(profile.phone),
            location: Set(profile.location),
            is_active: Set(profile.is_active),
            created_at: Set(profile.created_at),
            updated_at: Set(profile.updated_at),
        }
    }
}
