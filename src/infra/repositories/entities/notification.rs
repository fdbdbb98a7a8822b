//! Notification database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::Notification;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Notification {
    fn from(model: Model) -> Self {
        Notification {
            id: model.id,
            user_id: model.user_id,
            notification_type: model.notification_type.parse().unwrap_or_default(),
            title: model.title,
            message: model.message,
            is_read: model.is_read,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Notification> for ActiveModel {
    fn from(n: Notification) -> Self {
        ActiveModel {
            id: Set(n.id),
            user_id: Set(n.user_id),
            notification_type: Set(n.notification_type.as_str().to_string()),
            title: Set(n.title),
            message: Set(n.message),
            is_read: Set(n.is_read),
            created_at: Set(n.created_at),
            updated_at: Set(n.updated_at),
        }
    }
}
