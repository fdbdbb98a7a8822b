//! User subscription database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::UserSubscription;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub status: String,
    pub is_active: bool,
    pub auto_renew: bool,
    pub cancelled_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subscription_plan::Entity",
        from = "Column::PlanId",
        to = "super::subscription_plan::Column::Id",
        on_delete = "Restrict"
    )]
    Plan,
}

impl Related<super::subscription_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserSubscription {
    fn from(model: Model) -> Self {
        UserSubscription {
            id: model.id,
            user_id: model.user_id,
            plan_id: model.plan_id,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status.parse().unwrap_or_default(),
            is_active: model.is_active,
            auto_renew: model.auto_renew,
            cancelled_at: model.cancelled_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<UserSubscription> for ActiveModel {
    fn from(s: UserSubscription) -> Self {
        ActiveModel {
            id: Set(s.id),
            user_id: Set(s.user_id),
            plan_id: Set(s.plan_id),
            start_date: Set(s.start_date),
            end_date: Set(s.end_date),
            status: Set(s.status.as_str().to_string()),
            is_active: Set(s.is_active),
            auto_renew: Set(s.auto_renew),
            cancelled_at: Set(s.cancelled_at),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
        }
    }
}
