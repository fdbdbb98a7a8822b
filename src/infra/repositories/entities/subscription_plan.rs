//! Subscription plan database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::SubscriptionPlan;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subscription_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub plan_type: String,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    pub max_pets: i32,
    /// JSON array of feature strings
    pub features: Json,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_subscription::Entity")]
    Subscriptions,
}

impl Related<super::user_subscription::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SubscriptionPlan {
    fn from(model: Model) -> Self {
        SubscriptionPlan {
            id: model.id,
            plan_type: model.plan_type.parse().unwrap_or_default(),
            name: model.name,
            description: model.description,
            price: model.price,
            duration_days: model.duration_days,
            max_pets: model.max_pets,
            features: serde_json::from_value(model.features).unwrap_or_default(),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<SubscriptionPlan> for ActiveModel {
    fn from(plan: SubscriptionPlan) -> Self {
        ActiveModel {
            id: Set(plan.id),
            plan_type: Set(plan.plan_type.as_str().to_string()),
            name: Set(plan.name),
            description: Set(plan.description),
            price: Set(plan.price),
            duration_days: Set(plan.duration_days),
            max_pets: Set(plan.max_pets),
            features: Set(Json::from(plan.features)),
            is_active: Set(plan.is_active),
            created_at: Set(plan.created_at),
            updated_at: Set(plan.updated_at),
        }
    }
}
