//! Subscription plan and user subscription repositories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Select, UpdateMany,
};
use uuid::Uuid;

use super::entities::subscription_plan::{self, Entity as PlanEntity};
use super::entities::user_subscription::{self, Entity as SubscriptionEntity};
use super::fetch_page;
use crate::domain::{PlanType, SubscriptionPlan, SubscriptionStatus, UserSubscription};
use crate::errors::{AppResult, OptionExt};
use crate::types::{Page, PaginationParams};

#[cfg(test)]
use mockall::automock;

/// Plan catalog repository.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>>;

    /// Plans for a set of ids, in no particular order
    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<SubscriptionPlan>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<SubscriptionPlan>>;

    async fn find_by_type(&self, plan_type: PlanType) -> AppResult<Option<SubscriptionPlan>>;

    /// Plans ordered by price
    async fn list(
        &self,
        active_only: bool,
        params: PaginationParams,
    ) -> AppResult<Page<SubscriptionPlan>>;

    async fn create(&self, plan: SubscriptionPlan) -> AppResult<SubscriptionPlan>;

    async fn update(&self, plan: SubscriptionPlan) -> AppResult<SubscriptionPlan>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// User subscription repository.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserSubscription>>;

    /// Subscriptions, latest start first
    async fn list(
        &self,
        user_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Page<UserSubscription>>;

    /// The active subscription whose window covers `today`
    async fn find_current_active(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<Option<UserSubscription>>;

    /// The most recently started subscription in any status
    async fn find_latest(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>>;

    /// Number of subscriptions referencing a plan
    async fn count_for_plan(&self, plan_id: Uuid) -> AppResult<u64>;

    async fn create(&self, subscription: UserSubscription) -> AppResult<UserSubscription>;

    async fn update(&self, subscription: UserSubscription) -> AppResult<UserSubscription>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Re-derive active/expired for every non-cancelled row. Returns rows changed.
    async fn refresh_statuses(&self, today: NaiveDate) -> AppResult<u64>;
}

/// SeaORM implementation of PlanRepository
pub struct PlanStore<C> {
    conn: Arc<C>,
}

impl<C> PlanStore<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> PlanRepository for PlanStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SubscriptionPlan>> {
        let result = PlanEntity::find_by_id(id).one(&*self.conn).await?;
        Ok(result.map(SubscriptionPlan::from))
    }

    async fn find_by_ids(&self, ids: Vec<Uuid>) -> AppResult<Vec<SubscriptionPlan>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = PlanEntity::find()
            .filter(subscription_plan::Column::Id.is_in(ids))
            .all(&*self.conn)
            .await?;
        Ok(models.into_iter().map(SubscriptionPlan::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<SubscriptionPlan>> {
        let result = PlanEntity::find()
            .filter(subscription_plan::Column::Name.eq(name))
            .one(&*self.conn)
            .await?;
        Ok(result.map(SubscriptionPlan::from))
    }

    async fn find_by_type(&self, plan_type: PlanType) -> AppResult<Option<SubscriptionPlan>> {
        let result = PlanEntity::find()
            .filter(subscription_plan::Column::PlanType.eq(plan_type.as_str()))
            .one(&*self.conn)
            .await?;
        Ok(result.map(SubscriptionPlan::from))
    }

    async fn list(
        &self,
        active_only: bool,
        params: PaginationParams,
    ) -> AppResult<Page<SubscriptionPlan>> {
        let mut select = PlanEntity::find();
        if active_only {
            select = select.filter(subscription_plan::Column::IsActive.eq(true));
        }
        let select = select
            .order_by_asc(subscription_plan::Column::Price)
            .order_by_asc(subscription_plan::Column::Name);

        let page = fetch_page(select, &*self.conn, params).await?;
        Ok(page.map(SubscriptionPlan::from))
    }

    async fn create(&self, plan: SubscriptionPlan) -> AppResult<SubscriptionPlan> {
        let model = subscription_plan::ActiveModel::from(plan)
            .insert(&*self.conn)
            .await?;
        Ok(SubscriptionPlan::from(model))
    }

    async fn update(&self, plan: SubscriptionPlan) -> AppResult<SubscriptionPlan> {
        let model = subscription_plan::ActiveModel::from(plan)
            .update(&*self.conn)
            .await?;
        Ok(SubscriptionPlan::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let model = PlanEntity::find_by_id(id)
            .one(&*self.conn)
            .await?
            .ok_or_not_found()?;
        model.delete(&*self.conn).await?;
        Ok(())
    }
}

fn current_active_query(user_id: Uuid, today: NaiveDate) -> Select<SubscriptionEntity> {
    use user_subscription::Column;

    SubscriptionEntity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Status.eq(SubscriptionStatus::Active.as_str()))
        .filter(Column::IsActive.eq(true))
        .filter(Column::StartDate.lte(today))
        .filter(Column::EndDate.gte(today))
        .order_by_desc(Column::StartDate)
}

/// `UserSubscription::derive_status` as bulk updates over non-cancelled rows.
fn status_refresh(today: NaiveDate, now: DateTime<Utc>) -> [UpdateMany<SubscriptionEntity>; 2] {
    use user_subscription::Column;

    let active = SubscriptionStatus::Active.as_str();
    let expired = SubscriptionStatus::Expired.as_str();
    let cancelled = SubscriptionStatus::Cancelled.as_str();

    let in_window = Condition::all()
        .add(Column::StartDate.lte(today))
        .add(Column::EndDate.gte(today));
    let out_of_window = Condition::any()
        .add(Column::StartDate.gt(today))
        .add(Column::EndDate.lt(today));

    let activate = SubscriptionEntity::update_many()
        .col_expr(Column::Status, Expr::value(active))
        .col_expr(Column::IsActive, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Status.ne(cancelled))
        .filter(in_window)
        .filter(
            Condition::any()
                .add(Column::Status.ne(active))
                .add(Column::IsActive.eq(false)),
        );

    let expire = SubscriptionEntity::update_many()
        .col_expr(Column::Status, Expr::value(expired))
        .col_expr(Column::IsActive, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Status.ne(cancelled))
        .filter(out_of_window)
        .filter(
            Condition::any()
                .add(Column::Status.ne(expired))
                .add(Column::IsActive.eq(true)),
        );

    [activate, expire]
}

/// SeaORM implementation of SubscriptionRepository
pub struct SubscriptionStore<C> {
    conn: Arc<C>,
}

impl<C> SubscriptionStore<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> SubscriptionRepository for SubscriptionStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<UserSubscription>> {
        let result = SubscriptionEntity::find_by_id(id).one(&*self.conn).await?;
        Ok(result.map(UserSubscription::from))
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Page<UserSubscription>> {
        let mut select = SubscriptionEntity::find();
        if let Some(user_id) = user_id {
            select = select.filter(user_subscription::Column::UserId.eq(user_id));
        }
        let select = select
            .order_by_desc(user_subscription::Column::StartDate)
            .order_by_desc(user_subscription::Column::CreatedAt);

        let page = fetch_page(select, &*self.conn, params).await?;
        Ok(page.map(UserSubscription::from))
    }

    async fn find_current_active(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<Option<UserSubscription>> {
        let result = current_active_query(user_id, today)
            .one(&*self.conn)
            .await?;
        Ok(result.map(UserSubscription::from))
    }

    async fn find_latest(&self, user_id: Uuid) -> AppResult<Option<UserSubscription>> {
        use user_subscription::Column;

        let result = SubscriptionEntity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::StartDate)
            .order_by_desc(Column::CreatedAt)
            .one(&*self.conn)
            .await?;
        Ok(result.map(UserSubscription::from))
    }

    async fn count_for_plan(&self, plan_id: Uuid) -> AppResult<u64> {
        let count = SubscriptionEntity::find()
            .filter(user_subscription::Column::PlanId.eq(plan_id))
            .count(&*self.conn)
            .await?;
        Ok(count)
    }

    async fn create(&self, subscription: UserSubscription) -> AppResult<UserSubscription> {
        let model = user_subscription::ActiveModel::from(subscription)
            .insert(&*self.conn)
            .await?;
        Ok(UserSubscription::from(model))
    }

    async fn update(&self, subscription: UserSubscription) -> AppResult<UserSubscription> {
        let model = user_subscription::ActiveModel::from(subscription)
            .update(&*self.conn)
            .await?;
        Ok(UserSubscription::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let model = SubscriptionEntity::find_by_id(id)
            .one(&*self.conn)
            .await?
            .ok_or_not_found()?;
        model.delete(&*self.conn).await?;
        Ok(())
    }

    async fn refresh_statuses(&self, today: NaiveDate) -> AppResult<u64> {
        let mut changed = 0;
        for update in status_refresh(today, Utc::now()) {
            changed += update.exec(&*self.conn).await?.rows_affected;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait, Value};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn test_current_subscription_must_cover_today() {
        let user = Uuid::new_v4();
        let stmt = current_active_query(user, today()).build(DbBackend::Postgres);
        assert!(stmt.sql.contains(r#""user_subscriptions"."start_date" <= $4"#));
        assert!(stmt.sql.contains(r#""user_subscriptions"."end_date" >= $5"#));
        assert_eq!(
            stmt.values.map(|v| v.0).unwrap_or_default(),
            vec![
                Value::from(user),
                Value::from("active"),
                Value::from(true),
                Value::from(today()),
                Value::from(today()),
            ]
        );
    }

    #[test]
    fn test_rows_inside_window_are_activated() {
        let [activate, _] = status_refresh(today(), Utc::now());
        let stmt = activate.build(DbBackend::Postgres);
        assert!(stmt
            .sql
            .starts_with(r#"UPDATE "user_subscriptions" SET "status" = $1, "is_active" = $2"#));
        assert!(stmt.sql.contains(r#""user_subscriptions"."status" <> $4"#));
        assert!(stmt.sql.contains(r#""user_subscriptions"."start_date" <= $5"#));
        assert!(stmt.sql.contains(r#""user_subscriptions"."end_date" >= $6"#));
        let values = stmt.values.map(|v| v.0).unwrap_or_default();
        assert_eq!(values[0], Value::from("active"));
        assert_eq!(values[1], Value::from(true));
        assert_eq!(values[3], Value::from("cancelled"));
    }

    #[test]
    fn test_rows_outside_window_are_expired() {
        let [_, expire] = status_refresh(today(), Utc::now());
        let stmt = expire.build(DbBackend::Postgres);
        assert!(stmt.sql.contains(r#""user_subscriptions"."status" <> $4"#));
        assert!(stmt
            .sql
            .contains(r#""user_subscriptions"."start_date" > $5 OR "user_subscriptions"."end_date" < $6"#));
        let values = stmt.values.map(|v| v.0).unwrap_or_default();
        assert_eq!(values[0], Value::from("expired"));
        assert_eq!(values[1], Value::from(false));
        assert_eq!(values[3], Value::from("cancelled"));
    }
}
