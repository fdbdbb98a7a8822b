//! Subscription plans and user subscriptions.
//!
//! Subscriptions are returned with their plan embedded and the derived
//! `days_remaining` and `is_currently_active` computed for today.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::checks::active_user;
use crate::domain::{
    require_admin, CreatePlan, CreateSubscription, CurrentUser, SubscriptionPlan,
    SubscriptionResponse, UpdatePlan, UpdateSubscription, UserSubscription,
};
use crate::errors::{AppError, AppResult, FieldErrors, OptionExt};
use crate::infra::repositories::PlanRepository;
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

pub const PLAN_NAME_TAKEN_MESSAGE: &str = "A plan with this name already exists.";
pub const PLAN_TYPE_TAKEN_MESSAGE: &str = "A plan with this type already exists.";
pub const PLAN_IN_USE_MESSAGE: &str =
    "This plan cannot be deleted because subscriptions still reference it.";

/// Plan catalog operations.
#[async_trait]
pub trait PlanService: Send + Sync {
    /// Every plan for admins, active plans for everyone else
    async fn list_plans(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<SubscriptionPlan>>;

    async fn active_plans(&self, params: PaginationParams) -> AppResult<Page<SubscriptionPlan>>;

    async fn get_plan(&self, requester: &CurrentUser, id: Uuid) -> AppResult<SubscriptionPlan>;

    async fn create_plan(
        &self,
        requester: &CurrentUser,
        input: CreatePlan,
    ) -> AppResult<SubscriptionPlan>;

    async fn update_plan(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdatePlan,
    ) -> AppResult<SubscriptionPlan>;

    /// Refused with a conflict while any subscription references the plan
    async fn delete_plan(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()>;
}

/// Per-user subscription operations.
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<SubscriptionResponse>>;

    async fn my_subscriptions(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<SubscriptionResponse>>;

    /// The requester's subscription that is active today
    async fn my_subscription(&self, requester: &CurrentUser) -> AppResult<SubscriptionResponse>;

    /// The requester's most recently started subscription
    async fn current(&self, requester: &CurrentUser) -> AppResult<SubscriptionResponse>;

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<SubscriptionResponse>;

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateSubscription,
    ) -> AppResult<SubscriptionResponse>;

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateSubscription,
    ) -> AppResult<SubscriptionResponse>;

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()>;

    async fn cancel(&self, requester: &CurrentUser, id: Uuid) -> AppResult<SubscriptionResponse>;
}

pub struct PlanManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PlanManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

/// Name and type are each unique across the catalog.
async fn check_plan_unique(plans: &dyn PlanRepository, plan: &SubscriptionPlan) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if let Some(other) = plans.find_by_name(&plan.name).await? {
        if other.id != plan.id {
            errors.add("name", PLAN_NAME_TAKEN_MESSAGE);
        }
    }
    if let Some(other) = plans.find_by_type(plan.plan_type).await? {
        if other.id != plan.id {
            errors.add("plan_type", PLAN_TYPE_TAKEN_MESSAGE);
        }
    }
    errors.into_result()
}

#[async_trait]
impl<U: UnitOfWork> PlanService for PlanManager<U> {
    async fn list_plans(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<SubscriptionPlan>> {
        self.uow.plans().list(!requester.is_admin(), params).await
    }

    async fn active_plans(&self, params: PaginationParams) -> AppResult<Page<SubscriptionPlan>> {
        self.uow.plans().list(true, params).await
    }

    async fn get_plan(&self, requester: &CurrentUser, id: Uuid) -> AppResult<SubscriptionPlan> {
        let plan = self.uow.plans().find_by_id(id).await?.ok_or_not_found()?;
        if !plan.is_active && !requester.is_admin() {
            return Err(AppError::NotFound);
        }
        Ok(plan)
    }

    async fn create_plan(
        &self,
        requester: &CurrentUser,
        input: CreatePlan,
    ) -> AppResult<SubscriptionPlan> {
        require_admin(requester)?;

        let mut plan = SubscriptionPlan::new(input);
        plan.normalize().into_result()?;

        let txn = self.uow.begin().await?;
        check_plan_unique(txn.plans(), &plan).await?;
        let plan = txn.plans().create(plan).await?;
        txn.commit().await?;

        tracing::info!(plan_id = %plan.id, plan_type = %plan.plan_type, "Subscription plan created");
        Ok(plan)
    }

    async fn update_plan(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdatePlan,
    ) -> AppResult<SubscriptionPlan> {
        require_admin(requester)?;

        let txn = self.uow.begin().await?;
        let mut plan = txn.plans().find_by_id(id).await?.ok_or_not_found()?;
        plan.apply(changes);
        plan.normalize().into_result()?;
        check_plan_unique(txn.plans(), &plan).await?;

        let plan = txn.plans().update(plan).await?;
        txn.commit().await?;

        tracing::info!(plan_id = %plan.id, "Subscription plan updated");
        Ok(plan)
    }

    async fn delete_plan(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()> {
        require_admin(requester)?;

        let txn = self.uow.begin().await?;
        txn.plans().find_by_id(id).await?.ok_or_not_found()?;
        if txn.subscriptions().count_for_plan(id).await? > 0 {
            return Err(AppError::conflict(PLAN_IN_USE_MESSAGE));
        }
        txn.plans().delete(id).await?;
        txn.commit().await?;

        tracing::info!(plan_id = %id, "Subscription plan deleted");
        Ok(())
    }
}

pub struct SubscriptionManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> SubscriptionManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Attach plans to a page of subscriptions with one lookup.
    async fn embed_page(
        &self,
        page: Page<UserSubscription>,
        today: NaiveDate,
    ) -> AppResult<Page<SubscriptionResponse>> {
        let mut ids: Vec<Uuid> = page.items.iter().map(|s| s.plan_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let plans: HashMap<Uuid, SubscriptionPlan> = self
            .uow
            .plans()
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|plan| (plan.id, plan))
            .collect();

        let items = page
            .items
            .into_iter()
            .map(|subscription| {
                let plan = plans.get(&subscription.plan_id).cloned().ok_or_else(|| {
                    AppError::internal(format!("Plan {} is missing", subscription.plan_id))
                })?;
                Ok(SubscriptionResponse::new(subscription, plan, today))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(items, page.total))
    }

    async fn embed(
        &self,
        plans: &dyn PlanRepository,
        subscription: UserSubscription,
    ) -> AppResult<SubscriptionResponse> {
        let plan = plans
            .find_by_id(subscription.plan_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("Plan {} is missing", subscription.plan_id))
            })?;
        Ok(SubscriptionResponse::new(
            subscription,
            plan,
            Utc::now().date_naive(),
        ))
    }
}

async fn existing_plan(plans: &dyn PlanRepository, plan_id: Uuid) -> AppResult<SubscriptionPlan> {
    plans
        .find_by_id(plan_id)
        .await?
        .ok_or_else(|| AppError::field("plan_id", "Plan does not exist."))
}

#[async_trait]
impl<U: UnitOfWork> SubscriptionService for SubscriptionManager<U> {
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<SubscriptionResponse>> {
        let page = self
            .uow
            .subscriptions()
            .list(requester.owner_filter(), params)
            .await?;
        self.embed_page(page, Utc::now().date_naive()).await
    }

    async fn my_subscriptions(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<SubscriptionResponse>> {
        let page = self
            .uow
            .subscriptions()
            .list(Some(requester.id), params)
            .await?;
        self.embed_page(page, Utc::now().date_naive()).await
    }

    async fn my_subscription(&self, requester: &CurrentUser) -> AppResult<SubscriptionResponse> {
        let subscription = self
            .uow
            .subscriptions()
            .find_current_active(requester.id, Utc::now().date_naive())
            .await?
            .ok_or_not_found()?;
        self.embed(self.uow.plans().as_ref(), subscription).await
    }

    async fn current(&self, requester: &CurrentUser) -> AppResult<SubscriptionResponse> {
        let subscription = self
            .uow
            .subscriptions()
            .find_latest(requester.id)
            .await?
            .ok_or_not_found()?;
        self.embed(self.uow.plans().as_ref(), subscription).await
    }

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<SubscriptionResponse> {
        let subscription = self
            .uow
            .subscriptions()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        let subscription = requester.scope(subscription)?;
        self.embed(self.uow.plans().as_ref(), subscription).await
    }

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateSubscription,
    ) -> AppResult<SubscriptionResponse> {
        require_admin(requester)?;
        let today = Utc::now().date_naive();

        let txn = self.uow.begin().await?;
        active_user(txn.users(), "user_id", input.user_id).await?;
        let plan = existing_plan(txn.plans(), input.plan_id).await?;

        let mut subscription = UserSubscription::new(input, &plan, today);
        subscription.normalize(today).into_result()?;

        let subscription = txn.subscriptions().create(subscription).await?;
        txn.commit().await?;

        tracing::info!(
            subscription_id = %subscription.id,
            user_id = %subscription.user_id,
            plan_id = %plan.id,
            status = %subscription.status,
            "Subscription created"
        );
        Ok(SubscriptionResponse::new(subscription, plan, today))
    }

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateSubscription,
    ) -> AppResult<SubscriptionResponse> {
        require_admin(requester)?;
        let today = Utc::now().date_naive();

        let txn = self.uow.begin().await?;
        let mut subscription = txn
            .subscriptions()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;

        if let Some(user_id) = changes.user_id.filter(|u| *u != subscription.user_id) {
            active_user(txn.users(), "user_id", user_id).await?;
        }
        let plan_id = changes.plan_id.unwrap_or(subscription.plan_id);
        let plan = existing_plan(txn.plans(), plan_id).await?;

        let mut errors = subscription.apply(changes);
        if errors.is_empty() {
            errors.extend(subscription.normalize(today));
        }
        errors.into_result()?;

        let subscription = txn.subscriptions().update(subscription).await?;
        txn.commit().await?;

        tracing::info!(subscription_id = %subscription.id, status = %subscription.status, "Subscription updated");
        Ok(SubscriptionResponse::new(subscription, plan, today))
    }

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()> {
        require_admin(requester)?;
        let txn = self.uow.begin().await?;
        txn.subscriptions().delete(id).await?;
        txn.commit().await?;

        tracing::info!(subscription_id = %id, "Subscription deleted");
        Ok(())
    }

    async fn cancel(&self, requester: &CurrentUser, id: Uuid) -> AppResult<SubscriptionResponse> {
        require_admin(requester)?;

        let txn = self.uow.begin().await?;
        let mut subscription = txn
            .subscriptions()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        subscription.cancel(Utc::now())?;

        let subscription = txn.subscriptions().update(subscription).await?;
        let response = self.embed(txn.plans(), subscription).await?;
        txn.commit().await?;

        tracing::info!(subscription_id = %id, cancelled_by = %requester.id, "Subscription cancelled");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlanType, SubscriptionStatus, UserRole};
    use crate::services::testing::{requester, user_with_id, Mocks};
    use chrono::Duration;

    fn plan(plan_type: PlanType, name: &str) -> SubscriptionPlan {
        SubscriptionPlan::new(CreatePlan {
            plan_type,
            name: name.into(),
            description: None,
            price: Some(if plan_type == PlanType::Free { 0.0 } else { 9.99 }),
            duration_days: Some(30),
            max_pets: Some(3),
            features: None,
            is_active: None,
        })
    }

    fn subscription_for(user_id: Uuid, plan: &SubscriptionPlan) -> UserSubscription {
        let today = Utc::now().date_naive();
        let mut s = UserSubscription::new(
            CreateSubscription {
                user_id,
                plan_id: plan.id,
                start_date: Some(today - Duration::days(5)),
                end_date: None,
                status: None,
                auto_renew: None,
            },
            plan,
            today,
        );
        s.normalize(today);
        s
    }

    fn create_input(plan_type: PlanType, name: &str) -> CreatePlan {
        CreatePlan {
            plan_type,
            name: name.into(),
            description: None,
            price: Some(4.99),
            duration_days: None,
            max_pets: None,
            features: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_non_admin_sees_active_plans_only() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .plans
            .expect_list()
            .withf(|active_only, _| *active_only)
            .times(1)
            .returning(|_, _| Ok(Page::new(vec![], 0)));
        let service = PlanManager::new(mocks.into_uow());

        service.list_plans(&user, PaginationParams::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_inactive_plan_hidden_from_non_admin() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks.plans.expect_find_by_id().returning(|_| {
            let mut p = plan(PlanType::Premium, "Premium");
            p.is_active = false;
            Ok(Some(p))
        });
        let service = PlanManager::new(mocks.into_uow());

        let err = service.get_plan(&user, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));

        let admin = requester(UserRole::Admin);
        assert!(service.get_plan(&admin, Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_plan_name_and_type() {
        let admin = requester(UserRole::Admin);
        let mut mocks = Mocks::default();
        mocks
            .plans
            .expect_find_by_name()
            .returning(|name| Ok(Some(plan(PlanType::Premium, name))));
        mocks
            .plans
            .expect_find_by_type()
            .returning(|t| Ok(Some(plan(t, "Other"))));
        let service = PlanManager::new(mocks.into_uow());

        let err = service
            .create_plan(&admin, create_input(PlanType::Premium, "Premium"))
            .await
            .unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get("name").unwrap()[0], PLAN_NAME_TAKEN_MESSAGE);
        assert_eq!(errors.get("plan_type").unwrap()[0], PLAN_TYPE_TAKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_free_plan_with_price_rejected() {
        let admin = requester(UserRole::Admin);
        let service = PlanManager::new(Mocks::default().into_uow());

        let err = service
            .create_plan(&admin, create_input(PlanType::Free, "Free"))
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().get("price").is_some());
    }

    #[tokio::test]
    async fn test_plan_in_use_cannot_be_deleted() {
        let admin = requester(UserRole::Admin);
        let mut mocks = Mocks::default();
        mocks
            .plans
            .expect_find_by_id()
            .returning(|_| Ok(Some(plan(PlanType::Premium, "Premium"))));
        mocks.subscriptions.expect_count_for_plan().returning(|_| Ok(2));
        mocks.plans.expect_delete().never();
        let service = PlanManager::new(mocks.into_uow());

        let err = service.delete_plan(&admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_plan_writes_are_admin_only() {
        let user = requester(UserRole::User);
        let service = PlanManager::new(Mocks::default().into_uow());

        let err = service
            .create_plan(&user, create_input(PlanType::Premium, "Premium"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_creates_active_subscription() {
        let admin = requester(UserRole::Admin);
        let premium = plan(PlanType::Premium, "Premium");
        let lookup = premium.clone();
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_with_id(id))));
        mocks
            .plans
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lookup.clone())));
        mocks.subscriptions.expect_create().times(1).returning(Ok);
        let uow = mocks.into_uow();
        let service = SubscriptionManager::new(uow.clone());

        let response = service
            .create(
                &admin,
                CreateSubscription {
                    user_id: Uuid::new_v4(),
                    plan_id: premium.id,
                    start_date: None,
                    end_date: None,
                    status: None,
                    auto_renew: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(response.status, SubscriptionStatus::Active);
        assert!(response.is_currently_active);
        assert_eq!(response.days_remaining, 30);
        assert_eq!(response.plan.id, premium.id);
        assert_eq!(uow.commits(), 1);
    }

    #[tokio::test]
    async fn test_unknown_plan_is_field_error() {
        let admin = requester(UserRole::Admin);
        let mut mocks = Mocks::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(user_with_id(id))));
        mocks.plans.expect_find_by_id().returning(|_| Ok(None));
        let service = SubscriptionManager::new(mocks.into_uow());

        let err = service
            .create(
                &admin,
                CreateSubscription {
                    user_id: Uuid::new_v4(),
                    plan_id: Uuid::new_v4(),
                    start_date: None,
                    end_date: None,
                    status: None,
                    auto_renew: None,
                },
            )
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().get("plan_id").is_some());
    }

    #[tokio::test]
    async fn test_cancel_twice_is_bad_request() {
        let admin = requester(UserRole::Admin);
        let premium = plan(PlanType::Premium, "Premium");
        let existing = subscription_for(Uuid::new_v4(), &premium);
        let mut mocks = Mocks::default();
        mocks.subscriptions.expect_find_by_id().returning(move |_| {
            let mut s = existing.clone();
            s.cancel(Utc::now()).unwrap();
            Ok(Some(s))
        });
        let service = SubscriptionManager::new(mocks.into_uow());

        let err = service.cancel(&admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Subscription is already cancelled."));
    }

    #[tokio::test]
    async fn test_cancel_stamps_and_deactivates() {
        let admin = requester(UserRole::Admin);
        let premium = plan(PlanType::Premium, "Premium");
        let existing = subscription_for(Uuid::new_v4(), &premium);
        let mut mocks = Mocks::default();
        mocks
            .subscriptions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks.subscriptions.expect_update().returning(Ok);
        mocks
            .plans
            .expect_find_by_id()
            .returning(move |_| Ok(Some(premium.clone())));
        let service = SubscriptionManager::new(mocks.into_uow());

        let response = service.cancel(&admin, Uuid::new_v4()).await.unwrap();
        assert_eq!(response.status, SubscriptionStatus::Cancelled);
        assert!(!response.is_active);
        assert!(response.cancelled_at.is_some());
        assert_eq!(response.days_remaining, 0);
    }

    #[tokio::test]
    async fn test_no_active_subscription_is_not_found() {
        let user = requester(UserRole::User);
        let mut mocks = Mocks::default();
        mocks
            .subscriptions
            .expect_find_current_active()
            .returning(|_, _| Ok(None));
        let service = SubscriptionManager::new(mocks.into_uow());

        let err = service.my_subscription(&user).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_list_embeds_plans() {
        let user = requester(UserRole::User);
        let owner = user.id;
        let premium = plan(PlanType::Premium, "Premium");
        let rows = vec![subscription_for(owner, &premium), subscription_for(owner, &premium)];
        let mut mocks = Mocks::default();
        mocks
            .subscriptions
            .expect_list()
            .withf(move |user_id, _| *user_id == Some(owner))
            .returning(move |_, _| Ok(Page::new(rows.clone(), 2)));
        mocks
            .plans
            .expect_find_by_ids()
            .withf(|ids| ids.len() == 1)
            .returning(move |_| Ok(vec![premium.clone()]));
        let service = SubscriptionManager::new(mocks.into_uow());

        let page = service.list(&user, PaginationParams::default()).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|s| s.plan.name == "Premium"));
    }
}
