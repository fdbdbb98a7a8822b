//! Subscription plan catalog and per-user subscriptions.
//!
//! A subscription's status is re-derived from its date window on every
//! save. Cancellation is the only transition that sticks.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::access::Owned;
use crate::config::{DEFAULT_PLAN_DURATION_DAYS, DEFAULT_PLAN_MAX_PETS};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::types::patch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    #[default]
    Free,
    Premium,
}

choice_enum!(PlanType { Free => "free", Premium => "premium" });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Expired,
    Cancelled,
}

choice_enum!(SubscriptionStatus {
    Active => "active",
    Expired => "expired",
    Cancelled => "cancelled",
});

/// Subscription plan domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub plan_type: PlanType,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    pub max_pets: i32,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionPlan {
    pub fn new(input: CreatePlan) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            plan_type: input.plan_type,
            name: input.name,
            description: input.description,
            price: input.price.unwrap_or(0.0),
            duration_days: input.duration_days.unwrap_or(DEFAULT_PLAN_DURATION_DAYS),
            max_pets: input.max_pets.unwrap_or(DEFAULT_PLAN_MAX_PETS),
            features: input.features.unwrap_or_default(),
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdatePlan) {
        if let Some(plan_type) = changes.plan_type {
            self.plan_type = plan_type;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        patch::apply(&mut self.description, changes.description);
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(duration_days) = changes.duration_days {
            self.duration_days = duration_days;
        }
        if let Some(max_pets) = changes.max_pets {
            self.max_pets = max_pets;
        }
        if let Some(features) = changes.features {
            self.features = features;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }

    /// Catalog rules. Name and type uniqueness is checked against storage.
    pub fn normalize(&mut self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            errors.add("name", "This field may not be blank.");
        } else if self.name.chars().count() > 100 {
            errors.add("name", "Ensure this field has no more than 100 characters.");
        }

        if !self.price.is_finite() || self.price < 0.0 {
            errors.add("price", "Price cannot be negative.");
        } else {
            self.price = (self.price * 100.0).round() / 100.0;
            if self.plan_type == PlanType::Free && self.price > 0.0 {
                errors.add("price", "Free plan must have price 0.00.");
            }
        }

        if self.duration_days <= 0 {
            errors.add("duration_days", "Duration must be greater than 0.");
        }
        if self.max_pets <= 0 {
            errors.add("max_pets", "Maximum pets must be greater than 0.");
        }

        self.features = std::mem::take(&mut self.features)
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        errors
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePlan {
    pub plan_type: PlanType,
    #[schema(example = "Premium")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 9.99)]
    pub price: Option<f64>,
    #[schema(example = 30)]
    pub duration_days: Option<i32>,
    #[schema(example = 5)]
    pub max_pets: Option<i32>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePlan {
    pub plan_type: Option<PlanType>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub duration_days: Option<i32>,
    pub max_pets: Option<i32>,
    pub features: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl From<CreatePlan> for UpdatePlan {
    fn from(input: CreatePlan) -> Self {
        Self {
            plan_type: Some(input.plan_type),
            name: Some(input.name),
            description: Some(input.description),
            price: Some(input.price.unwrap_or(0.0)),
            duration_days: Some(input.duration_days.unwrap_or(DEFAULT_PLAN_DURATION_DAYS)),
            max_pets: Some(input.max_pets.unwrap_or(DEFAULT_PLAN_MAX_PETS)),
            features: Some(input.features.unwrap_or_default()),
            is_active: Some(input.is_active.unwrap_or(true)),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanResponse {
    pub id: Uuid,
    pub plan_type: PlanType,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_days: i32,
    pub max_pets: i32,
    pub features: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionPlan> for PlanResponse {
    fn from(plan: SubscriptionPlan) -> Self {
        Self {
            id: plan.id,
            plan_type: plan.plan_type,
            name: plan.name,
            description: plan.description,
            price: plan.price,
            duration_days: plan.duration_days,
            max_pets: plan.max_pets,
            features: plan.features,
            is_active: plan.is_active,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

/// A user's subscription to a plan
#[derive(Debug, Clone, PartialEq)]
pub struct UserSubscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub is_active: bool,
    pub auto_renew: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSubscription {
    /// Start defaults to `today`, end to start plus the plan's duration.
    pub fn new(input: CreateSubscription, plan: &SubscriptionPlan, today: NaiveDate) -> Self {
        let now = Utc::now();
        let start_date = input.start_date.unwrap_or(today);
        // a start too late to add the duration to is rejected by `normalize`
        let end_date = input.end_date.unwrap_or_else(|| {
            start_date
                .checked_add_signed(Duration::days(i64::from(plan.duration_days)))
                .unwrap_or(start_date)
        });
        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            plan_id: plan.id,
            start_date,
            end_date,
            status: input.status.unwrap_or_default(),
            is_active: true,
            auto_renew: input.auto_renew.unwrap_or(false),
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update. A cancelled subscription cannot be moved back.
    pub fn apply(&mut self, changes: UpdateSubscription) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if let Some(user_id) = changes.user_id {
            self.user_id = user_id;
        }
        if let Some(plan_id) = changes.plan_id {
            self.plan_id = plan_id;
        }
        if let Some(start_date) = changes.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            self.end_date = end_date;
        }
        if let Some(status) = changes.status {
            if self.status == SubscriptionStatus::Cancelled && status != SubscriptionStatus::Cancelled {
                errors.add("status", "A cancelled subscription cannot be reactivated.");
            } else {
                self.status = status;
            }
        }
        if let Some(auto_renew) = changes.auto_renew {
            self.auto_renew = auto_renew;
        }
        self.updated_at = Utc::now();
        errors
    }

    /// Validate dates, then derive status for `today`.
    pub fn normalize(&mut self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.end_date <= self.start_date {
            errors.add("end_date", "End date must be after start date.");
        }
        if self.start_date > today {
            errors.add("start_date", "Start date cannot be in the future.");
        }
        if errors.is_empty() {
            self.derive_status(today, Utc::now());
        }
        errors
    }

    /// Status rules applied on every save.
    pub fn derive_status(&mut self, today: NaiveDate, now: DateTime<Utc>) {
        if self.status == SubscriptionStatus::Cancelled {
            self.is_active = false;
            if self.cancelled_at.is_none() {
                self.cancelled_at = Some(now);
            }
            return;
        }

        let in_window = self.start_date <= today && today <= self.end_date;
        self.status = if in_window {
            SubscriptionStatus::Active
        } else {
            SubscriptionStatus::Expired
        };
        self.is_active = in_window;
    }

    /// One-way cancellation.
    ///
    /// # Errors
    /// `BadRequest` when the subscription is already cancelled.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.status == SubscriptionStatus::Cancelled {
            return Err(AppError::bad_request("Subscription is already cancelled."));
        }
        self.status = SubscriptionStatus::Cancelled;
        self.is_active = false;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn is_currently_active(&self, today: NaiveDate) -> bool {
        self.status == SubscriptionStatus::Active
            && self.is_active
            && self.start_date <= today
            && today <= self.end_date
    }

    /// Whole days left in the window, zero unless active.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        if self.status == SubscriptionStatus::Active && self.is_active {
            (self.end_date - today).num_days().max(0)
        } else {
            0
        }
    }
}

impl Owned for UserSubscription {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSubscription {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SubscriptionStatus>,
    pub auto_renew: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSubscription {
    pub user_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SubscriptionStatus>,
    pub auto_renew: Option<bool>,
}

impl From<CreateSubscription> for UpdateSubscription {
    fn from(input: CreateSubscription) -> Self {
        Self {
            user_id: Some(input.user_id),
            plan_id: Some(input.plan_id),
            start_date: input.start_date,
            end_date: input.end_date,
            status: input.status,
            auto_renew: input.auto_renew,
        }
    }
}

/// Subscription response with the plan embedded
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: PlanResponse,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub is_active: bool,
    pub is_currently_active: bool,
    pub days_remaining: i64,
    pub auto_renew: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionResponse {
    pub fn new(subscription: UserSubscription, plan: SubscriptionPlan, today: NaiveDate) -> Self {
        Self {
            is_currently_active: subscription.is_currently_active(today),
            days_remaining: subscription.days_remaining(today),
            id: subscription.id,
            user_id: subscription.user_id,
            plan: plan.into(),
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            status: subscription.status,
            is_active: subscription.is_active,
            auto_renew: subscription.auto_renew,
            cancelled_at: subscription.cancelled_at,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn plan(plan_type: PlanType, price: f64) -> SubscriptionPlan {
        SubscriptionPlan::new(CreatePlan {
            plan_type,
            name: "Premium".into(),
            description: None,
            price: Some(price),
            duration_days: None,
            max_pets: None,
            features: Some(vec!["Unlimited records".into(), "  ".into()]),
            is_active: None,
        })
    }

    fn subscription(start: NaiveDate, end: Option<NaiveDate>, today: NaiveDate) -> UserSubscription {
        UserSubscription::new(
            CreateSubscription {
                user_id: Uuid::new_v4(),
                plan_id: Uuid::new_v4(),
                start_date: Some(start),
                end_date: end,
                status: None,
                auto_renew: None,
            },
            &plan(PlanType::Premium, 9.99),
            today,
        )
    }

    #[test]
    fn test_start_at_end_of_calendar_is_a_field_error() {
        let today = day(2024, 5, 10);
        let mut s = subscription(NaiveDate::MAX, None, today);
        let errors = s.normalize(today);
        assert_eq!(errors.get("start_date").unwrap()[0], "Start date cannot be in the future.");
        assert!(errors.get("end_date").is_some());
    }

    #[test]
    fn test_plan_defaults() {
        let mut p = plan(PlanType::Premium, 9.999);
        assert!(p.normalize().is_empty());
        assert_eq!(p.duration_days, 30);
        assert_eq!(p.max_pets, 1);
        assert_eq!(p.price, 10.0);
        assert_eq!(p.features, vec!["Unlimited records".to_string()]);
    }

    #[test]
    fn test_free_plan_must_cost_nothing() {
        let mut p = plan(PlanType::Free, 1.0);
        assert_eq!(p.normalize().get("price").unwrap()[0], "Free plan must have price 0.00.");
    }

    #[test]
    fn test_plan_counts_must_be_positive() {
        let mut p = plan(PlanType::Premium, 5.0);
        p.duration_days = 0;
        p.max_pets = -1;
        let errors = p.normalize();
        assert_eq!(errors.get("duration_days").unwrap()[0], "Duration must be greater than 0.");
        assert_eq!(errors.get("max_pets").unwrap()[0], "Maximum pets must be greater than 0.");
    }

    #[test]
    fn test_end_date_defaults_to_plan_duration() {
        let today = day(2024, 5, 10);
        let s = subscription(today, None, today);
        assert_eq!(s.end_date, day(2024, 6, 9));
    }

    #[test]
    fn test_in_window_is_active() {
        let today = day(2024, 5, 10);
        let mut s = subscription(day(2024, 5, 1), Some(day(2024, 5, 31)), today);
        assert!(s.normalize(today).is_empty());
        assert_eq!(s.status, SubscriptionStatus::Active);
        assert!(s.is_active);
        assert!(s.is_currently_active(today));
        assert_eq!(s.days_remaining(today), 21);
    }

    #[test]
    fn test_outside_window_is_expired() {
        let today = day(2024, 5, 10);
        let mut s = subscription(day(2024, 3, 1), Some(day(2024, 4, 1)), today);
        assert!(s.normalize(today).is_empty());
        assert_eq!(s.status, SubscriptionStatus::Expired);
        assert!(!s.is_active);
        assert_eq!(s.days_remaining(today), 0);
    }

    #[test]
    fn test_date_rules() {
        let today = day(2024, 5, 10);
        let mut inverted = subscription(day(2024, 5, 1), Some(day(2024, 5, 1)), today);
        assert_eq!(
            inverted.normalize(today).get("end_date").unwrap()[0],
            "End date must be after start date."
        );

        let mut future = subscription(day(2024, 6, 1), None, today);
        assert_eq!(
            future.normalize(today).get("start_date").unwrap()[0],
            "Start date cannot be in the future."
        );
    }

    #[test]
    fn test_cancel_is_one_way() {
        let today = day(2024, 5, 10);
        let mut s = subscription(day(2024, 5, 1), None, today);
        s.normalize(today);

        s.cancel(Utc::now()).unwrap();
        assert_eq!(s.status, SubscriptionStatus::Cancelled);
        assert!(!s.is_active);
        assert!(s.cancelled_at.is_some());

        let err = s.cancel(Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Subscription is already cancelled.");

        // Re-deriving keeps it cancelled even inside the window
        s.normalize(today);
        assert_eq!(s.status, SubscriptionStatus::Cancelled);
        assert!(!s.is_currently_active(today));

        let errors = s.apply(UpdateSubscription {
            status: Some(SubscriptionStatus::Active),
            ..Default::default()
        });
        assert!(errors.get("status").is_some());
    }

    #[test]
    fn test_cancelled_via_update_is_stamped() {
        let today = day(2024, 5, 10);
        let mut s = subscription(day(2024, 5, 1), None, today);
        s.apply(UpdateSubscription {
            status: Some(SubscriptionStatus::Cancelled),
            ..Default::default()
        });
        assert!(s.normalize(today).is_empty());
        assert!(s.cancelled_at.is_some());
        assert!(!s.is_active);
    }
}
