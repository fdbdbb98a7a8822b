//! Operator-run status refresh.
//!
//! Stored statuses are derived on save, so rows nobody touched since their
//! date window moved stay stale until this runs.

use chrono::NaiveDate;

use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Rows changed by one refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusRefresh {
    pub vaccinations: u64,
    pub subscriptions: u64,
}

/// Re-derive vaccination and subscription statuses for `today` in one transaction.
pub async fn refresh_statuses<U: UnitOfWork + ?Sized>(
    uow: &U,
    today: NaiveDate,
) -> AppResult<StatusRefresh> {
    let txn = uow.begin().await?;
    let vaccinations = txn.vaccinations().refresh_statuses(today).await?;
    let subscriptions = txn.subscriptions().refresh_statuses(today).await?;
    txn.commit().await?;

    tracing::info!(vaccinations, subscriptions, %today, "Statuses refreshed");
    Ok(StatusRefresh {
        vaccinations,
        subscriptions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Mocks;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_refresh_runs_both_in_one_transaction() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .vaccinations
            .expect_refresh_statuses()
            .with(eq(today))
            .times(1)
            .returning(|_| Ok(3));
        mocks
            .subscriptions
            .expect_refresh_statuses()
            .with(eq(today))
            .times(1)
            .returning(|_| Ok(1));
        let uow = mocks.into_uow();

        let refreshed = refresh_statuses(uow.as_ref(), today).await.unwrap();
        assert_eq!(
            refreshed,
            StatusRefresh {
                vaccinations: 3,
                subscriptions: 1
            }
        );
        assert_eq!(uow.commits(), 1);
    }
}
