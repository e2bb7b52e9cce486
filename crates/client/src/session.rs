//! Cashback session
//!
//! Holds everything the cashback screen has loaded for one signed-in user and
//! drives settlement requests against the backend.

use std::sync::Arc;

use jiff::civil::Date;
use rewardpang::{
    display::{MonthBucket, group_by_month},
    ledger::{CashbackSnapshot, Ledger, LedgerError},
    settlement::{Eligibility, SettlementError, SettlementFlow, SettlementPolicy},
    settlements::SettlementRecord,
};
use rusty_money::iso;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{AccessToken, ApiError, Profile, RewardpangApi};

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No usable access token was supplied.
    #[error("missing access token")]
    MissingToken,

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A settlement could not be requested.
    #[error(transparent)]
    Settlement(#[from] SettlementError),

    /// The fetched records could not form a ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Loaded cashback state for a signed-in user.
pub struct CashbackSession {
    api: Arc<dyn RewardpangApi>,
    token: AccessToken,
    profile: Profile,
    ledger: Ledger<'static>,
    policy: SettlementPolicy<'static>,
    flow: SettlementFlow<'static>,
}

impl std::fmt::Debug for CashbackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CashbackSession")
            .field("token", &self.token)
            .field("profile", &self.profile)
            .field("ledger", &self.ledger)
            .field("flow", &self.flow)
            .finish_non_exhaustive()
    }
}

impl CashbackSession {
    /// Exchange an authorization code for a token, then load the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the login exchange or any load call fails.
    #[tracing::instrument(name = "session.sign_in", skip(api, authorization_code), err)]
    pub async fn sign_in(
        api: Arc<dyn RewardpangApi>,
        authorization_code: &str,
        referrer: &str,
    ) -> Result<Self, SessionError> {
        let login = api.login(authorization_code, referrer).await?;

        Self::load(api, login.access_token).await
    }

    /// Fetch purchase history, profile and settlement history in parallel.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is blank, any fetch fails, or the
    /// records are not all in won.
    #[tracing::instrument(name = "session.load", skip(api, token), err)]
    pub async fn load(api: Arc<dyn RewardpangApi>, token: AccessToken) -> Result<Self, SessionError> {
        if token.is_blank() {
            return Err(SessionError::MissingToken);
        }

        let (purchases, profile, settlements) = tokio::try_join!(
            api.purchases(&token),
            api.profile(&token),
            api.settlements(&token),
        )?;

        info!(
            purchases = purchases.len(),
            settlements = settlements.len(),
            "loaded cashback records"
        );

        let ledger = Ledger::with_records(purchases, settlements, iso::KRW)?;

        Ok(Self {
            api,
            token,
            profile,
            ledger,
            policy: SettlementPolicy::standard(iso::KRW),
            flow: SettlementFlow::new(),
        })
    }

    /// The signed-in user's profile
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The loaded ledger
    pub fn ledger(&self) -> &Ledger<'static> {
        &self.ledger
    }

    /// State of the most recent settlement request
    pub fn flow(&self) -> &SettlementFlow<'static> {
        &self.flow
    }

    /// Cashback totals as of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if money arithmetic fails.
    pub fn snapshot(&self, today: Date) -> Result<CashbackSnapshot<'static>, SessionError> {
        Ok(self.ledger.snapshot(today)?)
    }

    /// Whether a settlement can be requested as of `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if money arithmetic fails.
    pub fn eligibility(&self, today: Date) -> Result<Eligibility<'static>, SessionError> {
        let snapshot = self.ledger.snapshot(today)?;

        Ok(self
            .policy
            .eligibility(&snapshot, self.profile.bank_account.as_ref())?)
    }

    /// Purchases grouped by month, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if money arithmetic fails.
    pub fn month_buckets(&self) -> Result<Vec<MonthBucket<'static>>, SessionError> {
        Ok(group_by_month(self.ledger.purchases(), self.ledger.currency())?)
    }

    /// Request a settlement of the whole available balance.
    ///
    /// Validation happens before any network call. On success the created
    /// settlement is recorded at the head of the ledger; on failure the ledger
    /// is left as it was. A request left submitting by a cancelled call is
    /// abandoned first, so the user can always retry.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Settlement`]: the balance is below the minimum or no
    ///   bank account is on file.
    /// - [`SessionError::Api`]: the backend rejected the request.
    #[tracing::instrument(name = "session.submit_settlement", skip(self), err)]
    pub async fn submit_settlement(
        &mut self,
        today: Date,
    ) -> Result<SettlementRecord<'static>, SessionError> {
        if self.flow.request().is_some() {
            warn!("previous settlement request was cancelled before the backend answered");

            self.flow.abandon()?;
        }

        self.flow.reset()?;

        let snapshot = self.ledger.snapshot(today)?;

        let request = self
            .flow
            .begin(
                &self.policy,
                &snapshot,
                self.profile.bank_account.as_ref(),
                &self.profile.group_id,
            )?
            .clone();

        let created = match self.api.create_settlement(&self.token, &request).await {
            Ok(created) => created,
            Err(error) => {
                warn!(%error, "settlement request failed");

                self.flow.fail(error.to_string())?;

                return Err(error.into());
            }
        };

        if let Err(error) = self.flow.confirm(created.clone(), &mut self.ledger) {
            self.flow.fail(error.to_string())?;

            return Err(error.into());
        }

        info!(
            settlement_id = %created.id,
            amount = created.amount.to_minor_units(),
            "settlement requested"
        );

        Ok(created)
    }

    /// Re-fetch the settlement history and replace the local list with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; the ledger is left unchanged.
    #[tracing::instrument(name = "session.refresh_settlements", skip(self), err)]
    pub async fn refresh_settlements(&mut self) -> Result<(), SessionError> {
        let settlements = self.api.settlements(&self.token).await?;

        self.ledger.replace_settlements(settlements)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    use jiff::civil::date;
    use rewardpang::{
        purchases::PurchaseRecord,
        settlement::{BankAccount, SettlementRequest},
        settlements::SettlementStatus,
    };
    use rusty_money::Money;
    use testresult::TestResult;
    use tokio::time::timeout;

    use super::*;
    use crate::api::MockRewardpangApi;

    const TODAY: Date = date(2024, 2, 8);

    fn purchase(reward: i64, purchase_date: Date) -> PurchaseRecord<'static> {
        PurchaseRecord::new(
            Money::from_minor(reward, iso::KRW),
            Money::from_minor(reward * 50, iso::KRW),
            purchase_date,
        )
        .with_product_name("Rice Cooker")
    }

    fn profile(bank_account: bool) -> Profile {
        Profile {
            user_id: "user-1".to_string(),
            group_id: "group-1".to_string(),
            bank_account: bank_account.then(|| BankAccount {
                bank_name: "Kookmin".to_string(),
                account_number: "123-45-6789".to_string(),
                account_holder: "Kim".to_string(),
            }),
            referral_link: None,
        }
    }

    fn mock_api(rewards: &'static [(i64, Date)], bank_account: bool) -> MockRewardpangApi {
        let mut api = MockRewardpangApi::new();

        api.expect_purchases().returning(move |_| {
            Ok(rewards
                .iter()
                .map(|&(reward, purchase_date)| purchase(reward, purchase_date))
                .collect())
        });
        api.expect_profile()
            .returning(move |_| Ok(profile(bank_account)));
        api.expect_settlements().returning(|_| Ok(Vec::new()));

        api
    }

    const ELIGIBLE: &[(i64, Date)] = &[(12_000, date(2024, 1, 3)), (3_000, date(2023, 12, 20))];

    #[tokio::test]
    async fn load_builds_snapshot_from_all_three_fetches() -> TestResult {
        let api = mock_api(ELIGIBLE, true);

        let session = CashbackSession::load(Arc::new(api), AccessToken::new("token")).await?;
        let snapshot = session.snapshot(TODAY)?;

        assert_eq!(snapshot.total(), Money::from_minor(15_000, iso::KRW));
        assert_eq!(snapshot.available(), Money::from_minor(15_000, iso::KRW));
        assert_eq!(session.profile().group_id, "group-1");
        assert_eq!(session.month_buckets()?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn blank_token_is_rejected_before_fetching() {
        let api = MockRewardpangApi::new();

        let result = CashbackSession::load(Arc::new(api), AccessToken::new(" ")).await;

        assert!(matches!(result, Err(SessionError::MissingToken)));
    }

    #[tokio::test]
    async fn failed_fetch_fails_load() {
        let mut api = MockRewardpangApi::new();

        api.expect_purchases().returning(|_| {
            Err(ApiError::Status {
                endpoint: "/api/purchases/group",
                status: 500,
                body: String::new(),
            })
        });
        api.expect_profile().returning(|_| Ok(profile(true)));
        api.expect_settlements().returning(|_| Ok(Vec::new()));

        let result = CashbackSession::load(Arc::new(api), AccessToken::new("token")).await;

        assert!(matches!(
            result,
            Err(SessionError::Api(ApiError::Status { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn submit_records_created_settlement_and_drains_balance() -> TestResult {
        let mut api = mock_api(ELIGIBLE, true);

        api.expect_create_settlement()
            .withf(|_, request| {
                request.amount.to_minor_units() == 15_000 && request.user_group_id == "group-1"
            })
            .times(1)
            .returning(|_, request| {
                let mut created =
                    SettlementRecord::new(request.amount, SettlementStatus::Pending, TODAY);
                created.id = "settlement-1".to_string();
                Ok(created)
            });

        let mut session = CashbackSession::load(Arc::new(api), AccessToken::new("token")).await?;

        let created = session.submit_settlement(TODAY).await?;

        assert_eq!(created.id, "settlement-1");
        assert_eq!(session.flow().state(), "confirmed");
        assert_eq!(
            session.ledger().settlements().first().map(|s| s.id.as_str()),
            Some("settlement-1")
        );

        let snapshot = session.snapshot(TODAY)?;
        assert_eq!(snapshot.pending(), Money::from_minor(15_000, iso::KRW));
        assert_eq!(snapshot.available(), Money::from_minor(0, iso::KRW));
        assert!(!session.eligibility(TODAY)?.is_eligible());

        Ok(())
    }

    #[tokio::test]
    async fn missing_bank_account_fails_without_calling_backend() -> TestResult {
        let mut api = mock_api(ELIGIBLE, false);
        api.expect_create_settlement().never();

        let mut session = CashbackSession::load(Arc::new(api), AccessToken::new("token")).await?;

        let result = session.submit_settlement(TODAY).await;

        assert!(matches!(
            result,
            Err(SessionError::Settlement(SettlementError::MissingBankAccount))
        ));
        assert_eq!(session.flow().state(), "idle");

        Ok(())
    }

    #[tokio::test]
    async fn below_minimum_fails_without_calling_backend() -> TestResult {
        const SMALL: &[(i64, Date)] = &[(9_999, date(2024, 1, 3))];

        let mut api = mock_api(SMALL, true);
        api.expect_create_settlement().never();

        let mut session = CashbackSession::load(Arc::new(api), AccessToken::new("token")).await?;

        assert!(matches!(
            session.submit_settlement(TODAY).await,
            Err(SessionError::Settlement(SettlementError::BelowMinimum(9_999, 10_000)))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn backend_failure_leaves_ledger_unchanged() -> TestResult {
        let mut api = mock_api(ELIGIBLE, true);

        api.expect_create_settlement().returning(|_, _| {
            Err(ApiError::Status {
                endpoint: "/api/settlements",
                status: 502,
                body: "bad gateway".to_string(),
            })
        });

        let mut session = CashbackSession::load(Arc::new(api), AccessToken::new("token")).await?;

        let result = session.submit_settlement(TODAY).await;

        assert!(matches!(result, Err(SessionError::Api(_))));
        assert_eq!(session.flow().state(), "failed");
        assert!(session.ledger().settlements().is_empty());
        assert_eq!(
            session.snapshot(TODAY)?.available(),
            Money::from_minor(15_000, iso::KRW)
        );

        Ok(())
    }

    #[tokio::test]
    async fn refresh_replaces_settlements() -> TestResult {
        let mut api = MockRewardpangApi::new();
        let mut settlement_calls = 0;

        api.expect_purchases().returning(|_| {
            Ok(ELIGIBLE
                .iter()
                .map(|&(reward, purchase_date)| purchase(reward, purchase_date))
                .collect())
        });
        api.expect_profile().returning(|_| Ok(profile(true)));
        api.expect_settlements().times(2).returning(move |_| {
            settlement_calls += 1;

            if settlement_calls == 1 {
                return Ok(Vec::new());
            }

            Ok(vec![SettlementRecord::new(
                Money::from_minor(10_000, iso::KRW),
                SettlementStatus::Completed,
                date(2024, 2, 1),
            )])
        });

        let mut session = CashbackSession::load(Arc::new(api), AccessToken::new("token")).await?;
        assert_eq!(session.snapshot(TODAY)?.paid(), Money::from_minor(0, iso::KRW));

        session.refresh_settlements().await?;

        let snapshot = session.snapshot(TODAY)?;
        assert_eq!(snapshot.paid(), Money::from_minor(10_000, iso::KRW));
        assert_eq!(snapshot.available(), Money::from_minor(5_000, iso::KRW));

        Ok(())
    }

    /// Hangs on the first settlement request, then defers to `inner`.
    struct StallingApi {
        inner: MockRewardpangApi,
        stalled: AtomicBool,
    }

    #[async_trait::async_trait]
    impl RewardpangApi for StallingApi {
        async fn login(
            &self,
            authorization_code: &str,
            referrer: &str,
        ) -> Result<crate::api::LoginSession, ApiError> {
            self.inner.login(authorization_code, referrer).await
        }

        async fn purchases(
            &self,
            token: &AccessToken,
        ) -> Result<Vec<PurchaseRecord<'static>>, ApiError> {
            self.inner.purchases(token).await
        }

        async fn profile(&self, token: &AccessToken) -> Result<Profile, ApiError> {
            self.inner.profile(token).await
        }

        async fn settlements(
            &self,
            token: &AccessToken,
        ) -> Result<Vec<SettlementRecord<'static>>, ApiError> {
            self.inner.settlements(token).await
        }

        async fn create_settlement(
            &self,
            token: &AccessToken,
            request: &SettlementRequest<'static>,
        ) -> Result<SettlementRecord<'static>, ApiError> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                return std::future::pending().await;
            }

            self.inner.create_settlement(token, request).await
        }
    }

    #[tokio::test]
    async fn cancelled_submission_can_be_retried() -> TestResult {
        let mut inner = mock_api(ELIGIBLE, true);

        inner
            .expect_create_settlement()
            .times(1)
            .returning(|_, request| {
                let mut created =
                    SettlementRecord::new(request.amount, SettlementStatus::Pending, TODAY);
                created.id = "settlement-2".to_string();
                Ok(created)
            });

        let api = StallingApi {
            inner,
            stalled: AtomicBool::new(false),
        };

        let mut session = CashbackSession::load(Arc::new(api), AccessToken::new("token")).await?;

        let cancelled = timeout(
            Duration::from_millis(20),
            session.submit_settlement(TODAY),
        )
        .await;

        assert!(cancelled.is_err(), "first request should time out");
        assert_eq!(session.flow().state(), "submitting");
        assert!(session.ledger().settlements().is_empty());

        let created = session.submit_settlement(TODAY).await?;

        assert_eq!(created.id, "settlement-2");
        assert_eq!(session.flow().state(), "confirmed");
        assert_eq!(
            session.snapshot(TODAY)?.available(),
            Money::from_minor(0, iso::KRW)
        );

        Ok(())
    }

    #[tokio::test]
    async fn sign_in_loads_with_issued_token() -> TestResult {
        let mut api = mock_api(ELIGIBLE, true);

        api.expect_login()
            .withf(|code, referrer| code == "auth-code" && referrer == "DEFAULT")
            .returning(|_, _| {
                Ok(crate::api::LoginSession {
                    access_token: AccessToken::new("issued"),
                    refresh_token: AccessToken::new("refresh"),
                    user: None,
                })
            });

        let session = CashbackSession::sign_in(Arc::new(api), "auth-code", "DEFAULT").await?;

        assert_eq!(
            session.snapshot(TODAY)?.confirmed(),
            Money::from_minor(15_000, iso::KRW)
        );

        Ok(())
    }
}
