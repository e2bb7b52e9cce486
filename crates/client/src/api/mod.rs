//! Rewardpang backend API

use async_trait::async_trait;
use mockall::automock;
use rewardpang::{
    purchases::PurchaseRecord, settlement::SettlementRequest, settlements::SettlementRecord,
};

pub mod client;
pub mod errors;
pub mod models;
pub mod token;

pub use client::HttpRewardpangApi;
pub use errors::ApiError;
pub use models::{LoginSession, Profile, ReferralLink, RewardpangUser};
pub use token::AccessToken;

/// Calls the cashback screen makes against the backend.
#[automock]
#[async_trait]
pub trait RewardpangApi: Send + Sync {
    /// Exchange a one-time authorization code for a session.
    async fn login(
        &self,
        authorization_code: &str,
        referrer: &str,
    ) -> Result<LoginSession, ApiError>;

    /// Purchase history for the signed-in user's group.
    async fn purchases(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<PurchaseRecord<'static>>, ApiError>;

    /// The signed-in user's profile, bank account and referral link.
    async fn profile(&self, token: &AccessToken) -> Result<Profile, ApiError>;

    /// Settlement history for the signed-in user's group, newest first.
    async fn settlements(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<SettlementRecord<'static>>, ApiError>;

    /// Submit a settlement request and return the created record.
    async fn create_settlement(
        &self,
        token: &AccessToken,
        request: &SettlementRequest<'static>,
    ) -> Result<SettlementRecord<'static>, ApiError>;
}
