//! Wire models
//!
//! Response and request bodies as the backend sends and expects them, and
//! their conversion into ledger records. Amounts are whole won.

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use rewardpang::{
    purchases::{Buyer, PurchaseRecord},
    settlement::{BankAccount, SettlementRequest},
    settlements::{SettlementRecord, SettlementStatus},
};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::api::{errors::ApiError, token::AccessToken};

/// Tokens and user returned by a successful login exchange.
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// Bearer token for subsequent calls
    pub access_token: AccessToken,

    /// Token for renewing the session
    pub refresh_token: AccessToken,

    /// The signed-in user, when the backend linked one
    pub user: Option<RewardpangUser>,
}

/// A Rewardpang user account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewardpangUser {
    /// User identifier
    pub id: String,

    /// Group the user's purchases and cashback belong to
    pub group_id: String,

    /// Phone number
    #[serde(default)]
    pub phone: String,

    /// Email address
    #[serde(default)]
    pub email: String,
}

/// Referral link assigned to the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferralLink {
    /// Link identifier
    pub id: String,

    /// Shareable URL
    #[serde(rename = "link_url")]
    pub url: String,

    /// Short code
    #[serde(rename = "link_code")]
    pub code: String,

    /// Title of the video the link is attached to
    #[serde(default)]
    pub video_title: String,
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// User identifier
    pub user_id: String,

    /// Group the user's purchases and cashback belong to
    pub group_id: String,

    /// Payout account, if one is on file
    pub bank_account: Option<BankAccount>,

    /// Referral link, if one is assigned
    pub referral_link: Option<ReferralLink>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'r> {
    pub authorization_code: &'r str,
    pub referrer: &'r str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub success: bool,

    #[serde(default)]
    pub rewardpang_user: Option<RewardpangUser>,

    #[serde(default)]
    pub rewardpang_session: Option<SessionTokens>,

    #[serde(default)]
    pub rewardpang_error: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionTokens {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,
}

impl LoginResponse {
    pub(crate) fn into_session(self) -> Result<LoginSession, ApiError> {
        if !self.success {
            return Err(ApiError::Login(
                self.error.unwrap_or_else(|| "login rejected".to_string()),
            ));
        }

        let tokens = self.rewardpang_session.ok_or_else(|| {
            ApiError::Login(
                self.rewardpang_error
                    .unwrap_or_else(|| "no session issued".to_string()),
            )
        })?;

        Ok(LoginSession {
            access_token: AccessToken::new(tokens.access_token),
            refresh_token: AccessToken::new(tokens.refresh_token),
            user: self.rewardpang_user,
        })
    }
}

/// `{ success, data }` wrapper used by most endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,

    #[serde(default = "Option::default")]
    pub data: Option<T>,

    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub(crate) fn into_data(self, endpoint: &'static str) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::malformed(
                endpoint,
                self.error.unwrap_or_else(|| "success was false".to_string()),
            ));
        }

        self.data
            .ok_or_else(|| ApiError::malformed(endpoint, "missing data"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PurchasesData {
    pub purchases: Vec<PurchaseDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SettlementsData {
    pub settlements: Vec<SettlementDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedSettlementData {
    pub settlement: SettlementDto,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BuyerDto {
    Label(String),
    Member {
        id: String,
        #[serde(default)]
        phone: String,
        #[serde(rename = "isMe", default)]
        is_me: bool,
    },
}

impl From<BuyerDto> for Buyer {
    fn from(buyer: BuyerDto) -> Self {
        match buyer {
            BuyerDto::Label(label) => Buyer::Anonymous(label),
            BuyerDto::Member { id, phone, is_me } => Buyer::Member { id, phone, is_me },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PurchaseDto {
    pub id: String,

    #[serde(default)]
    pub order_id: String,

    #[serde(default)]
    pub product_name: String,

    pub purchase_amount: i64,

    pub reward_amount: i64,

    pub purchase_date: String,

    #[serde(default = "default_exact")]
    pub exact_purchase_date: bool,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub buyer: Option<BuyerDto>,
}

const fn default_exact() -> bool {
    true
}

impl PurchaseDto {
    pub(crate) fn into_record(
        self,
        currency: &'static Currency,
        time_zone: &TimeZone,
    ) -> Result<PurchaseRecord<'static>, ApiError> {
        let purchase_date = parse_date(&self.purchase_date, time_zone)
            .ok_or_else(|| invalid_date(PURCHASES_ENDPOINT, "purchase_date", &self.purchase_date))?;

        Ok(PurchaseRecord {
            id: self.id,
            order_id: self.order_id,
            product_name: self.product_name,
            purchase_amount: Money::from_minor(self.purchase_amount, currency),
            reward: Money::from_minor(self.reward_amount, currency),
            purchase_date,
            exact_purchase_date: self.exact_purchase_date,
            status: self.status,
            buyer: self.buyer.map(Buyer::from),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SettlementDto {
    pub id: String,

    #[serde(default)]
    pub user_group_id: String,

    pub amount: i64,

    #[serde(default)]
    pub settlement_amount: Option<i64>,

    #[serde(default)]
    pub bank_account_number: String,

    pub status: SettlementStatus,

    pub application_date: String,

    #[serde(default)]
    pub settlement_date: Option<String>,
}

impl SettlementDto {
    pub(crate) fn into_record(
        self,
        endpoint: &'static str,
        currency: &'static Currency,
        time_zone: &TimeZone,
    ) -> Result<SettlementRecord<'static>, ApiError> {
        let application_date = parse_date(&self.application_date, time_zone)
            .ok_or_else(|| invalid_date(endpoint, "application_date", &self.application_date))?;

        let settlement_date = self
            .settlement_date
            .map(|value| {
                parse_date(&value, time_zone)
                    .ok_or_else(|| invalid_date(endpoint, "settlement_date", &value))
            })
            .transpose()?;

        Ok(SettlementRecord {
            id: self.id,
            user_group_id: self.user_group_id,
            amount: Money::from_minor(self.amount, currency),
            settlement_amount: Money::from_minor(
                self.settlement_amount.unwrap_or(self.amount),
                currency,
            ),
            bank_account_number: self.bank_account_number,
            status: self.status,
            application_date,
            settlement_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    pub success: bool,

    pub user: ProfileUser,

    #[serde(rename = "bankAccount", default)]
    pub bank_account: Option<BankAccountDto>,

    #[serde(rename = "coupangLink", default)]
    pub referral_link: Option<ReferralLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileUser {
    pub id: String,
    pub group_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BankAccountDto {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

impl ProfileResponse {
    pub(crate) fn into_profile(self) -> Result<Profile, ApiError> {
        if !self.success {
            return Err(ApiError::malformed(PROFILE_ENDPOINT, "success was false"));
        }

        Ok(Profile {
            user_id: self.user.id,
            group_id: self.user.group_id,
            bank_account: self.bank_account.map(|account| BankAccount {
                bank_name: account.bank_name,
                account_number: account.account_number,
                account_holder: account.account_holder,
            }),
            referral_link: self.referral_link,
        })
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct CreateSettlementBody<'r> {
    pub amount: i64,
    pub bank_name: &'r str,
    pub account_number: &'r str,
    pub account_holder: &'r str,
    pub user_group_id: &'r str,
}

impl<'r> From<&'r SettlementRequest<'_>> for CreateSettlementBody<'r> {
    fn from(request: &'r SettlementRequest<'_>) -> Self {
        Self {
            amount: request.amount.to_minor_units(),
            bank_name: &request.bank_name,
            account_number: &request.account_number,
            account_holder: &request.account_holder,
            user_group_id: &request.user_group_id,
        }
    }
}

pub(crate) const LOGIN_ENDPOINT: &str = "/api/toss/login-me";
pub(crate) const PURCHASES_ENDPOINT: &str = "/api/purchases/group";
pub(crate) const PROFILE_ENDPOINT: &str = "/api/user/profile";
pub(crate) const SETTLEMENTS_ENDPOINT: &str = "/api/settlements";

/// Parse a calendar date or a timestamp, reading timestamps in `time_zone`.
pub(crate) fn parse_date(value: &str, time_zone: &TimeZone) -> Option<Date> {
    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Some(timestamp.to_zoned(time_zone.clone()).date());
    }

    value.parse::<Date>().ok()
}

fn invalid_date(endpoint: &'static str, field: &str, value: &str) -> ApiError {
    ApiError::malformed(endpoint, format!("invalid {field}: {value:?}"))
}
