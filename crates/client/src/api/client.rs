//! HTTP implementation of [`RewardpangApi`].

use async_trait::async_trait;
use jiff::tz::TimeZone;
use reqwest::{Client, RequestBuilder};
use rewardpang::{
    purchases::PurchaseRecord, settlement::SettlementRequest, settlements::SettlementRecord,
};
use rusty_money::iso::{self, Currency};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    api::{
        RewardpangApi,
        errors::ApiError,
        models::{
            CreateSettlementBody, CreatedSettlementData, Envelope, LOGIN_ENDPOINT, LoginRequest,
            LoginResponse, LoginSession, PROFILE_ENDPOINT, PURCHASES_ENDPOINT, Profile,
            ProfileResponse, PurchasesData, SETTLEMENTS_ENDPOINT, SettlementsData,
        },
        token::AccessToken,
    },
    config::ApiConfig,
};

/// Backend client over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpRewardpangApi {
    config: ApiConfig,
    http: Client,
    time_zone: TimeZone,
    currency: &'static Currency,
}

impl HttpRewardpangApi {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the UTC offset is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        let time_zone = config.time_zone()?;

        Ok(Self {
            config,
            http,
            time_zone,
            currency: iso::KRW,
        })
    }

    /// Configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn get(&self, endpoint: &str, token: &AccessToken) -> RequestBuilder {
        self.http
            .get(self.config.url(endpoint))
            .bearer_auth(token.expose())
    }

    async fn send<T: DeserializeOwned>(
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(endpoint, bytes = text.len(), "received response");

        serde_json::from_str(&text).map_err(|error| ApiError::malformed(endpoint, error.to_string()))
    }
}

#[async_trait]
impl RewardpangApi for HttpRewardpangApi {
    #[tracing::instrument(name = "api.login", skip(self, authorization_code), err)]
    async fn login(
        &self,
        authorization_code: &str,
        referrer: &str,
    ) -> Result<LoginSession, ApiError> {
        let body = LoginRequest {
            authorization_code,
            referrer,
        };

        let response: LoginResponse = Self::send(
            LOGIN_ENDPOINT,
            self.http.post(self.config.url(LOGIN_ENDPOINT)).json(&body),
        )
        .await?;

        response.into_session()
    }

    #[tracing::instrument(name = "api.purchases", skip(self, token), err)]
    async fn purchases(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<PurchaseRecord<'static>>, ApiError> {
        let envelope: Envelope<PurchasesData> =
            Self::send(PURCHASES_ENDPOINT, self.get(PURCHASES_ENDPOINT, token)).await?;

        envelope
            .into_data(PURCHASES_ENDPOINT)?
            .purchases
            .into_iter()
            .map(|purchase| purchase.into_record(self.currency, &self.time_zone))
            .collect()
    }

    #[tracing::instrument(name = "api.profile", skip(self, token), err)]
    async fn profile(&self, token: &AccessToken) -> Result<Profile, ApiError> {
        let response: ProfileResponse =
            Self::send(PROFILE_ENDPOINT, self.get(PROFILE_ENDPOINT, token)).await?;

        response.into_profile()
    }

    #[tracing::instrument(name = "api.settlements", skip(self, token), err)]
    async fn settlements(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<SettlementRecord<'static>>, ApiError> {
        let envelope: Envelope<SettlementsData> =
            Self::send(SETTLEMENTS_ENDPOINT, self.get(SETTLEMENTS_ENDPOINT, token)).await?;

        envelope
            .into_data(SETTLEMENTS_ENDPOINT)?
            .settlements
            .into_iter()
            .map(|settlement| {
                settlement.into_record(SETTLEMENTS_ENDPOINT, self.currency, &self.time_zone)
            })
            .collect()
    }

    #[tracing::instrument(
        name = "api.create_settlement",
        skip(self, token, request),
        fields(amount = request.amount.to_minor_units()),
        err
    )]
    async fn create_settlement(
        &self,
        token: &AccessToken,
        request: &SettlementRequest<'static>,
    ) -> Result<SettlementRecord<'static>, ApiError> {
        let body = CreateSettlementBody::from(request);

        let envelope: Envelope<CreatedSettlementData> = Self::send(
            SETTLEMENTS_ENDPOINT,
            self.http
                .post(self.config.url(SETTLEMENTS_ENDPOINT))
                .bearer_auth(token.expose())
                .json(&body),
        )
        .await?;

        envelope
            .into_data(SETTLEMENTS_ENDPOINT)?
            .settlement
            .into_record(SETTLEMENTS_ENDPOINT, self.currency, &self.time_zone)
    }
}
