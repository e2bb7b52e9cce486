//! Settlement Flow
//!
//! A single settlement request moves `Idle → Submitting → Confirmed | Failed`.
//! A request abandoned mid-flight also ends as `Failed`.
//! Only a validated request can be submitted, and only a confirmation touches
//! the ledger: the created settlement is recorded at the head of the list so
//! the next snapshot reflects the reduced available balance.

use crate::{
    ledger::{CashbackSnapshot, Ledger},
    settlement::{BankAccount, SettlementError, SettlementPolicy, SettlementRequest},
    settlements::SettlementRecord,
};

/// Failure reason recorded by [`SettlementFlow::abandon`].
pub const ABANDONED: &str = "abandoned before the backend answered";

/// State of a single settlement request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SettlementFlow<'a> {
    /// Nothing has been submitted.
    #[default]
    Idle,

    /// A validated request is awaiting the backend.
    Submitting(SettlementRequest<'a>),

    /// The backend created the settlement and it was recorded locally.
    Confirmed(SettlementRecord<'a>),

    /// The backend call failed; nothing was recorded.
    Failed(String),
}

impl<'a> SettlementFlow<'a> {
    /// Create an idle flow.
    #[must_use]
    pub const fn new() -> Self {
        Self::Idle
    }

    /// Name of the current state.
    #[must_use]
    pub const fn state(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting(_) => "submitting",
            Self::Confirmed(_) => "confirmed",
            Self::Failed(_) => "failed",
        }
    }

    /// Validate a request for the whole available balance and start submitting it.
    ///
    /// On a validation error the flow stays idle.
    ///
    /// # Errors
    ///
    /// - [`SettlementError::InvalidTransition`]: the flow is not idle.
    /// - Any validation error from [`SettlementPolicy::request`].
    pub fn begin(
        &mut self,
        policy: &SettlementPolicy<'a>,
        snapshot: &CashbackSnapshot<'a>,
        bank_account: Option<&BankAccount>,
        user_group_id: &str,
    ) -> Result<&SettlementRequest<'a>, SettlementError> {
        if !matches!(self, Self::Idle) {
            return Err(self.invalid("begin"));
        }

        let request = policy.request(snapshot, bank_account, user_group_id)?;

        *self = Self::Submitting(request);

        self.request().ok_or(SettlementError::InvalidTransition {
            state: "idle",
            action: "begin",
        })
    }

    /// Apply the backend's created settlement to the ledger.
    ///
    /// # Errors
    ///
    /// - [`SettlementError::InvalidTransition`]: nothing is being submitted.
    /// - [`SettlementError::Ledger`]: the settlement could not be recorded; the
    ///   flow keeps submitting.
    pub fn confirm(
        &mut self,
        created: SettlementRecord<'a>,
        ledger: &mut Ledger<'a>,
    ) -> Result<(), SettlementError> {
        if !matches!(self, Self::Submitting(_)) {
            return Err(self.invalid("confirm"));
        }

        ledger.record_settlement(created.clone())?;

        *self = Self::Confirmed(created);

        Ok(())
    }

    /// Record that the backend call failed. The ledger is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidTransition`] if nothing is being submitted.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), SettlementError> {
        if !matches!(self, Self::Submitting(_)) {
            return Err(self.invalid("fail"));
        }

        *self = Self::Failed(reason.into());

        Ok(())
    }

    /// Give up on a request whose backend call will never be answered, such as
    /// one whose caller was cancelled. The ledger is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidTransition`] if nothing is being submitted.
    pub fn abandon(&mut self) -> Result<(), SettlementError> {
        if !matches!(self, Self::Submitting(_)) {
            return Err(self.invalid("abandon"));
        }

        *self = Self::Failed(ABANDONED.to_string());

        Ok(())
    }

    /// Return to idle after a confirmation or failure, ready for another request.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidTransition`] while a request is being submitted.
    pub fn reset(&mut self) -> Result<(), SettlementError> {
        if matches!(self, Self::Submitting(_)) {
            return Err(self.invalid("reset"));
        }

        *self = Self::Idle;

        Ok(())
    }

    /// The request being submitted, if any.
    pub fn request(&self) -> Option<&SettlementRequest<'a>> {
        match self {
            Self::Submitting(request) => Some(request),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> SettlementError {
        SettlementError::InvalidTransition {
            state: self.state(),
            action,
        }
    }
}
