//! Quote wizard state machine.
//!
//! The wizard walks the customer through four ordered steps, gating each
//! forward move on the step's checks, then validates the whole form and hands
//! it to the [`SubmissionGateway`]. Submission is single-flight: `submit`
//! borrows the controller mutably for the whole flight, and the
//! [`WizardState::Submitting`] state rejects edits and repeat submissions
//! until the flight resolves or is cancelled.

use std::fmt;

use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{QuoteError, Result};
use crate::pricing::{compute_breakdown, PricingBreakdown};
use crate::storage::KeyValueStore;

use super::models::{
    CleaningType, CustomerField, DetailsField, LocationField, QuoteDraft, RoomType, Urgency,
    WizardStep,
};
use super::store::{DraftListener, QuoteDraftStore};
use super::submission::{SubmissionError, SubmissionGateway, SubmissionPayload, SubmissionReceipt};
use super::validation::{sanitize, validate_quote_form, validate_step, FieldErrors};

/// Terminal result of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmissionOutcome {
    #[serde(rename_all = "camelCase")]
    Success { quote_id: String },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "camelCase")]
pub enum WizardState {
    Editing(WizardStep),
    Submitting,
    Submitted(SubmissionOutcome),
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardState::Editing(step) => write!(f, "editing {}", step),
            WizardState::Submitting => f.write_str("submitting"),
            WizardState::Submitted(SubmissionOutcome::Success { .. }) => f.write_str("submitted"),
            WizardState::Submitted(SubmissionOutcome::Error { .. }) => {
                f.write_str("submission failed")
            }
        }
    }
}

/// Whether the draft satisfies the checks for leaving `step`.
pub fn can_advance(step: WizardStep, draft: &QuoteDraft) -> bool {
    validate_step(step, draft).is_empty()
}

pub struct WizardController<S: KeyValueStore, G: SubmissionGateway> {
    store: QuoteDraftStore<S>,
    gateway: G,
    state: WizardState,
    errors: FieldErrors,
    cancel: CancellationToken,
}

impl<S: KeyValueStore, G: SubmissionGateway> WizardController<S, G> {
    /// Start at the first step with the persisted draft, if one exists.
    pub fn new(mut store: QuoteDraftStore<S>, gateway: G) -> Self {
        store.initialize();
        Self {
            store,
            gateway,
            state: WizardState::Editing(WizardStep::ServiceSelection),
            errors: FieldErrors::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Step being edited, or the final step once submission has started.
    pub fn current_step(&self) -> WizardStep {
        match self.state {
            WizardState::Editing(step) => step,
            WizardState::Submitting | WizardState::Submitted(_) => WizardStep::ContactInfo,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state == WizardState::Submitting
    }

    pub fn draft(&self) -> &QuoteDraft {
        self.store.draft()
    }

    pub fn breakdown(&self) -> &PricingBreakdown {
        self.store.breakdown()
    }

    pub fn store(&self) -> &QuoteDraftStore<S> {
        &self.store
    }

    /// Messages from the most recent blocked transition or submission.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn subscribe(&mut self, listener: DraftListener) {
        self.store.subscribe(listener);
    }

    /// Token that aborts an in-flight submission when cancelled, e.g. when
    /// the customer navigates away.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn can_advance(&self) -> bool {
        match self.state {
            WizardState::Editing(step) => can_advance(step, self.store.draft()),
            _ => false,
        }
    }

    /// Move to the following step if the current one is complete.
    pub fn next(&mut self) -> Result<WizardStep> {
        let step = match self.state {
            WizardState::Editing(step) => step,
            _ => return Err(self.transition_error("advance")),
        };
        let Some(next) = step.next() else {
            return Err(self.transition_error("advance past the final step"));
        };

        let errors = validate_step(step, self.store.draft());
        if !errors.is_empty() {
            debug!(step = %step, errors = %errors, "Wizard step blocked");
            self.errors = errors.clone();
            return Err(QuoteError::StepIncomplete { step, errors });
        }

        self.errors = FieldErrors::new();
        self.state = WizardState::Editing(next);
        debug!(step = %next, "Wizard advanced");
        Ok(next)
    }

    /// Move to the previous step. Never touches the draft.
    pub fn back(&mut self) -> Result<WizardStep> {
        let target = match &self.state {
            WizardState::Editing(step) => step.previous().unwrap_or(*step),
            WizardState::Submitted(SubmissionOutcome::Error { .. }) => WizardStep::ContactInfo,
            WizardState::Submitting => return Err(QuoteError::SubmissionInFlight),
            WizardState::Submitted(SubmissionOutcome::Success { .. }) => {
                return Err(QuoteError::Locked)
            }
        };
        self.errors = FieldErrors::new();
        self.state = WizardState::Editing(target);
        Ok(target)
    }

    /// Jump back to `step`; only earlier (or the current) steps are allowed.
    pub fn go_to(&mut self, step: WizardStep) -> Result<WizardStep> {
        self.ensure_editable()?;
        if step > self.current_step() {
            return Err(self.transition_error("skip ahead"));
        }
        self.errors = FieldErrors::new();
        self.state = WizardState::Editing(step);
        Ok(step)
    }

    pub fn set_cleaning_type(&mut self, cleaning_type: CleaningType) -> Result<()> {
        self.ensure_editable()?;
        self.store.set_cleaning_type(cleaning_type);
        Ok(())
    }

    pub fn set_room_count(&mut self, room: RoomType, count: i64) -> Result<()> {
        self.ensure_editable()?;
        self.store.set_room_count(room, count);
        Ok(())
    }

    pub fn adjust_room_count(&mut self, room: RoomType, delta: i64) -> Result<()> {
        self.ensure_editable()?;
        self.store.adjust_room_count(room, delta);
        Ok(())
    }

    /// Returns whether the extra is selected afterwards.
    pub fn toggle_extra(&mut self, id: &str) -> Result<bool> {
        self.ensure_editable()?;
        Ok(self.store.toggle_extra(id))
    }

    pub fn set_urgency(&mut self, urgency: Urgency) -> Result<()> {
        self.ensure_editable()?;
        self.store.set_urgency(urgency);
        Ok(())
    }

    pub fn set_customer_field(&mut self, field: CustomerField, value: impl Into<String>) -> Result<()> {
        self.ensure_editable()?;
        self.store.set_customer_field(field, value);
        Ok(())
    }

    pub fn set_ndis_participant(&mut self, participant: bool) -> Result<()> {
        self.ensure_editable()?;
        self.store.set_ndis_participant(participant);
        Ok(())
    }

    pub fn set_location_field(&mut self, field: LocationField, value: impl Into<String>) -> Result<()> {
        self.ensure_editable()?;
        self.store.set_location_field(field, value);
        Ok(())
    }

    pub fn set_details_field(&mut self, field: DetailsField, value: impl Into<String>) -> Result<()> {
        self.ensure_editable()?;
        self.store.set_details_field(field, value);
        Ok(())
    }

    /// Validate the whole form and send it.
    ///
    /// Allowed from the final step or after a failed submission. Invalid
    /// forms keep the wizard on the final step with per-field messages. On
    /// success the draft is cleared; on failure it is kept for a retry.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt> {
        match &self.state {
            WizardState::Editing(WizardStep::ContactInfo)
            | WizardState::Submitted(SubmissionOutcome::Error { .. }) => {}
            WizardState::Submitting => return Err(QuoteError::SubmissionInFlight),
            WizardState::Submitted(SubmissionOutcome::Success { .. }) => {
                return Err(QuoteError::Locked)
            }
            WizardState::Editing(_) => return Err(self.transition_error("submit")),
        }

        let draft = sanitize(self.store.draft());
        let errors = validate_quote_form(&draft);
        if !errors.is_empty() {
            debug!(errors = %errors, "Quote form invalid");
            self.errors = errors.clone();
            self.state = WizardState::Editing(WizardStep::ContactInfo);
            return Err(QuoteError::Validation(errors));
        }
        self.errors = FieldErrors::new();

        let pricing = compute_breakdown(self.store.catalog(), &draft);
        let payload = SubmissionPayload {
            draft,
            pricing,
            timestamp: Utc::now(),
        };

        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        let cancel = self.cancel.clone();
        self.state = WizardState::Submitting;

        let result = tokio::select! {
            result = self.gateway.submit(&payload) => result,
            _ = cancel.cancelled() => Err(SubmissionError::Cancelled),
        };

        match result {
            Ok(receipt) => {
                info!(quote_id = %receipt.quote_id, total = %payload.pricing.total, "Quote submitted");
                self.store.reset();
                self.state = WizardState::Submitted(SubmissionOutcome::Success {
                    quote_id: receipt.quote_id.clone(),
                });
                Ok(receipt)
            }
            Err(SubmissionError::Cancelled) => {
                info!("Quote submission cancelled");
                self.cancel = CancellationToken::new();
                self.state = WizardState::Editing(WizardStep::ContactInfo);
                Err(QuoteError::Submission(SubmissionError::Cancelled))
            }
            Err(e) => {
                error!(error = %e, "Quote submission failed");
                self.state = WizardState::Submitted(SubmissionOutcome::Error {
                    message: e.user_message().to_string(),
                });
                Err(QuoteError::Submission(e))
            }
        }
    }

    /// Abandon a submission that is still marked in flight. Returns whether
    /// there was one.
    pub fn cancel_submission(&mut self) -> bool {
        if self.state != WizardState::Submitting {
            return false;
        }
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.state = WizardState::Editing(WizardStep::ContactInfo);
        true
    }

    /// Discard the draft and start over from the first step.
    pub fn reset(&mut self) {
        if self.state == WizardState::Submitting {
            self.cancel.cancel();
        }
        self.store.reset();
        self.errors = FieldErrors::new();
        self.cancel = CancellationToken::new();
        self.state = WizardState::Editing(WizardStep::ServiceSelection);
    }

    /// Edits are allowed while editing and after a failed submission; the
    /// latter returns the wizard to the final step.
    fn ensure_editable(&mut self) -> Result<()> {
        match self.state {
            WizardState::Editing(_) => Ok(()),
            WizardState::Submitted(SubmissionOutcome::Error { .. }) => {
                self.state = WizardState::Editing(WizardStep::ContactInfo);
                Ok(())
            }
            WizardState::Submitting => Err(QuoteError::SubmissionInFlight),
            WizardState::Submitted(SubmissionOutcome::Success { .. }) => Err(QuoteError::Locked),
        }
    }

    fn transition_error(&self, action: &'static str) -> QuoteError {
        QuoteError::InvalidTransition {
            state: self.state.clone(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingCatalog;
    use crate::quote::validation::FormField;
    use crate::storage::{MemoryStore, DEFAULT_DRAFT_KEY};
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    /// Gateway that replays scripted results and records every payload.
    #[derive(Default)]
    struct ScriptedGateway {
        results: Mutex<VecDeque<std::result::Result<SubmissionReceipt, SubmissionError>>>,
        payloads: Mutex<Vec<serde_json::Value>>,
        delay: Option<Duration>,
    }

    impl ScriptedGateway {
        fn replying(results: Vec<std::result::Result<SubmissionReceipt, SubmissionError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.payloads.lock().len()
        }
    }

    impl SubmissionGateway for Arc<ScriptedGateway> {
        async fn submit(
            &self,
            payload: &SubmissionPayload,
        ) -> std::result::Result<SubmissionReceipt, SubmissionError> {
            self.payloads
                .lock()
                .push(serde_json::to_value(payload).expect("payload serializes"));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.results.lock().pop_front();
            next.unwrap_or_else(|| Err(SubmissionError::Network("no scripted reply".into())))
        }
    }

    fn receipt(id: &str) -> std::result::Result<SubmissionReceipt, SubmissionError> {
        Ok(SubmissionReceipt {
            quote_id: id.to_string(),
        })
    }

    fn wizard(
        storage: Arc<MemoryStore>,
        gateway: Arc<ScriptedGateway>,
    ) -> WizardController<Arc<MemoryStore>, Arc<ScriptedGateway>> {
        let store = QuoteDraftStore::new(
            storage,
            DEFAULT_DRAFT_KEY,
            Arc::new(PricingCatalog::standard()),
        );
        WizardController::new(store, gateway)
    }

    /// Walk a fresh wizard to the final step with a valid draft.
    fn fill_in(wizard: &mut WizardController<Arc<MemoryStore>, Arc<ScriptedGateway>>) {
        wizard.set_cleaning_type(CleaningType::Deep).unwrap();
        wizard.next().unwrap();
        wizard.set_room_count(RoomType::Bedrooms, 2).unwrap();
        wizard.set_room_count(RoomType::Bathrooms, 1).unwrap();
        wizard.toggle_extra("windows").unwrap();
        wizard.next().unwrap();
        wizard.set_location_field(LocationField::Suburb, "Bondi").unwrap();
        wizard.set_location_field(LocationField::Postcode, "2026").unwrap();
        wizard.set_urgency(Urgency::Urgent).unwrap();
        wizard.next().unwrap();
        wizard.set_customer_field(CustomerField::Name, " Taylor Nguyen ").unwrap();
        wizard.set_customer_field(CustomerField::Email, "taylor@example.com").unwrap();
        wizard.set_customer_field(CustomerField::Phone, "0412 345 678").unwrap();
    }

    // ==================== transition tests ====================

    #[test]
    fn test_starts_at_service_selection() {
        let w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        assert_eq!(w.state(), &WizardState::Editing(WizardStep::ServiceSelection));
        assert!(!w.can_advance());
        assert_eq!(w.breakdown().total, dec!(0));
    }

    #[test]
    fn test_step_one_requires_cleaning_type() {
        let mut w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        let err = w.next().unwrap_err();
        assert!(matches!(
            err,
            QuoteError::StepIncomplete { step: WizardStep::ServiceSelection, .. }
        ));
        assert!(w.field_errors().contains(FormField::CleaningType));

        w.set_cleaning_type(CleaningType::General).unwrap();
        assert_eq!(w.next().unwrap(), WizardStep::RoomsAndExtras);
        assert!(w.field_errors().is_empty());
    }

    #[test]
    fn test_step_two_requires_a_room() {
        let mut w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        w.set_cleaning_type(CleaningType::Deep).unwrap();
        w.next().unwrap();

        assert!(!can_advance(WizardStep::RoomsAndExtras, w.draft()));
        let err = w.next().unwrap_err();
        assert_eq!(
            err.field_errors().and_then(|e| e.get(FormField::Rooms)),
            Some("Please select at least one room")
        );
        assert_eq!(w.current_step(), WizardStep::RoomsAndExtras);

        w.adjust_room_count(RoomType::Kitchens, 1).unwrap();
        assert!(w.can_advance());
    }

    #[test]
    fn test_step_three_requires_suburb() {
        let mut w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        w.set_cleaning_type(CleaningType::Deep).unwrap();
        w.next().unwrap();
        w.set_room_count(RoomType::Bedrooms, 1).unwrap();
        w.next().unwrap();

        assert!(w.next().is_err());
        w.set_location_field(LocationField::Suburb, "Manly").unwrap();
        assert_eq!(w.next().unwrap(), WizardStep::ContactInfo);
    }

    #[test]
    fn test_markup_only_suburb_blocks_step_three() {
        let mut w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        w.set_cleaning_type(CleaningType::Deep).unwrap();
        w.next().unwrap();
        w.set_room_count(RoomType::Bedrooms, 1).unwrap();
        w.next().unwrap();

        w.set_location_field(LocationField::Suburb, "<>").unwrap();
        assert!(!w.can_advance());
        assert!(matches!(
            w.next(),
            Err(QuoteError::StepIncomplete { step: WizardStep::ServiceDetails, .. })
        ));
        assert!(w.field_errors().contains(FormField::Suburb));
    }

    #[test]
    fn test_cannot_advance_past_final_step() {
        let mut w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        fill_in(&mut w);
        assert!(matches!(w.next(), Err(QuoteError::InvalidTransition { .. })));
    }

    #[test]
    fn test_back_keeps_draft() {
        let mut w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        fill_in(&mut w);
        let before = w.draft().clone();

        assert_eq!(w.back().unwrap(), WizardStep::ServiceDetails);
        assert_eq!(w.back().unwrap(), WizardStep::RoomsAndExtras);
        assert_eq!(w.back().unwrap(), WizardStep::ServiceSelection);
        assert_eq!(w.back().unwrap(), WizardStep::ServiceSelection);
        assert_eq!(w.draft(), &before);
    }

    #[test]
    fn test_go_to_only_moves_backwards() {
        let mut w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        w.set_cleaning_type(CleaningType::Deep).unwrap();
        w.next().unwrap();

        assert!(w.go_to(WizardStep::ContactInfo).is_err());
        assert_eq!(w.go_to(WizardStep::ServiceSelection).unwrap(), WizardStep::ServiceSelection);
    }

    #[test]
    fn test_new_restores_persisted_draft() {
        let storage = Arc::new(MemoryStore::new());
        {
            let mut w = wizard(storage.clone(), Arc::default());
            w.set_cleaning_type(CleaningType::EndOfLease).unwrap();
        }
        let w = wizard(storage, Arc::default());
        assert_eq!(w.draft().cleaning_type, Some(CleaningType::EndOfLease));
        assert_eq!(w.breakdown().base_price, dec!(250));
        assert_eq!(w.current_step(), WizardStep::ServiceSelection);
    }

    // ==================== submission tests ====================

    #[tokio::test]
    async fn test_submit_only_from_final_step() {
        let gateway = Arc::new(ScriptedGateway::default());
        let mut w = wizard(Arc::new(MemoryStore::new()), gateway.clone());
        assert!(matches!(w.submit().await, Err(QuoteError::InvalidTransition { .. })));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_success_clears_draft() {
        let storage = Arc::new(MemoryStore::new());
        let gateway = Arc::new(ScriptedGateway::replying(vec![receipt("Q-1001")]));
        let mut w = wizard(storage.clone(), gateway.clone());
        fill_in(&mut w);

        let receipt = w.submit().await.unwrap();
        assert_eq!(receipt.quote_id, "Q-1001");
        assert_eq!(
            w.state(),
            &WizardState::Submitted(SubmissionOutcome::Success {
                quote_id: "Q-1001".to_string()
            })
        );
        assert_eq!(w.draft(), &QuoteDraft::default());
        assert!(!storage.contains_key(DEFAULT_DRAFT_KEY));

        let payload = &gateway.payloads.lock()[0];
        assert_eq!(payload["cleaningType"], "deep");
        assert_eq!(payload["customerInfo"]["name"], "Taylor Nguyen");
        assert_eq!(payload["pricing"]["total"], "366");
        assert!(payload["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_submitted_success_is_locked_until_reset() {
        let gateway = Arc::new(ScriptedGateway::replying(vec![receipt("Q-1")]));
        let mut w = wizard(Arc::new(MemoryStore::new()), gateway.clone());
        fill_in(&mut w);
        w.submit().await.unwrap();

        assert!(matches!(w.set_cleaning_type(CleaningType::General), Err(QuoteError::Locked)));
        assert!(matches!(w.submit().await, Err(QuoteError::Locked)));
        assert!(matches!(w.back(), Err(QuoteError::Locked)));
        assert_eq!(gateway.calls(), 1);

        w.reset();
        assert_eq!(w.state(), &WizardState::Editing(WizardStep::ServiceSelection));
        w.set_cleaning_type(CleaningType::General).unwrap();
    }

    #[tokio::test]
    async fn test_invalid_form_stays_on_final_step() {
        let gateway = Arc::new(ScriptedGateway::default());
        let mut w = wizard(Arc::new(MemoryStore::new()), gateway.clone());
        fill_in(&mut w);
        w.set_customer_field(CustomerField::Email, "not-an-email").unwrap();
        w.set_ndis_participant(true).unwrap();
        w.set_customer_field(CustomerField::NdisNumber, "12345").unwrap();

        let err = w.submit().await.unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get(FormField::Email), Some("Please enter a valid email address"));
        assert_eq!(
            errors.get(FormField::NdisNumber),
            Some("NDIS number must be exactly 9 digits")
        );
        assert_eq!(w.state(), &WizardState::Editing(WizardStep::ContactInfo));
        assert_eq!(w.field_errors(), errors);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_draft_and_retries() {
        let storage = Arc::new(MemoryStore::new());
        let gateway = Arc::new(ScriptedGateway::replying(vec![
            Err(SubmissionError::Status {
                status: 502,
                message: "bad gateway".to_string(),
            }),
            receipt("Q-2002"),
        ]));
        let mut w = wizard(storage.clone(), gateway.clone());
        fill_in(&mut w);
        let draft = w.draft().clone();
        let breakdown = w.breakdown().clone();

        let err = w.submit().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            w.state(),
            WizardState::Submitted(SubmissionOutcome::Error { .. })
        ));
        assert_eq!(w.current_step(), WizardStep::ContactInfo);
        assert_eq!(w.draft(), &draft);
        assert_eq!(w.breakdown(), &breakdown);
        assert!(storage.contains_key(DEFAULT_DRAFT_KEY));

        let receipt = w.submit().await.unwrap();
        assert_eq!(receipt.quote_id, "Q-2002");
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_edit_after_failure_returns_to_final_step() {
        let gateway = Arc::new(ScriptedGateway::replying(vec![Err(SubmissionError::Timeout)]));
        let mut w = wizard(Arc::new(MemoryStore::new()), gateway);
        fill_in(&mut w);
        w.submit().await.unwrap_err();

        w.set_details_field(DetailsField::PreferredDate, "2026-11-02").unwrap();
        assert_eq!(w.state(), &WizardState::Editing(WizardStep::ContactInfo));
        assert_eq!(w.back().unwrap(), WizardStep::ServiceDetails);
    }

    #[tokio::test]
    async fn test_cancel_token_aborts_flight() {
        let gateway = Arc::new(ScriptedGateway {
            results: Mutex::new(vec![receipt("never")].into()),
            delay: Some(Duration::from_secs(30)),
            ..Default::default()
        });
        let mut w = wizard(Arc::new(MemoryStore::new()), gateway);
        fill_in(&mut w);

        let token = w.cancel_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = w.submit().await.unwrap_err();
        assert!(matches!(err, QuoteError::Submission(SubmissionError::Cancelled)));
        assert_eq!(w.state(), &WizardState::Editing(WizardStep::ContactInfo));
        assert_eq!(w.draft().cleaning_type, Some(CleaningType::Deep));
        assert!(!w.cancel_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_abandoned_flight_blocks_until_cancelled() {
        let gateway = Arc::new(ScriptedGateway {
            results: Mutex::new(vec![receipt("late"), receipt("Q-3003")].into()),
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        let mut w = wizard(Arc::new(MemoryStore::new()), gateway.clone());
        fill_in(&mut w);

        // drop the submit future mid-flight
        let abandoned = tokio::time::timeout(Duration::from_millis(20), w.submit()).await;
        assert!(abandoned.is_err());
        assert!(w.is_submitting());

        assert!(matches!(w.submit().await, Err(QuoteError::SubmissionInFlight)));
        assert!(matches!(
            w.set_urgency(Urgency::Standard),
            Err(QuoteError::SubmissionInFlight)
        ));
        assert!(matches!(w.back(), Err(QuoteError::SubmissionInFlight)));
        assert!(!w.can_advance());

        assert!(w.cancel_submission());
        assert!(!w.cancel_submission());
        assert_eq!(w.submit().await.unwrap().quote_id, "late");
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_listeners_observe_wizard_edits() {
        let totals = Arc::new(Mutex::new(Vec::new()));
        let seen = totals.clone();

        let mut w = wizard(Arc::new(MemoryStore::new()), Arc::default());
        w.subscribe(Box::new(move |_, breakdown| seen.lock().push(breakdown.total)));
        w.set_cleaning_type(CleaningType::General).unwrap();
        w.set_urgency(Urgency::SameDay).unwrap();

        assert_eq!(*totals.lock(), vec![dec!(120), dec!(180)]);
    }
}
