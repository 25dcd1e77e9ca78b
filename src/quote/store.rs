//! Owner of the canonical quote draft.
//!
//! Every mutation produces a new draft value, writes it to durable storage,
//! recomputes the price breakdown and notifies listeners. Storage failures are
//! logged and swallowed: the in-memory draft stays authoritative and the
//! wizard keeps working, at the cost of losing the draft on reload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::pricing::{compute_breakdown, PricingBreakdown, PricingCatalog};
use crate::storage::{KeyValueStore, StorageError};

use super::models::{
    CleaningType, CustomerField, DetailsField, LocationField, QuoteDraft, RoomType, Urgency,
};

/// Current persisted envelope format.
pub const DRAFT_FORMAT_VERSION: u32 = 1;

/// Callback invoked after every change with the new draft and its pricing.
pub type DraftListener = Box<dyn Fn(&QuoteDraft, &PricingBreakdown) + Send + Sync>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedDraftRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    draft: &'a QuoteDraft,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedDraft {
    version: u32,
    draft: serde_json::Value,
}

/// Serialize `draft` under `key`. The breakdown is never stored.
pub fn save_draft<S: KeyValueStore + ?Sized>(
    storage: &S,
    key: &str,
    draft: &QuoteDraft,
) -> Result<(), StorageError> {
    let envelope = PersistedDraftRef {
        version: DRAFT_FORMAT_VERSION,
        saved_at: Utc::now(),
        draft,
    };
    storage.set(key, &serde_json::to_string(&envelope)?)
}

/// Read the draft stored under `key`, if any.
pub fn load_draft<S: KeyValueStore + ?Sized>(
    storage: &S,
    key: &str,
) -> Result<Option<QuoteDraft>, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    let envelope: PersistedDraft = serde_json::from_str(&raw)?;
    if envelope.version != DRAFT_FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion(envelope.version));
    }
    Ok(Some(serde_json::from_value(envelope.draft)?))
}

pub struct QuoteDraftStore<S: KeyValueStore> {
    storage: S,
    key: String,
    catalog: Arc<PricingCatalog>,
    draft: QuoteDraft,
    breakdown: PricingBreakdown,
    listeners: Vec<DraftListener>,
}

impl<S: KeyValueStore> QuoteDraftStore<S> {
    /// Store holding an empty draft. Call [`initialize`](Self::initialize) to
    /// pick up a persisted one.
    pub fn new(storage: S, key: impl Into<String>, catalog: Arc<PricingCatalog>) -> Self {
        let draft = QuoteDraft::default();
        let breakdown = compute_breakdown(&catalog, &draft);
        Self {
            storage,
            key: key.into(),
            catalog,
            draft,
            breakdown,
            listeners: Vec::new(),
        }
    }

    /// Load the persisted draft, falling back to the default one when nothing
    /// usable is stored. Returns whether a persisted draft was restored.
    pub fn initialize(&mut self) -> bool {
        let (draft, restored) = match load_draft(&self.storage, &self.key) {
            Ok(Some(draft)) => (draft, true),
            Ok(None) => (QuoteDraft::default(), false),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable persisted draft");
                (QuoteDraft::default(), false)
            }
        };
        debug!(key = %self.key, restored, "Quote draft initialized");

        self.draft = draft;
        self.recompute();
        restored
    }

    pub fn draft(&self) -> &QuoteDraft {
        &self.draft
    }

    pub fn breakdown(&self) -> &PricingBreakdown {
        &self.breakdown
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subscribe(&mut self, listener: DraftListener) {
        self.listeners.push(listener);
    }

    pub fn set_cleaning_type(&mut self, cleaning_type: CleaningType) {
        self.update(|draft| draft.cleaning_type = Some(cleaning_type));
    }

    /// Negative counts clamp to zero.
    pub fn set_room_count(&mut self, room: RoomType, count: i64) {
        let count = clamp_count(count);
        self.update(|draft| {
            draft.rooms.insert(room, count);
        });
    }

    /// Step a room count up or down, never below zero.
    pub fn adjust_room_count(&mut self, room: RoomType, delta: i64) {
        let current = i64::from(self.draft.room_count(room));
        self.set_room_count(room, current.saturating_add(delta));
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now
    /// selected.
    pub fn toggle_extra(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() {
            debug!("Ignoring toggle of blank extra id");
            return false;
        }

        let selected = !self.draft.extras.contains(id);
        self.update(|draft| {
            if selected {
                draft.extras.insert(id.to_string());
            } else {
                draft.extras.remove(id);
            }
        });
        selected
    }

    pub fn set_urgency(&mut self, urgency: Urgency) {
        self.update(|draft| draft.urgency = Some(urgency));
    }

    pub fn set_customer_field(&mut self, field: CustomerField, value: impl Into<String>) {
        let value = value.into();
        self.update(|draft| *draft.customer_field_mut(field) = value);
    }

    pub fn set_ndis_participant(&mut self, participant: bool) {
        self.update(|draft| draft.customer_info.is_ndis_participant = participant);
    }

    pub fn set_location_field(&mut self, field: LocationField, value: impl Into<String>) {
        let value = value.into();
        self.update(|draft| *draft.location_field_mut(field) = value);
    }

    pub fn set_details_field(&mut self, field: DetailsField, value: impl Into<String>) {
        let value = value.into();
        self.update(|draft| *draft.details_field_mut(field) = value);
    }

    /// Back to the default draft; the durable copy is removed.
    pub fn reset(&mut self) {
        self.draft = QuoteDraft::default();
        if let Err(e) = self.storage.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to remove persisted draft");
        }
        self.recompute();
        self.notify();
    }

    fn update(&mut self, mutate: impl FnOnce(&mut QuoteDraft)) {
        let mut next = self.draft.clone();
        mutate(&mut next);
        self.draft = next;

        self.persist();
        self.recompute();
        self.notify();
    }

    fn persist(&self) {
        if let Err(e) = save_draft(&self.storage, &self.key, &self.draft) {
            warn!(key = %self.key, error = %e, "Failed to persist quote draft");
        }
    }

    fn recompute(&mut self) {
        self.breakdown = compute_breakdown(&self.catalog, &self.draft);
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.draft, &self.breakdown);
        }
    }
}

fn clamp_count(count: i64) -> u32 {
    count.clamp(0, i64::from(u32::MAX)) as u32
}
