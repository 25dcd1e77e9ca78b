//! Field and form validation for the quote wizard.
//!
//! Field validators return `None` when the value is acceptable and a
//! human-readable message otherwise. Aggregate validators check every field so
//! the caller can show all problems at once. Input is expected to have been
//! passed through [`sanitize`] first.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::models::{
    CleaningType, CustomerInfo, Location, NdisBookingForm, QuoteDraft, RoomType, Urgency,
    WizardStep,
};

/// Largest number of rooms a single online quote may cover.
pub const MAX_ROOMS: u64 = 20;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z '\-]+$").expect("name pattern compiles"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

// Mobile (04) and landline (02, 03, 07, 08) numbers, local or +61 form.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+?61|0)[2-478]\d{8}$").expect("phone pattern compiles"));

static PHONE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-().]").expect("separator pattern compiles"));

static POSTCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("postcode pattern compiles"));

static NDIS_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{9}$").expect("ndis pattern compiles"));

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    CleaningType,
    Rooms,
    Urgency,
    Suburb,
    Postcode,
    Name,
    Email,
    Phone,
    NdisNumber,
    Address,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::CleaningType => "cleaningType",
            FormField::Rooms => "rooms",
            FormField::Urgency => "urgency",
            FormField::Suburb => "suburb",
            FormField::Postcode => "postcode",
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::NdisNumber => "ndisNumber",
            FormField::Address => "address",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation messages keyed by field. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `message` for `field` if the validator reported one.
    pub fn record(&mut self, field: FormField, message: Option<&str>) {
        if let Some(message) = message {
            self.0.insert(field, message.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_name(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("Name is required");
    }
    if !(2..=50).contains(&char_len(value)) {
        return Some("Name must be between 2 and 50 characters");
    }
    if !NAME_PATTERN.is_match(value) {
        return Some("Name can only contain letters, spaces, hyphens and apostrophes");
    }
    None
}

pub fn validate_email(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("Email is required");
    }
    if !EMAIL_PATTERN.is_match(value) {
        return Some("Please enter a valid email address");
    }
    None
}

pub fn validate_phone(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("Phone number is required");
    }
    let digits = PHONE_SEPARATORS.replace_all(value, "");
    if !PHONE_PATTERN.is_match(&digits) {
        return Some("Please enter a valid Australian phone number");
    }
    None
}

pub fn validate_suburb(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("Suburb is required");
    }
    if !(2..=50).contains(&char_len(value)) {
        return Some("Suburb must be between 2 and 50 characters");
    }
    None
}

pub fn validate_postcode(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("Postcode is required");
    }
    if !POSTCODE_PATTERN.is_match(value) {
        return Some("Postcode must be 4 digits");
    }
    match value.parse::<u32>() {
        Ok(code) if (1000..=9999).contains(&code) => None,
        _ => Some("Please enter a valid Australian postcode"),
    }
}

/// Only participants must supply an NDIS number; otherwise the field is ignored.
pub fn validate_ndis_number(value: &str, is_participant: bool) -> Option<&'static str> {
    if !is_participant {
        return None;
    }
    if value.is_empty() {
        return Some("NDIS number is required for NDIS participants");
    }
    if !NDIS_NUMBER_PATTERN.is_match(value) {
        return Some("NDIS number must be exactly 9 digits");
    }
    None
}

pub fn validate_address(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        return Some("Address is required");
    }
    if !(5..=100).contains(&char_len(value)) {
        return Some("Address must be between 5 and 100 characters");
    }
    None
}

pub fn validate_rooms(rooms: &BTreeMap<RoomType, u32>) -> Option<&'static str> {
    let total: u64 = rooms.values().map(|count| u64::from(*count)).sum();
    if total == 0 {
        return Some("Please select at least one room");
    }
    if total > MAX_ROOMS {
        return Some("Maximum 20 rooms allowed");
    }
    None
}

pub fn validate_cleaning_type(value: Option<CleaningType>) -> Option<&'static str> {
    match value {
        Some(_) => None,
        None => Some("Please select a cleaning type"),
    }
}

pub fn validate_urgency(value: Option<Urgency>) -> Option<&'static str> {
    match value {
        Some(_) => None,
        None => Some("Please select how soon you need the clean"),
    }
}

/// Run every validator the quote wizard needs before submission.
pub fn validate_quote_form(draft: &QuoteDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let customer = &draft.customer_info;

    errors.record(FormField::CleaningType, validate_cleaning_type(draft.cleaning_type));
    errors.record(FormField::Rooms, validate_rooms(&draft.rooms));
    errors.record(FormField::Urgency, validate_urgency(draft.urgency));
    errors.record(FormField::Suburb, validate_suburb(&draft.location.suburb));
    errors.record(FormField::Postcode, validate_postcode(&draft.location.postcode));
    errors.record(FormField::Name, validate_name(&customer.name));
    errors.record(FormField::Email, validate_email(&customer.email));
    errors.record(FormField::Phone, validate_phone(&customer.phone));
    errors.record(
        FormField::NdisNumber,
        validate_ndis_number(&customer.ndis_number, customer.is_ndis_participant),
    );

    errors
}

/// Presence checks gating the move off `step`, applied to the sanitized
/// draft so markup-only input counts as empty.
pub fn validate_step(step: WizardStep, draft: &QuoteDraft) -> FieldErrors {
    let draft = &sanitize(draft);
    let mut errors = FieldErrors::new();

    match step {
        WizardStep::ServiceSelection => {
            errors.record(FormField::CleaningType, validate_cleaning_type(draft.cleaning_type));
        }
        WizardStep::RoomsAndExtras => {
            if draft.total_rooms() == 0 {
                errors.record(FormField::Rooms, Some("Please select at least one room"));
            }
        }
        WizardStep::ServiceDetails => {
            if draft.location.suburb.is_empty() {
                errors.record(FormField::Suburb, Some("Suburb is required"));
            }
            errors.record(FormField::Urgency, validate_urgency(draft.urgency));
        }
        WizardStep::ContactInfo => {
            let customer = &draft.customer_info;
            if customer.name.is_empty() {
                errors.record(FormField::Name, Some("Name is required"));
            }
            if customer.email.is_empty() {
                errors.record(FormField::Email, Some("Email is required"));
            }
            if customer.phone.is_empty() {
                errors.record(FormField::Phone, Some("Phone number is required"));
            }
        }
    }

    errors
}

/// Validate the standalone NDIS booking form. The NDIS number is always
/// required here.
pub fn validate_ndis_form(form: &NdisBookingForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    errors.record(FormField::Name, validate_name(&form.name));
    errors.record(FormField::Email, validate_email(&form.email));
    errors.record(FormField::Phone, validate_phone(&form.phone));
    errors.record(FormField::NdisNumber, validate_ndis_number(&form.ndis_number, true));
    errors.record(FormField::Address, validate_address(&form.address));
    errors.record(FormField::Suburb, validate_suburb(&form.suburb));
    errors.record(FormField::Postcode, validate_postcode(&form.postcode));

    errors
}

/// Strip angle brackets, then trim surrounding whitespace.
pub fn sanitize_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitized copy of every string field in the draft.
pub fn sanitize(draft: &QuoteDraft) -> QuoteDraft {
    let customer = &draft.customer_info;
    QuoteDraft {
        cleaning_type: draft.cleaning_type,
        rooms: draft.rooms.clone(),
        extras: draft
            .extras
            .iter()
            .map(|id| sanitize_text(id))
            .filter(|id| !id.is_empty())
            .collect(),
        urgency: draft.urgency,
        location: Location {
            suburb: sanitize_text(&draft.location.suburb),
            postcode: sanitize_text(&draft.location.postcode),
        },
        customer_info: CustomerInfo {
            name: sanitize_text(&customer.name),
            email: sanitize_text(&customer.email),
            phone: sanitize_text(&customer.phone),
            ndis_number: sanitize_text(&customer.ndis_number),
            is_ndis_participant: customer.is_ndis_participant,
        },
        special_requests: sanitize_text(&draft.special_requests),
        preferred_date: sanitize_text(&draft.preferred_date),
        preferred_time: sanitize_text(&draft.preferred_time),
    }
}

impl NdisBookingForm {
    pub fn sanitize(&self) -> Self {
        Self {
            name: sanitize_text(&self.name),
            email: sanitize_text(&self.email),
            phone: sanitize_text(&self.phone),
            ndis_number: sanitize_text(&self.ndis_number),
            address: sanitize_text(&self.address),
            suburb: sanitize_text(&self.suburb),
            postcode: sanitize_text(&self.postcode),
            plan_manager: sanitize_text(&self.plan_manager),
            support_needs: sanitize_text(&self.support_needs),
        }
    }
}
