//! The quote wizard: draft model, validation, draft store, submission and the
//! step state machine tying them together.

pub mod models;
pub mod store;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use models::{
    CleaningType, CustomerField, CustomerInfo, DetailsField, Location, LocationField,
    NdisBookingForm, QuoteDraft, RoomType, Urgency, WizardStep,
};
pub use store::{load_draft, save_draft, DraftListener, QuoteDraftStore, DRAFT_FORMAT_VERSION};
pub use submission::{
    HttpSubmissionGateway, SubmissionError, SubmissionGateway, SubmissionPayload,
    SubmissionReceipt,
};
pub use validation::{
    sanitize, sanitize_text, validate_ndis_form, validate_quote_form, validate_step, FieldErrors,
    FormField, MAX_ROOMS,
};
pub use wizard::{can_advance, SubmissionOutcome, WizardController, WizardState};
