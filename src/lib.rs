//! Quote configuration and pricing engine for a cleaning services business.
//!
//! A customer builds a [`QuoteDraft`](quote::QuoteDraft) through a four step
//! [`WizardController`](quote::WizardController). Every edit is persisted
//! through a [`KeyValueStore`](storage::KeyValueStore) and re-priced against
//! the [`PricingCatalog`](pricing::PricingCatalog); the finished quote is
//! validated and posted to the quote service.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cleaning_quote::config::QuoteConfig;
//! use cleaning_quote::quote::{CleaningType, HttpSubmissionGateway, QuoteDraftStore, WizardController};
//! use cleaning_quote::storage::FileStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = QuoteConfig::load()?;
//! cleaning_quote::telemetry::init_tracing(&config.telemetry);
//!
//! let catalog = Arc::new(config.load_catalog()?);
//! let storage = FileStore::new(config.storage.draft_dir.clone());
//! let store = QuoteDraftStore::new(storage, config.storage.draft_key.clone(), catalog);
//! let gateway = HttpSubmissionGateway::from_config(&config.submission)?;
//!
//! let mut wizard = WizardController::new(store, gateway);
//! wizard.set_cleaning_type(CleaningType::Deep)?;
//! println!("estimate: {}", wizard.breakdown().total);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod pricing;
pub mod quote;
pub mod storage;
pub mod telemetry;

pub use error::{QuoteError, Result};
