//! Pricing engine module for cleaning quotes.
//!
//! Provides the reference price catalog and the pure calculation that turns a
//! quote draft into a GST-inclusive price breakdown.

pub mod calculators;
pub mod catalog;
pub mod responses;

// Re-export commonly used items
pub use calculators::{compute_breakdown, extract_gst, round_money};
pub use catalog::{ExtraListing, ExtraService, PriceKind, PricingCatalog, PricingError};
pub use responses::{GstSplit, PriceLine, PricingBreakdown};
