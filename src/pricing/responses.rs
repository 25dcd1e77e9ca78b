//! Derived pricing output.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::PriceKind;

/// One itemised line of a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceLine {
    pub kind: PriceKind,
    pub key: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

/// Price breakdown for a draft. Always recomputed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rooms_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub extras_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub urgency_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    /// GST-inclusive total in whole currency units.
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    /// GST contained in `total`.
    #[serde(with = "rust_decimal::serde::str")]
    pub gst: Decimal,
    /// `total` less GST.
    #[serde(with = "rust_decimal::serde::str")]
    pub net: Decimal,
    pub lines: Vec<PriceLine>,
}

/// GST split of a GST-inclusive amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GstSplit {
    pub net: Decimal,
    pub gst: Decimal,
}
