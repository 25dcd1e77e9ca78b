//! Core pricing calculation functions.
//!
//! Pure functions for quote math - no I/O, no hidden state. The same catalog
//! and draft always produce the same breakdown.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::pricing::catalog::{PriceKind, PricingCatalog};
use crate::pricing::responses::{GstSplit, PriceLine, PricingBreakdown};
use crate::quote::models::QuoteDraft;

/// Prices are GST-inclusive; GST is one eleventh of the total (10% rate).
const GST_DIVISOR: Decimal = dec!(11);

/// Round to specified decimal places, halves rounding away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use cleaning_quote::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));
/// assert_eq!(round_money(dec!(1.235), 2), dec!(1.24));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Split a GST-inclusive total into GST (rounded to cents) and the net
/// remainder, so `net + gst == total` exactly.
pub fn extract_gst(total: Decimal) -> GstSplit {
    let gst = round_money(total / GST_DIVISOR, 2);
    GstSplit {
        net: total - gst,
        gst,
    }
}

/// Calculate the price breakdown for a draft.
///
/// An unset cleaning type prices at zero and an unset urgency at 1.0 so a
/// running total can be shown from the first step. Keys the catalog does not
/// know contribute nothing.
pub fn compute_breakdown(catalog: &PricingCatalog, draft: &QuoteDraft) -> PricingBreakdown {
    let mut lines = Vec::new();

    let base_price = match draft.cleaning_type {
        Some(cleaning_type) => {
            let price = catalog.lookup(PriceKind::Service, cleaning_type.key());
            lines.push(PriceLine {
                kind: PriceKind::Service,
                key: cleaning_type.key().to_string(),
                quantity: 1,
                unit_price: price,
                amount: price,
            });
            price
        }
        None => Decimal::ZERO,
    };

    let mut rooms_total = Decimal::ZERO;
    for (room, count) in &draft.rooms {
        if *count == 0 {
            continue;
        }
        let unit_price = catalog.lookup(PriceKind::Room, room.key());
        let amount = unit_price * Decimal::from(*count);
        rooms_total += amount;
        lines.push(PriceLine {
            kind: PriceKind::Room,
            key: room.key().to_string(),
            quantity: *count,
            unit_price,
            amount,
        });
    }

    let mut extras_total = Decimal::ZERO;
    for id in &draft.extras {
        let price = catalog.lookup(PriceKind::Extra, id);
        extras_total += price;
        lines.push(PriceLine {
            kind: PriceKind::Extra,
            key: id.clone(),
            quantity: 1,
            unit_price: price,
            amount: price,
        });
    }

    let urgency_multiplier = match draft.urgency {
        Some(urgency) => catalog.lookup(PriceKind::Urgency, urgency.key()),
        None => Decimal::ONE,
    };

    let subtotal = base_price + rooms_total + extras_total;
    let total = round_money(subtotal * urgency_multiplier, 0).max(Decimal::ZERO);
    let GstSplit { net, gst } = extract_gst(total);

    PricingBreakdown {
        currency: catalog.currency().to_string(),
        base_price,
        rooms_total,
        extras_total,
        urgency_multiplier,
        subtotal,
        total,
        gst,
        net,
        lines,
    }
}
