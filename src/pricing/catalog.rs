//! Static pricing reference data.
//!
//! The catalog maps service, room, extra and urgency keys to prices or
//! multipliers. Lookups never fail: a missing key resolves to a neutral value
//! (zero price, 1.0 multiplier) and is logged as a configuration error so a
//! data-definition mismatch shows up for operators without breaking quoting.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which lookup table a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    Service,
    Room,
    Extra,
    Urgency,
}

impl PriceKind {
    /// Value used when the catalog has no entry for a key.
    pub fn neutral(self) -> Decimal {
        match self {
            PriceKind::Urgency => Decimal::ONE,
            PriceKind::Service | PriceKind::Room | PriceKind::Extra => Decimal::ZERO,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriceKind::Service => "service",
            PriceKind::Room => "room",
            PriceKind::Extra => "extra",
            PriceKind::Urgency => "urgency",
        }
    }
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// A lookup missed an expected key. Logged, never returned from pricing.
    MissingPrice { kind: PriceKind, key: String },
    /// A catalog document failed validation.
    ConfigurationError {
        message: String,
        errors: Vec<String>,
    },
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::MissingPrice { kind, key } => {
                write!(f, "Configuration error: no {} price defined for '{}'", kind, key)
            }
            PricingError::ConfigurationError { message, errors } => {
                write!(f, "Configuration error: {}", message)?;
                if !errors.is_empty() {
                    write!(f, " ({})", errors.join("; "))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PricingError {}

/// An optional add-on service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraService {
    pub label: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// Listing entry returned by [`PricingCatalog::extras`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraListing<'a> {
    pub id: &'a str,
    pub label: &'a str,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// Immutable price tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingCatalog {
    #[serde(default = "default_currency")]
    currency: String,
    services: BTreeMap<String, Decimal>,
    rooms: BTreeMap<String, Decimal>,
    #[serde(default)]
    extras: BTreeMap<String, ExtraService>,
    urgency: BTreeMap<String, Decimal>,
}

fn default_currency() -> String {
    "AUD".to_string()
}

impl PricingCatalog {
    /// The published price list.
    pub fn standard() -> Self {
        let services = [
            ("general", dec!(120)),
            ("deep", dec!(180)),
            ("end-of-lease", dec!(250)),
            ("ndis", dec!(140)),
            ("commercial", dec!(200)),
        ];
        let rooms = [
            ("bedrooms", dec!(25)),
            ("bathrooms", dec!(35)),
            ("kitchens", dec!(45)),
            ("livingRooms", dec!(30)),
            ("diningRooms", dec!(20)),
        ];
        let extras = [
            ("windows", "Interior windows", dec!(40)),
            ("oven", "Oven clean", dec!(50)),
            ("fridge", "Fridge clean", dec!(30)),
            ("carpet", "Carpet steam clean", dec!(60)),
            ("balcony", "Balcony or patio", dec!(35)),
            ("walls", "Wall spot cleaning", dec!(45)),
            ("laundry", "Laundry and linen change", dec!(25)),
        ];
        let urgency = [
            ("standard", dec!(1.0)),
            ("urgent", dec!(1.2)),
            ("same-day", dec!(1.5)),
        ];

        Self {
            currency: default_currency(),
            services: to_table(&services),
            rooms: to_table(&rooms),
            extras: extras
                .iter()
                .map(|(id, label, price)| {
                    (
                        id.to_string(),
                        ExtraService {
                            label: label.to_string(),
                            price: *price,
                        },
                    )
                })
                .collect(),
            urgency: to_table(&urgency),
        }
    }

    /// Parse and validate a catalog document.
    pub fn from_json_str(json: &str) -> Result<Self, PricingError> {
        let catalog: Self =
            serde_json::from_str(json).map_err(|e| PricingError::ConfigurationError {
                message: "catalog document could not be parsed".to_string(),
                errors: vec![e.to_string()],
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, PricingError> {
        let catalog: Self =
            serde_json::from_value(value).map_err(|e| PricingError::ConfigurationError {
                message: "catalog document could not be parsed".to_string(),
                errors: vec![e.to_string()],
            })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject negative prices and discounting multipliers so pricing stays
    /// monotonic in every input.
    pub fn validate(&self) -> Result<(), PricingError> {
        let mut errors = Vec::new();

        let priced = self
            .services
            .iter()
            .map(|(k, v)| (PriceKind::Service, k, *v))
            .chain(self.rooms.iter().map(|(k, v)| (PriceKind::Room, k, *v)))
            .chain(self.extras.iter().map(|(k, v)| (PriceKind::Extra, k, v.price)));
        for (kind, key, price) in priced {
            if price.is_sign_negative() && !price.is_zero() {
                errors.push(format!("{} '{}' has negative price {}", kind, key, price));
            }
        }

        for (key, multiplier) in &self.urgency {
            if *multiplier < Decimal::ONE {
                errors.push(format!(
                    "urgency '{}' multiplier {} is below 1.0",
                    key, multiplier
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PricingError::ConfigurationError {
                message: format!("catalog has {} invalid entries", errors.len()),
                errors,
            })
        }
    }

    /// Price or multiplier for `key`, falling back to the kind's neutral value.
    pub fn lookup(&self, kind: PriceKind, key: &str) -> Decimal {
        self.find(kind, key).unwrap_or_else(|| {
            let err = PricingError::MissingPrice {
                kind,
                key: key.to_string(),
            };
            warn!(kind = %kind, key = key, "{}", err);
            kind.neutral()
        })
    }

    /// Strict lookup without logging or defaults.
    pub fn find(&self, kind: PriceKind, key: &str) -> Option<Decimal> {
        match kind {
            PriceKind::Service => self.services.get(key).copied(),
            PriceKind::Room => self.rooms.get(key).copied(),
            PriceKind::Extra => self.extras.get(key).map(|extra| extra.price),
            PriceKind::Urgency => self.urgency.get(key).copied(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn has_extra(&self, id: &str) -> bool {
        self.extras.contains_key(id)
    }

    /// Extra services ordered by id.
    pub fn extras(&self) -> Vec<ExtraListing<'_>> {
        self.extras
            .iter()
            .map(|(id, extra)| ExtraListing {
                id,
                label: &extra.label,
                price: extra.price,
            })
            .collect()
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn to_table(entries: &[(&str, Decimal)]) -> BTreeMap<String, Decimal> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}
