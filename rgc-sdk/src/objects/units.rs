//! Per-unit payloads as produced by the storefront calculators.
//!
//! Everything here is untrusted input. Dimensions arrive as raw JSON numbers
//! (the calculator UI does not guarantee integers), prices are advisory, and
//! flags may be booleans or "Yes"/"No" strings depending on the storefront
//! build. Normalization and validation live server-side in `rgc-core`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A truthy flag as sent by the storefront.
///
/// Accepts JSON booleans as well as "Yes"/"No"-style strings; anything
/// unrecognized reads as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flag(pub bool);

impl Flag {
    pub fn is_set(&self) -> bool {
        self.0
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag(value)
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.0)
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagVisitor;

        impl serde::de::Visitor<'_> for FlagVisitor {
            type Value = Flag;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a boolean or a yes/no string")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Flag, E> {
                Ok(Flag(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Flag, E> {
                let truthy = matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "yes" | "true" | "y" | "1"
                );
                Ok(Flag(truthy))
            }

            fn visit_unit<E>(self) -> Result<Flag, E> {
                Ok(Flag(false))
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

/// One double-glazed unit as submitted by the DGU calculator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DguUnitPayload {
    /// Outer pane glass spec, e.g. "4mm Clear".
    pub outer_glass: Option<String>,
    /// Inner pane glass spec.
    pub inner_glass: Option<String>,
    /// Cavity width, e.g. "20mm".
    pub cavity: Option<String>,
    /// Spacer bar finish, e.g. "Black Warm Edge".
    pub spacer: Option<String>,
    pub self_cleaning: Flag,
    /// Width in millimeters.
    pub width: Option<f64>,
    /// Height in millimeters.
    pub height: Option<f64>,
    pub quantity: Option<i64>,
    /// Advisory only; the server prices DGU units itself.
    pub unit_price: Option<Decimal>,
    /// Advisory only.
    pub line_total: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub price_before_discount: Option<Decimal>,
}

/// One skylight unit as submitted by the skylight calculator.
///
/// Skylight prices are computed by the storefront calculator and validated
/// (not recomputed) server-side, so `unit_price` and `line_total` are
/// required for the order to be accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkylightUnitPayload {
    /// Unit strength rating, e.g. "Standard" or "Walk-on".
    pub strength: Option<String>,
    /// Glazing spec, e.g. "Double Glazed Toughened".
    pub glazing: Option<String>,
    pub tint: Option<String>,
    pub solar_control: Flag,
    pub self_cleaning: Flag,
    /// Internal (aperture) width in millimeters.
    pub internal_width: Option<f64>,
    pub internal_height: Option<f64>,
    /// External (kerb) width in millimeters.
    pub external_width: Option<f64>,
    pub external_height: Option<f64>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub line_total: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub price_before_discount: Option<Decimal>,
}
