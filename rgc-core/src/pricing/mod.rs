//! Tiered area-based pricing.
//!
//! DGU units are priced server-side from the rate table in [`dgu`];
//! skylight prices come from the storefront calculator and are validated in
//! [`skylight`]. Money stays unrounded `Decimal` through every intermediate
//! sum; 2-dp rounding happens once at presentation.

pub mod dgu;
pub mod skylight;

use rust_decimal::Decimal;

/// Number of pricing bands.
pub const BAND_COUNT: usize = 6;

/// Select the pricing band for a unit area.
///
/// Bands (m²): <0.5, 0.5–0.99, 1.0–1.49, 1.5–1.99, 2.0–2.50, 2.51–3.00.
/// Areas above 3.0 m² have no band and the configuration is unpriced.
pub fn band_for_area(area_m2: Decimal) -> Option<usize> {
    if area_m2 < Decimal::new(5, 1) {
        Some(0)
    } else if area_m2 < Decimal::ONE {
        Some(1)
    } else if area_m2 < Decimal::new(15, 1) {
        Some(2)
    } else if area_m2 < Decimal::new(2, 0) {
        Some(3)
    } else if area_m2 <= Decimal::new(25, 1) {
        Some(4)
    } else if area_m2 <= Decimal::new(3, 0) {
        Some(5)
    } else {
        None
    }
}

/// A normalized unit together with its authoritative price.
#[derive(Debug, Clone, PartialEq)]
pub struct Priced<T> {
    pub unit: T,
    /// Unit price including tax, unrounded.
    pub unit_price: Decimal,
    /// `unit_price × quantity`, or the validated client-declared total.
    pub line_total: Decimal,
}

/// Tolerance for cross-checking a client-declared DGU grand total (£0.05).
///
/// DGU pricing is server-authoritative; the declared total is only a
/// cross-check against storefront drift.
pub fn dgu_total_tolerance() -> Decimal {
    Decimal::new(5, 2)
}

/// Tolerance for validating client-computed skylight prices (£0.10).
pub fn skylight_price_tolerance() -> Decimal {
    Decimal::new(10, 2)
}
