//! Skylight price validation.
//!
//! Skylight pricing is computed by the trusted storefront calculator (the
//! rate logic is not duplicated server-side), so the server's job is price
//! integrity: the declared line total must agree with
//! `unit_price × quantity` within a small tolerance, and the geometry is
//! bound-checked independently during normalization.

use rust_decimal::Decimal;
use thiserror::Error;

use super::{Priced, skylight_price_tolerance};
use crate::units::NormalizedSkylight;

/// A skylight unit whose declared pricing does not hold up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkylightPricingError {
    /// Unit price or line total missing, zero, or negative.
    #[error("unit has no usable price")]
    Unpriced,
    /// Declared line total disagrees with `unit_price × quantity`.
    #[error("declared line total {declared} does not match expected {expected}")]
    Mismatch {
        declared: Decimal,
        expected: Decimal,
    },
}

/// Validate a skylight unit's declared pricing.
///
/// On success the declared line total is kept (it passed the cross-check;
/// re-deriving it would discard the storefront's rounding).
pub fn validate_skylight_pricing(
    unit: &NormalizedSkylight,
) -> Result<Priced<NormalizedSkylight>, SkylightPricingError> {
    let unit_price = unit
        .unit_price
        .filter(|p| *p > Decimal::ZERO)
        .ok_or(SkylightPricingError::Unpriced)?;
    let declared = unit
        .line_total
        .filter(|t| *t > Decimal::ZERO)
        .ok_or(SkylightPricingError::Unpriced)?;

    let expected = unit_price * Decimal::from(unit.quantity);
    if (declared - expected).abs() > skylight_price_tolerance() {
        return Err(SkylightPricingError::Mismatch { declared, expected });
    }

    Ok(Priced {
        unit: unit.clone(),
        unit_price,
        line_total: declared,
    })
}
