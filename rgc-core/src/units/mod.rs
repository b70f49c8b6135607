//! Unit normalization.
//!
//! Raw calculator payloads are untrusted; this module turns them into
//! canonical internal units. Out-of-range numeric input is clamped (dimension
//! bounds are business policy, not caller error); missing or unknown discrete
//! fields reject the unit as an invalid configuration.

pub mod dgu;
pub mod skylight;

pub use dgu::{GlassSpec, NormalizedDgu};
pub use skylight::NormalizedSkylight;

use thiserror::Error;

/// Quantity bounds shared by both calculators.
pub const MIN_QUANTITY: i64 = 1;
pub const MAX_QUANTITY: i64 = 10;

/// A unit configuration that cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitConfigError {
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("unknown {field} value {value:?}")]
    UnknownValue { field: &'static str, value: String },
    #[error("{0}")]
    Geometry(String),
}

/// Clamp a raw dimension (mm) into `[min, max]`, rounding to whole mm.
pub(crate) fn clamp_mm(raw: f64, min: u32, max: u32) -> u32 {
    let rounded = raw.round();
    if rounded <= f64::from(min) {
        min
    } else if rounded >= f64::from(max) {
        max
    } else {
        rounded as u32
    }
}

/// Clamp a raw quantity into `[1, 10]`, defaulting to 1 when absent.
pub(crate) fn clamp_quantity(raw: Option<i64>) -> u32 {
    raw.unwrap_or(MIN_QUANTITY).clamp(MIN_QUANTITY, MAX_QUANTITY) as u32
}

/// Pull a required dimension out of an optional payload field.
pub(crate) fn require_dimension(
    value: Option<f64>,
    field: &'static str,
) -> Result<f64, UnitConfigError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(UnitConfigError::MissingField(field)),
    }
}

/// Pull a required non-empty string out of an optional payload field.
pub(crate) fn require_text(
    value: &Option<String>,
    field: &'static str,
) -> Result<String, UnitConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(UnitConfigError::MissingField(field)),
    }
}

/// Normalize an optional free-text field, dropping empty strings.
pub(crate) fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_mm_bounds_and_idempotence() {
        let cases = [-500.0, 0.0, 149.9, 150.0, 1000.4, 2500.0, 99999.0];
        for raw in cases {
            let once = clamp_mm(raw, 150, 2500);
            let twice = clamp_mm(f64::from(once), 150, 2500);
            assert_eq!(once, twice, "clamp must be idempotent for {raw}");
            assert!((150..=2500).contains(&once));
        }
        assert_eq!(clamp_mm(-500.0, 150, 2500), 150);
        assert_eq!(clamp_mm(99999.0, 150, 2500), 2500);
        assert_eq!(clamp_mm(1000.4, 150, 2500), 1000);
    }

    #[test]
    fn clamp_quantity_defaults_and_bounds() {
        assert_eq!(clamp_quantity(None), 1);
        assert_eq!(clamp_quantity(Some(0)), 1);
        assert_eq!(clamp_quantity(Some(-3)), 1);
        assert_eq!(clamp_quantity(Some(5)), 5);
        assert_eq!(clamp_quantity(Some(10)), 10);
        assert_eq!(clamp_quantity(Some(250)), 10);
    }

    #[test]
    fn require_text_rejects_empty_and_missing() {
        assert!(require_text(&None, "glazing").is_err());
        assert!(require_text(&Some("   ".into()), "glazing").is_err());
        assert_eq!(
            require_text(&Some(" Clear ".into()), "glazing").as_deref(),
            Ok("Clear")
        );
    }
}
