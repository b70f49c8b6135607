//! Skylight unit validation.
//!
//! Skylight geometry is validated, never clamped: the customer has already
//! confirmed external measurements against their aperture, so silently
//! resizing would invalidate the order. Violations reject the unit.

use rgc_sdk::objects::SkylightUnitPayload;
use rust_decimal::Decimal;

use super::{UnitConfigError, clamp_quantity, optional_text, require_dimension, require_text};

/// Internal dimension bounds, in millimeters.
pub const SKYLIGHT_MIN_MM: u32 = 400;
pub const SKYLIGHT_MAX_MM: u32 = 2200;

/// Internal width beyond which a minimum height applies (structural rule).
pub const WIDE_UNIT_THRESHOLD_MM: u32 = 1800;
pub const WIDE_UNIT_MIN_HEIGHT_MM: u32 = 600;

/// Maximum internal area in m².
pub fn max_area_m2() -> Decimal {
    Decimal::new(30, 1)
}

/// A skylight unit after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSkylight {
    pub strength: Option<String>,
    pub glazing: String,
    pub tint: Option<String>,
    pub solar_control: bool,
    pub self_cleaning: bool,
    pub internal_width_mm: u32,
    pub internal_height_mm: u32,
    pub external_width_mm: Option<u32>,
    pub external_height_mm: Option<u32>,
    pub quantity: u32,
    /// Client-declared unit price, validated by the pricing stage.
    pub unit_price: Option<Decimal>,
    /// Client-declared line total, validated by the pricing stage.
    pub line_total: Option<Decimal>,
    pub discount_percent: Option<Decimal>,
    pub price_before_discount: Option<Decimal>,
}

impl NormalizedSkylight {
    /// Internal area in m², exact decimal.
    pub fn area_m2(&self) -> Decimal {
        Decimal::from(self.internal_width_mm) * Decimal::from(self.internal_height_mm)
            / Decimal::new(1_000_000, 0)
    }
}

fn validated_internal_mm(raw: f64, field: &'static str) -> Result<u32, UnitConfigError> {
    let rounded = raw.round();
    if rounded < f64::from(SKYLIGHT_MIN_MM) || rounded > f64::from(SKYLIGHT_MAX_MM) {
        return Err(UnitConfigError::Geometry(format!(
            "internal {field} {rounded}mm outside {SKYLIGHT_MIN_MM}-{SKYLIGHT_MAX_MM}mm"
        )));
    }
    Ok(rounded as u32)
}

fn optional_external_mm(raw: Option<f64>) -> Option<u32> {
    raw.filter(|v| v.is_finite() && *v > 0.0).map(|v| v.round() as u32)
}

/// Validate a raw skylight payload.
pub fn normalize_skylight(
    payload: &SkylightUnitPayload,
) -> Result<NormalizedSkylight, UnitConfigError> {
    let glazing = require_text(&payload.glazing, "glazing")?;

    let internal_width_mm =
        validated_internal_mm(require_dimension(payload.internal_width, "internalWidth")?, "width")?;
    let internal_height_mm = validated_internal_mm(
        require_dimension(payload.internal_height, "internalHeight")?,
        "height",
    )?;

    if internal_width_mm > WIDE_UNIT_THRESHOLD_MM
        && internal_height_mm < WIDE_UNIT_MIN_HEIGHT_MM
    {
        return Err(UnitConfigError::Geometry(format!(
            "units wider than {WIDE_UNIT_THRESHOLD_MM}mm need a height of at least {WIDE_UNIT_MIN_HEIGHT_MM}mm"
        )));
    }

    let area = Decimal::from(internal_width_mm) * Decimal::from(internal_height_mm)
        / Decimal::new(1_000_000, 0);
    if area > max_area_m2() {
        return Err(UnitConfigError::Geometry(format!(
            "internal area {area} m² exceeds the {} m² maximum",
            max_area_m2()
        )));
    }

    Ok(NormalizedSkylight {
        strength: optional_text(&payload.strength),
        glazing,
        tint: optional_text(&payload.tint),
        solar_control: payload.solar_control.is_set(),
        self_cleaning: payload.self_cleaning.is_set(),
        internal_width_mm,
        internal_height_mm,
        external_width_mm: optional_external_mm(payload.external_width),
        external_height_mm: optional_external_mm(payload.external_height),
        quantity: clamp_quantity(payload.quantity),
        unit_price: payload.unit_price,
        line_total: payload.line_total,
        discount_percent: payload.discount_percent,
        price_before_discount: payload.price_before_discount,
    })
}
