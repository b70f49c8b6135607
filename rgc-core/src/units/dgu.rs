//! Double-glazed unit normalization.

use rgc_sdk::objects::DguUnitPayload;
use rust_decimal::Decimal;

use super::{UnitConfigError, clamp_mm, clamp_quantity, optional_text, require_dimension};

/// Dimension bounds for DGU units, in millimeters.
pub const DGU_MIN_MM: u32 = 150;
pub const DGU_MAX_WIDTH_MM: u32 = 2500;
pub const DGU_MAX_HEIGHT_MM: u32 = 1600;

/// Glass specifications the pricing table knows about.
///
/// A closed set: a spec string outside this list is an invalid
/// configuration, never a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlassSpec {
    Clear4mm,
    Clear6mm,
    Toughened6mm,
    Laminated64mm,
}

impl GlassSpec {
    /// Parse a storefront spec string.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "4mm clear" => Some(Self::Clear4mm),
            "6mm clear" => Some(Self::Clear6mm),
            "6mm toughened" => Some(Self::Toughened6mm),
            "6.4mm laminated" => Some(Self::Laminated64mm),
            _ => None,
        }
    }

    /// The human-readable spec name used in attributes and notes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear4mm => "4mm Clear",
            Self::Clear6mm => "6mm Clear",
            Self::Toughened6mm => "6mm Toughened",
            Self::Laminated64mm => "6.4mm Laminated",
        }
    }

    /// Whether this is the cheapest (base) tier subject to the large-area
    /// upgrade rule.
    pub fn is_base_tier(&self) -> bool {
        matches!(self, Self::Clear4mm)
    }

    /// The next tier up from the base tier.
    pub fn upgraded(&self) -> Self {
        match self {
            Self::Clear4mm => Self::Clear6mm,
            other => *other,
        }
    }
}

impl std::fmt::Display for GlassSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Area at which base-tier glass must be upgraded, in m².
///
/// The rate table has no entry for large-area 4mm glass: it is structurally
/// unsuitable at that size, so both panes move up a tier instead.
pub fn upgrade_threshold_m2() -> Decimal {
    Decimal::new(25, 1)
}

/// A DGU unit after clamping and the material upgrade rule.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDgu {
    pub outer: GlassSpec,
    pub inner: GlassSpec,
    pub cavity: Option<String>,
    pub spacer: Option<String>,
    pub self_cleaning: bool,
    pub width_mm: u32,
    pub height_mm: u32,
    pub quantity: u32,
    /// True when the large-area upgrade rule replaced both panes.
    pub upgrade_applied: bool,
    pub discount_percent: Option<Decimal>,
    pub price_before_discount: Option<Decimal>,
}

impl NormalizedDgu {
    /// Unit area in m², exact decimal.
    pub fn area_m2(&self) -> Decimal {
        Decimal::from(self.width_mm) * Decimal::from(self.height_mm) / Decimal::new(1_000_000, 0)
    }
}

fn parse_glass(value: &Option<String>, field: &'static str) -> Result<GlassSpec, UnitConfigError> {
    let text = super::require_text(value, field)?;
    GlassSpec::parse(&text).ok_or(UnitConfigError::UnknownValue { field, value: text })
}

/// Normalize a raw DGU payload.
///
/// Dimensions and quantity clamp; glass specs must parse. The upgrade rule
/// fires at most once, after clamping, and is recorded on the unit.
pub fn normalize_dgu(payload: &DguUnitPayload) -> Result<NormalizedDgu, UnitConfigError> {
    let mut outer = parse_glass(&payload.outer_glass, "outerGlass")?;
    let mut inner = parse_glass(&payload.inner_glass, "innerGlass")?;

    let width_mm = clamp_mm(
        require_dimension(payload.width, "width")?,
        DGU_MIN_MM,
        DGU_MAX_WIDTH_MM,
    );
    let height_mm = clamp_mm(
        require_dimension(payload.height, "height")?,
        DGU_MIN_MM,
        DGU_MAX_HEIGHT_MM,
    );

    let area_m2 =
        Decimal::from(width_mm) * Decimal::from(height_mm) / Decimal::new(1_000_000, 0);
    let mut upgrade_applied = false;
    if area_m2 >= upgrade_threshold_m2() && outer.is_base_tier() && inner.is_base_tier() {
        outer = outer.upgraded();
        inner = inner.upgraded();
        upgrade_applied = true;
    }

    Ok(NormalizedDgu {
        outer,
        inner,
        cavity: optional_text(&payload.cavity),
        spacer: optional_text(&payload.spacer),
        self_cleaning: payload.self_cleaning.is_set(),
        width_mm,
        height_mm,
        quantity: clamp_quantity(payload.quantity),
        upgrade_applied,
        discount_percent: payload.discount_percent,
        price_before_discount: payload.price_before_discount,
    })
}
