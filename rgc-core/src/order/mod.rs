//! Draft order assembly.
//!
//! Converts priced units plus calculator metadata into the exact shape the
//! order platform's draft-order API accepts. Attribute order and presence
//! are part of the contract: the size attribute always comes first (axis
//! order is width-first for DGU, height-first for skylights), optional
//! attributes are omitted when empty, and totals are recomputed here rather
//! than forwarded. The note block repeats the totals in free text because
//! the platform's invoice rendering surfaces the note but not always the
//! structured attributes.

use compact_str::CompactString;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::pricing::Priced;
use crate::units::{NormalizedDgu, NormalizedSkylight};
use rgc_sdk::objects::CalculatorType;

/// A human-readable key/value pair rendered on the invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderAttribute {
    pub key: String,
    pub value: String,
}

impl OrderAttribute {
    fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One line item in the outbound draft order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineItem {
    /// Anchor product variant providing imagery and title on the invoice.
    pub variant_id: String,
    pub quantity: u32,
    /// Computed/validated unit price; overrides the variant's catalog price.
    pub unit_price: Decimal,
    pub attributes: Vec<OrderAttribute>,
}

/// The assembled draft order, ready for the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftOrderRequest {
    pub note: String,
    pub tags: Vec<CompactString>,
    pub line_items: Vec<OrderLineItem>,
    /// Σ line totals, recomputed at assembly, unrounded.
    pub grand_total: Decimal,
    /// Σ quantities.
    pub total_units_qty: i64,
}

/// Format a money value for presentation (the single 2-dp rounding point).
pub fn format_gbp(value: Decimal) -> String {
    format!("£{:.2}", value.round_dp(2))
}

/// Render the `Unit Price` attribute value, showing "before → after" when a
/// discount applies so the invoice stays auditable.
fn unit_price_value(
    unit_price: Decimal,
    discount_percent: Option<Decimal>,
    price_before_discount: Option<Decimal>,
) -> String {
    let price = format_gbp(unit_price);
    match (price_before_discount, discount_percent) {
        (Some(before), Some(pct)) => {
            format!("{} → {} ({}% off)", format_gbp(before), price, pct.normalize())
        }
        (Some(before), None) => format!("{} → {}", format_gbp(before), price),
        (None, Some(pct)) => format!("{} ({}% off)", price, pct.normalize()),
        (None, None) => price,
    }
}

/// Attributes for one DGU line item. Size first, width before height.
pub fn dgu_attributes(priced: &Priced<NormalizedDgu>) -> Vec<OrderAttribute> {
    let unit = &priced.unit;
    let mut attrs = vec![
        OrderAttribute::new(
            "Size",
            format!("{}mm (W) x {}mm (H)", unit.width_mm, unit.height_mm),
        ),
        OrderAttribute::new("Unit Type", "Double Glazed Unit"),
        OrderAttribute::new("Outer Glass", unit.outer.as_str()),
        OrderAttribute::new("Inner Glass", unit.inner.as_str()),
    ];
    if let Some(cavity) = &unit.cavity {
        attrs.push(OrderAttribute::new("Cavity", cavity.clone()));
    }
    if let Some(spacer) = &unit.spacer {
        attrs.push(OrderAttribute::new("Spacer", spacer.clone()));
    }
    if unit.self_cleaning {
        attrs.push(OrderAttribute::new("Self Cleaning", "Yes"));
    }
    if unit.upgrade_applied {
        attrs.push(OrderAttribute::new(
            "Glass Upgraded",
            "4mm Clear → 6mm Clear (large unit)",
        ));
    }
    attrs.push(OrderAttribute::new(
        "Unit Price",
        unit_price_value(priced.unit_price, unit.discount_percent, unit.price_before_discount),
    ));
    attrs
}

/// Attributes for one skylight line item. Size first, height before width.
pub fn skylight_attributes(priced: &Priced<NormalizedSkylight>) -> Vec<OrderAttribute> {
    let unit = &priced.unit;
    let mut attrs = vec![
        OrderAttribute::new(
            "Internal Size",
            format!("{}mm (H) x {}mm (W)", unit.internal_height_mm, unit.internal_width_mm),
        ),
        OrderAttribute::new("Unit Type", "Skylight"),
    ];
    if let (Some(w), Some(h)) = (unit.external_width_mm, unit.external_height_mm) {
        attrs.push(OrderAttribute::new(
            "External Size",
            format!("{h}mm (H) x {w}mm (W)"),
        ));
    }
    if let Some(strength) = &unit.strength {
        attrs.push(OrderAttribute::new("Unit Strength", strength.clone()));
    }
    attrs.push(OrderAttribute::new("Glazing", unit.glazing.clone()));
    if let Some(tint) = &unit.tint {
        attrs.push(OrderAttribute::new("Tint", tint.clone()));
    }
    if unit.solar_control {
        attrs.push(OrderAttribute::new("Solar Control", "Yes"));
    }
    if unit.self_cleaning {
        attrs.push(OrderAttribute::new("Self Cleaning", "Yes"));
    }
    attrs.push(OrderAttribute::new(
        "Unit Price",
        unit_price_value(priced.unit_price, unit.discount_percent, unit.price_before_discount),
    ));
    attrs
}

fn dgu_summary(priced: &Priced<NormalizedDgu>) -> String {
    let unit = &priced.unit;
    format!(
        "{} x {}mm x {}mm {} / {} @ {}",
        unit.quantity,
        unit.width_mm,
        unit.height_mm,
        unit.outer.as_str(),
        unit.inner.as_str(),
        format_gbp(priced.unit_price),
    )
}

fn skylight_summary(priced: &Priced<NormalizedSkylight>) -> String {
    let unit = &priced.unit;
    format!(
        "{} x {}mm x {}mm {} @ {}",
        unit.quantity,
        unit.internal_height_mm,
        unit.internal_width_mm,
        unit.glazing,
        format_gbp(priced.unit_price),
    )
}

fn assemble(
    calculator: CalculatorType,
    anchor_variant: &str,
    items: Vec<(u32, Decimal, Decimal, Vec<OrderAttribute>)>,
    summaries: Vec<String>,
) -> DraftOrderRequest {
    let grand_total: Decimal = items.iter().map(|(_, _, line_total, _)| *line_total).sum();
    let total_units_qty: i64 = items.iter().map(|(qty, _, _, _)| i64::from(*qty)).sum();

    let line_items = items
        .into_iter()
        .map(|(quantity, unit_price, _, attributes)| OrderLineItem {
            variant_id: anchor_variant.to_owned(),
            quantity,
            unit_price,
            attributes,
        })
        .collect();

    let title = match calculator {
        CalculatorType::Dgu => "DGU calculator order",
        CalculatorType::Skylight => "Skylight calculator order",
    };
    let note = format!(
        "{title}\nUnits: {total_units_qty}\nGrand total: {}\n\n{}",
        format_gbp(grand_total),
        summaries.iter().join("\n"),
    );

    DraftOrderRequest {
        note,
        tags: vec![
            CompactString::const_new("calculator"),
            CompactString::new(calculator.as_str()),
        ],
        line_items,
        grand_total,
        total_units_qty,
    }
}

/// Assemble a DGU draft order.
pub fn assemble_dgu(anchor_variant: &str, priced: &[Priced<NormalizedDgu>]) -> DraftOrderRequest {
    let items = priced
        .iter()
        .map(|p| (p.unit.quantity, p.unit_price, p.line_total, dgu_attributes(p)))
        .collect();
    let summaries = priced.iter().map(dgu_summary).collect();
    assemble(CalculatorType::Dgu, anchor_variant, items, summaries)
}

/// Assemble a skylight draft order.
pub fn assemble_skylight(
    anchor_variant: &str,
    priced: &[Priced<NormalizedSkylight>],
) -> DraftOrderRequest {
    let items = priced
        .iter()
        .map(|p| (p.unit.quantity, p.unit_price, p.line_total, skylight_attributes(p)))
        .collect();
    let summaries = priced.iter().map(skylight_summary).collect();
    assemble(CalculatorType::Skylight, anchor_variant, items, summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::GlassSpec;
    use rust_decimal_macros::dec;

    fn priced_dgu(self_cleaning: bool, upgraded: bool) -> Priced<NormalizedDgu> {
        Priced {
            unit: NormalizedDgu {
                outer: if upgraded { GlassSpec::Clear6mm } else { GlassSpec::Clear4mm },
                inner: if upgraded { GlassSpec::Clear6mm } else { GlassSpec::Clear4mm },
                cavity: Some("20mm".into()),
                spacer: Some("Black Warm Edge".into()),
                self_cleaning,
                width_mm: 1000,
                height_mm: 1000,
                quantity: 2,
                upgrade_applied: upgraded,
                discount_percent: None,
                price_before_discount: None,
            },
            unit_price: dec!(61),
            line_total: dec!(122),
        }
    }

    fn priced_skylight() -> Priced<NormalizedSkylight> {
        Priced {
            unit: NormalizedSkylight {
                strength: Some("Standard".into()),
                glazing: "Double Glazed Toughened".into(),
                tint: None,
                solar_control: true,
                self_cleaning: false,
                internal_width_mm: 1200,
                internal_height_mm: 900,
                external_width_mm: Some(1300),
                external_height_mm: Some(1000),
                quantity: 1,
                unit_price: Some(dec!(420.50)),
                line_total: Some(dec!(420.50)),
                discount_percent: None,
                price_before_discount: None,
            },
            unit_price: dec!(420.50),
            line_total: dec!(420.50),
        }
    }

    #[test]
    fn dgu_attributes_start_with_size_width_first() {
        let attrs = dgu_attributes(&priced_dgu(false, false));
        assert_eq!(attrs[0].key, "Size");
        assert_eq!(attrs[0].value, "1000mm (W) x 1000mm (H)");
        assert_eq!(attrs[1].key, "Unit Type");
        assert_eq!(attrs[2].key, "Outer Glass");
        assert_eq!(attrs[3].key, "Inner Glass");
        assert_eq!(attrs.last().unwrap().key, "Unit Price");
    }

    #[test]
    fn falsy_optional_attributes_are_omitted() {
        let attrs = dgu_attributes(&priced_dgu(false, false));
        assert!(attrs.iter().all(|a| a.key != "Self Cleaning"));
        assert!(attrs.iter().all(|a| a.key != "Glass Upgraded"));

        let attrs = dgu_attributes(&priced_dgu(true, true));
        assert!(attrs.iter().any(|a| a.key == "Self Cleaning" && a.value == "Yes"));
        assert!(attrs.iter().any(|a| a.key == "Glass Upgraded"));
    }

    #[test]
    fn skylight_attributes_start_with_internal_size_height_first() {
        let attrs = skylight_attributes(&priced_skylight());
        assert_eq!(attrs[0].key, "Internal Size");
        assert_eq!(attrs[0].value, "900mm (H) x 1200mm (W)");
        assert_eq!(attrs[1].key, "Unit Type");
        assert!(attrs.iter().any(|a| a.key == "External Size"));
        assert!(attrs.iter().any(|a| a.key == "Solar Control" && a.value == "Yes"));
        assert!(attrs.iter().all(|a| a.key != "Self Cleaning"));
        assert!(attrs.iter().all(|a| a.key != "Tint"));
    }

    #[test]
    fn discount_renders_before_and_after() {
        let mut priced = priced_dgu(false, false);
        priced.unit.discount_percent = Some(dec!(15));
        priced.unit.price_before_discount = Some(dec!(71.76));
        let attrs = dgu_attributes(&priced);
        let price_attr = attrs.last().unwrap();
        assert_eq!(price_attr.value, "£71.76 → £61.00 (15% off)");
    }

    #[test]
    fn totals_are_recomputed_from_line_items() {
        let order = assemble_dgu("gid://variant/1", &[priced_dgu(false, false), priced_dgu(true, false)]);
        assert_eq!(order.grand_total, dec!(244));
        assert_eq!(order.total_units_qty, 4);
        assert_eq!(order.line_items.len(), 2);
        assert!(order.line_items.iter().all(|li| li.variant_id == "gid://variant/1"));
    }

    #[test]
    fn empty_order_totals_are_zero() {
        let order = assemble_dgu("gid://variant/1", &[]);
        assert_eq!(order.grand_total, Decimal::ZERO);
        assert_eq!(order.total_units_qty, 0);
        assert!(order.line_items.is_empty());
    }

    #[test]
    fn note_carries_totals_and_unit_summaries() {
        let order = assemble_skylight("gid://variant/2", &[priced_skylight()]);
        assert!(order.note.contains("Skylight calculator order"));
        assert!(order.note.contains("Units: 1"));
        assert!(order.note.contains("Grand total: £420.50"));
        assert!(order.note.contains("Double Glazed Toughened"));
        assert_eq!(order.tags, vec!["calculator", "skylight"]);
    }
}
