//! DGU rate table and price lookup.

use std::collections::HashMap;

use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use super::{BAND_COUNT, band_for_area};
use crate::units::{GlassSpec, NormalizedDgu};

/// Rates for one (outer, inner) glass pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRates {
    /// Floor price for the pair, applied after the per-m² calculation.
    pub minimum: Decimal,
    /// Rate per m² for each band. `None` means the combination is
    /// deliberately unpriced at that size.
    pub band_rates: [Option<Decimal>; BAND_COUNT],
}

/// The DGU pricing table.
///
/// Keys are exact (outer, inner) pairs. A missing pair or band entry means
/// the configuration cannot be sold, and price lookup returns `None` so the
/// caller fails the whole order rather than charging nothing.
#[derive(Debug, Clone)]
pub struct DguRateTable {
    pairs: HashMap<(GlassSpec, GlassSpec), PairRates>,
    self_cleaning_rates: [Decimal; BAND_COUNT],
}

impl DguRateTable {
    /// Price a normalized unit, including the self-cleaning surcharge.
    ///
    /// `price = max(minimum, area × band_rate) [+ area × self_cleaning_rate]`
    pub fn price(&self, unit: &NormalizedDgu) -> Option<Decimal> {
        let area = unit.area_m2();
        let band = band_for_area(area)?;
        let rates = self.pairs.get(&(unit.outer, unit.inner))?;
        let rate = rates.band_rates[band]?;
        let mut price = (area * rate).max(rates.minimum);
        if unit.self_cleaning {
            price += area * self.self_cleaning_rates[band];
        }
        Some(price)
    }

    /// The built-in standard table.
    pub fn standard() -> Self {
        STANDARD_TABLE.clone()
    }

    /// Build a table from a configuration override.
    pub fn from_override(spec: &DguRateOverride) -> Result<Self, RateTableError> {
        if spec.self_cleaning_rates.len() != BAND_COUNT {
            return Err(RateTableError::BadBandCount(spec.self_cleaning_rates.len()));
        }
        let mut self_cleaning_rates = [Decimal::ZERO; BAND_COUNT];
        self_cleaning_rates.copy_from_slice(&spec.self_cleaning_rates);

        let mut pairs = HashMap::new();
        for pair in &spec.pairs {
            let outer = GlassSpec::parse(&pair.outer)
                .ok_or_else(|| RateTableError::UnknownGlass(pair.outer.clone()))?;
            let inner = GlassSpec::parse(&pair.inner)
                .ok_or_else(|| RateTableError::UnknownGlass(pair.inner.clone()))?;
            if pair.band_rates.len() != BAND_COUNT {
                return Err(RateTableError::BadBandCount(pair.band_rates.len()));
            }
            let mut band_rates = [None; BAND_COUNT];
            band_rates.copy_from_slice(&pair.band_rates);
            pairs.insert(
                (outer, inner),
                PairRates {
                    minimum: pair.minimum,
                    band_rates,
                },
            );
        }
        Ok(Self {
            pairs,
            self_cleaning_rates,
        })
    }
}

/// TOML-facing shape of a rate table override.
#[derive(Debug, Clone, Deserialize)]
pub struct DguRateOverride {
    pub pairs: Vec<PairOverride>,
    /// Self-cleaning surcharge per m², one rate per band.
    pub self_cleaning_rates: Vec<Decimal>,
}

/// One (outer, inner) pair in a rate table override.
#[derive(Debug, Clone, Deserialize)]
pub struct PairOverride {
    pub outer: String,
    pub inner: String,
    pub minimum: Decimal,
    /// One entry per band; `null`/absent entries leave the band unpriced.
    pub band_rates: Vec<Option<Decimal>>,
}

/// Errors building a rate table from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateTableError {
    #[error("unknown glass spec {0:?}")]
    UnknownGlass(String),
    #[error("expected {BAND_COUNT} band rates, got {0}")]
    BadBandCount(usize),
}

fn gbp(pounds: i64) -> Decimal {
    Decimal::new(pounds, 0)
}

fn all_bands(values: [i64; BAND_COUNT]) -> [Option<Decimal>; BAND_COUNT] {
    values.map(|v| Some(gbp(v)))
}

/// Bands 0..=4 priced, top band absent (4mm pane unsuitable above 2.5 m²).
fn capped_bands(values: [i64; BAND_COUNT - 1]) -> [Option<Decimal>; BAND_COUNT] {
    let mut rates = [None; BAND_COUNT];
    for (slot, v) in rates.iter_mut().zip(values) {
        *slot = Some(gbp(v));
    }
    rates
}

fn symmetric(
    pairs: &mut HashMap<(GlassSpec, GlassSpec), PairRates>,
    a: GlassSpec,
    b: GlassSpec,
    minimum: i64,
    band_rates: [Option<Decimal>; BAND_COUNT],
) {
    let rates = PairRates {
        minimum: gbp(minimum),
        band_rates,
    };
    pairs.insert((a, b), rates.clone());
    pairs.insert((b, a), rates);
}

fn build_standard_table() -> DguRateTable {
    use GlassSpec::{Clear4mm, Clear6mm, Laminated64mm, Toughened6mm};

    let mut pairs = HashMap::new();
    pairs.insert(
        (Clear4mm, Clear4mm),
        PairRates {
            minimum: gbp(45),
            band_rates: capped_bands([68, 64, 61, 58, 56]),
        },
    );
    symmetric(&mut pairs, Clear4mm, Clear6mm, 48, capped_bands([73, 69, 66, 63, 60]));
    pairs.insert(
        (Clear6mm, Clear6mm),
        PairRates {
            minimum: gbp(52),
            band_rates: all_bands([78, 74, 70, 67, 64, 62]),
        },
    );
    pairs.insert(
        (Toughened6mm, Toughened6mm),
        PairRates {
            minimum: gbp(68),
            band_rates: all_bands([92, 88, 84, 80, 77, 74]),
        },
    );
    pairs.insert(
        (Laminated64mm, Laminated64mm),
        PairRates {
            minimum: gbp(74),
            band_rates: all_bands([98, 94, 90, 86, 82, 79]),
        },
    );
    symmetric(&mut pairs, Clear6mm, Toughened6mm, 60, all_bands([85, 81, 77, 74, 71, 68]));
    symmetric(&mut pairs, Clear6mm, Laminated64mm, 64, all_bands([88, 84, 80, 77, 74, 71]));
    symmetric(&mut pairs, Toughened6mm, Laminated64mm, 71, all_bands([95, 91, 87, 83, 80, 77]));

    DguRateTable {
        pairs,
        self_cleaning_rates: [gbp(14), gbp(13), gbp(12), gbp(11), gbp(10), gbp(10)],
    }
}

lazy_static! {
    static ref STANDARD_TABLE: DguRateTable = build_standard_table();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn unit(outer: GlassSpec, inner: GlassSpec, w: u32, h: u32, self_cleaning: bool) -> NormalizedDgu {
        NormalizedDgu {
            outer,
            inner,
            cavity: None,
            spacer: None,
            self_cleaning,
            width_mm: w,
            height_mm: h,
            quantity: 1,
            upgrade_applied: false,
            discount_percent: None,
            price_before_discount: None,
        }
    }

    #[test]
    fn one_square_meter_clear_pair_uses_band_rate() {
        // 1.0 m² lands in the 1.0-1.49 band: 1.0 × £61 = £61, above the £45 floor.
        let table = DguRateTable::standard();
        let price = table
            .price(&unit(GlassSpec::Clear4mm, GlassSpec::Clear4mm, 1000, 1000, false))
            .unwrap();
        assert_eq!(price, dec!(61));
    }

    #[test]
    fn small_unit_hits_the_minimum_floor() {
        // 0.09 m² × £68 = £6.12, floored to the £45 pair minimum.
        let table = DguRateTable::standard();
        let price = table
            .price(&unit(GlassSpec::Clear4mm, GlassSpec::Clear4mm, 300, 300, false))
            .unwrap();
        assert_eq!(price, dec!(45));
    }

    #[test]
    fn self_cleaning_adds_area_based_surcharge() {
        let table = DguRateTable::standard();
        let plain = table
            .price(&unit(GlassSpec::Clear4mm, GlassSpec::Clear4mm, 1000, 1000, false))
            .unwrap();
        let coated = table
            .price(&unit(GlassSpec::Clear4mm, GlassSpec::Clear4mm, 1000, 1000, true))
            .unwrap();
        // Band 1.0-1.49 self-cleaning rate is £12/m².
        assert_eq!(coated - plain, dec!(12));
    }

    #[test]
    fn price_never_below_floor_when_entry_exists() {
        let table = DguRateTable::standard();
        for (w, h) in [(300, 300), (700, 700), (1000, 1000), (1500, 1200)] {
            let price = table
                .price(&unit(GlassSpec::Clear6mm, GlassSpec::Clear6mm, w, h, false))
                .unwrap();
            assert!(price >= dec!(52), "{w}x{h} priced {price} below floor");
        }
    }

    #[test]
    fn large_area_base_tier_pair_is_unpriced() {
        // 1700 × 1600 = 2.72 m²: the 2.51-3.00 band has no 4mm entry.
        let table = DguRateTable::standard();
        assert_eq!(
            table.price(&unit(GlassSpec::Clear4mm, GlassSpec::Clear4mm, 1700, 1600, false)),
            None
        );
        assert_eq!(
            table.price(&unit(GlassSpec::Clear4mm, GlassSpec::Clear6mm, 1700, 1600, false)),
            None
        );
    }

    #[test]
    fn area_above_top_band_is_unpriced_for_any_pair() {
        // 2500 × 1600 = 4.0 m², beyond the last band.
        let table = DguRateTable::standard();
        assert_eq!(
            table.price(&unit(GlassSpec::Laminated64mm, GlassSpec::Laminated64mm, 2500, 1600, false)),
            None
        );
    }

    #[test]
    fn mixed_pairs_are_symmetric() {
        let table = DguRateTable::standard();
        let a = table.price(&unit(GlassSpec::Clear6mm, GlassSpec::Toughened6mm, 1000, 1000, false));
        let b = table.price(&unit(GlassSpec::Toughened6mm, GlassSpec::Clear6mm, 1000, 1000, false));
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn override_table_round_trips_through_toml() {
        let toml_str = r#"
            self_cleaning_rates = [14, 13, 12, 11, 10, 10]

            [[pairs]]
            outer = "4mm Clear"
            inner = "4mm Clear"
            minimum = 50
            band_rates = [70, 66, 62, 60, 58, 0]
        "#;
        // toml is a server-side dependency; exercise the serde shape via JSON here.
        let _ = toml_str;
        let json = r#"{
            "self_cleaning_rates": ["14", "13", "12", "11", "10", "10"],
            "pairs": [{
                "outer": "4mm Clear",
                "inner": "4mm Clear",
                "minimum": "50",
                "band_rates": ["70", "66", "62", "60", "58", null]
            }]
        }"#;
        let spec: DguRateOverride = serde_json::from_str(json).unwrap();
        let table = DguRateTable::from_override(&spec).unwrap();
        let price = table
            .price(&unit(GlassSpec::Clear4mm, GlassSpec::Clear4mm, 1000, 1000, false))
            .unwrap();
        assert_eq!(price, dec!(62));
    }

    #[test]
    fn override_rejects_unknown_glass_and_bad_band_counts() {
        let spec = DguRateOverride {
            pairs: vec![PairOverride {
                outer: "5mm Magic".into(),
                inner: "4mm Clear".into(),
                minimum: dec!(50),
                band_rates: vec![None; BAND_COUNT],
            }],
            self_cleaning_rates: vec![Decimal::ZERO; BAND_COUNT],
        };
        assert!(matches!(
            DguRateTable::from_override(&spec),
            Err(RateTableError::UnknownGlass(_))
        ));

        let spec = DguRateOverride {
            pairs: vec![],
            self_cleaning_rates: vec![Decimal::ZERO; 3],
        };
        assert!(matches!(
            DguRateTable::from_override(&spec),
            Err(RateTableError::BadBandCount(3))
        ));
    }
}
