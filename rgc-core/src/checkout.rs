//! The checkout pipeline.
//!
//! Orchestrates normalize → price → assemble → submit → poll for a single
//! verified submission. Every normalization and pricing failure rejects the
//! whole order before any network call; the platform is never handed a
//! partially priced order.

use rust_decimal::Decimal;
use thiserror::Error;

use rgc_sdk::objects::{CalculatorSubmission, CalculatorType, CheckoutPayload};

use crate::config::RuntimeConfig;
use crate::gateway::{OrderPlatform, PlatformError, resolve_invoice_url};
use crate::order::{DraftOrderRequest, assemble_dgu, assemble_skylight, format_gbp};
use crate::pricing::{
    Priced, dgu_total_tolerance, skylight::validate_skylight_pricing, skylight_price_tolerance,
};
use crate::units::{UnitConfigError, dgu::normalize_dgu, skylight::normalize_skylight};

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub order_id: String,
    pub invoice_url: String,
    pub calculator_type: CalculatorType,
    /// Grand total as presented to the caller, rounded to 2 dp.
    pub grand_total: Decimal,
    pub total_units_qty: i64,
}

/// Everything that can go wrong after authentication.
///
/// [`CheckoutError::reason`] yields the stable machine-readable code for the
/// error body; the HTTP status mapping lives at the server boundary.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("units must not be empty")]
    EmptyUnits,

    #[error("unit {unit_index}: {source}")]
    InvalidConfiguration {
        unit_index: usize,
        source: UnitConfigError,
    },

    /// No rate table entry covers the unit; the order is rejected rather
    /// than accepted at zero cost.
    #[error("unit {unit_index} has no priced configuration")]
    Unpriced { unit_index: usize },

    #[error("unit {unit_index}: declared price {declared} does not match expected {expected}")]
    PriceMismatch {
        unit_index: usize,
        declared: Decimal,
        expected: Decimal,
    },

    #[error("declared grand total {declared} does not match computed {computed}")]
    TotalMismatch { declared: Decimal, computed: Decimal },

    /// The platform rejected the order with merchant-facing messages,
    /// surfaced verbatim. Never retried.
    #[error("order rejected: {}", .0.join("; "))]
    PlatformRejected(Vec<String>),

    #[error("order platform failure: {0}")]
    Platform(#[from] PlatformError),

    /// The order exists but its invoice URL never resolved; reported as a
    /// distinct condition so operators can reconcile it manually.
    #[error("order {order_id} created but invoice URL did not resolve")]
    InvoiceUnresolved { order_id: String },
}

impl CheckoutError {
    /// Stable reason code for error responses.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyUnits => "empty_units",
            Self::InvalidConfiguration { .. } => "invalid_configuration",
            Self::Unpriced { .. } => "unpriced_configuration",
            Self::PriceMismatch { .. } => "price_mismatch",
            Self::TotalMismatch { .. } => "total_mismatch",
            Self::PlatformRejected(_) => "platform_rejected",
            Self::Platform(_) => "platform_unavailable",
            Self::InvoiceUnresolved { .. } => "invoice_url_unresolved",
        }
    }
}

/// Process one verified checkout submission end to end.
pub async fn process_checkout(
    config: &RuntimeConfig,
    platform: &dyn OrderPlatform,
    payload: &CheckoutPayload,
) -> Result<CheckoutOutcome, CheckoutError> {
    let calculator = payload.calculator_type();
    let order = match payload {
        CheckoutPayload::Dgu(submission) => build_dgu_order(config, submission)?,
        CheckoutPayload::Skylight(submission) => build_skylight_order(config, submission)?,
    };

    check_declared_quantity(&order, declared_quantity(payload));

    submit(config, platform, calculator, order).await
}

fn declared_quantity(payload: &CheckoutPayload) -> Option<i64> {
    match payload {
        CheckoutPayload::Dgu(s) => s.total_units_qty,
        CheckoutPayload::Skylight(s) => s.total_units_qty,
    }
}

/// Declared unit counts are informational only; log drift, keep the
/// recomputed value.
fn check_declared_quantity(order: &DraftOrderRequest, declared: Option<i64>) {
    if let Some(declared) = declared
        && declared != order.total_units_qty
    {
        tracing::warn!(
            declared,
            computed = order.total_units_qty,
            "declared unit quantity differs from computed"
        );
    }
}

fn build_dgu_order(
    config: &RuntimeConfig,
    submission: &CalculatorSubmission<rgc_sdk::objects::DguUnitPayload>,
) -> Result<DraftOrderRequest, CheckoutError> {
    if submission.units.is_empty() {
        return Err(CheckoutError::EmptyUnits);
    }

    let mut priced = Vec::with_capacity(submission.units.len());
    for (unit_index, raw) in submission.units.iter().enumerate() {
        let unit = normalize_dgu(raw)
            .map_err(|source| CheckoutError::InvalidConfiguration { unit_index, source })?;
        let unit_price = config
            .dgu_rates
            .price(&unit)
            .filter(|p| *p > Decimal::ZERO)
            .ok_or(CheckoutError::Unpriced { unit_index })?;
        let line_total = unit_price * Decimal::from(unit.quantity);
        priced.push(Priced {
            unit,
            unit_price,
            line_total,
        });
    }

    let order = assemble_dgu(config.platform.anchor_variant(CalculatorType::Dgu), &priced);

    // DGU pricing is server-authoritative; a declared total only cross-checks
    // storefront drift.
    if let Some(declared) = submission.grand_total
        && (declared - order.grand_total).abs() > dgu_total_tolerance()
    {
        return Err(CheckoutError::TotalMismatch {
            declared,
            computed: order.grand_total,
        });
    }

    Ok(order)
}

fn build_skylight_order(
    config: &RuntimeConfig,
    submission: &CalculatorSubmission<rgc_sdk::objects::SkylightUnitPayload>,
) -> Result<DraftOrderRequest, CheckoutError> {
    if submission.units.is_empty() {
        return Err(CheckoutError::EmptyUnits);
    }

    let mut priced = Vec::with_capacity(submission.units.len());
    for (unit_index, raw) in submission.units.iter().enumerate() {
        let unit = normalize_skylight(raw)
            .map_err(|source| CheckoutError::InvalidConfiguration { unit_index, source })?;
        let validated = validate_skylight_pricing(&unit).map_err(|e| match e {
            crate::pricing::skylight::SkylightPricingError::Unpriced => {
                CheckoutError::Unpriced { unit_index }
            }
            crate::pricing::skylight::SkylightPricingError::Mismatch { declared, expected } => {
                CheckoutError::PriceMismatch {
                    unit_index,
                    declared,
                    expected,
                }
            }
        })?;
        priced.push(validated);
    }

    let order = assemble_skylight(
        config.platform.anchor_variant(CalculatorType::Skylight),
        &priced,
    );

    if let Some(declared) = submission.grand_total
        && (declared - order.grand_total).abs() > skylight_price_tolerance()
    {
        return Err(CheckoutError::TotalMismatch {
            declared,
            computed: order.grand_total,
        });
    }

    Ok(order)
}

async fn submit(
    config: &RuntimeConfig,
    platform: &dyn OrderPlatform,
    calculator: CalculatorType,
    order: DraftOrderRequest,
) -> Result<CheckoutOutcome, CheckoutError> {
    let created = platform.create_order(&order).await.map_err(|e| match e {
        PlatformError::UserErrors(messages) => CheckoutError::PlatformRejected(messages),
        other => CheckoutError::Platform(other),
    })?;

    let invoice_url = resolve_invoice_url(platform, &created, config.platform.invoice_retry)
        .await?
        .ok_or_else(|| CheckoutError::InvoiceUnresolved {
            order_id: created.order_id.clone(),
        })?;

    tracing::info!(
        order_id = %created.order_id,
        calculator = %calculator,
        grand_total = %format_gbp(order.grand_total),
        units = order.total_units_qty,
        "checkout completed"
    );

    Ok(CheckoutOutcome {
        order_id: created.order_id,
        invoice_url,
        calculator_type: calculator,
        grand_total: order.grand_total.round_dp(2),
        total_units_qty: order.total_units_qty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlatformConfig, RuntimeConfig, SigningConfig};
    use crate::gateway::{PlatformOrder, RetryPolicy};
    use crate::pricing::dgu::DguRateTable;
    use async_trait::async_trait;
    use rgc_sdk::objects::{DguUnitPayload, Flag, SkylightUnitPayload};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn test_config() -> RuntimeConfig {
        RuntimeConfig {
            signing: SigningConfig::new(b"secret".as_slice(), 300_000, vec![]),
            platform: PlatformConfig {
                api_url: "https://shop.example/admin/api/graphql.json".parse().unwrap(),
                access_token: "token".into(),
                dgu_anchor_variant: "gid://variant/dgu".into(),
                skylight_anchor_variant: "gid://variant/skylight".into(),
                invoice_retry: RetryPolicy {
                    attempts: 3,
                    delay: Duration::ZERO,
                },
            },
            dgu_rates: DguRateTable::standard(),
        }
    }

    /// Counting platform double with scriptable behavior.
    struct FakePlatform {
        create_calls: AtomicU32,
        user_errors: Option<Vec<String>>,
        invoice_url: Option<String>,
    }

    impl FakePlatform {
        fn happy() -> Self {
            Self {
                create_calls: AtomicU32::new(0),
                user_errors: None,
                invoice_url: Some("https://shop.example/invoice/1".into()),
            }
        }

        fn rejecting(messages: Vec<String>) -> Self {
            Self {
                create_calls: AtomicU32::new(0),
                user_errors: Some(messages),
                invoice_url: None,
            }
        }

        fn never_resolving() -> Self {
            Self {
                create_calls: AtomicU32::new(0),
                user_errors: None,
                invoice_url: None,
            }
        }
    }

    #[async_trait]
    impl OrderPlatform for FakePlatform {
        async fn create_order(
            &self,
            _order: &DraftOrderRequest,
        ) -> Result<PlatformOrder, PlatformError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(messages) = &self.user_errors {
                return Err(PlatformError::UserErrors(messages.clone()));
            }
            Ok(PlatformOrder {
                order_id: "gid://DraftOrder/77".into(),
                invoice_url: self.invoice_url.clone(),
            })
        }

        async fn fetch_invoice_url(&self, _order_id: &str) -> Result<Option<String>, PlatformError> {
            Ok(self.invoice_url.clone())
        }
    }

    fn dgu_unit(width: f64, height: f64, self_cleaning: bool) -> DguUnitPayload {
        DguUnitPayload {
            outer_glass: Some("4mm Clear".into()),
            inner_glass: Some("4mm Clear".into()),
            cavity: Some("20mm".into()),
            spacer: Some("Black Warm Edge".into()),
            self_cleaning: Flag(self_cleaning),
            width: Some(width),
            height: Some(height),
            quantity: Some(1),
            ..Default::default()
        }
    }

    fn dgu_payload(units: Vec<DguUnitPayload>, grand_total: Option<Decimal>) -> CheckoutPayload {
        CheckoutPayload::Dgu(CalculatorSubmission {
            total_units_qty: None,
            grand_total,
            units,
        })
    }

    #[tokio::test]
    async fn two_dgu_units_sum_with_self_cleaning_surcharge_on_one() {
        let config = test_config();
        let platform = FakePlatform::happy();
        // 1.0 m² each: £61 plain, £73 with the £12/m² self-cleaning rate.
        let payload = dgu_payload(
            vec![dgu_unit(1000.0, 1000.0, false), dgu_unit(1000.0, 1000.0, true)],
            None,
        );
        let outcome = process_checkout(&config, &platform, &payload).await.unwrap();
        assert_eq!(outcome.grand_total, dec!(134.00));
        assert_eq!(outcome.total_units_qty, 2);
        assert_eq!(outcome.invoice_url, "https://shop.example/invoice/1");
    }

    #[tokio::test]
    async fn large_base_tier_unit_is_upgraded_then_priced() {
        let config = test_config();
        let platform = FakePlatform::happy();
        // 2500 x 1000 = 2.5 m² upgrades both panes to 6mm Clear; band
        // 2.0-2.50 rate for that pair is £64/m² → £160.
        let payload = dgu_payload(vec![dgu_unit(2500.0, 1000.0, false)], None);
        let outcome = process_checkout(&config, &platform, &payload).await.unwrap();
        assert_eq!(outcome.grand_total, dec!(160.00));
    }

    #[tokio::test]
    async fn empty_units_rejected_before_any_platform_call() {
        let config = test_config();
        let platform = FakePlatform::happy();
        let payload = dgu_payload(vec![], None);
        let err = process_checkout(&config, &platform, &payload).await.unwrap_err();
        assert_eq!(err.reason(), "empty_units");
        assert_eq!(platform.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_unit_rejects_whole_order_before_any_platform_call() {
        let config = test_config();
        let platform = FakePlatform::happy();
        let mut bad = dgu_unit(1000.0, 1000.0, false);
        bad.outer_glass = None;
        let payload = dgu_payload(vec![dgu_unit(1000.0, 1000.0, false), bad], None);
        let err = process_checkout(&config, &platform, &payload).await.unwrap_err();
        assert_eq!(err.reason(), "invalid_configuration");
        assert_eq!(platform.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn declared_dgu_total_within_tolerance_passes() {
        let config = test_config();
        let platform = FakePlatform::happy();
        let payload = dgu_payload(vec![dgu_unit(1000.0, 1000.0, false)], Some(dec!(61.05)));
        assert!(process_checkout(&config, &platform, &payload).await.is_ok());
    }

    #[tokio::test]
    async fn declared_dgu_total_beyond_tolerance_is_rejected() {
        let config = test_config();
        let platform = FakePlatform::happy();
        let payload = dgu_payload(vec![dgu_unit(1000.0, 1000.0, false)], Some(dec!(59.00)));
        let err = process_checkout(&config, &platform, &payload).await.unwrap_err();
        assert_eq!(err.reason(), "total_mismatch");
        assert_eq!(platform.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn platform_user_errors_surface_verbatim_without_retry() {
        let config = test_config();
        let platform =
            FakePlatform::rejecting(vec!["Variant is archived".into(), "Tag too long".into()]);
        let payload = dgu_payload(vec![dgu_unit(1000.0, 1000.0, false)], None);
        let err = process_checkout(&config, &platform, &payload).await.unwrap_err();
        let CheckoutError::PlatformRejected(messages) = err else {
            panic!("expected PlatformRejected, got {err:?}");
        };
        assert_eq!(messages, vec!["Variant is archived", "Tag too long"]);
        assert_eq!(platform.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unresolved_invoice_reports_order_id_for_reconciliation() {
        let config = test_config();
        let platform = FakePlatform::never_resolving();
        let payload = dgu_payload(vec![dgu_unit(1000.0, 1000.0, false)], None);
        let err = process_checkout(&config, &platform, &payload).await.unwrap_err();
        let CheckoutError::InvoiceUnresolved { order_id } = err else {
            panic!("expected InvoiceUnresolved, got {err:?}");
        };
        assert_eq!(order_id, "gid://DraftOrder/77");
        assert_eq!(platform.create_calls.load(Ordering::SeqCst), 1);
    }

    fn skylight_unit() -> SkylightUnitPayload {
        SkylightUnitPayload {
            glazing: Some("Double Glazed Toughened".into()),
            strength: Some("Standard".into()),
            internal_width: Some(1000.0),
            internal_height: Some(1000.0),
            quantity: Some(2),
            unit_price: Some(dec!(389.00)),
            line_total: Some(dec!(778.00)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn skylight_declared_prices_validated_and_summed() {
        let config = test_config();
        let platform = FakePlatform::happy();
        let payload = CheckoutPayload::Skylight(CalculatorSubmission {
            total_units_qty: Some(2),
            grand_total: Some(dec!(778.00)),
            units: vec![skylight_unit()],
        });
        let outcome = process_checkout(&config, &platform, &payload).await.unwrap();
        assert_eq!(outcome.grand_total, dec!(778.00));
        assert_eq!(outcome.total_units_qty, 2);
    }

    #[tokio::test]
    async fn skylight_geometry_violation_rejects_not_clamps() {
        let config = test_config();
        let platform = FakePlatform::happy();
        let mut unit = skylight_unit();
        unit.internal_width = Some(1900.0);
        unit.internal_height = Some(500.0);
        let payload = CheckoutPayload::Skylight(CalculatorSubmission {
            total_units_qty: None,
            grand_total: None,
            units: vec![unit],
        });
        let err = process_checkout(&config, &platform, &payload).await.unwrap_err();
        assert_eq!(err.reason(), "invalid_configuration");
        assert_eq!(platform.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn skylight_price_mismatch_is_rejected() {
        let config = test_config();
        let platform = FakePlatform::happy();
        let mut unit = skylight_unit();
        unit.line_total = Some(dec!(779.00));
        let payload = CheckoutPayload::Skylight(CalculatorSubmission {
            total_units_qty: None,
            grand_total: None,
            units: vec![unit],
        });
        let err = process_checkout(&config, &platform, &payload).await.unwrap_err();
        assert_eq!(err.reason(), "price_mismatch");
        assert_eq!(platform.create_calls.load(Ordering::SeqCst), 0);
    }
}
