//! Checkout envelope, response, and error body shapes.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::units::{DguUnitPayload, SkylightUnitPayload};

/// The calculator that produced a submission.
///
/// This is a closed set: unknown `calculatorType` values fail
/// deserialization of [`CheckoutPayload`] and are rejected at the HTTP
/// boundary, never guessed per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculatorType {
    #[serde(rename = "dgu")]
    Dgu,
    #[serde(rename = "skylight")]
    Skylight,
}

impl CalculatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dgu => "dgu",
            Self::Skylight => "skylight",
        }
    }
}

impl std::fmt::Display for CalculatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common submission envelope shared by both calculators.
///
/// `total_units_qty` and `grand_total` are client-declared figures; the
/// server recomputes or cross-checks them and never trusts them outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorSubmission<T> {
    #[serde(default)]
    pub total_units_qty: Option<i64>,
    #[serde(default)]
    pub grand_total: Option<Decimal>,
    pub units: Vec<T>,
}

/// A full checkout submission, tagged by calculator type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculatorType")]
pub enum CheckoutPayload {
    #[serde(rename = "dgu")]
    Dgu(CalculatorSubmission<DguUnitPayload>),
    #[serde(rename = "skylight")]
    Skylight(CalculatorSubmission<SkylightUnitPayload>),
}

impl CheckoutPayload {
    pub fn calculator_type(&self) -> CalculatorType {
        match self {
            Self::Dgu(_) => CalculatorType::Dgu,
            Self::Skylight(_) => CalculatorType::Skylight,
        }
    }

    pub fn unit_count(&self) -> usize {
        match self {
            Self::Dgu(s) => s.units.len(),
            Self::Skylight(s) => s.units.len(),
        }
    }
}

/// Successful checkout response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Invoice URL rendered by the order platform.
    pub invoice_url: String,
    /// Platform order id, for support correlation.
    pub order_id: String,
    pub calculator_type: CalculatorType,
    /// Server-computed grand total, rounded to 2 decimal places.
    pub grand_total: Decimal,
    pub total_units_qty: i64,
}

/// Error response body.
///
/// `reason` is a stable machine-readable code; `message` is safe,
/// human-readable text. Neither ever carries secret material or the
/// expected signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub reason: CompactString,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Present when an order was created but could not be fully resolved,
    /// so operators can reconcile it manually.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn payload_is_tagged_by_calculator_type() {
        let json = r#"{
            "calculatorType": "dgu",
            "totalUnitsQty": 2,
            "grandTotal": 199.90,
            "units": [{"outerGlass": "4mm Clear", "innerGlass": "4mm Clear", "width": 500, "height": 500}]
        }"#;
        let payload: CheckoutPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.calculator_type(), CalculatorType::Dgu);
        assert_eq!(payload.unit_count(), 1);
        let CheckoutPayload::Dgu(submission) = payload else {
            panic!("expected dgu submission");
        };
        assert_eq!(submission.grand_total, Some(dec!(199.90)));
    }

    #[test]
    fn unknown_calculator_type_is_rejected() {
        let json = r#"{"calculatorType": "conservatory", "units": []}"#;
        assert!(serde_json::from_str::<CheckoutPayload>(json).is_err());
    }

    #[test]
    fn missing_calculator_type_is_rejected() {
        let json = r#"{"units": []}"#;
        assert!(serde_json::from_str::<CheckoutPayload>(json).is_err());
    }
}
