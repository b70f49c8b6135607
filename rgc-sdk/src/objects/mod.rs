//! Wire types exchanged with the storefront.

pub mod checkout;
pub mod units;

pub use checkout::{
    CalculatorSubmission, CalculatorType, CheckoutPayload, CheckoutResponse, ErrorBody,
};
pub use units::{DguUnitPayload, Flag, SkylightUnitPayload};
