//! `POST /checkout` — the calculator checkout handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use compact_str::CompactString;
use uuid::Uuid;

use rgc_core::checkout::{CheckoutError, process_checkout};
use rgc_sdk::objects::{CheckoutPayload, CheckoutResponse, ErrorBody};

use crate::api::extractors::SignedBody;
use crate::state::AppState;

/// Handle one verified checkout submission.
///
/// The extractor has already authenticated the request; from here every
/// validation or pricing failure rejects the order before the platform is
/// contacted.
pub(crate) async fn checkout(
    State(state): State<AppState>,
    SignedBody(payload): SignedBody<CheckoutPayload>,
) -> Result<Json<CheckoutResponse>, CheckoutApiError> {
    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        calculator = %payload.calculator_type(),
        units = payload.unit_count(),
        "checkout received"
    );

    match process_checkout(&state.config, state.platform.as_ref(), &payload).await {
        Ok(outcome) => Ok(Json(CheckoutResponse {
            invoice_url: outcome.invoice_url,
            order_id: outcome.order_id,
            calculator_type: outcome.calculator_type,
            grand_total: outcome.grand_total,
            total_units_qty: outcome.total_units_qty,
        })),
        Err(error) => Err(CheckoutApiError { request_id, error }),
    }
}

/// A failed checkout, carrying the request id for support correlation.
#[derive(Debug)]
pub(crate) struct CheckoutApiError {
    request_id: Uuid,
    error: CheckoutError,
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> Response {
        let reason = self.error.reason();
        let (status, message, order_id) = match &self.error {
            CheckoutError::EmptyUnits => {
                (StatusCode::BAD_REQUEST, self.error.to_string(), None)
            }
            CheckoutError::InvalidConfiguration { .. }
            | CheckoutError::Unpriced { .. }
            | CheckoutError::PriceMismatch { .. }
            | CheckoutError::TotalMismatch { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.error.to_string(), None)
            }
            // Merchant-facing messages from the platform are safe to
            // surface verbatim.
            CheckoutError::PlatformRejected(_) => {
                (StatusCode::BAD_REQUEST, self.error.to_string(), None)
            }
            CheckoutError::Platform(inner) => {
                tracing::error!(
                    request_id = %self.request_id,
                    error = %inner,
                    "order platform failure"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    "order platform failure".to_owned(),
                    None,
                )
            }
            CheckoutError::InvoiceUnresolved { order_id } => {
                tracing::error!(
                    request_id = %self.request_id,
                    order_id = %order_id,
                    "order created but invoice URL did not resolve"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    self.error.to_string(),
                    Some(order_id.clone()),
                )
            }
        };

        if status != StatusCode::BAD_GATEWAY {
            tracing::warn!(
                request_id = %self.request_id,
                reason,
                error = %self.error,
                "checkout rejected"
            );
        }

        (
            status,
            Json(ErrorBody {
                reason: CompactString::const_new(reason),
                message,
                request_id: Some(self.request_id.to_string()),
                order_id,
            }),
        )
            .into_response()
    }
}
