//! Order platform gateway.
//!
//! The sole network egress. Order creation is submitted exactly once per
//! request (retrying creation risks duplicate orders); only the invoice URL
//! lookup is retried, with a bounded fixed-delay poll, because the platform
//! may populate it asynchronously after creation.

use std::time::Duration;

use async_trait::async_trait;
use itertools::Itertools;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::order::DraftOrderRequest;

/// Header carrying the platform admin access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Result of creating a draft order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformOrder {
    pub order_id: String,
    /// May be absent immediately after creation; see [`resolve_invoice_url`].
    pub invoice_url: Option<String>,
}

/// Errors surfaced by the order platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-2xx status.
    #[error("platform returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The platform answered 2xx but with top-level GraphQL errors.
    #[error("platform query failed: {0}")]
    Graphql(String),

    /// The mutation was rejected with merchant-facing user errors.
    /// These messages are safe to surface verbatim to the caller.
    #[error("platform rejected the order: {}", .0.iter().join("; "))]
    UserErrors(Vec<String>),

    /// The response parsed but did not carry the fields the contract promises.
    #[error("malformed platform response: {0}")]
    Malformed(String),
}

/// Bounded retry policy for the invoice URL poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_millis(250),
        }
    }
}

/// The order platform seam.
///
/// The checkout pipeline only sees this trait, so tests can count calls and
/// script responses without a network.
#[async_trait]
pub trait OrderPlatform: Send + Sync {
    /// Create a draft order. Called at most once per inbound request.
    async fn create_order(&self, order: &DraftOrderRequest) -> Result<PlatformOrder, PlatformError>;

    /// Fetch the invoice URL for an existing order, if populated yet.
    async fn fetch_invoice_url(&self, order_id: &str) -> Result<Option<String>, PlatformError>;
}

/// Resolve the invoice URL for a freshly created order.
///
/// State machine: `CREATED(no url) → poll → RESOLVED(url) | EXHAUSTED(None)`.
/// `Ok(None)` after the policy is exhausted means the order exists but needs
/// manual follow-up; the caller reports that as its own terminal condition.
pub async fn resolve_invoice_url(
    platform: &dyn OrderPlatform,
    created: &PlatformOrder,
    policy: RetryPolicy,
) -> Result<Option<String>, PlatformError> {
    if let Some(url) = &created.invoice_url {
        return Ok(Some(url.clone()));
    }

    for attempt in 1..=policy.attempts {
        tokio::time::sleep(policy.delay).await;
        if let Some(url) = platform.fetch_invoice_url(&created.order_id).await? {
            tracing::debug!(
                order_id = %created.order_id,
                attempt,
                "invoice URL resolved"
            );
            return Ok(Some(url));
        }
    }

    tracing::warn!(
        order_id = %created.order_id,
        attempts = policy.attempts,
        "invoice URL still absent after polling"
    );
    Ok(None)
}

// ---------------------------------------------------------------------------
// GraphQL draft-order gateway
// ---------------------------------------------------------------------------

const CREATE_ORDER_MUTATION: &str = "\
mutation draftOrderCreate($input: DraftOrderInput!) {
  draftOrderCreate(input: $input) {
    draftOrder { id invoiceUrl }
    userErrors { message }
  }
}";

const INVOICE_URL_QUERY: &str = "\
query draftOrderInvoice($id: ID!) {
  draftOrder(id: $id) { invoiceUrl }
}";

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderData {
    draft_order_create: DraftOrderCreate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftOrderCreate {
    draft_order: Option<DraftOrderNode>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftOrderNode {
    id: String,
    invoice_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceData {
    draft_order: Option<DraftOrderInvoice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftOrderInvoice {
    invoice_url: Option<String>,
}

/// Gateway to the platform's GraphQL admin API.
#[derive(Debug, Clone)]
pub struct DraftOrderGateway {
    http: reqwest::Client,
    api_url: Url,
    access_token: String,
}

impl DraftOrderGateway {
    pub fn new(api_url: Url, access_token: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            api_url,
            access_token,
        }
    }

    async fn post_graphql<T: serde::de::DeserializeOwned>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T, PlatformError> {
        let response = self
            .http
            .post(self.api_url.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| PlatformError::Malformed(e.to_string()))?;

        if let Some(first) = parsed.errors.first() {
            return Err(PlatformError::Graphql(first.message.clone()));
        }
        parsed
            .data
            .ok_or_else(|| PlatformError::Malformed("response carried no data".to_owned()))
    }

    fn order_input(order: &DraftOrderRequest) -> serde_json::Value {
        json!({
            "note": order.note,
            "tags": order.tags,
            "lineItems": order.line_items.iter().map(|li| json!({
                "variantId": li.variant_id,
                "quantity": li.quantity,
                "originalUnitPriceOverride": format!("{:.2}", li.unit_price.round_dp(2)),
                "customAttributes": li.attributes,
            })).collect::<Vec<_>>(),
        })
    }
}

#[async_trait]
impl OrderPlatform for DraftOrderGateway {
    async fn create_order(&self, order: &DraftOrderRequest) -> Result<PlatformOrder, PlatformError> {
        let data: CreateOrderData = self
            .post_graphql(
                CREATE_ORDER_MUTATION,
                json!({ "input": Self::order_input(order) }),
            )
            .await?;

        let result = data.draft_order_create;
        if !result.user_errors.is_empty() {
            return Err(PlatformError::UserErrors(
                result.user_errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        let node = result
            .draft_order
            .ok_or_else(|| PlatformError::Malformed("mutation returned no draft order".to_owned()))?;

        tracing::info!(order_id = %node.id, "draft order created");
        Ok(PlatformOrder {
            order_id: node.id,
            invoice_url: node.invoice_url,
        })
    }

    async fn fetch_invoice_url(&self, order_id: &str) -> Result<Option<String>, PlatformError> {
        let data: InvoiceData = self
            .post_graphql(INVOICE_URL_QUERY, json!({ "id": order_id }))
            .await?;
        Ok(data.draft_order.and_then(|o| o.invoice_url))
    }
}
