//! Stripe-style payment-intent client
//!
//! Form-encoded REST client for the processor's payment-intent API. All
//! requests carry a bounded timeout; timeouts and processor 5xx map to the
//! `transient` error kind so callers can decide to retry the whole flow.

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::{
    from_minor_units, to_minor_units, IntentMetadata, IntentStatus, PaymentGateway, PaymentIntent,
    RefundOutcome,
};

/// Processor connection settings, initialized once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    /// Server-side secret key
    pub secret_key: String,
    /// Publishable key handed to payer clients
    pub public_key: String,
    /// API base URL; overridable for tests and mock servers
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (recommended 10-30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            public_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Payment gateway backed by the processor's HTTP API
pub struct StripeGateway {
    config: StripeConfig,
    client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Unknown(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> GatewayResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(%url, "gateway request");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(params)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(%url, "gateway request");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }
}

#[async_trait::async_trait]
impl PaymentGateway for StripeGateway {
    fn public_key(&self) -> String {
        self.config.public_key.clone()
    }

    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
        metadata: &IntentMetadata,
    ) -> GatewayResult<PaymentIntent> {
        let amount_minor = to_minor_units(amount)?;
        let params = vec![
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_lowercase()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[booking_id]", metadata.booking_id.to_string()),
            ("metadata[booking_kind]", metadata.booking_kind.clone()),
            ("metadata[target_id]", metadata.target_id.to_string()),
            ("metadata[owner_id]", metadata.owner_id.to_string()),
            (
                "metadata[confirmation_code]",
                metadata.confirmation_code.clone(),
            ),
        ];
        let payload: IntentPayload = self.post_form("/v1/payment_intents", &params).await?;
        Ok(payload.into())
    }

    async fn retrieve_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent> {
        let payload: IntentPayload = self
            .get(&format!("/v1/payment_intents/{intent_id}"))
            .await?;
        Ok(payload.into())
    }

    async fn confirm_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent> {
        let payload: IntentPayload = self
            .post_form(&format!("/v1/payment_intents/{intent_id}/confirm"), &[])
            .await?;
        Ok(payload.into())
    }

    async fn cancel_intent(&self, intent_id: &str) -> GatewayResult<PaymentIntent> {
        let payload: IntentPayload = self
            .post_form(&format!("/v1/payment_intents/{intent_id}/cancel"), &[])
            .await?;
        Ok(payload.into())
    }

    async fn refund(
        &self,
        intent_id: &str,
        amount: Option<Decimal>,
        reason: Option<&str>,
    ) -> GatewayResult<RefundOutcome> {
        let mut params = vec![("payment_intent", intent_id.to_string())];
        if let Some(amount) = amount {
            params.push(("amount", to_minor_units(amount)?.to_string()));
        }
        if let Some(reason) = reason {
            params.push(("reason", reason.to_string()));
        }
        let payload: RefundPayload = self.post_form("/v1/refunds", &params).await?;
        Ok(RefundOutcome {
            id: payload.id,
            amount: from_minor_units(payload.amount),
            currency: payload.currency,
            status: payload.status,
            reason: payload.reason,
        })
    }
}

// ============================================================================
// Wire payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct IntentPayload {
    id: String,
    client_secret: Option<String>,
    status: String,
    amount: i64,
    currency: String,
}

impl From<IntentPayload> for PaymentIntent {
    fn from(p: IntentPayload) -> Self {
        PaymentIntent {
            id: p.id,
            client_secret: p.client_secret,
            status: IntentStatus::from_processor(&p.status),
            amount_minor: p.amount,
            currency: p.currency,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefundPayload {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    message: Option<String>,
}

// ============================================================================
// Error mapping
// ============================================================================

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() || e.is_connect() {
        GatewayError::Transient(format!("processor unreachable: {e}"))
    } else {
        GatewayError::Unknown(format!("transport failure: {e}"))
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| GatewayError::Unknown(format!("malformed processor response: {e}")));
    }
    let payload = response
        .json::<ErrorEnvelope>()
        .await
        .map(|envelope| envelope.error)
        .unwrap_or_default();
    let err = map_api_error(status, payload);
    warn!(status = %status, kind = err.kind(), "processor error");
    Err(err)
}

fn map_api_error(status: StatusCode, payload: ErrorPayload) -> GatewayError {
    let message = payload
        .message
        .or(payload.code)
        .unwrap_or_else(|| format!("processor returned {status}"));
    match payload.kind.as_deref() {
        Some("card_error") => GatewayError::ProcessorRejected(message),
        Some("invalid_request_error") => GatewayError::InvalidRequest(message),
        Some("api_error") => GatewayError::Transient(message),
        _ if status == StatusCode::PAYMENT_REQUIRED => GatewayError::ProcessorRejected(message),
        _ if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
            GatewayError::Transient(message)
        }
        _ if status.is_client_error() => GatewayError::InvalidRequest(message),
        _ => GatewayError::Unknown(message),
    }
}
