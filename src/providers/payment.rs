//! Upstream payment provider client (order creation).

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Currencies the gateway will create orders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Inr,
    Usd,
}

impl Currency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INR" => Some(Currency::Inr),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order as returned to gateway callers. The gateway keeps no copy —
/// once returned, the order belongs to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub amount_minor_units: i64,
    pub currency: Currency,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: Currency,
    receipt: &'a str,
}

#[derive(Deserialize)]
struct ProviderOrder {
    id: String,
    amount: i64,
    currency: Currency,
    created_at: i64,
}

/// Basic-auth REST client for the payment provider's order API.
pub struct PaymentProvider {
    key_id: String,
    key_secret: String,
    api_base: String,
    http: reqwest::Client,
}

impl PaymentProvider {
    pub fn new(key_id: String, key_secret: String, api_base: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default();

        Self {
            key_id,
            key_secret,
            api_base,
            http,
        }
    }

    /// Public half of the credential pair — safe to echo to clients so they
    /// can initialize the provider's checkout flow.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create an order with the upstream provider. Single attempt — a
    /// failure is surfaced to the caller, never retried.
    pub async fn create_order(
        &self,
        amount_minor_units: i64,
        currency: Currency,
    ) -> Result<Order, GatewayError> {
        let receipt = format!("rcpt_{}", uuid::Uuid::new_v4().simple());
        let url = format!("{}/orders", self.api_base);

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount: amount_minor_units,
                currency,
                receipt: &receipt,
            })
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("order creation request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Upstream(format!("order creation read failed: {e}")))?;

        if !status.is_success() {
            return Err(GatewayError::Upstream(format!(
                "order creation returned HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ProviderOrder = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Upstream(format!("failed to parse order response: {e}")))?;

        Ok(Order {
            id: parsed.id,
            amount_minor_units: parsed.amount,
            currency: parsed.currency,
            created_at: chrono::DateTime::from_timestamp(parsed.created_at, 0)
                .unwrap_or_else(chrono::Utc::now),
        })
    }
}
