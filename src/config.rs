use std::env;

use crate::providers::payment::Currency;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PAYMENT_API_BASE: &str = "https://api.razorpay.com/v1";
const DEFAULT_GENERATION_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GENERATION_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_RATE_LIMIT_RPM: u64 = 120;

/// Immutable process configuration, read once at startup and passed by
/// reference into each component.
///
/// Provider credentials are optional here on purpose: their absence is a
/// 500 at call time for the affected endpoint, not a startup failure.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Server port
    pub port: u16,
    /// Payment provider key id — the public half, echoed to clients
    pub payment_key_id: Option<String>,
    /// Payment provider key secret — doubles as the HMAC shared secret for
    /// confirmation signatures. Never logged, never echoed.
    pub payment_key_secret: Option<String>,
    /// Payment provider API base URL
    pub payment_api_base: String,
    /// Generation provider API key
    pub generation_api_key: Option<String>,
    /// Generation model name
    pub generation_model: String,
    /// Generation provider API base URL
    pub generation_api_base: String,
    /// Currency orders are created in
    pub order_currency: Currency,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute per IP
    pub rate_limit_rpm: u64,
    /// Bearer token required for /metrics (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("payment_key_id", &self.payment_key_id)
            .field(
                "payment_key_secret",
                &self.payment_key_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("payment_api_base", &self.payment_api_base)
            .field(
                "generation_api_key",
                &self.generation_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("generation_model", &self.generation_model)
            .field("generation_api_base", &self.generation_api_base)
            .field("order_currency", &self.order_currency)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let payment_key_id = env::var("PAYMENT_KEY_ID").ok().filter(|s| !s.is_empty());
        let payment_key_secret = env::var("PAYMENT_KEY_SECRET").ok().filter(|s| !s.is_empty());
        let payment_api_base = env::var("PAYMENT_API_BASE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PAYMENT_API_BASE.to_string());

        let generation_api_key = env::var("GENERATION_API_KEY").ok().filter(|s| !s.is_empty());
        let generation_model = env::var("GENERATION_MODEL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GENERATION_MODEL.to_string());
        let generation_api_base = env::var("GENERATION_API_BASE")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GENERATION_API_BASE.to_string());

        let order_currency = match env::var("ORDER_CURRENCY") {
            Ok(s) if !s.is_empty() => {
                Currency::parse(&s).ok_or(ConfigError::InvalidCurrency(s))?
            }
            _ => Currency::Inr,
        };

        let allowed_origins: Vec<String> = env::var("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let rate_limit_rpm = env::var("RATE_LIMIT_RPM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);

        let metrics_token = env::var("METRICS_TOKEN").ok().filter(|s| !s.is_empty());

        if payment_key_id.is_none() || payment_key_secret.is_none() {
            tracing::warn!(
                "PAYMENT_KEY_ID / PAYMENT_KEY_SECRET not set — \
                 /orders and /payments/verify will return 500"
            );
        }
        if generation_api_key.is_none() {
            tracing::warn!("GENERATION_API_KEY not set — /generate and /chat will return 500");
        }
        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set — /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            port,
            payment_key_id,
            payment_key_secret,
            payment_api_base,
            generation_api_key,
            generation_model,
            generation_api_base,
            order_currency,
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported currency: {0}")]
    InvalidCurrency(String),
}
