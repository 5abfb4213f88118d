use crate::config::GatewayConfig;
use crate::dispatcher::Dispatcher;
use crate::error::GatewayError;
use crate::providers::generation::GenerationClient;
use crate::providers::payment::PaymentProvider;

/// Shared application state, handed to every request via `web::Data`.
///
/// The dispatcher's subscriber registry is the only state shared across
/// requests; everything else is immutable configuration and stateless
/// provider clients.
pub struct AppState {
    pub config: GatewayConfig,
    pub dispatcher: Dispatcher,
    payment: Option<PaymentProvider>,
    generation: Option<GenerationClient>,
}

impl AppState {
    pub fn from_config(config: GatewayConfig) -> Self {
        let payment = match (&config.payment_key_id, &config.payment_key_secret) {
            (Some(id), Some(secret)) => Some(PaymentProvider::new(
                id.clone(),
                secret.clone(),
                config.payment_api_base.clone(),
            )),
            _ => None,
        };

        let generation = config.generation_api_key.as_ref().map(|key| {
            GenerationClient::new(
                key.clone(),
                config.generation_model.clone(),
                config.generation_api_base.clone(),
            )
        });

        Self {
            config,
            dispatcher: Dispatcher::new(),
            payment,
            generation,
        }
    }

    /// Payment provider client, or a `Configuration` error when credentials
    /// are absent.
    pub fn payment(&self) -> Result<&PaymentProvider, GatewayError> {
        self.payment
            .as_ref()
            .ok_or(GatewayError::Configuration("payment provider credentials"))
    }

    /// Generation provider client, or a `Configuration` error when the API
    /// key is absent.
    pub fn generation(&self) -> Result<&GenerationClient, GatewayError> {
        self.generation
            .as_ref()
            .ok_or(GatewayError::Configuration("generation provider API key"))
    }

    /// Shared secret for confirmation signatures (the payment key secret).
    pub fn signing_secret(&self) -> Result<&[u8], GatewayError> {
        self.config
            .payment_key_secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or(GatewayError::Configuration("payment provider credentials"))
    }
}
