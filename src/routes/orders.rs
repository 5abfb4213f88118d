use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

use crate::error::GatewayError;
use crate::metrics;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    /// Amount in major currency units (e.g. rupees)
    pub amount: f64,
}

/// Convert a major-unit amount to integer minor units (e.g. rupees to
/// paise): multiply by 100 and round to the nearest integer. Zero,
/// negative, and non-finite amounts are rejected before any conversion.
pub fn to_minor_units(amount: f64) -> Result<i64, GatewayError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(GatewayError::Validation(
            "amount must be a positive number".to_string(),
        ));
    }
    let minor = (amount * 100.0).round() as i64;
    if minor <= 0 {
        return Err(GatewayError::Validation(
            "amount is below the smallest supported unit".to_string(),
        ));
    }
    Ok(minor)
}

#[post("/orders")]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, GatewayError> {
    let minor = match to_minor_units(body.amount) {
        Ok(minor) => minor,
        Err(e) => {
            metrics::ORDER_REQUESTS.with_label_values(&["invalid"]).inc();
            return Err(e);
        }
    };

    let provider = state.payment()?;

    match provider
        .create_order(minor, state.config.order_currency)
        .await
    {
        Ok(order) => {
            metrics::ORDER_REQUESTS.with_label_values(&["success"]).inc();
            tracing::info!(
                order_id = %order.id,
                amount_minor_units = minor,
                currency = %order.currency,
                "order created"
            );
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "order": order,
                "publicKeyId": provider.key_id(),
            })))
        }
        Err(e) => {
            metrics::ORDER_REQUESTS.with_label_values(&["error"]).inc();
            Err(e)
        }
    }
}
