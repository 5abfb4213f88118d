use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

use crate::dispatcher::PaymentVerifiedEvent;
use crate::error::GatewayError;
use crate::metrics;
use crate::signature;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub reference_id: String,
    #[serde(default)]
    pub supplied_signature: String,
}

/// Verify an inbound payment confirmation.
///
/// All three fields are required and checked before any MAC computation so
/// the rejection path for malformed input carries no secret-dependent
/// timing. A failed verification is not a transport error: the response is
/// still 200 with `success: false`, and nothing is published.
#[post("/payments/verify")]
pub async fn verify_payment(
    state: web::Data<AppState>,
    body: web::Json<VerifyRequest>,
) -> Result<HttpResponse, GatewayError> {
    let req = body.into_inner();

    if req.order_id.is_empty() || req.reference_id.is_empty() || req.supplied_signature.is_empty() {
        metrics::VERIFY_REQUESTS
            .with_label_values(&["invalid"])
            .inc();
        return Err(GatewayError::Validation(
            "orderId, referenceId and suppliedSignature are required".to_string(),
        ));
    }

    let secret = state.signing_secret()?;
    let verified = signature::verify_signature(
        secret,
        &req.order_id,
        &req.reference_id,
        &req.supplied_signature,
    );

    if verified {
        metrics::VERIFY_REQUESTS
            .with_label_values(&["verified"])
            .inc();
        tracing::info!(order_id = %req.order_id, reference_id = %req.reference_id, "payment verified");
        state.dispatcher.publish(PaymentVerifiedEvent {
            order_id: req.order_id,
            reference_id: req.reference_id,
        });
    } else {
        metrics::VERIFY_REQUESTS
            .with_label_values(&["rejected"])
            .inc();
        tracing::warn!(order_id = %req.order_id, "payment verification failed — signature mismatch");
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": verified })))
}
