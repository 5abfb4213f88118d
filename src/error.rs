//! Gateway error taxonomy.
//!
//! Three buckets: caller mistakes (`Validation`, always a 400), missing
//! provider credentials (`Configuration`, 500), and upstream provider
//! failures (`Upstream`, 500). Raw upstream details are logged server-side
//! and never echoed to the caller.

use actix_web::{HttpResponse, ResponseError};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing provider configuration: {0}")]
    Configuration(&'static str),

    #[error("upstream provider error: {0}")]
    Upstream(String),
}

impl ResponseError for GatewayError {
    fn error_response(&self) -> HttpResponse {
        match self {
            GatewayError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": "validation",
                "message": msg,
            })),
            GatewayError::Configuration(what) => {
                tracing::error!("missing provider configuration: {what}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "success": false,
                    "error": "configuration",
                    "message": "service is not configured for this operation",
                }))
            }
            GatewayError::Upstream(detail) => {
                tracing::error!("upstream provider error: {detail}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "success": false,
                    "error": "upstream",
                    "message": "upstream provider request failed",
                }))
            }
        }
    }
}
