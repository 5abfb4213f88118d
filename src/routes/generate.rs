use actix_web::{post, web, HttpResponse};
use futures::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::GatewayError;
use crate::metrics;
use crate::relay::{self, SessionState};
use crate::sse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
}

/// POST /generate — stream a generation as SSE.
///
/// Validation and configuration are checked before the stream transport
/// opens, so those failures are plain JSON 400/500. Once the SSE response
/// has begun, failure is communicated only through the terminal wire event.
#[post("/generate")]
pub async fn generate(
    state: web::Data<AppState>,
    body: web::Json<PromptRequest>,
) -> Result<HttpResponse, GatewayError> {
    let prompt = body.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(GatewayError::Validation("prompt is required".to_string()));
    }
    let client = state.generation()?.clone();

    let (tx, rx) = tokio::sync::mpsc::channel::<String>(relay::WIRE_BUFFER);

    tokio::spawn(async move {
        let terminal = match client.stream(&prompt).await {
            Ok(fragments) => relay::relay_fragments(fragments, tx).await,
            Err(e) => {
                tracing::error!(error = %e, "failed to open upstream generation stream");
                let event = sse::data_event(&serde_json::json!({ "error": "generation failed" }));
                if tx.send(event).await.is_err() {
                    SessionState::Cancelled
                } else {
                    SessionState::Failed
                }
            }
        };
        metrics::STREAM_SESSIONS
            .with_label_values(&[terminal.as_label()])
            .inc();
        tracing::debug!(state = terminal.as_label(), "stream session finished");
    });

    let body_stream =
        ReceiverStream::new(rx).map(|event| Ok::<_, actix_web::Error>(web::Bytes::from(event)));

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(body_stream))
}

/// POST /chat — single non-streaming generation call.
#[post("/chat")]
pub async fn chat(
    state: web::Data<AppState>,
    body: web::Json<PromptRequest>,
) -> Result<HttpResponse, GatewayError> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(GatewayError::Validation("prompt is required".to_string()));
    }
    let client = state.generation()?;

    let text = client.generate(prompt).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "text": text })))
}
