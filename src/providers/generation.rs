//! Upstream text generation client.
//!
//! Non-streaming calls back `POST /chat`; streaming calls return a
//! pull-based fragment stream decoded from the provider's
//! `text/event-stream` response, which the relay pumps to the caller one
//! wire event at a time.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Pull-based stream of decoded text fragments, in production order.
pub type FragmentStream = BoxStream<'static, Result<String, GatewayError>>;

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

/// Generation provider API client.
#[derive(Clone)]
pub struct GenerationClient {
    api_key: String,
    model: String,
    api_base: String,
    http: reqwest::Client,
}

impl GenerationClient {
    pub fn new(api_key: String, model: String, api_base: String) -> Self {
        // Connect timeout only: a total request timeout would cut long
        // generations mid-stream.
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default();

        Self {
            api_key,
            model,
            api_base,
            http,
        }
    }

    fn request_body(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }

    /// Single-shot generation for the non-streaming endpoint. One attempt,
    /// no retry.
    pub async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let resp = self
            .http
            .post(&url)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("generation request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Upstream(format!("generation read failed: {e}")))?;

        if !status.is_success() {
            return Err(GatewayError::Upstream(format!(
                "generation returned HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::Upstream(format!("failed to parse generation response: {e}"))
        })?;

        Ok(extract_text(parsed))
    }

    /// Open a streaming generation. Returns a lazy fragment stream — the
    /// upstream body is pulled only as the stream is polled, and dropping
    /// the stream releases the upstream connection.
    pub async fn stream(&self, prompt: &str) -> Result<FragmentStream, GatewayError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.api_base, self.model, self.api_key
        );

        let resp = self
            .http
            .post(&url)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("generation request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream(format!(
                "generation returned HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(decode_fragments(resp.bytes_stream().boxed()))
    }
}

fn extract_text(resp: GenerateResponse) -> String {
    resp.candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .map(|parts| {
            parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

struct DecodeState {
    bytes: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    ready: VecDeque<String>,
    done: bool,
}

/// Turn the raw upstream byte stream into a fragment stream. One decoded
/// text fragment per item; a transport error ends the stream after yielding
/// the error.
fn decode_fragments(bytes: BoxStream<'static, reqwest::Result<Bytes>>) -> FragmentStream {
    let state = DecodeState {
        bytes,
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(fragment) = st.ready.pop_front() {
                return Some((Ok(fragment), st));
            }
            if st.done {
                return None;
            }
            match st.bytes.next().await {
                Some(Ok(chunk)) => st.ready.extend(st.decoder.feed(&chunk)),
                Some(Err(e)) => {
                    st.done = true;
                    return Some((
                        Err(GatewayError::Upstream(format!("stream read failed: {e}"))),
                        st,
                    ));
                }
                None => {
                    st.done = true;
                    st.ready.extend(st.decoder.finish());
                }
            }
        }
    })
    .boxed()
}

/// Incremental decoder for the provider's `text/event-stream` body.
///
/// Network chunk boundaries can fall anywhere, including inside a UTF-8
/// sequence, so the carry buffer is kept as raw bytes and only complete
/// lines are decoded.
struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Consume one network chunk, returning every fragment whose line
    /// completed inside it.
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(fragment) = decode_line(&line) {
                out.push(fragment);
            }
        }
        out
    }

    /// Flush the final unterminated line, if any.
    fn finish(&mut self) -> Vec<String> {
        let line = std::mem::take(&mut self.buf);
        decode_line(&line).into_iter().collect()
    }
}

fn decode_line(line: &[u8]) -> Option<String> {
    let line = std::str::from_utf8(line).ok()?.trim();
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    let parsed: GenerateResponse = serde_json::from_str(payload).ok()?;
    let text = extract_text(parsed);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{text}\"}}]}}}}]}}\n\n"
        )
    }

    #[test]
    fn test_decoder_extracts_fragments() {
        let mut decoder = SseDecoder::new();
        let fragments = decoder.feed(chunk("Hel").as_bytes());
        assert_eq!(fragments, vec!["Hel"]);
        let fragments = decoder.feed(chunk("lo").as_bytes());
        assert_eq!(fragments, vec!["lo"]);
    }

    #[test]
    fn test_decoder_handles_split_lines() {
        let mut decoder = SseDecoder::new();
        let event = chunk("Hello");
        let (a, b) = event.split_at(17);

        assert!(decoder.feed(a.as_bytes()).is_empty());
        assert_eq!(decoder.feed(b.as_bytes()), vec!["Hello"]);
    }

    #[test]
    fn test_decoder_handles_multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let combined = format!("{}{}", chunk("a"), chunk("b"));
        assert_eq!(decoder.feed(combined.as_bytes()), vec!["a", "b"]);
    }

    #[test]
    fn test_decoder_ignores_non_data_lines() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b": keep-alive\n\n").is_empty());
        assert!(decoder.feed(b"event: ping\n").is_empty());
        assert!(decoder.feed(b"data: [DONE]\n\n").is_empty());
    }

    #[test]
    fn test_decoder_flushes_trailing_line_on_finish() {
        let mut decoder = SseDecoder::new();
        let event = chunk("tail");
        let unterminated = event.trim_end();
        assert!(decoder.feed(unterminated.as_bytes()).is_empty());
        assert_eq!(decoder.finish(), vec!["tail"]);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            "{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"a\"},{\"text\":\"b\"}]}}]}",
        )
        .unwrap();
        assert_eq!(extract_text(resp), "ab");
    }

    #[test]
    fn test_extract_text_empty_on_no_candidates() {
        let resp: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_text(resp), "");
    }
}
