//! Server-Sent-Events wire formatting.

/// Format one SSE `data:` event.
pub fn data_event(payload: &serde_json::Value) -> String {
    format!(
        "data: {}\n\n",
        serde_json::to_string(payload).unwrap_or_default()
    )
}

/// Format one SSE event with an explicit event name.
pub fn named_event(name: &str, payload: &serde_json::Value) -> String {
    format!(
        "event: {name}\ndata: {}\n\n",
        serde_json::to_string(payload).unwrap_or_default()
    )
}

/// Format an SSE comment line (ignored by clients, flushes proxies).
pub fn comment(text: &str) -> String {
    format!(": {text}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_event_format() {
        let event = data_event(&serde_json::json!({ "text": "hi" }));
        assert_eq!(event, "data: {\"text\":\"hi\"}\n\n");
    }

    #[test]
    fn test_named_event_format() {
        let event = named_event("done", &serde_json::json!({}));
        assert_eq!(event, "event: done\ndata: {}\n\n");
    }
}
