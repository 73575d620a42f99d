//! SSE wire framing.
//!
//! Frames a typed payload as a named `text/event-stream` event:
//!
//! ```text
//! event: message
//! data: {"type":"message","uuid":"...","clientId":"...",...}
//!
//! ```
//!
//! `encode` is a pure function; `decode` parses a single frame back so the
//! round-trip can be verified.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failures while parsing an SSE frame back into a payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(&'static str),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Encodes a payload as a named SSE event.
///
/// The JSON body is split on newlines into multiple `data:` lines as the
/// SSE grammar requires, although serde_json never emits a literal newline.
pub fn encode<T: Serialize>(event: &str, data: &T) -> serde_json::Result<Bytes> {
    let json = serde_json::to_string(data)?;
    let mut out = String::with_capacity(event.len() + json.len() + 16);
    out.push_str("event: ");
    out.push_str(event);
    out.push('\n');
    for line in json.split('\n') {
        out.push_str("data: ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    Ok(Bytes::from(out))
}

/// Comment frame sent while a stream is idle so half-dead transports
/// surface a write error. EventSource ignores comment lines.
pub fn keep_alive_frame() -> Bytes {
    Bytes::from_static(b": keep-alive\n\n")
}

/// Parses a single frame back into its event name and payload.
pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<(String, T), DecodeError> {
    let text = std::str::from_utf8(frame).map_err(|_| DecodeError::Malformed("not utf-8"))?;

    let mut event = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }

    let event = event.ok_or(DecodeError::Malformed("missing event field"))?;
    if data_lines.is_empty() {
        return Err(DecodeError::Malformed("missing data field"));
    }
    let payload = serde_json::from_str(&data_lines.join("\n"))?;
    Ok((event, payload))
}
