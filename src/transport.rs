use crate::config::TransportSettings;
use serde_json::{json, Value};
use std::time::Duration;

pub const CAPABILITIES_PATH: &str = "capabilities";
pub const EXECUTE_PATH: &str = "execute";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

/// Request/response primitive towards backends. Non-2xx statuses are responses, not errors.
pub trait BackendTransport: Send + Sync {
    fn get_json(&self, url: &str) -> Result<TransportResponse, TransportError>;
    fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError>;
}

pub fn endpoint(address: &str, path: &str) -> String {
    format!(
        "{}/{}",
        address.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Backends are not guaranteed to answer JSON on errors; keep the text instead of failing.
pub fn body_from_text(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout(timeout)
            .build();
        Self { agent }
    }

    pub fn from_settings(settings: &TransportSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.connect_timeout_ms),
            Duration::from_millis(settings.timeout_ms),
        )
    }

    fn finish(
        url: &str,
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<TransportResponse, TransportError> {
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                if is_timeout(&transport) {
                    return Err(TransportError::Timeout {
                        url: url.to_string(),
                    });
                }
                return Err(TransportError::Request {
                    url: url.to_string(),
                    reason: transport.to_string(),
                });
            }
        };

        let status = response.status();
        let text = response.into_string().map_err(|err| {
            if matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                TransportError::Timeout {
                    url: url.to_string(),
                }
            } else {
                TransportError::Body {
                    url: url.to_string(),
                    reason: err.to_string(),
                }
            }
        })?;
        Ok(TransportResponse {
            status,
            body: body_from_text(&text),
        })
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .is_some_and(|io| {
            matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            )
        })
}

impl BackendTransport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<TransportResponse, TransportError> {
        Self::finish(url, self.agent.get(url).set("Accept", "application/json").call())
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        Self::finish(
            url,
            self.agent
                .post(url)
                .set("Accept", "application/json")
                .send_json(body.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        assert_eq!(
            endpoint("http://localhost:5051/", "/capabilities"),
            "http://localhost:5051/capabilities"
        );
        assert_eq!(
            endpoint("http://host/mcp", EXECUTE_PATH),
            "http://host/mcp/execute"
        );
    }

    #[test]
    fn non_json_bodies_are_wrapped() {
        assert_eq!(body_from_text("{\"ok\":true}"), json!({"ok": true}));
        assert_eq!(
            body_from_text("Internal Server Error"),
            json!({"raw": "Internal Server Error"})
        );
        assert_eq!(body_from_text(""), Value::Null);
    }
}
