//! Minimal HTTP transport seam.
//!
//! All network I/O goes through the [`HttpTransport`] trait so the API client
//! can be exercised in unit tests with an in-memory mock instead of sockets.

use async_trait::async_trait;
use thiserror::Error;

/// HTTP methods used by the instance-variables API.
///
/// There is no `Put`: the API has no in-place edit, so updates are expressed
/// as delete-then-create by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A minimal HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// First header value matching `name`, case-insensitively.
    ///
    /// The client only ever reads headers off recorded requests (tests
    /// asserting auth and content negotiation); responses are consumed by
    /// status and body alone.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// A real HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_err)?;
        Ok(Self { client })
    }
}

fn transport_err(err: reqwest::Error) -> HttpError {
    HttpError::Transport(err.to_string())
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(transport_err)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(transport_err)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

// ---------- Test-only scripted transport ----------

#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// In-memory transport that replays a pre-written script of exchanges.
///
/// A reconciliation pass issues a strictly sequential series of calls (list
/// pages, then creates and deletes one at a time), so tests script the exact
/// expected sequence. Any out-of-order, mismatched, or extra request fails
/// the exchange with a descriptive transport error.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<ScriptState>>,
}

#[cfg(test)]
#[derive(Default)]
struct ScriptState {
    script: VecDeque<Exchange>,
    seen: Vec<HttpRequest>,
}

#[cfg(test)]
struct Exchange {
    method: HttpMethod,
    url: String,
    response: HttpResponse,
}

#[cfg(test)]
impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expected exchange: the next request must match `method` and
    /// `url` and will be answered with `status` and `body`.
    pub fn expect(&self, method: HttpMethod, url: impl Into<String>, status: u16, body: &str) {
        let mut state = self.inner.lock().expect("transport lock poisoned");
        state.script.push_back(Exchange {
            method,
            url: url.into(),
            response: HttpResponse {
                status,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: body.as_bytes().to_vec(),
            },
        });
    }

    /// Requests received so far, in order.
    #[must_use]
    pub fn seen(&self) -> Vec<HttpRequest> {
        let state = self.inner.lock().expect("transport lock poisoned");
        state.seen.clone()
    }

    /// True when every scripted exchange has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        let state = self.inner.lock().expect("transport lock poisoned");
        state.script.is_empty()
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut state = self.inner.lock().expect("transport lock poisoned");

        let Some(next) = state.script.pop_front() else {
            return Err(HttpError::Transport(format!(
                "script exhausted, unexpected {} {}",
                request.method.as_str(),
                request.url
            )));
        };
        if next.method != request.method || next.url != request.url {
            return Err(HttpError::Transport(format!(
                "script mismatch: expected {} {}, got {} {}",
                next.method.as_str(),
                next.url,
                request.method.as_str(),
                request.url
            )));
        }

        state.seen.push(request);
        Ok(next.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[test]
    fn method_names_match_wire_strings() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn request_header_lookup_is_case_insensitive() {
        let mut request = get("https://gitlab.example.com");
        request.headers = vec![
            ("PRIVATE-TOKEN".to_string(), "secret".to_string()),
            ("private-token".to_string(), "shadowed".to_string()),
        ];

        assert_eq!(request.header("private-token"), Some("secret"));
        assert_eq!(request.header("Private-Token"), Some("secret"));
        assert_eq!(request.header("accept"), None);
    }

    #[test]
    fn reqwest_transport_with_timeout_builds_client() {
        let transport = ReqwestTransport::with_timeout(Duration::from_millis(1))
            .expect("reqwest transport should build");
        let _ = transport;
    }

    #[tokio::test]
    async fn scripted_transport_replays_exchanges_in_order() {
        let transport = ScriptedTransport::new();
        transport.expect(HttpMethod::Get, "https://a.example/one", 200, r#"["one"]"#);
        transport.expect(HttpMethod::Get, "https://a.example/two", 200, r#"["two"]"#);

        let first = transport.send(get("https://a.example/one")).await.unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.body, br#"["one"]"#.to_vec());
        assert!(!transport.is_exhausted());

        let second = transport.send(get("https://a.example/two")).await.unwrap();
        assert_eq!(second.body, br#"["two"]"#.to_vec());
        assert!(transport.is_exhausted());
        assert_eq!(transport.seen().len(), 2);
    }

    #[tokio::test]
    async fn scripted_transport_rejects_out_of_order_requests() {
        let transport = ScriptedTransport::new();
        transport.expect(HttpMethod::Get, "https://a.example/one", 200, "[]");

        let err = transport
            .send(get("https://a.example/elsewhere"))
            .await
            .expect_err("mismatched request should fail");

        let HttpError::Transport(message) = err;
        assert!(message.contains("expected GET https://a.example/one"));
        // A rejected request is not recorded.
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn scripted_transport_rejects_requests_past_end_of_script() {
        let transport = ScriptedTransport::new();

        let err = transport
            .send(get("https://a.example/one"))
            .await
            .expect_err("unscripted request should fail");

        let HttpError::Transport(message) = err;
        assert!(message.contains("script exhausted"));
    }
}
