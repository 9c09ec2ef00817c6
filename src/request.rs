use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{ApiError, TransportError};

pub use ngo_admin_shared::HttpMethod;

#[cfg(test)]
use futures::FutureExt;
#[cfg(test)]
use futures::channel::oneshot;
#[cfg(test)]
use futures::future::Shared;
#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body. An empty body decodes as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// HTTP 客户端特性 (Trait)
///
/// Implemented once per platform: `gloo-net` in the browser, `reqwest`
/// natively, and a scripted mock in tests. `(?Send)` because browser futures
/// are not `Send`.
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// =========================================================
// 实现层: reqwest 客户端 (native)
// =========================================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    timeout_ms: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestHttpClient {
    pub fn new(config: &crate::ApiConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::RequestBuild(e.to_string()))?;
        Ok(Self {
            client,
            timeout_ms: config.timeout.as_millis() as u64,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &req.url);

        for (k, v) in req.headers {
            builder = builder.header(k, v);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout_ms)
            } else if e.is_builder() {
                TransportError::RequestBuild(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
type MockReply = Result<(u16, String), TransportError>;

#[cfg(test)]
pub struct MockHttpClient {
    // URL -> reply, replaced by the next mock for the same URL
    responses: RefCell<HashMap<String, MockReply>>,
    // 请求在此信号到达前挂起
    gate: RefCell<Option<Shared<oneshot::Receiver<()>>>>,
    // 仅挂起指定 URL 的请求
    url_gates: RefCell<HashMap<String, Shared<oneshot::Receiver<()>>>>,
    // 记录发出的请求
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            gate: RefCell::new(None),
            url_gates: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
        self.push_reply(url, Ok((status, body.to_string())));
    }

    pub fn mock_raw(&self, url: &str, status: u16, body: &str) {
        self.push_reply(url, Ok((status, body.to_string())));
    }

    pub fn mock_network_error(&self, url: &str) {
        self.push_reply(
            url,
            Err(TransportError::Network("connection refused".to_string())),
        );
    }

    /// Holds every request until `release` fires, so several calls can be in
    /// flight at once.
    pub fn hold_requests(&self, release: oneshot::Receiver<()>) {
        *self.gate.borrow_mut() = Some(release.shared());
    }

    /// Like [`MockHttpClient::hold_requests`], but only for requests to `url`.
    pub fn hold_url(&self, url: &str, release: oneshot::Receiver<()>) {
        self.url_gates
            .borrow_mut()
            .insert(url.to_string(), release.shared());
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }

    fn push_reply(&self, url: &str, reply: MockReply) {
        self.responses.borrow_mut().insert(url.to_string(), reply);
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(req.clone());

        let gate = self
            .gate
            .borrow()
            .clone()
            .or_else(|| self.url_gates.borrow().get(&req.url).cloned());
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let reply = self.responses.borrow().get(&req.url).cloned();
        match reply {
            Some(reply) => {
                let (status, body) = reply?;
                Ok(HttpResponse { status, body })
            }
            None => Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}
