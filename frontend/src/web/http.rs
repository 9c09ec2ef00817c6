//! HTTP 请求封装模块
//!
//! [`HttpClient`] over `gloo-net` (browser `fetch`). The fetch API has no
//! timeout of its own, so the request races a `gloo-timers` timeout.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::{Either, select};
use gloo_net::http::{Method, RequestBuilder};
use gloo_timers::future::TimeoutFuture;
use ngo_admin::{ApiConfig, HttpClient, HttpMethod, HttpRequest, HttpResponse, TransportError};

/// Browser transport.
#[derive(Debug, Clone, Copy)]
pub struct GlooHttpClient {
    timeout_ms: u32,
}

impl GlooHttpClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_timeout(config.timeout)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_ms: timeout.as_millis().min(u32::MAX as u128) as u32,
        }
    }
}

fn to_gloo_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait(?Send)]
impl HttpClient for GlooHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = RequestBuilder::new(&req.url).method(to_gloo_method(req.method));
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }

        let request = match req.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| TransportError::RequestBuild(e.to_string()))?;

        let timeout = Box::pin(TimeoutFuture::new(self.timeout_ms));
        let response = match select(Box::pin(request.send()), timeout).await {
            Either::Left((result, _)) => {
                result.map_err(|e| TransportError::Network(e.to_string()))?
            }
            Either::Right(_) => return Err(TransportError::Timeout(self.timeout_ms as u64)),
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
