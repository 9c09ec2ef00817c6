//! The single point of outbound communication with the backend.
//!
//! Every authenticated request reads the token from the [`TokenStore`] at call
//! time. A 401 on such a request clears the token and raises the
//! [`AuthFailureSignal`]; navigation is left to whoever subscribed to it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};
use ngo_admin_shared::{ApiRequest, ErrorBody, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::token::TokenStore;

type Listener = Arc<dyn Fn() + Send + Sync>;

// =========================================================
// 强制登出信号
// =========================================================

/// One-shot event raised when an authenticated request comes back 401.
///
/// Once raised it stays tripped, so a burst of concurrent 401s produces a
/// single notification. [`AuthFailureSignal::rearm`] is called when a new
/// session is established.
#[derive(Default)]
pub struct AuthFailureSignal {
    tripped: AtomicBool,
    listeners: Mutex<Vec<Listener>>,
}

impl AuthFailureSignal {
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    pub fn rearm(&self) {
        self.tripped.store(false, Ordering::SeqCst);
    }

    /// Returns `false` when the signal was already tripped.
    pub(crate) fn raise(&self) -> bool {
        if self.tripped.swap(true, Ordering::SeqCst) {
            return false;
        }
        // listeners may call back into the session; don't hold the lock
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener();
        }
        true
    }
}

// =========================================================
// API 客户端
// =========================================================

pub struct ApiClient<C, S> {
    config: ApiConfig,
    http: C,
    tokens: S,
    auth_failure: AuthFailureSignal,
}

impl<C: HttpClient, S: TokenStore> ApiClient<C, S> {
    pub fn new(config: ApiConfig, http: C, tokens: S) -> Self {
        Self {
            config,
            http,
            tokens,
            auth_failure: AuthFailureSignal::default(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    pub fn tokens(&self) -> &S {
        &self.tokens
    }

    pub fn auth_failure(&self) -> &AuthFailureSignal {
        &self.auth_failure
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(HttpMethod::Get, path, None, true).await?.json()
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        self.execute(HttpMethod::Post, path, Some(body), true)
            .await?
            .json()
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        self.execute(HttpMethod::Put, path, Some(body), true)
            .await?
            .json()
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(HttpMethod::Delete, path, None, true)
            .await?
            .json()
    }

    /// Sends a typed request using its declared path, method and auth mode.
    pub async fn call<R: ApiRequest>(&self, req: &R) -> Result<R::Response, ApiError> {
        let body = if R::METHOD.has_body() {
            Some(encode(req)?)
        } else {
            None
        };
        self.execute(R::METHOD, R::PATH, body, R::AUTHENTICATED)
            .await?
            .json()
    }

    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
        authenticated: bool,
    ) -> Result<HttpResponse, ApiError> {
        let mut req = HttpRequest::new(&self.config.url(path), method);

        let bearer = if authenticated { self.tokens.get() } else { None };
        if let Some(token) = &bearer {
            req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }

        if let Some(body) = body {
            req = req
                .with_header(HEADER_CONTENT_TYPE, "application/json")
                .with_body(body);
        }

        debug!("{} {}", method.as_str(), req.url);
        let resp = self.http.send(req).await.map_err(|e| {
            warn!("{} {} failed: {}", method.as_str(), path, e);
            ApiError::from(e)
        })?;

        if resp.ok() {
            return Ok(resp);
        }

        let message = ErrorBody::message_from(&resp.body);
        if resp.status == 401 {
            if let Some(sent) = bearer {
                self.force_logout(path, &sent);
                return Err(ApiError::Unauthorized { message });
            }
        }

        debug!("{} {} -> {}", method.as_str(), path, resp.status);
        Err(ApiError::Status {
            status: resp.status,
            message,
        })
    }

    /// Only acts while `sent` is still the stored token. A late 401 for a
    /// token that was replaced or cleared in the meantime leaves the store
    /// and the signal alone.
    fn force_logout(&self, path: &str, sent: &str) {
        if self.tokens.get().as_deref() != Some(sent) {
            debug!("{} rejected a token that is no longer stored", path);
            return;
        }
        self.tokens.clear();
        if self.auth_failure.raise() {
            warn!("token rejected by {}, forcing logout", path);
        }
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MockHttpClient;
    use crate::token::MemoryTokenStore;
    use futures::channel::oneshot;
    use ngo_admin_shared::AdminResource;
    use serde_json::{Value, json};
    use std::sync::atomic::AtomicUsize;

    const BASE: &str = "http://localhost:5000";

    fn client(token: Option<&str>) -> ApiClient<MockHttpClient, MemoryTokenStore> {
        let tokens = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        ApiClient::new(ApiConfig::default(), MockHttpClient::new(), tokens)
    }

    fn count_failures(api: &ApiClient<MockHttpClient, MemoryTokenStore>) -> Arc<AtomicUsize> {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        api.auth_failure().subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        fired
    }

    #[tokio::test]
    async fn attaches_bearer_token_read_at_call_time() {
        let api = client(Some("abc"));
        api.http()
            .mock_response(&format!("{BASE}/api/blog"), 200, json!([]));

        let _: Value = api.get(AdminResource::Blog.path()).await.unwrap();
        let req = api.http().last_request().unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));

        api.tokens().set("rotated");
        let _: Value = api.get(AdminResource::Blog.path()).await.unwrap();
        let req = api.http().last_request().unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer rotated"));
    }

    #[tokio::test]
    async fn omits_header_without_token() {
        let api = client(None);
        api.http()
            .mock_response(&format!("{BASE}/api/slides"), 200, json!([]));

        let _: Value = api.get("/api/slides").await.unwrap();
        assert_eq!(api.http().last_request().unwrap().header("Authorization"), None);
    }

    #[tokio::test]
    async fn json_body_and_content_type_on_writes() {
        let api = client(Some("abc"));
        let url = format!("{BASE}{}", AdminResource::TeamMembers.item_path("7"));
        api.http().mock_response(&url, 200, json!({"_id": "7"}));

        let _: Value = api
            .put(&AdminResource::TeamMembers.item_path("7"), &json!({"name": "Asha"}))
            .await
            .unwrap();

        let req = api.http().last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"Asha"}"#));
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_raises_signal() {
        let api = client(Some("expired"));
        let fired = count_failures(&api);
        api.http().mock_response(
            &format!("{BASE}/api/messages"),
            401,
            json!({"message": "jwt expired"}),
        );

        let err = api.get::<Value>("/api/messages").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Unauthorized {
                message: Some("jwt expired".to_string())
            }
        );
        assert_eq!(api.tokens().get(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(api.auth_failure().is_tripped());
    }

    #[tokio::test]
    async fn concurrent_unauthorized_collapse_to_one_logout() {
        let api = client(Some("expired"));
        let fired = count_failures(&api);
        for resource in [AdminResource::Blog, AdminResource::Slides, AdminResource::Messages] {
            api.http()
                .mock_response(&format!("{BASE}{}", resource.path()), 401, json!({}));
        }

        let (release, gate) = oneshot::channel();
        api.http().hold_requests(gate);

        let (a, b, c, _) = futures::join!(
            api.get::<Value>(AdminResource::Blog.path()),
            api.get::<Value>(AdminResource::Slides.path()),
            api.get::<Value>(AdminResource::Messages.path()),
            async move {
                let _ = release.send(());
            },
        );

        // all three left with the bearer header before any 401 came back
        for result in [a, b, c] {
            assert_eq!(result.unwrap_err(), ApiError::Unauthorized { message: None });
        }
        assert_eq!(api.http().request_count(), 3);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(api.tokens().get(), None);

        api.auth_failure().rearm();
        api.tokens().set("fresh-but-revoked");
        let _ = api.get::<Value>(AdminResource::Blog.path()).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn anonymous_401_does_not_force_logout() {
        let api = client(None);
        let fired = count_failures(&api);
        api.http().mock_response(
            &format!("{BASE}/api/blog"),
            401,
            json!({"message": "no token"}),
        );

        let err = api.get::<Value>("/api/blog").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(matches!(err, ApiError::Status { .. }));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn server_and_network_errors_keep_token() {
        let api = client(Some("abc"));
        let fired = count_failures(&api);
        api.http().mock_response(
            &format!("{BASE}/api/about-us"),
            500,
            json!({"message": "Database unavailable"}),
        );
        api.http().mock_network_error(&format!("{BASE}/api/contact-info"));

        let err = api.get::<Value>("/api/about-us").await.unwrap_err();
        assert_eq!(err.user_message(), "Database unavailable");

        let err = api.get::<Value>("/api/contact-info").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));

        assert_eq!(api.tokens().get().as_deref(), Some("abc"));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_success_body_decodes_as_unit() {
        let api = client(Some("abc"));
        api.http()
            .mock_raw(&format!("{BASE}/api/blog/1"), 204, "");

        let res: Result<(), ApiError> = api.delete("/api/blog/1").await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let api = client(Some("abc"));
        api.http()
            .mock_raw(&format!("{BASE}/api/blog"), 200, "<html>");

        let err = api.get::<Vec<Value>>("/api/blog").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unserializable_body_is_encode_error_and_never_sent() {
        let api = client(Some("abc"));
        // JSON object keys must be strings
        let body = std::collections::BTreeMap::from([(vec![1u8], 1u8)]);

        let err = api.post::<_, Value>("/api/blog", &body).await.unwrap_err();

        assert!(matches!(err, ApiError::Encode(_)));
        assert_eq!(err.user_message(), crate::error::GENERIC_ERROR_MESSAGE);
        assert_eq!(api.http().request_count(), 0);
        assert_eq!(api.tokens().get().as_deref(), Some("abc"));
    }
}
