//! Session core of the NGO admin console.
//!
//! Platform-independent pieces shared by the browser frontend:
//! - `token`: bearer token persistence behind [`TokenStore`]
//! - `request`: HTTP transport seam ([`HttpClient`])
//! - `client`: [`ApiClient`], bearer header attachment and the 401 rule
//! - `session`: [`SessionController`] state machine (bootstrap/login/logout)
//! - `route`: page model and the render guard

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod route;
pub mod session;
pub mod token;

pub use client::{ApiClient, AuthFailureSignal};
pub use config::ApiConfig;
pub use error::{ApiError, ConfigError, LoginError, TransportError};
pub use request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
#[cfg(not(target_arch = "wasm32"))]
pub use request::ReqwestHttpClient;
pub use route::{AppRoute, Navigation, RenderDecision};
pub use session::{Session, SessionController, SessionPhase};
pub use token::{MemoryTokenStore, TOKEN_STORAGE_KEY, TokenStore};

pub use ngo_admin_shared as shared;
pub use ngo_admin_shared::{AdminResource, User};
