use serde::{Deserialize, Serialize};

pub mod protocol;
pub mod resource;

pub use protocol::{ApiRequest, HttpMethod, LoginRequest, RegisterRequest, VerifyAdminRequest};
pub use resource::AdminResource;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// localStorage key holding the bearer token.
pub const TOKEN_STORAGE_KEY: &str = "adminToken";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

const FALLBACK_DISPLAY_NAME: &str = "Admin";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// Profile returned by the backend next to a valid token.
///
/// Every field is optional on the wire; the backend only guarantees that the
/// object is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Name shown in the header: name, then email, then a generic label.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref().filter(|e| !e.trim().is_empty()))
            .unwrap_or(FALLBACK_DISPLAY_NAME)
    }
}

/// Body of `GET /api/verify-admin`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub user: Option<User>,
}

/// Body of a successful `POST /api/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// Structured error body sent by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extracts a non-empty `message` from a raw response body, if any.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
