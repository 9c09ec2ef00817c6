use thiserror::Error;

// =========================================================
// 传输层错误
// =========================================================

/// No usable response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// 请求构建失败
    #[error("failed to build request: {0}")]
    RequestBuild(String),
    /// 网络请求失败 (DNS, refused connection, CORS...)
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    /// 响应体读取失败
    #[error("failed to read response body: {0}")]
    Body(String),
}

// =========================================================
// API 错误
// =========================================================

pub const NETWORK_ERROR_MESSAGE: &str = "No response from server. Please check your connection.";
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Outcome of a failed call through [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure. The session is left untouched.
    #[error("no response from server: {0}")]
    Network(#[from] TransportError),
    /// 401 on a request that carried the bearer token. If that token was
    /// still the stored one, it has been cleared and the forced-logout signal
    /// raised.
    #[error("session expired")]
    Unauthorized { message: Option<String> },
    /// Any other non-2xx response.
    #[error("request failed with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    /// 2xx response whose body does not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
    /// The request body could not be serialized; nothing was sent.
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) | ApiError::Encode(_) => None,
        }
    }

    /// The server's `message` field, when it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.as_deref()
            }
            ApiError::Network(_) | ApiError::Decode(_) | ApiError::Encode(_) => None,
        }
    }

    /// Text suitable for an alert box.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            _ => self
                .server_message()
                .unwrap_or(GENERIC_ERROR_MESSAGE)
                .to_string(),
        }
    }
}

// =========================================================
// 认证错误
// =========================================================

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const REGISTER_FAILED_MESSAGE: &str = "Registration failed";

/// Failure of a login or registration attempt, carrying the text shown to the
/// user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    /// The backend refused the attempt; holds its message or a fallback.
    #[error("{0}")]
    Rejected(String),
    #[error("No response from server. Please check your connection.")]
    Network,
    #[error("A login request is already in progress")]
    InProgress,
    #[error("Passwords do not match")]
    PasswordMismatch,
    /// The token was issued but could not be persisted (storage disabled or full).
    #[error("Could not save your session in this browser. Please check that site storage is enabled.")]
    Storage,
}

impl LoginError {
    pub(crate) fn from_api(err: ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Network(_) => LoginError::Network,
            other => LoginError::Rejected(
                other
                    .server_message()
                    .unwrap_or(fallback)
                    .to_string(),
            ),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

// =========================================================
// 配置错误
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
    #[error("API timeout must be a positive number of milliseconds, got {0:?}")]
    InvalidTimeout(String),
}
