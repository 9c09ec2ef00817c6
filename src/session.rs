//! Session controller
//!
//! Owns the authentication state of the console. The state is derived from the
//! stored token on every load and is only mutated by [`SessionController::bootstrap`],
//! [`SessionController::login`] and [`SessionController::logout`].
//!
//! State machine:
//! `Uninitialized -> Verifying -> {Authenticated, Unauthenticated}`,
//! `Authenticated -> Unauthenticated` (logout),
//! `Unauthenticated -> Verifying -> Authenticated` (login).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use ngo_admin_shared::{
    LoginRequest, LoginResponse, RegisterRequest, User, VerifyAdminRequest, VerifyResponse,
};

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::{LOGIN_FAILED_MESSAGE, LoginError, REGISTER_FAILED_MESSAGE};
use crate::request::HttpClient;
use crate::token::TokenStore;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    Verifying,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of the authentication state handed to views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub user: Option<User>,
    /// True until startup verification finishes, and while a login is in flight.
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            authenticated: false,
            user: None,
            loading: true,
        }
    }
}

impl Session {
    pub fn signed_out() -> Self {
        Self {
            authenticated: false,
            user: None,
            loading: false,
        }
    }

    pub fn signed_in(user: User) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
            loading: false,
        }
    }
}

#[derive(Default)]
struct SessionState {
    phase: SessionPhase,
    session: Session,
}

/// Clears the in-flight flag even if the login future is dropped.
struct LoginGuard<'a>(&'a AtomicBool);

impl<'a> LoginGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

type SessionListener = Arc<dyn Fn(&Session) + Send + Sync>;

pub struct SessionController<C, S> {
    api: ApiClient<C, S>,
    state: Mutex<SessionState>,
    listeners: Mutex<Vec<SessionListener>>,
    bootstrapped: AtomicBool,
    login_in_flight: AtomicBool,
}

impl<C: HttpClient, S: TokenStore> SessionController<C, S> {
    pub fn new(api: ApiClient<C, S>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState::default()),
            listeners: Mutex::new(Vec::new()),
            bootstrapped: AtomicBool::new(false),
            login_in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_client(config: ApiConfig, http: C, tokens: S) -> Self {
        Self::new(ApiClient::new(config, http, tokens))
    }

    /// The wrapper shared with management views.
    pub fn api(&self) -> &ApiClient<C, S> {
        &self.api
    }

    pub fn session(&self) -> Session {
        self.with_state(|s| s.session.clone())
    }

    pub fn phase(&self) -> SessionPhase {
        self.with_state(|s| s.phase)
    }

    pub fn is_authenticated(&self) -> bool {
        self.with_state(|s| s.session.authenticated)
    }

    pub fn user(&self) -> Option<User> {
        self.with_state(|s| s.session.user.clone())
    }

    /// Called with the new snapshot after every change of the session,
    /// including `loading` flipping at the start of a login.
    pub fn subscribe(&self, listener: impl Fn(&Session) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Resolves the startup session from the stored token.
    ///
    /// Runs once; later calls return the current session untouched.
    pub async fn bootstrap(&self) -> Session {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            debug!("session bootstrap already ran");
            return self.session();
        }

        if self.api.tokens().get().is_none() {
            info!("no stored token, starting signed out");
            self.update_state(|s| {
                s.phase = SessionPhase::Unauthenticated;
                s.session = Session::signed_out();
            });
            return self.session();
        }

        self.update_state(|s| {
            s.phase = SessionPhase::Verifying;
            s.session.loading = true;
        });

        match self.api.call(&VerifyAdminRequest).await {
            Ok(VerifyResponse { valid: true, user }) => {
                let user = user.unwrap_or_default();
                info!("stored token verified for {}", user.display_name());
                self.establish(user);
            }
            Ok(_) => {
                warn!("stored token reported invalid");
                self.logout();
            }
            Err(err) => {
                warn!("token verification failed: {}", err);
                self.logout();
            }
        }

        self.session()
    }

    /// Exchanges credentials for a token.
    ///
    /// A second call while one is pending fails with [`LoginError::InProgress`]
    /// without touching the network.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        let Some(_guard) = LoginGuard::acquire(&self.login_in_flight) else {
            warn!("login ignored, another attempt is pending");
            return Err(LoginError::InProgress);
        };

        self.update_state(|s| {
            s.phase = SessionPhase::Verifying;
            s.session.loading = true;
        });

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.api.call(&request).await {
            Ok(LoginResponse { token, user }) if !token.is_empty() => {
                let tokens = self.api.tokens();
                if !tokens.set(&token) || tokens.get().as_deref() != Some(token.as_str()) {
                    warn!("issued token could not be persisted, staying signed out");
                    tokens.clear();
                    self.settle_signed_out();
                    return Err(LoginError::Storage);
                }
                let user = user.unwrap_or_default();
                info!("signed in as {}", user.display_name());
                self.establish(user.clone());
                Ok(user)
            }
            Ok(_) => {
                warn!("login response carried an empty token");
                self.settle_signed_out();
                Err(LoginError::Rejected(LOGIN_FAILED_MESSAGE.to_string()))
            }
            Err(err) => {
                info!("login rejected: {}", err);
                self.settle_signed_out();
                Err(LoginError::from_api(err, LOGIN_FAILED_MESSAGE))
            }
        }
    }

    /// Clears token and user. Local only, safe to call repeatedly.
    pub fn logout(&self) {
        self.api.tokens().clear();
        let was_authenticated = self.update_state(|s| {
            let was = s.session.authenticated;
            s.phase = SessionPhase::Unauthenticated;
            s.session = Session::signed_out();
            was
        });
        if was_authenticated {
            info!("signed out");
        }
    }

    /// Creates an admin account. Leaves the session untouched.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), LoginError> {
        if password != confirm_password {
            return Err(LoginError::PasswordMismatch);
        }

        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.api
            .call(&request)
            .await
            .map(|_| info!("registered a new admin account"))
            .map_err(|err| {
                info!("registration rejected: {}", err);
                LoginError::from_api(err, REGISTER_FAILED_MESSAGE)
            })
    }

    fn establish(&self, user: User) {
        self.update_state(|s| {
            s.phase = SessionPhase::Authenticated;
            s.session = Session::signed_in(user);
        });
        self.api.auth_failure().rearm();
    }

    /// Failed login: back to signed out without touching the token store.
    fn settle_signed_out(&self) {
        self.update_state(|s| {
            s.phase = SessionPhase::Unauthenticated;
            s.session = Session::signed_out();
        });
    }

    fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mutates the state, then notifies listeners outside the lock if the
    /// session snapshot changed.
    fn update_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let (result, changed) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let before = state.session.clone();
            let result = f(&mut state);
            let changed = (state.session != before).then(|| state.session.clone());
            (result, changed)
        };

        if let Some(session) = changed {
            let listeners: Vec<SessionListener> = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for listener in listeners {
                listener(&session);
            }
        }
        result
    }
}
