//! 认证模块
//!
//! Bridges the [`SessionController`] to Leptos signals. The controller owns the
//! state; this context subscribes to it and mirrors every snapshot, including
//! the `loading` flag of an in-flight login, into a signal. The router reads
//! the session through an injected signal and never depends on this module.

use std::sync::Arc;

use leptos::prelude::*;
use log::warn;
use ngo_admin::{ApiClient, ApiConfig, LoginError, Session, SessionController, User};

use crate::web::{GlooHttpClient, LocalTokenStore};

pub type AdminApi = ApiClient<GlooHttpClient, LocalTokenStore>;
type AdminSession = SessionController<GlooHttpClient, LocalTokenStore>;

/// 认证上下文
///
/// Cheap to clone; shared through Context.
#[derive(Clone)]
pub struct AuthContext {
    controller: Arc<AdminSession>,
    state: RwSignal<Session>,
    /// Bumped each time the wrapper raises the forced-logout signal.
    forced_logouts: RwSignal<u32>,
}

impl AuthContext {
    pub fn new(config: ApiConfig) -> Self {
        let http = GlooHttpClient::new(&config);
        let controller = Arc::new(SessionController::with_client(
            config,
            http,
            LocalTokenStore,
        ));
        let state = RwSignal::new(controller.session());
        controller.subscribe(move |session| state.set(session.clone()));

        let forced_logouts = RwSignal::new(0u32);
        controller
            .api()
            .auth_failure()
            .subscribe(move || forced_logouts.update(|n| *n += 1));

        Self {
            controller,
            state,
            forced_logouts,
        }
    }

    /// 获取会话状态信号（用于路由服务注入）
    pub fn session_signal(&self) -> Signal<Session> {
        self.state.into()
    }

    pub fn user(&self) -> Option<User> {
        self.state.with(|s| s.user.clone())
    }

    pub fn api(&self) -> &AdminApi {
        self.controller.api()
    }

    pub async fn bootstrap(&self) {
        self.controller.bootstrap().await;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        self.controller.login(email, password).await
    }

    /// 注销并清除状态
    ///
    /// 导航由路由服务的会话监听自动处理。
    pub fn logout(&self) {
        self.controller.logout();
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), LoginError> {
        self.controller
            .register(email, password, confirm_password)
            .await
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// Verifies the stored token once, and turns every forced-logout raised by
/// the API wrapper into a session logout. The router's session watcher then
/// moves the user to the login page.
pub fn init_auth(ctx: &AuthContext) {
    let forced = ctx.forced_logouts;
    let watcher = ctx.clone();
    Effect::new(move |_| {
        if forced.get() > 0 {
            warn!("session rejected by the server, signing out");
            watcher.logout();
        }
    });

    let ctx = ctx.clone();
    leptos::task::spawn_local(async move {
        ctx.bootstrap().await;
    });
}
