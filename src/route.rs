//! 路由定义模块 - 领域模型
//!
//! Pure routing logic, independent of the DOM: the pages of the console and
//! the guard deciding whether a page may render for a given [`Session`].

use std::fmt::Display;

use crate::session::Session;

/// What the protected area should show for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    /// Verification has not finished; show a neutral spinner.
    Waiting,
    Protected,
    RedirectToLogin,
}

impl RenderDecision {
    /// Never yields `Protected` while the session is still loading.
    pub fn for_session(session: &Session) -> Self {
        if session.loading {
            RenderDecision::Waiting
        } else if session.authenticated {
            RenderDecision::Protected
        } else {
            RenderDecision::RedirectToLogin
        }
    }
}

/// Outcome of resolving a route against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Wait,
    Stay,
    Redirect(AppRoute),
}

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Register,
    /// 控制面板 (需要认证)
    Dashboard,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Self::Login,
            "/register" => Self::Register,
            "" | "/dashboard" => Self::Dashboard,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Dashboard)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }

    /// Decides whether this route may render for `session`.
    ///
    /// Public pages keep rendering while a login is in flight so their form
    /// state survives; only protected pages wait for verification.
    pub fn resolve(&self, session: &Session) -> Navigation {
        let decision = RenderDecision::for_session(session);

        if self.requires_auth() {
            return match decision {
                RenderDecision::Waiting => Navigation::Wait,
                RenderDecision::Protected => Navigation::Stay,
                RenderDecision::RedirectToLogin => {
                    Navigation::Redirect(Self::auth_failure_redirect())
                }
            };
        }

        if self.should_redirect_when_authenticated() && decision == RenderDecision::Protected {
            return Navigation::Redirect(Self::auth_success_redirect());
        }

        Navigation::Stay
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngo_admin_shared::User;

    fn loading() -> Session {
        Session::default()
    }

    fn signed_in() -> Session {
        Session::signed_in(User::named("Admin"))
    }

    #[test]
    fn render_decision_waits_while_loading() {
        assert_eq!(RenderDecision::for_session(&loading()), RenderDecision::Waiting);

        // authenticated but re-verifying still waits
        let mut session = signed_in();
        session.loading = true;
        assert_eq!(RenderDecision::for_session(&session), RenderDecision::Waiting);
    }

    #[test]
    fn render_decision_after_resolution() {
        assert_eq!(RenderDecision::for_session(&signed_in()), RenderDecision::Protected);
        assert_eq!(
            RenderDecision::for_session(&Session::signed_out()),
            RenderDecision::RedirectToLogin
        );
    }

    #[test]
    fn paths_round_trip() {
        for route in [AppRoute::Login, AppRoute::Register, AppRoute::Dashboard] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/dashboard/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/blog"), AppRoute::NotFound);
    }

    #[test]
    fn dashboard_is_guarded() {
        let dashboard = AppRoute::Dashboard;
        assert_eq!(dashboard.resolve(&loading()), Navigation::Wait);
        assert_eq!(dashboard.resolve(&signed_in()), Navigation::Stay);
        assert_eq!(
            dashboard.resolve(&Session::signed_out()),
            Navigation::Redirect(AppRoute::Login)
        );
    }

    #[test]
    fn public_pages_bounce_authenticated_users() {
        assert_eq!(
            AppRoute::Login.resolve(&signed_in()),
            Navigation::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            AppRoute::Register.resolve(&signed_in()),
            Navigation::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(AppRoute::Login.resolve(&loading()), Navigation::Stay);
        assert_eq!(AppRoute::Login.resolve(&Session::signed_out()), Navigation::Stay);
        assert_eq!(AppRoute::NotFound.resolve(&signed_in()), Navigation::Stay);
    }
}
