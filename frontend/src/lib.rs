//! NGO admin 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::router`: 路由服务（核心引擎），guard rules live in `ngo_admin::route`
//! - `auth`: 认证状态管理, mirrors `ngo_admin::SessionController` into signals
//! - `components`: UI 组件层

mod auth;
mod components {
    pub mod dashboard;
    mod icons;
    pub mod login;
    pub mod register;
}

use crate::auth::{AuthContext, init_auth};
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::register::RegisterPage;

use leptos::prelude::*;
use log::error;
use ngo_admin::{AppRoute, ApiConfig};

// 浏览器 Web API 封装模块
pub(crate) mod web {
    mod http;
    pub mod router;
    mod storage;

    pub use http::GlooHttpClient;
    pub use storage::LocalTokenStore;
}

use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = ApiConfig::from_build_env().unwrap_or_else(|e| {
        error!("invalid build configuration ({}), using defaults", e);
        ApiConfig::default()
    });

    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new(config);
    provide_context(auth_ctx.clone());

    // 2. 校验已保存的令牌，监听强制登出
    init_auth(&auth_ctx);

    // 3. 获取会话信号，用于注入路由服务（解耦！）
    let session = auth_ctx.session_signal();

    view! {
        <Router session=session>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
