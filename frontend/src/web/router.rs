//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! Guard decisions come from [`AppRoute::resolve`]; this module only applies
//! them to the browser history and the current-route signal.

use leptos::prelude::*;
use log::info;
use ngo_admin::{AppRoute, Navigation, Session};
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn write_history(path: &str, use_push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let _ = if use_push {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    };
}

/// 路由器服务
///
/// 通过注入的会话信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    session: Signal<Session>,
}

impl RouterService {
    fn new(session: Signal<Session>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            session,
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    pub fn session(&self) -> Signal<Session> {
        self.session
    }

    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    /// 导航到指定路由
    ///
    /// While the session is still loading a protected target is accepted as
    /// is; the outlet shows a spinner and the session watcher redirects once
    /// verification settles.
    fn navigate_to_route(&self, target: AppRoute, use_push: bool) {
        let session = self.session.get_untracked();
        let route = match target.resolve(&session) {
            Navigation::Redirect(redirect) => {
                info!("[Router] {} not allowed, redirecting to {}", target, redirect);
                redirect
            }
            Navigation::Wait | Navigation::Stay => target,
        };

        write_history(route.to_path(), use_push);
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            router.navigate_to_route(target, false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置会话变化时的自动重定向
    fn setup_session_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let session = self.session;

        Effect::new(move |_| {
            let session = session.get();
            let route = current_route.get_untracked();

            if let Navigation::Redirect(redirect) = route.resolve(&session) {
                info!("[Router] session changed, redirecting {} -> {}", route, redirect);
                write_history(redirect.to_path(), true);
                set_route.set(redirect);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: Signal<Session>) -> RouterService {
    let router = RouterService::new(session);

    // a deep link to "/" lands on its canonical path
    write_history(router.current_route.get_untracked().to_path(), false);

    router.init_popstate_listener();
    router.setup_session_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 会话状态信号
    session: Signal<Session>,
    children: Children,
) -> impl IntoView {
    provide_router(session);

    children()
}

/// 路由出口组件
///
/// Renders the matched page only when the guard lets it stay; otherwise a
/// neutral spinner, so a protected page never flashes before verification.
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    // memoized so a session update with the same outcome keeps the page mounted
    let outcome = Memo::new(move |_| {
        let current = router.current_route().get();
        let navigation = router.session().with(|session| current.resolve(session));
        (current, navigation)
    });

    move || {
        let (current, navigation) = outcome.get();
        match navigation {
            Navigation::Stay => matcher(current),
            Navigation::Wait | Navigation::Redirect(_) => view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any(),
        }
    }
}
