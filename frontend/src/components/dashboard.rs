use crate::auth::use_auth;
use crate::components::icons::*;
use leptos::prelude::*;
use leptos::task::spawn_local;
use ngo_admin::{AdminResource, ApiError};
use serde_json::Value;

/// 单个集合的加载状态
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CountState {
    Loading,
    Loaded(usize),
    Failed(String),
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();

    let counts = RwSignal::new(
        AdminResource::ALL
            .iter()
            .map(|r| (*r, CountState::Loading))
            .collect::<Vec<_>>(),
    );

    let set_count = move |resource: AdminResource, state: CountState| {
        counts.update(|list| {
            if let Some(entry) = list.iter_mut().find(|(r, _)| *r == resource) {
                entry.1 = state;
            }
        });
    };

    let load_counts = {
        let auth = auth.clone();
        move || {
            for resource in AdminResource::ALL {
                set_count(resource, CountState::Loading);
                let auth = auth.clone();
                spawn_local(async move {
                    let state = match auth.api().get::<Value>(resource.path()).await {
                        Ok(body) => CountState::Loaded(AdminResource::record_count(&body)),
                        // the forced-logout watcher takes it from here
                        Err(ApiError::Unauthorized { .. }) => return,
                        Err(e) => CountState::Failed(e.user_message()),
                    };
                    set_count(resource, state);
                });
            }
        }
    };

    // 初始加载
    load_counts();

    let is_refreshing =
        move || counts.with(|list| list.iter().any(|(_, s)| *s == CountState::Loading));

    let greeting = {
        let auth = auth.clone();
        move || {
            let name = auth
                .user()
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "Admin".to_string());
            format!("Welcome, {}", name)
        }
    };

    let on_logout = {
        let auth = auth.clone();
        // 不需要手动导航，路由服务会监听会话变化并自动重定向
        move |_| auth.logout()
    };

    let on_refresh = {
        let load_counts = load_counts.clone();
        move |_| load_counts()
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8 font-sans">
            <div class="max-w-7xl mx-auto space-y-8">
                <div class="navbar bg-base-100 rounded-box shadow-xl">
                    <div class="flex-1 gap-2">
                        <LayoutGrid attr:class="text-primary h-6 w-6" />
                        <a class="btn btn-ghost text-xl">"NGO Admin"</a>
                        <span class="badge badge-neutral hidden md:inline-flex">{greeting}</span>
                    </div>
                    <div class="flex-none gap-2">
                        <button
                            on:click=on_refresh
                            disabled=is_refreshing
                            class="btn btn-ghost btn-circle"
                        >
                            <RefreshCw attr:class=move || if is_refreshing() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                        </button>
                        <button on:click=on_logout class="btn btn-outline btn-error gap-2">
                            <LogOut attr:class="h-4 w-4" /> "Logout"
                        </button>
                    </div>
                </div>

                <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4">
                    <For
                        each=move || counts.get()
                        key=|(resource, state)| (*resource, state.clone())
                        children=move |(resource, state)| {
                            view! {
                                <div class="stat bg-base-100 rounded-box shadow">
                                    <div class="stat-title">{resource.label()}</div>
                                    {match state {
                                        CountState::Loading => view! {
                                            <div class="stat-value">
                                                <span class="loading loading-spinner loading-md"></span>
                                            </div>
                                        }.into_any(),
                                        CountState::Loaded(n) => view! {
                                            <div class="stat-value text-primary">{n}</div>
                                        }.into_any(),
                                        CountState::Failed(msg) => view! {
                                            <div class="stat-desc text-error whitespace-normal">{msg}</div>
                                        }.into_any(),
                                    }}
                                    <div class="stat-desc font-mono opacity-50">{resource.path()}</div>
                                </div>
                            }
                        }
                    />
                </div>
            </div>
        </div>
    }
}
