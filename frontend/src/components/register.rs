use crate::auth::use_auth;
use crate::components::icons::UserPlus;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use ngo_admin::AppRoute;

/// Account creation. Does not sign the new admin in.
#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    // 消息内容, 是否出错
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }

        set_is_submitting.set(true);
        set_notice.set(None);

        let auth = auth.clone();
        spawn_local(async move {
            let email = email.get_untracked();
            let result = auth
                .register(
                    email.trim(),
                    &password.get_untracked(),
                    &confirm.get_untracked(),
                )
                .await;
            match result {
                Ok(()) => {
                    set_password.set(String::new());
                    set_confirm.set(String::new());
                    set_notice.set(Some((
                        "Account created. You can now sign in.".to_string(),
                        false,
                    )));
                }
                Err(err) => set_notice.set(Some((err.message(), true))),
            }
            set_is_submitting.set(false);
        });
    };

    let go_login = move |ev: leptos::web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(AppRoute::Login.to_path());
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <UserPlus attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"Create admin account"</h1>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || notice.get().is_some()>
                            <div role="alert" class=move || {
                                match notice.get() {
                                    Some((_, true)) => "alert alert-error text-sm py-2",
                                    _ => "alert alert-success text-sm py-2",
                                }
                            }>
                                <span>{move || notice.get().map(|(msg, _)| msg).unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                autocomplete="username"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="new-password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="confirm">
                                <span class="label-text">"Confirm password"</span>
                            </label>
                            <input
                                id="confirm"
                                type="password"
                                autocomplete="new-password"
                                on:input=move |ev| set_confirm.set(event_target_value(&ev))
                                prop:value=confirm
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Creating..." }.into_any()
                                } else {
                                    "Register".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "Already registered? "
                            <a href="/login" class="link link-primary" on:click=go_login>
                                "Sign in"
                            </a>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
