//! Auth Page Component
//!
//! Login and registration tabs. A successful login hands the token to the
//! session manager, which triggers navigation to the role's home.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::error;

use crate::auth::{request_login, request_registration};
use crate::context::use_app_context;
use crate::error::AuthError;
use crate::models::{Credentials, Registration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    Login,
    Register,
}

/// Message under the tabs
#[derive(Debug, Clone, PartialEq)]
enum Notice {
    Error(String),
    Info(&'static str),
}

fn blank_form() -> Registration {
    Registration {
        role: "Seeker".to_string(),
        ..Default::default()
    }
}

type FieldSetter = fn(&mut Registration, String);

/// Input handler writing one form field; editing clears the message
fn bind_field(
    form: RwSignal<Registration>,
    set_notice: WriteSignal<Option<Notice>>,
    apply: FieldSetter,
) -> impl Fn(web_sys::Event) + Copy + Send + Sync + 'static {
    move |ev: web_sys::Event| {
        let value = event_target_value(&ev);
        form.update(|form| apply(form, value));
        set_notice.set(None);
    }
}

#[component]
pub fn AuthPage(tab: AuthTab) -> impl IntoView {
    let ctx = use_app_context();
    let (tab, set_tab) = signal(tab);
    let form = RwSignal::new(blank_form());
    let (notice, set_notice) = signal(None::<Notice>);
    let (loading, set_loading) = signal(false);

    let field = move |apply: FieldSetter| bind_field(form, set_notice, apply);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let current = form.get_untracked();
        let active = tab.get_untracked();
        set_loading.set(true);

        spawn_local(async move {
            let api = ctx.api();
            match active {
                AuthTab::Login => {
                    let credentials = Credentials { email: current.email, password: current.password };
                    let result = match request_login(&api, &credentials).await {
                        Ok(grant) => ctx.login(&grant).map_err(AuthError::from),
                        Err(err) => Err(err),
                    };
                    match result {
                        Ok(_) => set_notice.set(None),
                        Err(err) => {
                            error!(error = %err, "login failed");
                            set_notice.set(Some(Notice::Error(err.to_string())));
                        }
                    }
                }
                AuthTab::Register => match request_registration(&api, &current).await {
                    Ok(()) => {
                        form.set(blank_form());
                        set_tab.set(AuthTab::Login);
                        set_notice.set(Some(Notice::Info("Registration successful! Please log in.")));
                    }
                    Err(err) => {
                        error!(error = %err, "registration failed");
                        set_notice.set(Some(Notice::Error(err.to_string())));
                    }
                },
            }
            set_loading.set(false);
        });
    };

    let tab_class = move |which: AuthTab| {
        move || if tab.get() == which { "auth-tab active" } else { "auth-tab" }
    };
    let is_register = move || tab.get() == AuthTab::Register;
    let is_helper = move || form.with(|form| form.role.eq_ignore_ascii_case("helper"));

    view! {
        <section class="auth-page">
            <h1>{move || if is_register() { "Join HousePal" } else { "Welcome Back!" }}</h1>
            <div class="auth-tabs">
                <button
                    class=tab_class(AuthTab::Login)
                    disabled=move || loading.get()
                    on:click=move |_| { set_tab.set(AuthTab::Login); set_notice.set(None); }
                >
                    "Login"
                </button>
                <button
                    class=tab_class(AuthTab::Register)
                    disabled=move || loading.get()
                    on:click=move |_| { set_tab.set(AuthTab::Register); set_notice.set(None); }
                >
                    "Register"
                </button>
            </div>

            {move || notice.get().map(|notice| match notice {
                Notice::Error(msg) => view! { <p class="auth-error">{msg}</p> }.into_any(),
                Notice::Info(msg) => view! { <p class="auth-info">{msg}</p> }.into_any(),
            })}

            <form class="auth-form" on:submit=on_submit>
                <Show when=is_register>
                    <input
                        type="text"
                        placeholder="Full Name"
                        prop:value=move || form.with(|form| form.full_name.clone())
                        on:input=field(|form: &mut Registration, value: String| form.full_name = value)
                    />
                </Show>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || form.with(|form| form.email.clone())
                    on:input=field(|form: &mut Registration, value: String| form.email = value)
                />
                <Show when=is_register>
                    <input
                        type="tel"
                        placeholder="Contact Number"
                        prop:value=move || form.with(|form| form.contact_no.clone())
                        on:input=field(|form: &mut Registration, value: String| form.contact_no = value)
                    />
                </Show>
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || form.with(|form| form.password.clone())
                    on:input=field(|form: &mut Registration, value: String| form.password = value)
                />
                <Show when=is_register>
                    <input
                        type="password"
                        placeholder="Confirm Password"
                        prop:value=move || form.with(|form| form.confirm_password.clone())
                        on:input=field(|form: &mut Registration, value: String| form.confirm_password = value)
                    />
                    <select
                        prop:value=move || form.with(|form| form.role.clone())
                        on:change=field(|form: &mut Registration, value: String| form.role = value)
                    >
                        <option value="Seeker">"Seeker"</option>
                        <option value="Helper">"Helper"</option>
                    </select>
                    <Show when=is_helper>
                        <input
                            type="text"
                            placeholder="Skills (e.g., cooking, cleaning)"
                            prop:value=move || form.with(|form| form.skills.clone())
                            on:input=field(|form: &mut Registration, value: String| form.skills = value)
                        />
                        <input
                            type="text"
                            placeholder="Experience"
                            prop:value=move || form.with(|form| form.experience.clone())
                            on:input=field(|form: &mut Registration, value: String| form.experience = value)
                        />
                    </Show>
                </Show>
                <button type="submit" class="auth-submit" disabled=move || loading.get()>
                    {move || match (loading.get(), tab.get()) {
                        (true, _) => "Please wait...",
                        (false, AuthTab::Login) => "Login",
                        (false, AuthTab::Register) => "Register",
                    }}
                </button>
            </form>
        </section>
    }
}
