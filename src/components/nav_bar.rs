//! Navigation Bar Component
//!
//! Role-specific links, the user's avatar and logout. Fills in a missing
//! name or picture from `/auth/me` once per token.

use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;

use crate::api::AuthApi;
use crate::context::use_app_context;
use crate::router::{nav_items, Route};
use crate::store::AppStateStoreFields;

#[component]
pub fn NavBar() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    // Profile backfill, keyed by token so it runs once per login
    Effect::new(move |fetched: Option<Option<String>>| {
        let token = store.session().with(|session| {
            session
                .identity
                .as_ref()
                .filter(|identity| identity.needs_profile())
                .map(|identity| identity.token.clone())
        });
        let already = fetched.flatten();
        if let Some(token) = &token {
            if already.as_ref() != Some(token) {
                spawn_local(async move {
                    match ctx.api().me().await {
                        Ok(profile) => ctx.apply_profile(&profile),
                        Err(err) => warn!(error = %err, "profile fetch failed"),
                    }
                });
            }
        }
        token.or(already)
    });

    let links = move || {
        let role = store.session().with(|session| session.role().map(str::to_string));
        nav_items(role.as_deref())
            .iter()
            .map(|&(label, route)| {
                let link_class = move || {
                    if store.route().get() == route { "nav-link active" } else { "nav-link" }
                };
                view! {
                    <a
                        href=route.path()
                        class=link_class
                        on:click=move |ev: web_sys::MouseEvent| {
                            ev.prevent_default();
                            ctx.navigate(route);
                        }
                    >
                        {label}
                    </a>
                }
            })
            .collect_view()
    };

    let account = move || {
        let identity = store.session().with(|session| session.identity.clone());
        match identity {
            Some(identity) => {
                let avatar = match identity.image.clone() {
                    Some(src) => view! { <img class="avatar" src=src alt="Profile" /> }.into_any(),
                    None => view! { <span class="avatar initials">{identity.initials()}</span> }.into_any(),
                };
                view! {
                    <div class="nav-account">
                        {avatar}
                        <span class="nav-email">{identity.email.clone().unwrap_or_default()}</span>
                        <button class="nav-logout" on:click=move |_| ctx.logout()>"Logout"</button>
                    </div>
                }
                .into_any()
            }
            None => view! {
                <div class="nav-account">
                    <a href=Route::Login.path() on:click=move |ev: web_sys::MouseEvent| {
                        ev.prevent_default();
                        ctx.navigate(Route::Login);
                    }>"Login"</a>
                    <a href=Route::Register.path() on:click=move |ev: web_sys::MouseEvent| {
                        ev.prevent_default();
                        ctx.navigate(Route::Register);
                    }>"Register"</a>
                </div>
            }
            .into_any(),
        }
    };

    view! {
        <nav class="nav-bar">
            <span class="brand">"HousePal"</span>
            <div class="nav-links">{links}</div>
            {account}
        </nav>
    }
}
