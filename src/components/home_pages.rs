//! Landing and role home pages

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::router::Route;
use crate::store::AppStateStoreFields;

/// Link that switches route without a page load
#[component]
fn RouteLink(route: Route, label: &'static str) -> impl IntoView {
    let ctx = use_app_context();
    view! {
        <a
            class="route-link"
            href=route.path()
            on:click=move |ev: web_sys::MouseEvent| {
                ev.prevent_default();
                ctx.navigate(route);
            }
        >
            {label}
        </a>
    }
}

#[component]
pub fn Landing() -> impl IntoView {
    let store = use_app_context().store;
    let home = move || store.session().with(|session| session.role().map(Route::home_for));

    view! {
        <section class="landing">
            <h1>"Household help, sorted."</h1>
            <p>"Find trusted helpers for cooking, cleaning and childcare, or offer your skills."</p>
            {move || match home() {
                Some(route) => view! { <RouteLink route=route label="Go to dashboard" /> }.into_any(),
                None => view! {
                    <RouteLink route=Route::Register label="Get started" />
                    <RouteLink route=Route::Login label="Log in" />
                }
                .into_any(),
            }}
        </section>
    }
}

fn greeting(name: Option<String>) -> String {
    match name {
        Some(name) => format!("Welcome, {}!", name),
        None => "Welcome!".to_string(),
    }
}

#[component]
pub fn HelperHome() -> impl IntoView {
    let store = use_app_context().store;
    let name = move || {
        store
            .session()
            .with(|session| session.identity.as_ref().and_then(|id| id.full_name.clone()))
    };

    view! {
        <section class="home helper-home">
            <h1>{move || greeting(name())}</h1>
            <p>"Track the jobs you have been hired for and keep their status current."</p>
            <RouteLink route=Route::HelperTasks label="My Tasks" />
        </section>
    }
}

#[component]
pub fn SeekerHome() -> impl IntoView {
    let store = use_app_context().store;
    let name = move || {
        store
            .session()
            .with(|session| session.identity.as_ref().and_then(|id| id.full_name.clone()))
    };

    view! {
        <section class="home seeker-home">
            <h1>{move || greeting(name())}</h1>
            <p>"Post jobs and follow up with the helpers you hire."</p>
        </section>
    }
}
