//! HousePal Frontend App
//!
//! Application shell: provides the store and context, restores the session
//! and switches pages on the current route.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::components::{AuthPage, AuthTab, HelperHome, HelperTasks, Landing, NavBar, ProtectedRoute, SeekerHome};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::router::{HistoryNavigator, Route};
use crate::store::{AppState, AppStateStoreFields};

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_env();
    tracing::info!(api = %config.api_base_url, "starting");

    let store = Store::new(AppState::new(HistoryNavigator::current()));
    let ctx = AppContext::new(store, config);
    provide_context(ctx);

    let navigator = HistoryNavigator::new(store);
    navigator.normalize_location();
    navigator.bind_popstate();

    // Restore the persisted session once mounted
    Effect::new(move |_| {
        ctx.initialize_session();
    });

    let page = move || match store.route().get() {
        Route::Landing => view! { <Landing /> }.into_any(),
        Route::Login => view! { <AuthPage tab=AuthTab::Login /> }.into_any(),
        Route::Register => view! { <AuthPage tab=AuthTab::Register /> }.into_any(),
        Route::HelperHome => view! {
            <ProtectedRoute route=Route::HelperHome><HelperHome /></ProtectedRoute>
        }
        .into_any(),
        Route::HelperTasks => view! {
            <ProtectedRoute route=Route::HelperTasks><HelperTasks /></ProtectedRoute>
        }
        .into_any(),
        Route::SeekerHome => view! {
            <ProtectedRoute route=Route::SeekerHome><SeekerHome /></ProtectedRoute>
        }
        .into_any(),
    };

    view! {
        <div class="app-layout">
            <NavBar />
            <main class="main-content">{page}</main>
        </div>
    }
}
