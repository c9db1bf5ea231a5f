//! Protected Route Component
//!
//! Renders its children only when the session holds the route's role.

use leptos::prelude::*;
use tracing::debug;

use crate::context::use_app_context;
use crate::router::{guard, GuardDecision, Route};
use crate::store::AppStateStoreFields;

#[component]
pub fn ProtectedRoute(route: Route, children: ChildrenFn) -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;
    let decision = Memo::new(move |_| store.session().with(|session| guard(session, route)));

    Effect::new(move |_| {
        if let GuardDecision::Redirect(target) = decision.get() {
            debug!(from = route.path(), to = target.path(), "guard redirect");
            ctx.navigate(target);
        }
    });

    move || match decision.get() {
        GuardDecision::Loading => view! { <div class="route-loading">"Loading..."</div> }.into_any(),
        GuardDecision::Redirect(_) => ().into_any(),
        GuardDecision::Render => children().into_any(),
    }
}
