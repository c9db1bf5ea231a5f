//! Client-side Routing
//!
//! A closed set of routes, guard decisions and session-driven navigation.
//! The browser history is only touched by [`HistoryNavigator`].

use leptos::prelude::*;
use tracing::debug;
use wasm_bindgen::JsCast;

use crate::session::{Authorization, Session, SessionEvent, SessionManager, TokenStore};
use crate::store::{AppStore, AppStateStoreFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Register,
    HelperHome,
    HelperTasks,
    SeekerHome,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Landing,
        Route::Login,
        Route::Register,
        Route::HelperHome,
        Route::HelperTasks,
        Route::SeekerHome,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::HelperHome => "/helper",
            Route::HelperTasks => "/helper/tasks",
            Route::SeekerHome => "/seeker",
        }
    }

    /// Exact match, ignoring query, fragment and a trailing slash
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Unknown paths land on `/`
    pub fn resolve(path: &str) -> Route {
        Route::parse(path).unwrap_or(Route::Landing)
    }

    /// Role a session must hold to render this route; `None` is public
    pub fn required_role(self) -> Option<&'static str> {
        match self {
            Route::HelperHome | Route::HelperTasks => Some("helper"),
            Route::SeekerHome => Some("seeker"),
            Route::Landing | Route::Login | Route::Register => None,
        }
    }

    /// Post-login destination for a role
    pub fn home_for(role: &str) -> Route {
        if role.eq_ignore_ascii_case("helper") {
            Route::HelperHome
        } else {
            Route::SeekerHome
        }
    }
}

/// What a route guard renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Loading,
    Redirect(Route),
    Render,
}

impl Authorization {
    pub fn decision(self) -> GuardDecision {
        match self {
            Authorization::Pending => GuardDecision::Loading,
            Authorization::DeniedUnauthenticated => GuardDecision::Redirect(Route::Login),
            Authorization::DeniedWrongRole => GuardDecision::Redirect(Route::Landing),
            Authorization::Granted => GuardDecision::Render,
        }
    }
}

/// Guard for a route; public routes always render
pub fn guard(session: &Session, route: Route) -> GuardDecision {
    match route.required_role() {
        None => GuardDecision::Render,
        Some(role) => session.authorize(Some(role)).decision(),
    }
}

/// Where a session event sends the user, if anywhere
pub fn destination(event: &SessionEvent) -> Option<Route> {
    match event {
        SessionEvent::LoggedIn(session) => session.role().map(Route::home_for),
        SessionEvent::LoggedOut => Some(Route::Login),
        SessionEvent::Restored(_) | SessionEvent::Updated(_) => None,
    }
}

const HELPER_NAV: &[(&str, Route)] = &[("Home", Route::HelperHome), ("My Tasks", Route::HelperTasks)];
const SEEKER_NAV: &[(&str, Route)] = &[("Home", Route::SeekerHome)];
const PUBLIC_NAV: &[(&str, Route)] = &[("Home", Route::Landing)];

/// Navigation bar entries for a role
pub fn nav_items(role: Option<&str>) -> &'static [(&'static str, Route)] {
    match role {
        Some(role) if role.eq_ignore_ascii_case("helper") => HELPER_NAV,
        Some(_) => SEEKER_NAV,
        None => PUBLIC_NAV,
    }
}

pub trait Navigator {
    fn navigate(&self, route: Route);
}

/// Navigate after login and logout
pub fn follow_session<S: TokenStore, N: Navigator + 'static>(manager: &SessionManager<S>, navigator: N) {
    manager.subscribe(move |event| {
        if let Some(route) = destination(event) {
            navigator.navigate(route);
        }
    });
}

/// Navigates with `history.pushState` and mirrors the route into the store
#[derive(Clone, Copy)]
pub struct HistoryNavigator {
    store: AppStore,
}

impl HistoryNavigator {
    pub fn new(store: AppStore) -> Self {
        Self { store }
    }

    /// Route for the address bar as loaded
    pub fn current() -> Route {
        let path = web_sys::window()
            .and_then(|win| win.location().pathname().ok())
            .unwrap_or_else(|| "/".to_string());
        Route::resolve(&path)
    }

    /// Rewrite an unknown address to `/` without adding a history entry
    pub fn normalize_location(self) {
        let Some(win) = web_sys::window() else { return };
        let path = win.location().pathname().unwrap_or_default();
        if Route::parse(&path).is_some() {
            return;
        }
        debug!(path, "unknown path, redirecting to landing");
        if let Ok(history) = win.history() {
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(Route::Landing.path()));
        }
        *self.store.route().write() = Route::Landing;
    }

    /// Follow back/forward buttons
    pub fn bind_popstate(self) {
        use wasm_bindgen::closure::Closure;

        let store = self.store;
        let on_popstate = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            let route = HistoryNavigator::current();
            debug!(path = route.path(), "popstate");
            *store.route().write() = route;
        });

        if let Some(win) = web_sys::window() {
            let _ = win.add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref());
        }
        on_popstate.forget();
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: Route) {
        if self.store.route().get_untracked() == route {
            return;
        }
        debug!(path = route.path(), "navigate");
        if let Some(history) = web_sys::window().and_then(|win| win.history().ok()) {
            if let Err(err) = history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(route.path())) {
                tracing::warn!(error = ?err, "pushState failed");
            }
        }
        *self.store.route().write() = route;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use crate::session::{test_token, Identity, MemoryTokenStore, SessionConfig};

    #[derive(Clone, Default)]
    struct RecordingNavigator(Rc<RefCell<Vec<Route>>>);

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.0.borrow_mut().push(route);
        }
    }

    fn session(role: &str) -> Session {
        Session {
            identity: Some(Identity {
                token: "t".to_string(),
                email: Some("a@x.com".to_string()),
                role: role.to_string(),
                id: None,
                full_name: None,
                image: None,
                expires_at: None,
            }),
            is_loading: false,
        }
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Landing));
        assert_eq!(Route::parse(""), Some(Route::Landing));
        assert_eq!(Route::parse("/helper/tasks/"), Some(Route::HelperTasks));
        assert_eq!(Route::parse("/login?next=/helper"), Some(Route::Login));
        assert_eq!(Route::parse("/Helper"), None);
        assert_eq!(Route::resolve("/admin"), Route::Landing);
        for route in Route::ALL {
            assert_eq!(Route::parse(route.path()), Some(route));
        }
    }

    #[test]
    fn test_home_for_role() {
        assert_eq!(Route::home_for("Helper"), Route::HelperHome);
        assert_eq!(Route::home_for("seeker"), Route::SeekerHome);
        assert_eq!(Route::home_for("admin"), Route::SeekerHome);
    }

    #[test]
    fn test_guard_decisions() {
        assert_eq!(guard(&Session::pending(), Route::HelperTasks), GuardDecision::Loading);
        assert_eq!(guard(&Session::pending(), Route::Login), GuardDecision::Render);
        assert_eq!(
            guard(&Session::anonymous(), Route::HelperHome),
            GuardDecision::Redirect(Route::Login)
        );
        assert_eq!(
            guard(&session("Seeker"), Route::HelperTasks),
            GuardDecision::Redirect(Route::Landing)
        );
        assert_eq!(guard(&session("Helper"), Route::HelperTasks), GuardDecision::Render);
        assert_eq!(guard(&session("SEEKER"), Route::SeekerHome), GuardDecision::Render);
    }

    #[test]
    fn test_destination_for_events() {
        assert_eq!(
            destination(&SessionEvent::LoggedIn(session("Helper"))),
            Some(Route::HelperHome)
        );
        assert_eq!(
            destination(&SessionEvent::LoggedIn(session("seeker"))),
            Some(Route::SeekerHome)
        );
        assert_eq!(destination(&SessionEvent::LoggedOut), Some(Route::Login));
        assert_eq!(destination(&SessionEvent::Restored(session("helper"))), None);
    }

    #[test]
    fn test_nav_items_only_reference_guarded_routes_for_role() {
        for (_, route) in nav_items(Some("HELPER")) {
            assert_eq!(guard(&session("helper"), *route), GuardDecision::Render);
        }
        assert_eq!(nav_items(Some("seeker")), &[("Home", Route::SeekerHome)]);
        assert_eq!(nav_items(None), &[("Home", Route::Landing)]);
    }

    #[test]
    fn test_follow_session_navigates_on_login_and_logout() {
        let manager = SessionManager::new(MemoryTokenStore::default(), SessionConfig::default());
        let navigator = RecordingNavigator::default();
        follow_session(&manager, navigator.clone());

        manager.initialize();
        assert!(navigator.0.borrow().is_empty());

        let token = test_token(json!({"email": "a@x.com", "role": "Helper"}));
        manager.login(&token, "seeker").unwrap();
        manager.logout();
        assert_eq!(*navigator.0.borrow(), vec![Route::HelperHome, Route::Login]);
    }
}
