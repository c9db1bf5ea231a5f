//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::router::Route;
use crate::session::{Session, SessionEvent};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Store)]
pub struct AppState {
    /// Published copy of the session manager's state
    pub session: Session,
    /// Currently displayed route
    pub route: Route,
}

impl AppState {
    pub fn new(route: Route) -> Self {
        Self {
            session: Session::pending(),
            route,
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

// ========================
// Store Helper Functions
// ========================

/// Session a listener should publish for an event
pub fn published_session(event: &SessionEvent) -> Session {
    match event {
        SessionEvent::Restored(session) | SessionEvent::LoggedIn(session) | SessionEvent::Updated(session) => {
            session.clone()
        }
        SessionEvent::LoggedOut => Session::anonymous(),
    }
}

/// Mirror a session event into the store
pub fn store_publish_session(store: &AppStore, event: &SessionEvent) {
    *store.session().write() = published_session(event);
}
