//! Application Context
//!
//! Shared handles provided via Leptos Context API. The session manager is
//! not `Send`, so it lives in thread-local storage behind a `StoredValue`.

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use crate::api::HttpApi;
use crate::auth::LoginGrant;
use crate::config::AppConfig;
use crate::error::SessionError;
use crate::models::Profile;
use crate::router::{follow_session, HistoryNavigator, Navigator, Route};
use crate::session::{BrowserTokenStore, Session, SessionManager};
use crate::store::{store_publish_session, AppStateStoreFields, AppStore};

type Sessions = SessionManager<BrowserTokenStore>;

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    pub store: AppStore,
    config: StoredValue<AppConfig>,
    sessions: StoredValue<Sessions, LocalStorage>,
    navigator: HistoryNavigator,
}

impl AppContext {
    pub fn new(store: AppStore, config: AppConfig) -> Self {
        let sessions = SessionManager::new(BrowserTokenStore::new(), config.session.clone());
        // Publish first so the new route renders against the new session
        sessions.subscribe(move |event| store_publish_session(&store, event));
        let navigator = HistoryNavigator::new(store);
        follow_session(&sessions, navigator);

        Self {
            store,
            config: StoredValue::new(config),
            sessions: StoredValue::new_local(sessions),
            navigator,
        }
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    /// Backend client carrying the current session's token
    pub fn api(&self) -> HttpApi {
        let token = self
            .store
            .session()
            .with_untracked(|session| session.token().map(str::to_string));
        let base_url = self.config.with_value(|config| config.api_base_url.clone());
        HttpApi::new(base_url).with_token(token.as_deref())
    }

    /// Restore the persisted session; later calls are no-ops
    pub fn initialize_session(&self) -> Session {
        self.sessions.with_value(|sessions| sessions.initialize())
    }

    pub fn login(&self, grant: &LoginGrant) -> Result<Session, SessionError> {
        self.sessions.with_value(|sessions| sessions.login(&grant.token, &grant.role))
    }

    pub fn logout(&self) {
        self.sessions.with_value(|sessions| {
            sessions.logout();
        });
    }

    pub fn apply_profile(&self, profile: &Profile) {
        self.sessions.with_value(|sessions| {
            sessions.apply_profile(profile);
        });
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
