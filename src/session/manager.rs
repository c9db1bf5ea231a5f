//! Session Manager
//!
//! Owns the single current session derived from the persisted credential
//! token. Navigation is not done here: listeners subscribe to
//! [`SessionEvent`]s and react (the router sends helpers home, etc).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::guard::{authorize, Authorization};
use super::storage::TokenStore;
use super::token::{decode_claims, Claims};
use super::{MissingRolePolicy, SessionConfig};
use crate::error::{SessionError, TokenError};
use crate::models::Profile;

/// Authenticated user as seen by the client
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub token: String,
    pub email: Option<String>,
    pub role: String,
    pub id: Option<String>,
    pub full_name: Option<String>,
    pub image: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    fn from_claims(token: &str, claims: Claims, role: String) -> Self {
        let expires_at = claims.expires_at();
        Self {
            token: token.to_string(),
            email: claims.email,
            role,
            id: claims.id,
            full_name: claims.full_name,
            image: claims.image,
            expires_at,
        }
    }

    pub fn is_helper(&self) -> bool {
        self.role.eq_ignore_ascii_case("helper")
    }

    /// Name or image missing; `/auth/me` can fill them in
    pub fn needs_profile(&self) -> bool {
        self.full_name.is_none() || self.image.is_none()
    }

    pub fn initials(&self) -> String {
        initials(self.full_name.as_deref())
    }
}

/// Up to two uppercase initials, "NA" without a name
pub fn initials(full_name: Option<&str>) -> String {
    let letters: String = full_name
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if letters.is_empty() {
        "NA".to_string()
    } else {
        letters
    }
}

/// In-memory projection of the current credential
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identity: Option<Identity>,
    /// Initial decode has not finished; authorization is unknown
    pub is_loading: bool,
}

impl Session {
    pub fn pending() -> Self {
        Self { identity: None, is_loading: true }
    }

    pub fn anonymous() -> Self {
        Self { identity: None, is_loading: false }
    }

    fn authenticated(identity: Identity) -> Self {
        Self { identity: Some(identity), is_loading: false }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.is_loading && self.identity.as_ref().is_some_and(|id| !id.role.is_empty())
    }

    pub fn role(&self) -> Option<&str> {
        self.identity.as_ref().map(|id| id.role.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.identity.as_ref().and_then(|id| id.email.as_deref())
    }

    pub fn token(&self) -> Option<&str> {
        self.identity.as_ref().map(|id| id.token.as_str())
    }

    pub fn authorize(&self, required_role: Option<&str>) -> Authorization {
        authorize(self, required_role)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::pending()
    }
}

/// Emitted after every session mutation
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// `initialize` finished, authenticated or not
    Restored(Session),
    LoggedIn(Session),
    LoggedOut,
    /// Profile fields were backfilled
    Updated(Session),
}

type Listener = Rc<dyn Fn(&SessionEvent)>;

pub struct SessionManager<S: TokenStore> {
    store: S,
    config: SessionConfig,
    session: RefCell<Session>,
    initialized: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl<S: TokenStore> SessionManager<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            session: RefCell::new(Session::pending()),
            initialized: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn authorize(&self, required_role: Option<&str>) -> Authorization {
        authorize(&self.session.borrow(), required_role)
    }

    pub fn subscribe(&self, listener: impl Fn(&SessionEvent) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Restore the session from the persisted token, once
    pub fn initialize(&self) -> Session {
        if self.initialized.replace(true) {
            return self.session();
        }

        let session = match self.store.read() {
            None => {
                debug!("no persisted token");
                Session::anonymous()
            }
            Some(token) => match self.restore(&token) {
                Ok(identity) => {
                    info!(role = %identity.role, "session restored");
                    Session::authenticated(identity)
                }
                Err(err) => {
                    warn!(error = %err, "discarding persisted token");
                    self.store.clear();
                    Session::anonymous()
                }
            },
        };

        self.replace(session.clone());
        self.emit(SessionEvent::Restored(session.clone()));
        session
    }

    /// Accept a freshly issued token
    ///
    /// The claim role wins; `fallback_role` is used only when the token has
    /// none, subject to [`MissingRolePolicy`]. Nothing is persisted when the
    /// login fails.
    pub fn login(&self, token: &str, fallback_role: &str) -> Result<Session, SessionError> {
        let claims = decode_claims(token)?;
        self.check_expiry(&claims)?;

        let role = match claims.role() {
            Some(role) => role.to_string(),
            None => {
                let fallback = fallback_role.trim();
                match self.config.missing_role_policy {
                    MissingRolePolicy::Fallback if !fallback.is_empty() => {
                        warn!(fallback, "token has no role claim, using caller-supplied role");
                        fallback.to_string()
                    }
                    _ => {
                        warn!("token has no role claim, login refused");
                        return Err(SessionError::MissingRole);
                    }
                }
            }
        };

        self.store.write(token).map_err(SessionError::Storage)?;
        self.initialized.set(true);

        let session = Session::authenticated(Identity::from_claims(token, claims, role));
        info!(role = ?session.role(), "logged in");
        self.replace(session.clone());
        self.emit(SessionEvent::LoggedIn(session.clone()));
        Ok(session)
    }

    /// Forget the token; safe to call when already logged out
    pub fn logout(&self) -> Session {
        self.store.clear();
        self.initialized.set(true);

        let session = Session::anonymous();
        self.replace(session.clone());
        info!("logged out");
        self.emit(SessionEvent::LoggedOut);
        session
    }

    /// Fill in display fields from `/auth/me`; role and token never change
    pub fn apply_profile(&self, profile: &Profile) -> Option<Session> {
        let updated = {
            let mut session = self.session.borrow_mut();
            let identity = session.identity.as_mut()?;
            if let Some(email) = identity.email.as_deref() {
                if !email.eq_ignore_ascii_case(&profile.email) {
                    warn!(email, profile = %profile.email, "profile belongs to another user");
                    return None;
                }
            } else {
                identity.email = Some(profile.email.clone());
            }
            if profile.full_name.is_some() {
                identity.full_name = profile.full_name.clone();
            }
            if profile.image.is_some() {
                identity.image = profile.image.clone();
            }
            session.clone()
        };
        self.emit(SessionEvent::Updated(updated.clone()));
        Some(updated)
    }

    fn restore(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = decode_claims(token)?;
        let role = claims.role().ok_or(TokenError::MissingRole)?.to_string();
        self.check_expiry(&claims)?;
        Ok(Identity::from_claims(token, claims, role))
    }

    fn check_expiry(&self, claims: &Claims) -> Result<(), TokenError> {
        if !self.config.enforce_expiry {
            return Ok(());
        }
        match claims.expires_at() {
            Some(at) if claims.is_expired_at(Utc::now()) => Err(TokenError::Expired(at)),
            _ => Ok(()),
        }
    }

    fn replace(&self, session: Session) {
        *self.session.borrow_mut() = session;
    }

    fn emit(&self, event: SessionEvent) {
        // Listeners may call back into the manager
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&event);
        }
    }
}
