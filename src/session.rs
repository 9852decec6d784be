//! Authentication state machine.
//!
//! A [`SessionManager`] is either *unauthenticated* or *authenticated*. It is
//! authenticated exactly when it holds a decodable, non-expired token that is
//! still the one in storage; the [`Session`] it exposes is always rebuilt from
//! that token.
//!
//! ```text
//!                  initialize / login ok
//!   unauthenticated ──────────────────────▶ authenticated
//!          ▲                                      │
//!          └──────────────────────────────────────┘
//!            logout, expiry, 401 (token removed)
//! ```
//!
//! A 401 seen by the [`ApiClient`] takes effect on the very next accessor
//! call, synchronous ones included:
//!
//! ```text
//!   login ─▶ hold(epoch n) ─▶ 401 bumps epoch to n+1 ─▶ state() == Unauthenticated
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::{AuthFailure, Error};
use crate::hooks::{Notifier, TracingNotifier};
use crate::storage::TOKEN_KEY;
use crate::token::Session;

/// Login rejected with a 400.
pub const INVALID_CREDENTIALS: &str = "Email ou mot de passe incorrect";
/// Any login failure without a more specific message.
pub const CONNECTION_ERROR: &str = "Erreur de connexion";
/// Password change failure without a backend detail.
pub const PASSWORD_CHANGE_ERROR: &str = "Erreur lors du changement de mot de passe";

const LOGIN_SUCCEEDED: &str = "Connexion réussie !";
const PASSWORD_CHANGED: &str = "Mot de passe modifié avec succès";
const LOGGED_OUT: &str = "Déconnexion réussie";

/// The two durable states of a [`SessionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone)]
struct Held {
    token: String,
    session: Session,
    /// Client invalidation epoch when the token was taken on.
    epoch: u64,
}

/// Owns the current [`Session`] and mediates login, logout and password
/// changes.
///
/// Consumers hold it by reference (typically behind an `Arc`) instead of
/// reading ambient globals. Operations never panic or return transport
/// errors: failures come back as an [`AuthFailure`] carrying the message to
/// show the user, and token problems silently downgrade to
/// [`AuthState::Unauthenticated`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use signage_console_client::{ApiClient, ApiConfig, MemoryStorage, SessionManager};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(ApiConfig::from_env()?, Arc::new(MemoryStorage::new()))?;
/// let sessions = SessionManager::new(client);
///
/// sessions.initialize().await;
/// if !sessions.is_authenticated() {
///     if let Err(failure) = sessions.login("admin@example.com", "secret").await {
///         eprintln!("{failure}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionManager {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    held: RwLock<Option<Held>>,
    loading: AtomicBool,
}

impl SessionManager {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            notifier: Arc::new(TracingNotifier),
            held: RwLock::new(None),
            loading: AtomicBool::new(true),
        }
    }

    /// Replaces the sink for user notifications.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// True from construction until the first [`initialize`](Self::initialize) completes.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Restores the session persisted by a previous run.
    ///
    /// A missing, undecodable or expired token leaves the manager
    /// unauthenticated; the latter two are also removed from storage. This
    /// never fails and always clears the loading flag.
    pub async fn initialize(&self) -> AuthState {
        let stored = match self.client.storage().get(TOKEN_KEY).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(%err, "cannot read persisted token, starting unauthenticated");
                None
            }
        };

        let state = match stored {
            None => {
                self.clear();
                AuthState::Unauthenticated
            }
            Some(token) => match Session::from_token(&token) {
                Ok(session) => {
                    info!(email = %session.email, role = ?session.role, "restored session");
                    self.hold(token, session);
                    AuthState::Authenticated
                }
                Err(err) => {
                    warn!(%err, "discarding persisted token");
                    self.discard_token().await;
                    self.clear();
                    AuthState::Unauthenticated
                }
            },
        };

        self.loading.store(false, Ordering::SeqCst);
        state
    }

    /// Exchanges credentials for a token, persists it and becomes authenticated.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthFailure> {
        match self.try_login(email, password).await {
            Ok(session) => {
                self.notifier.success(LOGIN_SUCCEEDED);
                Ok(session)
            }
            Err(failure) => {
                self.notifier.error(&failure.message);
                Err(failure)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<Session, AuthFailure> {
        debug!(%email, "logging in");

        let response = self
            .client
            .authenticate(email, password)
            .await
            .map_err(|err| {
                warn!(%err, %email, "login failed");
                login_failure(&err)
            })?;

        let token = response.access_token;
        let session = Session::from_token(&token).map_err(|err| {
            warn!(%err, "backend issued an unusable token");
            AuthFailure::new(CONNECTION_ERROR)
        })?;

        self.client
            .storage()
            .set(TOKEN_KEY, &token)
            .await
            .map_err(|err| {
                warn!(%err, "cannot persist token");
                AuthFailure::new(CONNECTION_ERROR)
            })?;

        info!(email = %session.email, role = ?session.role, "logged in");
        self.hold(token, session.clone());
        Ok(session)
    }

    /// Changes the current user's password. The session is left untouched.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthFailure> {
        match self
            .client
            .change_password(current_password, new_password)
            .await
        {
            Ok(_) => {
                self.notifier.success(PASSWORD_CHANGED);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "password change failed");
                let failure = AuthFailure::new(err.detail().unwrap_or(PASSWORD_CHANGE_ERROR));
                self.notifier.error(&failure.message);
                Err(failure)
            }
        }
    }

    /// Removes the persisted token and forgets the session. Safe to repeat.
    pub async fn logout(&self) {
        self.discard_token().await;
        self.clear();
        info!("logged out");
        self.notifier.success(LOGGED_OUT);
    }

    /// Read-through view of the session.
    ///
    /// Re-validates the held session against storage: a token removed behind
    /// the manager's back (for instance by a 401) or an expired one downgrades
    /// to unauthenticated, a token replaced in storage is decoded afresh.
    pub async fn current(&self) -> Option<Session> {
        let held = self.live()?;

        let stored = match self.client.storage().get(TOKEN_KEY).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(%err, "cannot read persisted token, keeping held session");
                Some(held.token.clone())
            }
        };

        match stored {
            None => {
                debug!("persisted token is gone, dropping session");
                self.clear();
                None
            }
            Some(token) if token == held.token => {
                if held.session.is_expired() {
                    info!(email = %held.session.email, "session expired");
                    self.discard_token().await;
                    self.clear();
                    return None;
                }
                Some(held.session)
            }
            Some(token) => match Session::from_token(&token) {
                Ok(session) => {
                    self.hold(token, session.clone());
                    Some(session)
                }
                Err(err) => {
                    warn!(%err, "discarding persisted token");
                    self.discard_token().await;
                    self.clear();
                    None
                }
            },
        }
    }

    /// Last known session, hiding it once expired or rejected by the
    /// backend. Does not touch storage.
    pub fn session(&self) -> Option<Session> {
        self.live()
            .map(|held| held.session)
            .filter(|session| !session.is_expired())
    }

    pub fn state(&self) -> AuthState {
        if self.session().is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.session().is_some_and(|s| s.is_admin())
    }

    pub fn is_super_admin(&self) -> bool {
        self.session().is_some_and(|s| s.is_super_admin())
    }

    fn hold(&self, token: String, session: Session) {
        let epoch = self.client.invalidation_epoch();
        *self.held.write() = Some(Held {
            token,
            session,
            epoch,
        });
    }

    /// The held token and session, unless a 401 arrived since they were taken on.
    fn live(&self) -> Option<Held> {
        let epoch = self.client.invalidation_epoch();
        let held = self.held.read().clone()?;
        if held.epoch >= epoch {
            return Some(held);
        }

        debug!("credentials rejected since the session was held, dropping it");
        let mut guard = self.held.write();
        if guard.as_ref().is_some_and(|h| h.epoch < epoch) {
            guard.take();
        }
        None
    }

    fn clear(&self) {
        self.held.write().take();
    }

    async fn discard_token(&self) {
        if let Err(err) = self.client.storage().remove(TOKEN_KEY).await {
            warn!(%err, "failed to remove persisted token");
        }
    }
}

/// Layered message selection: a 400 means bad credentials, then any backend
/// detail, then the generic connection error.
fn login_failure(err: &Error) -> AuthFailure {
    let message = if err.status() == Some(StatusCode::BAD_REQUEST) {
        INVALID_CREDENTIALS
    } else if let Some(detail) = err.detail() {
        detail
    } else {
        CONNECTION_ERROR
    };
    AuthFailure::new(message)
}
