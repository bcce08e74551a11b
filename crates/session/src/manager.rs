//! Session manager

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, instrument, warn};

use till_client::{ClientError, TillClient};
use till_core::{Balance, Notifier, Session, SubscriptionTier, TokenStore, UserProfile};

use crate::state::{AuthPhase, SessionState};

/// Single authority for authentication state.
///
/// Cheap to clone; every clone shares the same state. The interior lock is
/// held only across non-await sections, so overlapping operations are not
/// serialized against each other: the last response to resolve wins.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: TillClient,
    store: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<SessionState>,
    initialized: AtomicBool,
    balance_fetch_in_flight: AtomicBool,
}

impl SessionManager {
    /// Create a manager with no session.
    ///
    /// Call [`initialize`](Self::initialize) afterwards to pick up a token
    /// persisted by a previous run.
    pub fn new(
        client: TillClient,
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                client,
                store,
                notifier,
                state: RwLock::new(SessionState::new()),
                initialized: AtomicBool::new(false),
                balance_fetch_in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Load the persisted token and resolve the profile it belongs to.
    ///
    /// Performs at most one profile fetch. A token whose profile cannot be
    /// resolved is cleared; `is_initialized` is true afterwards in every
    /// path.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        match self.inner.store.load().await {
            Ok(Some(token)) => {
                self.write_state().adopt_token(token);
                if let Err(err) = self.fetch_user_info().await {
                    debug!(error = %err, "persisted token did not resolve, clearing it");
                    self.teardown().await;
                }
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to load persisted token"),
        }
        self.inner.initialized.store(true, Ordering::SeqCst);
    }

    /// Sign in with credentials.
    ///
    /// On success the token is persisted and adopted, the profile stored
    /// wholesale, and a background balance fetch is scheduled; its outcome is
    /// ignored. On failure the backend's message goes to the notifier and
    /// prior state is left untouched. Returns whether the login succeeded.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> bool {
        match self.inner.client.login(username, password).await {
            Ok(auth) => {
                self.adopt_session(auth.token, auth.user).await;
                self.inner
                    .notifier
                    .success(&format!("Welcome back, {username}"));

                let manager = self.clone();
                tokio::spawn(async move {
                    let _ = manager.fetch_balance().await;
                });
                true
            }
            Err(err) => {
                debug!(error = %err, "login failed");
                self.inner.notifier.error(&surface_message(&err));
                false
            }
        }
    }

    /// Create an account and sign it in.
    ///
    /// Same contract as [`login`](Self::login), except no balance fetch is
    /// scheduled - a new account has nothing to show yet.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, email: &str, password: &str) -> bool {
        match self.inner.client.register(username, email, password).await {
            Ok(auth) => {
                self.adopt_session(auth.token, auth.user).await;
                self.inner
                    .notifier
                    .success(&format!("Account created. Welcome, {username}"));
                true
            }
            Err(err) => {
                debug!(error = %err, "registration failed");
                self.inner.notifier.error(&surface_message(&err));
                false
            }
        }
    }

    /// Sign out.
    ///
    /// The server-side teardown is best-effort; local state is cleared no
    /// matter what, so logout always succeeds from the caller's view.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(token) = self.current_token() {
            if let Err(err) = self.inner.client.with_token(token).logout().await {
                debug!(error = %err, "server logout failed, clearing locally anyway");
            }
        }
        self.teardown().await;
        self.inner.notifier.info("Signed out");
    }

    /// Fetch the profile for the current token and adopt it wholesale.
    ///
    /// Requires a token. A 401 tears the session down before the error is
    /// returned - an authenticated read is never pure.
    #[instrument(skip(self))]
    pub async fn fetch_user_info(&self) -> Result<UserProfile, ClientError> {
        let Some(token) = self.current_token() else {
            return Err(ClientError::AuthenticationFailed(
                "no session token".to_string(),
            ));
        };

        match self.inner.client.with_token(token).user_info().await {
            Ok(user) => {
                self.write_state().resolve_user(user.clone());
                Ok(user)
            }
            Err(err) => {
                self.note_auth_failure(&err).await;
                Err(err)
            }
        }
    }

    /// Fetch the current balance.
    ///
    /// Returns `Ok(None)` without touching the network when the session is
    /// not authenticated, and `Ok(None)` when the backend has no balance on
    /// record (404); previous state stays intact in both cases. A response
    /// that lands after the session was torn down is discarded. The
    /// in-flight flag is observable while the request runs but does not
    /// serialize overlapping fetches.
    #[instrument(skip(self))]
    pub async fn fetch_balance(&self) -> Result<Option<Balance>, ClientError> {
        let token = {
            let state = self.read_state();
            if !state.is_authenticated() {
                return Ok(None);
            }
            state.token().map(str::to_owned)
        };
        let Some(token) = token else {
            return Ok(None);
        };

        self.inner
            .balance_fetch_in_flight
            .store(true, Ordering::SeqCst);
        let result = self.inner.client.with_token(token).balance().await;
        self.inner
            .balance_fetch_in_flight
            .store(false, Ordering::SeqCst);

        match result {
            Ok(balance) => {
                let mut state = self.write_state();
                if !state.is_authenticated() {
                    debug!("discarding balance that resolved after sign-out");
                    return Ok(None);
                }
                state.update_balance(balance.clone(), Utc::now());
                Ok(Some(balance))
            }
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(err) => {
                self.note_auth_failure(&err).await;
                Err(err)
            }
        }
    }

    /// Rotate the token.
    ///
    /// Best-effort: every failure is swallowed and reported as "no new
    /// token". A 401 still tears the session down on the way out.
    #[instrument(skip(self))]
    pub async fn refresh_token(&self) -> Option<String> {
        let token = self.current_token()?;

        match self.inner.client.with_token(token).refresh().await {
            Ok(response) => {
                self.write_state().rotate_token(response.token.clone());
                if let Err(err) = self.inner.store.save(&response.token).await {
                    warn!(error = %err, "failed to persist rotated token");
                }
                Some(response.token)
            }
            Err(err) => {
                debug!(error = %err, "token refresh failed");
                self.note_auth_failure(&err).await;
                None
            }
        }
    }

    /// Bearer header value, `None` when unauthenticated
    pub fn auth_header(&self) -> Option<String> {
        self.auth_token().map(|token| format!("Bearer {token}"))
    }

    /// Raw token, `None` when unauthenticated
    pub fn auth_token(&self) -> Option<String> {
        let state = self.read_state();
        if state.is_authenticated() {
            state.token().map(str::to_owned)
        } else {
            None
        }
    }

    /// Cloned snapshot of the session state
    pub fn session(&self) -> Session {
        self.read_state().snapshot()
    }

    /// Current authentication phase
    pub fn phase(&self) -> AuthPhase {
        self.read_state().phase()
    }

    /// Whether a token and a resolved profile are both present
    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_authenticated()
    }

    /// Whether startup token resolution has finished (either way)
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    /// Subscription tier of the signed-in account
    pub fn user_tier(&self) -> Option<SubscriptionTier> {
        self.read_state().user_tier()
    }

    /// Whether a balance fetch is currently in flight
    pub fn balance_fetch_in_flight(&self) -> bool {
        self.inner.balance_fetch_in_flight.load(Ordering::SeqCst)
    }

    /// Store the token durably and adopt it together with its profile
    async fn adopt_session(&self, token: String, user: UserProfile) {
        self.write_state().sign_in(token.clone(), user);
        if let Err(err) = self.inner.store.save(&token).await {
            warn!(error = %err, "failed to persist token");
        }
    }

    /// A 401 on an authenticated call means the token is dead: clear
    /// everything, including the persisted copy.
    async fn note_auth_failure(&self, err: &ClientError) {
        if err.is_auth_failure() {
            debug!("authentication lost, tearing down session");
            self.teardown().await;
        }
    }

    async fn teardown(&self) {
        self.write_state().clear();
        if let Err(err) = self.inner.store.clear().await {
            warn!(error = %err, "failed to clear persisted token");
        }
    }

    /// Token regardless of phase; resolution and logout need it while the
    /// session is not (or no longer) fully authenticated
    fn current_token(&self) -> Option<String> {
        self.read_state().token().map(str::to_owned)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner
            .state
            .read()
            .expect("session state lock poisoned")
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner
            .state
            .write()
            .expect("session state lock poisoned")
    }
}

/// Backend-provided message when the error carries one, transport error
/// text otherwise
fn surface_message(err: &ClientError) -> String {
    match err {
        ClientError::AuthenticationFailed(message)
        | ClientError::NotFound(message)
        | ClientError::ServerError { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
