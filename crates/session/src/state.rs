//! Explicit authentication state machine

use chrono::{DateTime, Utc};
use till_core::{Balance, Session, SubscriptionTier, UserProfile};

/// Authentication phase of the session.
///
/// `Resolving` covers the window where a token is known but the matching
/// profile has not been fetched yet (startup with a persisted token). There
/// is no distinct expired phase: expiry is an immediate transition to
/// `Anonymous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// No usable token
    Anonymous,
    /// Token present, profile not resolved yet
    Resolving,
    /// Token and profile both present
    Authenticated,
}

/// The data each phase carries. Keeping the token and profile inside the
/// variants makes "authenticated iff token and user are both present" hold
/// by construction.
#[derive(Debug)]
enum AuthState {
    Anonymous,
    Resolving { token: String },
    Authenticated { token: String, user: UserProfile },
}

/// Session state guarded by the manager's lock
#[derive(Debug)]
pub(crate) struct SessionState {
    auth: AuthState,
    balance: Option<Balance>,
    last_balance_update: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            auth: AuthState::Anonymous,
            balance: None,
            last_balance_update: None,
        }
    }

    pub fn phase(&self) -> AuthPhase {
        match self.auth {
            AuthState::Anonymous => AuthPhase::Anonymous,
            AuthState::Resolving { .. } => AuthPhase::Resolving,
            AuthState::Authenticated { .. } => AuthPhase::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match &self.auth {
            AuthState::Anonymous => None,
            AuthState::Resolving { token } | AuthState::Authenticated { token, .. } => Some(token),
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match &self.auth {
            AuthState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn user_tier(&self) -> Option<SubscriptionTier> {
        self.user().map(|user| user.tier)
    }

    /// Adopt a token whose profile is not known yet
    pub fn adopt_token(&mut self, token: String) {
        self.auth = AuthState::Resolving { token };
    }

    /// Adopt a token together with the profile it came with
    pub fn sign_in(&mut self, token: String, user: UserProfile) {
        self.auth = AuthState::Authenticated { token, user };
    }

    /// Attach a freshly fetched profile to the current token, replacing any
    /// previous profile wholesale. Without a token there is nothing to
    /// attach to and the session stays anonymous.
    pub fn resolve_user(&mut self, user: UserProfile) {
        self.auth = match std::mem::replace(&mut self.auth, AuthState::Anonymous) {
            AuthState::Resolving { token } | AuthState::Authenticated { token, .. } => {
                AuthState::Authenticated { token, user }
            }
            AuthState::Anonymous => AuthState::Anonymous,
        };
    }

    /// Swap the token in place, keeping the resolved profile
    pub fn rotate_token(&mut self, new_token: String) {
        match &mut self.auth {
            AuthState::Anonymous => {}
            AuthState::Resolving { token } | AuthState::Authenticated { token, .. } => {
                *token = new_token;
            }
        }
    }

    /// Record a fresh balance
    pub fn update_balance(&mut self, balance: Balance, at: DateTime<Utc>) {
        self.balance = Some(balance);
        self.last_balance_update = Some(at);
    }

    /// Tear everything down; the session becomes anonymous
    pub fn clear(&mut self) {
        self.auth = AuthState::Anonymous;
        self.balance = None;
        self.last_balance_update = None;
    }

    /// Cloned snapshot for consumers
    pub fn snapshot(&self) -> Session {
        Session {
            token: self.token().map(str::to_owned),
            user: self.user().cloned(),
            balance: self.balance.clone(),
            last_balance_update: self.last_balance_update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            tier: SubscriptionTier::Pro,
            storage_used: 0,
            storage_limit: 1024,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn resolving_is_not_authenticated() {
        let mut state = SessionState::new();
        assert_eq!(state.phase(), AuthPhase::Anonymous);

        state.adopt_token("T1".to_string());
        assert_eq!(state.phase(), AuthPhase::Resolving);
        assert!(!state.is_authenticated());
        assert_eq!(state.token(), Some("T1"));
        assert!(state.user().is_none());
    }

    #[test]
    fn resolution_completes_the_sign_in() {
        let mut state = SessionState::new();
        state.adopt_token("T1".to_string());
        state.resolve_user(profile());

        assert_eq!(state.phase(), AuthPhase::Authenticated);
        assert!(state.is_authenticated());
        assert_eq!(state.user_tier(), Some(SubscriptionTier::Pro));
    }

    #[test]
    fn resolution_without_token_stays_anonymous() {
        let mut state = SessionState::new();
        state.resolve_user(profile());

        assert_eq!(state.phase(), AuthPhase::Anonymous);
        assert!(state.token().is_none());
        assert!(state.user().is_none());
    }

    #[test]
    fn rotation_keeps_the_profile() {
        let mut state = SessionState::new();
        state.sign_in("T1".to_string(), profile());
        state.rotate_token("T2".to_string());

        assert_eq!(state.token(), Some("T2"));
        assert_eq!(state.phase(), AuthPhase::Authenticated);
        assert_eq!(state.user().map(|u| u.username.as_str()), Some("alice"));
    }

    #[test]
    fn clear_drops_every_piece() {
        let mut state = SessionState::new();
        state.sign_in("T1".to_string(), profile());
        state.update_balance(
            Balance {
                balance: 12.5,
                currency: "USD".to_string(),
                last_updated: None,
            },
            Utc::now(),
        );

        state.clear();

        let snapshot = state.snapshot();
        assert_eq!(snapshot, Session::default());
        assert_eq!(state.phase(), AuthPhase::Anonymous);
    }

    #[test]
    fn snapshot_matches_state() {
        let mut state = SessionState::new();
        state.sign_in("T1".to_string(), profile());

        let snapshot = state.snapshot();
        assert_eq!(snapshot.token.as_deref(), Some("T1"));
        assert!(snapshot.is_authenticated());
        assert!(snapshot.balance.is_none());
    }
}
