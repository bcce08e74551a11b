//! Domain types shared by the client and session crates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier of an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Basic,
    Pro,
    Enterprise,
}

impl Default for SubscriptionTier {
    fn default() -> Self {
        Self::Basic
    }
}

impl SubscriptionTier {
    /// Tier name as it appears on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }
}

/// Account profile as reported by the backend.
///
/// Replaced wholesale on every successful fetch; individual fields are never
/// patched in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub tier: SubscriptionTier,
    pub storage_used: u64,
    pub storage_limit: u64,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Remaining storage quota, saturating at zero
    pub fn storage_available(&self) -> u64 {
        self.storage_limit.saturating_sub(self.storage_used)
    }
}

/// Account balance as reported by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Balance {
    pub balance: f64,
    pub currency: String,
    /// Server-side update timestamp; not all deployments report it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Point-in-time snapshot of the session state.
///
/// The token is the only field that survives a process restart (via
/// [`TokenStore`](crate::storage::TokenStore)); user and balance are
/// re-fetched after startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub balance: Option<Balance>,
    pub last_balance_update: Option<DateTime<Utc>>,
}

impl Session {
    /// A session is authenticated iff both a token and a resolved user are
    /// present. A token without a resolvable user does not count.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(tier: SubscriptionTier) -> UserProfile {
        UserProfile {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            tier,
            storage_used: 512,
            storage_limit: 2048,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tier_wire_format_is_lowercase() {
        let json = serde_json::to_string(&SubscriptionTier::Enterprise).unwrap();
        assert_eq!(json, "\"enterprise\"");

        let tier: SubscriptionTier = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(tier, SubscriptionTier::Pro);
    }

    #[test]
    fn balance_tolerates_missing_server_timestamp() {
        let balance: Balance =
            serde_json::from_str(r#"{"balance": 42.5, "currency": "USD"}"#).unwrap();
        assert_eq!(balance.balance, 42.5);
        assert!(balance.last_updated.is_none());
    }

    #[test]
    fn storage_available_saturates() {
        let mut user = profile(SubscriptionTier::Basic);
        assert_eq!(user.storage_available(), 1536);

        user.storage_used = 4096;
        assert_eq!(user.storage_available(), 0);
    }

    #[test]
    fn session_requires_both_token_and_user() {
        let mut session = Session::default();
        assert!(!session.is_authenticated());

        session.token = Some("T1".to_string());
        assert!(!session.is_authenticated());

        session.user = Some(profile(SubscriptionTier::Pro));
        assert!(session.is_authenticated());

        session.token = None;
        assert!(!session.is_authenticated());
    }
}
