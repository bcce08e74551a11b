//! Durable token persistence

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};

/// Key under which durable implementations persist the raw token
pub const TOKEN_STORAGE_KEY: &str = "auth_token";

/// Durable key/value persistence for the session token.
///
/// The session manager treats this as an environment service (browser
/// storage, a keychain entry, a dotfile) so it can run without any real
/// environment in tests. Implementations store the raw token under
/// [`TOKEN_STORAGE_KEY`] and must survive process restarts.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the persisted token, if any
    async fn load(&self) -> CoreResult<Option<String>>;

    /// Persist the token, replacing any previous value
    async fn save(&self, token: &str) -> CoreResult<()>;

    /// Remove the persisted token
    async fn clear(&self) -> CoreResult<()>;
}

/// In-memory token store.
///
/// Useful for tests and embedded setups. Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a token, as if persisted by a previous run
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> CoreResult<Option<String>> {
        Ok(self
            .token
            .read()
            .map_err(|e| CoreError::storage(e.to_string()))?
            .clone())
    }

    async fn save(&self, token: &str) -> CoreResult<()> {
        *self
            .token
            .write()
            .map_err(|e| CoreError::storage(e.to_string()))? = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> CoreResult<()> {
        *self
            .token
            .write()
            .map_err(|e| CoreError::storage(e.to_string()))? = None;
        Ok(())
    }
}

// Mock implementation for testing
#[cfg(any(test, feature = "tests"))]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub TokenStore {}

        #[async_trait]
        impl TokenStore for TokenStore {
            async fn load(&self) -> CoreResult<Option<String>>;
            async fn save(&self, token: &str) -> CoreResult<()>;
            async fn clear(&self) -> CoreResult<()>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("T1").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("T1".to_string()));

        store.save("T2").await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some("T2".to_string()));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn seeded_store_reports_token() {
        let store = MemoryTokenStore::with_token("persisted");
        assert_eq!(store.load().await.unwrap(), Some("persisted".to_string()));
    }

    #[tokio::test]
    async fn mock_store_propagates_failures() {
        let mut store = mock::MockTokenStore::new();
        store
            .expect_load()
            .returning(|| Err(CoreError::storage("backend unavailable")));

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }));
    }
}
