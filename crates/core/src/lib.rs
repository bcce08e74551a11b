//! Till core types and collaborator traits

pub mod error;
pub mod notify;
pub mod storage;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use notify::{LogNotifier, Notifier};
pub use storage::{MemoryTokenStore, TOKEN_STORAGE_KEY, TokenStore};
pub use types::{Balance, Session, SubscriptionTier, UserProfile};
