//! Till HTTP client
//!
//! Thin reqwest wrapper over the account REST API. The client carries an
//! optional bearer token; everything stateful (token lifecycle, session
//! teardown on 401) lives in `till-session` on top of this crate.

mod account;
mod auth;
mod client;
pub mod error;
pub mod types;

pub use client::{TillClient, TillClientBuilder};
pub use error::ClientError;
