//! Authentication API client methods

use crate::client::TillClient;
use crate::error::ClientError;
use crate::types::{AuthResponse, LoginRequest, RefreshResponse, RegisterRequest};

impl TillClient {
    /// Exchange credentials for a token and a resolved profile
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthResponse, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/auth/login")
            .json(&LoginRequest {
                username: username.into(),
                password: password.into(),
            });
        self.execute(req).await
    }

    /// Create an account and sign it in
    pub async fn register(
        &self,
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthResponse, ClientError> {
        let req = self
            .request(reqwest::Method::POST, "/api/auth/register")
            .json(&RegisterRequest {
                username: username.into(),
                email: email.into(),
                password: password.into(),
            });
        self.execute(req).await
    }

    /// Tear down the server-side session for the current token
    pub async fn logout(&self) -> Result<(), ClientError> {
        let req = self.request(reqwest::Method::POST, "/api/auth/logout");
        self.execute_empty(req).await
    }

    /// Rotate the current token
    pub async fn refresh(&self) -> Result<RefreshResponse, ClientError> {
        let req = self.request(reqwest::Method::POST, "/api/auth/refresh");
        self.execute(req).await
    }
}
