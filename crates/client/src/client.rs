//! Client construction and request plumbing

use std::time::Duration;

use reqwest::{Client, ClientBuilder, header};

use crate::error::ClientError;
use crate::types::ErrorResponse;

/// Till API client
#[derive(Clone)]
pub struct TillClient {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl TillClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> TillClientBuilder {
        TillClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Clone of this client that authenticates with `token`.
    ///
    /// The underlying connection pool is shared; only the bearer token is
    /// re-bound.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            bearer_token: Some(token.into()),
        }
    }

    /// Clone of this client with no credentials attached
    pub fn without_token(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            bearer_token: None,
        }
    }

    /// Create a request builder with authentication
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = &self.bearer_token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(ClientError::from_status(
                status,
                error_message(response, status).await,
            ))
        }
    }

    /// Execute a request whose success response carries no body
    pub async fn execute_empty(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(), ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::from_status(
                status,
                error_message(response, status).await,
            ))
        }
    }
}

/// Pull the backend's error message out of a failure response.
///
/// The backend reports `{"error": "..."}` payloads; plain-text bodies are
/// passed through and empty or unreadable bodies fall back to the status
/// line.
async fn error_message(response: reqwest::Response, status: reqwest::StatusCode) -> String {
    match response.text().await {
        Ok(body) if !body.is_empty() => {
            serde_json::from_str::<ErrorResponse>(&body).map_or(body, |payload| payload.error)
        }
        _ => status.to_string(),
    }
}

/// Builder for TillClient
#[derive(Default)]
pub struct TillClientBuilder {
    base_url: Option<String>,
    bearer_token: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl TillClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token for authenticated requests
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<TillClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent("till-client/0.1.0");
        }

        let client = client_builder.build()?;

        Ok(TillClient {
            client,
            base_url,
            bearer_token: self.bearer_token,
        })
    }
}
