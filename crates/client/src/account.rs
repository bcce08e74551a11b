//! Account API client methods

use till_core::{Balance, UserProfile};

use crate::client::TillClient;
use crate::error::ClientError;

impl TillClient {
    /// Fetch the profile belonging to the current token
    pub async fn user_info(&self) -> Result<UserProfile, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/user/info");
        self.execute(req).await
    }

    /// Fetch the balance belonging to the current token
    pub async fn balance(&self) -> Result<Balance, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/user/balance");
        self.execute(req).await
    }
}
