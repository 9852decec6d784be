use reqwest::Method;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Acknowledgement, ChangePasswordRequest, LoginRequest, LoginResponse, User};

impl ApiClient {
    /// `POST /auth/login`: exchanges credentials for a bearer token.
    ///
    /// The token is returned, not persisted; persisting it is the
    /// [`SessionManager`](crate::SessionManager)'s job.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = self
            .request(Method::POST, "/auth/login")?
            .json(&LoginRequest { email, password });
        self.send(request).await
    }

    /// `POST /auth/change-password` for the current user.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Acknowledgement> {
        let request = self
            .request(Method::POST, "/auth/change-password")?
            .json(&ChangePasswordRequest {
                current_password,
                new_password,
            });
        self.send(request).await
    }

    /// `GET /auth/me`.
    pub async fn current_user(&self) -> Result<User> {
        self.send(self.request(Method::GET, "/auth/me")?).await
    }
}
