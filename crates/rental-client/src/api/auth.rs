//! `/auth` endpoints.

use rental_core::{LoginRequest, LoginResponse, User};
use tracing::info;

use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct AuthApi {
    http: HttpClient,
}

impl AuthApi {
    pub fn new(http: HttpClient) -> Self {
        AuthApi { http }
    }

    /// `POST /auth/login`.
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        let response: LoginResponse = self.http.post("/auth/login", request).await?;
        info!(user_id = %response.user.id, "Login accepted");
        Ok(response)
    }

    /// `GET /auth/me`.
    pub async fn me(&self) -> ClientResult<User> {
        self.http.get("/auth/me").await
    }

    /// `POST /auth/logout`.
    pub async fn logout(&self) -> ClientResult<()> {
        self.http.post_empty("/auth/logout").await
    }
}
