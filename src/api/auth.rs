use super::{ApiError, Backend};
use crate::models::{AuthUser, Session};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user: AuthUser,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: token.user,
        }
    }
}

impl Backend {
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let url = self.auth_url("token?grant_type=password");
        let token: TokenResponse = self
            .send_json(
                self.request(Method::POST, url, None)
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        Ok(token.into())
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let url = self.auth_url("signup");
        let token: TokenResponse = self
            .send_json(
                self.request(Method::POST, url, None)
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        Ok(token.into())
    }

    /// Exchange a stored refresh token for a fresh session. Used on launch
    /// to validate a persisted session before trusting it.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ApiError> {
        let url = self.auth_url("token?grant_type=refresh_token");
        let token: TokenResponse = self
            .send_json(
                self.request(Method::POST, url, None)
                    .json(&json!({ "refresh_token": refresh_token })),
            )
            .await?;
        Ok(token.into())
    }
}
