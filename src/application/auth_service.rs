// Auth service - Login, logout and the protected-view gate
use crate::application::api_client::{AuthError, AuthenticatedClient, RequestOptions};
use crate::application::http_transport::TransportError;
use crate::domain::session::Session;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("login response carried no token")]
    EmptyToken,
    #[error("network error: {0}")]
    Network(#[from] TransportError),
    #[error("server responded {status}: {body}")]
    Server { status: StatusCode, body: String },
    #[error("unexpected login response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("could not store session: {0}")]
    Storage(String),
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    client: AuthenticatedClient,
}

impl AuthService {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, LoginError> {
        let options = RequestOptions::json(&Credentials { username, password })?;
        let response = self
            .client
            .request_public(Method::POST, "/auth/login", options)
            .await?;

        if response.status == StatusCode::UNAUTHORIZED {
            return Err(LoginError::InvalidCredentials);
        }
        if !response.status.is_success() {
            return Err(LoginError::Server {
                status: response.status,
                body: response.text(),
            });
        }

        let token: TokenResponse = response.json()?;
        if token.access_token.is_empty() {
            return Err(LoginError::EmptyToken);
        }

        let session = self
            .client
            .session()
            .init(token.access_token, username.to_string(), token.role)
            .map_err(|e| LoginError::Storage(format!("{:#}", e)))?;
        tracing::info!(username, role = session.role(), "Logged in");
        Ok(session)
    }

    pub fn logout(&self) {
        tracing::info!("Logging out");
        self.client.end_session(AuthError::MissingToken);
    }

    /// Gate for protected views: redirects to login when there is no usable token.
    pub fn require_auth(&self) -> Result<Session, AuthError> {
        let session = self.client.session().current();
        if session.is_authenticated() {
            Ok(session)
        } else {
            self.client.redirect_to_login();
            Err(AuthError::MissingToken)
        }
    }
}
