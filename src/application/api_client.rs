// Authenticated request client - attaches the session token and tears the
// session down when the server rejects it
use crate::application::http_transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use crate::application::navigator::Navigator;
use crate::application::session_store::SessionContext;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("not logged in")]
    MissingToken,
    #[error("session rejected by the server")]
    Rejected,
    #[error("stored token is not a valid header value")]
    InvalidToken,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("network error: {0}")]
    Network(#[from] TransportError),
    #[error("server responded {status}: {body}")]
    Server { status: StatusCode, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn auth(&self) -> Option<AuthError> {
        match self {
            ClientError::Auth(e) => Some(*e),
            _ => None,
        }
    }
}

/// Extra headers and body for one call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl RequestOptions {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            headers: HeaderMap::new(),
            body: Some(Bytes::from(serde_json::to_vec(value)?)),
        })
    }
}

/// Classifies a response status as an auth failure. Any 401 counts,
/// whatever the server says caused it.
pub fn detect_auth_failure(status: StatusCode) -> Option<AuthError> {
    (status == StatusCode::UNAUTHORIZED).then_some(AuthError::Rejected)
}

#[derive(Clone)]
pub struct AuthenticatedClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    session: SessionContext,
    navigator: Arc<dyn Navigator>,
}

impl AuthenticatedClient {
    pub fn new(
        base_url: String,
        transport: Arc<dyn HttpTransport>,
        session: SessionContext,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Sends a request carrying the current session token.
    ///
    /// Fails with [`AuthError`] when there is no token or the server answers
    /// 401; in both cases the session is cleared and the login redirect has
    /// already happened by the time the error reaches the caller. Every other
    /// response is returned untouched.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        // Read at call time so a logout elsewhere is seen by the next request.
        let Some(token) = self.session.token() else {
            return Err(self.end_session(AuthError::MissingToken).into());
        };

        let headers = match authorized_headers(&token, options.headers) {
            Ok(headers) => headers,
            Err(e) => return Err(self.end_session(e).into()),
        };

        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let response = self
            .transport
            .send(ApiRequest {
                method,
                url,
                headers,
                body: options.body,
            })
            .await?;

        if let Some(e) = detect_auth_failure(response.status) {
            return Err(self.end_session(e).into());
        }

        Ok(response)
    }

    /// Sends a request without credentials, for the login and health endpoints.
    /// A 401 here is returned like any other status.
    pub async fn request_public(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, TransportError> {
        let mut headers = base_headers();
        merge_headers(&mut headers, options.headers);

        let url = self.url(path);
        tracing::debug!("{} {} (public)", method, url);

        self.transport
            .send(ApiRequest {
                method,
                url,
                headers,
                body: options.body,
            })
            .await
    }

    /// Clears the session and sends the user to the login entry point.
    pub fn end_session(&self, reason: AuthError) -> AuthError {
        tracing::warn!("Ending session: {}", reason);
        if let Err(e) = self.session.clear() {
            tracing::error!("Failed to clear session: {:#}", e);
        }
        self.navigator.redirect_to_login();
        reason
    }

    pub fn redirect_to_login(&self) {
        self.navigator.redirect_to_login();
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Caller headers replace same-named defaults.
fn merge_headers(headers: &mut HeaderMap, extra: HeaderMap) {
    for name in extra.keys() {
        headers.remove(name);
    }
    for (name, value) in extra.iter() {
        headers.append(name.clone(), value.clone());
    }
}

/// Standard headers plus caller extras; the bearer header always comes from
/// the session.
fn authorized_headers(token: &str, mut extra: HeaderMap) -> Result<HeaderMap, AuthError> {
    if extra.remove(AUTHORIZATION).is_some() {
        tracing::warn!("Ignoring caller-supplied Authorization header");
    }

    let mut headers = base_headers();
    merge_headers(&mut headers, extra);

    let mut bearer =
        HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| AuthError::InvalidToken)?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    Ok(headers)
}
