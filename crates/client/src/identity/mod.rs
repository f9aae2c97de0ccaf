//! Identity provider client.
//!
//! The identity provider owns registration, credentials, and token issuance.
//! This client wraps its OAuth-style endpoints:
//!
//! 1. Federated sign-in: build an authorization URL with
//!    [`IdentityClient::authorization_url`], send the user there, then
//!    exchange the returned code with [`IdentityClient::exchange_code`]
//! 2. Email/password registration and (legacy) password sign-in
//! 3. Minting a fresh short-lived bearer token per backend call with
//!    [`IdentityClient::mint_token`]
//! 4. Revoking the refresh token on sign-out
//!
//! Bearer tokens are deliberately never cached here: the session layer asks
//! for a fresh one immediately before every authenticated backend call.

mod types;

pub use types::{IdToken, Identity, SignInMethod, TokenGrant};

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::config::IdentityConfig;

pub(crate) use types::TokenResponse;

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration failed because the email is already registered.
    #[error("email is already in use")]
    EmailAlreadyInUse,

    /// The provider rejected the request for some other reason.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// No refresh token is available to mint from.
    #[error("no active session")]
    NoSession,
}

/// Error body returned by the provider.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: String,
}

/// Client for the identity provider's account and token endpoints.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    issuer: url::Url,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl IdentityClient {
    /// Create a new identity provider client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                issuer: config.issuer.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                redirect_uri: config.redirect_uri.clone(),
            }),
        }
    }

    /// The configured redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.inner.redirect_uri
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.issuer.as_str().trim_end_matches('/'))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Federated sign-in (authorization-code flow)
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate the authorization URL for federated sign-in.
    ///
    /// # Arguments
    ///
    /// * `state` - Random string echoed back on the callback (CSRF guard)
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope=openid%20email%20profile&state={}",
            self.endpoint("/oauth/authorize"),
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails; the caller's session state is
    /// untouched on failure.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, IdentityError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", &self.inner.redirect_uri),
        ])
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Email/password accounts
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new email/password account.
    ///
    /// The provider sends a verification email as a side effect; the returned
    /// grant is usable immediately but the identity stays unverified until
    /// the user follows the link.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmailAlreadyInUse`] for duplicate emails,
    /// distinguishable from generic provider failures.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<TokenGrant, IdentityError> {
        let url = self.endpoint("/accounts/register");
        let response = self
            .inner
            .client
            .post(&url)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "displayName": display_name,
                "clientId": self.inner.client_id,
            }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(IdentityError::EmailAlreadyInUse);
        }
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let token: TokenResponse = response.json().await?;
        grant_from_response(token)
    }

    /// Sign in with email and password (legacy path, superseded by
    /// federated sign-in but still served by the provider).
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredentials`] on rejection.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenGrant, IdentityError> {
        let result = self
            .token_request(&[
                ("grant_type", "password"),
                ("client_id", &self.inner.client_id),
                ("client_secret", &self.inner.client_secret),
                ("username", email),
                ("password", password),
            ])
            .await;

        match result {
            Err(IdentityError::Provider(_)) => Err(IdentityError::InvalidCredentials),
            other => other,
        }
    }

    /// Ask the provider to resend the verification email.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the request.
    pub async fn send_verification(&self, token: &IdToken) -> Result<(), IdentityError> {
        let url = self.endpoint("/accounts/send-verification");
        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tokens
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint a fresh short-lived bearer token from a refresh token.
    ///
    /// Called immediately before every authenticated backend request.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token has been revoked or the
    /// provider is unreachable.
    pub async fn mint_token(&self, refresh_token: &SecretString) -> Result<IdToken, IdentityError> {
        let grant = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("client_id", &self.inner.client_id),
                ("client_secret", &self.inner.client_secret),
                ("refresh_token", refresh_token.expose_secret()),
            ])
            .await?;

        Ok(grant.id_token)
    }

    /// Fetch the identity behind a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is stale or the provider is unreachable.
    pub async fn fetch_identity(&self, token: &IdToken) -> Result<Identity, IdentityError> {
        let url = self.endpoint("/accounts/me");
        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Revoke a refresh token.
    ///
    /// Sign-out treats failures here as best-effort: the caller clears local
    /// session state regardless, so this logs and swallows provider errors.
    pub async fn revoke(&self, refresh_token: &SecretString) {
        let url = self.endpoint("/oauth/revoke");
        let result = self
            .inner
            .client
            .post(&url)
            .form(&[
                ("client_id", self.inner.client_id.as_str()),
                ("token", refresh_token.expose_secret()),
            ])
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(status = %response.status(), "token revocation rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "token revocation failed");
            }
            Ok(_) => {}
        }
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenGrant, IdentityError> {
        let url = self.endpoint("/oauth/token");
        let response = self.inner.client.post(&url).form(params).send().await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let token: TokenResponse = response.json().await?;
        grant_from_response(token)
    }
}

/// Generate a random state string for the authorization-code flow.
#[must_use]
pub fn generate_state() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    (0..32)
        .map(|_| {
            const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

fn grant_from_response(token: TokenResponse) -> Result<TokenGrant, IdentityError> {
    let refresh = token
        .refresh_token
        .ok_or_else(|| IdentityError::Provider("no refresh token in grant".to_string()))?;

    Ok(TokenGrant {
        id_token: IdToken {
            access_token: token.access_token,
            expires_in: token.expires_in,
            obtained_at: chrono::Utc::now().timestamp(),
        },
        refresh_token: SecretString::from(refresh),
    })
}

async fn provider_error(response: reqwest::Response) -> IdentityError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ProviderError>(&text)
        .map_or_else(|_| text.chars().take(200).collect(), |e| e.error);

    tracing::debug!(status = %status, message = %message, "identity provider rejected request");
    IdentityError::Provider(message)
}
