//! Identity provider wire and domain types.

use chrono::Utc;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use gifty_core::{Email, UserId};

/// How an identity authenticates with the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInMethod {
    /// Email/password account managed by the provider.
    Password,
    /// Account federated from an external provider (Google etc.).
    /// Federated accounts arrive with their email already verified.
    Federated,
}

/// The authenticated subject as known to the identity provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Opaque subject ID issued by the provider.
    #[serde(rename = "sub")]
    pub subject: UserId,
    /// Email address on record with the provider.
    pub email: Email,
    /// Whether the provider has verified the email.
    pub email_verified: bool,
    /// Display name, if the account has one.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar URL, if the account has one.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// How this identity signs in.
    pub sign_in_method: SignInMethod,
}

impl Identity {
    /// Whether this identity still needs email verification before it may
    /// use protected views. Federated accounts never do.
    #[must_use]
    pub const fn needs_verification(&self) -> bool {
        matches!(self.sign_in_method, SignInMethod::Password) && !self.email_verified
    }
}

/// A short-lived bearer token for backend calls.
///
/// Minted immediately before each authenticated request and discarded after;
/// only the refresh token in [`TokenGrant`] is held across calls.
#[derive(Debug, Clone)]
pub struct IdToken {
    /// The raw bearer token value.
    pub access_token: String,
    /// Seconds until expiry, as reported by the provider.
    pub expires_in: i64,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl IdToken {
    /// Whether the token has outlived its reported lifetime.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.obtained_at + self.expires_in
    }
}

/// Tokens returned by a successful sign-in or registration.
pub struct TokenGrant {
    /// Bearer token usable right now.
    pub id_token: IdToken,
    /// Long-lived refresh token for minting future bearer tokens.
    pub refresh_token: SecretString,
}

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
