//! Session manager and route guard.
//!
//! The session manager bridges identity-provider auth state to the backend
//! profile: on sign-in it ensures a profile record exists (creating one
//! lazily when the lookup 404s), and it exposes both halves of the session
//! to dependent views. One instance is created at startup and torn down on
//! sign-out; views receive it by parameter injection rather than through
//! ambient context.
//!
//! Provisioning is guarded by a one-shot latch keyed to the current identity
//! subject. The latch resets whenever the subject changes, so signing out
//! and back in as a different identity provisions again instead of being
//! blocked by a stale flag.

use secrecy::SecretString;
use thiserror::Error;

use gifty_core::UserId;

use crate::api::{ApiError, GiftyApi, NewProfile, Profile, ProfileUpdate};
use crate::identity::{IdToken, Identity, IdentityClient, IdentityError, TokenGrant};

/// Fallback display name for identities without one.
const DEFAULT_USERNAME: &str = "New User";
/// Fallback avatar for identities without a photo.
const DEFAULT_AVATAR: &str = "/default-avatar.png";

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Identity provider failure.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Backend API failure.
    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    /// An operation that needs a signed-in session was called without one.
    #[error("not signed in")]
    NotSignedIn,

    /// The profile could not be found even after provisioning it.
    #[error("profile unavailable after provisioning")]
    ProfileUnavailable,
}

/// A read-only snapshot of session state, for route decisions and display.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Session bootstrap still in progress.
    pub loading: bool,
    /// Current identity, if signed in.
    pub identity: Option<Identity>,
    /// Backend profile, once resolved.
    pub profile: Option<Profile>,
}

/// The session manager.
///
/// Owns the only mutable copy of identity and profile state; everything
/// else reads it through [`SessionManager::snapshot`] or the accessors.
pub struct SessionManager {
    identity_client: IdentityClient,
    api: GiftyApi,
    identity: Option<Identity>,
    refresh_token: Option<SecretString>,
    profile: Option<Profile>,
    loading: bool,
    /// One-shot provisioning latch, keyed by identity subject.
    provisioned_for: Option<UserId>,
}

impl SessionManager {
    /// Create a session manager with no active session.
    #[must_use]
    pub fn new(identity_client: IdentityClient, api: GiftyApi) -> Self {
        Self {
            identity_client,
            api,
            identity: None,
            refresh_token: None,
            profile: None,
            loading: false,
            provisioned_for: None,
        }
    }

    /// Resume a session from a stored refresh token (e.g., from config).
    ///
    /// Failure to resume degrades to an unauthenticated session rather than
    /// propagating: a stale stored token is equivalent to being signed out.
    pub async fn resume(&mut self, refresh_token: SecretString) {
        self.loading = true;

        let result: Result<(), SessionError> = async {
            let token = self.identity_client.mint_token(&refresh_token).await?;
            let identity = self.identity_client.fetch_identity(&token).await?;
            self.install_identity(identity, refresh_token.clone());
            self.ensure_profile().await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            tracing::debug!(error = %e, "session resume failed, starting signed out");
            self.clear_local_state();
        }

        self.loading = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sign-in / registration / sign-out
    // ─────────────────────────────────────────────────────────────────────────

    /// Complete a federated sign-in with the provider's authorization code.
    ///
    /// # Errors
    ///
    /// Provider failures are reported to the caller and do not mutate
    /// session state.
    pub async fn sign_in_with_provider(&mut self, code: &str) -> Result<(), SessionError> {
        let grant = self.identity_client.exchange_code(code).await?;
        self.complete_sign_in(grant).await
    }

    /// Sign in with email and password (legacy path).
    ///
    /// # Errors
    ///
    /// Provider failures are reported to the caller and do not mutate
    /// session state.
    pub async fn sign_in_with_password(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let grant = self
            .identity_client
            .sign_in_with_password(email, password)
            .await?;
        self.complete_sign_in(grant).await
    }

    /// Register a new email/password account.
    ///
    /// The account starts unverified; the route guard will hold it at the
    /// verification step until the user follows the emailed link.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmailAlreadyInUse`] (wrapped) when the email
    /// is taken, distinguishable from generic failures.
    pub async fn register_with_email(
        &mut self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<(), SessionError> {
        let grant = self
            .identity_client
            .register(email, password, username)
            .await?;
        self.complete_sign_in(grant).await
    }

    /// Sign out.
    ///
    /// Local identity and profile state is always cleared; revocation at the
    /// provider is best-effort and failures there are logged, not surfaced.
    pub async fn sign_out(&mut self) {
        if let Some(refresh_token) = self.refresh_token.take() {
            self.identity_client.revoke(&refresh_token).await;
        }
        self.clear_local_state();
    }

    async fn complete_sign_in(&mut self, grant: TokenGrant) -> Result<(), SessionError> {
        self.loading = true;
        let result = async {
            let identity = self.identity_client.fetch_identity(&grant.id_token).await?;
            self.install_identity(identity, grant.refresh_token);
            self.ensure_profile().await
        }
        .await;
        self.loading = false;
        result
    }

    /// Record a new identity, resetting the provisioning latch when the
    /// subject differs from the previous one.
    fn install_identity(&mut self, identity: Identity, refresh_token: SecretString) {
        if self.provisioned_for.as_ref() != Some(&identity.subject) {
            self.provisioned_for = None;
            self.profile = None;
        }
        self.identity = Some(identity);
        self.refresh_token = Some(refresh_token);
    }

    fn clear_local_state(&mut self) {
        self.identity = None;
        self.refresh_token = None;
        self.profile = None;
        self.provisioned_for = None;
        self.loading = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tokens
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint a fresh bearer token for one backend call.
    ///
    /// Tokens are short-lived and must not be cached beyond a single
    /// request, so every authenticated call goes through here first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a session.
    pub async fn fresh_token(&self) -> Result<IdToken, SessionError> {
        let refresh_token = self
            .refresh_token
            .as_ref()
            .ok_or(SessionError::NotSignedIn)?;
        Ok(self.identity_client.mint_token(refresh_token).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Profile provisioning
    // ─────────────────────────────────────────────────────────────────────────

    /// Ensure a backend profile exists for the current identity.
    ///
    /// Looks the profile up by subject ID; on 404, provisions one from the
    /// identity's denormalized display fields and retries the lookup exactly
    /// once. The create call runs at most once per identity transition:
    /// repeated invocations (views mounting and unmounting) hit the latch
    /// and fall through to a plain lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ProfileUnavailable`] if the retry after
    /// provisioning still misses.
    pub async fn ensure_profile(&mut self) -> Result<(), SessionError> {
        let identity = self.identity.clone().ok_or(SessionError::NotSignedIn)?;
        let token = self.fresh_token().await?;

        match self.api.get_user(&identity.subject, &token).await {
            Ok(profile) => {
                self.profile = Some(profile);
                self.provisioned_for = Some(identity.subject);
                Ok(())
            }
            Err(ApiError::NotFound) if self.provisioned_for.as_ref() != Some(&identity.subject) => {
                // Latch before the create so a re-entrant call cannot
                // provision twice for the same subject.
                self.provisioned_for = Some(identity.subject.clone());

                tracing::info!(subject = %identity.subject, "profile not found, provisioning");
                let new = NewProfile {
                    id: identity.subject.clone(),
                    username: identity
                        .display_name
                        .clone()
                        .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
                    avatar_url: identity
                        .photo_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
                    bio: String::new(),
                };
                self.api.create_user(&new, &token).await?;

                // Retry the lookup exactly once.
                let token = self.fresh_token().await?;
                match self.api.get_user(&identity.subject, &token).await {
                    Ok(profile) => {
                        self.profile = Some(profile);
                        Ok(())
                    }
                    Err(ApiError::NotFound) => Err(SessionError::ProfileUnavailable),
                    Err(e) => Err(e.into()),
                }
            }
            Err(ApiError::NotFound) => Err(SessionError::ProfileUnavailable),
            Err(e) => Err(e.into()),
        }
    }

    /// Re-fetch the identity from the provider (e.g., after the user clicks
    /// the verification link).
    ///
    /// # Errors
    ///
    /// Returns an error if no session exists or the provider call fails; the
    /// previous identity stays in place on failure.
    pub async fn refresh_identity(&mut self) -> Result<(), SessionError> {
        let token = self.fresh_token().await?;
        let identity = self.identity_client.fetch_identity(&token).await?;
        self.identity = Some(identity);
        Ok(())
    }

    /// Re-fetch the backend profile.
    ///
    /// # Errors
    ///
    /// Returns an error if no session exists or the backend call fails; the
    /// cached profile stays in place on failure.
    pub async fn refresh_profile(&mut self) -> Result<(), SessionError> {
        let identity = self.identity.clone().ok_or(SessionError::NotSignedIn)?;
        let token = self.fresh_token().await?;
        self.profile = Some(self.api.get_user(&identity.subject, &token).await?);
        Ok(())
    }

    /// Update the profile's mutable fields and merge the server's response.
    ///
    /// # Errors
    ///
    /// Returns an error if no session exists or the backend declines; the
    /// cached profile is unchanged on failure.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<(), SessionError> {
        let identity = self.identity.clone().ok_or(SessionError::NotSignedIn)?;
        let token = self.fresh_token().await?;
        self.profile = Some(self.api.update_user(&identity.subject, update, &token).await?);
        Ok(())
    }

    /// Ask the provider to resend the verification email.
    ///
    /// # Errors
    ///
    /// Returns an error if no session exists or the provider declines.
    pub async fn resend_verification(&self) -> Result<(), SessionError> {
        let token = self.fresh_token().await?;
        self.identity_client.send_verification(&token).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Current identity, if signed in.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Current backend profile, once resolved.
    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Whether session bootstrap is in progress.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Subject ID of the current identity, if any.
    #[must_use]
    pub fn current_user_id(&self) -> Option<&UserId> {
        self.identity.as_ref().map(|i| &i.subject)
    }

    /// The refresh token backing this session, for callers that persist it
    /// across processes (the CLI stores it in the environment).
    #[must_use]
    pub const fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    /// Take a read-only snapshot for route decisions.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            loading: self.loading,
            identity: self.identity.clone(),
            profile: self.profile.clone(),
        }
    }
}

// =============================================================================
// Route guard
// =============================================================================

/// Navigation decision for a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Bootstrap in progress: render a neutral pending state, decide nothing.
    Pending,
    /// No identity: go to login.
    RedirectToLogin,
    /// Password account with unverified email: go to verification.
    RedirectToVerification,
    /// Verified identity with a resolved profile: render protected content.
    Admit,
}

/// Gate for protected views, driven solely by session state.
///
/// Performs no network calls of its own; every transition follows from what
/// the session manager already did.
pub struct RouteGuard;

impl RouteGuard {
    /// Decide whether a protected view may render.
    #[must_use]
    pub fn evaluate(session: &SessionSnapshot) -> RouteDecision {
        if session.loading {
            return RouteDecision::Pending;
        }

        let Some(identity) = &session.identity else {
            return RouteDecision::RedirectToLogin;
        };

        if identity.needs_verification() {
            return RouteDecision::RedirectToVerification;
        }

        if session.profile.is_some() {
            RouteDecision::Admit
        } else {
            // Identity is usable but the profile fetch has not landed yet.
            RouteDecision::Pending
        }
    }
}
