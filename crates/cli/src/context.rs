//! Shared setup for CLI commands.
//!
//! Each invocation is one-shot: load config, build the clients, optionally
//! resume the session from the stored refresh token, run one operation.

use thiserror::Error;

use gifty_client::api::GiftyApi;
use gifty_client::identity::IdentityClient;
use gifty_client::{GiftyConfig, RouteDecision, RouteGuard, SessionManager, WishlistStore};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] gifty_client::ConfigError),

    #[error("not signed in - run `gifty auth login` and export GIFTY_REFRESH_TOKEN")]
    NotSignedIn,

    #[error("email not verified - check your inbox, then run `gifty auth verify`")]
    EmailNotVerified,
}

/// Everything a command needs.
pub struct Context {
    pub api: GiftyApi,
    pub session: SessionManager,
}

impl Context {
    /// Build clients without a session (for login/register/share lookup).
    pub fn anonymous() -> Result<Self, ContextError> {
        let config = GiftyConfig::from_env()?;
        let api = GiftyApi::new(&config.api_base_url);
        let session = SessionManager::new(IdentityClient::new(&config.identity), api.clone());
        Ok(Self { api, session })
    }

    /// Build clients and resume the stored session, enforcing the route
    /// guard: commands behind this behave like protected views.
    pub async fn signed_in() -> Result<Self, ContextError> {
        let config = GiftyConfig::from_env()?;
        let refresh_token = config.refresh_token.clone().ok_or(ContextError::NotSignedIn)?;

        let api = GiftyApi::new(&config.api_base_url);
        let mut session = SessionManager::new(IdentityClient::new(&config.identity), api.clone());
        session.resume(refresh_token).await;

        match RouteGuard::evaluate(&session.snapshot()) {
            RouteDecision::Admit => Ok(Self { api, session }),
            RouteDecision::RedirectToVerification => Err(ContextError::EmailNotVerified),
            RouteDecision::RedirectToLogin | RouteDecision::Pending => {
                Err(ContextError::NotSignedIn)
            }
        }
    }

    /// A store pre-filled with the signed-in user's wishlists.
    pub async fn loaded_store(&self) -> Result<WishlistStore, Box<dyn std::error::Error>> {
        let mut store = WishlistStore::new(self.api.clone());
        store
            .refresh(&self.session)
            .await
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)?;
        Ok(store)
    }
}

/// Ask the user to confirm a destructive action.
pub fn confirm(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }

    println!("{prompt} [y/N]");
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}
