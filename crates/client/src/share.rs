//! Share-code resolution.
//!
//! A share code is a public entry point: anyone holding it can view the
//! wishlist, and signed-in viewers can reserve from it. Resolution is
//! unauthenticated by default; when a session exists a bearer token is
//! attached so the server can personalize the response.

use thiserror::Error;

use gifty_core::{ItemId, ShareCode};

use crate::api::{ApiError, GiftyApi, SharedWishlist, SharedWithMeGroup};
use crate::notice::Notice;
use crate::session::{SessionError, SessionManager};
use crate::store::{self, PendingToggle, StoreError};

/// Errors surfaced by share operations.
#[derive(Debug, Error)]
pub enum ShareError {
    /// Reservation from a share view needs a signed-in session; refused
    /// client-side before any network call.
    #[error("sign in to reserve items")]
    SignInRequired,

    /// The toggle was refused or failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Session failure (token minting).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Resolution failed for a transport-level reason; the view may retry.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ShareError {
    /// User-facing notice for this failure.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::SignInRequired => Notice::error("You need to be signed in to reserve items."),
            Self::Store(e) => e.notice(),
            Self::Api(ApiError::Rejected(message)) => Notice::error(message.clone()),
            Self::Session(SessionError::NotSignedIn) => {
                Notice::error("You need to be signed in to do that.")
            }
            _ => Notice::error("Something went wrong. Please try again."),
        }
    }
}

/// Resolution state of a share view.
///
/// `Loading` and `InvalidOrExpired` are deliberately separate variants: a
/// code that resolved to nothing must never keep rendering as "still
/// loading".
#[derive(Debug)]
pub enum ShareState {
    /// Resolution has not completed.
    Loading,
    /// The code resolved to a wishlist.
    Resolved(SharedWishlist),
    /// The code is unknown or expired. Terminal.
    InvalidOrExpired,
}

/// Resolver for one share code.
pub struct ShareResolver {
    api: GiftyApi,
    code: ShareCode,
    state: ShareState,
}

impl ShareResolver {
    /// Create a resolver in the `Loading` state.
    #[must_use]
    pub const fn new(api: GiftyApi, code: ShareCode) -> Self {
        Self {
            api,
            code,
            state: ShareState::Loading,
        }
    }

    /// Current resolution state.
    #[must_use]
    pub const fn state(&self) -> &ShareState {
        &self.state
    }

    /// Resolve the code.
    ///
    /// A not-found answer moves to the terminal `InvalidOrExpired` state.
    /// Transport failures leave the state as-is and are returned for the
    /// caller to retry.
    ///
    /// # Errors
    ///
    /// Returns transport-level failures only; "not found" is a state, not
    /// an error.
    pub async fn resolve(
        &mut self,
        session: Option<&SessionManager>,
    ) -> Result<&ShareState, ShareError> {
        let token = match session {
            Some(session) if session.identity().is_some() => Some(session.fresh_token().await?),
            _ => None,
        };

        match self.api.resolve_share_code(&self.code, token.as_ref()).await {
            Ok(wishlist) => self.state = ShareState::Resolved(wishlist),
            Err(ApiError::NotFound) => self.state = ShareState::InvalidOrExpired,
            Err(e) => return Err(e.into()),
        }
        Ok(&self.state)
    }

    /// First phase of a reservation toggle from the share view.
    ///
    /// Without a signed-in session this is refused client-side with a
    /// prompt to authenticate instead of letting the backend reject it.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::SignInRequired`] for guests, or a permission
    /// refusal from derivation.
    pub fn request_reservation_toggle(
        &self,
        session: Option<&SessionManager>,
        item_id: &ItemId,
    ) -> Result<PendingToggle, ShareError> {
        let current_user = session
            .and_then(SessionManager::current_user_id)
            .ok_or(ShareError::SignInRequired)?;

        let ShareState::Resolved(wishlist) = &self.state else {
            return Err(StoreError::UnknownWishlist.into());
        };

        let item = wishlist
            .items
            .iter()
            .find(|i| &i.id == item_id)
            .ok_or(StoreError::UnknownItem)?;

        Ok(store::request_toggle(
            &wishlist.user_id,
            Some(current_user),
            item,
        )?)
    }

    /// Second phase: execute a confirmed toggle and merge the server's
    /// answer into the resolved view.
    ///
    /// # Errors
    ///
    /// Surfaces the backend's rejection message (e.g., the reservation
    /// limit) unchanged; the view is not modified on failure.
    pub async fn confirm_reservation_toggle(
        &mut self,
        session: &SessionManager,
        pending: PendingToggle,
    ) -> Result<(), ShareError> {
        let token = session.fresh_token().await?;
        let updated = self
            .api
            .toggle_reservation(pending.item_id(), &token)
            .await?;

        if let ShareState::Resolved(wishlist) = &mut self.state {
            if let Some(slot) = wishlist.items.iter_mut().find(|i| i.id == updated.id) {
                *slot = updated;
            }
        }
        Ok(())
    }
}

/// Fetch wishlists shared with the current user, grouped by owner.
///
/// # Errors
///
/// Returns an error if no session exists or the backend call fails.
pub async fn shared_with_me(
    api: &GiftyApi,
    session: &SessionManager,
) -> Result<Vec<SharedWithMeGroup>, ShareError> {
    let token = session.fresh_token().await?;
    Ok(api.shared_with_me(&token).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_prompts_guests_to_sign_in() {
        assert_eq!(
            ShareError::SignInRequired.notice().message,
            "You need to be signed in to reserve items."
        );
    }

    #[test]
    fn test_notice_passes_backend_rejection_through() {
        let err = ShareError::Api(ApiError::Rejected(
            "You can only reserve 1 item per wishlist.".to_string(),
        ));
        assert_eq!(
            err.notice().message,
            "You can only reserve 1 item per wishlist."
        );
    }

    #[test]
    fn test_notice_collapses_transport_failures() {
        let err = ShareError::Api(ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        });
        assert_eq!(
            err.notice().message,
            "Something went wrong. Please try again."
        );
    }
}
