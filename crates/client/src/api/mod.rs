//! Gifty backend REST client.
//!
//! Thin typed wrapper over the backend's JSON endpoints. The backend owns
//! persistence and authorization; this client's job is request shaping,
//! status mapping, and logging. Authenticated calls take a bearer token the
//! caller minted immediately beforehand.

pub mod types;

pub use types::*;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

use gifty_core::{ItemId, ShareCode, UserId, WishlistId};

use crate::identity::IdToken;

/// Errors from the Gifty backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The resource does not exist. For profile lookups this triggers
    /// lazy provisioning; everywhere else it is terminal.
    #[error("not found")]
    NotFound,

    /// Domain-specific rejection with a user-facing message from the
    /// backend (e.g., the one-reservation-per-wishlist rule).
    #[error("{0}")]
    Rejected(String),

    /// Any other non-success status.
    #[error("backend returned {status}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Error body shape used by the backend: `{"error": "..."}`.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the Gifty backend REST API.
#[derive(Clone)]
pub struct GiftyApi {
    inner: Arc<GiftyApiInner>,
}

struct GiftyApiInner {
    client: reqwest::Client,
    base_url: String,
}

impl GiftyApi {
    /// Create a new backend client.
    #[must_use]
    pub fn new(base_url: &url::Url) -> Self {
        Self {
            inner: Arc::new(GiftyApiInner {
                client: reqwest::Client::new(),
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the profile for an identity subject.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no profile exists yet.
    pub async fn get_user(&self, id: &UserId, token: &IdToken) -> Result<Profile, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url(&format!("/api/users/{id}")))
            .bearer_auth(&token.access_token);
        execute(request).await
    }

    /// Create a profile (lazy provisioning).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the create.
    pub async fn create_user(&self, new: &NewProfile, token: &IdToken) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/users"))
            .bearer_auth(&token.access_token)
            .json(new);
        execute_no_body(request).await
    }

    /// Replace the mutable profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the update.
    pub async fn update_user(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        token: &IdToken,
    ) -> Result<Profile, ApiError> {
        let request = self
            .inner
            .client
            .put(self.url(&format!("/api/users/{id}")))
            .bearer_auth(&token.access_token)
            .json(update);
        execute(request).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wishlists
    // ─────────────────────────────────────────────────────────────────────────

    /// List the current user's wishlists in display order.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn list_wishlists(&self, token: &IdToken) -> Result<Vec<Wishlist>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url("/api/wishlists"))
            .bearer_auth(&token.access_token);
        execute(request).await
    }

    /// Create a wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the create.
    pub async fn create_wishlist(
        &self,
        new: &NewWishlist,
        token: &IdToken,
    ) -> Result<Wishlist, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/wishlists"))
            .bearer_auth(&token.access_token)
            .json(new);
        execute(request).await
    }

    /// Rename a wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the rename.
    pub async fn rename_wishlist(
        &self,
        id: &WishlistId,
        name: &str,
        token: &IdToken,
    ) -> Result<Wishlist, ApiError> {
        let request = self
            .inner
            .client
            .patch(self.url(&format!("/api/wishlists/{id}")))
            .bearer_auth(&token.access_token)
            .json(&serde_json::json!({ "name": name }));
        execute(request).await
    }

    /// Persist a full wishlist ordering as an explicit `[{id, order}]` list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines; the caller rolls back its
    /// local order in that case.
    pub async fn reorder_wishlists(
        &self,
        ordering: &[ReorderEntry],
        token: &IdToken,
    ) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .put(self.url("/api/wishlists/reorder"))
            .bearer_auth(&token.access_token)
            .json(ordering);
        execute_no_body(request).await
    }

    /// Delete a wishlist and everything in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the delete.
    pub async fn delete_wishlist(&self, id: &WishlistId, token: &IdToken) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .delete(self.url(&format!("/api/wishlists/{id}")))
            .bearer_auth(&token.access_token);
        execute_no_body(request).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wishlist items
    // ─────────────────────────────────────────────────────────────────────────

    /// List the items of one wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn list_items(
        &self,
        wishlist_id: &WishlistId,
        token: &IdToken,
    ) -> Result<Vec<WishlistItem>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url(&format!("/api/wishlist-items/{wishlist_id}")))
            .bearer_auth(&token.access_token);
        execute(request).await
    }

    /// Add an item; returns the server's copy including its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the create.
    pub async fn create_item(
        &self,
        new: &NewItem,
        token: &IdToken,
    ) -> Result<WishlistItem, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/wishlist-items"))
            .bearer_auth(&token.access_token)
            .json(new);
        execute(request).await
    }

    /// Replace an item's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the update.
    pub async fn update_item(
        &self,
        id: &ItemId,
        update: &ItemUpdate,
        token: &IdToken,
    ) -> Result<WishlistItem, ApiError> {
        let request = self
            .inner
            .client
            .patch(self.url(&format!("/api/wishlist-items/{id}")))
            .bearer_auth(&token.access_token)
            .json(update);
        execute(request).await
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the delete.
    pub async fn delete_item(&self, id: &ItemId, token: &IdToken) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .delete(self.url(&format!("/api/wishlist-items/{id}")))
            .bearer_auth(&token.access_token);
        execute_no_body(request).await
    }

    /// Toggle reservation state: reserve if free, unreserve if held by the
    /// caller. The backend enforces the reservation rules and answers with
    /// [`ApiError::Rejected`] carrying its user-facing message when it
    /// declines (e.g., a second reservation in the same wishlist).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines the toggle.
    pub async fn toggle_reservation(
        &self,
        id: &ItemId,
        token: &IdToken,
    ) -> Result<WishlistItem, ApiError> {
        let request = self
            .inner
            .client
            .patch(self.url(&format!("/api/wishlist-items/{id}/reserve")))
            .bearer_auth(&token.access_token);
        execute(request).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Share links
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate (or return the existing) share code for a wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend declines.
    pub async fn generate_share_link(
        &self,
        wishlist_id: &WishlistId,
        token: &IdToken,
    ) -> Result<ShareLink, ApiError> {
        let request = self
            .inner
            .client
            .post(self.url(&format!("/api/shared-links/{wishlist_id}/generate")))
            .bearer_auth(&token.access_token);
        execute(request).await
    }

    /// Resolve a share code to a read view of the wishlist.
    ///
    /// Anonymous by default; passing a token lets the server personalize the
    /// response (e.g., mark items reserved by the caller).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown or expired codes.
    pub async fn resolve_share_code(
        &self,
        code: &ShareCode,
        token: Option<&IdToken>,
    ) -> Result<SharedWishlist, ApiError> {
        let mut request = self
            .inner
            .client
            .get(self.url(&format!("/api/shared-links/{code}")));
        if let Some(token) = token {
            request = request.bearer_auth(&token.access_token);
        }
        execute(request).await
    }

    /// List wishlists other users have shared with the current user,
    /// grouped by owner.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn shared_with_me(
        &self,
        token: &IdToken,
    ) -> Result<Vec<SharedWithMeGroup>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.url("/api/shared-links/shared-with-me"))
            .bearer_auth(&token.access_token);
        execute(request).await
    }
}

// =============================================================================
// Request execution
// =============================================================================

async fn execute<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let body = check_status(request.send().await?).await?;
    Ok(serde_json::from_str(&body)?)
}

async fn execute_no_body(request: reqwest::RequestBuilder) -> Result<(), ApiError> {
    check_status(request.send().await?).await?;
    Ok(())
}

/// Map the response status into the error taxonomy, returning the body text
/// on success for the caller to parse.
async fn check_status(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        return Ok(text);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }

    // Domain rejections carry a user-facing message in the error body.
    if status == reqwest::StatusCode::CONFLICT || status == reqwest::StatusCode::FORBIDDEN {
        if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
            return Err(ApiError::Rejected(body.error));
        }
    }

    tracing::error!(
        status = %status,
        body = %text.chars().take(500).collect::<String>(),
        "Gifty backend returned non-success status"
    );

    Err(ApiError::Status {
        status,
        body: text.chars().take(200).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        assert_eq!(ApiError::NotFound.to_string(), "not found");
        assert_eq!(
            ApiError::Rejected("You can only reserve 1 item per wishlist.".to_string()).to_string(),
            "You can only reserve 1 item per wishlist."
        );
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let api = GiftyApi::new(&url::Url::parse("http://localhost:7066/").expect("valid url"));
        assert_eq!(api.url("/api/wishlists"), "http://localhost:7066/api/wishlists");
    }
}
