//! Wishlist and item store.
//!
//! Owns advisory caches of the current user's wishlists and their items,
//! and runs every mutation against the backend: create/rename/reorder/
//! delete for wishlists, add/edit/delete for items, and the reservation
//! toggle. Local state is refreshed from the server after each mutation and
//! left untouched when a call fails; there is no retry and no offline queue.
//!
//! Destructive operations (wishlist delete, item delete, reservation
//! toggle) are two-phase: callers first request an intent describing what
//! will happen, then confirm it. The intent carries the user-facing prompt
//! so reserve and unreserve get distinct copy.

pub mod permissions;

pub use permissions::ItemPermissions;

use std::collections::HashMap;

use thiserror::Error;

use gifty_core::{ItemId, ShareCode, UserId, WishlistId};

use crate::api::{
    ApiError, GiftyApi, ItemUpdate, NewItem, NewWishlist, ReorderEntry, Wishlist, WishlistItem,
};
use crate::notice::Notice;
use crate::session::{SessionError, SessionManager};

/// Errors surfaced by store operations.
///
/// Mutating callers convert these into [`Notice`]s at the boundary; nothing
/// here is meant to reach a panic or an unhandled rejection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Client-side validation: blank wishlist name.
    #[error("wishlist name cannot be empty")]
    BlankName,

    /// Client-side validation: blank item name or link.
    #[error("item name and link are both required")]
    BlankItemField,

    /// The wishlist is not in the local cache.
    #[error("unknown wishlist")]
    UnknownWishlist,

    /// The item is not in the local cache.
    #[error("unknown item")]
    UnknownItem,

    /// Permission derivation refused the action before any network call.
    #[error("{0}")]
    NotPermitted(&'static str),

    /// A fetch completed after the store was reset; its result was dropped.
    #[error("stale fetch discarded")]
    Stale,

    /// Session failure (token minting, not signed in).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Backend failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl StoreError {
    /// User-facing notice for this failure.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::BlankName => Notice::error("Please enter a wishlist name."),
            Self::BlankItemField => Notice::error("Please enter both item name and link."),
            // The backend's domain rejections carry their own copy, e.g.
            // "You can only reserve 1 item per wishlist."
            Self::Api(ApiError::Rejected(message)) => Notice::error(message.clone()),
            Self::NotPermitted(reason) => Notice::error(*reason),
            Self::Session(SessionError::NotSignedIn) => {
                Notice::error("You need to be signed in to do that.")
            }
            _ => Notice::error("Something went wrong. Please try again."),
        }
    }
}

/// Intent to delete a wishlist or an item; confirm to execute.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    target: DeleteTarget,
}

#[derive(Debug, Clone)]
enum DeleteTarget {
    Wishlist { id: WishlistId, name: String },
    Item { id: ItemId, name: String },
}

impl PendingDelete {
    /// Confirmation prompt for this deletion.
    #[must_use]
    pub fn prompt(&self) -> String {
        match &self.target {
            DeleteTarget::Wishlist { name, .. } => {
                format!("Delete the wishlist \"{name}\" and everything in it?")
            }
            DeleteTarget::Item { name, .. } => format!("Delete \"{name}\"?"),
        }
    }
}

/// The direction a reservation toggle will take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    Reserve,
    Unreserve,
}

/// Intent to toggle a reservation; confirm to execute.
#[derive(Debug, Clone)]
pub struct PendingToggle {
    item_id: ItemId,
    item_name: String,
    action: ReservationAction,
}

impl PendingToggle {
    /// The item this toggle targets.
    #[must_use]
    pub const fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    /// Which way the toggle will go.
    #[must_use]
    pub const fn action(&self) -> ReservationAction {
        self.action
    }

    /// Confirmation prompt, with distinct copy for reserve vs unreserve.
    #[must_use]
    pub fn prompt(&self) -> String {
        match self.action {
            ReservationAction::Reserve => format!(
                "Reserve \"{}\"? Other gifters will see it as taken.",
                self.item_name
            ),
            ReservationAction::Unreserve => {
                format!("Remove your reservation for \"{}\"?", self.item_name)
            }
        }
    }
}

/// Store for the current user's wishlists and their items.
pub struct WishlistStore {
    api: GiftyApi,
    wishlists: Vec<Wishlist>,
    items: HashMap<WishlistId, Vec<WishlistItem>>,
    /// Bumped by [`WishlistStore::reset`]; fetches started before a reset
    /// discard their results instead of writing into the fresh state.
    generation: u64,
}

impl WishlistStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(api: GiftyApi) -> Self {
        Self {
            api,
            wishlists: Vec::new(),
            items: HashMap::new(),
            generation: 0,
        }
    }

    /// Cached wishlists in display order.
    #[must_use]
    pub fn wishlists(&self) -> &[Wishlist] {
        &self.wishlists
    }

    /// Cached items of one wishlist.
    #[must_use]
    pub fn items(&self, wishlist_id: &WishlistId) -> &[WishlistItem] {
        self.items.get(wishlist_id).map_or(&[], Vec::as_slice)
    }

    /// Drop all cached state, invalidating any in-flight fetch.
    ///
    /// Call on sign-out or when the owning view goes away.
    pub fn reset(&mut self) {
        self.wishlists.clear();
        self.items.clear();
        self.generation += 1;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the authoritative wishlist collection and all item lists.
    ///
    /// # Errors
    ///
    /// On failure the previously cached state is kept (stale but
    /// consistent) rather than cleared.
    pub async fn refresh(&mut self, session: &SessionManager) -> Result<(), StoreError> {
        let generation = self.generation;
        let token = session.fresh_token().await?;
        let wishlists = self.api.list_wishlists(&token).await?;

        let mut items = HashMap::new();
        for wishlist in &wishlists {
            let token = session.fresh_token().await?;
            let list = self.api.list_items(&wishlist.id, &token).await?;
            items.insert(wishlist.id.clone(), list);
        }

        self.apply_fetched(generation, wishlists, items)
    }

    /// Install fetched state unless the store was reset mid-flight.
    fn apply_fetched(
        &mut self,
        generation: u64,
        wishlists: Vec<Wishlist>,
        items: HashMap<WishlistId, Vec<WishlistItem>>,
    ) -> Result<(), StoreError> {
        if generation != self.generation {
            tracing::debug!("discarding fetch result from before a store reset");
            return Err(StoreError::Stale);
        }
        self.wishlists = wishlists;
        self.items = items;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wishlist mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a wishlist, then re-fetch the authoritative collection.
    ///
    /// # Errors
    ///
    /// Rejects blank or whitespace-only names before any network call.
    pub async fn create_wishlist(
        &mut self,
        session: &SessionManager,
        name: &str,
    ) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::BlankName);
        }
        let owner = session
            .current_user_id()
            .ok_or(SessionError::NotSignedIn)?
            .clone();

        let token = session.fresh_token().await?;
        let created = self
            .api
            .create_wishlist(
                &NewWishlist {
                    user_id: owner,
                    name: name.to_string(),
                    is_public: false,
                },
                &token,
            )
            .await?;

        // Append locally for immediate feedback, then defer to the server's
        // view of the collection.
        self.items.insert(created.id.clone(), Vec::new());
        self.wishlists.push(created);
        self.refresh(session).await
    }

    /// Rename a wishlist, then re-fetch. No optimistic update.
    ///
    /// # Errors
    ///
    /// Rejects blank names; backend failures leave local state unchanged.
    pub async fn rename_wishlist(
        &mut self,
        session: &SessionManager,
        id: &WishlistId,
        name: &str,
    ) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::BlankName);
        }

        let token = session.fresh_token().await?;
        self.api.rename_wishlist(id, name, &token).await?;
        self.refresh(session).await
    }

    /// Move the wishlist at `from` to position `to` and persist the full
    /// ordering.
    ///
    /// The local order changes first for immediate feedback; if persisting
    /// fails, the previous order is restored so the UI never silently
    /// diverges from the server.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range indices or a declined persist.
    pub async fn reorder_wishlists(
        &mut self,
        session: &SessionManager,
        from: usize,
        to: usize,
    ) -> Result<(), StoreError> {
        if from >= self.wishlists.len() || to >= self.wishlists.len() {
            return Err(StoreError::UnknownWishlist);
        }

        let previous = self.wishlists.clone();
        splice_move(&mut self.wishlists, from, to);
        let payload = reorder_payload(&self.wishlists);

        let persist: Result<(), StoreError> = async {
            let token = session.fresh_token().await?;
            Ok(self.api.reorder_wishlists(&payload, &token).await?)
        }
        .await;

        if let Err(e) = persist {
            self.wishlists = previous;
            return Err(e);
        }
        Ok(())
    }

    /// First phase of wishlist deletion: capture the intent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownWishlist`] if the wishlist is not cached.
    pub fn request_delete_wishlist(&self, id: &WishlistId) -> Result<PendingDelete, StoreError> {
        let wishlist = self
            .wishlists
            .iter()
            .find(|w| &w.id == id)
            .ok_or(StoreError::UnknownWishlist)?;

        Ok(PendingDelete {
            target: DeleteTarget::Wishlist {
                id: wishlist.id.clone(),
                name: wishlist.name.clone(),
            },
        })
    }

    /// First phase of item deletion: capture the intent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownItem`] if the item is not cached.
    pub fn request_delete_item(&self, id: &ItemId) -> Result<PendingDelete, StoreError> {
        let item = self
            .find_item(id)
            .ok_or(StoreError::UnknownItem)?;

        Ok(PendingDelete {
            target: DeleteTarget::Item {
                id: item.id.clone(),
                name: item.name.clone(),
            },
        })
    }

    /// Second phase of deletion: execute a confirmed intent.
    ///
    /// Deleting a wishlist purges the wishlist entry and its entire cached
    /// item collection together.
    ///
    /// # Errors
    ///
    /// Backend failures leave local state unchanged.
    pub async fn confirm_delete(
        &mut self,
        session: &SessionManager,
        pending: PendingDelete,
    ) -> Result<(), StoreError> {
        let token = session.fresh_token().await?;
        match pending.target {
            DeleteTarget::Wishlist { id, .. } => {
                self.api.delete_wishlist(&id, &token).await?;
                self.wishlists.retain(|w| w.id != id);
                self.items.remove(&id);
            }
            DeleteTarget::Item { id, .. } => {
                self.api.delete_item(&id, &token).await?;
                for list in self.items.values_mut() {
                    list.retain(|i| i.id != id);
                }
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Item mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Add an item; the server's copy (with its assigned ID) is appended to
    /// the cache.
    ///
    /// # Errors
    ///
    /// Rejects a blank name or link before any network call.
    pub async fn add_item(
        &mut self,
        session: &SessionManager,
        wishlist_id: &WishlistId,
        name: &str,
        link: &str,
    ) -> Result<(), StoreError> {
        let (name, link) = (name.trim(), link.trim());
        if name.is_empty() || link.is_empty() {
            return Err(StoreError::BlankItemField);
        }

        let token = session.fresh_token().await?;
        let created = self
            .api
            .create_item(
                &NewItem {
                    wishlist_id: wishlist_id.clone(),
                    name: name.to_string(),
                    link: link.to_string(),
                },
                &token,
            )
            .await?;

        self.items
            .entry(wishlist_id.clone())
            .or_default()
            .push(created);
        Ok(())
    }

    /// Replace an item's name and link; the server's response is merged
    /// into the cache by ID.
    ///
    /// # Errors
    ///
    /// Rejects blank fields; backend failures leave local state unchanged.
    pub async fn edit_item(
        &mut self,
        session: &SessionManager,
        id: &ItemId,
        name: &str,
        link: &str,
    ) -> Result<(), StoreError> {
        let (name, link) = (name.trim(), link.trim());
        if name.is_empty() || link.is_empty() {
            return Err(StoreError::BlankItemField);
        }

        let token = session.fresh_token().await?;
        let updated = self
            .api
            .update_item(
                id,
                &ItemUpdate {
                    name: name.to_string(),
                    link: link.to_string(),
                },
                &token,
            )
            .await?;

        self.merge_item(updated);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reservations
    // ─────────────────────────────────────────────────────────────────────────

    /// First phase of a reservation toggle: derive permissions and capture
    /// the intent.
    ///
    /// Refused here, without any network call, when the viewer is a guest,
    /// the owner, or the item is reserved by someone else.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotPermitted`] with user-facing copy on refusal.
    pub fn request_reservation_toggle(
        &self,
        session: &SessionManager,
        id: &ItemId,
    ) -> Result<PendingToggle, StoreError> {
        let item = self.find_item(id).ok_or(StoreError::UnknownItem)?;
        let owner = self
            .wishlists
            .iter()
            .find(|w| w.id == item.wishlist_id)
            .map(|w| w.user_id.clone())
            .ok_or(StoreError::UnknownWishlist)?;

        request_toggle(&owner, session.current_user_id(), item)
    }

    /// Second phase: execute a confirmed toggle.
    ///
    /// The one-reservation-per-wishlist rule stays server-side; when the
    /// backend declines, its message comes back as
    /// [`ApiError::Rejected`] for the caller to surface.
    ///
    /// # Errors
    ///
    /// Backend failures leave local state unchanged.
    pub async fn confirm_reservation_toggle(
        &mut self,
        session: &SessionManager,
        pending: PendingToggle,
    ) -> Result<(), StoreError> {
        let token = session.fresh_token().await?;
        let updated = self.api.toggle_reservation(&pending.item_id, &token).await?;
        self.merge_item(updated);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Share links
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate (or fetch the existing) share code for a wishlist.
    ///
    /// # Errors
    ///
    /// Backend failures are returned unchanged; nothing is cached.
    pub async fn generate_share_link(
        &self,
        session: &SessionManager,
        wishlist_id: &WishlistId,
    ) -> Result<ShareCode, StoreError> {
        let token = session.fresh_token().await?;
        let link = self.api.generate_share_link(wishlist_id, &token).await?;
        Ok(link.share_code)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cache helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn find_item(&self, id: &ItemId) -> Option<&WishlistItem> {
        self.items.values().flatten().find(|i| &i.id == id)
    }

    fn merge_item(&mut self, updated: WishlistItem) {
        if let Some(list) = self.items.get_mut(&updated.wishlist_id) {
            if let Some(slot) = list.iter_mut().find(|i| i.id == updated.id) {
                *slot = updated;
            } else {
                list.push(updated);
            }
        }
    }
}

/// Derive the toggle intent for an item, shared by the store and the share
/// resolver.
pub(crate) fn request_toggle(
    owner: &UserId,
    current_user: Option<&UserId>,
    item: &WishlistItem,
) -> Result<PendingToggle, StoreError> {
    let perms = ItemPermissions::derive(owner, current_user, item);

    let action = if perms.can_reserve {
        ReservationAction::Reserve
    } else if perms.can_unreserve {
        ReservationAction::Unreserve
    } else if perms.is_owner {
        return Err(StoreError::NotPermitted(
            "You can't reserve items on your own wishlist.",
        ));
    } else if perms.is_guest {
        return Err(StoreError::NotPermitted(
            "You need to be signed in to reserve items.",
        ));
    } else {
        return Err(StoreError::NotPermitted(
            "This item is already reserved by someone else.",
        ));
    };

    Ok(PendingToggle {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        action,
    })
}

/// Move the element at `from` to `to`, shifting everything between.
fn splice_move<T>(list: &mut Vec<T>, from: usize, to: usize) {
    let entry = list.remove(from);
    list.insert(to, entry);
}

/// Build the explicit `[{id, order}]` payload from the local order.
fn reorder_payload(wishlists: &[Wishlist]) -> Vec<ReorderEntry> {
    wishlists
        .iter()
        .enumerate()
        .map(|(position, wishlist)| ReorderEntry {
            id: wishlist.id.clone(),
            order: u32::try_from(position).unwrap_or(u32::MAX),
        })
        .collect()
}

/// Build the public share URL for a generated code.
#[must_use]
pub fn share_url(app_base_url: &str, code: &ShareCode) -> String {
    format!("{}/shared/{code}", app_base_url.trim_end_matches('/'))
}
