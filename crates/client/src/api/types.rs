//! Wire types for the Gifty backend REST API.
//!
//! Field names mirror the backend's camelCase JSON exactly; everything here
//! is an advisory copy of server-authoritative state.

use serde::{Deserialize, Serialize};

use gifty_core::{Email, ItemId, ShareCode, UserId, WishlistId};

/// Backend user record, keyed by the identity provider's subject ID.
///
/// Exactly one profile exists per identity; it is created lazily on first
/// authenticated access (see the session manager's provisioning path).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    pub email: Email,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Payload for lazy profile provisioning.
///
/// Fields are denormalized from the identity at creation time; the backend
/// fills in the email from the bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub id: UserId,
    pub username: String,
    pub avatar_url: String,
    pub bio: String,
}

/// Mutable profile fields for self-service updates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: String,
    pub bio: String,
    pub avatar_url: String,
}

/// A named, ordered collection of items owned by one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: WishlistId,
    pub user_id: UserId,
    pub name: String,
    pub is_public: bool,
    /// Display position among the owner's wishlists (zero-based).
    #[serde(default)]
    pub order: u32,
}

/// Payload for creating a wishlist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWishlist {
    pub user_id: UserId,
    pub name: String,
    pub is_public: bool,
}

/// One entry of the explicit `[{id, order}]` reorder payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
    pub id: WishlistId,
    pub order: u32,
}

/// A single wishlist item with its reservation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: ItemId,
    pub wishlist_id: WishlistId,
    pub name: String,
    pub link: String,
    pub is_reserved: bool,
    /// Profile that holds the reservation, if any. The backend enforces
    /// at most one reservation per item and at most one reservation per
    /// reserver within a wishlist; the client only surfaces those rules.
    #[serde(default)]
    pub reserved_by: Option<UserId>,
}

/// Payload for adding an item to a wishlist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub wishlist_id: WishlistId,
    pub name: String,
    pub link: String,
}

/// Full replacement of an item's mutable fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: String,
    pub link: String,
}

/// Response to generating a share link.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub share_code: ShareCode,
}

/// A wishlist resolved from a share code: the list, its items, and the
/// owner's public display fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWishlist {
    pub id: WishlistId,
    pub name: String,
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

/// Wishlists shared with the current user, grouped by owner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWithMeGroup {
    pub owner_id: UserId,
    pub owner_name: String,
    #[serde(default)]
    pub owner_avatar: String,
    pub wishlists: Vec<SharedWishlist>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_deserializes_backend_json() {
        let item: WishlistItem = serde_json::from_str(
            r#"{
                "id": "i-1",
                "wishlistId": "w-1",
                "name": "Book",
                "link": "http://x",
                "isReserved": true,
                "reservedBy": "u-2"
            }"#,
        )
        .expect("valid payload");

        assert_eq!(item.reserved_by, Some(UserId::new("u-2")));
        assert!(item.is_reserved);
    }

    #[test]
    fn test_reorder_entry_serializes_camel_case() {
        let entry = ReorderEntry {
            id: WishlistId::new("w-1"),
            order: 2,
        };
        let json = serde_json::to_string(&entry).expect("serializable");
        assert_eq!(json, r#"{"id":"w-1","order":2}"#);
    }

    #[test]
    fn test_shared_wishlist_defaults_missing_items() {
        let shared: SharedWishlist =
            serde_json::from_str(r#"{"id":"w-1","name":"Birthday","userId":"u-1"}"#)
                .expect("valid payload");
        assert!(shared.items.is_empty());
    }
}
