//! Client-side permission derivation for wishlist items.
//!
//! Mirrors, but never replaces, the backend's enforcement: the point is to
//! disable actions before a doomed network call, not to be the authority.

use gifty_core::UserId;

use crate::api::WishlistItem;

/// What the current viewer may do with one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPermissions {
    /// The viewer owns the wishlist containing this item.
    pub is_owner: bool,
    /// No signed-in viewer.
    pub is_guest: bool,
    /// The viewer may place a reservation.
    pub can_reserve: bool,
    /// The viewer may release their own reservation.
    pub can_unreserve: bool,
    /// The viewer may edit the item (owner only).
    pub can_edit: bool,
    /// The viewer may delete the item (owner only).
    pub can_delete: bool,
}

impl ItemPermissions {
    /// Derive permissions for `current_user` viewing `item` in a wishlist
    /// owned by `owner`.
    #[must_use]
    pub fn derive(owner: &UserId, current_user: Option<&UserId>, item: &WishlistItem) -> Self {
        let is_guest = current_user.is_none();
        let is_owner = current_user == Some(owner);
        let is_reserver = item.reserved_by.as_ref() == current_user && current_user.is_some();

        Self {
            is_owner,
            is_guest,
            can_reserve: !is_guest && !item.is_reserved && !is_owner,
            can_unreserve: !is_guest && item.is_reserved && is_reserver,
            can_edit: is_owner,
            can_delete: is_owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gifty_core::{ItemId, WishlistId};

    fn item(reserved_by: Option<&str>) -> WishlistItem {
        WishlistItem {
            id: ItemId::new("i-1"),
            wishlist_id: WishlistId::new("w-1"),
            name: "Book".to_string(),
            link: "http://x".to_string(),
            is_reserved: reserved_by.is_some(),
            reserved_by: reserved_by.map(UserId::new),
        }
    }

    const OWNER: &str = "owner";
    const VIEWER: &str = "viewer";
    const OTHER: &str = "other";

    fn derive(current: Option<&str>, reserved_by: Option<&str>) -> ItemPermissions {
        let owner = UserId::new(OWNER);
        let current = current.map(UserId::new);
        ItemPermissions::derive(&owner, current.as_ref(), &item(reserved_by))
    }

    #[test]
    fn test_guest_can_do_nothing() {
        let perms = derive(None, None);
        assert!(perms.is_guest);
        assert!(!perms.can_reserve && !perms.can_unreserve);
        assert!(!perms.can_edit && !perms.can_delete);
    }

    #[test]
    fn test_viewer_can_reserve_free_item() {
        let perms = derive(Some(VIEWER), None);
        assert!(perms.can_reserve);
        assert!(!perms.can_unreserve);
    }

    #[test]
    fn test_reserver_can_unreserve_own_reservation() {
        let perms = derive(Some(VIEWER), Some(VIEWER));
        assert!(!perms.can_reserve);
        assert!(perms.can_unreserve);
    }

    #[test]
    fn test_cannot_touch_someone_elses_reservation() {
        let perms = derive(Some(VIEWER), Some(OTHER));
        assert!(!perms.can_reserve);
        assert!(!perms.can_unreserve);
    }

    #[test]
    fn test_owner_never_reserves_regardless_of_state() {
        for reserved_by in [None, Some(VIEWER), Some(OWNER)] {
            let perms = derive(Some(OWNER), reserved_by);
            assert!(perms.is_owner);
            assert!(!perms.can_reserve);
            assert!(!perms.can_unreserve);
            assert!(perms.can_edit && perms.can_delete);
        }
    }

    #[test]
    fn test_reserve_and_unreserve_never_both_true() {
        for current in [None, Some(OWNER), Some(VIEWER), Some(OTHER)] {
            for reserved_by in [None, Some(OWNER), Some(VIEWER), Some(OTHER)] {
                let perms = derive(current, reserved_by);
                assert!(
                    !(perms.can_reserve && perms.can_unreserve),
                    "both true for current={current:?} reserved_by={reserved_by:?}"
                );
            }
        }
    }
}
