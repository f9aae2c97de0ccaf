//! Wishlist and item CRUD, ordering persistence, and rollback behavior.

use gifty_client::store::{StoreError, WishlistStore};
use gifty_client::SessionManager;
use gifty_integration_tests::TestContext;

async fn signed_in_owner(ctx: &TestContext) -> (SessionManager, WishlistStore) {
    ctx.seed_user("u-owner", "owner@example.com", "pw-owner", Some("Owner"));
    let session = ctx.signed_in_session("owner@example.com", "pw-owner").await;
    let mut store = WishlistStore::new(ctx.api());
    store.refresh(&session).await.expect("initial refresh");
    (session, store)
}

// ============================================================================
// Wishlist CRUD
// ============================================================================

#[tokio::test]
async fn test_create_rename_delete_wishlist() {
    let ctx = TestContext::start().await;
    let (session, mut store) = signed_in_owner(&ctx).await;

    store
        .create_wishlist(&session, "Birthday")
        .await
        .expect("create");
    assert_eq!(store.wishlists().len(), 1);
    let id = store.wishlists()[0].id.clone();

    store
        .rename_wishlist(&session, &id, "Birthday 2026")
        .await
        .expect("rename");
    assert_eq!(store.wishlists()[0].name, "Birthday 2026");

    let pending = store.request_delete_wishlist(&id).expect("delete intent");
    store
        .confirm_delete(&session, pending)
        .await
        .expect("delete");
    assert!(store.wishlists().is_empty());
}

#[tokio::test]
async fn test_blank_fields_rejected_before_any_network_call() {
    let ctx = TestContext::start().await;
    let (session, mut store) = signed_in_owner(&ctx).await;

    let err = store
        .create_wishlist(&session, "   ")
        .await
        .expect_err("blank name refused");
    assert!(matches!(err, StoreError::BlankName));

    store.create_wishlist(&session, "W").await.expect("create");
    let id = store.wishlists()[0].id.clone();

    let err = store
        .add_item(&session, &id, "Book", "  ")
        .await
        .expect_err("blank link refused");
    assert!(matches!(err, StoreError::BlankItemField));
}

#[tokio::test]
async fn test_deleting_a_wishlist_purges_its_items() {
    let ctx = TestContext::start().await;
    let (session, mut store) = signed_in_owner(&ctx).await;

    store.create_wishlist(&session, "W").await.expect("create");
    let id = store.wishlists()[0].id.clone();
    store
        .add_item(&session, &id, "Book", "http://x")
        .await
        .expect("add");
    assert_eq!(store.items(&id).len(), 1);

    let pending = store.request_delete_wishlist(&id).expect("delete intent");
    store
        .confirm_delete(&session, pending)
        .await
        .expect("delete");

    assert!(store.items(&id).is_empty());
    let mut fresh = WishlistStore::new(ctx.api());
    fresh.refresh(&session).await.expect("refresh");
    assert!(fresh.wishlists().is_empty());
}

// ============================================================================
// Items
// ============================================================================

#[tokio::test]
async fn test_item_add_edit_delete() {
    let ctx = TestContext::start().await;
    let (session, mut store) = signed_in_owner(&ctx).await;

    store.create_wishlist(&session, "W").await.expect("create");
    let wid = store.wishlists()[0].id.clone();

    store
        .add_item(&session, &wid, "Book", "http://x")
        .await
        .expect("add");
    let item_id = store.items(&wid)[0].id.clone();

    store
        .edit_item(&session, &item_id, "Better Book", "http://y")
        .await
        .expect("edit");
    let item = &store.items(&wid)[0];
    assert_eq!(item.name, "Better Book");
    assert_eq!(item.link, "http://y");

    let pending = store.request_delete_item(&item_id).expect("delete intent");
    store
        .confirm_delete(&session, pending)
        .await
        .expect("delete");
    assert!(store.items(&wid).is_empty());
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_reorder_persists_for_a_fresh_client() {
    let ctx = TestContext::start().await;
    let (session, mut store) = signed_in_owner(&ctx).await;

    for name in ["A", "B", "C"] {
        store.create_wishlist(&session, name).await.expect("create");
    }

    store
        .reorder_wishlists(&session, 0, 2)
        .await
        .expect("reorder");
    let names: Vec<&str> = store.wishlists().iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["B", "C", "A"]);

    // A fresh client sees the explicit order, not insertion order.
    let mut fresh = WishlistStore::new(ctx.api());
    fresh.refresh(&session).await.expect("refresh");
    let names: Vec<&str> = fresh.wishlists().iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["B", "C", "A"]);
}

#[tokio::test]
async fn test_reorder_rolls_back_when_persist_fails() {
    let ctx = TestContext::start().await;
    let (session, mut store) = signed_in_owner(&ctx).await;

    for name in ["A", "B", "C"] {
        store.create_wishlist(&session, name).await.expect("create");
    }

    ctx.set_fail_reorder(true);
    let err = store
        .reorder_wishlists(&session, 0, 2)
        .await
        .expect_err("persist declined");
    assert!(matches!(err, StoreError::Api(_)));

    // The optimistic move was undone.
    let names: Vec<&str> = store.wishlists().iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
}
