//! Share link generation, anonymous and personalized resolution, and the
//! shared-with-me listing.

use gifty_core::{ShareCode, UserId, WishlistId};

use gifty_client::share::{self, ShareError, ShareResolver, ShareState};
use gifty_client::store::WishlistStore;
use gifty_client::SessionManager;
use gifty_integration_tests::TestContext;

async fn shared_wishlist(ctx: &TestContext) -> (SessionManager, WishlistId, ShareCode) {
    ctx.seed_user("u-owner", "owner@example.com", "pw-owner", Some("Owner"));
    let owner = ctx.signed_in_session("owner@example.com", "pw-owner").await;

    let mut store = WishlistStore::new(ctx.api());
    store.refresh(&owner).await.expect("refresh");
    store
        .create_wishlist(&owner, "Birthday")
        .await
        .expect("create wishlist");
    let wid = store.wishlists()[0].id.clone();
    store
        .add_item(&owner, &wid, "Book", "http://x")
        .await
        .expect("add item");
    let code = store
        .generate_share_link(&owner, &wid)
        .await
        .expect("share code");
    (owner, wid, code)
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn test_anonymous_resolution_shows_the_wishlist() {
    let ctx = TestContext::start().await;
    let (_owner, wid, code) = shared_wishlist(&ctx).await;

    let mut resolver = ShareResolver::new(ctx.api(), code);
    resolver.resolve(None).await.expect("anonymous resolve");

    let ShareState::Resolved(wishlist) = resolver.state() else {
        panic!("expected a resolved share view");
    };
    assert_eq!(wishlist.id, wid);
    assert_eq!(wishlist.user_id, UserId::new("u-owner"));
    assert_eq!(wishlist.items.len(), 1);
    assert_eq!(wishlist.items[0].name, "Book");
}

#[tokio::test]
async fn test_unknown_code_resolves_to_invalid_not_loading() {
    let ctx = TestContext::start().await;
    let code = ShareCode::new("no-such-code").expect("non-empty code");

    let mut resolver = ShareResolver::new(ctx.api(), code);
    resolver.resolve(None).await.expect("resolution completes");

    assert!(matches!(resolver.state(), ShareState::InvalidOrExpired));
}

#[tokio::test]
async fn test_repeat_generation_returns_the_same_code() {
    let ctx = TestContext::start().await;
    let (owner, wid, code) = shared_wishlist(&ctx).await;

    let store = {
        let mut store = WishlistStore::new(ctx.api());
        store.refresh(&owner).await.expect("refresh");
        store
    };
    let again = store
        .generate_share_link(&owner, &wid)
        .await
        .expect("second generation");
    assert_eq!(again, code);
}

// ============================================================================
// Guests
// ============================================================================

#[tokio::test]
async fn test_guest_reservation_refused_before_any_network_call() {
    let ctx = TestContext::start().await;
    let (_owner, _wid, code) = shared_wishlist(&ctx).await;

    let mut resolver = ShareResolver::new(ctx.api(), code);
    resolver.resolve(None).await.expect("anonymous resolve");
    let ShareState::Resolved(wishlist) = resolver.state() else {
        panic!("expected a resolved share view");
    };
    let item_id = wishlist.items[0].id.clone();

    let err = resolver
        .request_reservation_toggle(None, &item_id)
        .expect_err("guests cannot reserve");
    assert!(matches!(err, ShareError::SignInRequired));
}

// ============================================================================
// Shared with me
// ============================================================================

#[tokio::test]
async fn test_shared_with_me_groups_by_owner() {
    let ctx = TestContext::start().await;
    let (_owner, wid, code) = shared_wishlist(&ctx).await;
    ctx.seed_user("u-bea", "bea@example.com", "pw-bea", Some("Bea"));

    let bea = ctx.signed_in_session("bea@example.com", "pw-bea").await;
    let mut resolver = ShareResolver::new(ctx.api(), code);
    resolver.resolve(Some(&bea)).await.expect("signed-in resolve");

    let groups = share::shared_with_me(&ctx.api(), &bea)
        .await
        .expect("shared-with-me listing");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].owner_id, UserId::new("u-owner"));
    assert_eq!(groups[0].owner_name, "Owner");
    assert_eq!(groups[0].wishlists.len(), 1);
    assert_eq!(groups[0].wishlists[0].id, wid);
}
