//! The reservation lifecycle end to end: an owner shares a wishlist, one
//! friend reserves an item, another is refused, the reservation is
//! released, and the second friend succeeds.

use gifty_core::{ItemId, ShareCode, UserId};

use gifty_client::api::ApiError;
use gifty_client::share::{ShareError, ShareResolver, ShareState};
use gifty_client::store::{ReservationAction, StoreError, WishlistStore};
use gifty_client::SessionManager;
use gifty_integration_tests::{RESERVATION_LIMIT_MESSAGE, TestContext};

struct Scenario {
    ctx: TestContext,
    code: ShareCode,
    book: ItemId,
    game: ItemId,
}

/// Owner with a shared "Birthday" wishlist holding two items, plus two
/// seeded friends (Bea and Cal).
async fn scenario() -> Scenario {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-owner", "owner@example.com", "pw-owner", Some("Owner"));
    ctx.seed_user("u-bea", "bea@example.com", "pw-bea", Some("Bea"));
    ctx.seed_user("u-cal", "cal@example.com", "pw-cal", Some("Cal"));

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
        .expect("add book");
    store
        .add_item(&owner, &wid, "Game", "http://y")
        .await
        .expect("add game");
    let book = store.items(&wid)[0].id.clone();
    let game = store.items(&wid)[1].id.clone();
    let code = store
        .generate_share_link(&owner, &wid)
        .await
        .expect("share code");

    Scenario {
        ctx,
        code,
        book,
        game,
    }
}

async fn resolved_view(s: &Scenario, session: &SessionManager) -> ShareResolver {
    let mut resolver = ShareResolver::new(s.ctx.api(), s.code.clone());
    resolver.resolve(Some(session)).await.expect("resolve");
    resolver
}

fn item_in<'a>(view: &'a ShareResolver, id: &ItemId) -> &'a gifty_client::api::WishlistItem {
    let ShareState::Resolved(wishlist) = view.state() else {
        panic!("share view not resolved");
    };
    wishlist
        .items
        .iter()
        .find(|i| &i.id == id)
        .expect("item in shared view")
}

// ============================================================================
// Reserve / release
// ============================================================================

#[tokio::test]
async fn test_friend_reserves_then_releases() {
    let s = scenario().await;
    let bea = s.ctx.signed_in_session("bea@example.com", "pw-bea").await;
    let mut view = resolved_view(&s, &bea).await;

    let pending = view
        .request_reservation_toggle(Some(&bea), &s.book)
        .expect("reserve intent");
    assert_eq!(pending.action(), ReservationAction::Reserve);
    view.confirm_reservation_toggle(&bea, pending)
        .await
        .expect("reserve");

    let book = item_in(&view, &s.book);
    assert!(book.is_reserved);
    assert_eq!(book.reserved_by, Some(UserId::new("u-bea")));

    let pending = view
        .request_reservation_toggle(Some(&bea), &s.book)
        .expect("release intent");
    assert_eq!(pending.action(), ReservationAction::Unreserve);
    view.confirm_reservation_toggle(&bea, pending)
        .await
        .expect("release");

    let book = item_in(&view, &s.book);
    assert!(!book.is_reserved);
    assert_eq!(book.reserved_by, None);
}

#[tokio::test]
async fn test_released_item_becomes_reservable_by_another_friend() {
    let s = scenario().await;
    let bea = s.ctx.signed_in_session("bea@example.com", "pw-bea").await;
    let mut view = resolved_view(&s, &bea).await;

    let pending = view
        .request_reservation_toggle(Some(&bea), &s.book)
        .expect("reserve intent");
    view.confirm_reservation_toggle(&bea, pending)
        .await
        .expect("reserve");
    let pending = view
        .request_reservation_toggle(Some(&bea), &s.book)
        .expect("release intent");
    view.confirm_reservation_toggle(&bea, pending)
        .await
        .expect("release");

    let cal = s.ctx.signed_in_session("cal@example.com", "pw-cal").await;
    let mut view = resolved_view(&s, &cal).await;
    let pending = view
        .request_reservation_toggle(Some(&cal), &s.book)
        .expect("reserve intent after release");
    view.confirm_reservation_toggle(&cal, pending)
        .await
        .expect("reserve after release");

    assert_eq!(
        item_in(&view, &s.book).reserved_by,
        Some(UserId::new("u-cal"))
    );
}

// ============================================================================
// Refusals
// ============================================================================

#[tokio::test]
async fn test_foreign_reservation_refused_without_a_network_call() {
    let s = scenario().await;
    let bea = s.ctx.signed_in_session("bea@example.com", "pw-bea").await;
    let mut view = resolved_view(&s, &bea).await;
    let pending = view
        .request_reservation_toggle(Some(&bea), &s.book)
        .expect("reserve intent");
    view.confirm_reservation_toggle(&bea, pending)
        .await
        .expect("reserve");

    // Cal sees the item as taken and the intent is refused client-side.
    let cal = s.ctx.signed_in_session("cal@example.com", "pw-cal").await;
    let view = resolved_view(&s, &cal).await;
    let err = view
        .request_reservation_toggle(Some(&cal), &s.book)
        .expect_err("foreign reservation refused");
    assert!(matches!(
        err,
        ShareError::Store(StoreError::NotPermitted(_))
    ));
}

#[tokio::test]
async fn test_second_reservation_in_same_wishlist_carries_backend_copy() {
    let s = scenario().await;
    let bea = s.ctx.signed_in_session("bea@example.com", "pw-bea").await;
    let mut view = resolved_view(&s, &bea).await;
    let pending = view
        .request_reservation_toggle(Some(&bea), &s.book)
        .expect("reserve intent");
    view.confirm_reservation_toggle(&bea, pending)
        .await
        .expect("first reservation");

    // The second item is free, so the intent passes; the backend declines
    // with its own user-facing message.
    let pending = view
        .request_reservation_toggle(Some(&bea), &s.game)
        .expect("intent for free item");
    let err = view
        .confirm_reservation_toggle(&bea, pending)
        .await
        .expect_err("limit enforced server-side");
    match err {
        ShareError::Api(ApiError::Rejected(message)) => {
            assert_eq!(message, RESERVATION_LIMIT_MESSAGE);
        }
        other => panic!("expected backend rejection, got: {other}"),
    }
}

#[tokio::test]
async fn test_shared_item_is_reserved_through_the_share_view_not_the_store() {
    let s = scenario().await;
    let bea = s.ctx.signed_in_session("bea@example.com", "pw-bea").await;

    // Bea's personal store only holds her own wishlists; the shared item
    // is not reachable through it.
    let mut store = WishlistStore::new(s.ctx.api());
    store.refresh(&bea).await.expect("refresh");
    let err = store
        .request_reservation_toggle(&bea, &s.book)
        .expect_err("shared item absent from the personal store");
    assert!(matches!(err, StoreError::UnknownItem));

    // The share view is the path that works.
    let mut view = resolved_view(&s, &bea).await;
    let pending = view
        .request_reservation_toggle(Some(&bea), &s.book)
        .expect("reserve intent through the share view");
    view.confirm_reservation_toggle(&bea, pending)
        .await
        .expect("reserve through the share view");
    assert_eq!(
        item_in(&view, &s.book).reserved_by,
        Some(UserId::new("u-bea"))
    );
}

#[tokio::test]
async fn test_owner_cannot_reserve_from_their_own_store() {
    let s = scenario().await;
    let owner = s
        .ctx
        .signed_in_session("owner@example.com", "pw-owner")
        .await;
    let mut store = WishlistStore::new(s.ctx.api());
    store.refresh(&owner).await.expect("refresh");

    let err = store
        .request_reservation_toggle(&owner, &s.book)
        .expect_err("owner refused");
    assert!(matches!(err, StoreError::NotPermitted(_)));
}
