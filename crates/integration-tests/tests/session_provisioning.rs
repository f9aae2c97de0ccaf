//! Session bootstrap: sign-in paths, lazy profile provisioning, and the
//! route guard, exercised against the in-process mock deployment.

use secrecy::SecretString;

use gifty_client::api::ProfileUpdate;
use gifty_client::identity::IdentityError;
use gifty_client::session::SessionError;
use gifty_client::{RouteDecision, RouteGuard};
use gifty_integration_tests::TestContext;

// ============================================================================
// Provisioning
// ============================================================================

#[tokio::test]
async fn test_first_sign_in_provisions_profile_once() {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-ada", "ada@example.com", "pw-ada", Some("Ada"));

    let mut session = ctx.signed_in_session("ada@example.com", "pw-ada").await;

    let profile = session.profile().expect("profile resolved after sign-in");
    assert_eq!(profile.username, "Ada");
    assert_eq!(ctx.profile_creates("u-ada"), 1);

    // Views remounting re-run the bootstrap; the latch keeps it to one create.
    session.ensure_profile().await.expect("repeat bootstrap");
    session.ensure_profile().await.expect("repeat bootstrap");
    assert_eq!(ctx.profile_creates("u-ada"), 1);
}

#[tokio::test]
async fn test_provisioning_falls_back_to_default_display_fields() {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-anon", "anon@example.com", "pw-anon", None);

    let session = ctx.signed_in_session("anon@example.com", "pw-anon").await;

    let profile = session.profile().expect("profile resolved");
    assert_eq!(profile.username, "New User");
    assert_eq!(profile.avatar_url, "/default-avatar.png");
}

#[tokio::test]
async fn test_existing_profile_is_not_reprovisioned() {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-ada", "ada@example.com", "pw-ada", Some("Ada"));

    let _first = ctx.signed_in_session("ada@example.com", "pw-ada").await;
    let second = ctx.signed_in_session("ada@example.com", "pw-ada").await;

    assert!(second.profile().is_some());
    assert_eq!(ctx.profile_creates("u-ada"), 1);
}

#[tokio::test]
async fn test_latch_resets_when_identity_changes() {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-ada", "ada@example.com", "pw-ada", Some("Ada"));
    ctx.seed_user("u-ben", "ben@example.com", "pw-ben", Some("Ben"));

    let mut session = ctx.signed_in_session("ada@example.com", "pw-ada").await;
    assert_eq!(ctx.profile_creates("u-ada"), 1);

    session.sign_out().await;
    session
        .sign_in_with_password("ben@example.com", "pw-ben")
        .await
        .expect("second identity signs in");

    let profile = session.profile().expect("second profile resolved");
    assert_eq!(profile.username, "Ben");
    assert_eq!(ctx.profile_creates("u-ben"), 1);
}

#[tokio::test]
async fn test_profile_update_round_trips() {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-ada", "ada@example.com", "pw-ada", Some("Ada"));

    let mut session = ctx.signed_in_session("ada@example.com", "pw-ada").await;
    session
        .update_profile(&ProfileUpdate {
            username: "Ada L.".to_string(),
            bio: "Engine builder".to_string(),
            avatar_url: "/ada.png".to_string(),
        })
        .await
        .expect("profile update");

    let profile = session.profile().expect("profile");
    assert_eq!(profile.username, "Ada L.");
    assert_eq!(profile.bio, "Engine builder");

    // The change is server-side, not just a local merge.
    let fresh = ctx.signed_in_session("ada@example.com", "pw-ada").await;
    assert_eq!(fresh.profile().expect("profile").username, "Ada L.");
}

// ============================================================================
// Resume and sign-out
// ============================================================================

#[tokio::test]
async fn test_resume_restores_session_from_refresh_token() {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-ada", "ada@example.com", "pw-ada", Some("Ada"));

    let mut session = ctx.session();
    session.resume(SecretString::from("ref-u-ada")).await;

    assert!(session.identity().is_some());
    assert!(session.profile().is_some());
    assert_eq!(RouteGuard::evaluate(&session.snapshot()), RouteDecision::Admit);
}

#[tokio::test]
async fn test_resume_with_stale_token_degrades_to_signed_out() {
    let ctx = TestContext::start().await;

    let mut session = ctx.session();
    session.resume(SecretString::from("ref-nobody")).await;

    assert!(session.identity().is_none());
    assert!(!session.is_loading());
    assert_eq!(
        RouteGuard::evaluate(&session.snapshot()),
        RouteDecision::RedirectToLogin
    );
}

#[tokio::test]
async fn test_sign_out_revokes_the_refresh_token() {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-ada", "ada@example.com", "pw-ada", Some("Ada"));

    let mut session = ctx.signed_in_session("ada@example.com", "pw-ada").await;
    session.sign_out().await;

    assert!(session.identity().is_none());
    assert!(session.profile().is_none());

    // The revoked token no longer resumes anything.
    let mut resumed = ctx.session();
    resumed.resume(SecretString::from("ref-u-ada")).await;
    assert!(resumed.identity().is_none());
}

// ============================================================================
// Registration and credentials
// ============================================================================

#[tokio::test]
async fn test_duplicate_registration_is_distinguishable() {
    let ctx = TestContext::start().await;

    let mut first = ctx.session();
    first
        .register_with_email("new@example.com", "pw-1", "Newbie")
        .await
        .expect("first registration");

    let mut second = ctx.session();
    let err = second
        .register_with_email("new@example.com", "pw-2", "Other")
        .await
        .expect_err("duplicate email must be rejected");
    assert!(matches!(
        err,
        SessionError::Identity(IdentityError::EmailAlreadyInUse)
    ));
}

#[tokio::test]
async fn test_registered_account_held_at_verification() {
    let ctx = TestContext::start().await;

    let mut session = ctx.session();
    session
        .register_with_email("new@example.com", "pw-1", "Newbie")
        .await
        .expect("registration");

    // Profile exists, but the unverified email keeps protected views closed.
    assert!(session.profile().is_some());
    assert_eq!(
        RouteGuard::evaluate(&session.snapshot()),
        RouteDecision::RedirectToVerification
    );
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let ctx = TestContext::start().await;
    ctx.seed_user("u-ada", "ada@example.com", "pw-ada", Some("Ada"));

    let mut session = ctx.session();
    let err = session
        .sign_in_with_password("ada@example.com", "wrong")
        .await
        .expect_err("wrong password must fail");
    assert!(matches!(
        err,
        SessionError::Identity(IdentityError::InvalidCredentials)
    ));
    assert!(session.identity().is_none());
}

// ============================================================================
// Federated sign-in
// ============================================================================

#[tokio::test]
async fn test_federated_sign_in_with_authorization_code() {
    let ctx = TestContext::start().await;
    ctx.seed_federated_user("u-fed", "fed@example.com", "Fede");
    let code = ctx.issue_auth_code("u-fed");

    let mut session = ctx.session();
    session
        .sign_in_with_provider(&code)
        .await
        .expect("code exchange");

    // Federated accounts skip verification entirely.
    assert_eq!(RouteGuard::evaluate(&session.snapshot()), RouteDecision::Admit);
    assert_eq!(ctx.profile_creates("u-fed"), 1);
}
