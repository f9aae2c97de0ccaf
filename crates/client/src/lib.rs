//! Gifty client library.
//!
//! A typed client for the Gifty wishlist backend and its external identity
//! provider. The backend owns persistence, authorization enforcement, and
//! share-code generation; this crate owns session bootstrap, route gating,
//! advisory caches of wishlists and items, client-side permission
//! derivation, and share-code resolution.
//!
//! # Architecture
//!
//! - [`identity`] - OAuth-style identity provider client (sign-in,
//!   registration, short-lived token minting)
//! - [`api`] - Low-level REST client for the Gifty backend
//! - [`session`] - Session manager (identity → profile bridge) and route guard
//! - [`store`] - Wishlist/item store with reservation logic
//! - [`share`] - Share-code resolver for viewing someone else's wishlist
//!
//! Every authenticated backend call carries a bearer token minted from the
//! identity provider immediately before the call; tokens are never cached
//! across requests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod identity;
pub mod notice;
pub mod session;
pub mod share;
pub mod store;

pub use config::{ConfigError, GiftyConfig};
pub use notice::{Notice, NoticeLevel};
pub use session::{RouteDecision, RouteGuard, SessionManager};
pub use share::{ShareResolver, ShareState};
pub use store::WishlistStore;
