//! CLI command implementations.

pub mod auth;
pub mod item;
pub mod profile;
pub mod share;
pub mod wishlist;
