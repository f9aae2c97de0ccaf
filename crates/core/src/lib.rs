//! Gifty Core - Shared types library.
//!
//! This crate provides common types used across all Gifty components:
//! - `client` - Library for the Gifty backend API and identity provider
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Entity IDs
//! are opaque strings: the identity provider issues string subject IDs and
//! the backend mirrors them, so numeric newtypes would be a lie.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and share codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
