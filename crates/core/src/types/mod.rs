//! Core types for Gifty.

pub mod email;
pub mod id;
pub mod share_code;

pub use email::{Email, EmailError};
pub use id::*;
pub use share_code::ShareCode;
