//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Display` implementations
///
/// IDs are strings because both the identity provider (subject IDs) and the
/// Gifty backend hand out opaque string identifiers.
///
/// # Example
///
/// ```rust
/// # use gifty_core::define_id;
/// define_id!(UserId);
/// define_id!(WishlistId);
///
/// let user_id = UserId::new("u-1");
/// let wishlist_id = WishlistId::new("w-1");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = wishlist_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(WishlistId);
define_id!(ItemId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_equality() {
        assert_eq!(UserId::new("abc"), UserId::from("abc"));
        assert_ne!(UserId::new("abc"), UserId::new("abd"));
    }

    #[test]
    fn test_id_display() {
        let id = WishlistId::new("w-42");
        assert_eq!(id.to_string(), "w-42");
        assert_eq!(id.as_str(), "w-42");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = ItemId::new("i-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"i-7\"");

        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
