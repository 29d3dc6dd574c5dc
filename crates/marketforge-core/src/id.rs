//! Identifier newtypes.
//!
//! Stands, merchants and trade categories are identified by opaque strings
//! supplied by the data provider. Wrapping them keeps the three id spaces
//! from being mixed up at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a string-backed identifier newtype.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identity of a physical stand ("kraam").
    ///
    /// ```
    /// use marketforge_core::StandId;
    ///
    /// let id = StandId::from("12");
    /// assert_eq!(id.as_str(), "12");
    /// assert_eq!(id.to_string(), "12");
    /// ```
    StandId
);

string_id!(
    /// Registration number of a merchant.
    MerchantId
);

string_id!(
    /// Identity of a trade category ("branche").
    CategoryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_lexically() {
        let mut ids = vec![MerchantId::from("b"), MerchantId::from("a")];
        ids.sort();
        assert_eq!(ids, vec![MerchantId::from("a"), MerchantId::from("b")]);
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&StandId::from("7")).unwrap();
        assert_eq!(json, "\"7\"");
        let back: CategoryId = serde_json::from_str("\"kaas\"").unwrap();
        assert_eq!(back.as_str(), "kaas");
    }
}
