//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a string-backed identifier newtype.
///
/// The inner String stays private so construction always goes through
/// `new`/`From`, and the wire form is the bare string.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Identity of an opportunity reported by the engine.
    OpportunityId
);

string_id!(
    /// Market condition identifier.
    MarketId
);

string_id!(
    /// Outcome token identifier (a uint256 on-chain, kept as its decimal string).
    TokenId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opportunity_id_new_and_as_str() {
        let id = OpportunityId::new("opp-1");
        assert_eq!(id.as_str(), "opp-1");
    }

    #[test]
    fn market_id_from_string() {
        let id = MarketId::from("hello".to_string());
        assert_eq!(id.as_str(), "hello");
    }

    #[test]
    fn token_id_display() {
        let id = TokenId::new("12345");
        assert_eq!(format!("{id}"), "12345");
    }

    #[test]
    fn ids_serialize_as_bare_strings() {
        let json = serde_json::to_string(&OpportunityId::from("abc")).unwrap();
        assert_eq!(json, r#""abc""#);

        let back: MarketId = serde_json::from_str(r#""0xmarket""#).unwrap();
        assert_eq!(back, MarketId::from("0xmarket"));
    }
}
