use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Declares a string-backed identifier for a content table.
///
/// Identifiers serialize as bare strings so that data files can use them as
/// map keys (`"sparky": (...)`).
macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

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

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

content_id!(
    /// Key into the species table (e.g. `"sparky"`).
    SpeciesId
);
content_id!(
    /// Key into the move table (e.g. `"hello_world"`).
    MoveId
);
content_id!(
    /// Key into the item table (e.g. `"free_tier_key"`).
    ItemId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let mut map = BTreeMap::new();
        map.insert(SpeciesId::new("sparky"), 1u8);
        let text = ron::to_string(&map).unwrap();
        assert_eq!(text, "{\"sparky\":1}");

        let back: BTreeMap<SpeciesId, u8> = ron::from_str(&text).unwrap();
        assert_eq!(back.get("sparky"), Some(&1));
    }
}
