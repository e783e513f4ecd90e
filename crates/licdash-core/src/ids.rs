//! Strongly-typed identifiers for license records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Primary key used by the license API for updates and deletes.
    LicenseKey
);

define_id!(
    /// Document identifier assigned by the backing store.
    ///
    /// Identifiers in the ObjectId format carry their creation time as a
    /// big-endian 32-bit seconds-since-epoch value in the first 8 hex digits.
    DocumentId
);

impl DocumentId {
    /// Decode the creation timestamp embedded in the identifier, if any.
    ///
    /// Returns `None` unless the first 8 characters are all hexadecimal.
    pub fn embedded_timestamp(&self) -> Option<DateTime<Utc>> {
        let prefix = self.0.get(..8)?;
        if !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let seconds = u32::from_str_radix(prefix, 16).ok()?;
        DateTime::from_timestamp(i64::from(seconds), 0)
    }
}
