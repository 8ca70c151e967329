//! Content hashes identifying configurations and datasets.
//!
//! Both are lowercase BLAKE3 hex digests, stable across builds and platforms.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash of a canonical strategy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

/// Hash of the bar data a run was evaluated on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

macro_rules! content_hash {
    ($ty:ident) => {
        impl $ty {
            pub fn from_bytes(bytes: &[u8]) -> Self {
                Self(blake3::hash(bytes).to_hex().to_string())
            }

            pub fn from_hash(hash: &str) -> Self {
                Self(hash.to_string())
            }

            /// First eight hex digits, for directory names and tables.
            pub fn short(&self) -> &str {
                self.0.get(..8).unwrap_or(&self.0)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

content_hash!(ConfigHash);
content_hash!(DatasetHash);
