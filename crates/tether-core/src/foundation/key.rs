//! Message keys.
//!
//! Every interactive message is addressed by a [`Key`]: a short string derived
//! from the message's context, channel and id. Events of any kind that refer to
//! the same message always resolve to the same key, so the registry never needs
//! to know which event type produced it.
//!
//! ```rust,ignore
//! use tether_core::Key;
//!
//! let key = Key::compute(true, "1010", "2020");
//! assert_eq!(key, Key::compute(true, "1010", "2020"));
//! assert_ne!(key, Key::compute(false, "1010", "2020"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest (64 bits).
const KEY_LEN: usize = 16;

/// Opaque identifier of one interactive message.
///
/// Keys are pure functions of `(is_group, channel_id, message_id)`. Group and
/// direct contexts are hashed under different prefixes so they form disjoint
/// namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Derives the key for a message.
    pub fn compute(is_group: bool, channel_id: &str, message_id: &str) -> Self {
        let scope = if is_group { "group" } else { "direct" };

        let mut hasher = Sha256::new();
        hasher.update(scope.as_bytes());
        hasher.update([0u8]);
        hasher.update(channel_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(message_id.as_bytes());

        let digest = hex::encode(hasher.finalize());
        Self(digest[..KEY_LEN].to_string())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_is_deterministic() {
        let a = Key::compute(true, "123", "456");
        let b = Key::compute(true, "123", "456");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), KEY_LEN);
    }

    #[test]
    fn test_separator_prevents_concatenation_collisions() {
        assert_ne!(
            Key::compute(false, "12", "3456"),
            Key::compute(false, "123", "456")
        );
    }

    #[test]
    fn test_group_and_direct_never_collide() {
        let mut seen = HashSet::new();
        for i in 0..10_000u64 {
            let channel = (i * 7919).to_string();
            let message = (i * 104_729 + 17).to_string();

            let group = Key::compute(true, &channel, &message);
            let direct = Key::compute(false, &channel, &message);

            assert_ne!(group, direct);
            assert!(seen.insert(group));
            assert!(seen.insert(direct));
        }
    }
}
