//! Admin API key.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Digest of the configured admin key. Candidates are hashed and compared in constant time, so
/// neither content nor length leaks through timing.
#[derive(Clone)]
pub(crate) struct AdminKey {
    digest: [u8; 32],
}

impl AdminKey {
    /// `None` for a blank key.
    pub(crate) fn new(key: &str) -> Option<Self> {
        let key = key.trim();

        if key.is_empty() {
            return None;
        }

        Some(Self {
            digest: Sha256::digest(key.as_bytes()).into(),
        })
    }

    pub(crate) fn matches(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.trim().as_bytes()).into();

        self.digest.as_slice().ct_eq(candidate.as_slice()).into()
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminKey(<redacted>)")
    }
}
