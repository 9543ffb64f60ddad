use std::fmt::{Display, Formatter, Result as FmtResult};

use const_fnv1a_hash::{fnv1a_hash_64, fnv1a_hash_str_64};
use serde::{Deserialize, Serialize};

/// A 64-bit FNV-1a content fingerprint.
///
/// Fingerprints identify the exact bytes of a dictionary pair or the
/// configuration that shaped a derived artifact. A cached artifact is only
/// reused when the fingerprint it was stored with matches the current one.
///
/// ```
/// use anyletters::Fingerprint;
///
/// const EMPTY: Fingerprint = Fingerprint::of_str("");
/// assert_eq!(EMPTY, Fingerprint::of_bytes(b""));
/// assert_eq!(EMPTY.to_string().len(), 16);
/// ```
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint raw bytes.
    pub const fn of_bytes(bytes: &[u8]) -> Self {
        Self(fnv1a_hash_64(bytes, None))
    }

    /// Fingerprint a string.
    pub const fn of_str(s: &str) -> Self {
        Self(fnv1a_hash_str_64(s))
    }

    /// Fingerprint an ordered sequence of fingerprints.
    ///
    /// The order matters: `combine(&[a, b])` differs from `combine(&[b, a])`.
    pub fn combine(parts: &[Fingerprint]) -> Self {
        let bytes: Vec<u8> = parts.iter().flat_map(|p| p.0.to_le_bytes()).collect();
        Self::of_bytes(&bytes)
    }

    /// Get the raw hash value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:016x}", self.0)
    }
}
