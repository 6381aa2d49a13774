//! Cache key derivation.

use crate::types::DiagnosisRequest;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic content digest identifying a diagnosis request.
///
/// Two requests with identical image bytes and identical context always
/// produce the same key; any difference in either produces a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    hash: String,
}

impl CacheKey {
    /// Derive a key from raw image content and a context string.
    ///
    /// A zero byte separates the two inputs so that moving bytes between
    /// image and context cannot produce a colliding digest.
    pub fn from_parts(image: &[u8], context: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image);
        hasher.update([0u8]);
        hasher.update(context.as_bytes());
        let hash: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();
        Self { hash }
    }

    /// Derive the key for a request, using the mode-specific context string.
    pub fn for_request(request: &DiagnosisRequest) -> Self {
        Self::from_parts(&request.image, &request.context_string())
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}
