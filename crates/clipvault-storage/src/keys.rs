//! Object key generation shared by every backend.
//!
//! Key format: `<prefix>/<token>.<extension>`. The token comes from the OS
//! CSPRNG, so concurrent uploads never need coordination to stay unique.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clipvault_core::constants::RANDOM_TOKEN_BYTES;
use rand::RngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// URL-safe random identifier (32 bytes, base64url without padding).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RandomToken(String);

impl RandomToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; RANDOM_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        RandomToken(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RandomToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Storage key of an ingested object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Build a key from an existing token.
    pub fn with_token(prefix: impl Display, token: &RandomToken, extension: &str) -> Self {
        ObjectKey(format!(
            "{}/{}.{}",
            prefix,
            token,
            extension.trim_start_matches('.')
        ))
    }

    /// Build a key around a fresh token.
    pub fn generate(prefix: impl Display, extension: &str) -> Self {
        Self::with_token(prefix, &RandomToken::generate(), extension)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
