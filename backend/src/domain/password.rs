//! Salted password digests.
//!
//! Digests are PBKDF2-HMAC-SHA256 outputs stored as PHC strings:
//! `$pbkdf2-sha256$i=<iterations>$<salt>$<hash>`, with salt and hash in
//! unpadded standard base64.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

const ALGORITHM: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const OUTPUT_LEN: usize = 32;
/// PBKDF2 iterations applied to new digests.
pub const DEFAULT_ROUNDS: u32 = 600_000;

/// Error raised when a stored digest cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed password digest")]
pub struct MalformedDigest;

/// Encoded salted password digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    rounds: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordDigest")
            .field("rounds", &self.rounds)
            .finish_non_exhaustive()
    }
}

fn derive_key(rounds: u32, salt: &[u8], password: &str, len: usize) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(vec![0_u8; len]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, out.as_mut_slice());
    out
}

impl PasswordDigest {
    /// Derive a digest with a fresh random salt.
    pub fn derive(password: &str) -> Self {
        Self::derive_with_rounds(password, DEFAULT_ROUNDS)
    }

    /// Derive a digest with a fresh random salt and explicit iteration count.
    pub fn derive_with_rounds(password: &str, rounds: u32) -> Self {
        let mut salt = vec![0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let rounds = rounds.max(1);
        let hash = derive_key(rounds, &salt, password, OUTPUT_LEN).to_vec();
        Self { rounds, salt, hash }
    }

    /// Check `password` against the stored digest in constant time.
    pub fn verify(&self, password: &str) -> bool {
        let candidate = derive_key(self.rounds, &self.salt, password, self.hash.len());
        bool::from(candidate.as_slice().ct_eq(&self.hash))
    }

    /// PHC string persisted by adapters.
    pub fn encode(&self) -> String {
        format!(
            "${ALGORITHM}$i={}${}${}",
            self.rounds,
            STANDARD_NO_PAD.encode(&self.salt),
            STANDARD_NO_PAD.encode(&self.hash)
        )
    }

    /// Parse the PHC string produced by [`PasswordDigest::encode`].
    pub fn decode(encoded: &str) -> Result<Self, MalformedDigest> {
        let mut parts = encoded.split('$');
        let (Some(""), Some(algorithm), Some(params), Some(salt), Some(hash), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(MalformedDigest);
        };
        if algorithm != ALGORITHM {
            return Err(MalformedDigest);
        }
        let rounds = params
            .strip_prefix("i=")
            .and_then(|value| value.parse::<u32>().ok())
            .ok_or(MalformedDigest)?;
        let salt = STANDARD_NO_PAD.decode(salt).map_err(|_| MalformedDigest)?;
        let hash = STANDARD_NO_PAD.decode(hash).map_err(|_| MalformedDigest)?;
        if rounds == 0 || salt.is_empty() || hash.is_empty() {
            return Err(MalformedDigest);
        }
        Ok(Self { rounds, salt, hash })
    }
}
