//! Password-based authenticated encryption of payloads.
//!
//! - Argon2id for key derivation (fresh random salt per envelope)
//! - ChaCha20-Poly1305 for authenticated encryption
//!
//! Envelope layout: `salt (16) || nonce (12) || tag (16) || ciphertext`.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{AeadInPlace, KeyInit},
    ChaCha20Poly1305, Key, Nonce, Tag,
};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::StegoError;

/// Argon2 salt size.
pub const SALT_LEN: usize = 16;

/// ChaCha20-Poly1305 nonce size.
pub const NONCE_LEN: usize = 12;

/// Poly1305 authentication tag size.
pub const TAG_LEN: usize = 16;

/// Bytes added to a payload by [`seal`].
pub const ENVELOPE_OVERHEAD: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Argon2id memory cost in KiB.
const KDF_MEMORY_KIB: u32 = 19 * 1024;

/// Argon2id passes.
const KDF_ITERATIONS: u32 = 2;

const KDF_LANES: u32 = 1;

/// Derives a 256-bit key from `password` and `salt`.
fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, argon2::Error> {
    let params = Params::new(KDF_MEMORY_KIB, KDF_ITERATIONS, KDF_LANES, Some(32))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2.hash_password_into(password.as_bytes(), salt, &mut *key)?;
    Ok(key)
}

/// Encrypts `payload` under `password`.
///
/// Every call uses a fresh salt and nonce, so sealing the same payload twice
/// yields different envelopes.
pub fn seal(payload: &[u8], password: &str) -> Result<Vec<u8>, StegoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt).map_err(|e| StegoError::EncryptionFailed(e.to_string()))?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));

    let mut ciphertext = payload.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce_bytes), b"", &mut ciphertext)
        .map_err(|e| StegoError::EncryptionFailed(e.to_string()))?;

    let mut envelope = Vec::with_capacity(ENVELOPE_OVERHEAD + ciphertext.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&tag);
    envelope.extend_from_slice(&ciphertext);

    debug!(plaintext = payload.len(), sealed = envelope.len(), "sealed payload");
    Ok(envelope)
}

/// Decrypts an envelope produced by [`seal`].
///
/// Every failure, including a too-short envelope, maps to
/// [`StegoError::DecryptionFailed`].
pub fn open(envelope: &[u8], password: &str) -> Result<Vec<u8>, StegoError> {
    if envelope.len() < ENVELOPE_OVERHEAD {
        return Err(StegoError::DecryptionFailed);
    }

    let (salt, rest) = envelope.split_at(SALT_LEN);
    let (nonce_bytes, rest) = rest.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let key = derive_key(password, salt).map_err(|_| StegoError::DecryptionFailed)?;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&*key));

    let mut plaintext = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce_bytes),
            b"",
            &mut plaintext,
            Tag::from_slice(tag),
        )
        .map_err(|_| StegoError::DecryptionFailed)?;

    Ok(plaintext)
}
