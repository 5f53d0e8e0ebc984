//! Sealed-box encryption of secret values against a GitHub public key.
//!
//! GitHub decrypts with libsodium's `crypto_box_seal_open`, so the output is
//! `[ephemeral public key (32 bytes)][ciphertext]` with the nonce derived from
//! both public keys. No sender key is embedded.

use base64::{Engine, engine::general_purpose};
use crypto_box::aead::OsRng;
use tracing::debug;

use crate::app_deps::GitHubApi;
use crate::errors::{EncryptionError, GitHubError};
use crate::models::{PublicKey, Provider, Target};

/// Length of a Curve25519 public key.
pub const KEY_LENGTH: usize = 32;

/// Decode a base64 public key into the 32-byte recipient key.
pub fn decode_public_key(public_key: &str) -> Result<crypto_box::PublicKey, EncryptionError> {
    let public_key_bytes = general_purpose::STANDARD
        .decode(public_key.trim())
        .map_err(|e| EncryptionError::InvalidBase64(e.to_string()))?;

    let public_key_array: [u8; KEY_LENGTH] = public_key_bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| EncryptionError::InvalidKeyLength(bytes.len()))?;

    Ok(crypto_box::PublicKey::from(public_key_array))
}

/// Encrypt `secret_value` for the holder of `public_key` (base64).
/// Returns the base64-encoded sealed box.
pub fn encrypt_secret(public_key: &str, secret_value: &str) -> Result<String, EncryptionError> {
    let recipient = decode_public_key(public_key)?;

    let sealed = recipient
        .seal(&mut OsRng, secret_value.as_bytes())
        .map_err(|_| EncryptionError::Seal)?;

    Ok(general_purpose::STANDARD.encode(sealed))
}

/// Fetch the key for `provider` at `target`. Keys are not cached: the key id
/// can rotate between calls.
pub async fn fetch_key(
    api: &dyn GitHubApi,
    target: &Target,
    provider: Provider,
) -> Result<PublicKey, GitHubError> {
    debug!(dest = %target, provider = %provider, "fetching public key");
    api.get_public_key(target, provider).await
}
