//! Asset payload encryption: AES-256-GCM with a fixed wire layout.
//!
//! ```text
//! [nonce (12)][ciphertext][tag (16)]
//! ```

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use thiserror::Error;

use crate::types::SymmetricKey;

/// AES-256-GCM nonce length.
pub const NONCE_LEN: usize = 12;
/// AES-256-GCM authentication tag length.
pub const TAG_LEN: usize = 16;
/// Minimum payload: nonce + one ciphertext byte + tag. Zero-length plaintext
/// is rejected by this bound; the encryption side never produces it.
pub const MIN_BLOB_LEN: usize = NONCE_LEN + 1 + TAG_LEN;

/// AES-256 key length.
const KEY_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum AssetCryptError {
    #[error("Encrypted asset too short: {len} bytes, need at least {MIN_BLOB_LEN}")]
    TooShort { len: usize },

    #[error("Symmetric key must be {KEY_LEN} bytes, got {len}")]
    InvalidKeyLength { len: usize },

    #[error("Asset decryption failed: authentication tag mismatch")]
    DecryptionFailed,

    #[error("Asset encryption failed")]
    EncryptionFailed,
}

fn check_key(key: &SymmetricKey) -> Result<(), AssetCryptError> {
    if key.len() != KEY_LEN {
        return Err(AssetCryptError::InvalidKeyLength { len: key.len() });
    }
    Ok(())
}

/// Authenticate-and-decrypt an asset payload.
///
/// A tag mismatch means either the recovered key is wrong or the payload was
/// corrupted in storage; the two are indistinguishable from here.
pub fn decrypt_asset(blob: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, AssetCryptError> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(AssetCryptError::TooShort { len: blob.len() });
    }
    check_key(key)?;

    let (nonce, ciphertext) = blob.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| AssetCryptError::DecryptionFailed)
}

/// Encrypt an asset payload with a fresh random nonce (the testator side of
/// [`decrypt_asset`]).
pub fn seal_asset(plaintext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, AssetCryptError> {
    check_key(key)?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| AssetCryptError::EncryptionFailed)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SymmetricKey {
        SymmetricKey::new(vec![0x42; 32])
    }

    #[test]
    fn test_seal_decrypt_roundtrip() {
        let key = test_key();
        let plaintext = b"last will and testament";

        let blob = seal_asset(plaintext, &key).unwrap();
        assert_eq!(blob.len(), NONCE_LEN + plaintext.len() + TAG_LEN);

        let decrypted = decrypt_asset(&blob, &key).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_single_bit_flip_anywhere_fails() {
        let key = test_key();
        let blob = seal_asset(b"payload", &key).unwrap();

        // Flip one bit in every ciphertext and tag position in turn
        for i in NONCE_LEN..blob.len() {
            let mut tampered = blob.clone();
            tampered[i] ^= 0x01;
            let result = decrypt_asset(&tampered, &key);
            assert!(
                matches!(result, Err(AssetCryptError::DecryptionFailed)),
                "bit flip at byte {} was not detected",
                i
            );
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let blob = seal_asset(b"payload", &test_key()).unwrap();
        let other = SymmetricKey::new(vec![0x43; 32]);

        let result = decrypt_asset(&blob, &other);
        assert!(matches!(result, Err(AssetCryptError::DecryptionFailed)));
    }

    #[test]
    fn test_too_short_rejected() {
        let key = test_key();
        // 28 bytes: nonce + tag but no ciphertext byte
        let result = decrypt_asset(&[0u8; MIN_BLOB_LEN - 1], &key);
        assert!(matches!(result, Err(AssetCryptError::TooShort { len: 28 })));

        assert!(matches!(
            decrypt_asset(&[], &key),
            Err(AssetCryptError::TooShort { len: 0 })
        ));
    }

    #[test]
    fn test_non_aes256_key_rejected() {
        let short = SymmetricKey::new(vec![0x01; 16]);
        let result = decrypt_asset(&[0u8; 64], &short);
        assert!(matches!(
            result,
            Err(AssetCryptError::InvalidKeyLength { len: 16 })
        ));

        let result = seal_asset(b"data", &short);
        assert!(matches!(
            result,
            Err(AssetCryptError::InvalidKeyLength { len: 16 })
        ));
    }

    #[test]
    fn test_empty_plaintext_blob_rejected_on_decrypt() {
        // The wire minimum forbids zero-length plaintext even though AES-GCM
        // could authenticate it.
        let key = test_key();
        let sealed = seal_asset(b"", &key).unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + TAG_LEN);
        assert!(matches!(
            decrypt_asset(&sealed, &key),
            Err(AssetCryptError::TooShort { .. })
        ));
    }
}
