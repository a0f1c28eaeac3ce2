//! Symmetric-key recovery (ECIES-style, secp256k1 + HKDF-SHA256 + AES-256-GCM).
//!
//! The asset's symmetric key is published as an address-bound encrypted blob
//! with a fixed byte layout:
//!
//! ```text
//! [ephemeral pubkey (65, uncompressed)][salt (32)][nonce (12)][ciphertext][tag (16)]
//! ```
//!
//! Recovery walks the published scheme exactly:
//!
//! 1. ECDH between the beneficiary's static private key and the blob's
//!    ephemeral public key; keep the X coordinate of the shared point.
//! 2. Normalize: SHA-256 over `0x02 || X`. The marker byte is a protocol
//!    constant, NOT the parity of the shared point's Y coordinate — this is
//!    why the secp256k1 crate's own `SharedSecret` (which hashes the real
//!    compressed point) cannot be used here. Getting this wrong does not
//!    error; it surfaces later as a tag mismatch.
//! 3. HKDF-SHA256 (salt = blob salt, ikm = step-2 digest, info =
//!    [`KDF_CONTEXT`], L = 32) to get the blob decryption key.
//! 4. AES-256-GCM decrypt of the blob ciphertext. Tag mismatch is terminal.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use secp256k1::{ecdh, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroize;

use crate::types::SymmetricKey;

/// Uncompressed secp256k1 point length.
pub const EPHEMERAL_PUBKEY_LEN: usize = 65;
/// HKDF salt length.
pub const SALT_LEN: usize = 32;
/// AES-256-GCM nonce length.
pub const NONCE_LEN: usize = 12;
/// AES-256-GCM authentication tag length.
pub const TAG_LEN: usize = 16;
/// Smallest well-formed blob: all fixed fields plus one ciphertext byte.
pub const MIN_BLOB_LEN: usize = EPHEMERAL_PUBKEY_LEN + SALT_LEN + NONCE_LEN + TAG_LEN + 1;

/// Domain-separation string for the HKDF expand step. Protocol constant.
pub const KDF_CONTEXT: &[u8] = b"bequest.asset-key.v1";

/// Marker byte prefixed to the shared X coordinate before hashing (step 2).
/// Fixed by the published scheme regardless of point parity.
const POINT_MARKER: u8 = 0x02;

#[derive(Error, Debug)]
pub enum EciesError {
    #[error("Malformed key blob: {len} bytes, need at least {MIN_BLOB_LEN}")]
    MalformedBlob { len: usize },

    #[error("Invalid ephemeral public key: {0}")]
    InvalidEphemeralKey(#[from] secp256k1::Error),

    #[error("Key derivation failed")]
    KeyDerivation,

    #[error("Key blob decryption failed: authentication tag mismatch")]
    DecryptionFailed,

    #[error("Key blob encryption failed")]
    EncryptionFailed,
}

/// Parsed encrypted-key blob. Fetched fresh per claim attempt, never stored.
pub struct EncryptedKeyBlob {
    /// One-time public key generated by the encrypting party.
    pub ephemeral_pubkey: PublicKey,
    /// HKDF salt.
    pub salt: [u8; SALT_LEN],
    /// AES-GCM nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the 16-byte authentication tag appended.
    pub ciphertext: Vec<u8>,
}

impl EncryptedKeyBlob {
    /// Parse the fixed layout. Length is checked before anything else so an
    /// undersized blob never reaches a cryptographic operation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EciesError> {
        if bytes.len() < MIN_BLOB_LEN {
            return Err(EciesError::MalformedBlob { len: bytes.len() });
        }

        let ephemeral_pubkey = PublicKey::from_slice(&bytes[..EPHEMERAL_PUBKEY_LEN])?;

        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        let salt_end = EPHEMERAL_PUBKEY_LEN + SALT_LEN;
        salt.copy_from_slice(&bytes[EPHEMERAL_PUBKEY_LEN..salt_end]);
        nonce.copy_from_slice(&bytes[salt_end..salt_end + NONCE_LEN]);
        let ciphertext = bytes[salt_end + NONCE_LEN..].to_vec();

        Ok(Self {
            ephemeral_pubkey,
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Serialize back to the wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(EPHEMERAL_PUBKEY_LEN + SALT_LEN + NONCE_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.ephemeral_pubkey.serialize_uncompressed());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }
}

/// ECDH + the scheme's fixed normalization (steps 1–2).
///
/// Returns SHA-256 of `0x02 || X` where X is the shared point's X coordinate.
fn agree(secret: &SecretKey, ephemeral: &PublicKey) -> [u8; 32] {
    // x || y, unhashed
    let mut point = ecdh::shared_secret_point(ephemeral, secret);

    let mut marked = [0u8; 33];
    marked[0] = POINT_MARKER;
    marked[1..].copy_from_slice(&point[..32]);

    let digest: [u8; 32] = Sha256::digest(marked).into();
    point.zeroize();
    marked.zeroize();
    digest
}

/// HKDF-SHA256 extract-and-expand (step 3).
fn derive_key(ikm: &[u8; 32], salt: &[u8; SALT_LEN]) -> Result<[u8; 32], EciesError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = [0u8; 32];
    hk.expand(KDF_CONTEXT, &mut okm)
        .map_err(|_| EciesError::KeyDerivation)?;
    Ok(okm)
}

/// Recover the asset symmetric key from an encrypted key blob.
///
/// The returned key is exactly the blob's plaintext; its length is whatever
/// the encrypting party sealed (32 bytes for AES-256 asset keys).
pub fn recover_symmetric_key(
    blob: &EncryptedKeyBlob,
    secret: &SecretKey,
) -> Result<SymmetricKey, EciesError> {
    let mut ikm = agree(secret, &blob.ephemeral_pubkey);
    let mut key = derive_key(&ikm, &blob.salt)?;
    ikm.zeroize();

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let result = cipher.decrypt(Nonce::from_slice(&blob.nonce), blob.ciphertext.as_slice());
    key.zeroize();

    // Tag mismatch: either the wrong private key or a tampered blob. Both are
    // terminal; retrying with the same inputs cannot succeed.
    let plaintext = result.map_err(|_| EciesError::DecryptionFailed)?;
    Ok(SymmetricKey::new(plaintext))
}

/// Encrypt a symmetric key for a beneficiary public key (the testator side of
/// [`recover_symmetric_key`]). Generates a fresh ephemeral keypair, salt, and
/// nonce per call.
pub fn seal_symmetric_key(
    key_plaintext: &[u8],
    beneficiary: &PublicKey,
) -> Result<EncryptedKeyBlob, EciesError> {
    let secp = Secp256k1::new();
    let ephemeral_secret = SecretKey::new(&mut OsRng);
    let ephemeral_pubkey = PublicKey::from_secret_key(&secp, &ephemeral_secret);

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let nonce_arr = Aes256Gcm::generate_nonce(&mut OsRng);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&nonce_arr);

    // ECDH is symmetric: ephemeral_secret * beneficiary == beneficiary_secret * ephemeral
    let mut ikm = agree(&ephemeral_secret, beneficiary);
    let mut enc_key = derive_key(&ikm, &salt)?;
    ikm.zeroize();

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&enc_key));
    let result = cipher.encrypt(Nonce::from_slice(&nonce), key_plaintext);
    enc_key.zeroize();

    let ciphertext = result.map_err(|_| EciesError::EncryptionFailed)?;

    Ok(EncryptedKeyBlob {
        ephemeral_pubkey,
        salt,
        nonce,
        ciphertext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keypair(seed_byte: u8) -> (SecretKey, PublicKey) {
        let secp = Secp256k1::new();
        let mut bytes = [0u8; 32];
        bytes[31] = seed_byte;
        bytes[0] = 0x01;
        let sk = SecretKey::from_slice(&bytes).unwrap();
        let pk = sk.public_key(&secp);
        (sk, pk)
    }

    #[test]
    fn test_agree_is_deterministic() {
        let (sk, _) = test_keypair(1);
        let (_, pk) = test_keypair(2);

        let a = agree(&sk, &pk);
        let b = agree(&sk, &pk);
        assert_eq!(a, b);
    }

    #[test]
    fn test_agree_is_symmetric() {
        let (sk1, pk1) = test_keypair(1);
        let (sk2, pk2) = test_keypair(2);

        assert_eq!(agree(&sk1, &pk2), agree(&sk2, &pk1));
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let ikm = [0x11u8; 32];
        let salt = [0x22u8; SALT_LEN];

        let a = derive_key(&ikm, &salt).unwrap();
        let b = derive_key(&ikm, &salt).unwrap();
        assert_eq!(a, b);

        // A different salt must change the output
        let c = derive_key(&ikm, &[0x23u8; SALT_LEN]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_normalization_uses_fixed_marker() {
        // The digest must be over 0x02 || X, never the crate's SharedSecret
        // convention (which hashes the parity-dependent compressed point).
        let (sk, _) = test_keypair(3);
        let (_, pk) = test_keypair(4);

        let point = ecdh::shared_secret_point(&pk, &sk);
        let mut marked = [0u8; 33];
        marked[0] = 0x02;
        marked[1..].copy_from_slice(&point[..32]);
        let expected: [u8; 32] = Sha256::digest(marked).into();

        assert_eq!(agree(&sk, &pk), expected);
    }

    #[test]
    fn test_seal_recover_roundtrip() {
        let (beneficiary_sk, beneficiary_pk) = test_keypair(5);
        let original = [0xA5u8; 32];

        let blob = seal_symmetric_key(&original, &beneficiary_pk).unwrap();
        let recovered = recover_symmetric_key(&blob, &beneficiary_sk).unwrap();

        assert_eq!(recovered.as_bytes(), &original);
    }

    #[test]
    fn test_roundtrip_through_wire_layout() {
        let (beneficiary_sk, beneficiary_pk) = test_keypair(6);
        let original = [0x77u8; 16];

        let blob = seal_symmetric_key(&original, &beneficiary_pk).unwrap();
        let bytes = blob.to_bytes();
        // 65 + 32 + 12 + 16-byte ciphertext + 16-byte tag
        assert_eq!(bytes.len(), 141);

        let parsed = EncryptedKeyBlob::from_bytes(&bytes).unwrap();
        let recovered = recover_symmetric_key(&parsed, &beneficiary_sk).unwrap();
        assert_eq!(recovered.as_bytes(), &original);
        assert_eq!(recovered.len(), 16);
    }

    #[test]
    fn test_wrong_private_key_fails_tag_check() {
        let (_, beneficiary_pk) = test_keypair(7);
        let (unrelated_sk, _) = test_keypair(8);

        let blob = seal_symmetric_key(&[0x01u8; 32], &beneficiary_pk).unwrap();
        let result = recover_symmetric_key(&blob, &unrelated_sk);

        assert!(matches!(result, Err(EciesError::DecryptionFailed)));
    }

    #[test]
    fn test_undersized_blob_rejected_before_crypto() {
        // 100 bytes is below the 126-byte minimum; must fail on layout alone
        let result = EncryptedKeyBlob::from_bytes(&[0u8; 100]);
        assert!(matches!(
            result,
            Err(EciesError::MalformedBlob { len: 100 })
        ));

        // One byte short of the minimum
        let result = EncryptedKeyBlob::from_bytes(&[0u8; MIN_BLOB_LEN - 1]);
        assert!(matches!(result, Err(EciesError::MalformedBlob { .. })));
    }

    #[test]
    fn test_garbage_ephemeral_key_rejected() {
        // Long enough, but the first 65 bytes are not a curve point
        let bytes = vec![0xFFu8; MIN_BLOB_LEN];
        let result = EncryptedKeyBlob::from_bytes(&bytes);
        assert!(matches!(result, Err(EciesError::InvalidEphemeralKey(_))));
    }

    #[test]
    fn test_tampered_blob_fails() {
        let (beneficiary_sk, beneficiary_pk) = test_keypair(9);
        let blob = seal_symmetric_key(&[0x42u8; 32], &beneficiary_pk).unwrap();

        let mut bytes = blob.to_bytes();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let tampered = EncryptedKeyBlob::from_bytes(&bytes).unwrap();
        let result = recover_symmetric_key(&tampered, &beneficiary_sk);
        assert!(matches!(result, Err(EciesError::DecryptionFailed)));
    }
}
