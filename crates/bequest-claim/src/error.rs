//! The claim pipeline's terminal error taxonomy.
//!
//! Every stage fails closed: the first terminal error aborts the claim and
//! no partial output is produced. Each variant is distinguishable so a
//! caller can tell "wait and recheck claimability" (`NotClaimable`,
//! `KeyNotFound`) from "data integrity problem" (the two decryption
//! failures).

use bequest_core::types::{Address, RecordState};
use thiserror::Error;

use crate::keyservice::KeyServiceError;

#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("Record is not claimable: {}", not_claimable_reason(.state))]
    NotClaimable { state: RecordState },

    #[error("Beneficiary mismatch: record names {expected}, caller is {actual}")]
    IdentityMismatch { expected: Address, actual: Address },

    #[error("Could not read inheritance record: {0}")]
    Unreadable(#[from] bequest_chain::ChainError),

    #[error("Storage locator unresolvable under any known encoding")]
    LocatorUnresolvable,

    #[error("Key-distribution service has no key for this record yet")]
    KeyNotFound,

    #[error("Malformed encrypted key blob: {reason}")]
    MalformedKeyBlob { reason: String },

    #[error("Key blob decryption failed: wrong beneficiary key or tampered blob")]
    KeyDecryptionFailed,

    #[error("Asset payload unavailable from the storage network")]
    AssetUnavailable,

    #[error("Asset decryption failed: key-recovery error upstream or corrupted payload")]
    AssetDecryptionFailed,

    #[error("Key-distribution service error: {0}")]
    KeyService(#[from] KeyServiceError),

    #[error("Failed to write decrypted asset: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bequest_storage::StorageError> for ClaimError {
    fn from(e: bequest_storage::StorageError) -> Self {
        match e {
            bequest_storage::StorageError::LocatorUnresolvable => ClaimError::LocatorUnresolvable,
            bequest_storage::StorageError::AssetUnavailable => ClaimError::AssetUnavailable,
        }
    }
}

impl From<bequest_core::EciesError> for ClaimError {
    fn from(e: bequest_core::EciesError) -> Self {
        use bequest_core::EciesError;
        match e {
            EciesError::MalformedBlob { len } => ClaimError::MalformedKeyBlob {
                reason: format!("{len} bytes, below the fixed-layout minimum"),
            },
            // A blob whose leading bytes are not a curve point violates the
            // same layout invariant as an undersized one
            EciesError::InvalidEphemeralKey(err) => ClaimError::MalformedKeyBlob {
                reason: format!("invalid ephemeral public key: {err}"),
            },
            EciesError::KeyDerivation
            | EciesError::DecryptionFailed
            | EciesError::EncryptionFailed => ClaimError::KeyDecryptionFailed,
        }
    }
}

impl From<bequest_core::AssetCryptError> for ClaimError {
    fn from(e: bequest_core::AssetCryptError) -> Self {
        tracing::warn!(error = %e, "asset decryption failed");
        ClaimError::AssetDecryptionFailed
    }
}

fn not_claimable_reason(state: &RecordState) -> &'static str {
    match state {
        // Unreachable through the gate, kept for completeness
        RecordState::Claimable => "record is claimable",
        RecordState::Designated => "still designated; the grace period has not matured",
        RecordState::Claimed => "already claimed",
        RecordState::Revoked => "revoked by the testator",
        RecordState::Purged => "purged from the contract",
    }
}

impl ClaimError {
    /// Whether re-checking later could plausibly succeed (as opposed to a
    /// data-integrity problem that waiting cannot fix).
    pub fn is_retriable_later(&self) -> bool {
        matches!(
            self,
            ClaimError::NotClaimable {
                state: RecordState::Designated
            } | ClaimError::KeyNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_claimable_reasons_are_distinct() {
        let states = [
            RecordState::Designated,
            RecordState::Claimed,
            RecordState::Revoked,
            RecordState::Purged,
        ];
        let messages: Vec<String> = states
            .iter()
            .map(|&state| ClaimError::NotClaimable { state }.to_string())
            .collect();

        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_retriable_classification() {
        assert!(ClaimError::KeyNotFound.is_retriable_later());
        assert!(ClaimError::NotClaimable {
            state: RecordState::Designated
        }
        .is_retriable_later());
        assert!(!ClaimError::NotClaimable {
            state: RecordState::Revoked
        }
        .is_retriable_later());
        assert!(!ClaimError::KeyDecryptionFailed.is_retriable_later());
        assert!(!ClaimError::AssetDecryptionFailed.is_retriable_later());
    }
}
