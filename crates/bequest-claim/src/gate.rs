//! ClaimGate: on-chain preconditions for running the pipeline.
//!
//! Reads the inheritance record and verifies (a) the lifecycle state is
//! `Claimable` and (b) the caller is the recorded beneficiary. An identity
//! mismatch is a warning the caller may override (e.g. when claiming on
//! behalf of someone with the right key material); a wrong state never is.

use async_trait::async_trait;
use bequest_chain::{ChainClient, ChainError};
use bequest_core::types::{Address, InheritanceId, InheritanceRecord, RecordState};

use crate::error::ClaimError;

/// Read-only chain access, as much of it as the pipeline needs. Implemented
/// by [`ChainClient`]; tests substitute in-memory fakes.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn read_record(&self, id: &InheritanceId) -> Result<InheritanceRecord, ChainError>;
}

#[async_trait]
impl ChainReader for ChainClient {
    async fn read_record(&self, id: &InheritanceId) -> Result<InheritanceRecord, ChainError> {
        ChainClient::read_record(self, id).await
    }
}

/// Check that a record may be claimed by `caller`.
///
/// Returns the record on success. Never mutates chain state.
pub async fn check_claimable<C: ChainReader + ?Sized>(
    chain: &C,
    id: &InheritanceId,
    caller: Address,
    override_identity: bool,
) -> Result<InheritanceRecord, ClaimError> {
    let record = chain.read_record(id).await?;

    if record.state != RecordState::Claimable {
        return Err(ClaimError::NotClaimable {
            state: record.state,
        });
    }

    if record.beneficiary != caller {
        tracing::warn!(
            expected = %record.beneficiary,
            actual = %caller,
            "caller is not the recorded beneficiary"
        );
        if !override_identity {
            return Err(ClaimError::IdentityMismatch {
                expected: record.beneficiary,
                actual: caller,
            });
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeChain {
        record: Option<InheritanceRecord>,
    }

    #[async_trait]
    impl ChainReader for FakeChain {
        async fn read_record(
            &self,
            _id: &InheritanceId,
        ) -> Result<InheritanceRecord, ChainError> {
            self.record
                .clone()
                .ok_or_else(|| ChainError::AllEndpointsFailed("connection refused".into()))
        }
    }

    fn record(state: RecordState) -> InheritanceRecord {
        InheritanceRecord {
            testator: Address([0x11; 20]),
            beneficiary: Address([0x22; 20]),
            grace_period_secs: 86400,
            state,
            storage_locator: [0xAB; 32],
            scheduled_transfer_time: None,
        }
    }

    fn id() -> InheritanceId {
        InheritanceId([0u8; 32])
    }

    #[tokio::test]
    async fn test_claimable_state_passes() {
        let chain = FakeChain {
            record: Some(record(RecordState::Claimable)),
        };
        let result = check_claimable(&chain, &id(), Address([0x22; 20]), false).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_every_other_state_rejected_with_its_own_reason() {
        for state in [
            RecordState::Designated,
            RecordState::Claimed,
            RecordState::Revoked,
            RecordState::Purged,
        ] {
            let chain = FakeChain {
                record: Some(record(state)),
            };
            let result = check_claimable(&chain, &id(), Address([0x22; 20]), false).await;
            match result {
                Err(ClaimError::NotClaimable { state: got }) => assert_eq!(got, state),
                other => panic!("state {state:?} produced {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_identity_mismatch_fails_without_override() {
        let chain = FakeChain {
            record: Some(record(RecordState::Claimable)),
        };
        let result = check_claimable(&chain, &id(), Address([0x99; 20]), false).await;
        assert!(matches!(result, Err(ClaimError::IdentityMismatch { .. })));
    }

    #[tokio::test]
    async fn test_identity_mismatch_passes_with_override() {
        let chain = FakeChain {
            record: Some(record(RecordState::Claimable)),
        };
        let result = check_claimable(&chain, &id(), Address([0x99; 20]), true).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rpc_failure_is_unreadable() {
        let chain = FakeChain { record: None };
        let result = check_claimable(&chain, &id(), Address([0x22; 20]), false).await;
        assert!(matches!(result, Err(ClaimError::Unreadable(_))));
    }
}
