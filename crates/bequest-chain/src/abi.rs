//! Call-data encoding and return-data decoding for the contract's
//! `getInheritance(bytes32)` view function.
//!
//! The return value is six 32-byte ABI words:
//!
//! ```text
//! word 0: testator address        (left-padded to 32)
//! word 1: beneficiary address     (left-padded to 32)
//! word 2: grace period, seconds   (uint64)
//! word 3: lifecycle state         (uint8: 0..=4)
//! word 4: storage locator         (bytes32, raw)
//! word 5: scheduled transfer time (uint64 unix, 0 = unset)
//! ```

use bequest_core::types::{Address, InheritanceId, InheritanceRecord, RecordState};
use thiserror::Error;

/// First four bytes of keccak256("getInheritance(bytes32)").
pub const GET_INHERITANCE_SELECTOR: [u8; 4] = [0xb7, 0x32, 0x52, 0x9a];

const WORD: usize = 32;
const RETURN_WORDS: usize = 6;

#[derive(Error, Debug)]
pub enum AbiError {
    #[error("Return data is {len} bytes, expected {}", RETURN_WORDS * WORD)]
    WrongReturnLength { len: usize },

    #[error("Word {word} has non-zero padding for a {kind} value")]
    DirtyPadding { word: usize, kind: &'static str },

    #[error("Invalid record state: {0}")]
    InvalidState(#[from] bequest_core::types::TypeError),
}

/// Build the `eth_call` data payload: selector followed by the padded ID.
pub fn encode_get_inheritance(id: &InheritanceId) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&GET_INHERITANCE_SELECTOR);
    data.extend_from_slice(id.as_bytes());
    data
}

fn word(data: &[u8], index: usize) -> &[u8] {
    &data[index * WORD..(index + 1) * WORD]
}

fn decode_address(data: &[u8], index: usize) -> Result<Address, AbiError> {
    let w = word(data, index);
    if w[..12].iter().any(|&b| b != 0) {
        return Err(AbiError::DirtyPadding {
            word: index,
            kind: "address",
        });
    }
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&w[12..]);
    Ok(Address(addr))
}

fn decode_u64(data: &[u8], index: usize) -> Result<u64, AbiError> {
    let w = word(data, index);
    if w[..24].iter().any(|&b| b != 0) {
        return Err(AbiError::DirtyPadding {
            word: index,
            kind: "uint64",
        });
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&w[24..]);
    Ok(u64::from_be_bytes(buf))
}

fn decode_u8(data: &[u8], index: usize) -> Result<u8, AbiError> {
    let w = word(data, index);
    if w[..31].iter().any(|&b| b != 0) {
        return Err(AbiError::DirtyPadding {
            word: index,
            kind: "uint8",
        });
    }
    Ok(w[31])
}

/// Decode the six-word return tuple into an [`InheritanceRecord`].
pub fn decode_inheritance_record(data: &[u8]) -> Result<InheritanceRecord, AbiError> {
    if data.len() != RETURN_WORDS * WORD {
        return Err(AbiError::WrongReturnLength { len: data.len() });
    }

    let testator = decode_address(data, 0)?;
    let beneficiary = decode_address(data, 1)?;
    let grace_period_secs = decode_u64(data, 2)?;
    let state = RecordState::from_u8(decode_u8(data, 3)?)?;

    let mut storage_locator = [0u8; 32];
    storage_locator.copy_from_slice(word(data, 4));

    let scheduled = decode_u64(data, 5)?;
    let scheduled_transfer_time = (scheduled != 0).then_some(scheduled);

    Ok(InheritanceRecord {
        testator,
        beneficiary,
        grace_period_secs,
        state,
        storage_locator,
        scheduled_transfer_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_return_data(state: u8, scheduled: u64) -> Vec<u8> {
        let mut data = vec![0u8; RETURN_WORDS * WORD];
        // testator = 0x11..11, beneficiary = 0x22..22
        data[12..32].fill(0x11);
        data[44..64].fill(0x22);
        // grace period = 86400
        data[88..96].copy_from_slice(&86400u64.to_be_bytes());
        data[127] = state;
        // locator
        data[128..160].fill(0xAB);
        data[184..192].copy_from_slice(&scheduled.to_be_bytes());
        data
    }

    #[test]
    fn test_encode_call_data() {
        let id = InheritanceId([0xCD; 32]);
        let data = encode_get_inheritance(&id);

        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &GET_INHERITANCE_SELECTOR);
        assert_eq!(&data[4..], &[0xCD; 32]);
    }

    #[test]
    fn test_decode_full_record() {
        let data = make_return_data(1, 1_700_000_000);
        let record = decode_inheritance_record(&data).unwrap();

        assert_eq!(record.testator, Address([0x11; 20]));
        assert_eq!(record.beneficiary, Address([0x22; 20]));
        assert_eq!(record.grace_period_secs, 86400);
        assert_eq!(record.state, RecordState::Claimable);
        assert_eq!(record.storage_locator, [0xAB; 32]);
        assert_eq!(record.scheduled_transfer_time, Some(1_700_000_000));
    }

    #[test]
    fn test_zero_schedule_decodes_as_none() {
        let record = decode_inheritance_record(&make_return_data(0, 0)).unwrap();
        assert_eq!(record.state, RecordState::Designated);
        assert_eq!(record.scheduled_transfer_time, None);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(matches!(
            decode_inheritance_record(&[0u8; 191]),
            Err(AbiError::WrongReturnLength { len: 191 })
        ));
        assert!(matches!(
            decode_inheritance_record(&[]),
            Err(AbiError::WrongReturnLength { len: 0 })
        ));
    }

    #[test]
    fn test_unknown_state_rejected() {
        let data = make_return_data(9, 0);
        assert!(matches!(
            decode_inheritance_record(&data),
            Err(AbiError::InvalidState(_))
        ));
    }

    #[test]
    fn test_dirty_address_padding_rejected() {
        let mut data = make_return_data(1, 0);
        data[0] = 0x01; // junk in testator padding
        assert!(matches!(
            decode_inheritance_record(&data),
            Err(AbiError::DirtyPadding { word: 0, .. })
        ));
    }

    #[test]
    fn test_oversized_u64_rejected() {
        let mut data = make_return_data(1, 0);
        data[70] = 0x01; // grace period word, above the low 8 bytes
        assert!(matches!(
            decode_inheritance_record(&data),
            Err(AbiError::DirtyPadding { word: 2, .. })
        ));
    }
}
