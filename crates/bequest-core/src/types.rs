//! Core types shared across the Bequest crates.
//!
//! Inheritance records are owned by the on-chain contract; the claim pipeline
//! only ever reads them, so every type here is a plain value with no mutation
//! helpers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Error, Debug)]
pub enum TypeError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Unknown record state: {0}")]
    UnknownState(u8),
}

/// Strip an optional `0x` prefix and decode fixed-length hex.
fn parse_hex_array<const N: usize>(s: &str) -> Result<[u8; N], TypeError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| TypeError::WrongLength { expected: N, actual })
}

/// 32-byte opaque identifier of an on-chain inheritance record.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InheritanceId(pub [u8; 32]);

impl InheritanceId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex prefix (first 4 bytes) used for output filenames.
    pub fn short_prefix(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for InheritanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for InheritanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InheritanceId({})", self)
    }
}

impl FromStr for InheritanceId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_array(s).map(Self)
    }
}

/// 20-byte chain account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_array(s).map(Self)
    }
}

/// Supported chain networks. The key-distribution service and the RPC
/// endpoint lists are both keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Sepolia,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Sepolia => "sepolia",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "sepolia" => Ok(Network::Sepolia),
            other => Err(TypeError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Lifecycle state of an inheritance record, as encoded by the contract.
///
/// Transitions are owned by the contract: `Designated -> Claimable ->
/// Claimed`, with side branches `Designated -> Revoked` and any non-terminal
/// state `-> Purged`. The claim pipeline is only valid while `Claimable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordState {
    Designated = 0,
    Claimable = 1,
    Claimed = 2,
    Revoked = 3,
    Purged = 4,
}

impl RecordState {
    pub fn from_u8(value: u8) -> Result<Self, TypeError> {
        match value {
            0 => Ok(RecordState::Designated),
            1 => Ok(RecordState::Claimable),
            2 => Ok(RecordState::Claimed),
            3 => Ok(RecordState::Revoked),
            4 => Ok(RecordState::Purged),
            other => Err(TypeError::UnknownState(other)),
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordState::Designated => "designated",
            RecordState::Claimable => "claimable",
            RecordState::Claimed => "claimed",
            RecordState::Revoked => "revoked",
            RecordState::Purged => "purged",
        };
        f.write_str(s)
    }
}

/// An on-chain inheritance record, read via the contract's view function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritanceRecord {
    pub testator: Address,
    pub beneficiary: Address,
    /// Grace period in seconds before a claimable record may be purged.
    pub grace_period_secs: u64,
    pub state: RecordState,
    /// 32-byte pointer into the permanent-storage network.
    pub storage_locator: [u8; 32],
    /// Unix timestamp of a scheduled transfer, if one was set.
    pub scheduled_transfer_time: Option<u64>,
}

/// A recovered per-asset symmetric key.
///
/// Exists only in memory for the duration of asset decryption; zeroized on
/// drop, never serialized, never logged (Debug is redacted). Deliberately
/// does not implement `PartialEq`: a derived comparison on secret bytes is
/// not constant-time. Tests compare via [`SymmetricKey::as_bytes`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(Vec<u8>);

impl SymmetricKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED; {} bytes])", self.0.len())
    }
}
