//! Bequest Chain Client
//!
//! Read-only access to the inheritance contract via JSON-RPC `eth_call`:
//! - Record lookup (lifecycle state, beneficiary, storage locator)
//! - Ordered fallback across a pre-configured endpoint list
//!
//! The pipeline never mutates chain state; claim transactions are submitted
//! by separate tooling. Nothing here holds key material.
//!
//! # Example
//!
//! ```ignore
//! use bequest_chain::{default_endpoints, ChainClient};
//! use bequest_core::{InheritanceId, Network};
//!
//! let client = ChainClient::new(
//!     default_endpoints(Network::Mainnet),
//!     "0x4bbe...".parse()?,
//!     Network::Mainnet,
//! )?;
//! let record = client.read_record(&id).await?;
//! println!("state: {}", record.state);
//! ```

pub mod abi;

use bequest_core::types::{Address, InheritanceId, InheritanceRecord, Network};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Attempts per endpoint before moving to the next one in the list.
const ATTEMPTS_PER_ENDPOINT: usize = 2;

/// Errors from contract reads.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("No RPC endpoints configured")]
    NoEndpoints,

    #[error("All RPC endpoints failed, last error: {0}")]
    AllEndpointsFailed(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),

    #[error("ABI decode failed: {0}")]
    Abi(#[from] abi::AbiError),
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client for the inheritance contract.
pub struct ChainClient {
    http: reqwest::Client,
    endpoints: Vec<String>,
    contract: Address,
    network: Network,
}

impl ChainClient {
    /// Create a client over an ordered endpoint list. The first endpoint is
    /// preferred; later ones are fallbacks.
    pub fn new(
        endpoints: Vec<String>,
        contract: Address,
        network: Network,
    ) -> Result<Self, ChainError> {
        if endpoints.is_empty() {
            return Err(ChainError::NoEndpoints);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            endpoints,
            contract,
            network,
        })
    }

    /// Read an inheritance record via the contract's view function.
    ///
    /// Retry is bounded: each configured endpoint is tried a fixed small
    /// number of times in order, stopping at the first success. RPC-level
    /// errors (reverts, bad params) are not retried — only transport
    /// failures move the rotation along.
    pub async fn read_record(
        &self,
        id: &InheritanceId,
    ) -> Result<InheritanceRecord, ChainError> {
        let call_data = abi::encode_get_inheritance(id);
        let mut last_error = String::new();

        for endpoint in &self.endpoints {
            for attempt in 1..=ATTEMPTS_PER_ENDPOINT {
                match self.eth_call(endpoint, &call_data).await {
                    Ok(return_data) => {
                        return Ok(abi::decode_inheritance_record(&return_data)?);
                    }
                    Err(ChainError::Rpc { code, message }) => {
                        // The node answered; retrying elsewhere won't change it
                        return Err(ChainError::Rpc { code, message });
                    }
                    Err(e) => {
                        tracing::warn!(
                            endpoint,
                            attempt,
                            error = %e,
                            "RPC endpoint failed, rotating"
                        );
                        last_error = e.to_string();
                    }
                }
            }
        }

        Err(ChainError::AllEndpointsFailed(last_error))
    }

    async fn eth_call(&self, endpoint: &str, call_data: &[u8]) -> Result<Vec<u8>, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                {
                    "to": self.contract.to_string(),
                    "data": format!("0x{}", hex::encode(call_data)),
                },
                "latest",
            ],
        });

        let response: RpcResponse = self
            .http
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?
            .error_for_status()
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?
            .json()
            .await
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;

        if let Some(err) = response.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| ChainError::MalformedResponse("missing result field".into()))?;
        let stripped = result.strip_prefix("0x").unwrap_or(&result);
        hex::decode(stripped).map_err(|e| ChainError::MalformedResponse(e.to_string()))
    }

    /// Network this client is configured for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Contract address this client reads from.
    pub fn contract(&self) -> Address {
        self.contract
    }
}

/// Default public RPC endpoints for each network.
pub fn default_endpoints(network: Network) -> Vec<String> {
    let endpoints: &[&str] = match network {
        Network::Mainnet => &[
            "https://eth.llamarpc.com",
            "https://rpc.ankr.com/eth",
            "https://cloudflare-eth.com",
        ],
        Network::Sepolia => &[
            "https://ethereum-sepolia-rpc.publicnode.com",
            "https://rpc.sepolia.org",
        ],
    };
    endpoints.iter().map(|s| s.to_string()).collect()
}
