//! Client for the key-distribution service.
//!
//! One endpoint: `GET {base}/api/v1/key/{inheritanceId}?network={network}`,
//! returning JSON with a hex-encoded `encryptedSymmetricKey` field. Absence
//! of the field (or a 404) means the key is not published yet — commonly a
//! race where the record passed the gate but the distribution side has not
//! caught up. The service is treated as an opaque contract; no authorization
//! properties are assumed beyond "the ciphertext only decrypts under the
//! correct beneficiary key".

use async_trait::async_trait;
use bequest_core::types::{InheritanceId, Network};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyServiceError {
    #[error("Key service transport error: {0}")]
    Transport(String),

    #[error("Malformed key service response: {0}")]
    Malformed(String),
}

/// Fetch access to address-bound encrypted key blobs.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// `Ok(None)` when the service has no blob published for this record.
    async fn fetch_encrypted_key(
        &self,
        id: &InheritanceId,
        network: Network,
    ) -> Result<Option<Vec<u8>>, KeyServiceError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyResponse {
    encrypted_symmetric_key: Option<String>,
}

/// reqwest-backed [`KeyService`] implementation.
pub struct HttpKeyService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpKeyService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl KeyService for HttpKeyService {
    async fn fetch_encrypted_key(
        &self,
        id: &InheritanceId,
        network: Network,
    ) -> Result<Option<Vec<u8>>, KeyServiceError> {
        let url = format!(
            "{}/api/v1/key/{}?network={}",
            self.base_url, id, network
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| KeyServiceError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: KeyResponse = response
            .error_for_status()
            .map_err(|e| KeyServiceError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| KeyServiceError::Malformed(e.to_string()))?;

        match body.encrypted_symmetric_key {
            None => Ok(None),
            Some(hex_blob) => {
                let stripped = hex_blob.strip_prefix("0x").unwrap_or(&hex_blob);
                let bytes = hex::decode(stripped)
                    .map_err(|e| KeyServiceError::Malformed(format!("bad key hex: {e}")))?;
                Ok(Some(bytes))
            }
        }
    }
}
