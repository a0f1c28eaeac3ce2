//! HTTP client for the permanent-storage gateway.
//!
//! Two read endpoints per transaction id:
//! - `GET {gateway}/tx/{id}` — transaction metadata, including a tag list
//!   with base64url-encoded name/value pairs (Content-Type lives here)
//! - `GET {gateway}/{id}` — the raw payload bytes

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

/// Default public gateway.
pub const DEFAULT_GATEWAY: &str = "https://arweave.net";

/// Fallback extension when no Content-Type tag is present or recognized.
const FALLBACK_EXTENSION: &str = "bin";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transaction not found")]
    NotFound,

    #[error("Gateway transport error: {0}")]
    Transport(String),

    #[error("Malformed gateway response: {0}")]
    Malformed(String),
}

/// Decoded transaction metadata.
#[derive(Debug, Clone, Default)]
pub struct TxMetadata {
    /// Value of the Content-Type tag, if the transaction carries one.
    pub content_type: Option<String>,
}

impl TxMetadata {
    /// Infer a file extension from the Content-Type tag.
    pub fn extension(&self) -> String {
        self.content_type
            .as_deref()
            .and_then(|ct| mime_guess::get_mime_extensions_str(ct))
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
    }
}

/// Read access to the permanent-storage network, keyed by textual
/// transaction id. Implemented over HTTP in [`HttpGateway`]; tests use
/// in-memory fakes.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Lightweight existence probe: fetch metadata for `tx_id`.
    async fn probe(&self, tx_id: &str) -> Result<TxMetadata, GatewayError>;

    /// Fetch the full payload bytes for `tx_id`.
    async fn download(&self, tx_id: &str) -> Result<Vec<u8>, GatewayError>;
}

#[derive(Deserialize)]
struct TxResponse {
    #[serde(default)]
    tags: Vec<TxTag>,
}

#[derive(Deserialize)]
struct TxTag {
    name: String,
    value: String,
}

/// reqwest-backed [`Gateway`] implementation.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn decode_tag(raw: &str) -> Result<String, GatewayError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|e| GatewayError::Malformed(format!("bad tag encoding: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| GatewayError::Malformed(format!("non-UTF-8 tag: {e}")))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn probe(&self, tx_id: &str) -> Result<TxMetadata, GatewayError> {
        let url = format!("{}/tx/{}", self.base_url, tx_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }
        let response = response
            .error_for_status()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let tx: TxResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let mut content_type = None;
        for tag in &tx.tags {
            let name = Self::decode_tag(&tag.name)?;
            if name.eq_ignore_ascii_case("content-type") {
                content_type = Some(Self::decode_tag(&tag.value)?);
                break;
            }
        }

        tracing::debug!(tx_id, ?content_type, "storage probe succeeded");
        Ok(TxMetadata { content_type })
    }

    async fn download(&self, tx_id: &str) -> Result<Vec<u8>, GatewayError> {
        let url = format!("{}/{}", self.base_url, tx_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound);
        }
        let bytes = response
            .error_for_status()
            .map_err(|e| GatewayError::Transport(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_content_type() {
        let meta = TxMetadata {
            content_type: Some("application/pdf".to_string()),
        };
        assert_eq!(meta.extension(), "pdf");
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(TxMetadata { content_type: None }.extension(), "bin");
        let unknown = TxMetadata {
            content_type: Some("application/x-no-such-type".to_string()),
        };
        assert_eq!(unknown.extension(), "bin");
    }

    #[test]
    fn test_tag_decoding() {
        // "Content-Type" / "text/plain" in URL-safe base64 without padding
        assert_eq!(
            HttpGateway::decode_tag("Q29udGVudC1UeXBl").unwrap(),
            "Content-Type"
        );
        assert_eq!(
            HttpGateway::decode_tag("dGV4dC9wbGFpbg").unwrap(),
            "text/plain"
        );
        assert!(HttpGateway::decode_tag("not base64!!").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let gw = HttpGateway::new("https://arweave.net/");
        assert_eq!(gw.base_url, "https://arweave.net");
    }
}
