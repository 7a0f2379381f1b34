//! DAS RPC reader
//!
//! Fetches every record issued by a creator address through a Digital
//! Asset Standard JSON-RPC endpoint (`getAssetsByCreator`). This is the
//! only server-side filter the ledger offers; type filtering and
//! relationship reconstruction happen client-side after the fetch.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::CollaboratorError;
use crate::ledger::types::{Attribute, ContentRecord};
use crate::ledger::LedgerReader;

/// DAS asset entry, reduced to the fields the content core reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DasAsset {
    pub id: String,
    pub content: Option<DasContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DasContent {
    #[serde(default)]
    pub json_uri: String,
    pub metadata: Option<DasMetadata>,
    pub links: Option<DasLinks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DasMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DasLinks {
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DasResponse {
    result: Option<DasResult>,
    error: Option<DasError>,
}

#[derive(Debug, Deserialize)]
struct DasResult {
    #[serde(default)]
    items: Vec<DasAsset>,
}

#[derive(Debug, Deserialize)]
struct DasError {
    code: i64,
    message: String,
}

/// Ledger reader over a DAS-capable RPC endpoint.
///
/// One shared HTTP connection pool per reader; callers serialize access
/// through the request queue, the reader itself does no throttling.
pub struct DasLedgerReader {
    client: reqwest::Client,
    rpc_url: String,
}

impl DasLedgerReader {
    pub fn new(rpc_url: &str) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
        })
    }
}

#[async_trait]
impl LedgerReader for DasLedgerReader {
    async fn records_by_creator(
        &self,
        creator: &str,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, CollaboratorError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "solsocial",
            "method": "getAssetsByCreator",
            "params": {
                "creatorAddress": creator,
                "onlyVerified": false,
                "page": 1,
                "limit": limit,
            },
        });

        let response = self.client.post(&self.rpc_url).json(&body).send().await?;

        if !response.status().is_success() {
            // Keep the status code in the message; rate-limit detection
            // keys off the literal 429.
            return Err(format!("DAS RPC error: {}", response.status()).into());
        }

        let parsed: DasResponse = response.json().await?;

        if let Some(error) = parsed.error {
            return Err(format!("DAS RPC error {}: {}", error.code, error.message).into());
        }

        let items = parsed.result.map(|r| r.items).unwrap_or_default();
        log::debug!("DAS returned {} assets for creator {}", items.len(), creator);

        Ok(items.iter().map(flatten_asset).collect())
    }
}

/// Flatten a DAS asset into a raw content record.
///
/// The metadata `description` lands under key `content`, the image link
/// under `image`, the name under `name`, then the trait list as-is. An
/// asset with no metadata still yields a record; the classifier drops it
/// for the missing `type` attribute.
fn flatten_asset(asset: &DasAsset) -> ContentRecord {
    let mut raw_attributes = Vec::new();
    let mut uri = String::new();

    if let Some(content) = &asset.content {
        uri = content.json_uri.clone();
        if let Some(metadata) = &content.metadata {
            raw_attributes.push(Attribute::new("name", metadata.name.as_str()));
            raw_attributes.push(Attribute::new("content", metadata.description.as_str()));
        }
        let image = content
            .links
            .as_ref()
            .and_then(|links| links.image.clone())
            .unwrap_or_default();
        raw_attributes.push(Attribute::new("image", image.as_str()));
        if let Some(metadata) = &content.metadata {
            raw_attributes.extend(metadata.attributes.iter().cloned());
        }
    }

    ContentRecord {
        id: asset.id.clone(),
        uri,
        raw_attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSET_JSON: &str = r#"{
        "id": "FakeAsset1111111111111111111111111111111111",
        "content": {
            "json_uri": "https://arweave.net/abc123",
            "metadata": {
                "name": "Post #123456",
                "description": "gm from the ledger",
                "attributes": [
                    {"trait_type": "type", "value": "post"},
                    {"trait_type": "author", "value": "Wallet111111111111111111111111111111111111"},
                    {"trait_type": "timestamp", "value": 1700000100}
                ]
            },
            "links": {"image": "https://arweave.net/img456"}
        }
    }"#;

    #[test]
    fn test_flatten_asset() {
        // Test: a DAS asset flattens into classifier-ready attributes
        let asset: DasAsset = serde_json::from_str(ASSET_JSON).unwrap();
        let record = flatten_asset(&asset);

        assert_eq!(record.id, "FakeAsset1111111111111111111111111111111111");
        assert_eq!(record.uri, "https://arweave.net/abc123");
        assert_eq!(record.first_attr("content").unwrap().as_str(), Some("gm from the ledger"));
        assert_eq!(record.first_attr("image").unwrap().as_str(), Some("https://arweave.net/img456"));
        assert_eq!(record.first_attr("type").unwrap().as_str(), Some("post"));
        assert_eq!(record.first_attr("timestamp").unwrap().as_i64(), Some(1700000100));
    }

    #[test]
    fn test_flatten_asset_without_metadata() {
        // Test: foreign assets with no metadata still produce a record
        let asset: DasAsset = serde_json::from_str(
            r#"{"id": "Bare111111111111111111111111111111111111111", "content": null}"#,
        )
        .unwrap();
        let record = flatten_asset(&asset);

        assert_eq!(record.id, "Bare111111111111111111111111111111111111111");
        assert!(record.uri.is_empty());
        assert!(record.first_attr("type").is_none());
    }

    #[test]
    fn test_response_parsing() {
        // Test: full JSON-RPC envelope round-trips into asset items
        let body = format!(
            r#"{{"jsonrpc":"2.0","id":"solsocial","result":{{"total":1,"items":[{}]}}}}"#,
            ASSET_JSON
        );
        let parsed: DasResponse = serde_json::from_str(&body).unwrap();
        assert!(parsed.error.is_none());
        assert_eq!(parsed.result.unwrap().items.len(), 1);
    }

    #[test]
    fn test_rpc_error_envelope() {
        // Test: an error envelope parses instead of panicking the reader
        let body = r#"{"jsonrpc":"2.0","id":"solsocial","error":{"code":-32600,"message":"rate limit exceeded"}}"#;
        let parsed: DasResponse = serde_json::from_str(body).unwrap();
        let error = parsed.error.unwrap();
        assert_eq!(error.code, -32600);
        assert!(error.message.contains("rate limit"));
    }
}
