//! Ledger collaborator interfaces
//!
//! The core treats the chain as an opaque, rate-limited, append-only
//! record store: one expensive read (`records_by_creator`), one mint path
//! (`mint` + `attach_metadata`), one pinning upload. Everything else —
//! transaction assembly, fee handling, wallet adapters — lives behind
//! these traits in the calling application.

use std::str::FromStr;

use async_trait::async_trait;
use solana_pubkey::Pubkey;

use crate::error::CollaboratorError;

pub mod rpc;
pub mod types;
pub mod upload;

pub use rpc::DasLedgerReader;
pub use types::{Attribute, AttrValue, ContentRecord, MintReceipt, MintRequest, RecordMetadata};
pub use upload::HttpUploader;

/// Read side of the ledger: fetch every record a creator address issued.
///
/// Expensive, unpaginated, unordered, rate-limited. There is no
/// query-by-attribute; all filtering happens client-side.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn records_by_creator(
        &self,
        creator: &str,
        limit: usize,
    ) -> Result<Vec<ContentRecord>, CollaboratorError>;
}

/// Write side of the ledger. Mint calls are wallet-signed transactions and
/// are never routed through the read queue.
#[async_trait]
pub trait LedgerMinter: Send + Sync {
    /// Mint a record shell. The metadata URI is attached afterwards.
    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt, CollaboratorError>;

    /// Upload the metadata document and point the record at it.
    /// Returns the final metadata URI.
    async fn attach_metadata(
        &self,
        id: &str,
        metadata: &serde_json::Value,
    ) -> Result<String, CollaboratorError>;
}

/// Content-addressed object storage for images.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, mime: &str) -> Result<String, CollaboratorError>;
}

/// Wallet identity supplied by the calling context.
///
/// The required capabilities are fixed by this trait instead of probed at
/// call time; the core itself only reads `address`, the signing methods
/// exist for minter implementations.
pub trait Identity: Send + Sync {
    fn address(&self) -> &str;

    fn sign_transaction(&self, transaction: &[u8]) -> Result<Vec<u8>, CollaboratorError>;

    fn sign_all_transactions(
        &self,
        transactions: &[Vec<u8>],
    ) -> Result<Vec<Vec<u8>>, CollaboratorError>;
}

/// True when `address` parses as a base58 public key.
pub fn is_valid_address(address: &str) -> bool {
    Pubkey::from_str(address).is_ok()
}

/// Rate-limit detection over opaque collaborator errors.
///
/// RPC providers surface 429s with wildly different error shapes; the
/// status code in the message text is the one stable marker.
pub fn is_rate_limit_error(error: &CollaboratorError) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("429") || msg.contains("too many requests") || msg.contains("rate limit")
}
