//! # solsocial
//!
//! Content core for a social client whose backing store is an NFT
//! collection: profiles, posts, and replies are minted records whose
//! attribute metadata doubles as the data schema.
//!
//! The ledger is an append-only record store with exactly one read shape
//! (all records by creator — expensive, unordered, rate-limited) and no
//! query-by-attribute. This crate makes that usable: a serialized
//! rate-limited request queue, full-collection scans with timeouts and
//! stale-cache fallback, attribute classification into typed entities, a
//! TTL cache, and a mint pipeline with progress reporting.
//!
//! ```no_run
//! use std::sync::Arc;
//! use solsocial::{ClientConfig, SocialClient};
//! use solsocial::ledger::DasLedgerReader;
//! use solsocial::index_core::ContentType;
//!
//! # async fn run() -> Result<(), solsocial::SocialError> {
//! let config = ClientConfig::from_env()?;
//! let reader = Arc::new(DasLedgerReader::new(&config.rpc_url).expect("http client"));
//! let client = SocialClient::new(config, reader);
//! let feed = client.list_content(Some(ContentType::Post)).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod index_core;
pub mod ledger;
pub mod social;

pub use config::ClientConfig;
pub use error::{MintFailureKind, SocialError};
pub use index_core::{ContentType, Entity, Post, Profile, Reply};
pub use social::{ContentDraft, ImageUpload, ProgressPhase, SocialClient};
