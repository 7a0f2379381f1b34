//! Error taxonomy for the content core
//!
//! Only `NotConfigured`, `ScanFailed`, and `MintFailed` are meant to reach
//! the UI. Everything else is absorbed internally into a degraded result
//! (empty list, stale cache entry, imageless record).

use std::fmt;

/// Boxed error produced by ledger/storage collaborators.
///
/// Collaborator traits stay opaque about their transport; the core
/// classifies their failures by inspecting the message.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum SocialError {
    /// Collection address or a required collaborator is missing/invalid.
    /// Fatal to the calling operation, no retry.
    NotConfigured(String),

    /// The remote ledger answered with a 429-equivalent. Transient;
    /// resolved by queue cooldown plus cache fallback.
    RateLimited,

    /// A scan outlived its wall-clock budget. Soft failure: the caller
    /// receives an empty result, never this error.
    ScanTimedOut,

    /// Hard read failure after the stale-cache fallback was exhausted.
    ScanFailed(String),

    /// Image upload failed. Non-terminal: creation continues imageless.
    UploadFailed(String),

    /// Mint (or metadata attach) failed. Terminal for the create operation.
    MintFailed(MintFailureKind),

    /// Draft rejected before any network work (length/required fields).
    InvalidContent(String),

    /// The request queue worker is gone. Should not happen in a healthy
    /// process; surfaced as an internal error.
    QueueClosed,
}

impl SocialError {
    /// True for failures the queue should answer with a dispatch cooldown.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SocialError::RateLimited)
    }
}

impl fmt::Display for SocialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialError::NotConfigured(what) => write!(f, "Not configured: {}", what),
            SocialError::RateLimited => write!(f, "Rate limited by the ledger RPC endpoint"),
            SocialError::ScanTimedOut => write!(f, "Collection scan timed out"),
            SocialError::ScanFailed(msg) => {
                write!(f, "Collection scan failed, try again later: {}", msg)
            }
            SocialError::UploadFailed(msg) => write!(f, "Image upload failed: {}", msg),
            SocialError::MintFailed(kind) => write!(f, "{}", kind),
            SocialError::InvalidContent(msg) => write!(f, "Invalid content: {}", msg),
            SocialError::QueueClosed => write!(f, "Request queue is no longer running"),
        }
    }
}

impl std::error::Error for SocialError {}

/// Sub-classification of a failed mint, each with its own user-facing
/// message so the UI can tell a broke wallet from a declined popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintFailureKind {
    InsufficientFunds,
    UserRejected,
    NetworkCongestion,
    SigningFailed,
    Other(String),
}

impl MintFailureKind {
    /// Map a raw collaborator error message onto a failure kind.
    ///
    /// Wallet adapters and RPC nodes only expose stringly-typed errors,
    /// so this goes by well-known substrings, first match wins.
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("insufficient") {
            MintFailureKind::InsufficientFunds
        } else if msg.contains("user rejected") || msg.contains("rejected the request") {
            MintFailureKind::UserRejected
        } else if msg.contains("blockhash") || msg.contains("congest") || msg.contains("timed out")
        {
            MintFailureKind::NetworkCongestion
        } else if msg.contains("signature") || msg.contains("signing") {
            MintFailureKind::SigningFailed
        } else {
            MintFailureKind::Other(message.to_string())
        }
    }
}

impl fmt::Display for MintFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintFailureKind::InsufficientFunds => {
                write!(f, "Mint failed: wallet has insufficient funds for this transaction")
            }
            MintFailureKind::UserRejected => {
                write!(f, "Mint failed: the transaction was rejected in the wallet")
            }
            MintFailureKind::NetworkCongestion => {
                write!(f, "Mint failed: the network is congested, try again shortly")
            }
            MintFailureKind::SigningFailed => {
                write!(f, "Mint failed: the transaction could not be signed")
            }
            MintFailureKind::Other(msg) => write!(f, "Mint failed: {}", msg),
        }
    }
}
