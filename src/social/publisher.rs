//! Content mutation pipeline
//!
//! One `publish` call spans image upload, metadata assembly, mint, and
//! metadata attach, and reads as atomic to the caller. Each phase is
//! observable through a progress callback so a form can show "uploading"
//! vs "creating". Upload failure degrades to an imageless record; mint
//! failure is terminal. The pipeline retries nothing.
//!
//! Mint calls are wallet-signed transactions and deliberately bypass the
//! read queue.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::config::{DEFAULT_AVATAR_URL, MAX_CONTENT_CHARS, METADATA_SYMBOL};
use crate::error::{MintFailureKind, SocialError};
use crate::index_core::cache::ContentCache;
use crate::index_core::entity::ContentType;
use crate::ledger::types::{Attribute, ContentRecord, MintRequest, RecordMetadata};
use crate::ledger::upload::validate_image;
use crate::ledger::{Identity, LedgerMinter, Uploader};

/// Observable phases of one create operation, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Uploading,
    Creating,
    Success,
    Error,
}

impl ProgressPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressPhase::Uploading => "uploading",
            ProgressPhase::Creating => "creating",
            ProgressPhase::Success => "success",
            ProgressPhase::Error => "error",
        }
    }
}

/// Progress callback supplied by the caller.
pub type ProgressFn = dyn Fn(ProgressPhase) + Send + Sync;

/// Raw image bytes handed in by the caller's form layer.
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// What to create. Caller-facing fields only; `type`, `author`, and
/// `timestamp` attributes are injected by the pipeline.
pub enum ContentDraft {
    Profile {
        username: String,
        bio: String,
        image: Option<ImageUpload>,
    },
    Post {
        content: String,
        image: Option<ImageUpload>,
    },
    Reply {
        content: String,
        parent_post_id: String,
    },
}

impl ContentDraft {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentDraft::Profile { .. } => ContentType::Profile,
            ContentDraft::Post { .. } => ContentType::Post,
            ContentDraft::Reply { .. } => ContentType::Reply,
        }
    }

    fn validate(&self) -> Result<(), SocialError> {
        match self {
            ContentDraft::Profile { username, .. } => {
                if username.trim().is_empty() {
                    return Err(SocialError::InvalidContent(
                        "username must not be empty".to_string(),
                    ));
                }
            }
            ContentDraft::Post { content, .. } | ContentDraft::Reply { content, .. } => {
                let chars = content.chars().count();
                if chars > MAX_CONTENT_CHARS {
                    return Err(SocialError::InvalidContent(format!(
                        "content is {} characters, limit is {}",
                        chars, MAX_CONTENT_CHARS
                    )));
                }
            }
        }
        if let ContentDraft::Reply { parent_post_id, .. } = self {
            if parent_post_id.is_empty() {
                return Err(SocialError::InvalidContent(
                    "reply needs a parent post".to_string(),
                ));
            }
        }
        Ok(())
    }
}

pub struct ContentPublisher {
    minter: Arc<dyn LedgerMinter>,
    uploader: Option<Arc<dyn Uploader>>,
    identity: Arc<dyn Identity>,
    cache: Arc<ContentCache>,
    collection: String,
}

impl ContentPublisher {
    pub fn new(
        minter: Arc<dyn LedgerMinter>,
        uploader: Option<Arc<dyn Uploader>>,
        identity: Arc<dyn Identity>,
        cache: Arc<ContentCache>,
        collection: String,
    ) -> Self {
        Self {
            minter,
            uploader,
            identity,
            cache,
            collection,
        }
    }

    /// Create one record. Returns a descriptor usable by the caller right
    /// away, without waiting for the next collection scan to find it.
    pub async fn publish(
        &self,
        draft: ContentDraft,
        progress: Option<&ProgressFn>,
    ) -> Result<ContentRecord, SocialError> {
        draft.validate().map_err(|error| {
            emit(progress, ProgressPhase::Error);
            error
        })?;

        let content_type = draft.content_type();
        let (name, description, mut attributes, image) = match draft {
            ContentDraft::Profile {
                username,
                bio,
                image,
            } => (
                format!("Profile #{}", username),
                bio,
                vec![Attribute::new("username", username.as_str())],
                image,
            ),
            ContentDraft::Post { content, image } => (
                format!("Post #{}", rand::thread_rng().gen_range(0..1_000_000)),
                content,
                Vec::new(),
                image,
            ),
            ContentDraft::Reply {
                content,
                parent_post_id,
            } => (
                format!("Reply #{}", rand::thread_rng().gen_range(0..1_000_000)),
                content,
                vec![Attribute::new("parent_post", parent_post_id.as_str())],
                None,
            ),
        };

        let image_url = match image {
            Some(upload) => {
                emit(progress, ProgressPhase::Uploading);
                self.upload_image(upload).await
            }
            // A profile without an image gets the stock avatar
            None if content_type == ContentType::Profile => DEFAULT_AVATAR_URL.to_string(),
            None => String::new(),
        };

        inject_if_absent(&mut attributes, "type", content_type.as_str().into());
        inject_if_absent(&mut attributes, "author", self.identity.address().into());
        inject_if_absent(&mut attributes, "timestamp", Utc::now().timestamp().into());

        let metadata = RecordMetadata {
            name: name.clone(),
            symbol: METADATA_SYMBOL.to_string(),
            description,
            image: image_url,
            attributes,
        };

        emit(progress, ProgressPhase::Creating);
        log::info!("✨ minting {} \"{}\"", content_type.as_str(), name);

        let request = MintRequest {
            name,
            uri: String::new(),
            seller_fee_basis_points: 0,
            collection: self.collection.clone(),
            creators: vec![self.identity.address().to_string()],
        };

        let receipt = match self.minter.mint(&request).await {
            Ok(receipt) => receipt,
            Err(error) => {
                emit(progress, ProgressPhase::Error);
                let kind = MintFailureKind::classify(&error.to_string());
                log::error!("❌ mint failed: {}", error);
                return Err(SocialError::MintFailed(kind));
            }
        };
        log::debug!("record minted with id {}", receipt.id);

        let metadata_json = serde_json::to_value(&metadata)
            .map_err(|error| SocialError::MintFailed(MintFailureKind::Other(error.to_string())))?;
        let uri = match self.minter.attach_metadata(&receipt.id, &metadata_json).await {
            Ok(uri) => uri,
            Err(error) => {
                emit(progress, ProgressPhase::Error);
                let kind = MintFailureKind::classify(&error.to_string());
                log::error!("❌ metadata attach failed: {}", error);
                return Err(SocialError::MintFailed(kind));
            }
        };

        // Force the next read of this collection (and of the acting
        // owner's profile) back to the ledger.
        self.cache.invalidate_collection(&self.collection);
        self.cache.invalidate_profile(self.identity.address());

        emit(progress, ProgressPhase::Success);
        log::info!("✅ {} created: {}", content_type.as_str(), receipt.id);

        Ok(ContentRecord::from_metadata(&receipt.id, &uri, &metadata))
    }

    /// Upload with graceful degradation: every failure path lands on an
    /// empty image URL and a warning, never an error to the caller.
    async fn upload_image(&self, upload: ImageUpload) -> String {
        let failed = |message: String| {
            log::warn!("⚠️ {}, continuing without image", SocialError::UploadFailed(message));
            String::new()
        };

        if let Err(message) = validate_image(upload.bytes.len(), &upload.mime) {
            return failed(message);
        }
        let uploader = match &self.uploader {
            Some(uploader) => uploader,
            None => return failed("no uploader configured".to_string()),
        };
        match uploader.upload(upload.bytes, &upload.mime).await {
            Ok(url) => url,
            Err(error) => failed(error.to_string()),
        }
    }
}

fn emit(progress: Option<&ProgressFn>, phase: ProgressPhase) {
    if let Some(callback) = progress {
        callback(phase);
    }
}

/// First-match injection: a caller-supplied attribute with the same key
/// wins over the pipeline's default.
fn inject_if_absent(attributes: &mut Vec<Attribute>, key: &str, value: crate::ledger::AttrValue) {
    if !attributes.iter().any(|attr| attr.key == key) {
        attributes.push(Attribute {
            key: key.to_string(),
            value,
        });
    }
}
