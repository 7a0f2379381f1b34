//! Client facade over the indexing core
//!
//! `SocialClient` is what the surrounding application talks to: typed
//! reads (feed, profile, replies) and the create path, all backed by the
//! scan/cache/classify machinery. A client built with just a reader is
//! read-only; minting needs the wallet-side collaborators.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::SocialError;
use crate::index_core::cache::ContentCache;
use crate::index_core::classify::classify;
use crate::index_core::entity::{ContentType, Entity, Post, Profile, Reply};
use crate::index_core::queue::RequestQueue;
use crate::index_core::scanner::CollectionScanner;
use crate::ledger::types::ContentRecord;
use crate::ledger::{is_valid_address, Identity, LedgerMinter, LedgerReader, Uploader};
use crate::social::publisher::{ContentDraft, ContentPublisher, ProgressFn};

pub struct SocialClient {
    config: ClientConfig,
    cache: Arc<ContentCache>,
    scanner: CollectionScanner,
    minter: Option<Arc<dyn LedgerMinter>>,
    uploader: Option<Arc<dyn Uploader>>,
    identity: Option<Arc<dyn Identity>>,
}

impl SocialClient {
    /// Read-only client. Must be called inside a tokio runtime (the
    /// request queue spawns its worker here).
    pub fn new(config: ClientConfig, reader: Arc<dyn LedgerReader>) -> Self {
        let cache = Arc::new(ContentCache::new(
            config.bulk_cache_ttl_secs,
            config.profile_cache_ttl_secs,
        ));
        let queue = RequestQueue::start(config.request_gap_ms, config.rate_limit_cooldown_ms);
        let scanner = CollectionScanner::new(
            reader,
            queue,
            cache.clone(),
            config.scan_limit,
            config.scan_timeout_ms,
        );
        Self {
            config,
            cache,
            scanner,
            minter: None,
            uploader: None,
            identity: None,
        }
    }

    /// Attach the wallet-side collaborators needed for `create_content`.
    pub fn with_wallet(mut self, minter: Arc<dyn LedgerMinter>, identity: Arc<dyn Identity>) -> Self {
        self.minter = Some(minter);
        self.identity = Some(identity);
        self
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Entities of the collection, optionally narrowed by type. Lists with
    /// timestamps come back newest-first.
    pub async fn list_content(
        &self,
        content_type: Option<ContentType>,
    ) -> Result<Vec<Entity>, SocialError> {
        let records = self
            .scanner
            .fetch(&self.config.collection_address, content_type)
            .await?;

        let mut entities: Vec<Entity> = records.iter().filter_map(classify).collect();
        if let Some(wanted) = content_type {
            entities.retain(|entity| entity.content_type() == wanted);
        }
        entities.sort_by(newest_first);
        Ok(entities)
    }

    /// Profile for a wallet, or None. When the ledger holds several
    /// profiles for one owner, the newest by timestamp attribute wins.
    pub async fn get_profile(&self, owner: &str) -> Result<Option<Profile>, SocialError> {
        if let Some(profile) = self.cache.get_profile(owner) {
            log::debug!("profile cache hit for {}", owner);
            return Ok(Some(profile));
        }

        let records = self
            .scanner
            .fetch(&self.config.collection_address, Some(ContentType::Profile))
            .await?;

        let profile = newest_profile_record(&records, owner)
            .and_then(classify)
            .and_then(|entity| match entity {
                Entity::Profile(profile) => Some(profile),
                _ => None,
            });

        if let Some(profile) = &profile {
            self.cache.put_profile(owner, profile.clone());
        } else {
            log::debug!("no profile found for wallet {}", owner);
        }
        Ok(profile)
    }

    /// Point lookup of a profile by its record id.
    pub async fn get_profile_by_id(&self, id: &str) -> Result<Option<Profile>, SocialError> {
        let records = self
            .scanner
            .fetch(&self.config.collection_address, Some(ContentType::Profile))
            .await?;

        Ok(records
            .iter()
            .find(|record| record.id == id)
            .and_then(classify)
            .and_then(|entity| match entity {
                Entity::Profile(profile) => Some(profile),
                _ => None,
            }))
    }

    /// Point lookup of a post by its record id, verifying the type.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, SocialError> {
        let records = self
            .scanner
            .fetch(&self.config.collection_address, Some(ContentType::Post))
            .await?;

        Ok(records
            .iter()
            .find(|record| record.id == id)
            .and_then(classify)
            .and_then(|entity| match entity {
                Entity::Post(post) => Some(post),
                _ => None,
            }))
    }

    /// A wallet's posts, newest-first.
    pub async fn list_posts_by_author(&self, owner: &str) -> Result<Vec<Post>, SocialError> {
        let posts = self
            .list_content(Some(ContentType::Post))
            .await?
            .into_iter()
            .filter_map(|entity| match entity {
                Entity::Post(post) if post.author_address == owner => Some(post),
                _ => None,
            })
            .collect();
        Ok(posts)
    }

    /// Replies under one post, oldest-first. Orphaned replies (no parent
    /// attribute) never show up here.
    pub async fn get_replies_for(&self, post_id: &str) -> Result<Vec<Reply>, SocialError> {
        let records = self
            .scanner
            .fetch(&self.config.collection_address, Some(ContentType::Reply))
            .await?;

        let mut replies: Vec<Reply> = records
            .iter()
            .filter_map(classify)
            .filter_map(|entity| match entity {
                Entity::Reply(reply) if reply.parent_post_id == post_id => Some(reply),
                _ => None,
            })
            .collect();
        replies.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(replies)
    }

    /// Create a profile, post, or reply. Requires the wallet collaborators;
    /// progress phases arrive through `progress` as the pipeline advances.
    pub async fn create_content(
        &self,
        draft: ContentDraft,
        progress: Option<&ProgressFn>,
    ) -> Result<Entity, SocialError> {
        let minter = self.minter.as_ref().ok_or_else(|| {
            SocialError::NotConfigured("wallet not connected: no minter".to_string())
        })?;
        let identity = self.identity.as_ref().ok_or_else(|| {
            SocialError::NotConfigured("wallet not connected: no identity".to_string())
        })?;
        if !is_valid_address(identity.address()) {
            return Err(SocialError::NotConfigured(format!(
                "wallet address is not a valid public key: {}",
                identity.address()
            )));
        }

        let publisher = ContentPublisher::new(
            minter.clone(),
            self.uploader.clone(),
            identity.clone(),
            self.cache.clone(),
            self.config.collection_address.clone(),
        );
        let record = publisher.publish(draft, progress).await?;

        classify(&record).ok_or_else(|| {
            SocialError::InvalidContent("created record did not classify".to_string())
        })
    }
}

/// Feed order: newest timestamp first, untimestamped entities (profiles)
/// last, ids as the final tie-break for determinism.
fn newest_first(a: &Entity, b: &Entity) -> Ordering {
    match (a.created_at(), b.created_at()) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.id().cmp(b.id())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id().cmp(b.id()),
    }
}

/// Duplicate-profile resolution: newest timestamp attribute wins (ties
/// broken by id), independent of scan order.
fn newest_profile_record<'a>(
    records: &'a [ContentRecord],
    owner: &str,
) -> Option<&'a ContentRecord> {
    records
        .iter()
        .filter(|record| {
            record.first_attr("author").and_then(|value| value.as_str()) == Some(owner)
        })
        .max_by(|a, b| {
            record_timestamp(a)
                .cmp(&record_timestamp(b))
                .then_with(|| a.id.cmp(&b.id))
        })
}

fn record_timestamp(record: &ContentRecord) -> i64 {
    record
        .first_attr("timestamp")
        .and_then(|value| value.as_i64())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollaboratorError;
    use crate::ledger::types::Attribute;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    const COLLECTION: &str = "So11111111111111111111111111111111111111112";

    struct StubReader {
        records: Vec<ContentRecord>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LedgerReader for StubReader {
        async fn records_by_creator(
            &self,
            _creator: &str,
            _limit: usize,
        ) -> Result<Vec<ContentRecord>, CollaboratorError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(self.records.clone())
        }
    }

    fn post_record(id: &str, timestamp: i64) -> ContentRecord {
        ContentRecord {
            id: id.to_string(),
            uri: String::new(),
            raw_attributes: vec![
                Attribute::new("type", "post"),
                Attribute::new("content", "body"),
                Attribute::new("author", "wallet-1"),
                Attribute::new("timestamp", timestamp),
            ],
        }
    }

    fn reply_record(id: &str, timestamp: i64, parent: &str) -> ContentRecord {
        ContentRecord {
            id: id.to_string(),
            uri: String::new(),
            raw_attributes: vec![
                Attribute::new("type", "reply"),
                Attribute::new("content", "re"),
                Attribute::new("author", "wallet-2"),
                Attribute::new("timestamp", timestamp),
                Attribute::new("parent_post", parent),
            ],
        }
    }

    fn profile_record(id: &str, owner: &str, username: &str, timestamp: i64) -> ContentRecord {
        ContentRecord {
            id: id.to_string(),
            uri: String::new(),
            raw_attributes: vec![
                Attribute::new("type", "profile"),
                Attribute::new("username", username),
                Attribute::new("author", owner),
                Attribute::new("timestamp", timestamp),
            ],
        }
    }

    fn client_over(records: Vec<ContentRecord>) -> (SocialClient, Arc<StubReader>) {
        let reader = Arc::new(StubReader {
            records,
            calls: AtomicUsize::new(0),
        });
        let config = ClientConfig::new(COLLECTION).unwrap();
        (SocialClient::new(config, reader.clone()), reader)
    }

    #[tokio::test]
    async fn test_posts_sorted_newest_first() {
        // Ordering: timestamps [100, 300, 200] list as [300, 200, 100]
        let (client, _reader) = client_over(vec![
            post_record("a", 100),
            post_record("b", 300),
            post_record("c", 200),
        ]);

        let posts = client.list_content(Some(ContentType::Post)).await.unwrap();
        let stamps: Vec<i64> = posts
            .iter()
            .map(|entity| entity.created_at().unwrap().timestamp())
            .collect();
        assert_eq!(stamps, vec![300, 200, 100]);
    }

    #[tokio::test]
    async fn test_replies_sorted_oldest_first() {
        // Ordering: reply timestamps [50, 10, 30] come back [10, 30, 50]
        let (client, _reader) = client_over(vec![
            reply_record("r1", 50, "post-1"),
            reply_record("r2", 10, "post-1"),
            reply_record("r3", 30, "post-1"),
            reply_record("other", 5, "post-2"),
        ]);

        let replies = client.get_replies_for("post-1").await.unwrap();
        let stamps: Vec<i64> = replies.iter().map(|r| r.created_at.timestamp()).collect();
        assert_eq!(stamps, vec![10, 30, 50]);
    }

    #[tokio::test]
    async fn test_orphan_replies_invisible_in_post_detail() {
        let mut orphan = reply_record("orphan", 20, "");
        orphan.raw_attributes.retain(|attr| attr.key != "parent_post");
        let (client, _reader) = client_over(vec![reply_record("r1", 10, "post-1"), orphan]);

        let replies = client.get_replies_for("post-1").await.unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id, "r1");
        // The orphan still exists in the bulk listing
        let all = client.list_content(Some(ContentType::Reply)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_profiles_resolve_to_newest() {
        // Open-question resolution: newest timestamp wins, not scan order
        let (client, _reader) = client_over(vec![
            profile_record("old", "wallet-9", "first-name", 100),
            profile_record("new", "wallet-9", "second-name", 900),
            profile_record("mid", "wallet-9", "middle-name", 500),
        ]);

        let profile = client.get_profile("wallet-9").await.unwrap().unwrap();
        assert_eq!(profile.id, "new");
        assert_eq!(profile.username, "second-name");
    }

    #[tokio::test]
    async fn test_profile_cache_serves_second_lookup() {
        let (client, reader) = client_over(vec![profile_record("p", "wallet-9", "name", 100)]);

        assert!(client.get_profile("wallet-9").await.unwrap().is_some());
        assert!(client.get_profile("wallet-9").await.unwrap().is_some());
        assert_eq!(reader.calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_wallet_has_no_profile() {
        let (client, _reader) = client_over(vec![profile_record("p", "wallet-9", "name", 100)]);
        assert!(client.get_profile("wallet-other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_post_verifies_type() {
        let (client, _reader) = client_over(vec![
            post_record("post-1", 100),
            profile_record("prof-1", "wallet-9", "name", 100),
        ]);

        assert!(client.get_post("post-1").await.unwrap().is_some());
        // A profile id is not a post, even though the record exists
        assert!(client.get_post("prof-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_posts_by_author_filtered_and_sorted() {
        let mut other = post_record("foreign", 400);
        other.raw_attributes = vec![
            Attribute::new("type", "post"),
            Attribute::new("author", "wallet-2"),
            Attribute::new("timestamp", 400i64),
        ];
        let (client, _reader) =
            client_over(vec![post_record("a", 100), post_record("b", 300), other]);

        let posts = client.list_posts_by_author("wallet-1").await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "b");
        assert_eq!(posts[1].id, "a");
    }

    #[tokio::test]
    async fn test_create_without_wallet_is_not_configured() {
        let (client, _reader) = client_over(vec![]);

        let result = client
            .create_content(
                ContentDraft::Post {
                    content: "no wallet".to_string(),
                    image: None,
                },
                None,
            )
            .await;
        assert!(matches!(result, Err(SocialError::NotConfigured(_))));
    }
}
