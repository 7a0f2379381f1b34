//! Collection scanner
//!
//! The ledger cannot filter by attribute, so every higher-level read is a
//! full "records by creator" scan filtered client-side. The scanner keeps
//! that tolerable: fresh cache hits short-circuit, scans ride the request
//! queue, a wall-clock budget stops the UI from hanging on a slow RPC
//! node, and failures degrade to the last cached result when one exists.
//!
//! Timeout rule: when the budget elapses the caller gets an empty list
//! right away, but the in-flight request keeps running in its own task.
//! A late success only fills the cache for future reads — it is never
//! handed to the call that already gave up, so a slow response cannot
//! clobber newer state.

use std::sync::Arc;

use tokio::time::{timeout, Duration};

use crate::error::SocialError;
use crate::index_core::cache::ContentCache;
use crate::index_core::entity::ContentType;
use crate::index_core::queue::RequestQueue;
use crate::ledger::{is_rate_limit_error, ContentRecord, LedgerReader};

pub struct CollectionScanner {
    reader: Arc<dyn LedgerReader>,
    queue: Arc<RequestQueue>,
    cache: Arc<ContentCache>,
    scan_limit: usize,
    scan_timeout: Duration,
}

impl CollectionScanner {
    pub fn new(
        reader: Arc<dyn LedgerReader>,
        queue: Arc<RequestQueue>,
        cache: Arc<ContentCache>,
        scan_limit: usize,
        scan_timeout_ms: u64,
    ) -> Self {
        Self {
            reader,
            queue,
            cache,
            scan_limit,
            scan_timeout: Duration::from_millis(scan_timeout_ms),
        }
    }

    /// All records of the collection, optionally narrowed to one content
    /// type before caching (the cached unit is the filtered list).
    ///
    /// Returns `Ok(vec![])` for an empty collection and for a timed-out
    /// scan; `ScanFailed` only after the stale-cache fallback came up dry.
    pub async fn fetch(
        &self,
        collection: &str,
        content_type: Option<ContentType>,
    ) -> Result<Vec<ContentRecord>, SocialError> {
        if collection.is_empty() {
            return Err(SocialError::NotConfigured(
                "no collection address for scan".to_string(),
            ));
        }

        if let Some(records) = self.cache.get_records(collection, content_type) {
            log::debug!(
                "cache hit for {} ({:?}): {} records",
                collection,
                content_type,
                records.len()
            );
            return Ok(records);
        }

        log::info!("🔍 scanning collection {} ({:?})", collection, content_type);

        // Detached so a timeout below abandons the wait, not the work.
        let task = tokio::spawn(scan_and_cache(
            self.reader.clone(),
            self.queue.clone(),
            self.cache.clone(),
            collection.to_string(),
            content_type,
            self.scan_limit,
        ));

        match timeout(self.scan_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                Err(SocialError::ScanFailed(format!("scan task failed: {}", join_error)))
            }
            Err(_elapsed) => {
                log::warn!("⏱ {} for {}", SocialError::ScanTimedOut, collection);
                Ok(Vec::new())
            }
        }
    }
}

/// The actual scan: one queued RPC call, client-side type filter, cache
/// write on success, stale fallback on failure.
async fn scan_and_cache(
    reader: Arc<dyn LedgerReader>,
    queue: Arc<RequestQueue>,
    cache: Arc<ContentCache>,
    collection: String,
    content_type: Option<ContentType>,
    scan_limit: usize,
) -> Result<Vec<ContentRecord>, SocialError> {
    let creator = collection.clone();
    let result = queue
        .enqueue(move || async move {
            reader
                .records_by_creator(&creator, scan_limit)
                .await
                .map_err(|error| {
                    if is_rate_limit_error(&error) {
                        SocialError::RateLimited
                    } else {
                        SocialError::ScanFailed(error.to_string())
                    }
                })
        })
        .await;

    match result {
        Ok(records) => {
            let filtered = filter_by_type(records, content_type);
            log::info!(
                "found {} records in {} ({:?})",
                filtered.len(),
                collection,
                content_type
            );
            cache.put_records(&collection, content_type, filtered.clone());
            Ok(filtered)
        }
        Err(error) => {
            // Rate-limited or failed: last cached result beats no result,
            // even past its TTL.
            if let Some(stale) = cache.get_records_stale(&collection, content_type) {
                log::warn!("scan failed ({}), serving expired cache entry", error);
                return Ok(stale);
            }
            match error {
                SocialError::RateLimited => Err(SocialError::ScanFailed(
                    "rate limited with no cached fallback".to_string(),
                )),
                other => Err(other),
            }
        }
    }
}

fn filter_by_type(
    records: Vec<ContentRecord>,
    content_type: Option<ContentType>,
) -> Vec<ContentRecord> {
    match content_type {
        None => records,
        Some(wanted) => records
            .into_iter()
            .filter(|record| {
                record
                    .first_attr("type")
                    .and_then(|value| value.as_str())
                    .and_then(ContentType::from_attr)
                    == Some(wanted)
            })
            .collect(),
    }
}
