//! TTL content cache
//!
//! Process-wide shared store between the scanner and the service layer:
//! bulk record lists keyed by `(collection, content type)` and profile
//! point-lookups keyed by owner address. Entries past their TTL are
//! invisible to `get_records`, but `get_records_stale` hands them out on
//! request — that is the fallback exercised when the ledger rate-limits
//! or errors a scan.
//!
//! Explicitly constructed and injected (no module-level statics) so tests
//! can reset state between runs.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::index_core::entity::{ContentType, Profile};
use crate::ledger::types::ContentRecord;

type BulkKey = (String, Option<ContentType>);

struct Slot<T> {
    value: T,
    stored_at: i64,
}

pub struct ContentCache {
    bulk: RwLock<HashMap<BulkKey, Slot<Vec<ContentRecord>>>>,
    profiles: RwLock<HashMap<String, Slot<Profile>>>,
    bulk_ttl_secs: i64,
    profile_ttl_secs: i64,
    now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
}

impl ContentCache {
    pub fn new(bulk_ttl_secs: i64, profile_ttl_secs: i64) -> Self {
        Self::with_clock(
            bulk_ttl_secs,
            profile_ttl_secs,
            Box::new(|| chrono::Utc::now().timestamp()),
        )
    }

    /// Deterministic-clock constructor for tests.
    pub fn with_clock(
        bulk_ttl_secs: i64,
        profile_ttl_secs: i64,
        now_fn: Box<dyn Fn() -> i64 + Send + Sync>,
    ) -> Self {
        Self {
            bulk: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            bulk_ttl_secs,
            profile_ttl_secs,
            now_fn,
        }
    }

    /// Fresh bulk entry, or None on miss/expiry.
    pub fn get_records(
        &self,
        collection: &str,
        content_type: Option<ContentType>,
    ) -> Option<Vec<ContentRecord>> {
        let now = (self.now_fn)();
        let map = self.bulk.read().expect("bulk cache lock poisoned");
        let slot = map.get(&(collection.to_string(), content_type))?;
        if now - slot.stored_at < self.bulk_ttl_secs {
            Some(slot.value.clone())
        } else {
            None
        }
    }

    /// Bulk entry regardless of freshness — the explicit degraded-read
    /// path, distinct from a normal get.
    pub fn get_records_stale(
        &self,
        collection: &str,
        content_type: Option<ContentType>,
    ) -> Option<Vec<ContentRecord>> {
        let map = self.bulk.read().expect("bulk cache lock poisoned");
        map.get(&(collection.to_string(), content_type))
            .map(|slot| slot.value.clone())
    }

    /// Last-write-wins insert of a bulk entry.
    pub fn put_records(
        &self,
        collection: &str,
        content_type: Option<ContentType>,
        records: Vec<ContentRecord>,
    ) {
        let now = (self.now_fn)();
        let mut map = self.bulk.write().expect("bulk cache lock poisoned");
        map.insert(
            (collection.to_string(), content_type),
            Slot {
                value: records,
                stored_at: now,
            },
        );
    }

    pub fn get_profile(&self, owner: &str) -> Option<Profile> {
        let now = (self.now_fn)();
        let map = self.profiles.read().expect("profile cache lock poisoned");
        let slot = map.get(owner)?;
        if now - slot.stored_at < self.profile_ttl_secs {
            Some(slot.value.clone())
        } else {
            None
        }
    }

    pub fn put_profile(&self, owner: &str, profile: Profile) {
        let now = (self.now_fn)();
        let mut map = self.profiles.write().expect("profile cache lock poisoned");
        map.insert(
            owner.to_string(),
            Slot {
                value: profile,
                stored_at: now,
            },
        );
    }

    /// Drop every bulk entry for a collection. Called after a successful
    /// mutation so the next read re-scans.
    pub fn invalidate_collection(&self, collection: &str) {
        let mut map = self.bulk.write().expect("bulk cache lock poisoned");
        map.retain(|(cached_collection, _), _| cached_collection != collection);
    }

    pub fn invalidate_profile(&self, owner: &str) {
        let mut map = self.profiles.write().expect("profile cache lock poisoned");
        map.remove(owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Attribute;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn make_record(id: &str) -> ContentRecord {
        ContentRecord {
            id: id.to_string(),
            uri: String::new(),
            raw_attributes: vec![Attribute::new("type", "post")],
        }
    }

    fn make_profile(owner: &str) -> Profile {
        Profile {
            id: format!("profile-{}", owner),
            username: "tester".to_string(),
            bio: String::new(),
            image_url: String::new(),
            owner_address: owner.to_string(),
        }
    }

    /// Cache plus a hand-cranked clock.
    fn cache_with_clock(bulk_ttl: i64, profile_ttl: i64) -> (ContentCache, Arc<AtomicI64>) {
        let clock = Arc::new(AtomicI64::new(10_000));
        let clock_ref = clock.clone();
        let cache = ContentCache::with_clock(
            bulk_ttl,
            profile_ttl,
            Box::new(move || clock_ref.load(Ordering::SeqCst)),
        );
        (cache, clock)
    }

    #[test]
    fn test_bulk_entry_expires() {
        // Test: fresh within TTL, gone after, still visible to stale reads
        let (cache, clock) = cache_with_clock(60, 300);

        cache.put_records("coll", Some(ContentType::Post), vec![make_record("a")]);
        assert!(cache.get_records("coll", Some(ContentType::Post)).is_some());

        clock.fetch_add(59, Ordering::SeqCst);
        assert!(cache.get_records("coll", Some(ContentType::Post)).is_some());

        clock.fetch_add(2, Ordering::SeqCst);
        assert!(cache.get_records("coll", Some(ContentType::Post)).is_none());
        let stale = cache.get_records_stale("coll", Some(ContentType::Post));
        assert_eq!(stale.unwrap()[0].id, "a");
    }

    #[test]
    fn test_type_keys_are_independent() {
        // Test: (collection, type) pairs do not shadow each other
        let (cache, _clock) = cache_with_clock(60, 300);

        cache.put_records("coll", Some(ContentType::Post), vec![make_record("p")]);
        cache.put_records("coll", Some(ContentType::Reply), vec![make_record("r")]);
        cache.put_records("coll", None, vec![make_record("all")]);

        assert_eq!(cache.get_records("coll", Some(ContentType::Post)).unwrap()[0].id, "p");
        assert_eq!(cache.get_records("coll", Some(ContentType::Reply)).unwrap()[0].id, "r");
        assert_eq!(cache.get_records("coll", None).unwrap()[0].id, "all");
        assert!(cache.get_records("other", Some(ContentType::Post)).is_none());
    }

    #[test]
    fn test_invalidate_collection_clears_all_types() {
        let (cache, _clock) = cache_with_clock(60, 300);

        cache.put_records("coll", Some(ContentType::Post), vec![make_record("p")]);
        cache.put_records("coll", None, vec![make_record("all")]);
        cache.put_records("elsewhere", None, vec![make_record("keep")]);

        cache.invalidate_collection("coll");

        assert!(cache.get_records_stale("coll", Some(ContentType::Post)).is_none());
        assert!(cache.get_records_stale("coll", None).is_none());
        // Other collections untouched
        assert!(cache.get_records("elsewhere", None).is_some());
    }

    #[test]
    fn test_profile_ttl_and_invalidation() {
        let (cache, clock) = cache_with_clock(60, 300);

        cache.put_profile("wallet-1", make_profile("wallet-1"));
        assert!(cache.get_profile("wallet-1").is_some());

        clock.fetch_add(301, Ordering::SeqCst);
        assert!(cache.get_profile("wallet-1").is_none());

        cache.put_profile("wallet-1", make_profile("wallet-1"));
        cache.invalidate_profile("wallet-1");
        assert!(cache.get_profile("wallet-1").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let (cache, _clock) = cache_with_clock(60, 300);

        cache.put_records("coll", None, vec![make_record("first")]);
        cache.put_records("coll", None, vec![make_record("second")]);

        let records = cache.get_records("coll", None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "second");
    }
}
