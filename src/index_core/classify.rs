//! Content classification and attribute normalization
//!
//! Turns one raw record into exactly one typed entity, or drops it.
//! Classification is total for recognized types: every field besides
//! `type` has a documented default, so a record that says it is a post IS
//! a post, however sparse its metadata.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

use crate::index_core::entity::{ContentType, Entity, Post, Profile, Reply};
use crate::ledger::types::{AttrValue, ContentRecord};

/// Attribute list normalized into a key → value map.
///
/// The ledger does not deduplicate attribute keys; normalization keeps
/// the FIRST occurrence of each key and ignores the rest, so repeated
/// lookups cannot disagree the way repeated linear scans could.
pub struct AttributeMap {
    values: HashMap<String, AttrValue>,
}

impl AttributeMap {
    pub fn from_record(record: &ContentRecord) -> Self {
        let mut values = HashMap::new();
        for attr in &record.raw_attributes {
            values
                .entry(attr.key.clone())
                .or_insert_with(|| attr.value.clone());
        }
        Self { values }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|value| value.as_str())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(|value| value.as_i64())
    }

    fn str_or_empty(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }
}

/// Classify one record. `None` means the record carries no recognized
/// `type` attribute and is treated as foreign content, silently skipped.
pub fn classify(record: &ContentRecord) -> Option<Entity> {
    let attrs = AttributeMap::from_record(record);
    let content_type = attrs.get_str("type").and_then(ContentType::from_attr)?;

    Some(match content_type {
        ContentType::Profile => Entity::Profile(Profile {
            id: record.id.clone(),
            username: attrs.str_or_empty("username"),
            bio: attrs.str_or_empty("content"),
            image_url: attrs.str_or_empty("image"),
            owner_address: attrs.str_or_empty("author"),
        }),
        ContentType::Post => Entity::Post(Post {
            id: record.id.clone(),
            content: attrs.str_or_empty("content"),
            image_url: attrs.str_or_empty("image"),
            author_address: attrs.str_or_empty("author"),
            created_at: timestamp_from_attr(&attrs),
        }),
        ContentType::Reply => Entity::Reply(Reply {
            id: record.id.clone(),
            content: attrs.str_or_empty("content"),
            author_address: attrs.str_or_empty("author"),
            created_at: timestamp_from_attr(&attrs),
            parent_post_id: attrs.str_or_empty("parent_post"),
        }),
    })
}

/// Epoch-seconds `timestamp` attribute to a UTC datetime (seconds × 1000
/// → millis). Missing or out-of-range values default to now.
fn timestamp_from_attr(attrs: &AttributeMap) -> DateTime<Utc> {
    attrs
        .get_i64("timestamp")
        .and_then(|secs| Utc.timestamp_millis_opt(secs.saturating_mul(1000)).single())
        .unwrap_or_else(Utc::now)
}
