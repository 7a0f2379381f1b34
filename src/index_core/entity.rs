//! Typed entities derived from raw content records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type discriminator carried in the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Profile,
    Post,
    Reply,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Profile => "profile",
            ContentType::Post => "post",
            ContentType::Reply => "reply",
        }
    }

    /// Parse the `type` attribute value. Anything unrecognized is foreign
    /// content sharing the collection address and gets dropped upstream.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "profile" => Some(ContentType::Profile),
            "post" => Some(ContentType::Post),
            "reply" => Some(ContentType::Reply),
            _ => None,
        }
    }
}

/// One user profile. The ledger happily stores several per wallet; the
/// service layer resolves duplicates to the newest by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub bio: String,
    pub image_url: String,
    pub owner_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub content: String,
    /// Empty when the post was created without (or lost) its image.
    pub image_url: String,
    pub author_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub content: String,
    pub author_address: String,
    pub created_at: DateTime<Utc>,
    /// Empty for orphaned replies; those stay invisible in post-detail
    /// views but still exist in bulk listings.
    pub parent_post_id: String,
}

/// Any classified entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Profile(Profile),
    Post(Post),
    Reply(Reply),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Profile(p) => &p.id,
            Entity::Post(p) => &p.id,
            Entity::Reply(r) => &r.id,
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Entity::Profile(_) => ContentType::Profile,
            Entity::Post(_) => ContentType::Post,
            Entity::Reply(_) => ContentType::Reply,
        }
    }

    /// Creation time for feed ordering; profiles have none.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Entity::Profile(_) => None,
            Entity::Post(p) => Some(p.created_at),
            Entity::Reply(r) => Some(r.created_at),
        }
    }
}
