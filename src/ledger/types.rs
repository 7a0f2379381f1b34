//! Raw ledger record types shared by readers, the mint path, and the
//! classifier.

use serde::{Deserialize, Serialize};

/// Attribute value as stored in record metadata.
///
/// The ledger does not enforce a scalar type; timestamps arrive as JSON
/// numbers from some indexers and as strings from others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(i64),
    Text(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Number(_) => None,
        }
    }

    /// Numeric view; numeric strings are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(s) => s.parse().ok(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Number(n)
    }
}

/// One `trait_type`/`value` pair from record metadata.
///
/// Keys are NOT guaranteed unique; consumers resolve collisions
/// first-match-wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "trait_type")]
    pub key: String,
    pub value: AttrValue,
}

impl Attribute {
    pub fn new(key: &str, value: impl Into<AttrValue>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

/// Off-chain metadata document attached to a minted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// Raw content record as retrieved from the ledger, pre-classification.
///
/// `raw_attributes` is the record's metadata flattened into one key/value
/// list: `description` under key `content`, `image` under `image`, `name`
/// under `name`, followed by the metadata's own attribute list. Records
/// created by this client and records scanned back from the ledger go
/// through the same flattening, so both classify identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: String,
    pub uri: String,
    pub raw_attributes: Vec<Attribute>,
}

impl ContentRecord {
    pub fn from_metadata(id: &str, uri: &str, metadata: &RecordMetadata) -> Self {
        let mut raw_attributes = vec![
            Attribute::new("name", metadata.name.as_str()),
            Attribute::new("content", metadata.description.as_str()),
            Attribute::new("image", metadata.image.as_str()),
        ];
        raw_attributes.extend(metadata.attributes.iter().cloned());
        Self {
            id: id.to_string(),
            uri: uri.to_string(),
            raw_attributes,
        }
    }

    /// First occurrence of `key`, the collision rule used everywhere.
    pub fn first_attr(&self, key: &str) -> Option<&AttrValue> {
        self.raw_attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| &attr.value)
    }
}

/// Parameters for minting a new record on the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct MintRequest {
    pub name: String,
    /// Metadata URI at mint time; empty until `attach_metadata` runs.
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub collection: String,
    pub creators: Vec<String>,
}

/// Identifiers of a freshly minted record.
#[derive(Debug, Clone, PartialEq)]
pub struct MintReceipt {
    pub id: String,
    pub metadata_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_flattening() {
        // Test: description/image/name land under fixed keys, trait list follows
        let metadata = RecordMetadata {
            name: "Post #42".to_string(),
            symbol: "SOCIAL".to_string(),
            description: "hello world".to_string(),
            image: "https://img.example/1.png".to_string(),
            attributes: vec![
                Attribute::new("type", "post"),
                Attribute::new("timestamp", 1700000000),
            ],
        };

        let record = ContentRecord::from_metadata("rec-1", "https://meta.example/1", &metadata);

        assert_eq!(record.first_attr("content").unwrap().as_str(), Some("hello world"));
        assert_eq!(record.first_attr("name").unwrap().as_str(), Some("Post #42"));
        assert_eq!(record.first_attr("type").unwrap().as_str(), Some("post"));
        assert_eq!(record.first_attr("timestamp").unwrap().as_i64(), Some(1700000000));
        assert!(record.first_attr("parent_post").is_none());
    }

    #[test]
    fn test_first_attr_takes_first_occurrence() {
        // Test: duplicate keys resolve to the first entry in list order
        let record = ContentRecord {
            id: "rec-2".to_string(),
            uri: String::new(),
            raw_attributes: vec![
                Attribute::new("author", "wallet-a"),
                Attribute::new("author", "wallet-b"),
            ],
        };
        assert_eq!(record.first_attr("author").unwrap().as_str(), Some("wallet-a"));
    }

    #[test]
    fn test_attr_value_numeric_string() {
        // Test: numeric strings still parse as timestamps
        assert_eq!(AttrValue::Text("1700000000".to_string()).as_i64(), Some(1700000000));
        assert_eq!(AttrValue::Number(7).as_i64(), Some(7));
        assert_eq!(AttrValue::Text("not a number".to_string()).as_i64(), None);
    }
}
