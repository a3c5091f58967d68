//! Serialized block shapes.
//!
//! A non-leaf block is a JSON object with its `name` and one ordered list
//! of child links under the level's collection key:
//!
//! ```json
//! { "name": "s1", "blogs": [ { "b1": { "link": "<hex>" }, "name": "b1" } ] }
//! ```
//!
//! A comment block carries its scalar fields directly:
//!
//! ```json
//! { "author": "alice", "dateTime": "2024-05-01T12:00:00.000000Z",
//!   "content": "hi", "replyTo": null, "id": "<hex>" }
//! ```
//!
//! Link order is insertion order and is written back verbatim. Keys are
//! emitted in the order shown, so equal nodes always encode to equal bytes.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use quill_types::ContentId;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TreeError, TreeResult};
use crate::kind::NodeKind;

/// One `(child name, child id)` entry in a parent's link list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub target: ContentId,
}

#[derive(Serialize)]
struct LinkTargetRef<'a> {
    link: &'a ContentId,
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(&self.name, &LinkTargetRef { link: &self.target })?;
        map.serialize_entry("name", &self.name)?;
        map.end()
    }
}

/// Either half of a link entry. A child literally named `"name"` produces
/// two `"name"` keys, one holding the target object and one the string,
/// so the value shape decides which is which.
#[derive(Deserialize)]
#[serde(untagged)]
enum LinkField {
    Target {
        #[serde(alias = "/")]
        link: ContentId,
    },
    Name(String),
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LinkVisitor;

        impl<'de> Visitor<'de> for LinkVisitor {
            type Value = Link;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a link entry { <child>: { \"link\": <id> }, \"name\": <child> }")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Link, A::Error> {
                let mut name: Option<String> = None;
                let mut targets: Vec<(String, ContentId)> = Vec::new();

                while let Some(key) = map.next_key::<String>()? {
                    match map.next_value::<LinkField>()? {
                        LinkField::Name(value) if key == "name" => name = Some(value),
                        LinkField::Name(_) => {}
                        LinkField::Target { link } => targets.push((key, link)),
                    }
                }

                // Entries written without an explicit "name" carry a single
                // target keyed by the child name.
                let name = match name {
                    Some(name) => name,
                    None if targets.len() == 1 => targets[0].0.clone(),
                    None => return Err(de::Error::missing_field("name")),
                };
                let target = targets
                    .into_iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, id)| id)
                    .ok_or_else(|| de::Error::custom(format!("no link target for {name:?}")))?;

                Ok(Link { name, target })
            }
        }

        deserializer.deserialize_map(LinkVisitor)
    }
}

struct BranchRecordRef<'a> {
    name: &'a str,
    key: &'static str,
    links: &'a [Link],
}

impl Serialize for BranchRecordRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("name", self.name)?;
        map.serialize_entry(self.key, self.links)?;
        map.end()
    }
}

/// Encode a non-leaf block.
pub fn encode_branch(kind: NodeKind, name: &str, links: &[Link]) -> TreeResult<Vec<u8>> {
    let encode_err = |reason: String| TreeError::Encode {
        kind,
        name: name.to_string(),
        reason,
    };
    let key = kind
        .collection_key()
        .ok_or_else(|| encode_err("leaf kind has no link list".into()))?;
    serde_json::to_vec(&BranchRecordRef { name, key, links }).map_err(|e| encode_err(e.to_string()))
}

/// Streams a branch block, keeping `name` and the collection key.
///
/// Link entries are decoded straight from the byte stream so that a child
/// named `"name"` keeps both of its `"name"` keys.
struct BranchSeed {
    key: &'static str,
}

impl<'de> DeserializeSeed<'de> for BranchSeed {
    type Value = (Option<String>, Vec<Link>);

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for BranchSeed {
    type Value = (Option<String>, Vec<Link>);

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a block with \"name\" and \"{}\"", self.key)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut name = None;
        let mut links = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if key == "name" {
                name = Some(map.next_value::<String>()?);
            } else if key == self.key {
                links = map.next_value::<Option<Vec<Link>>>()?.unwrap_or_default();
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok((name, links))
    }
}

/// Decode a non-leaf block into its name and ordered links.
///
/// A block without the collection key decodes to an empty link list. Keys
/// other than `name` and the collection key are ignored, so they do not
/// survive a rewrite of this node.
pub fn decode_branch(kind: NodeKind, id: ContentId, bytes: &[u8]) -> TreeResult<(String, Vec<Link>)> {
    let decode_err = |reason: String| TreeError::Decode { id, kind, reason };
    let key = kind
        .collection_key()
        .ok_or_else(|| decode_err("leaf kind has no link list".into()))?;

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let (name, links) = BranchSeed { key }
        .deserialize(&mut de)
        .map_err(|e| decode_err(e.to_string()))?;
    de.end().map_err(|e| decode_err(e.to_string()))?;

    let name = name.ok_or_else(|| decode_err("missing name".into()))?;
    Ok((name, links))
}

/// The stored shape of a comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub author: String,
    pub date_time: String,
    pub content: String,
    pub reply_to: Option<String>,
    pub id: String,
}

impl CommentRecord {
    pub fn encode(&self) -> TreeResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| TreeError::Encode {
            kind: NodeKind::Comment,
            name: self.id.clone(),
            reason: e.to_string(),
        })
    }

    pub fn decode(id: ContentId, bytes: &[u8]) -> TreeResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| TreeError::Decode {
            id,
            kind: NodeKind::Comment,
            reason: e.to_string(),
        })
    }
}

/// Render a timestamp the way comment blocks store it.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 and the space-separated naive form
/// `2021-02-03 23:34:00.123456`, which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
