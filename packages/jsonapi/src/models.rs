//! # JSON:API document model
//!
//! Deserialization targets for the REST backend's responses. Only the parts the
//! flattener reads are modelled; `links` and `jsonapi` members are ignored.
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`Document`] | A response body: primary `data`, side-loaded `included`, optional `meta`. |
//! | [`PrimaryData`] | A single primary resource or an array of them. |
//! | [`Resource`] | `{ id, type, attributes, relationships }`. |
//! | [`Relationship`] / [`RelationshipData`] | A named link to one or many [`ResourceRef`]s. |
//! | [`FlattenedDocument`] | What the frontend receives: camelCase, relationships inlined. |
//!
//! `attributes` and `relationships` stay `Option`al: "absent" and "empty" lead
//! to different flattening results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A resource object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BTreeMap<String, Relationship>>,
}

impl Resource {
    /// True when the resource links to at least one relationship.
    pub fn has_relationships(&self) -> bool {
        self.relationships.as_ref().is_some_and(|r| !r.is_empty())
    }
}

/// Pointer to a resource in the `included` list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A named relationship. `data` is `None` for an empty to-one (`"data": null`)
/// or when the backend sent only `links`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<RelationshipData>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    Many(Vec<ResourceRef>),
    One(ResourceRef),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<Resource>),
    One(Box<Resource>),
}

/// A JSON:API response body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub data: Option<PrimaryData>,
    #[serde(default)]
    pub included: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Document {
    /// Parse a response body. An empty body (e.g. `204 No Content`) is a
    /// document without data.
    pub fn from_slice(body: &[u8]) -> Result<Self, DocumentError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Flattened primary data plus camelCased `meta` (pagination, totals).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlattenedDocument {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed JSON:API document: {0}")]
    Malformed(#[from] serde_json::Error),
}
