use serde::{Deserialize, Serialize};

use super::{Body, Links, SpaceRef, Version};

/// A page comment, either top-level or a reply to another comment.
///
/// Comments returned by CQL search also carry the `container` (the page they
/// were left on) and the `space`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub container: Option<Container>,
    #[serde(default)]
    pub space: Option<SpaceRef>,
    #[serde(default)]
    pub version: Option<Version>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl Comment {
    pub fn storage_value(&self) -> Option<&str> {
        self.body.as_ref().and_then(Body::storage_value)
    }
}

/// The content a comment belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}
