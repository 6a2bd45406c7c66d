use serde::{Deserialize, Serialize};

/// A Confluence page as returned by `/rest/api/content`.
///
/// Only the fields the tools read are modelled. Expansions that were not
/// requested (`version`, `space`, `body.storage`) come back as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub space: Option<SpaceRef>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl Page {
    /// Current version number, `0` when the version was not expanded.
    pub fn version_number(&self) -> u64 {
        self.version.as_ref().map_or(0, |v| v.number)
    }

    pub fn space_key(&self) -> Option<&str> {
        self.space.as_ref().map(|s| s.key.as_str())
    }

    /// The page body in storage format, if it was expanded.
    pub fn storage_value(&self) -> Option<&str> {
        self.body.as_ref().and_then(Body::storage_value)
    }
}

/// Version metadata attached to pages and comments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Version {
    pub number: u64,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub by: Option<User>,
}

/// The space a piece of content lives in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpaceRef {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub storage: Option<Storage>,
}

impl Body {
    pub fn storage_value(&self) -> Option<&str> {
        self.storage.as_ref().map(|s| s.value.as_str())
    }
}

/// Body in Confluence storage format (XHTML with `ac:` macros).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Storage {
    pub value: String,
    #[serde(default)]
    pub representation: Option<String>,
}

/// Relative links returned under `_links`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub webui: Option<String>,
    #[serde(default)]
    pub download: Option<String>,
}

/// A Confluence user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The `{"results": [...]}` envelope used by list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ResultList<T> {
    #[serde(default)]
    pub results: Vec<T>,
}
