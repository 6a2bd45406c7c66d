use serde::{Deserialize, Serialize};

use super::Links;

/// An attachment as returned by the upload endpoint.
///
/// Every field is optional: depending on the server version the upload
/// response is either a result list or the bare attachment, and older
/// versions omit `title` in favour of `filename`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub metadata: Option<AttachmentMetadata>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl Attachment {
    pub fn name(&self) -> Option<&str> {
        self.title.as_deref().or(self.filename.as_deref())
    }

    pub fn media_type(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.media_type.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMetadata {
    #[serde(default)]
    pub media_type: Option<String>,
}

/// Shape of the upload response.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttachmentUpload {
    List { results: Vec<Attachment> },
    Single(Attachment),
}

impl AttachmentUpload {
    /// The uploaded attachment (first entry of a result list).
    pub fn into_attachment(self) -> Attachment {
        match self {
            Self::List { results } => results.into_iter().next().unwrap_or_default(),
            Self::Single(attachment) => attachment,
        }
    }
}
