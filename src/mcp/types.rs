//! Request and response types for MCP tools.
//!
//! Tool arguments use camelCase names on the wire (`pageId`, `parentTitle`).

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::templates::TemplateSource;

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListSpacesRequest {
    #[schemars(description = "Space type: 'global' or 'personal'. Defaults to 'global'.")]
    #[serde(rename = "type", default)]
    pub space_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    #[schemars(description = "Space key. Falls back to CONF_SPACE when omitted.")]
    #[serde(default)]
    pub space: Option<String>,
    #[schemars(description = "Page title")]
    pub title: String,
    #[schemars(description = "Page body in Confluence storage format (XHTML)")]
    #[serde(default)]
    pub content: Option<String>,
    #[schemars(description = "Optional: template name (without .html) used as the page body instead of content")]
    #[serde(default)]
    pub template: Option<String>,
    #[schemars(description = "Optional: ID of the parent page (preferred way to place the page)")]
    #[serde(default)]
    pub parent_id: Option<String>,
    #[schemars(description = "Optional: title of the parent page, looked up in the same space")]
    #[serde(default)]
    pub parent_title: Option<String>,
    #[schemars(
        description = "Optional: set true to create the page at the space root. Without any parent information you are asked to choose first."
    )]
    #[serde(default)]
    pub at_root: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageRequest {
    #[schemars(description = "Space key used for the title lookup. Falls back to CONF_SPACE.")]
    #[serde(default)]
    pub space: Option<String>,
    #[schemars(description = "Title of the page to update (used when pageId is not given)")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "ID of the page to update (takes precedence over title)")]
    #[serde(default)]
    pub page_id: Option<String>,
    #[schemars(description = "New page body in storage format")]
    #[serde(default)]
    pub content: Option<String>,
    #[schemars(description = "Optional: template name used as the new body instead of content")]
    #[serde(default)]
    pub template: Option<String>,
    #[schemars(description = "Optional: new page title")]
    #[serde(default)]
    pub new_title: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPageRequest {
    #[schemars(description = "Space key. Falls back to CONF_SPACE when omitted.")]
    #[serde(default)]
    pub space: Option<String>,
    #[schemars(description = "Page title, used to find an existing page")]
    pub title: String,
    #[schemars(description = "Page body in storage format")]
    #[serde(default)]
    pub content: Option<String>,
    #[schemars(description = "Optional: template name used as the body instead of content")]
    #[serde(default)]
    pub template: Option<String>,
    #[schemars(description = "Optional: parent page ID (only used when a new page is created)")]
    #[serde(default)]
    pub parent_id: Option<String>,
    #[schemars(description = "Optional: parent page title (only used when a new page is created)")]
    #[serde(default)]
    pub parent_title: Option<String>,
    #[schemars(description = "Optional: set true to create a new page at the space root")]
    #[serde(default)]
    pub at_root: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPageRequest {
    #[schemars(description = "Space key used for the title lookup. Falls back to CONF_SPACE.")]
    #[serde(default)]
    pub space: Option<String>,
    #[schemars(description = "Page title")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "Page ID (takes precedence over title)")]
    #[serde(default)]
    pub page_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletePageRequest {
    #[schemars(description = "ID of the page to delete")]
    pub page_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchPagesRequest {
    #[schemars(description = "Text to match against page titles")]
    pub query: String,
    #[schemars(description = "Optional: restrict the search to this space")]
    #[serde(default)]
    pub space: Option<String>,
    #[schemars(description = "Maximum number of results. Defaults to 25.")]
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetChildPagesRequest {
    #[schemars(description = "ID of the parent page")]
    pub parent_id: String,
    #[schemars(description = "Maximum number of results. Defaults to 50.")]
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPageHistoryRequest {
    #[schemars(description = "Page ID")]
    pub page_id: String,
    #[schemars(description = "Number of history entries. Defaults to 10.")]
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[schemars(description = "ID of the page to comment on")]
    pub page_id: String,
    #[schemars(description = "Comment body in storage format (plain text must be wrapped, e.g. in <p>)")]
    pub content: String,
    #[schemars(description = "Optional: ID of the comment to reply to. Omit for a top-level comment.")]
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPageCommentsRequest {
    #[schemars(description = "Page ID")]
    pub page_id: String,
    #[schemars(description = "Maximum number of comments. Defaults to 50.")]
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchUserCommentsRequest {
    #[schemars(description = "Username of the comment author")]
    pub username: String,
    #[schemars(description = "Optional: restrict the search to this space")]
    #[serde(default)]
    pub space: Option<String>,
    #[schemars(description = "Optional: earliest creation date, inclusive (YYYY-MM-DD)")]
    #[serde(default)]
    pub start_date: Option<String>,
    #[schemars(description = "Optional: latest creation date, inclusive (YYYY-MM-DD)")]
    #[serde(default)]
    pub end_date: Option<String>,
    #[schemars(description = "Maximum number of results. Defaults to 50.")]
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadAttachmentRequest {
    #[schemars(description = "ID of the page to attach the file to")]
    pub page_id: String,
    #[schemars(description = "Local file path (preferred). Absolute paths are recommended.")]
    #[serde(default)]
    pub file_path: Option<String>,
    #[schemars(
        description = "Attachment file name. Required with contentBase64, optional with filePath."
    )]
    #[serde(default)]
    pub filename: Option<String>,
    #[schemars(description = "File content as base64 (alternative to filePath)")]
    #[serde(default)]
    pub content_base64: Option<String>,
    #[schemars(description = "Optional: attachment comment")]
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPageRestrictionRequest {
    #[schemars(description = "Page ID")]
    pub page_id: String,
    #[schemars(
        description = "Restriction mode: 'none' (open to everyone), 'edit_only' (everyone can view, only the user can edit) or 'view_only' (only the user can view and edit)"
    )]
    pub restriction_type: String,
    #[schemars(description = "Optional: user the restriction applies to. Defaults to CONF_USERNAME.")]
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetPageRestrictionsRequest {
    #[schemars(description = "Page ID")]
    pub page_id: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct BuildCodeMacroRequest {
    #[schemars(description = "Raw code. Wrapped in CDATA with ']]>' sequences split safely.")]
    pub code: String,
    #[schemars(
        description = "Optional: language. Common aliases (js, ts, sh, yml, ...) are normalized; unknown values are left out."
    )]
    #[serde(default)]
    pub language: Option<String>,
    #[schemars(description = "Optional: show line numbers. Defaults to false.")]
    #[serde(default)]
    pub linenumbers: bool,
    #[schemars(description = "Optional: render the block collapsed. Defaults to false.")]
    #[serde(default)]
    pub collapse: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadTemplateRequest {
    #[schemars(description = "Template name without the .html extension")]
    pub template_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveTemplateRequest {
    #[schemars(description = "Template name without the .html extension")]
    pub template_name: String,
    #[schemars(description = "Template body (storage format HTML)")]
    pub content: String,
}

// ============================================================
// Response Types
// ============================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SpaceInfo {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PageInfo {
    pub id: String,
    pub title: String,
    pub version: u64,
    pub space: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    pub space: Option<String>,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CommentInfo {
    pub id: String,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCommentInfo {
    pub id: String,
    pub body: Option<String>,
    pub container: Option<ContainerInfo>,
    pub space: Option<SpaceRefInfo>,
    pub created_at: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ContainerInfo {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SpaceRefInfo {
    pub key: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListResponse {
    /// Configured custom directory, or a note that only the builtin one is used.
    pub custom_templates_dir: String,
    pub templates: Vec<TemplateEntry>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TemplateEntry {
    pub name: String,
    pub path: String,
    pub source: TemplateSource,
}
