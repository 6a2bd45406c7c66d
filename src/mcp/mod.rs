//! MCP server exposing Confluence page, comment, attachment and restriction tools.

mod client;
mod types;

use std::io;
use std::path::Path;

pub use client::*;
pub use types::*;

use base64::Engine;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::markup::{build_code_macro, CodeBlock};
use crate::models::*;
use crate::parent::{self, ParentRequest, ParentResolution, ResolveError};
use crate::templates::{TemplateError, TemplateStore};

const SEARCH_LIMIT: u32 = 25;
const CHILD_PAGE_LIMIT: u32 = 50;
const HISTORY_LIMIT: u32 = 10;
const COMMENT_LIMIT: u32 = 50;

/// Failures of a single tool call.
///
/// `InvalidInput` is reported as an MCP `invalid_params` error; everything
/// else becomes a tool result with `isError` set.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Parent page not found: '{title}' (space={space})")]
    ParentNotFound { title: String, space: String },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode response: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ResolveError<ClientError>> for ToolError {
    fn from(e: ResolveError<ClientError>) -> Self {
        match e {
            ResolveError::ParentNotFound { title, space } => Self::ParentNotFound { title, space },
            ResolveError::Lookup(e) => Self::Client(e),
        }
    }
}

fn respond(result: Result<String, ToolError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(ToolError::InvalidInput(msg)) => Err(McpError::invalid_params(msg, None)),
        Err(e) => {
            tracing::warn!("Tool call failed: {}", e);
            Ok(CallToolResult::error(vec![Content::text(format!(
                "Error: {}",
                e
            ))]))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ToolError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require(value: &str, name: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidInput(format!("{} is required", name)));
    }
    Ok(())
}

fn parse_date(value: Option<String>, name: &str) -> Result<Option<chrono::NaiveDate>, ToolError> {
    non_empty(value)
        .map(|v| {
            chrono::NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                ToolError::InvalidInput(format!("Invalid {} '{}': expected YYYY-MM-DD", name, v))
            })
        })
        .transpose()
}

#[derive(Clone)]
pub struct McpServer {
    client: ConfluenceClient,
    templates: TemplateStore,
    default_space: Option<String>,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(config: &Config, templates: TemplateStore) -> Self {
        Self {
            client: ConfluenceClient::new(config),
            templates,
            default_space: config.default_space.clone(),
            tool_router: Self::tool_router(),
        }
    }

    fn space_or_default(&self, space: Option<String>) -> Result<String, ToolError> {
        non_empty(space)
            .or_else(|| self.default_space.clone())
            .ok_or_else(|| {
                ToolError::InvalidInput("space is required (or set CONF_SPACE)".to_string())
            })
    }

    /// Page body from a template when one is named, otherwise from `content`.
    fn page_body(
        &self,
        content: Option<String>,
        template: Option<String>,
    ) -> Result<String, ToolError> {
        if let Some(name) = non_empty(template) {
            return Ok(self.templates.load(&name)?);
        }
        content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ToolError::InvalidInput("content or template is required".to_string()))
    }

    async fn resolve_parent(&self, req: &ParentRequest) -> Result<ParentResolution, ToolError> {
        let client = &self.client;
        let resolution = parent::resolve_parent(req, |space, title| async move {
            client.find_page(&space, &title).await
        })
        .await?;
        Ok(resolution)
    }

    fn page_url(&self, page: &Page) -> String {
        self.client
            .web_url(page.links.webui.as_deref())
            .unwrap_or_default()
    }

    fn created_text(&self, page: &Page) -> String {
        format!(
            "Page created.\n\nID: {}\nTitle: {}\nURL: {}",
            page.id,
            page.title,
            self.page_url(page)
        )
    }

    fn updated_text(&self, page: &Page) -> String {
        format!(
            "Page updated.\n\nID: {}\nTitle: {}\nVersion: {}\nURL: {}",
            page.id,
            page.title,
            page.version_number(),
            self.page_url(page)
        )
    }

    fn page_summary(&self, page: Page, with_url: bool) -> PageSummary {
        let url = if with_url {
            self.client.web_url(page.links.webui.as_deref())
        } else {
            None
        };
        PageSummary {
            space: page.space_key().map(str::to_string),
            version: page.version_number(),
            id: page.id,
            title: page.title,
            url,
        }
    }

    // ============================================================
    // Tool logic - exposed for testing
    // ============================================================

    pub async fn handle_list_spaces(&self, req: ListSpacesRequest) -> Result<String, ToolError> {
        let kind = match non_empty(req.space_type) {
            Some(s) => s.parse::<SpaceType>().map_err(|_| {
                ToolError::InvalidInput(format!(
                    "Invalid type '{}'. Must be: global or personal",
                    s
                ))
            })?,
            None => SpaceType::Global,
        };

        let spaces: Vec<SpaceInfo> = self
            .client
            .list_spaces(kind, SPACE_LIMIT)
            .await?
            .into_iter()
            .map(|s| SpaceInfo {
                key: s.key,
                name: s.name,
                kind: s.kind,
                id: s.id,
            })
            .collect();

        to_json(&spaces)
    }

    pub async fn handle_create_page(&self, req: CreatePageRequest) -> Result<String, ToolError> {
        require(&req.title, "title")?;
        let space = self.space_or_default(req.space)?;

        let parent_req = ParentRequest {
            space: space.clone(),
            parent_id: req.parent_id,
            parent_title: req.parent_title,
            at_root: req.at_root,
        };
        let parent_id = match self.resolve_parent(&parent_req).await? {
            ParentResolution::Resolved { parent_id } => parent_id,
            ParentResolution::NeedsClarification { prompt } => {
                tracing::info!("Asking for a parent before creating '{}'", req.title);
                return Ok(prompt);
            }
        };

        let body = self.page_body(req.content, req.template)?;
        let page = self
            .client
            .create_page(&space, &req.title, &body, parent_id.as_deref())
            .await?;

        Ok(self.created_text(&page))
    }

    pub async fn handle_update_page(&self, req: UpdatePageRequest) -> Result<String, ToolError> {
        let page = match non_empty(req.page_id) {
            Some(id) => self.client.get_page(&id).await?,
            None => {
                let title = non_empty(req.title).ok_or_else(|| {
                    ToolError::InvalidInput("pageId or title is required".to_string())
                })?;
                let space = self.space_or_default(req.space)?;
                self.client
                    .find_page(&space, &title)
                    .await?
                    .ok_or(ToolError::PageNotFound(title))?
            }
        };

        let body = self.page_body(req.content, req.template)?;
        let new_title = non_empty(req.new_title);
        let updated = self
            .client
            .update_page(&page, &body, new_title.as_deref())
            .await?;

        Ok(self.updated_text(&updated))
    }

    pub async fn handle_upsert_page(&self, req: UpsertPageRequest) -> Result<String, ToolError> {
        require(&req.title, "title")?;
        let space = self.space_or_default(req.space)?;
        let body = self.page_body(req.content, req.template)?;

        if let Some(existing) = self.client.find_page(&space, &req.title).await? {
            let updated = self.client.update_page(&existing, &body, None).await?;
            return Ok(self.updated_text(&updated));
        }

        let parent_req = ParentRequest {
            space: space.clone(),
            parent_id: req.parent_id,
            parent_title: req.parent_title,
            at_root: req.at_root,
        };
        let parent_id = match self.resolve_parent(&parent_req).await? {
            ParentResolution::Resolved { parent_id } => parent_id,
            ParentResolution::NeedsClarification { prompt } => {
                tracing::info!("Asking for a parent before creating '{}'", req.title);
                return Ok(prompt);
            }
        };

        let page = self
            .client
            .create_page(&space, &req.title, &body, parent_id.as_deref())
            .await?;
        Ok(self.created_text(&page))
    }

    pub async fn handle_get_page(&self, req: GetPageRequest) -> Result<String, ToolError> {
        let page = match non_empty(req.page_id) {
            Some(id) => self.client.get_page(&id).await?,
            None => {
                let title = non_empty(req.title).ok_or_else(|| {
                    ToolError::InvalidInput("pageId or title is required".to_string())
                })?;
                let space = self.space_or_default(req.space)?;
                self.client
                    .find_page(&space, &title)
                    .await?
                    .ok_or(ToolError::PageNotFound(title))?
            }
        };

        let info = PageInfo {
            url: self.client.web_url(page.links.webui.as_deref()),
            version: page.version_number(),
            space: page.space_key().map(str::to_string),
            content: page.storage_value().map(str::to_string),
            id: page.id,
            title: page.title,
        };
        to_json(&info)
    }

    pub async fn handle_delete_page(&self, req: DeletePageRequest) -> Result<String, ToolError> {
        require(&req.page_id, "pageId")?;
        self.client.delete_page(&req.page_id).await?;
        Ok(format!("Page {} deleted.", req.page_id))
    }

    pub async fn handle_search_pages(&self, req: SearchPagesRequest) -> Result<String, ToolError> {
        require(&req.query, "query")?;
        let space = non_empty(req.space);
        let pages = self
            .client
            .search_pages(
                space.as_deref(),
                &req.query,
                req.limit.unwrap_or(SEARCH_LIMIT),
            )
            .await?;

        let results: Vec<PageSummary> = pages
            .into_iter()
            .map(|p| self.page_summary(p, true))
            .collect();
        to_json(&results)
    }

    pub async fn handle_get_child_pages(
        &self,
        req: GetChildPagesRequest,
    ) -> Result<String, ToolError> {
        require(&req.parent_id, "parentId")?;
        let pages = self
            .client
            .child_pages(&req.parent_id, req.limit.unwrap_or(CHILD_PAGE_LIMIT))
            .await?;

        let results: Vec<PageSummary> = pages
            .into_iter()
            .map(|p| self.page_summary(p, false))
            .collect();
        to_json(&results)
    }

    pub async fn handle_get_page_history(
        &self,
        req: GetPageHistoryRequest,
    ) -> Result<String, ToolError> {
        require(&req.page_id, "pageId")?;
        let history = self
            .client
            .page_history(&req.page_id, req.limit.unwrap_or(HISTORY_LIMIT))
            .await?;
        to_json(&history)
    }

    pub async fn handle_add_comment(&self, req: AddCommentRequest) -> Result<String, ToolError> {
        require(&req.page_id, "pageId")?;
        require(&req.content, "content")?;
        let parent_comment_id = non_empty(req.parent_comment_id);

        let comment = self
            .client
            .add_comment(&req.page_id, &req.content, parent_comment_id.as_deref())
            .await?;

        let mut text = format!(
            "Comment added.\n\nPage ID: {}\nComment ID: {}\n",
            req.page_id, comment.id
        );
        if let Some(parent) = parent_comment_id {
            text.push_str(&format!("Parent comment ID: {}\n", parent));
        }
        if let Some(url) = self.client.web_url(comment.links.webui.as_deref()) {
            text.push_str(&format!("URL: {}\n", url));
        }
        Ok(text)
    }

    pub async fn handle_get_page_comments(
        &self,
        req: GetPageCommentsRequest,
    ) -> Result<String, ToolError> {
        require(&req.page_id, "pageId")?;
        let comments = self
            .client
            .page_comments(&req.page_id, req.limit.unwrap_or(COMMENT_LIMIT))
            .await?;

        if comments.is_empty() {
            return Ok("This page has no comments".to_string());
        }

        let count = comments.len();
        let results: Vec<CommentInfo> = comments
            .into_iter()
            .map(|c| CommentInfo {
                body: c.storage_value().map(str::to_string),
                id: c.id,
                title: c.title,
            })
            .collect();
        Ok(format!("Found {} comments:\n\n{}", count, to_json(&results)?))
    }

    pub async fn handle_search_user_comments(
        &self,
        req: SearchUserCommentsRequest,
    ) -> Result<String, ToolError> {
        require(&req.username, "username")?;
        let search = CommentSearch {
            start_date: parse_date(req.start_date, "startDate")?,
            end_date: parse_date(req.end_date, "endDate")?,
            space: non_empty(req.space),
            limit: req.limit.unwrap_or(COMMENT_LIMIT),
            username: req.username,
        };

        let comments = self.client.search_user_comments(&search).await?;
        if comments.is_empty() {
            return Ok(format!("No comments found for user {}", search.username));
        }

        let count = comments.len();
        let results: Vec<UserCommentInfo> = comments
            .into_iter()
            .map(|c| UserCommentInfo {
                body: c.storage_value().map(str::to_string),
                url: self.client.web_url(c.links.webui.as_deref()),
                created_at: c.version.and_then(|v| v.when),
                container: c.container.map(|k| ContainerInfo {
                    id: k.id,
                    title: k.title,
                    kind: k.kind,
                }),
                space: c.space.map(|s| SpaceRefInfo {
                    key: s.key,
                    name: s.name,
                }),
                id: c.id,
            })
            .collect();
        Ok(format!(
            "Found {} comments by {}:\n\n{}",
            count,
            search.username,
            to_json(&results)?
        ))
    }

    pub async fn handle_upload_attachment(
        &self,
        req: UploadAttachmentRequest,
    ) -> Result<String, ToolError> {
        require(&req.page_id, "pageId")?;

        let (file_name, bytes) = if let Some(file_path) = non_empty(req.file_path) {
            let bytes = match tokio::fs::read(&file_path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(ToolError::InvalidInput(format!(
                        "File does not exist: {}",
                        file_path
                    )));
                }
                Err(source) => {
                    return Err(ToolError::File {
                        path: file_path,
                        source,
                    });
                }
            };
            let file_name = non_empty(req.filename).unwrap_or_else(|| {
                Path::new(&file_path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file_path.clone())
            });
            (file_name, bytes)
        } else if let Some(encoded) = non_empty(req.content_base64) {
            let file_name = non_empty(req.filename).ok_or_else(|| {
                ToolError::InvalidInput("filename is required with contentBase64".to_string())
            })?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| ToolError::InvalidInput(format!("Invalid contentBase64: {}", e)))?;
            (file_name, bytes)
        } else {
            return Err(ToolError::InvalidInput(
                "filePath or contentBase64 is required".to_string(),
            ));
        };

        let comment = non_empty(req.comment);
        let attachment = self
            .client
            .upload_attachment(&req.page_id, &file_name, bytes, comment.as_deref())
            .await?;

        let mut text = format!("Attachment uploaded.\n\nPage ID: {}\n", req.page_id);
        if let Some(ref id) = attachment.id {
            text.push_str(&format!("Attachment ID: {}\n", id));
        }
        if let Some(name) = attachment.name() {
            text.push_str(&format!("File name: {}\n", name));
        }
        if let Some(media_type) = attachment.media_type() {
            text.push_str(&format!("Media type: {}\n", media_type));
        }
        if let Some(url) = self.client.web_url(attachment.links.download.as_deref()) {
            text.push_str(&format!("Download: {}\n", url));
        }
        if let Some(url) = self.client.web_url(attachment.links.webui.as_deref()) {
            text.push_str(&format!("Page: {}\n", url));
        }
        Ok(text)
    }

    pub async fn handle_set_page_restriction(
        &self,
        req: SetPageRestrictionRequest,
    ) -> Result<String, ToolError> {
        require(&req.page_id, "pageId")?;
        let kind: RestrictionType = req.restriction_type.parse().map_err(|_| {
            ToolError::InvalidInput(format!(
                "Invalid restrictionType '{}'. Must be: none, edit_only, or view_only",
                req.restriction_type
            ))
        })?;

        let username = non_empty(req.username).or_else(|| self.client.username().map(str::to_string));
        if kind != RestrictionType::None && username.is_none() {
            return Err(ToolError::InvalidInput(
                "username is required (or set CONF_USERNAME)".to_string(),
            ));
        }

        let outcome = self
            .client
            .set_page_restriction(&req.page_id, kind, username.as_deref())
            .await?;
        match outcome.restrictions {
            Some(restrictions) => Ok(format!(
                "{}\n\nRestrictions:\n{}",
                outcome.message,
                to_json(&restrictions)?
            )),
            None => Ok(outcome.message),
        }
    }

    pub async fn handle_get_page_restrictions(
        &self,
        req: GetPageRestrictionsRequest,
    ) -> Result<String, ToolError> {
        require(&req.page_id, "pageId")?;
        let restrictions = self.client.page_restrictions(&req.page_id).await?;
        to_json(&restrictions)
    }

    pub fn handle_build_code_macro(&self, req: BuildCodeMacroRequest) -> String {
        let block = CodeBlock {
            code: req.code,
            language: req.language,
            line_numbers: req.linenumbers,
            collapse: req.collapse,
        };
        build_code_macro(&block)
    }

    pub fn handle_list_templates(&self) -> Result<String, ToolError> {
        let response = TemplateListResponse {
            custom_templates_dir: self
                .templates
                .custom_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "not configured (builtin directory only)".to_string()),
            templates: self
                .templates
                .list()
                .into_iter()
                .map(|t| TemplateEntry {
                    name: t.name,
                    path: t.path.display().to_string(),
                    source: t.source,
                })
                .collect(),
        };
        to_json(&response)
    }

    pub fn handle_load_template(&self, req: LoadTemplateRequest) -> Result<String, ToolError> {
        Ok(self.templates.load(&req.template_name)?)
    }

    pub fn handle_save_template(&self, req: SaveTemplateRequest) -> Result<String, ToolError> {
        let saved = self.templates.save(&req.template_name, &req.content)?;
        Ok(format!(
            "Template saved.\n\nPath: {}\nDirectory: {}",
            saved.path.display(),
            saved.directory.display()
        ))
    }
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Spaces
    // ============================================================

    #[tool(
        name = "confluence_list_spaces",
        description = "List the Confluence spaces the configured user can access. Returns key, name, type and id for each space. Use the key as the 'space' argument of the page tools."
    )]
    async fn list_spaces(
        &self,
        params: Parameters<ListSpacesRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_list_spaces(params.0).await)
    }

    // ============================================================
    // Pages
    // ============================================================

    #[tool(
        name = "confluence_create_page",
        description = "Create a page in a space. The parent must be chosen explicitly: pass parentId (preferred), parentTitle (looked up in the same space), or atRoot=true. Without any of these no page is created and you get a question back listing the options. Body comes from 'content' (storage format) or a saved 'template'."
    )]
    async fn create_page(
        &self,
        params: Parameters<CreatePageRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_create_page(params.0).await)
    }

    #[tool(
        name = "confluence_update_page",
        description = "Replace the body of an existing page, found by pageId or by space + title. Optionally rename it with newTitle. The version number is bumped automatically."
    )]
    async fn update_page(
        &self,
        params: Parameters<UpdatePageRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_update_page(params.0).await)
    }

    #[tool(
        name = "confluence_upsert_page",
        description = "Update the page with this title if it exists in the space, otherwise create it. Parent arguments are only used on creation and follow the same rules as confluence_create_page."
    )]
    async fn upsert_page(
        &self,
        params: Parameters<UpsertPageRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_upsert_page(params.0).await)
    }

    #[tool(
        name = "confluence_get_page",
        description = "Get a page by pageId or by space + title. Returns id, title, version, space, url and the body in storage format."
    )]
    async fn get_page(
        &self,
        params: Parameters<GetPageRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_get_page(params.0).await)
    }

    #[tool(
        name = "confluence_delete_page",
        description = "Delete a page by ID. This cannot be undone from here."
    )]
    async fn delete_page(
        &self,
        params: Parameters<DeletePageRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_delete_page(params.0).await)
    }

    #[tool(
        name = "confluence_search_pages",
        description = "Search pages by title text, optionally within one space. Returns id, title, space, version and url. Use this to find a parent page id before creating pages."
    )]
    async fn search_pages(
        &self,
        params: Parameters<SearchPagesRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_search_pages(params.0).await)
    }

    #[tool(
        name = "confluence_get_child_pages",
        description = "List the direct child pages of a page."
    )]
    async fn get_child_pages(
        &self,
        params: Parameters<GetChildPagesRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_get_child_pages(params.0).await)
    }

    #[tool(
        name = "confluence_get_page_history",
        description = "Get the version history of a page."
    )]
    async fn get_page_history(
        &self,
        params: Parameters<GetPageHistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_get_page_history(params.0).await)
    }

    // ============================================================
    // Comments
    // ============================================================

    #[tool(
        name = "confluence_add_comment",
        description = "Add a comment to a page, or reply to an existing comment with parentCommentId. The content is storage format; wrap plain text in <p>."
    )]
    async fn add_comment(
        &self,
        params: Parameters<AddCommentRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_add_comment(params.0).await)
    }

    #[tool(
        name = "confluence_get_page_comments",
        description = "Get all comments on a page, replies included."
    )]
    async fn get_page_comments(
        &self,
        params: Parameters<GetPageCommentsRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_get_page_comments(params.0).await)
    }

    #[tool(
        name = "confluence_search_user_comments",
        description = "Find comments written by a user, optionally filtered by space and by creation date range (startDate/endDate as YYYY-MM-DD, inclusive)."
    )]
    async fn search_user_comments(
        &self,
        params: Parameters<SearchUserCommentsRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_search_user_comments(params.0).await)
    }

    // ============================================================
    // Attachments & Restrictions
    // ============================================================

    #[tool(
        name = "confluence_upload_attachment",
        description = "Upload a file to a page, either from a local filePath or from contentBase64 + filename. Requires edit permission on the page."
    )]
    async fn upload_attachment(
        &self,
        params: Parameters<UploadAttachmentRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_upload_attachment(params.0).await)
    }

    #[tool(
        name = "confluence_set_page_restriction",
        description = "Set who can see or edit a page: 'none' (everyone), 'edit_only' (everyone views, only the user edits) or 'view_only' (only the user views and edits). The user defaults to the configured account."
    )]
    async fn set_page_restriction(
        &self,
        params: Parameters<SetPageRestrictionRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_set_page_restriction(params.0).await)
    }

    #[tool(
        name = "confluence_get_page_restrictions",
        description = "Get the current view and edit restrictions of a page."
    )]
    async fn get_page_restrictions(
        &self,
        params: Parameters<GetPageRestrictionsRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_get_page_restrictions(params.0).await)
    }

    // ============================================================
    // Markup & Templates
    // ============================================================

    #[tool(
        name = "confluence_build_code_macro",
        description = "Build a storage-format code macro that embeds code safely: ']]>' inside the code is split across CDATA sections, and the language is normalized (js, ts, sh, yml, ... aliases) or left out when unknown, which avoids InvalidValueException on render. Paste the result into a page body."
    )]
    async fn build_code_macro(
        &self,
        params: Parameters<BuildCodeMacroRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(Ok(self.handle_build_code_macro(params.0)))
    }

    #[tool(
        name = "confluence_list_templates",
        description = "List saved page templates with their source directory."
    )]
    async fn list_templates(&self) -> Result<CallToolResult, McpError> {
        respond(self.handle_list_templates())
    }

    #[tool(
        name = "confluence_load_template",
        description = "Load the content of a saved page template."
    )]
    async fn load_template(
        &self,
        params: Parameters<LoadTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_load_template(params.0))
    }

    #[tool(
        name = "confluence_save_template",
        description = "Save a page template (storage format HTML). Overwrites a template with the same name."
    )]
    async fn save_template(
        &self,
        params: Parameters<SaveTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.handle_save_template(params.0))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "confluence-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Tools for reading and editing a Confluence wiki.

FINDING CONTENT:
- confluence_list_spaces: discover space keys
- confluence_search_pages: find pages by title (gives you page ids)
- confluence_get_page / confluence_get_child_pages / confluence_get_page_history

WRITING PAGES:
- Page bodies use Confluence storage format (XHTML with ac: macros).
- For code blocks, call confluence_build_code_macro and paste its output into the body.
- confluence_create_page never guesses where a page goes. Pass parentId (preferred),
  parentTitle, or atRoot=true. Without any of them you get a question back and
  nothing is created; ask the user and call again.
- confluence_upsert_page updates by title or creates with the same parent rules.

COMMENTS, ATTACHMENTS, PERMISSIONS:
- confluence_add_comment / confluence_get_page_comments / confluence_search_user_comments
- confluence_upload_attachment (filePath or contentBase64)
- confluence_set_page_restriction / confluence_get_page_restrictions

TEMPLATES:
- confluence_list_templates / confluence_load_template / confluence_save_template
- create/update/upsert accept 'template' to use a saved template as the body."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(config: Config) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio for {}", config.base_url);

    let templates = TemplateStore::from_config(&config)?;
    let service = McpServer::new(&config, templates);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
