//! HTTP client for the Confluence REST API.
//!
//! Most calls go to `{base}/rest/api`. Page restrictions are written through
//! `{base}/rest/experimental`, which is the only API that accepts per-user
//! restriction payloads on older server versions. Every request carries
//! Basic auth when a username is configured.

use chrono::NaiveDate;
use reqwest::{multipart, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Config;
use crate::models::*;

/// Default page size for space listings.
pub const SPACE_LIMIT: u32 = 200;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: check CONF_USERNAME and CONF_PASSWORD")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Which REST API a request targets.
#[derive(Debug, Clone, Copy)]
enum Api {
    Rest,
    Experimental,
}

impl Api {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Rest => "/rest/api",
            Self::Experimental => "/rest/experimental",
        }
    }
}

/// Filters for searching a user's comments.
#[derive(Debug, Clone, Default)]
pub struct CommentSearch {
    pub username: String,
    pub space: Option<String>,
    /// Inclusive lower bound on the creation date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date.
    pub end_date: Option<NaiveDate>,
    pub limit: u32,
}

/// What a restriction change did.
#[derive(Debug, Clone)]
pub struct RestrictionOutcome {
    pub message: String,
    pub restrictions: Option<Value>,
}

/// HTTP client for Confluence.
#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    client: Client,
}

impl ConfluenceClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            client: Client::new(),
        }
    }

    /// The configured user, used as the default restriction subject.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Absolute URL for a relative `_links` path.
    pub fn web_url(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| format!("{}{}", self.base_url, p))
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.request_to(Api::Rest, method, path)
    }

    /// Build a request against `api` with the auth header set.
    fn request_to(&self, api: Api, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}{}", self.base_url, api.prefix(), path);
        tracing::debug!("{} {}", method, url);
        let mut req = self.client.request(method, &url);
        if let Some(ref username) = self.username {
            req = req.basic_auth(username, self.password.as_ref());
        }
        req
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Handle response whose body is not needed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ClientError> {
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Confluence responded {}: {}", status, body);
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
            StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden(body)),
            _ => Err(ClientError::Server(format!("{}: {}", status, body))),
        }
    }

    // ============================================================
    // Space Operations
    // ============================================================

    /// List spaces visible to the current user.
    pub async fn list_spaces(&self, kind: SpaceType, limit: u32) -> Result<Vec<Space>, ClientError> {
        let response = self
            .request(Method::GET, "/space")
            .query(&[("type", kind.as_str().to_string()), ("limit", limit.to_string())])
            .send()
            .await?;
        let list: ResultList<Space> = self.handle_response(response).await?;
        Ok(list.results)
    }

    /// The most recent pages of a space.
    pub async fn space_pages(&self, space: &str, limit: u32) -> Result<Vec<Page>, ClientError> {
        let response = self
            .request(Method::GET, "/content")
            .query(&[("spaceKey", space.to_string()), ("limit", limit.to_string())])
            .send()
            .await?;
        let list: ResultList<Page> = self.handle_response(response).await?;
        Ok(list.results)
    }

    /// The authenticated user.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        let response = self.request(Method::GET, "/user/current").send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Page Operations
    // ============================================================

    /// Find a page by exact title within a space.
    ///
    /// `Ok(None)` means the lookup succeeded and no such page exists;
    /// transport and server failures are returned as errors.
    pub async fn find_page(&self, space: &str, title: &str) -> Result<Option<Page>, ClientError> {
        let response = self
            .request(Method::GET, "/content")
            .query(&[
                ("spaceKey", space),
                ("title", title),
                ("expand", "version,space,body.storage"),
            ])
            .send()
            .await?;
        let list: ResultList<Page> = self.handle_response(response).await?;
        Ok(list.results.into_iter().next())
    }

    /// Get a page by ID, including its body.
    pub async fn get_page(&self, id: &str) -> Result<Page, ClientError> {
        let response = self
            .request(Method::GET, &format!("/content/{}", id))
            .query(&[("expand", "version,space,body.storage")])
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Create a page. `parent_id = None` creates it at the space root.
    pub async fn create_page(
        &self,
        space: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ClientError> {
        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": { "key": space },
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });
        if let Some(parent_id) = parent_id {
            payload["ancestors"] = json!([{ "id": parent_id }]);
        }

        let response = self
            .request(Method::POST, "/content")
            .json(&payload)
            .send()
            .await?;
        let page: Page = self.handle_response(response).await?;
        tracing::info!("Created page {} '{}' in {}", page.id, page.title, space);
        Ok(page)
    }

    /// Replace a page's body, bumping its version. The title is kept unless
    /// `new_title` is given.
    pub async fn update_page(
        &self,
        page: &Page,
        body: &str,
        new_title: Option<&str>,
    ) -> Result<Page, ClientError> {
        let payload = json!({
            "id": page.id,
            "type": "page",
            "title": new_title.unwrap_or(page.title.as_str()),
            "version": { "number": page.version_number() + 1 },
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });

        let response = self
            .request(Method::PUT, &format!("/content/{}", page.id))
            .json(&payload)
            .send()
            .await?;
        let updated: Page = self.handle_response(response).await?;
        tracing::info!(
            "Updated page {} to version {}",
            updated.id,
            updated.version_number()
        );
        Ok(updated)
    }

    /// Delete a page.
    pub async fn delete_page(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/content/{}", id))
            .send()
            .await?;
        self.handle_empty_response(response).await?;
        tracing::info!("Deleted page {}", id);
        Ok(())
    }

    /// Search pages by title, optionally within one space.
    pub async fn search_pages(
        &self,
        space: Option<&str>,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Page>, ClientError> {
        let response = self
            .request(Method::GET, "/content/search")
            .query(&[
                ("cql", pages_cql(space, query)),
                ("limit", limit.to_string()),
                ("expand", "space,version".to_string()),
            ])
            .send()
            .await?;
        let list: ResultList<Page> = self.handle_response(response).await?;
        Ok(list.results)
    }

    /// Direct children of a page.
    pub async fn child_pages(&self, parent_id: &str, limit: u32) -> Result<Vec<Page>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/content/{}/child/page", parent_id))
            .query(&[("limit", limit.to_string()), ("expand", "version,space".to_string())])
            .send()
            .await?;
        let list: ResultList<Page> = self.handle_response(response).await?;
        Ok(list.results)
    }

    /// Version history of a page, as returned by the server.
    pub async fn page_history(&self, id: &str, limit: u32) -> Result<Value, ClientError> {
        let response = self
            .request(Method::GET, &format!("/content/{}/history", id))
            .query(&[("limit", limit)])
            .send()
            .await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Comment Operations
    // ============================================================

    /// All comments on a page, replies included.
    pub async fn page_comments(&self, page_id: &str, limit: u32) -> Result<Vec<Comment>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/content/{}/child/comment", page_id))
            .query(&[
                ("limit", limit.to_string()),
                ("expand", "body.storage,version,ancestors".to_string()),
                ("depth", "all".to_string()),
            ])
            .send()
            .await?;
        let list: ResultList<Comment> = self.handle_response(response).await?;
        Ok(list.results)
    }

    /// Add a comment to a page, or a reply when `parent_comment_id` is set.
    ///
    /// Goes through `POST /content` rather than `/content/{id}/child/comment`,
    /// which some server versions reject with 405.
    pub async fn add_comment(
        &self,
        page_id: &str,
        body: &str,
        parent_comment_id: Option<&str>,
    ) -> Result<Comment, ClientError> {
        let mut payload = json!({
            "type": "comment",
            "title": "comment",
            "container": { "type": "page", "id": page_id },
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });
        if let Some(parent) = parent_comment_id {
            payload["ancestors"] = json!([{ "id": parent }]);
        }

        let response = self
            .request(Method::POST, "/content")
            .json(&payload)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Comments written by a user, filtered by space and creation date.
    pub async fn search_user_comments(
        &self,
        search: &CommentSearch,
    ) -> Result<Vec<Comment>, ClientError> {
        let response = self
            .request(Method::GET, "/content/search")
            .query(&[
                ("cql", user_comments_cql(search)),
                ("limit", search.limit.to_string()),
                ("expand", "body.storage,version,space,container".to_string()),
            ])
            .send()
            .await?;
        let list: ResultList<Comment> = self.handle_response(response).await?;
        Ok(list.results)
    }

    // ============================================================
    // Attachment Operations
    // ============================================================

    /// Upload a file as a page attachment.
    pub async fn upload_attachment(
        &self,
        page_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        comment: Option<&str>,
    ) -> Result<Attachment, ClientError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
        let mut form = multipart::Form::new().part("file", part);
        if let Some(comment) = comment {
            form = form.text("comment", comment.to_string());
        }

        let response = self
            .request(Method::POST, &format!("/content/{}/child/attachment", page_id))
            .header("X-Atlassian-Token", "no-check")
            .multipart(form)
            .send()
            .await?;
        let upload: AttachmentUpload = self.handle_response(response).await?;
        let attachment = upload.into_attachment();
        tracing::info!("Uploaded attachment '{}' to page {}", file_name, page_id);
        Ok(attachment)
    }

    // ============================================================
    // Restriction Operations
    // ============================================================

    /// Current restrictions of a page, as returned by the server.
    pub async fn page_restrictions(&self, page_id: &str) -> Result<Value, ClientError> {
        let response = self
            .request(Method::GET, &format!("/content/{}/restriction", page_id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Apply a restriction mode to a page.
    ///
    /// Existing user restrictions are cleared first. `username` is required
    /// for every mode except [`RestrictionType::None`].
    pub async fn set_page_restriction(
        &self,
        page_id: &str,
        kind: RestrictionType,
        username: Option<&str>,
    ) -> Result<RestrictionOutcome, ClientError> {
        self.clear_user_restrictions(page_id).await?;

        if kind == RestrictionType::None {
            let response = self
                .request(Method::DELETE, &format!("/content/{}/restriction", page_id))
                .send()
                .await?;
            tolerate_not_found(self.handle_empty_response(response).await)?;
            tracing::info!("Removed all restrictions from page {}", page_id);
            return Ok(RestrictionOutcome {
                message: "Removed all page restrictions; the page is now open to everyone"
                    .to_string(),
                restrictions: None,
            });
        }

        let username = username.ok_or_else(|| {
            ClientError::BadRequest(format!("A username is required for '{}'", kind))
        })?;
        let payload: Vec<OperationRestriction> = kind
            .operations()
            .iter()
            .map(|op| OperationRestriction::for_user(op, username))
            .collect();

        let response = self
            .request_to(
                Api::Experimental,
                Method::POST,
                &format!("/content/{}/restriction", page_id),
            )
            .json(&payload)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        let restrictions = match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Restriction response for page {} is not JSON: {}", page_id, e);
                None
            }
        };

        let message = match kind {
            RestrictionType::EditOnly => {
                format!("Only {} can edit; everyone else can view", username)
            }
            _ => format!("Only {} can view and edit", username),
        };
        tracing::info!("Set {} restriction on page {} for {}", kind, page_id, username);
        Ok(RestrictionOutcome {
            message,
            restrictions,
        })
    }

    /// Drop read and update user restrictions. A missing restriction is not an error.
    async fn clear_user_restrictions(&self, page_id: &str) -> Result<(), ClientError> {
        for operation in ["read", "update"] {
            let response = self
                .request_to(
                    Api::Experimental,
                    Method::DELETE,
                    &format!("/content/{}/restriction/byOperation/{}/user", page_id, operation),
                )
                .send()
                .await?;
            tolerate_not_found(self.handle_empty_response(response).await)?;
        }
        Ok(())
    }
}

fn tolerate_not_found(result: Result<(), ClientError>) -> Result<(), ClientError> {
    match result {
        Err(ClientError::NotFound(body)) => {
            tracing::debug!("Nothing to clear: {}", body);
            Ok(())
        }
        other => other,
    }
}

// ============================================================
// CQL
// ============================================================

/// Quote a value as a CQL string literal.
pub fn cql_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// CQL for a title search, optionally restricted to a space.
pub fn pages_cql(space: Option<&str>, query: &str) -> String {
    let title = format!("title~{}", cql_string(query));
    match space {
        Some(space) => format!("space={} AND {}", cql_string(space), title),
        None => title,
    }
}

/// CQL for comments by a user.
pub fn user_comments_cql(search: &CommentSearch) -> String {
    let mut cql = format!("type=comment AND creator={}", cql_string(&search.username));
    if let Some(ref space) = search.space {
        cql.push_str(&format!(" AND space={}", cql_string(space)));
    }
    if let Some(start) = search.start_date {
        cql.push_str(&format!(" AND created>=\"{}\"", start.format("%Y-%m-%d")));
    }
    if let Some(end) = search.end_date {
        cql.push_str(&format!(" AND created<=\"{}\"", end.format("%Y-%m-%d")));
    }
    cql
}
