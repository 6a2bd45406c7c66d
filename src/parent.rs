//! Parent page resolution for page creation.
//!
//! Creating a page is hard to undo, so the parent is never guessed. The
//! caller either names it (by id or by title), asks for the space root
//! explicitly, or gets a prompt back explaining how to do one of those.

use std::future::Future;

use thiserror::Error;

use crate::models::Page;

/// Prompt returned when no parent information was given.
///
/// The three options are listed in order of preference.
pub const CLARIFICATION_PROMPT: &str = "Before creating the page I need to know which parent page it belongs under.\n\n\
Reply with one of the following and the page will be created there:\n\
1) Parent page ID (preferred): pass parentId\n\
2) Parent page title: pass parentTitle (it is looked up by title in the same space)\n\
3) To create the page at the root of the space: pass atRoot=true explicitly\n\n\
Tip: if you are not sure which page is the parent, use confluence_search_pages to find its id first.";

/// Parent information supplied with a page-create call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRequest {
    /// Space the new page will live in.
    pub space: String,
    pub parent_id: Option<String>,
    pub parent_title: Option<String>,
    /// Explicit intent to create at the space root. Wins over everything else.
    pub at_root: Option<bool>,
}

/// Outcome of parent resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentResolution {
    /// Creation can proceed. `None` means the space root.
    Resolved { parent_id: Option<String> },
    /// Nothing was specified; the caller has to come back with more information.
    NeedsClarification { prompt: String },
}

/// Resolution failures. `E` is the lookup's own error type.
#[derive(Debug, Error)]
pub enum ResolveError<E> {
    #[error("Parent page not found: '{title}' (space={space})")]
    ParentNotFound { title: String, space: String },

    #[error(transparent)]
    Lookup(E),
}

/// Decide where a new page goes.
///
/// `lookup(space, title)` is only called when the parent is named by title.
/// A lookup that succeeds with `None` is reported as
/// [`ResolveError::ParentNotFound`]; a lookup that fails is passed through
/// unchanged as [`ResolveError::Lookup`].
pub async fn resolve_parent<F, Fut, E>(
    req: &ParentRequest,
    lookup: F,
) -> Result<ParentResolution, ResolveError<E>>
where
    F: FnOnce(String, String) -> Fut,
    Fut: Future<Output = Result<Option<Page>, E>>,
{
    if req.at_root == Some(true) {
        return Ok(ParentResolution::Resolved { parent_id: None });
    }

    if let Some(parent_id) = non_empty(req.parent_id.as_deref()) {
        return Ok(ParentResolution::Resolved {
            parent_id: Some(parent_id.to_string()),
        });
    }

    if let Some(title) = non_empty(req.parent_title.as_deref()) {
        let parent = lookup(req.space.clone(), title.to_string())
            .await
            .map_err(ResolveError::Lookup)?;

        return match parent {
            Some(page) => Ok(ParentResolution::Resolved {
                parent_id: Some(page.id),
            }),
            None => Err(ResolveError::ParentNotFound {
                title: title.to_string(),
                space: req.space.clone(),
            }),
        };
    }

    Ok(ParentResolution::NeedsClarification {
        prompt: CLARIFICATION_PROMPT.to_string(),
    })
}

/// Trimmed value, or `None` when blank.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
