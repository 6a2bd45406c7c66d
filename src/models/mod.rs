//! Confluence REST API models.
//!
//! # Content
//!
//! - [`Page`]: A wiki page living in a [`SpaceRef`], optionally nested under a parent page.
//! - [`Comment`]: A comment on a page; replies point at their parent comment via ancestors.
//! - [`Attachment`]: A file uploaded to a page.
//!
//! # Organisation
//!
//! - [`Space`]: Top-level container for pages.
//! - [`RestrictionType`]: Per-page view/edit restriction modes.

mod attachment;
mod comment;
mod page;
mod restriction;
mod space;

pub use attachment::*;
pub use comment::*;
pub use page::*;
pub use restriction::*;
pub use space::*;
