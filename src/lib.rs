pub mod check;
pub mod config;
pub mod markup;
pub mod mcp;
pub mod models;
pub mod parent;
pub mod templates;
