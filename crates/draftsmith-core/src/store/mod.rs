//! Content store adapter.
//!
//! The engine never talks HTTP directly; it runs against the
//! [`ContentStore`] trait, which models the remote content system's
//! REST surface (posts, pages, sitewide settings, global styles, block
//! patterns) plus the generic log-record primitive the session store is
//! built on. [`HttpStore`] is the production implementation; tests
//! substitute an in-memory double.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

mod http;
mod models;

pub use http::HttpStore;
pub use models::{
    rest_path_for, GlobalStyles, ListFilter, NewPost, Pattern, Post, Rendered, Settings,
};

/// CRUD surface of the remote content system.
///
/// All mutating calls return the store's view of the resource after the
/// change. Any call may fail with a transport error or a non-success
/// status; callers decide whether that is fatal.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Probes the authenticated identity endpoint. `Ok(false)` means
    /// the store is reachable but credentials were rejected.
    async fn validate_auth(&self) -> Result<bool>;

    /// Lists posts matching the filter.
    async fn get_posts(&self, filter: &ListFilter) -> Result<Vec<Post>>;

    /// Lists pages matching the filter.
    async fn get_pages(&self, filter: &ListFilter) -> Result<Vec<Post>>;

    /// Creates a new post or page.
    async fn create_post(&self, fields: &NewPost) -> Result<Post>;

    /// Fetches the global-style records, if the theme supports them.
    async fn get_global_styles(&self) -> Result<Vec<GlobalStyles>>;

    /// Applies the given fields to a global-style record.
    async fn update_global_styles(&self, id: u64, fields: &Value) -> Result<GlobalStyles>;

    /// Lists the block patterns registered on the site.
    async fn get_patterns(&self) -> Result<Vec<Pattern>>;

    /// Fetches the sitewide settings.
    async fn get_settings(&self) -> Result<Settings>;

    /// Applies only the given fields to the sitewide settings.
    async fn update_settings(&self, fields: &Value) -> Result<Settings>;

    /// Creates a hidden log record (see [`crate::session`] for the
    /// titling convention).
    async fn create_log_record(&self, title: &str, content: &str, meta: Option<&Value>)
        -> Result<Post>;

    /// Lists hidden log records whose title matches the search term,
    /// newest first.
    async fn query_log_records(&self, title_search: &str) -> Result<Vec<Post>>;

    /// Generic update against a REST path not otherwise modeled
    /// (page/post updates routed by resource kind).
    async fn post_raw(&self, path: &str, body: &Value) -> Result<Post>;

    /// Generic force-delete against a REST path.
    async fn delete_raw(&self, path: &str, force: bool) -> Result<()>;

    /// Public base URL of the site, for user-facing links.
    fn base_url(&self) -> &str;
}
