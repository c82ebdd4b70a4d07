//! Site discovery: a point-in-time inventory of the target site.
//!
//! Discovery runs before planning and before execution. Each probe is
//! best-effort: a section that cannot be fetched is recorded as empty
//! and logged, rather than failing the whole audit, so the engine can
//! still operate against partially readable sites.

use crate::error::Result;
use crate::store::{ContentStore, ListFilter, Pattern, Post, Settings};

/// Inventory of the site at one moment: all content items, the
/// registered block patterns, sitewide settings, and whether the theme
/// supports global styles.
///
/// The snapshot is an owned value handed to the planner and executor;
/// it never refreshes itself behind their backs.
#[derive(Debug, Clone, Default)]
pub struct DiscoverySnapshot {
    /// Posts and pages, merged
    pub content: Vec<Post>,
    pub patterns: Vec<Pattern>,
    pub settings: Option<Settings>,
    pub has_global_styles: bool,
    /// Whether the credential probe succeeded; writes will likely fail
    /// when this is false
    pub authenticated: bool,
}

impl DiscoverySnapshot {
    /// Looks up a content item by identifier.
    pub fn find_post(&self, id: u64) -> Option<&Post> {
        self.content.iter().find(|p| p.id == id)
    }

    /// True when no section of the audit produced data.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.patterns.is_empty() && self.settings.is_none()
    }
}

/// Audits the target site and returns the inventory.
pub async fn discover(store: &dyn ContentStore) -> Result<DiscoverySnapshot> {
    log::info!("Auditing target site for patterns, content, and settings");

    let authenticated = store.validate_auth().await.unwrap_or_else(|e| {
        log::warn!("Auth probe failed: {e}");
        false
    });
    if !authenticated {
        log::warn!("Proceeding with limited access (read-only)");
    }

    let patterns = match store.get_patterns().await {
        Ok(patterns) => {
            log::info!("Found {} patterns", patterns.len());
            patterns
        }
        Err(e) => {
            log::warn!("Failed to fetch patterns: {e}");
            Vec::new()
        }
    };

    let filter = ListFilter::content();
    let mut content = Vec::new();
    match tokio::join!(store.get_posts(&filter), store.get_pages(&filter)) {
        (Ok(posts), Ok(pages)) => {
            log::info!(
                "Found {} content items ({} posts, {} pages)",
                posts.len() + pages.len(),
                posts.len(),
                pages.len()
            );
            content.extend(posts);
            content.extend(pages);
        }
        (posts, pages) => {
            for err in [posts.err(), pages.err()].into_iter().flatten() {
                log::error!("Failed to fetch content: {err}");
            }
        }
    }

    let settings = match store.get_settings().await {
        Ok(settings) => {
            if let Some(title) = &settings.title {
                log::info!("Site title: {title:?}");
            }
            Some(settings)
        }
        Err(e) => {
            log::error!("Failed to fetch settings: {e}");
            None
        }
    };

    let has_global_styles = match store.get_global_styles().await {
        Ok(_) => {
            log::info!("Global styles are supported");
            true
        }
        Err(e) => {
            log::warn!("Global styles not supported (classic theme?): {e}");
            false
        }
    };

    Ok(DiscoverySnapshot {
        content,
        patterns,
        settings,
        has_global_styles,
        authenticated,
    })
}
