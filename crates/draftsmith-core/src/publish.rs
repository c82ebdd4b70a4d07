//! Draft promotion: makes a session's staged changes publicly visible.

use serde_json::json;

use crate::error::Result;
use crate::session::{self, ResourceKind};
use crate::store::{rest_path_for, ContentStore};

/// Publishes every page and post touched by the given session.
///
/// Entries for settings and global styles are skipped: the store has no
/// draft concept for them, so they went live at execution time. Returns
/// the number of resources published.
pub async fn publish(store: &dyn ContentStore, session_id: u64) -> Result<usize> {
    log::info!("Publishing session {session_id}");
    let record = session::find_session(store, session_id).await?;
    let ledger = session::parse_record(&record)?;

    let mut published = 0;
    for entry in &ledger.affected {
        let kind = match entry.resource {
            ResourceKind::Page => "page",
            ResourceKind::Post => "post",
            ResourceKind::GlobalStyles | ResourceKind::Settings => continue,
        };
        let Some(id) = entry.id else { continue };
        log::info!("Publishing {kind} {id}");
        store
            .post_raw(&rest_path_for(kind, id), &json!({ "status": "publish" }))
            .await?;
        published += 1;
    }

    log::info!("Publishing complete ({published} resources)");
    Ok(published)
}
