//! Compensating undo: restores the site state recorded in a session
//! ledger, then retires the ledger.
//!
//! Restoration is per-entry failure-isolated; one unrecoverable entry
//! never blocks the rest. An infrastructure sanity check runs first,
//! independent of the ledger, because a prior execution may have
//! displaced the site's front-page designation.

use serde_json::json;

use crate::config::Config;
use crate::error::Result;
use crate::session::{self, Action, AffectedResource, ResourceKind};
use crate::store::{rest_path_for, ContentStore};

/// What an undo pass accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    /// The session record that was undone and deleted
    pub session_id: u64,
    pub restored: usize,
    pub failed: usize,
}

/// Reverses executed sessions using their compensation ledgers.
pub struct UndoEngine<'a> {
    store: &'a dyn ContentStore,
    front_page_id: Option<u64>,
}

impl<'a> UndoEngine<'a> {
    pub fn new(store: &'a dyn ContentStore, config: &Config) -> Self {
        Self {
            store,
            front_page_id: config.front_page_id,
        }
    }

    /// Undoes the named session, or the most recent one.
    ///
    /// `Ok(None)` means there was nothing to undo: either no session
    /// records exist, or the named one is gone. An unreadable ledger is
    /// a reportable error; the record is left in place for inspection.
    pub async fn undo(&self, session_id: Option<u64>) -> Result<Option<UndoOutcome>> {
        let Some(record) = session::select_session(self.store, session_id).await? else {
            log::info!("No session record found to undo");
            return Ok(None);
        };
        log::info!("Undoing: {}", record.title);

        let ledger = session::parse_record(&record)?;

        self.infrastructure_check().await;

        let mut restored = 0;
        let mut failed = 0;
        for entry in &ledger.affected {
            match self.restore(entry).await {
                Ok(true) => restored += 1,
                Ok(false) => {}
                Err(e) => {
                    failed += 1;
                    log::error!(
                        "Failed to undo {:?} {:?}: {e}",
                        entry.resource,
                        entry.id
                    );
                }
            }
        }

        session::delete_record(self.store, &record).await?;
        log::info!("Undo complete: {restored} restored, {failed} failed");

        Ok(Some(UndoOutcome {
            session_id: record.id,
            restored,
            failed,
        }))
    }

    /// Verifies the front-page designation survived and repairs it
    /// from the configured known-good value when it did not. Purely
    /// best-effort.
    async fn infrastructure_check(&self) {
        let Some(front_page_id) = self.front_page_id else {
            log::debug!("No known-good front page configured; skipping check");
            return;
        };

        match self.store.get_settings().await {
            Ok(settings) => {
                if settings.page_on_front.unwrap_or(0) == 0 {
                    log::warn!("Front page designation lost; restoring to {front_page_id}");
                    let body = json!({ "page_on_front": front_page_id, "show_on_front": "page" });
                    if let Err(e) = self.store.update_settings(&body).await {
                        log::warn!("Front-page restore failed: {e}");
                    }
                }
            }
            Err(e) => log::warn!("Infrastructure check warning: {e}"),
        }
    }

    /// Reverses one ledger entry. `Ok(false)` means the entry carried
    /// nothing restorable.
    async fn restore(&self, entry: &AffectedResource) -> Result<bool> {
        match (entry.resource, entry.action) {
            (ResourceKind::Page | ResourceKind::Post, Action::Create) => {
                let Some(id) = entry.id else {
                    log::warn!("Create entry without an identifier; skipping");
                    return Ok(false);
                };
                log::info!("Deleting created {:?} {id}", entry.resource);
                let kind = kind_str(entry.resource);
                self.store
                    .delete_raw(&rest_path_for(kind, id), true)
                    .await?;
                Ok(true)
            }
            (ResourceKind::Page | ResourceKind::Post, Action::Update) => {
                let (Some(id), Some(snapshot)) = (entry.id, entry.snapshot.as_ref()) else {
                    log::warn!("Update entry without id or snapshot; skipping");
                    return Ok(false);
                };
                log::info!("Restoring {:?} {id} from snapshot", entry.resource);
                let kind = kind_str(entry.resource);
                self.store
                    .post_raw(&rest_path_for(kind, id), snapshot)
                    .await?;
                Ok(true)
            }
            (ResourceKind::Settings, Action::Update) => {
                let Some(snapshot) = entry.snapshot.as_ref() else {
                    return Ok(false);
                };
                log::info!("Restoring site settings snapshot");
                self.store.update_settings(snapshot).await?;
                Ok(true)
            }
            (ResourceKind::GlobalStyles, Action::Update) => {
                let (Some(id), Some(snapshot)) = (entry.id, entry.snapshot.as_ref()) else {
                    return Ok(false);
                };
                log::info!("Restoring global styles {id}");
                self.store
                    .update_global_styles(id, &json!({ "styles": snapshot }))
                    .await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

fn kind_str(resource: ResourceKind) -> &'static str {
    match resource {
        ResourceKind::Page => "page",
        _ => "post",
    }
}
