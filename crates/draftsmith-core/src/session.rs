//! Session ledger persistence.
//!
//! Every execution writes a session record into the content store
//! itself: a hidden post whose body is the executed plan plus the
//! ordered list of affected resources with their pre-change snapshots.
//! Full-site backups use the same mechanism under a different title
//! prefix, so "undo the latest session" can never select a backup by
//! accident.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{BACKUP_PREFIX, SESSION_PREFIX};
use crate::error::{EngineError, Result};
use crate::plan::Plan;
use crate::store::{ContentStore, Post};

/// What kind of site resource a ledger entry refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Page,
    Post,
    GlobalStyles,
    Settings,
}

/// What the executor did to the resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
}

/// One ledger entry: a resource the executor touched, with the state
/// needed to reverse the change.
///
/// `snapshot` holds the resource's pre-change state and is absent only
/// for `Create` entries, where undo means deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AffectedResource {
    pub resource: ResourceKind,
    /// Absent for sitewide settings, which have no identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Value>,
}

/// The persisted body of a session record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub plan: Plan,
    #[serde(default)]
    pub affected: Vec<AffectedResource>,
}

/// A session as shown in listings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSummary {
    pub id: u64,
    pub date: String,
    pub summary: String,
}

/// Writes a session record for an executed plan. Returns the stored
/// record so callers can report its identifier.
pub async fn record_session(
    store: &dyn ContentStore,
    plan: &Plan,
    affected: &[AffectedResource],
) -> Result<Post> {
    let record = SessionRecord {
        plan: plan.clone(),
        affected: affected.to_vec(),
    };
    let body = serde_json::to_value(&record)?;
    let title = format!("{SESSION_PREFIX} {}", Timestamp::now());
    // The body doubles as the excerpt metadata; undo falls back to the
    // excerpt when a theme mangles the rendered content.
    store
        .create_log_record(&title, &serde_json::to_string_pretty(&record)?, Some(&body))
        .await
}

/// Writes a full-site backup record under the backup prefix.
pub async fn record_backup(store: &dyn ContentStore, snapshot: &Value) -> Result<Post> {
    let title = format!("{BACKUP_PREFIX} {}", Timestamp::now());
    store
        .create_log_record(&title, &serde_json::to_string_pretty(snapshot)?, None)
        .await
}

/// Lists recorded sessions, newest first. Backup records never appear
/// here.
pub async fn list_sessions(store: &dyn ContentStore) -> Result<Vec<SessionSummary>> {
    let records = store.query_log_records(SESSION_PREFIX).await?;
    Ok(records
        .into_iter()
        .map(|r| SessionSummary {
            id: r.id,
            date: r.date,
            summary: r.title.to_string(),
        })
        .collect())
}

/// Finds a session record by identifier, failing when it does not
/// exist.
pub async fn find_session(store: &dyn ContentStore, id: u64) -> Result<Post> {
    let records = store.query_log_records(SESSION_PREFIX).await?;
    records
        .into_iter()
        .find(|r| r.id == id)
        .ok_or(EngineError::SessionNotFound { id })
}

/// Selects the session to undo: the given one, or the most recent.
/// `Ok(None)` means there is nothing to undo.
pub async fn select_session(store: &dyn ContentStore, id: Option<u64>) -> Result<Option<Post>> {
    let records = store.query_log_records(SESSION_PREFIX).await?;
    Ok(match id {
        Some(id) => records.into_iter().find(|r| r.id == id),
        None => records.into_iter().next(),
    })
}

/// Parses a session record's persisted body.
///
/// Tries the content field first; some themes wrap or escape the stored
/// JSON, so a second attempt runs against the markup-stripped excerpt.
pub fn parse_record(record: &Post) -> Result<SessionRecord> {
    if let Ok(parsed) = serde_json::from_str::<SessionRecord>(record.content.as_str()) {
        return Ok(parsed);
    }
    serde_json::from_str(strip_markup(record.excerpt.as_str()).trim()).map_err(|e| {
        EngineError::session_parse(format!("session {} has an unreadable body: {e}", record.id))
    })
}

/// Force-deletes a ledger record after its session has been undone.
pub async fn delete_record(store: &dyn ContentStore, record: &Post) -> Result<()> {
    store
        .delete_raw(&format!("/wp/v2/posts/{}", record.id), true)
        .await
}

/// Removes markup tags, leaving only text content.
fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c => out.push(c),
        }
    }
    out
}
