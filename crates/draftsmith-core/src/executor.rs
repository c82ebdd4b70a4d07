//! Command executor: applies a validated plan against the content
//! store, one command at a time.
//!
//! Execution is bracketed by two best-effort persistence steps: a
//! full-site backup before the first command, and the session ledger
//! after the last. Neither failing is fatal to the plan.
//!
//! Every mutating command captures the resource's pre-change state
//! before touching it, and only contributes a ledger entry once its
//! mutation has succeeded. All staging writes force resources into
//! draft status; publishing is a separate, explicit step.

use jiff::Timestamp;
use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::discovery::DiscoverySnapshot;
use crate::error::{EngineError, Result};
use crate::patch;
use crate::plan::{Command, FailurePolicy, Plan};
use crate::resolver::Bindings;
use crate::session::{self, Action, AffectedResource, ResourceKind};
use crate::store::{ContentStore, ListFilter, NewPost, Post};

/// What one execution produced: user-facing result lines (one per
/// processed command), the compensation ledger, and the identifier of
/// the persisted session record when that write succeeded.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub results: Vec<String>,
    pub affected: Vec<AffectedResource>,
    pub session_id: Option<u64>,
}

/// Applies plans against a content store.
pub struct Executor<'a> {
    store: &'a dyn ContentStore,
    theme: String,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a dyn ContentStore, config: &Config) -> Self {
        Self {
            store,
            theme: config.theme.clone(),
        }
    }

    /// Executes a plan against the discovery snapshot taken before the
    /// call.
    ///
    /// Command failures are isolated per the plan's failure policy:
    /// with `skip` the loop continues, with `abort` the remaining
    /// commands are dropped. Failed commands contribute an error line
    /// to the results and nothing to the ledger.
    pub async fn execute(
        &self,
        plan: &Plan,
        discovery: &DiscoverySnapshot,
    ) -> Result<ExecutionResult> {
        if let Err(e) = self.backup().await {
            log::warn!("Backup failed, proceeding anyway: {e}");
        }

        log::info!("Applying plan: {}", plan.explanation);
        let mut bindings = Bindings::new();
        let mut affected = Vec::new();
        let mut results = Vec::new();

        for (index, command) in plan.commands.iter().enumerate() {
            match self.run(index, command, discovery, &mut bindings).await {
                Ok((line, entries)) => {
                    log::info!("Command {index} ({}) succeeded", command.kind());
                    affected.extend(entries);
                    if let Some(line) = line {
                        results.push(line);
                    }
                }
                Err(e) => {
                    log::error!("Command {index} ({}) failed: {e}", command.kind());
                    results.push(format!("Error: {e}"));
                    if plan.on_failure == FailurePolicy::Abort {
                        log::warn!("Aborting plan after command {index}");
                        break;
                    }
                }
            }
        }

        let session_id = match session::record_session(self.store, plan, &affected).await {
            Ok(record) => {
                log::info!("Session ledger recorded as {}", record.id);
                Some(record.id)
            }
            Err(e) => {
                log::warn!("Failed to persist session ledger: {e}");
                None
            }
        };

        Ok(ExecutionResult {
            results,
            affected,
            session_id,
        })
    }

    /// Captures a full-site backup record before any mutation.
    async fn backup(&self) -> Result<()> {
        log::info!("Capturing pre-execution site backup");
        let filter = ListFilter::content();
        let (posts, pages, settings) = tokio::try_join!(
            self.store.get_posts(&filter),
            self.store.get_pages(&filter),
            self.store.get_settings(),
        )?;

        let mut content = posts;
        content.extend(pages);
        let snapshot = json!({
            "timestamp": Timestamp::now().to_string(),
            "theme": self.theme,
            "settings": settings,
            "posts": content,
        });
        session::record_backup(self.store, &snapshot).await?;
        log::info!("Backup snapshot saved");
        Ok(())
    }

    /// Runs one command. Returns the result line (absent for commands
    /// that are silently skipped) and the ledger entries; entries are
    /// only produced once the mutation succeeded, though their
    /// snapshots are captured before it.
    async fn run(
        &self,
        index: usize,
        command: &Command,
        discovery: &DiscoverySnapshot,
        bindings: &mut Bindings,
    ) -> Result<(Option<String>, Vec<AffectedResource>)> {
        match command {
            Command::CreatePage {
                title,
                blocks,
                status,
            } => {
                log::info!("Creating page: {title}");
                if !blocks.is_empty() {
                    log::debug!("Ignoring {} inline blocks; pages start empty", blocks.len());
                }
                let page = self
                    .store
                    .create_post(&NewPost {
                        title: title.clone(),
                        content: String::new(),
                        status: status.as_str().to_string(),
                        kind: "page".to_string(),
                    })
                    .await?;
                bindings.record(index, page.id);
                let entry = AffectedResource {
                    resource: ResourceKind::Page,
                    id: Some(page.id),
                    action: Action::Create,
                    snapshot: None,
                };
                Ok((Some(format!("Created Page: {}", page.link)), vec![entry]))
            }

            Command::InsertPattern {
                pattern_slug,
                target_post_id,
                ..
            } => {
                let target = bindings.resolve_target(*target_post_id, index)?;
                log::info!("Inserting pattern [{pattern_slug}] into post {target}");

                // A target created earlier in this plan has no entry in
                // the discovery snapshot; its create entry already
                // covers undo by deletion, and it is always a page.
                let existing = discovery.find_post(target);
                let kind = existing.map_or("page", |p| p.kind.as_str()).to_string();
                let snapshot = existing.map(post_snapshot);
                let body = json!({
                    "content": format!("<!-- wp:pattern {{\"slug\":\"{pattern_slug}\"}} /-->"),
                    "status": "draft",
                });
                let updated = self
                    .store
                    .post_raw(&crate::store::rest_path_for(&kind, target), &body)
                    .await?;
                let entry = AffectedResource {
                    resource: resource_kind(&kind),
                    id: Some(target),
                    action: Action::Update,
                    snapshot,
                };
                Ok((Some(format!("Updated {kind}: {}", updated.link)), vec![entry]))
            }

            Command::UpdateGlobalStyles { styles, settings } => {
                log::info!("Updating global styles");
                let Some(current) = self.store.get_global_styles().await?.into_iter().next()
                else {
                    // Classic themes have no style records; skip without
                    // adding a result line.
                    log::warn!("No global-style records; skipping");
                    return Ok((None, Vec::new()));
                };

                let snapshot = Some(current.styles.clone());
                let mut body = json!({ "styles": styles });
                if let Some(settings) = settings {
                    body["settings"] = settings.clone();
                }
                self.store.update_global_styles(current.id, &body).await?;
                let entry = AffectedResource {
                    resource: ResourceKind::GlobalStyles,
                    id: Some(current.id),
                    action: Action::Update,
                    snapshot,
                };
                Ok((Some("Updated Global Styles.".to_string()), vec![entry]))
            }

            Command::UpdatePost {
                post_id,
                title,
                content,
                ..
            } => {
                log::info!("Staging update for post {post_id} as draft");
                let existing = discovery.find_post(*post_id);
                let kind = existing.map_or("post", |p| p.kind.as_str()).to_string();
                let snapshot = existing.map(post_snapshot);

                let mut fields = Map::new();
                if let Some(title) = title {
                    fields.insert("title".to_string(), json!(title));
                }
                if let Some(content) = content {
                    fields.insert("content".to_string(), json!(content));
                }
                // Requested statuses are ignored; staging is always a
                // draft until the session is published.
                fields.insert("status".to_string(), json!("draft"));

                let updated = self
                    .store
                    .post_raw(
                        &crate::store::rest_path_for(&kind, *post_id),
                        &Value::Object(fields),
                    )
                    .await?;
                let entry = AffectedResource {
                    resource: resource_kind(&kind),
                    id: Some(*post_id),
                    action: Action::Update,
                    snapshot,
                };
                Ok((
                    Some(format!(
                        "Staged {kind} as draft: {}",
                        preview_link(&updated.link)
                    )),
                    vec![entry],
                ))
            }

            Command::UpdateSettings {
                title,
                description,
                timezone,
            } => {
                log::info!("Updating site settings");
                // Snapshot fresh, not from discovery, to avoid
                // stale-snapshot drift if earlier commands touched
                // settings.
                let current = self.store.get_settings().await?;
                let snapshot = Some(serde_json::to_value(&current)?);

                let mut fields = Map::new();
                if let Some(title) = title {
                    fields.insert("title".to_string(), json!(title));
                }
                if let Some(description) = description {
                    fields.insert("description".to_string(), json!(description));
                }
                if let Some(timezone) = timezone {
                    fields.insert("timezone".to_string(), json!(timezone));
                }

                let updated = self.store.update_settings(&Value::Object(fields)).await?;
                let entry = AffectedResource {
                    resource: ResourceKind::Settings,
                    id: None,
                    action: Action::Update,
                    snapshot,
                };
                Ok((
                    Some(format!(
                        "Updated Site Settings: title is now \"{}\". View change at {}",
                        updated.title.as_deref().unwrap_or_default(),
                        self.store.base_url()
                    )),
                    vec![entry],
                ))
            }

            Command::UploadMedia { url, .. } => {
                // Media ingestion is not wired up yet; acknowledge so
                // plans mentioning media do not look silently dropped.
                log::info!("Media ingestion not implemented; acknowledging {url}");
                Ok((
                    Some(format!(
                        "Accepted media reference: {url} (ingestion not yet implemented)"
                    )),
                    Vec::new(),
                ))
            }

            Command::PatchPostContent {
                post_id,
                search,
                replace,
            } => {
                log::info!("Patching content of post {post_id}");
                let post = discovery
                    .find_post(*post_id)
                    .ok_or(EngineError::PostNotFound { id: *post_id })?;

                let outcome = patch::patch(post.content.as_str(), search, replace);
                if !outcome.matched {
                    return Err(EngineError::NoMatch { id: *post_id });
                }

                let snapshot = Some(post_snapshot(post));
                let body = json!({ "content": outcome.content, "status": "draft" });
                let updated = self.store.post_raw(&post.rest_path(), &body).await?;
                let entry = AffectedResource {
                    resource: resource_kind(&post.kind),
                    id: Some(*post_id),
                    action: Action::Update,
                    snapshot,
                };
                Ok((
                    Some(format!(
                        "Patched {} as draft: {}",
                        post.kind,
                        preview_link(&updated.link)
                    )),
                    vec![entry],
                ))
            }
        }
    }
}

/// Pre-change state of a post, as restored by undo.
fn post_snapshot(post: &Post) -> Value {
    json!({
        "title": post.title.as_str(),
        "content": post.content.as_str(),
        "status": post.status,
    })
}

fn resource_kind(kind: &str) -> ResourceKind {
    if kind == "page" {
        ResourceKind::Page
    } else {
        ResourceKind::Post
    }
}

/// Appends the preview flag, respecting an existing query string.
fn preview_link(link: &str) -> String {
    if link.contains('?') {
        format!("{link}&preview=true")
    } else {
        format!("{link}?preview=true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_link_query_handling() {
        assert_eq!(
            preview_link("https://example.com/home/"),
            "https://example.com/home/?preview=true"
        );
        assert_eq!(
            preview_link("https://example.com/?page_id=7"),
            "https://example.com/?page_id=7&preview=true"
        );
    }

    #[test]
    fn test_post_snapshot_shape() {
        let post = Post {
            id: 3,
            title: "Home".into(),
            content: "<p>Hi</p>".into(),
            excerpt: Default::default(),
            kind: "page".to_string(),
            status: "publish".to_string(),
            link: String::new(),
            date: String::new(),
        };
        let snapshot = post_snapshot(&post);
        assert_eq!(
            snapshot,
            json!({"title": "Home", "content": "<p>Hi</p>", "status": "publish"})
        );
    }
}
