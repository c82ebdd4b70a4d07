//! Core library for the Draftsmith site-editing engine.
//!
//! This crate turns validated command plans into reviewable draft
//! changes against a remote content-managed site, with every execution
//! recorded as a compensating-undo ledger stored in the site itself.
//!
//! # Architecture
//!
//! - **Plans** ([`plan`]): a validated, ordered list of [`Command`]s
//!   plus a failure policy, usually produced by the [`planner`] from a
//!   natural-language request.
//! - **Execution** ([`executor`]): applies a plan one command at a
//!   time against the [`store::ContentStore`] seam, snapshotting every
//!   resource before mutating it and staging all changes as drafts.
//! - **Sessions** ([`session`]): each execution persists its ledger as
//!   a hidden record inside the content store; [`undo`] replays it in
//!   reverse intent and [`publish`] promotes the staged drafts.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use draftsmith_core::{discovery, Config, Executor, HttpStore, Plan};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let store = HttpStore::new(&config)?;
//!
//! let snapshot = discovery::discover(&store).await?;
//! let plan = Plan::from_json(
//!     r#"{"explanation": "Rename the site", "commands": [
//!         {"type": "update_settings", "title": "New Name"}]}"#,
//! )?;
//!
//! let outcome = Executor::new(&store, &config).execute(&plan, &snapshot).await?;
//! for line in &outcome.results {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod patch;
pub mod plan;
pub mod planner;
pub mod publish;
pub mod resolver;
pub mod session;
pub mod store;
pub mod undo;

// Re-export commonly used types
pub use config::{Config, PlannerConfig};
pub use discovery::DiscoverySnapshot;
pub use error::{EngineError, Result};
pub use executor::{ExecutionResult, Executor};
pub use patch::{patch, PatchOutcome};
pub use plan::{Command, FailurePolicy, Plan, PostStatus};
pub use planner::Planner;
pub use session::{Action, AffectedResource, ResourceKind, SessionRecord, SessionSummary};
pub use store::{ContentStore, HttpStore};
pub use undo::{UndoEngine, UndoOutcome};
