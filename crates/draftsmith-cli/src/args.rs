use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Main command-line interface for the Draftsmith site editor
///
/// Draftsmith applies structured editing plans to a content-managed
/// website. Plans can be written by hand or generated from a
/// natural-language request; every execution stages its changes as
/// drafts and records a compensation ledger on the site itself, so any
/// session can later be published or undone.
#[derive(Parser)]
#[command(version, about, name = "ds")]
pub struct Args {
    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Draftsmith CLI
///
/// The workflow is: `discover` to audit the site, `plan` to turn a
/// request into a command plan, `execute` to stage it as drafts, then
/// `publish` or `undo` the recorded session.
#[derive(Subcommand)]
pub enum Commands {
    /// Audit the target site: patterns, content, settings
    #[command(alias = "d")]
    Discover,
    /// Generate a plan from a natural-language request
    #[command(alias = "p")]
    Plan(PlanArgs),
    /// Execute a plan from a file (or stdin)
    #[command(alias = "x")]
    Execute(ExecuteArgs),
    /// List recorded sessions, newest first
    #[command(alias = "ls")]
    Sessions,
    /// Publish the draft changes staged by a session
    Publish(PublishArgs),
    /// Undo a session's changes (latest session by default)
    #[command(alias = "u")]
    Undo(UndoArgs),
}

/// Generate a plan from a natural-language request
#[derive(clap::Args)]
pub struct PlanArgs {
    /// What to change, in plain language
    pub prompt: String,
    /// Execute the generated plan immediately instead of printing it
    #[arg(long)]
    pub apply: bool,
}

/// Execute a plan
#[derive(clap::Args)]
pub struct ExecuteArgs {
    /// Path to a plan JSON file; reads stdin when omitted
    pub plan_file: Option<PathBuf>,
    /// Stop at the first failed command instead of skipping it
    #[arg(long)]
    pub abort_on_failure: bool,
}

/// Publish a session
#[derive(clap::Args)]
pub struct PublishArgs {
    /// Identifier of the session to publish
    pub session_id: u64,
}

/// Undo a session
#[derive(clap::Args)]
pub struct UndoArgs {
    /// Identifier of the session to undo; the latest when omitted
    pub session_id: Option<u64>,
}
