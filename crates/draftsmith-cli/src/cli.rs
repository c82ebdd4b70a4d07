//! Command handlers bridging parsed arguments and the core engine.
//!
//! Each handler runs one engine operation and renders its outcome as
//! markdown through the terminal renderer. Errors are wrapped with
//! `anyhow` context at this edge; the core reports typed errors.

use std::io::Read;

use anyhow::{Context, Result};
use draftsmith_core::{
    discovery, publish, session, Config, Executor, FailurePolicy, HttpStore, Plan, Planner,
    UndoEngine,
};

use crate::args::{ExecuteArgs, PlanArgs, PublishArgs, UndoArgs};
use crate::renderer::TerminalRenderer;

/// CLI handler owning the engine's collaborators.
pub struct Cli {
    config: Config,
    store: HttpStore,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(config: Config, store: HttpStore, renderer: TerminalRenderer) -> Self {
        Self {
            config,
            store,
            renderer,
        }
    }

    /// Audits the site and prints the inventory.
    pub async fn discover(&self) -> Result<()> {
        let snapshot = discovery::discover(&self.store)
            .await
            .context("Site audit failed")?;

        let mut out = String::from("# Site Audit\n\n");
        if !snapshot.authenticated {
            out.push_str("**Warning:** credentials were rejected; write operations will fail.\n\n");
        }
        if let Some(settings) = &snapshot.settings {
            out.push_str(&format!(
                "**Site:** {} — {}\n\n",
                settings.title.as_deref().unwrap_or("(untitled)"),
                settings.description.as_deref().unwrap_or("")
            ));
        }
        out.push_str(&format!(
            "**Global styles:** {}\n\n",
            if snapshot.has_global_styles {
                "supported"
            } else {
                "not supported"
            }
        ));

        out.push_str(&format!("## Content ({})\n\n", snapshot.content.len()));
        for post in &snapshot.content {
            out.push_str(&format!(
                "- `{}` {} ({}, {})\n",
                post.id, post.title, post.kind, post.status
            ));
        }

        out.push_str(&format!("\n## Patterns ({})\n\n", snapshot.patterns.len()));
        for pattern in &snapshot.patterns {
            out.push_str(&format!("- `{}` {}\n", pattern.slug, pattern.label()));
        }

        self.renderer.render(&out)
    }

    /// Generates a plan; prints it, or executes it with `--apply`.
    pub async fn plan(&self, args: PlanArgs) -> Result<()> {
        let planner_config = self
            .config
            .planner()
            .context("Plan generation is not configured")?;
        let planner = Planner::new(planner_config)?;

        let snapshot = discovery::discover(&self.store)
            .await
            .context("Site audit failed")?;
        let plan = planner
            .generate(&args.prompt, &snapshot)
            .await
            .context("Plan generation failed")?;

        if args.apply {
            return self.run_plan(plan).await;
        }

        let json = serde_json::to_string_pretty(&plan)?;
        self.renderer.render(&format!(
            "# Plan\n\n{}\n\n```json\n{json}\n```\n\nRun `ds execute` with this plan to stage it.\n",
            plan.explanation
        ))
    }

    /// Executes a plan read from a file or stdin.
    pub async fn execute(&self, args: ExecuteArgs) -> Result<()> {
        let raw = match &args.plan_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read plan file {}", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read plan from stdin")?;
                buf
            }
        };

        let mut plan = Plan::from_json(&raw).context("Plan rejected")?;
        if args.abort_on_failure {
            plan.on_failure = FailurePolicy::Abort;
        }
        self.run_plan(plan).await
    }

    /// Lists recorded sessions.
    pub async fn sessions(&self) -> Result<()> {
        let sessions = session::list_sessions(&self.store)
            .await
            .context("Failed to list sessions")?;

        if sessions.is_empty() {
            return self.renderer.render("No sessions recorded.\n");
        }

        let mut out = String::from("# Sessions\n\n");
        for s in &sessions {
            out.push_str(&format!("- `{}` {} ({})\n", s.id, s.summary, s.date));
        }
        self.renderer.render(&out)
    }

    /// Publishes a session's staged drafts.
    pub async fn publish(&self, args: PublishArgs) -> Result<()> {
        let published = publish::publish(&self.store, args.session_id)
            .await
            .context("Publish failed")?;
        self.renderer.render(&format!(
            "Published **{published}** resource(s) from session `{}`.\n",
            args.session_id
        ))
    }

    /// Undoes a session.
    pub async fn undo(&self, args: UndoArgs) -> Result<()> {
        let engine = UndoEngine::new(&self.store, &self.config);
        match engine.undo(args.session_id).await.context("Undo failed")? {
            Some(outcome) => self.renderer.render(&format!(
                "Undid session `{}`: {} restored, {} failed.\n",
                outcome.session_id, outcome.restored, outcome.failed
            )),
            None => self.renderer.render("No session found to undo.\n"),
        }
    }

    async fn run_plan(&self, plan: Plan) -> Result<()> {
        let snapshot = discovery::discover(&self.store)
            .await
            .context("Site audit failed")?;
        let outcome = Executor::new(&self.store, &self.config)
            .execute(&plan, &snapshot)
            .await
            .context("Execution failed")?;

        let mut out = String::from("# Execution Results\n\n");
        for line in &outcome.results {
            out.push_str(&format!("- {line}\n"));
        }
        match outcome.session_id {
            Some(id) => out.push_str(&format!(
                "\nSession recorded as `{id}`. Use `ds publish {id}` or `ds undo {id}`.\n"
            )),
            None => out.push_str("\n**Warning:** the session ledger could not be recorded; this execution cannot be undone.\n"),
        }
        self.renderer.render(&out)
    }
}
