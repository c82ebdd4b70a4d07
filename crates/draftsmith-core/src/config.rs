//! Deployment configuration for the engine.
//!
//! All knobs the engine needs are read from the environment once at
//! startup: the content store's URL and credentials, the recovery
//! defaults used by the undo engine's infrastructure check, the naming
//! convention for session records, and (optionally) the plan
//! generator's API credentials.
//!
//! The recovery defaults (front-page identifier, theme label) are
//! configuration here rather than literals in the engine, so each
//! deployment supplies its own known-good values.

use crate::error::{ConfigResultExt, EngineError, Result};

/// Title prefix marking an execution session record in the content store.
pub const SESSION_PREFIX: &str = "AI_SESSION:";

/// Title prefix marking a full-site backup record in the content store.
pub const BACKUP_PREFIX: &str = "PRE_EXEC_BACKUP:";

/// Content-store status that hides a record from normal content listings.
pub const HIDDEN_STATUS: &str = "pending";

/// Configuration for the plan generator's chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// API key for the OpenAI-compatible endpoint
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Base URL of the endpoint
    pub base_url: String,
}

/// Deployment configuration supplied by the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the target site, without a trailing slash
    pub site_url: String,
    /// Content-store account name
    pub username: String,
    /// Application password for the content-store REST API
    pub app_password: String,
    /// Known-good front-page identifier restored by the undo engine's
    /// infrastructure check. `None` disables the check's repair step.
    pub front_page_id: Option<u64>,
    /// Theme label recorded in full-site backups
    pub theme: String,
    /// Plan generator credentials; `None` disables the `plan` operation
    pub planner: Option<PlannerConfig>,
}

impl Config {
    /// Loads configuration from process environment variables.
    ///
    /// Required: `DS_SITE_URL`, `DS_USERNAME`, `DS_APP_PASSWORD`.
    /// Optional: `DS_FRONT_PAGE_ID`, `DS_THEME`, `DS_LLM_API_KEY`,
    /// `DS_LLM_MODEL`, `DS_LLM_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Separated from [`Config::from_env`] so validation can be tested
    /// without mutating process state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site_url = require(&lookup, "DS_SITE_URL")?;
        let username = require(&lookup, "DS_USERNAME")?;
        let app_password = require(&lookup, "DS_APP_PASSWORD")?;

        let front_page_id = match lookup("DS_FRONT_PAGE_ID") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .config_context("DS_FRONT_PAGE_ID is not a number")?,
            ),
            None => None,
        };

        let planner = lookup("DS_LLM_API_KEY").map(|api_key| PlannerConfig {
            api_key,
            model: lookup("DS_LLM_MODEL").unwrap_or_else(|| "deepseek-chat".to_string()),
            base_url: lookup("DS_LLM_BASE_URL")
                .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
        });

        Ok(Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            username,
            // Application passwords are displayed with grouping spaces;
            // the API wants them stripped.
            app_password: app_password.split_whitespace().collect(),
            front_page_id,
            theme: lookup("DS_THEME").unwrap_or_else(|| "unknown".to_string()),
            planner,
        })
    }

    /// Returns the planner configuration or a configuration error
    /// telling the operator which variable is missing.
    pub fn planner(&self) -> Result<&PlannerConfig> {
        self.planner
            .as_ref()
            .ok_or_else(|| EngineError::configuration("DS_LLM_API_KEY is not set"))
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EngineError::configuration(format!("{key} is not set")))
}
