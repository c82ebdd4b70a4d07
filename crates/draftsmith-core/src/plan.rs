//! The plan contract: ordered commands plus an explanation.
//!
//! A [`Plan`] is the unit of work for one execution. It is produced once
//! (usually by the plan generator from a natural-language request),
//! validated by deserialization into the tagged [`Command`] enum, and
//! never mutated afterwards.
//!
//! The wire shape mirrors what the generator is asked to emit: a
//! `type`-discriminated object per command. Numeric identifier fields
//! tolerate string input because language models routinely quote
//! numbers.

use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// What the executor does with the rest of the plan after one command
/// fails.
///
/// `Skip` isolates the failure to the one command, matching the
/// behavior of transport failures. `Abort` stops processing the
/// remaining commands, treating any failure (including the fuzzy
/// patcher's safety-gate rejection) as plan-fatal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and continue with the next command
    #[default]
    Skip,
    /// Stop processing the remaining commands
    Abort,
}

/// Requested visibility for created content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Staged, not publicly visible
    #[default]
    Draft,
    /// Publicly visible
    Publish,
}

impl PostStatus {
    /// Wire string for the content store.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Publish => "publish",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structured change to apply against the content store.
///
/// `target_post_id: 0` on `insert_pattern` is a sentinel meaning
/// "resolve from the identifier produced by the previous command"
/// (see [`crate::resolver`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Create a new page in draft status with an empty body
    CreatePage {
        title: String,
        #[serde(default)]
        blocks: Vec<serde_json::Value>,
        #[serde(default)]
        status: PostStatus,
    },
    /// Replace a post's content with a single pattern-reference block
    InsertPattern {
        pattern_slug: String,
        #[serde(default, deserialize_with = "coerce_id")]
        target_post_id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
    },
    /// Overwrite the first global-style record
    UpdateGlobalStyles {
        styles: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        settings: Option<serde_json::Value>,
    },
    /// Overwrite a post's title/content, forced to draft
    UpdatePost {
        #[serde(deserialize_with = "coerce_id")]
        post_id: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<PostStatus>,
    },
    /// Update sitewide settings (site identity, timezone)
    UpdateSettings {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timezone: Option<String>,
    },
    /// Placeholder: media ingestion is not wired yet
    UploadMedia {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt_text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Replace a text fragment inside a post via the fuzzy patcher
    PatchPostContent {
        #[serde(deserialize_with = "coerce_id")]
        post_id: u64,
        search: String,
        replace: String,
    },
}

impl Command {
    /// Short command name matching the wire discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::CreatePage { .. } => "create_page",
            Command::InsertPattern { .. } => "insert_pattern",
            Command::UpdateGlobalStyles { .. } => "update_global_styles",
            Command::UpdatePost { .. } => "update_post",
            Command::UpdateSettings { .. } => "update_settings",
            Command::UploadMedia { .. } => "upload_media",
            Command::PatchPostContent { .. } => "patch_post_content",
        }
    }
}

/// JSON Schema for the plan contract, for embedding in prompts and
/// tooling.
#[cfg(feature = "schema")]
pub fn plan_schema() -> schemars::Schema {
    schemars::schema_for!(Plan)
}

/// An ordered sequence of commands plus a human-readable explanation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Plan {
    /// Short summary of what the plan intends to do
    pub explanation: String,
    /// Commands, executed strictly in order
    pub commands: Vec<Command>,
    /// Failure policy for the whole plan
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Plan {
    /// Parses and validates a plan from raw JSON text.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        serde_json::from_str(raw).map_err(|e| crate::EngineError::InvalidPlan {
            reason: e.to_string(),
        })
    }
}

/// Accepts a numeric identifier as either a JSON number or a quoted
/// string.
fn coerce_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid identifier: {s:?}"))),
    }
}
