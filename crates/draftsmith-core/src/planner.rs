//! Plan generation via an OpenAI-compatible chat-completions endpoint.
//!
//! The planner turns a natural-language request into a [`Plan`] by
//! prompting a language model with the command schema and a summary of
//! the discovered site, then validating the JSON reply through the
//! tagged [`Command`](crate::plan::Command) enum. Invalid output is a
//! fatal error for the request; nothing is executed on a guess.

use serde::Deserialize;
use serde_json::json;

use crate::config::PlannerConfig;
use crate::discovery::DiscoverySnapshot;
use crate::error::{EngineError, Result, TransportResultExt};
use crate::plan::Plan;

const MAX_TOKENS: u32 = 4096;

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for the plan-generation endpoint.
pub struct Planner {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Planner {
    pub fn new(config: &PlannerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .transport_context("building HTTP client")?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Generates a validated plan for a natural-language request.
    pub async fn generate(&self, prompt: &str, discovery: &DiscoverySnapshot) -> Result<Plan> {
        let path = "/chat/completions";
        log::info!("Requesting plan from {} ({})", self.base_url, self.model);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt(discovery) },
                { "role": "user", "content": prompt },
            ],
            "response_format": { "type": "json_object" },
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .transport_context("requesting plan generation")?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .transport_context("decoding plan generation reply")?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_else(|| "{}".to_string());

        log::debug!("Raw plan reply ({} bytes)", content.len());
        let plan = Plan::from_json(&content)?;
        log::info!(
            "Generated plan with {} command(s): {}",
            plan.commands.len(),
            plan.explanation
        );
        Ok(plan)
    }
}

/// Assembles the system prompt from the discovered site state.
pub fn system_prompt(discovery: &DiscoverySnapshot) -> String {
    let settings = discovery.settings.as_ref();
    let site_title = settings.and_then(|s| s.title.as_deref()).unwrap_or("Unknown");
    let description = settings
        .and_then(|s| s.description.as_deref())
        .unwrap_or("Unknown");
    let front_page = settings.and_then(|s| s.page_on_front).filter(|id| *id != 0);
    let front_page_line = front_page
        .map(|id| id.to_string())
        .unwrap_or_else(|| "Not set (using latest posts)".to_string());
    let styles_line = if discovery.has_global_styles {
        "YES"
    } else {
        "NO (theme is classic, do NOT use update_global_styles)"
    };

    let patterns = if discovery.patterns.is_empty() {
        "None available.".to_string()
    } else {
        discovery
            .patterns
            .iter()
            .map(|p| format!("- [{}] {}", p.slug, p.label()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let contract = plan_contract();

    let content = if discovery.content.is_empty() {
        "NO EXISTING CONTENT FOUND.".to_string()
    } else {
        discovery
            .content
            .iter()
            .map(|p| {
                let marker = if front_page == Some(p.id) {
                    " [FRONT PAGE]"
                } else {
                    ""
                };
                format!(
                    "- [ID: {}] \"{}\" ({}) status: {}{}\n  Content: {}",
                    p.id,
                    p.title,
                    p.kind,
                    p.status,
                    marker,
                    if p.content.as_str().is_empty() {
                        "Empty"
                    } else {
                        p.content.as_str()
                    }
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        r#"You are an expert website orchestrator. Translate the user's request into a sequence of structured JSON commands executed against the site's REST API.

You MUST prioritize block patterns (insert_pattern) for layout changes whenever possible.
All content changes are applied as drafts for review; never assume anything goes live immediately.

Supported commands:
1. patch_post_content {{ post_id: number, search: string, replace: string }} - USE THIS FOR REPLACING TEXT IN EXISTING PAGES. It is the safest option.
2. update_post {{ post_id: number, title?: string, content?: string }} - ONLY for changing titles or writing completely new content.
3. update_settings {{ title?: string, description?: string, timezone?: string }} - updates the site identity.
4. insert_pattern {{ pattern_slug: string, target_post_id: number }} - target_post_id 0 means "the page created by the previous command".
5. create_page {{ title: string, blocks: any[], status: "draft" | "publish" }}
6. update_global_styles {{ styles: object, settings?: object }} - ONLY if global styles are supported.
7. upload_media {{ url: string, alt_text?: string, caption?: string }}

{contract}

Current site settings:
- Title: "{site_title}"
- Description: "{description}"
- Front Page ID: {front_page_line}
- Global Styles Support: {styles_line}

Available patterns on this site:
{patterns}

Existing content (recent posts/pages):
{content}

CRITICAL:
- To edit existing text, you MUST use 'patch_post_content' with the exact 'search' string from the content.
- Identify the correct post_id from the existing content list.
- ALWAYS check the Front Page ID before editing the homepage.
- If global styles are unsupported, say so instead of using 'update_global_styles'.
- Always return a valid JSON object."#
    )
}

/// The reply contract shown to the model: the generated plan schema
/// when the `schema` feature is enabled, a prose sketch otherwise.
fn plan_contract() -> String {
    #[cfg(feature = "schema")]
    {
        if let Ok(schema) = serde_json::to_string_pretty(&crate::plan::plan_schema()) {
            return format!(
                "Respond with a single JSON object conforming to this JSON Schema:\n{schema}"
            );
        }
    }
    concat!(
        "Respond with a single JSON object:\n",
        "{\n",
        "  \"explanation\": \"A short summary of what you are planning to do.\",\n",
        "  \"commands\": [ { \"type\": \"...\", ... }, ... ]\n",
        "}"
    )
    .to_string()
}
