//! Wire models for the content store's REST API.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A text field the store may return either as a plain string or as a
/// `{ "rendered": "..." }` object, depending on the endpoint and
/// context. Serializes back as a plain string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered(pub String);

impl Rendered {
    /// The field's text content.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Rendered {
    fn from(value: &str) -> Self {
        Rendered(value.to_string())
    }
}

impl Serialize for Rendered {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Rendered {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Plain(String),
            Wrapped { rendered: String },
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Plain(s) => Rendered(s),
            Wire::Wrapped { rendered } => Rendered(rendered),
        })
    }
}

/// A post or page as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    /// Resource kind as reported by the store (`post`, `page`, or a
    /// custom type)
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    /// Public permalink
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub date: String,
}

impl Post {
    /// REST path for this resource, routed by kind.
    pub fn rest_path(&self) -> String {
        rest_path_for(&self.kind, self.id)
    }
}

fn default_kind() -> String {
    "post".to_string()
}

/// REST path for a post-like resource of the given kind.
pub fn rest_path_for(kind: &str, id: u64) -> String {
    if kind == "page" {
        format!("/wp/v2/pages/{id}")
    } else {
        format!("/wp/v2/posts/{id}")
    }
}

/// Fields for creating a post or page.
#[derive(Debug, Clone, Serialize, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Query filter for post/page listings.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderby: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

impl ListFilter {
    /// Filter covering all content regardless of visibility, sized for
    /// a discovery pass.
    pub fn content() -> Self {
        Self {
            per_page: Some(100),
            status: Some("publish,draft,private".to_string()),
            ..Default::default()
        }
    }
}

/// Sitewide settings. Known fields are typed; everything else the
/// store reports rides along in `extra` so a snapshot can be re-applied
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Identifier of the designated front page; `0` or absent means
    /// the site shows latest posts instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_on_front: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_on_front: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One global-style record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalStyles {
    pub id: u64,
    #[serde(default)]
    pub styles: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

/// A block pattern registered on the site.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Pattern {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
}

impl Pattern {
    /// Human-readable label, preferring the title over the machine name.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}
