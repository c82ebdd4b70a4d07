use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use draftsmith_core::error::{EngineError, Result};
use draftsmith_core::store::{
    ContentStore, GlobalStyles, ListFilter, NewPost, Pattern, Post, Rendered, Settings,
};
use draftsmith_core::Config;
use serde_json::Value;

/// Builds a test configuration without touching process environment.
pub fn test_config(pairs: &[(&str, &str)]) -> Config {
    let mut map: HashMap<String, String> = [
        ("DS_SITE_URL", "https://example.com"),
        ("DS_USERNAME", "admin"),
        ("DS_APP_PASSWORD", "pw"),
        ("DS_THEME", "testtheme"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in pairs {
        map.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| map.get(key).cloned()).expect("test config should load")
}

/// Shorthand for a content post in the store double.
pub fn make_post(id: u64, kind: &str, title: &str, content: &str, status: &str) -> Post {
    Post {
        id,
        title: Rendered::from(title),
        content: Rendered::from(content),
        excerpt: Rendered::default(),
        kind: kind.to_string(),
        status: status.to_string(),
        link: format!("https://example.com/?p={id}"),
        date: "2026-01-01T00:00:00".to_string(),
    }
}

struct State {
    next_id: u64,
    posts: Vec<Post>,
    /// Log records, newest first
    logs: Vec<Post>,
    settings: Settings,
    styles: Vec<GlobalStyles>,
    patterns: Vec<Pattern>,
    fail_update_ids: HashSet<u64>,
}

/// In-memory [`ContentStore`] double for engine tests.
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1000,
                posts: Vec::new(),
                logs: Vec::new(),
                settings: Settings {
                    title: Some("Test Site".to_string()),
                    description: Some("A site under test".to_string()),
                    ..Default::default()
                },
                styles: Vec::new(),
                patterns: Vec::new(),
                fail_update_ids: HashSet::new(),
            }),
        }
    }

    pub fn add_post(&self, post: Post) {
        self.state.lock().unwrap().posts.push(post);
    }

    pub fn add_styles(&self, styles: GlobalStyles) {
        self.state.lock().unwrap().styles.push(styles);
    }

    pub fn set_settings(&self, settings: Settings) {
        self.state.lock().unwrap().settings = settings;
    }

    /// Makes every update of the given post fail with a 500.
    pub fn fail_updates_for(&self, id: u64) {
        self.state.lock().unwrap().fail_update_ids.insert(id);
    }

    pub fn get_post(&self, id: u64) -> Option<Post> {
        self.state
            .lock()
            .unwrap()
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn log_records(&self) -> Vec<Post> {
        self.state.lock().unwrap().logs.clone()
    }

    pub fn current_settings(&self) -> Settings {
        self.state.lock().unwrap().settings.clone()
    }

    pub fn current_styles(&self) -> Vec<GlobalStyles> {
        self.state.lock().unwrap().styles.clone()
    }
}

fn path_id(path: &str) -> Result<u64> {
    path.rsplit('/')
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| EngineError::Status {
            status: 404,
            path: path.to_string(),
        })
}

fn apply_post_fields(post: &mut Post, fields: &Value) {
    if let Some(title) = fields.get("title").and_then(Value::as_str) {
        post.title = Rendered::from(title);
    }
    if let Some(content) = fields.get("content").and_then(Value::as_str) {
        post.content = Rendered::from(content);
    }
    if let Some(status) = fields.get("status").and_then(Value::as_str) {
        post.status = status.to_string();
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn validate_auth(&self) -> Result<bool> {
        Ok(true)
    }

    async fn get_posts(&self, _filter: &ListFilter) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .filter(|p| p.kind != "page")
            .cloned()
            .collect())
    }

    async fn get_pages(&self, _filter: &ListFilter) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .posts
            .iter()
            .filter(|p| p.kind == "page")
            .cloned()
            .collect())
    }

    async fn create_post(&self, fields: &NewPost) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        let post = Post {
            id,
            title: Rendered::from(fields.title.as_str()),
            content: Rendered::from(fields.content.as_str()),
            excerpt: Rendered::default(),
            kind: fields.kind.clone(),
            status: fields.status.clone(),
            link: format!("https://example.com/?p={id}"),
            date: "2026-01-01T00:00:00".to_string(),
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn get_global_styles(&self) -> Result<Vec<GlobalStyles>> {
        Ok(self.state.lock().unwrap().styles.clone())
    }

    async fn update_global_styles(&self, id: u64, fields: &Value) -> Result<GlobalStyles> {
        let mut state = self.state.lock().unwrap();
        let Some(record) = state.styles.iter_mut().find(|s| s.id == id) else {
            return Err(EngineError::Status {
                status: 404,
                path: format!("/wp/v2/global-styles/{id}"),
            });
        };
        if let Some(styles) = fields.get("styles") {
            record.styles = styles.clone();
        }
        if let Some(settings) = fields.get("settings") {
            record.settings = Some(settings.clone());
        }
        Ok(record.clone())
    }

    async fn get_patterns(&self) -> Result<Vec<Pattern>> {
        Ok(self.state.lock().unwrap().patterns.clone())
    }

    async fn get_settings(&self) -> Result<Settings> {
        Ok(self.state.lock().unwrap().settings.clone())
    }

    async fn update_settings(&self, fields: &Value) -> Result<Settings> {
        let mut state = self.state.lock().unwrap();
        let mut current = serde_json::to_value(&state.settings)?;
        if let (Some(obj), Some(new)) = (current.as_object_mut(), fields.as_object()) {
            for (k, v) in new {
                obj.insert(k.clone(), v.clone());
            }
        }
        state.settings = serde_json::from_value(current)?;
        Ok(state.settings.clone())
    }

    async fn create_log_record(
        &self,
        title: &str,
        content: &str,
        meta: Option<&Value>,
    ) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        let excerpt = match meta {
            Some(meta) => serde_json::to_string(meta)?,
            None => "{}".to_string(),
        };
        let record = Post {
            id,
            title: Rendered::from(title),
            content: Rendered::from(content),
            excerpt: Rendered::from(excerpt.as_str()),
            kind: "post".to_string(),
            status: "pending".to_string(),
            link: format!("https://example.com/?p={id}"),
            date: "2026-01-01T00:00:00".to_string(),
        };
        state.logs.insert(0, record.clone());
        Ok(record)
    }

    async fn query_log_records(&self, title_search: &str) -> Result<Vec<Post>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .logs
            .iter()
            .filter(|r| r.title.as_str().contains(title_search))
            .cloned()
            .collect())
    }

    async fn post_raw(&self, path: &str, body: &Value) -> Result<Post> {
        let id = path_id(path)?;
        let mut state = self.state.lock().unwrap();
        if state.fail_update_ids.contains(&id) {
            return Err(EngineError::Status {
                status: 500,
                path: path.to_string(),
            });
        }
        let Some(post) = state.posts.iter_mut().find(|p| p.id == id) else {
            return Err(EngineError::Status {
                status: 404,
                path: path.to_string(),
            });
        };
        apply_post_fields(post, body);
        Ok(post.clone())
    }

    async fn delete_raw(&self, path: &str, _force: bool) -> Result<()> {
        let id = path_id(path)?;
        let mut state = self.state.lock().unwrap();
        let before = state.posts.len() + state.logs.len();
        state.posts.retain(|p| p.id != id);
        state.logs.retain(|r| r.id != id);
        if state.posts.len() + state.logs.len() == before {
            return Err(EngineError::Status {
                status: 404,
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        "https://example.com"
    }
}
