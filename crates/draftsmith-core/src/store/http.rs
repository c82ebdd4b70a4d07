//! REST implementation of the content store.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{Config, HIDDEN_STATUS};
use crate::error::{EngineError, Result, TransportResultExt};
use crate::store::models::{GlobalStyles, ListFilter, NewPost, Pattern, Post, Settings};
use crate::store::ContentStore;

/// Content store backed by the site's REST API.
///
/// Authenticates with HTTP Basic using an application password by
/// default. [`HttpStore::with_session_headers`] swaps in
/// browser-session headers instead, for sites that reject application
/// passwords.
pub struct HttpStore {
    client: reqwest::Client,
    site_url: String,
    api_base: String,
    username: String,
    password: String,
    use_basic: bool,
}

impl HttpStore {
    /// Builds a store from deployment configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .transport_context("building HTTP client")?;

        Ok(Self {
            client,
            site_url: config.site_url.clone(),
            api_base: format!("{}/wp-json", config.site_url),
            username: config.username.clone(),
            password: config.app_password.clone(),
            use_basic: true,
        })
    }

    /// Returns a store that sends the given headers on every request.
    ///
    /// When a `Cookie` header is present, Basic auth is dropped so the
    /// two credential sources cannot conflict.
    pub fn with_session_headers(&self, headers: &[(String, String)]) -> Result<Self> {
        let mut map = HeaderMap::new();
        let mut has_cookie = false;
        for (name, value) in headers {
            if name.eq_ignore_ascii_case("cookie") {
                has_cookie = true;
            }
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| EngineError::configuration(format!("invalid header name: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| EngineError::configuration(format!("invalid header value: {e}")))?;
            map.insert(name, value);
        }

        if has_cookie {
            log::info!("Adopting browser session headers; Basic auth disabled");
        }

        let client = reqwest::Client::builder()
            .default_headers(map)
            .build()
            .transport_context("building HTTP client")?;

        Ok(Self {
            client,
            site_url: self.site_url.clone(),
            api_base: self.api_base.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            use_basic: !has_cookie,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.use_basic {
            req.basic_auth(&self.username, Some(&self.password))
        } else {
            req
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder, path: &str) -> Result<reqwest::Response> {
        let response = self
            .apply_auth(req)
            .send()
            .await
            .transport_context(&format!("requesting {path}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.client.get(self.url(path));
        self.send(req, path)
            .await?
            .json()
            .await
            .transport_context(&format!("decoding {path}"))
    }

    async fn get_json_filtered<T: DeserializeOwned>(
        &self,
        path: &str,
        filter: &ListFilter,
    ) -> Result<T> {
        let req = self.client.get(self.url(path)).query(filter);
        self.send(req, path)
            .await?
            .json()
            .await
            .transport_context(&format!("decoding {path}"))
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let req = self.client.post(self.url(path)).json(body);
        self.send(req, path)
            .await?
            .json()
            .await
            .transport_context(&format!("decoding {path}"))
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn validate_auth(&self) -> Result<bool> {
        let path = "/wp/v2/users/me";
        let req = self.client.get(self.url(path));
        let response = self
            .apply_auth(req)
            .send()
            .await
            .transport_context("probing authentication")?;
        let status = response.status();

        if status.is_success() {
            log::info!("Authenticated against {}", self.site_url);
            return Ok(true);
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            log::error!(
                "Authentication rejected ({status}); the REST API requires an application password"
            );
            return Ok(false);
        }
        Err(EngineError::Status {
            status: status.as_u16(),
            path: path.to_string(),
        })
    }

    async fn get_posts(&self, filter: &ListFilter) -> Result<Vec<Post>> {
        log::debug!("Fetching posts");
        self.get_json_filtered("/wp/v2/posts", filter).await
    }

    async fn get_pages(&self, filter: &ListFilter) -> Result<Vec<Post>> {
        log::debug!("Fetching pages");
        self.get_json_filtered("/wp/v2/pages", filter).await
    }

    async fn create_post(&self, fields: &NewPost) -> Result<Post> {
        log::debug!("Creating {}: {}", fields.kind, fields.title);
        let body = serde_json::to_value(fields)?;
        self.post_json("/wp/v2/posts", &body).await
    }

    async fn get_global_styles(&self) -> Result<Vec<GlobalStyles>> {
        log::debug!("Fetching global styles");
        self.get_json("/wp/v2/global-styles").await
    }

    async fn update_global_styles(&self, id: u64, fields: &Value) -> Result<GlobalStyles> {
        log::debug!("Updating global styles {id}");
        self.post_json(&format!("/wp/v2/global-styles/{id}"), fields)
            .await
    }

    async fn get_patterns(&self) -> Result<Vec<Pattern>> {
        log::debug!("Fetching block patterns");
        self.get_json("/wp/v2/block-patterns").await
    }

    async fn get_settings(&self) -> Result<Settings> {
        log::debug!("Fetching settings");
        self.get_json("/wp/v2/settings").await
    }

    async fn update_settings(&self, fields: &Value) -> Result<Settings> {
        log::debug!("Updating settings");
        self.post_json("/wp/v2/settings", fields).await
    }

    async fn create_log_record(
        &self,
        title: &str,
        content: &str,
        meta: Option<&Value>,
    ) -> Result<Post> {
        // The excerpt carries the metadata; hidden status keeps the
        // record out of theme front-ends and feeds.
        let excerpt = match meta {
            Some(meta) => serde_json::to_string(meta)?,
            None => "{}".to_string(),
        };
        let body = serde_json::json!({
            "title": title,
            "content": content,
            "status": HIDDEN_STATUS,
            "excerpt": excerpt,
        });
        self.post_json("/wp/v2/posts", &body).await
    }

    async fn query_log_records(&self, title_search: &str) -> Result<Vec<Post>> {
        log::debug!("Querying log records matching {title_search:?}");
        let filter = ListFilter {
            per_page: Some(20),
            status: Some(HIDDEN_STATUS.to_string()),
            search: Some(title_search.to_string()),
            orderby: Some("date".to_string()),
            order: Some("desc".to_string()),
        };
        self.get_json_filtered("/wp/v2/posts", &filter).await
    }

    async fn post_raw(&self, path: &str, body: &Value) -> Result<Post> {
        log::debug!("POST {path}");
        self.post_json(path, body).await
    }

    async fn delete_raw(&self, path: &str, force: bool) -> Result<()> {
        log::debug!("DELETE {path} (force: {force})");
        let req = self
            .client
            .delete(self.url(path))
            .query(&[("force", force)]);
        self.send(req, path).await?;
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.site_url
    }
}
