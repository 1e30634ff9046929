//! HTTP client for the catalog API + the in-memory catalog of fetched tools.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use toolcat_core::{ApiResponse, CompanyProfile, ToolRecord};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

mod catalog;

pub use catalog::Catalog;

pub const CRATE_NAME: &str = "toolcat-client";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            timeout: Duration::from_secs(20),
            user_agent: None,
        }
    }
}

/// On-disk settings file; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Defaults, then the optional settings file, then environment overrides.
    pub fn load(settings_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(path) = settings_path {
            let settings = read_settings_file(path)?;
            config.apply_settings(&settings);
        }
        config.apply_env();
        Ok(config)
    }

    pub fn apply_settings(&mut self, settings: &SettingsFile) {
        if let Some(api_url) = &settings.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(timeout) = settings.http_timeout_secs.and_then(timeout_from_secs) {
            self.timeout = timeout;
        }
        if let Some(user_agent) = &settings.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
    }

    fn apply_env(&mut self) {
        if let Ok(api_url) = std::env::var("TOOLCAT_API_URL") {
            self.api_url = api_url;
        }
        if let Some(timeout) = std::env::var("TOOLCAT_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .and_then(timeout_from_secs)
        {
            self.timeout = timeout;
        }
        if let Ok(user_agent) = std::env::var("TOOLCAT_USER_AGENT") {
            self.user_agent = Some(user_agent);
        }
    }
}

/// Zero would fail every request, so it keeps the current timeout.
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

pub fn read_settings_file(path: &Path) -> anyhow::Result<SettingsFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing settings file {}", path.display()))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please enter an API URL")]
    MissingApiUrl,
    #[error("invalid API URL `{0}`")]
    InvalidApiUrl(String),
    #[error("Please enter a URL")]
    MissingTargetUrl,
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP error! Status: {status}")]
    HttpStatus { status: u16, url: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// The service answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// The service answered `success: true` without the data it owes us.
    #[error("{0}")]
    MalformedSuccess(String),
}

/// Record returned by the URL extraction endpoint. The company profile is
/// only present on services that research the vendor as well.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ExtractedListing {
    #[serde(flatten)]
    pub tool: ToolRecord,
    #[serde(default)]
    pub company: Option<CompanyProfile>,
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(config.timeout);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder.build().context("building reqwest client")?;
        Ok(Self {
            client,
            api_url: config.api_url.trim().to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Resolve `segments` under the configured base URL, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if self.api_url.is_empty() {
            return Err(ApiError::MissingApiUrl);
        }
        let mut url =
            Url::parse(&self.api_url).map_err(|_| ApiError::InvalidApiUrl(self.api_url.clone()))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| ApiError::InvalidApiUrl(self.api_url.clone()))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let request_id = Uuid::new_v4();
        let span = info_span!("api_request", %request_id, method = %method, url = %url);

        async move {
            let mut request = self.client.request(method, url.clone());
            if let Some(body) = body {
                request = request.json(body);
            }

            let resp = request.send().await.inspect_err(|err| {
                warn!(error = %err, "request failed before a response arrived");
            })?;
            let status = resp.status();
            if !status.is_success() {
                warn!(status = status.as_u16(), "non-success status");
                return Err(ApiError::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let bytes = resp.bytes().await?;
            let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
            if !envelope.success {
                let message = envelope.failure_message();
                warn!(%message, "request rejected by service");
                return Err(ApiError::Rejected(message));
            }
            debug!(bytes = bytes.len(), "request accepted");
            Ok::<_, ApiError>(envelope)
        }
        .instrument(span)
        .await
    }

    pub async fn list_tools(&self) -> Result<Vec<ToolRecord>, ApiError> {
        let envelope = self
            .send::<(), Vec<ToolRecord>>(Method::GET, &[], None)
            .await?;
        let message = envelope.failure_message();
        envelope.data.ok_or(ApiError::MalformedSuccess(message))
    }

    pub async fn create_tool<B: Serialize + ?Sized>(&self, body: &B) -> Result<(), ApiError> {
        self.send::<B, serde_json::Value>(Method::POST, &["create"], Some(body))
            .await?;
        Ok(())
    }

    pub async fn update_tool<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<(), ApiError> {
        self.send::<B, serde_json::Value>(Method::PUT, &["update", id], Some(body))
            .await?;
        Ok(())
    }

    pub async fn delete_tool(&self, id: &str) -> Result<(), ApiError> {
        self.send::<(), serde_json::Value>(Method::DELETE, &["delete", id], None)
            .await?;
        Ok(())
    }

    /// Ask the service to scrape `target` and propose a catalog entry for it.
    pub async fn extract(&self, target: &str) -> Result<ExtractedListing, ApiError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ApiError::MissingTargetUrl);
        }
        let envelope = self
            .send::<_, ExtractedListing>(
                Method::POST,
                &["extract-url"],
                Some(&ExtractRequest { url: target }),
            )
            .await?;
        let message = envelope.failure_message();
        envelope.data.ok_or(ApiError::MalformedSuccess(message))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path as AxumPath, State},
        http::StatusCode,
        response::IntoResponse,
        routing::{delete, get, post, put},
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    #[derive(Debug, Clone, PartialEq)]
    pub struct Recorded {
        pub method: &'static str,
        pub path: String,
        pub body: Value,
    }

    #[derive(Clone, Default)]
    pub struct MockApi {
        pub requests: Arc<Mutex<Vec<Recorded>>>,
        pub fail_status: Option<u16>,
        pub reject: bool,
    }

    impl MockApi {
        fn record(&self, method: &'static str, path: String, body: Value) {
            self.requests
                .lock()
                .unwrap()
                .push(Recorded { method, path, body });
        }

        fn reply(&self, data: Value) -> axum::response::Response {
            if let Some(code) = self.fail_status {
                return StatusCode::from_u16(code).unwrap().into_response();
            }
            if self.reject {
                return Json(json!({"success": false, "message": "tool rejected"})).into_response();
            }
            Json(json!({"success": true, "data": data})).into_response()
        }

        pub fn recorded(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn list(State(api): State<MockApi>) -> axum::response::Response {
        api.record("GET", "/".to_string(), Value::Null);
        api.reply(json!([
            {"id": "t1", "title": "ChatGPT", "description": "Conversational assistant", "categories": ["Chatbot"]},
            {"id": "t2", "title": "Midjourney", "description": "Image generation", "creator": "Midjourney Inc"}
        ]))
    }

    async fn create(State(api): State<MockApi>, Json(body): Json<Value>) -> axum::response::Response {
        api.record("POST", "/create".to_string(), body);
        api.reply(json!({"id": "new"}))
    }

    async fn update(
        State(api): State<MockApi>,
        AxumPath(id): AxumPath<String>,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        api.record("PUT", format!("/update/{id}"), body);
        api.reply(Value::Null)
    }

    async fn remove(State(api): State<MockApi>, AxumPath(id): AxumPath<String>) -> axum::response::Response {
        api.record("DELETE", format!("/delete/{id}"), Value::Null);
        api.reply(Value::Null)
    }

    async fn extract(State(api): State<MockApi>, Json(body): Json<Value>) -> axum::response::Response {
        api.record("POST", "/extract-url".to_string(), body);
        api.reply(json!({
            "title": "Claude",
            "website": "https://claude.ai",
            "categories": ["Assistant"],
            "pricing_type": "Freemium",
            "company": {"name": "Anthropic", "founder": {"name": "Dario Amodei"}}
        }))
    }

    /// Serve the mock on an ephemeral port and return its base URL.
    pub async fn spawn(api: MockApi) -> String {
        let app = Router::new()
            .route("/", get(list))
            .route("/create", post(create))
            .route("/update/{id}", put(update))
            .route("/delete/{id}", delete(remove))
            .route("/extract-url", post(extract))
            .with_state(api);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}
