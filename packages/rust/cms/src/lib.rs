//! HTTP access to the headless CMS and the profile API.
//!
//! Plain request/response calls: fetch, check the status, decode JSON. No
//! retries or backoff; callers decide how to present a failure.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{debug, info, instrument};
use url::Url;

use tutorhub_shared::{CmsConfig, Result, TutorHubError, UserProfile};

/// Path of the "current user" endpoint, relative to the base URL.
const CURRENT_USER_PATH: &str = "api/users/me";

/// Maximum response size we accept (5 MB).
const MAX_RESPONSE_SIZE: u64 = 5 * 1024 * 1024;

/// User-Agent string for CMS requests.
const USER_AGENT: &str = concat!("TutorHub/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// CmsClient
// ---------------------------------------------------------------------------

/// Client for the content and profile endpoints of the CMS.
#[derive(Debug, Clone)]
pub struct CmsClient {
    base: Url,
    blog_path: String,
    client: Client,
}

impl CmsClient {
    /// Build a client from the `[cms]` config section.
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let mut base = config.parsed_base_url()?;
        // `Url::join` replaces the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TutorHubError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base,
            blog_path: config.blog_path.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch the page document whose layout holds the blog articles.
    #[instrument(skip_all, fields(base = %self.base))]
    pub async fn fetch_blog_document(&self) -> Result<Value> {
        let url = self.endpoint(&self.blog_path)?;
        info!(%url, "fetching blog document");
        self.get_json(url, None).await
    }

    /// Fetch the profile of the user that `token` authenticates.
    ///
    /// Unwraps the `{ "user": {...} }` envelope. A `null` user means the
    /// token was not accepted.
    #[instrument(skip_all, fields(base = %self.base))]
    pub async fn fetch_current_user(&self, token: &str) -> Result<UserProfile> {
        let url = self.endpoint(CURRENT_USER_PATH)?;
        let body = self.get_json(url, Some(token)).await?;

        let user = match body.get("user") {
            Some(Value::Null) => {
                return Err(TutorHubError::validation(
                    "profile API returned no user; the token was not accepted",
                ));
            }
            Some(user) => user.clone(),
            None => body,
        };

        serde_json::from_value(user)
            .map_err(|e| TutorHubError::parse(format!("invalid user profile: {e}")))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| TutorHubError::validation(format!("invalid endpoint path '{path}': {e}")))
    }

    async fn get_json(&self, url: Url, token: Option<&str>) -> Result<Value> {
        let mut request = self.client.get(url.clone());
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("JWT {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| TutorHubError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TutorHubError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            check_size(&url, len)?;
        }

        let body = response
            .text()
            .await
            .map_err(|e| TutorHubError::Network(format!("{url}: failed to read body: {e}")))?;
        // Chunked responses carry no Content-Length.
        check_size(&url, body.len() as u64)?;

        debug!(%url, bytes = body.len(), "response received");

        serde_json::from_str(&body).map_err(|e| TutorHubError::parse(format!("{url}: {e}")))
    }
}

fn check_size(url: &Url, len: u64) -> Result<()> {
    if len > MAX_RESPONSE_SIZE {
        return Err(TutorHubError::validation(format!(
            "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
        )));
    }
    Ok(())
}
