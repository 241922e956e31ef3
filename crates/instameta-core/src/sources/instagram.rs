//! Instagram post fetcher
//!
//! Two endpoints:
//! - authenticated: the post page JSON (`?__a=1&__d=dis`) with a `sessionid` cookie
//! - public: the web GraphQL shortcode query, no cookies
//!
//! With a credential the authenticated endpoint is tried first and a login
//! wall (401/403/429, a redirect, or `require_login`) triggers exactly one
//! public attempt. Without a credential only the public endpoint is used.

use instameta_domain::PostRef;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::InstagramConfig;
use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse, HttpTransport};

/// Longest body prefix kept in errors
const ERROR_BODY_LIMIT: usize = 300;

/// Both attempts failed. `status` is `None` for transport failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to fetch Instagram metadata (status {}): {body}", status_label(.status))]
pub struct FetchError {
    pub status: Option<u16>,
    pub body: String,
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "n/a".to_string(), |s| s.to_string())
}

impl FetchError {
    fn from_response(response: &HttpResponse) -> Self {
        Self {
            status: Some(response.status),
            body: truncate_body(&response.body),
        }
    }

    /// Whether a fresh session credential might help
    pub fn suggests_new_session(&self) -> bool {
        matches!(self.status, Some(401) | Some(403) | Some(429))
    }
}

impl From<HttpError> for FetchError {
    fn from(e: HttpError) -> Self {
        Self {
            status: None,
            body: e.to_string(),
        }
    }
}

/// Outcome of one request attempt
#[derive(Debug)]
enum Attempt {
    Json(Value),
    /// The endpoint wants a (valid) login
    AuthRejected(FetchError),
    Failed(FetchError),
}

pub struct InstagramSource<T> {
    transport: T,
    config: InstagramConfig,
}

impl InstagramSource<HttpClient> {
    /// Source backed by a real reqwest client
    pub fn native(config: InstagramConfig) -> Result<Self, HttpError> {
        let client = HttpClient::new(&config.user_agent, config.timeout())?;
        Ok(Self::new(client, config))
    }
}

impl<T: HttpTransport> InstagramSource<T> {
    pub fn new(transport: T, config: InstagramConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &InstagramConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch raw post JSON for `post`.
    ///
    /// `session_id` is the task-level credential; when absent the configured
    /// fallback credential is used.
    pub async fn fetch(&self, post: &PostRef, session_id: Option<&str>) -> Result<Value, FetchError> {
        let session_id = session_id
            .or(self.config.session_id.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let Some(session_id) = session_id else {
            tracing::debug!("No Instagram session, using public endpoint");
            return self.fetch_public(post).await;
        };

        match self.attempt(self.authenticated_request(post, session_id)).await {
            Attempt::Json(value) => Ok(value),
            Attempt::AuthRejected(err) => {
                tracing::warn!(
                    "Authenticated Instagram request rejected (status {}), retrying public endpoint",
                    status_label(&err.status)
                );
                self.fetch_public(post).await
            }
            Attempt::Failed(err) => Err(err),
        }
    }

    async fn fetch_public(&self, post: &PostRef) -> Result<Value, FetchError> {
        let request = self.public_request(post)?;
        match self.attempt(request).await {
            Attempt::Json(value) => Ok(value),
            Attempt::AuthRejected(err) | Attempt::Failed(err) => Err(err),
        }
    }

    async fn attempt(&self, request: HttpRequest) -> Attempt {
        let response = match self.transport.get(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Instagram request failed: {}", e);
                return Attempt::Failed(e.into());
            }
        };
        tracing::info!(
            "Instagram {} request returned HTTP {}",
            if request.has_cookie() { "authenticated" } else { "public" },
            response.status
        );
        classify_response(&response)
    }

    fn authenticated_request(&self, post: &PostRef, session_id: &str) -> HttpRequest {
        HttpRequest::get(self.config.authenticated_url_for(&post.shortcode))
            .header("Cookie", format!("sessionid={}", session_id))
            .header("X-IG-App-ID", self.config.app_id.as_str())
            .header("Accept", "application/json")
    }

    fn public_request(&self, post: &PostRef) -> Result<HttpRequest, FetchError> {
        let variables = json!({ "shortcode": post.shortcode }).to_string();
        let url = url::Url::parse_with_params(
            &self.config.public_url,
            &[
                ("query_hash", self.config.public_query_hash.as_str()),
                ("variables", variables.as_str()),
            ],
        )
        .map_err(|_| {
            FetchError::from(HttpError::InvalidUrl {
                url: self.config.public_url.clone(),
            })
        })?;

        Ok(HttpRequest::get(url.as_str())
            .header("X-IG-App-ID", self.config.app_id.as_str())
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Accept", "application/json"))
    }
}

fn classify_response(response: &HttpResponse) -> Attempt {
    if matches!(response.status, 401 | 403 | 429) || response.is_redirect() {
        return Attempt::AuthRejected(FetchError::from_response(response));
    }
    if !response.is_success() {
        return Attempt::Failed(FetchError::from_response(response));
    }

    let value: Value = match serde_json::from_str(&response.body) {
        Ok(value) => value,
        Err(_) => return Attempt::Failed(FetchError::from_response(response)),
    };

    if value.get("require_login").and_then(Value::as_bool) == Some(true) {
        return Attempt::AuthRejected(FetchError::from_response(response));
    }

    Attempt::Json(value)
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
