//! Native HTTP client using reqwest

use super::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Build a client with a fixed timeout.
    ///
    /// Redirects are not followed: Instagram answers unauthenticated or
    /// expired-session requests with a redirect to its login page, and the
    /// caller needs to see that.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| HttpError::Build {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }
}

impl HttpTransport for HttpClient {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = reqwest::Url::parse(&request.url).map_err(|_| HttpError::InvalidUrl {
            url: request.url.clone(),
        })?;

        let mut builder = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();

        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else {
        // without_url keeps query strings out of error messages
        HttpError::RequestFailed {
            message: e.without_url().to_string(),
        }
    }
}
