//! HTTP plumbing shared by the site adapters: client construction, the
//! scraping-API proxy and the mapping from HTTP outcomes to `FetchFailure`.

use crate::domain::model::FetchFailure;
use crate::utils::error::Result;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("resume-scout/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Third-party proxy that fetches a page on our behalf.
#[derive(Debug, Clone)]
pub struct ScraperApi {
    endpoint: String,
    api_key: String,
}

impl ScraperApi {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// `{endpoint}?api_key=KEY&url=<target>`, with the target URL encoded.
    pub fn wrap(&self, target: &Url) -> std::result::Result<Url, FetchFailure> {
        Url::parse_with_params(
            &self.endpoint,
            &[("api_key", self.api_key.as_str()), ("url", target.as_str())],
        )
        .map_err(|e| FetchFailure::unavailable(format!("invalid scraper endpoint: {}", e)))
    }
}

pub fn classify_status(status: StatusCode) -> Option<FetchFailure> {
    if status.is_success() {
        return None;
    }

    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchFailure::AuthFailure,
        StatusCode::TOO_MANY_REQUESTS => FetchFailure::RateLimited,
        other => FetchFailure::unavailable(format!("HTTP {}", other)),
    })
}

/// Failure reasons reach chat users, so the request URL (which carries the
/// scraper api key when proxied) is dropped from the error first.
pub fn classify_error(err: reqwest::Error) -> FetchFailure {
    let err = err.without_url();
    if err.is_timeout() {
        FetchFailure::unavailable("request timed out")
    } else if err.is_connect() {
        FetchFailure::unavailable("connection failed")
    } else {
        FetchFailure::unavailable(err.to_string())
    }
}

/// Fails with the classified status, otherwise hands the response back.
pub fn check_status(response: Response) -> std::result::Result<Response, FetchFailure> {
    match classify_status(response.status()) {
        Some(failure) => {
            tracing::debug!("Request to {} failed: {}", redact(response.url()), failure);
            Err(failure)
        }
        None => Ok(response),
    }
}

pub async fn get_text(client: &Client, url: Url) -> std::result::Result<String, FetchFailure> {
    tracing::debug!("GET {}", redact(&url));
    let response = client
        .get(url)
        .send()
        .await
        .map_err(classify_error)?;
    let response = check_status(response)?;
    response.text().await.map_err(classify_error)
}

/// URL with the `api_key` query value masked, for logs.
pub fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "api_key") {
        return url.to_string();
    }
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
