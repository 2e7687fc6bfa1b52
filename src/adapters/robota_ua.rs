use crate::adapters::http::{build_client, check_status, classify_error};
use crate::adapters::options::{resolve_experience, resolve_region};
use crate::config::{Credentials, RobotaUaSettings, Settings};
use crate::domain::model::{
    FetchFailure, FetchOutcome, FetchResult, RawListing, SearchCriteria, SourceSite,
};
use crate::domain::ports::SiteAdapter;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Robota.ua exposes a JSON employer API behind a bearer token. The adapter
/// logs in on every fetch and keeps no session between requests.
pub struct RobotaUaAdapter {
    client: Client,
    settings: RobotaUaSettings,
    credentials: Arc<Credentials>,
    similarity_threshold: u8,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: Option<usize>,
    #[serde(default)]
    documents: Vec<Value>,
}

impl RobotaUaAdapter {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(settings.robota_ua.timeout_seconds))?,
            settings: settings.robota_ua.clone(),
            credentials: Arc::clone(&settings.credentials),
            similarity_threshold: settings.search.similarity_threshold,
        })
    }

    async fn login(&self) -> std::result::Result<String, FetchFailure> {
        let payload = json!({
            "username": self.credentials.robota_username,
            "password": self.credentials.robota_password,
        });

        let response = self
            .client
            .post(&self.settings.login_url)
            .json(&payload)
            .send()
            .await
            .map_err(classify_error)?;

        // Robota.ua answers a wrong password with 400.
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(FetchFailure::AuthFailure);
        }
        let body = check_status(response)?
            .text()
            .await
            .map_err(classify_error)?;

        extract_token(&body).ok_or_else(|| {
            tracing::warn!("Robota.ua login succeeded but carried no token");
            FetchFailure::AuthFailure
        })
    }

    pub fn search_payload(&self, criteria: &SearchCriteria, limit: usize) -> Value {
        let city_id = resolve_region(
            &self.settings.regions,
            criteria.region.as_deref(),
            self.similarity_threshold,
        );

        json!({
            "keyWords": criteria.query_text(),
            "cityId": city_id,
            "salary": {
                "from": criteria.salary_from,
                "to": criteria.salary_to,
            },
            "experienceIds": resolve_experience(&self.settings.experience, &criteria.experience),
            "page": 0,
            "count": limit,
        })
    }

    fn profile_url(&self, resume_id: &Value) -> Option<String> {
        let id = match resume_id {
            Value::Number(n) => n.to_string(),
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return None,
        };
        Some(format!(
            "{}/candidates/{}",
            self.settings.base_url.trim_end_matches('/'),
            id
        ))
    }
}

/// The login endpoint returns the token as a bare JSON string; some
/// deployments wrap it in an object.
fn extract_token(body: &str) -> Option<String> {
    let token = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(token)) => token,
        Ok(Value::Object(obj)) => ["token", "access_token", "accessToken"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(str::to_string)?,
        Ok(_) => return None,
        Err(_) => body.trim().to_string(),
    };
    let token = token.trim().to_string();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl SiteAdapter for RobotaUaAdapter {
    fn site(&self) -> SourceSite {
        SourceSite::RobotaUa
    }

    fn max_page_size(&self) -> usize {
        self.settings.max_page_size
    }

    async fn fetch(&self, criteria: &SearchCriteria, limit: usize) -> FetchResult {
        if !criteria.is_searchable() {
            return Err(FetchFailure::InvalidCriteria {
                reason: "a search term or category is required".to_string(),
            });
        }
        if limit == 0 {
            return Err(FetchFailure::InvalidCriteria {
                reason: "limit must be positive".to_string(),
            });
        }
        let limit = limit.min(self.max_page_size());

        let token = self.login().await?;
        tracing::debug!("Logged in to Robota.ua");

        let payload = self.search_payload(criteria, limit);
        tracing::info!("🔎 Robota.ua: searching '{}'", criteria.query_text());

        let response = self
            .client
            .post(&self.settings.search_url)
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(classify_error)?;
        let response = check_status(response)?;

        let body: SearchResponse = response.json().await.map_err(|e| {
            FetchFailure::unavailable(format!("unexpected Robota.ua response: {}", e.without_url()))
        })?;
        if let Some(total) = body.total {
            tracing::info!("Found {} resumes on Robota.ua", total);
        }

        let listings = body
            .documents
            .into_iter()
            .filter_map(|document| match document {
                Value::Object(obj) => Some(obj),
                other => {
                    tracing::warn!("Ignoring non-object Robota.ua document: {}", other);
                    None
                }
            })
            .take(limit)
            .map(|obj| {
                let mut fields: std::collections::HashMap<String, Value> =
                    obj.into_iter().collect();
                if let Some(url) = fields.get("resumeId").and_then(|id| self.profile_url(id)) {
                    fields.insert("profileUrl".to_string(), json!(url));
                }
                RawListing::new(SourceSite::RobotaUa, fields)
            })
            .collect();

        Ok(FetchOutcome::new(listings, body.total))
    }
}
