use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Job board a listing was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSite {
    WorkUa,
    RobotaUa,
}

impl SourceSite {
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceSite::WorkUa => "Work.ua",
            SourceSite::RobotaUa => "Robota.ua",
        }
    }
}

impl fmt::Display for SourceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A listing exactly as one site delivered it. The field set is site-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub site: SourceSite,
    pub fetched_at: DateTime<Utc>,
    pub fields: HashMap<String, serde_json::Value>,
}

impl RawListing {
    pub fn new(site: SourceSite, fields: HashMap<String, serde_json::Value>) -> Self {
        Self {
            site,
            fetched_at: Utc::now(),
            fields,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub employer: Option<String>,
    pub role: Option<String>,
    pub duration: Option<String>,
}

impl Experience {
    pub fn is_empty(&self) -> bool {
        self.employer.is_none() && self.role.is_none() && self.duration.is_none()
    }
}

/// Site-independent resume. Only the normalizer builds these, and it never
/// produces one without a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub source: SourceSite,
    pub full_name: String,
    pub headline: Option<String>,
    pub skills: BTreeSet<String>,
    pub experience: Vec<Experience>,
    pub contact: Option<String>,
    pub profile_url: Option<String>,
    pub salary_expectation: Option<String>,
    pub filling_percentage: Option<u8>,
    pub fetched_at: DateTime<Utc>,
}

/// What the user is looking for. Labels (region, experience) are resolved
/// against each site's option catalog by the adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub keywords: String,
    pub category: Option<String>,
    pub region: Option<String>,
    pub salary_from: Option<u32>,
    pub salary_to: Option<u32>,
    pub experience: Vec<String>,
}

impl SearchCriteria {
    pub fn keywords(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            ..Self::default()
        }
    }

    /// A search needs at least a search term or a category.
    pub fn is_searchable(&self) -> bool {
        !self.keywords.trim().is_empty()
            || self
                .category
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty())
    }

    /// Search term sent to sites that have no category filter.
    pub fn query_text(&self) -> &str {
        let keywords = self.keywords.trim();
        if keywords.is_empty() {
            self.category.as_deref().map(str::trim).unwrap_or_default()
        } else {
            keywords
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub criteria: SearchCriteria,
    /// Per-site listing budget.
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("authentication rejected")]
    AuthFailure,

    #[error("rate limited")]
    RateLimited,

    #[error("site unavailable: {reason}")]
    SiteUnavailable { reason: String },

    #[error("invalid search criteria: {reason}")]
    InvalidCriteria { reason: String },
}

impl FetchFailure {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        FetchFailure::SiteUnavailable {
            reason: reason.into(),
        }
    }
}

/// Listings of one fetch plus the match count the site itself reported,
/// which is usually far larger than the listing budget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub listings: Vec<RawListing>,
    pub total: Option<usize>,
}

impl FetchOutcome {
    pub fn new(listings: Vec<RawListing>, total: Option<usize>) -> Self {
        Self { listings, total }
    }
}

pub type FetchResult = std::result::Result<FetchOutcome, FetchFailure>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("{site} listing has no name")]
    MissingName { site: SourceSite },

    #[error("listing from {actual} passed to the {expected} normalizer")]
    SiteMismatch {
        expected: SourceSite,
        actual: SourceSite,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("messaging channel rejected the message: {reason}")]
    ChannelRejected { reason: String },

    #[error("delivery stopped after {sent} of {total} messages: {reason}")]
    Interrupted {
        sent: usize,
        total: usize,
        reason: String,
    },
}

/// One outgoing chat message, already sized to the channel limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedMessage {
    pub text: String,
    pub resume_count: usize,
}

/// Outcome of one dispatched request.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub resumes: Vec<Resume>,
    pub failures: Vec<(SourceSite, FetchFailure)>,
    pub skipped: Vec<(SourceSite, NormalizationError)>,
    /// Site-reported match counts, in priority order.
    pub totals: Vec<(SourceSite, usize)>,
}

impl DispatchReport {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_needs_term_or_category() {
        assert!(!SearchCriteria::default().is_searchable());
        assert!(!SearchCriteria::keywords("   ").is_searchable());
        assert!(SearchCriteria::keywords("rust developer").is_searchable());

        let by_category = SearchCriteria {
            category: Some("it".to_string()),
            ..SearchCriteria::default()
        };
        assert!(by_category.is_searchable());
        assert_eq!(by_category.query_text(), "it");
    }

    #[test]
    fn test_experience_emptiness() {
        assert!(Experience::default().is_empty());
        let entry = Experience {
            role: Some("QA".to_string()),
            ..Experience::default()
        };
        assert!(!entry.is_empty());
    }
}
