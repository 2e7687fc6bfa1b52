use crate::utils::error::{Result, ScoutError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Everything that can live in the settings file. Every section is optional
/// and falls back to the public endpoints of both sites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub work_ua: WorkUaSettings,
    pub robota_ua: RobotaUaSettings,
    pub scraper_api: ScraperApiSettings,
    pub search: SearchSettings,
    pub delivery: DeliverySettings,
    pub bot: BotSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkUaSettings {
    pub base_url: String,
    pub resumes_path: String,
    /// `{}` is replaced by the category slug.
    pub category_path: String,
    pub max_page_size: usize,
    pub timeout_seconds: u64,
    /// Region name -> work.ua region id.
    pub regions: BTreeMap<String, u32>,
    /// Salary amount -> work.ua `salaryfrom` option id.
    pub salary_from: BTreeMap<String, String>,
    /// Salary amount -> work.ua `salaryto` option id.
    pub salary_to: BTreeMap<String, String>,
    /// Experience label -> work.ua experience ids.
    pub experience: BTreeMap<String, Vec<String>>,
}

impl Default for WorkUaSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.work.ua".to_string(),
            resumes_path: "/en/resumes/".to_string(),
            category_path: "/en/resumes-{}/".to_string(),
            max_page_size: 14,
            timeout_seconds: 60,
            regions: BTreeMap::new(),
            salary_from: BTreeMap::new(),
            salary_to: BTreeMap::new(),
            experience: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotaUaSettings {
    pub base_url: String,
    pub login_url: String,
    pub search_url: String,
    pub max_page_size: usize,
    pub timeout_seconds: u64,
    /// Region name -> robota.ua city id.
    pub regions: BTreeMap<String, u32>,
    /// Experience label -> robota.ua experience ids.
    pub experience: BTreeMap<String, Vec<u32>>,
}

impl Default for RobotaUaSettings {
    fn default() -> Self {
        Self {
            base_url: "https://robota.ua".to_string(),
            login_url: "https://auth-api.robota.ua/Login".to_string(),
            search_url: "https://employer-api.robota.ua/cvdb/resumes".to_string(),
            max_page_size: 40,
            timeout_seconds: 30,
            regions: BTreeMap::new(),
            experience: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperApiSettings {
    /// When off, Work.ua pages are requested directly.
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for ScraperApiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://api.scraperapi.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub per_site_limit: usize,
    /// Fuzzy region matches must score above this (0-100).
    pub similarity_threshold: u8,
    pub adapter_timeout_seconds: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            per_site_limit: 5,
            similarity_threshold: 70,
            adapter_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySettings {
    pub max_message_chars: usize,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            max_message_chars: 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub salary_from: Vec<u32>,
    pub salary_to: Vec<u32>,
    pub experience: Vec<String>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            salary_from: vec![5000, 10000, 15000, 20000, 30000, 40000, 50000],
            salary_to: vec![10000, 15000, 20000, 30000, 40000, 50000, 100000],
            experience: vec![
                "No experience".to_string(),
                "Less than 1 year".to_string(),
                "1 to 2 years".to_string(),
                "2 to 5 years".to_string(),
                "More than 5 years".to_string(),
            ],
        }
    }
}

impl FileSettings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content, |name| std::env::var(name).ok());

        toml::from_str(&processed).map_err(|e| ScoutError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

fn env_var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Replaces `${VAR}` with the looked-up value; unknown variables are left as-is.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_var_re().replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = FileSettings::from_toml_str("").unwrap();
        assert_eq!(settings, FileSettings::default());
        assert_eq!(settings.work_ua.max_page_size, 14);
        assert_eq!(settings.delivery.max_message_chars, 4096);
    }

    #[test]
    fn test_partial_sections_and_catalogs() {
        let settings = FileSettings::from_toml_str(
            r#"
[work_ua]
base_url = "http://localhost:9000"

[work_ua.regions]
Kyiv = 1
Lviv = 2

[robota_ua.experience]
"More than 5 years" = [4, 5]

[search]
per_site_limit = 3
"#,
        )
        .unwrap();

        assert_eq!(settings.work_ua.base_url, "http://localhost:9000");
        assert_eq!(settings.work_ua.resumes_path, "/en/resumes/");
        assert_eq!(settings.work_ua.regions.get("Lviv"), Some(&2));
        assert_eq!(
            settings.robota_ua.experience.get("More than 5 years"),
            Some(&vec![4, 5])
        );
        assert_eq!(settings.search.per_site_limit, 3);
        assert_eq!(settings.search.similarity_threshold, 70);
    }

    #[test]
    fn test_substitute_env_vars() {
        let out = substitute_env_vars("url = \"${HOST}/x\" other = \"${MISSING}\"", |name| {
            (name == "HOST").then(|| "http://mock".to_string())
        });
        assert_eq!(out, "url = \"http://mock/x\" other = \"${MISSING}\"");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = FileSettings::from_toml_str("[search\nper_site_limit = ").unwrap_err();
        assert!(matches!(err, ScoutError::ConfigValidationError { .. }));
    }
}
