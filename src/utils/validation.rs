use crate::utils::error::{Result, ScoutError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScoutError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ScoutError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ScoutError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("work_ua.base_url", "https://www.work.ua").is_ok());
        assert!(validate_url("scraper_api.endpoint", "http://api.scraperapi.com").is_ok());
        assert!(validate_url("work_ua.base_url", "").is_err());
        assert!(validate_url("work_ua.base_url", "work.ua").is_err());
        assert!(validate_url("work_ua.base_url", "ftp://work.ua").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("search.per_site_limit", 5, 1).is_ok());
        assert!(validate_positive_number("search.per_site_limit", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range_and_required() {
        assert!(validate_range("search.similarity_threshold", 70u8, 0, 100).is_ok());
        assert!(validate_range("search.similarity_threshold", 120u8, 0, 100).is_err());

        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("TELEGRAM_BOT_TOKEN", &missing),
            Err(ScoutError::MissingConfigError { .. })
        ));
        assert!(validate_non_empty_string("ROBOTA_UA_USERNAME", "  ").is_err());
    }
}
