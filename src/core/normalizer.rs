use crate::domain::model::{Experience, NormalizationError, RawListing, Resume, SourceSite};
use crate::utils::text::non_blank;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

/// Where each `Resume` field lives in one site's raw listing. Every entry is
/// a list of candidate keys tried in order; dotted keys reach into nested
/// objects.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub name: &'static [&'static str],
    pub headline: &'static [&'static str],
    pub skills: &'static [&'static str],
    pub experience: &'static [&'static str],
    pub employer: &'static [&'static str],
    pub role: &'static [&'static str],
    pub duration: &'static [&'static str],
    pub contact: &'static [&'static str],
    pub profile_url: &'static [&'static str],
    pub salary: &'static [&'static str],
    pub filling_percentage: &'static [&'static str],
}

const WORK_UA_FIELDS: FieldMap = FieldMap {
    name: &["name"],
    headline: &["position"],
    skills: &["skills"],
    experience: &["experience"],
    employer: &["company"],
    role: &["position"],
    duration: &["period"],
    contact: &["contact"],
    profile_url: &["url"],
    salary: &["salary"],
    filling_percentage: &["fillingPercentage"],
};

const ROBOTA_UA_FIELDS: FieldMap = FieldMap {
    name: &["displayName", "fullName", "name"],
    headline: &["speciality", "position"],
    skills: &["skills", "keywords"],
    experience: &["experience"],
    employer: &["company"],
    role: &["position"],
    duration: &["datesDiff"],
    contact: &["contacts.phone", "contacts.email", "phone", "email"],
    profile_url: &["profileUrl"],
    salary: &["salary", "salaryFull"],
    filling_percentage: &["fillingPercentage"],
};

impl SourceSite {
    pub fn field_map(&self) -> &'static FieldMap {
        match self {
            SourceSite::WorkUa => &WORK_UA_FIELDS,
            SourceSite::RobotaUa => &ROBOTA_UA_FIELDS,
        }
    }
}

fn lookup<'a>(fields: &'a HashMap<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = fields.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    Some(current)
}

fn lookup_obj<'a>(obj: &'a serde_json::Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = obj.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    Some(current)
}

/// Scalar as display text. Numbers are accepted so ids and amounts survive.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(fields: &HashMap<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| lookup(fields, key))
        .find_map(as_text)
}

fn first_text_in(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| lookup_obj(obj, key))
        .find_map(as_text)
}

fn skills(fields: &HashMap<String, Value>, map: &FieldMap) -> BTreeSet<String> {
    let Some(value) = map.skills.iter().find_map(|key| lookup(fields, key)) else {
        return BTreeSet::new();
    };
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(obj) => first_text_in(obj, &["name", "title"]),
                other => as_text(other),
            })
            .collect(),
        // "Rust, Tokio; SQL"
        Value::String(s) => s
            .split([',', ';'])
            .filter_map(non_blank)
            .collect(),
        _ => BTreeSet::new(),
    }
}

fn experience(fields: &HashMap<String, Value>, map: &FieldMap) -> Vec<Experience> {
    let Some(Value::Array(items)) = map.experience.iter().find_map(|key| lookup(fields, key))
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| Experience {
            employer: first_text_in(obj, map.employer),
            role: first_text_in(obj, map.role),
            duration: first_text_in(obj, map.duration),
        })
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn filling_percentage(fields: &HashMap<String, Value>, map: &FieldMap) -> Option<u8> {
    map.filling_percentage
        .iter()
        .filter_map(|key| lookup(fields, key))
        .find_map(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        })
        .map(|pct| pct.clamp(0.0, 100.0).round() as u8)
}

/// Maps one raw listing onto the common resume shape. Pure: the same input
/// always yields the same output, and no partially filled resume is ever
/// returned.
pub fn normalize(raw: &RawListing, source_site: SourceSite) -> Result<Resume, NormalizationError> {
    if raw.site != source_site {
        return Err(NormalizationError::SiteMismatch {
            expected: source_site,
            actual: raw.site,
        });
    }

    let map = source_site.field_map();
    let fields = &raw.fields;

    let full_name = first_text(fields, map.name)
        .ok_or(NormalizationError::MissingName { site: source_site })?;

    Ok(Resume {
        source: source_site,
        full_name,
        headline: first_text(fields, map.headline),
        skills: skills(fields, map),
        experience: experience(fields, map),
        contact: first_text(fields, map.contact),
        profile_url: first_text(fields, map.profile_url),
        salary_expectation: first_text(fields, map.salary),
        filling_percentage: filling_percentage(fields, map),
        fetched_at: raw.fetched_at,
    })
}
