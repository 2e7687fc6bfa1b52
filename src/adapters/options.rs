//! Resolving user-facing search labels against a site's option catalog.

use crate::utils::text::most_similar;
use std::collections::BTreeMap;

/// Id of the catalog region closest to `region`, if any scores above `threshold`.
pub fn resolve_region(
    catalog: &BTreeMap<String, u32>,
    region: Option<&str>,
    threshold: u8,
) -> Option<u32> {
    let region = region.map(str::trim).filter(|r| !r.is_empty())?;
    match most_similar(region, catalog.keys().map(String::as_str), threshold) {
        Some(name) => {
            tracing::debug!("Region '{}' matched '{}'", region, name);
            catalog.get(name).copied()
        }
        None => {
            tracing::info!("⚠️ Region '{}' not found in catalog, searching all regions", region);
            None
        }
    }
}

/// Site ids for the selected experience labels, in selection order without
/// duplicates. Unknown labels are ignored.
pub fn resolve_experience<T>(catalog: &BTreeMap<String, Vec<T>>, labels: &[String]) -> Vec<T>
where
    T: Clone + PartialEq,
{
    let mut ids: Vec<T> = Vec::new();
    for label in labels {
        match catalog.get(label) {
            Some(values) => {
                for value in values {
                    if !ids.contains(value) {
                        ids.push(value.clone());
                    }
                }
            }
            None => tracing::debug!("Experience label '{}' has no site mapping", label),
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions() -> BTreeMap<String, u32> {
        [("Kyiv", 1), ("Lviv", 2), ("Kharkiv", 21)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_resolve_region() {
        assert_eq!(resolve_region(&regions(), Some("kyiv"), 70), Some(1));
        assert_eq!(resolve_region(&regions(), Some("Kharkov"), 70), Some(21));
        assert_eq!(resolve_region(&regions(), Some("Warsaw"), 70), None);
        assert_eq!(resolve_region(&regions(), Some("  "), 70), None);
        assert_eq!(resolve_region(&regions(), None, 70), None);
    }

    #[test]
    fn test_resolve_experience_expands_and_dedupes() {
        let catalog: BTreeMap<String, Vec<u32>> = [
            ("2 to 5 years".to_string(), vec![3]),
            ("More than 5 years".to_string(), vec![4, 5]),
            ("5 to 10 years".to_string(), vec![4]),
        ]
        .into_iter()
        .collect();

        let labels = vec![
            "More than 5 years".to_string(),
            "5 to 10 years".to_string(),
            "2 to 5 years".to_string(),
            "unknown".to_string(),
        ];
        assert_eq!(resolve_experience(&catalog, &labels), vec![4, 5, 3]);
    }
}
