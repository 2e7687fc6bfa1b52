use crate::adapters::http::{build_client, get_text, ScraperApi};
use crate::adapters::options::{resolve_experience, resolve_region};
use crate::config::{Settings, WorkUaSettings};
use crate::domain::model::{
    FetchFailure, FetchOutcome, FetchResult, RawListing, SearchCriteria, SourceSite,
};
use crate::domain::ports::SiteAdapter;
use crate::utils::error::Result;
use crate::utils::text::{clean_text, non_blank};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

/// Resume pages fetched at the same time.
const PAGE_CONCURRENCY: usize = 4;

/// Work.ua has no public API: the search page and every resume page are
/// scraped as HTML, through the scraping proxy when it is enabled.
pub struct WorkUaAdapter {
    client: Client,
    settings: WorkUaSettings,
    scraper: Option<ScraperApi>,
    similarity_threshold: u8,
}

impl WorkUaAdapter {
    pub fn new(settings: &Settings) -> Result<Self> {
        let scraper = settings.scraper_api.enabled.then(|| {
            ScraperApi::new(
                settings.scraper_api.endpoint.clone(),
                settings.credentials.scraper_api_key.clone(),
            )
        });

        Ok(Self {
            client: build_client(Duration::from_secs(settings.work_ua.timeout_seconds))?,
            settings: settings.work_ua.clone(),
            scraper,
            similarity_threshold: settings.search.similarity_threshold,
        })
    }

    /// Resolves a site path or an absolute link against the base URL.
    fn site_url(&self, path: &str) -> std::result::Result<Url, FetchFailure> {
        Url::parse(&self.settings.base_url)
            .and_then(|base| base.join(path))
            .map_err(|e| FetchFailure::unavailable(format!("invalid Work.ua URL: {}", e)))
    }

    /// First search page for `criteria`, query parameters in a fixed order.
    pub fn search_url(&self, criteria: &SearchCriteria) -> std::result::Result<Url, FetchFailure> {
        let path = match criteria.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => {
                self.settings.category_path.replace("{}", category)
            }
            _ => self.settings.resumes_path.clone(),
        };
        let mut url = self.site_url(&path)?;

        {
            let mut query = url.query_pairs_mut();
            let keywords = criteria.keywords.trim();
            if !keywords.is_empty() {
                query.append_pair("search", keywords);
            }
            if let Some(region) = resolve_region(
                &self.settings.regions,
                criteria.region.as_deref(),
                self.similarity_threshold,
            ) {
                query.append_pair("region", &region.to_string());
            }
            if let Some(option) = criteria
                .salary_from
                .and_then(|amount| self.settings.salary_from.get(&amount.to_string()))
            {
                query.append_pair("salaryfrom", option);
            }
            if let Some(option) = criteria
                .salary_to
                .and_then(|amount| self.settings.salary_to.get(&amount.to_string()))
            {
                query.append_pair("salaryto", option);
            }
            let experience = resolve_experience(&self.settings.experience, &criteria.experience);
            if !experience.is_empty() {
                query.append_pair("experience", &experience.join("+"));
            }
            query.append_pair("page", "1");
        }

        Ok(url)
    }

    async fn get_page(&self, target: Url) -> std::result::Result<String, FetchFailure> {
        let url = match &self.scraper {
            Some(scraper) => scraper.wrap(&target)?,
            None => target,
        };
        get_text(&self.client, url).await
    }

    /// One resume page. `Ok(None)` means the page is skipped; auth and
    /// rate-limit failures abort the whole fetch since every remaining page
    /// would hit them too.
    async fn fetch_resume(
        &self,
        href: String,
    ) -> std::result::Result<Option<RawListing>, FetchFailure> {
        let resume_url = match self.site_url(&href) {
            Ok(url) => url,
            Err(failure) => {
                tracing::warn!("Skipping Work.ua link '{}': {}", href, failure);
                return Ok(None);
            }
        };
        match self.get_page(resume_url.clone()).await {
            Ok(html) => {
                tracing::debug!("Processing: {}", resume_url);
                let fields = parse_resume_page(&html, resume_url.as_str());
                Ok(Some(RawListing::new(SourceSite::WorkUa, fields)))
            }
            Err(failure @ (FetchFailure::AuthFailure | FetchFailure::RateLimited)) => Err(failure),
            Err(failure) => {
                tracing::warn!("Skipping Work.ua resume {}: {}", resume_url, failure);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl SiteAdapter for WorkUaAdapter {
    fn site(&self) -> SourceSite {
        SourceSite::WorkUa
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

        let search_url = self.search_url(criteria)?;
        tracing::info!("🔎 Work.ua: searching '{}'", criteria.query_text());
        let search_html = self.get_page(search_url).await?;

        let total = parse_total_candidates(&search_html);
        if let Some(total) = total {
            tracing::info!("Work.ua reports {} candidates", total);
        }

        let links = parse_resume_links(&search_html);
        tracing::debug!("Work.ua search page lists {} resumes", links.len());

        let pages: Vec<Option<RawListing>> = stream::iter(links.into_iter().take(limit))
            .map(|href| self.fetch_resume(href))
            .buffered(PAGE_CONCURRENCY)
            .try_collect()
            .await?;
        let listings = pages.into_iter().flatten().collect();

        Ok(FetchOutcome::new(listings, total))
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e}"))
}

fn element_text(element: &ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn total_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(\d[\d\s]*)\s+candidates?\b").unwrap())
}

/// Total from the "N candidates" counter on the search page.
pub fn parse_total_candidates(html: &str) -> Option<usize> {
    let document = Html::parse_document(html);
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    total_re().captures(&text).and_then(|caps| {
        caps[1]
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .ok()
    })
}

/// Resume links of the search page, in page order.
pub fn parse_resume_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let cards = selector("div.card.resume-link");
    let links = selector("a[href]");

    document
        .select(&cards)
        .filter_map(|card| card.select(&links).next())
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Site-specific raw fields of one resume page.
pub fn parse_resume_page(html: &str, url: &str) -> HashMap<String, Value> {
    let document = Html::parse_document(html);
    let mut fields = HashMap::new();
    fields.insert("url".to_string(), json!(url));

    if let Some(h1) = document.select(&selector("h1")).next() {
        if let Some(name) = non_blank(&element_text(&h1)) {
            fields.insert("name".to_string(), json!(name));
        }
        let position = h1
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "h2" && !has_class(el, "h4"))
            .and_then(|h2| non_blank(&element_text(&h2)))
            .filter(|text| !text.eq_ignore_ascii_case("Work experience"));
        if let Some(position) = position {
            fields.insert("position".to_string(), json!(position));
        }
    }

    if let Some(salary) = parse_salary(&document) {
        fields.insert("salary".to_string(), json!(salary));
    }

    let mut skills: Vec<String> = document
        .select(&selector("li.no-style span.ellipsis"))
        .filter_map(|el| non_blank(&element_text(&el)))
        .collect();
    if skills.is_empty() {
        skills = document
            .select(&selector("ul.skills li"))
            .filter_map(|el| non_blank(&element_text(&el)))
            .collect();
    }
    if !skills.is_empty() {
        fields.insert("skills".to_string(), json!(skills));
    }

    let experience = parse_experience(&document);
    if !experience.is_empty() {
        fields.insert("experience".to_string(), Value::Array(experience));
    }

    if let Some(contact) = parse_contact(&document) {
        fields.insert("contact".to_string(), json!(contact));
    }

    fields
}

fn parse_salary(document: &Html) -> Option<String> {
    let meta = document
        .select(&selector(r#"meta[name="Description"], meta[name="description"]"#))
        .next()?;
    let content = meta.value().attr("content")?;
    let (_, after) = content.split_once("salary starting at")?;
    after.split_whitespace().next().map(str::to_string)
}

#[derive(Default)]
struct ExperienceDraft {
    position: String,
    company: Option<String>,
    period: Option<String>,
    has_details: bool,
}

fn parse_experience(document: &Html) -> Vec<Value> {
    let Some(header) = document
        .select(&selector("h2"))
        .find(|h2| element_text(h2).eq_ignore_ascii_case("Work experience"))
    else {
        return Vec::new();
    };

    let period_selector = selector("span.text-default-7");
    let mut drafts: Vec<ExperienceDraft> = Vec::new();

    for sibling in header.next_siblings().filter_map(ElementRef::wrap) {
        let name = sibling.value().name();
        if name == "h2" && has_class(&sibling, "h4") {
            drafts.push(ExperienceDraft {
                position: element_text(&sibling),
                ..ExperienceDraft::default()
            });
        } else if name == "h2" {
            // next section (education, skills, ...)
            break;
        } else if name == "p" && has_class(&sibling, "mb-0") {
            let Some(draft) = drafts.last_mut().filter(|d| !d.has_details) else {
                continue;
            };
            let period = sibling
                .select(&period_selector)
                .next()
                .and_then(|span| non_blank(&element_text(&span)));
            let details = element_text(&sibling);
            let details = match &period {
                Some(period) => clean_text(&details.replace(period.as_str(), "")),
                None => details,
            };
            draft.company = non_blank(&details);
            draft.period = period;
            draft.has_details = true;
        }
    }

    drafts
        .into_iter()
        .map(|draft| {
            json!({
                "position": draft.position,
                "company": draft.company,
                "period": draft.period,
            })
        })
        .collect()
}

fn parse_contact(document: &Html) -> Option<String> {
    document
        .select(&selector(r#"a[href^="tel:"], a[href^="mailto:"]"#))
        .filter_map(|a| a.value().attr("href"))
        .map(|href| {
            href.trim_start_matches("tel:")
                .trim_start_matches("mailto:")
                .to_string()
        })
        .find(|contact| !contact.is_empty())
}
