use anyhow::Result;
use httpmock::prelude::*;
use resume_scout::adapters::WorkUaAdapter;
use resume_scout::config::{Credentials, FileSettings, Settings};
use resume_scout::core::SiteAdapter;
use resume_scout::{FetchFailure, SearchCriteria, SourceSite};
use std::time::{Duration, Instant};

fn credentials() -> Credentials {
    Credentials {
        robota_username: "hr@example.com".to_string(),
        robota_password: "secret".to_string(),
        scraper_api_key: "scraper-key".to_string(),
        telegram_bot_token: None,
    }
}

/// Work.ua settings pointed at the mock server, scraping proxy off.
fn direct_settings(server: &MockServer) -> Result<Settings> {
    let file = FileSettings::from_toml_str(&format!(
        r#"
[work_ua]
base_url = "{}"
max_page_size = 3
timeout_seconds = 5

[scraper_api]
enabled = false
"#,
        server.base_url()
    ))?;
    Ok(Settings::from_parts(credentials(), file))
}

fn search_page(ids: &[u32]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div class="card card-hover resume-link"><h2><a href="/en/resumes/{id}/">Resume {id}</a></h2></div>"#
            )
        })
        .collect();
    format!("<html><body><p>{} candidates</p>{}</body></html>", ids.len(), cards)
}

fn resume_page(name: &str) -> String {
    format!(
        r#"<html><head><meta name="Description" content="Resume, salary starting at 30000 UAH"></head>
<body><div class="card"><h1>{name}</h1><h2>Rust developer</h2></div></body></html>"#
    )
}

#[tokio::test]
async fn test_fetch_follows_links_and_respects_limit() -> Result<()> {
    let server = MockServer::start();

    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/en/resumes/")
            .query_param("search", "rust")
            .query_param("page", "1");
        then.status(200).body(search_page(&[101, 102, 103, 104]));
    });
    let first = server.mock(|when, then| {
        when.method(GET).path("/en/resumes/101/");
        then.status(200).body(resume_page("Olena Kovalenko"));
    });
    let second = server.mock(|when, then| {
        when.method(GET).path("/en/resumes/102/");
        then.status(200).body(resume_page("Taras Shevchuk"));
    });
    let third = server.mock(|when, then| {
        when.method(GET).path("/en/resumes/103/");
        then.status(200).body(resume_page("Iryna Bondar"));
    });

    let adapter = WorkUaAdapter::new(&direct_settings(&server)?)?;
    let outcome = adapter.fetch(&SearchCriteria::keywords("rust"), 2).await?;
    let listings = &outcome.listings;

    assert_eq!(outcome.total, Some(4));
    assert_eq!(listings.len(), 2);
    assert!(listings.iter().all(|l| l.site == SourceSite::WorkUa));
    assert_eq!(listings[0].fields["name"], "Olena Kovalenko");
    assert_eq!(listings[1].fields["name"], "Taras Shevchuk");
    assert_eq!(
        listings[0].fields["url"],
        format!("{}/en/resumes/101/", server.base_url())
    );
    assert_eq!(listings[0].fields["salary"], "30000");

    search.assert_hits(1);
    first.assert_hits(1);
    second.assert_hits(1);
    third.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_limit_is_capped_at_page_size() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/");
        then.status(200).body(search_page(&[1, 2, 3, 4, 5]));
    });
    let pages = server.mock(|when, then| {
        when.method(GET)
            .path_matches(regex::Regex::new(r"^/en/resumes/\d+/$").unwrap());
        then.status(200).body(resume_page("Candidate"));
    });

    let adapter = WorkUaAdapter::new(&direct_settings(&server)?)?;
    let outcome = adapter.fetch(&SearchCriteria::keywords("qa"), 50).await?;

    assert_eq!(outcome.listings.len(), 3);
    pages.assert_hits(3);
    Ok(())
}

#[tokio::test]
async fn test_broken_resume_page_is_skipped() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/");
        then.status(200).body(search_page(&[7, 8]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/7/");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/8/");
        then.status(200).body(resume_page("Andrii"));
    });

    let adapter = WorkUaAdapter::new(&direct_settings(&server)?)?;
    let outcome = adapter.fetch(&SearchCriteria::keywords("go"), 3).await?;

    assert_eq!(outcome.listings.len(), 1);
    assert_eq!(outcome.listings[0].fields["name"], "Andrii");
    Ok(())
}

#[tokio::test]
async fn test_unparsable_link_is_skipped() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/");
        then.status(200).body(
            r#"<html><body>
<div class="card resume-link"><a href="http://[broken/">?</a></div>
<div class="card resume-link"><a href="/en/resumes/8/">8</a></div>
</body></html>"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/8/");
        then.status(200).body(resume_page("Andrii"));
    });

    let adapter = WorkUaAdapter::new(&direct_settings(&server)?)?;
    let outcome = adapter.fetch(&SearchCriteria::keywords("go"), 3).await?;

    let names: Vec<&serde_json::Value> =
        outcome.listings.iter().map(|l| &l.fields["name"]).collect();
    assert_eq!(names, vec!["Andrii"]);
    assert_eq!(outcome.total, None);
    Ok(())
}

#[tokio::test]
async fn test_resume_pages_are_fetched_concurrently_in_page_order() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/");
        then.status(200).body(search_page(&[1, 2, 3]));
    });
    for (id, name) in [(1, "Slow first"), (2, "Second"), (3, "Third")] {
        let delay = if id == 1 { 600 } else { 300 };
        server.mock(|when, then| {
            when.method(GET).path(format!("/en/resumes/{}/", id));
            then.status(200)
                .delay(Duration::from_millis(delay))
                .body(resume_page(name));
        });
    }

    let adapter = WorkUaAdapter::new(&direct_settings(&server)?)?;
    let started = Instant::now();
    let outcome = adapter.fetch(&SearchCriteria::keywords("rust"), 3).await?;
    let elapsed = started.elapsed();

    let names: Vec<&serde_json::Value> =
        outcome.listings.iter().map(|l| &l.fields["name"]).collect();
    assert_eq!(names, vec!["Slow first", "Second", "Third"]);
    // one after another would take at least 1.2s
    assert!(elapsed < Duration::from_millis(1100), "took {:?}", elapsed);
    Ok(())
}

#[tokio::test]
async fn test_throttled_search_is_rate_limited() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/");
        then.status(429);
    });

    let adapter = WorkUaAdapter::new(&direct_settings(&server)?)?;
    let result = adapter.fetch(&SearchCriteria::keywords("rust"), 3).await;

    assert_eq!(result, Err(FetchFailure::RateLimited));
    Ok(())
}

#[tokio::test]
async fn test_rejected_scraper_key_is_auth_failure() -> Result<()> {
    let server = MockServer::start();
    let proxy = server.mock(|when, then| {
        when.method(GET)
            .path("/scrape")
            .query_param("api_key", "scraper-key")
            .query_param_exists("url");
        then.status(403).body("Invalid API key");
    });

    let file = FileSettings::from_toml_str(&format!(
        r#"
[scraper_api]
enabled = true
endpoint = "{}"
"#,
        server.url("/scrape")
    ))?;
    let adapter = WorkUaAdapter::new(&Settings::from_parts(credentials(), file))?;
    let result = adapter.fetch(&SearchCriteria::keywords("rust"), 3).await;

    assert_eq!(result, Err(FetchFailure::AuthFailure));
    proxy.assert_hits(1);
    Ok(())
}
