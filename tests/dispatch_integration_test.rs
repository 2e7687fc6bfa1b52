use anyhow::Result;
use httpmock::prelude::*;
use resume_scout::adapters::site_adapters;
use resume_scout::adapters::stdout::StdoutSink;
use resume_scout::config::{Credentials, FileSettings, Settings};
use resume_scout::core::deliver;
use resume_scout::{Dispatcher, FetchFailure, Renderer, SearchCriteria, SearchRequest, SourceSite};
use serde_json::json;
use std::time::Duration;

const SEARCH_PAGE: &str = r#"<html><body><p>3 candidates</p>
<div class="card resume-link"><a href="/en/resumes/1/">1</a></div>
<div class="card resume-link"><a href="/en/resumes/2/">2</a></div>
<div class="card resume-link"><a href="/en/resumes/3/">3</a></div>
</body></html>"#;

fn settings(server: &MockServer) -> Result<Settings> {
    let file = FileSettings::from_toml_str(&format!(
        r#"
[work_ua]
base_url = "{base}"

[robota_ua]
login_url = "{login}"
search_url = "{search}"

[scraper_api]
enabled = false

[search]
per_site_limit = 5
adapter_timeout_seconds = 10
"#,
        base = server.base_url(),
        login = server.url("/Login"),
        search = server.url("/cvdb/resumes"),
    ))?;
    let credentials = Credentials {
        robota_username: "hr@example.com".to_string(),
        robota_password: "secret".to_string(),
        scraper_api_key: "key".to_string(),
        telegram_bot_token: None,
    };
    Ok(Settings::from_parts(credentials, file))
}

fn mock_work_ua(server: &MockServer, names: [&str; 3]) {
    server.mock(|when, then| {
        when.method(GET).path("/en/resumes/");
        then.status(200).body(SEARCH_PAGE);
    });
    for (i, name) in names.iter().enumerate() {
        let body = format!("<html><body><h1>{}</h1></body></html>", name);
        server.mock(|when, then| {
            when.method(GET).path(format!("/en/resumes/{}/", i + 1));
            then.status(200).body(body);
        });
    }
}

#[tokio::test]
async fn test_rate_limited_site_degrades_request() -> Result<()> {
    let server = MockServer::start();
    mock_work_ua(&server, ["A1", "A2", "A3"]);
    server.mock(|when, then| {
        when.method(POST).path("/Login");
        then.status(429);
    });

    let settings = settings(&server)?;
    let dispatcher = Dispatcher::new(site_adapters(&settings)?, settings.adapter_timeout());
    let report = dispatcher
        .handle_request(&SearchRequest {
            criteria: SearchCriteria::keywords("rust"),
            limit: 5,
        })
        .await;

    let names: Vec<&str> = report.resumes.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["A1", "A2", "A3"]);
    assert!(report.resumes.iter().all(|r| r.source == SourceSite::WorkUa));
    assert_eq!(
        report.failures,
        vec![(SourceSite::RobotaUa, FetchFailure::RateLimited)]
    );

    let renderer = Renderer::default();
    let summary = renderer.summary(&report);
    assert!(summary.text.contains("Robota.ua could not be searched: rate limited"));
    Ok(())
}

#[tokio::test]
async fn test_both_sites_merge_in_priority_order() -> Result<()> {
    let server = MockServer::start();
    mock_work_ua(&server, ["W1", "W2", "W3"]);
    server.mock(|when, then| {
        when.method(POST).path("/Login");
        then.status(200).json_body(json!("tok"));
    });
    server.mock(|when, then| {
        when.method(POST).path("/cvdb/resumes");
        then.status(200).json_body(json!({
            "total": 2,
            "documents": [
                {"resumeId": 5, "displayName": "R1"},
                {"resumeId": 6, "speciality": "no name here"},
                {"resumeId": 7, "displayName": "R2"}
            ]
        }));
    });

    let settings = settings(&server)?;
    let dispatcher = Dispatcher::new(site_adapters(&settings)?, Duration::from_secs(10));
    let report = dispatcher
        .handle_request(&SearchRequest {
            criteria: SearchCriteria::keywords("rust"),
            limit: 3,
        })
        .await;

    let names: Vec<&str> = report.resumes.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["W1", "W2", "W3", "R1", "R2"]);
    assert_eq!(report.skipped.len(), 1);
    assert!(!report.is_degraded());

    let renderer = Renderer::default();
    let mut messages = vec![renderer.summary(&report)];
    messages.extend(renderer.render(&report.resumes));
    let sink = StdoutSink::new(Vec::new());
    let sent = deliver(&sink, 0, &messages).await?;
    assert_eq!(sent, messages.len());

    let printed = String::from_utf8(sink.into_inner())?;
    assert!(printed.starts_with(
        "Found 5 resumes (3 on Work.ua, 2 on Robota.ua), showing 5:"
    ));
    assert!(printed.contains("👤 R2 (Robota.ua)"));
    Ok(())
}

#[tokio::test]
async fn test_failure_summary_never_shows_scraper_key() -> Result<()> {
    let file = FileSettings::from_toml_str(
        r#"
[robota_ua]
login_url = "http://127.0.0.1:9/Login"

[scraper_api]
enabled = true
endpoint = "http://127.0.0.1:9/"

[search]
adapter_timeout_seconds = 10
"#,
    )?;
    let credentials = Credentials {
        robota_username: "hr@example.com".to_string(),
        robota_password: "secret".to_string(),
        scraper_api_key: "SUPERSECRETKEY".to_string(),
        telegram_bot_token: None,
    };
    let settings = Settings::from_parts(credentials, file);
    let dispatcher = Dispatcher::new(site_adapters(&settings)?, settings.adapter_timeout());
    let report = dispatcher
        .handle_request(&SearchRequest {
            criteria: SearchCriteria::keywords("rust"),
            limit: 5,
        })
        .await;

    assert_eq!(report.failures.len(), 2);
    let summary = Renderer::default().summary(&report);
    assert!(summary.text.contains("Work.ua could not be searched: site unavailable"));
    assert!(!summary.text.contains("SUPERSECRETKEY"));
    assert!(!summary.text.contains("api_key"));
    Ok(())
}
