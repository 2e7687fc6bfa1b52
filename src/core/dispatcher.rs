use crate::core::normalizer::normalize;
use crate::domain::model::{DispatchReport, FetchFailure, FetchResult, SearchRequest};
use crate::domain::ports::SiteAdapter;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Fans one request out to every configured site and merges the results.
///
/// Adapters run concurrently, each under its own timeout. Results are merged
/// in configured priority order (earlier adapters first, fetch order kept
/// within one adapter). A failing site is recorded in the report and never
/// aborts the request; nothing is retried.
pub struct Dispatcher {
    adapters: Vec<Arc<dyn SiteAdapter>>,
    adapter_timeout: Duration,
}

impl Dispatcher {
    pub fn new(adapters: Vec<Arc<dyn SiteAdapter>>, adapter_timeout: Duration) -> Self {
        Self {
            adapters,
            adapter_timeout,
        }
    }

    pub fn adapters(&self) -> &[Arc<dyn SiteAdapter>] {
        &self.adapters
    }

    async fn fetch_one(&self, adapter: &dyn SiteAdapter, request: &SearchRequest) -> FetchResult {
        let limit = request.limit.min(adapter.max_page_size());
        match tokio::time::timeout(self.adapter_timeout, adapter.fetch(&request.criteria, limit))
            .await
        {
            Ok(result) => result.map(|mut outcome| {
                // Guard the contract even if an adapter over-delivers.
                outcome.listings.truncate(limit);
                outcome
            }),
            Err(_) => Err(FetchFailure::unavailable(format!(
                "no response within {}s",
                self.adapter_timeout.as_secs()
            ))),
        }
    }

    pub async fn handle_request(&self, request: &SearchRequest) -> DispatchReport {
        let fetches = self
            .adapters
            .iter()
            .map(|adapter| self.fetch_one(adapter.as_ref(), request));
        let results = join_all(fetches).await;

        let mut report = DispatchReport::default();
        for (adapter, result) in self.adapters.iter().zip(results) {
            let site = adapter.site();
            match result {
                Ok(outcome) => {
                    tracing::info!("📥 {}: {} listings fetched", site, outcome.listings.len());
                    if let Some(total) = outcome.total {
                        report.totals.push((site, total));
                    }
                    for raw in &outcome.listings {
                        match normalize(raw, site) {
                            Ok(resume) => report.resumes.push(resume),
                            Err(e) => {
                                tracing::warn!("Skipping {} listing: {}", site, e);
                                report.skipped.push((site, e));
                            }
                        }
                    }
                }
                Err(failure) => {
                    tracing::warn!("❌ {} failed: {}", site, failure);
                    report.failures.push((site, failure));
                }
            }
        }

        tracing::info!(
            "Request finished: {} resumes, {} failed sources, {} skipped listings",
            report.resumes.len(),
            report.failures.len(),
            report.skipped.len()
        );
        report
    }
}
