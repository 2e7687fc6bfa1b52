use crate::domain::model::{
    DeliveryError, FetchResult, FormattedMessage, SearchCriteria, SourceSite,
};
use async_trait::async_trait;

/// One job board. Implementations report every failure as data; `fetch`
/// never panics and never returns more than `limit` listings.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    fn site(&self) -> SourceSite;

    /// Largest `limit` a single fetch accepts.
    fn max_page_size(&self) -> usize;

    async fn fetch(&self, criteria: &SearchCriteria, limit: usize) -> FetchResult;
}

/// Where formatted messages end up (a Telegram chat, stdout, a test buffer).
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, chat_id: i64, message: &FormattedMessage) -> Result<(), DeliveryError>;
}
