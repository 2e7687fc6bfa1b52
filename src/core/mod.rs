pub mod delivery;
pub mod dispatcher;
pub mod normalizer;

pub use crate::domain::model::{
    DispatchReport, FetchFailure, FetchOutcome, FetchResult, FormattedMessage, RawListing,
    Resume, SearchCriteria, SearchRequest, SourceSite,
};
pub use crate::domain::ports::{MessageSink, SiteAdapter};
pub use crate::utils::error::Result;
pub use delivery::{deliver, Renderer};
pub use dispatcher::Dispatcher;
pub use normalizer::normalize;
