pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::Settings;
pub use crate::core::{Dispatcher, Renderer};
pub use crate::domain::model::{
    DispatchReport, FetchFailure, FetchOutcome, RawListing, Resume, SearchCriteria, SearchRequest,
    SourceSite,
};
pub use crate::utils::error::{Result, ScoutError};
