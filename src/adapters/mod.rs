// Adapters layer: concrete implementations for external systems (job boards, scraping proxy, messaging).

pub mod http;
pub mod options;
pub mod robota_ua;
pub mod stdout;
#[cfg(feature = "telegram")]
pub mod telegram;
pub mod work_ua;

use crate::config::Settings;
use crate::domain::ports::SiteAdapter;
use crate::utils::error::Result;
use std::sync::Arc;

pub use robota_ua::RobotaUaAdapter;
pub use work_ua::WorkUaAdapter;

/// Both job boards in priority order: Work.ua results are listed first.
pub fn site_adapters(settings: &Settings) -> Result<Vec<Arc<dyn SiteAdapter>>> {
    let adapters: Vec<Arc<dyn SiteAdapter>> = vec![
        Arc::new(WorkUaAdapter::new(settings)?),
        Arc::new(RobotaUaAdapter::new(settings)?),
    ];
    Ok(adapters)
}
