pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;

pub use catalog::{Plan, PlanCatalog, PlanId};
pub use config::SiteConfig;
pub use error::{SiteError, SiteResult};
