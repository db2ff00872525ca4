//! Public site rendering: data fetching with a short-lived response cache, HTML
//! fragments for each page, device filtering and the device detail view, plus the two
//! maintenance jobs (devices index generation and asset cache busting).

pub mod builder;
pub mod cache;
pub mod cache_bust;
pub mod catalog;
pub mod detail;
pub mod fetch;
pub mod filter;
pub mod generate;
pub mod render;

pub use self::builder::{BuildReport, SiteBuilder};
pub use self::cache::{CacheMode, CachedResponse, RequestOptions, ResponseCache};
pub use self::catalog::DeviceCard;
pub use self::detail::{DetailOutcome, DeviceDetail};
pub use self::fetch::{DataFetcher, DataSource};
pub use self::filter::{DeviceFilter, FilterOutcome};
