//! Crawler module for the world and country reports
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the spoofed user agent
//! - Country URL and ASN row extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator, CrawlStats};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{
    country_code_from_url, extract_asn_records, extract_country_urls, parse_asn_table, AsnTable,
    StructureError, ASN_TABLE_ID, COUNTRY_TABLE_ID,
};

use crate::config::Config;
use crate::ScrapeError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the dataset file
/// 2. Fetch the world report and collect the country report URLs
/// 3. Fetch each country report in turn and append its ASN records
/// 4. Finalize the dataset file
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed successfully
/// * `Err(ScrapeError)` - Crawl failed
pub async fn crawl(config: Config) -> Result<CrawlStats, ScrapeError> {
    run_crawl(config).await
}
