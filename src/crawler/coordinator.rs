//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop:
//! - Initializing the dataset file
//! - Discovering country reports from the world report
//! - Draining the country queue one page at a time
//! - Appending every extracted record as soon as it is read
//! - Finalizing the dataset file

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{country_code_from_url, extract_country_urls, parse_asn_table, AsnTable};
use crate::output::{DatasetWriter, KeyStyle};
use crate::ScrapeError;
use std::collections::VecDeque;
use std::path::Path;

/// Counters for a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Country report URLs found on the world report
    pub countries_discovered: usize,

    /// Country reports fetched
    pub countries_fetched: usize,

    /// Country reports that had no ASN table
    pub countries_without_table: usize,

    /// Records written to the dataset
    pub records_written: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    fetcher: Fetcher,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - Failed to build the HTTP client
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let fetcher = Fetcher::new(&config.crawler)?;
        Ok(Self { config, fetcher })
    }

    /// Fetches the world report and returns the country report URLs in
    /// document order
    pub async fn discover(&self) -> Result<VecDeque<String>, ScrapeError> {
        let world_url = self.config.world_url();
        tracing::debug!("Fetching world report: {}", world_url);

        let document = self.fetcher.fetch_document(&world_url).await?;
        let urls = extract_country_urls(&document, &self.config.crawler.base_url).map_err(
            |source| ScrapeError::Structure {
                url: world_url.clone(),
                source,
            },
        )?;

        tracing::info!("Found {} country reports", urls.len());
        Ok(urls.into())
    }

    /// Runs the crawl
    ///
    /// The dataset file is created before anything is fetched. Countries are
    /// processed strictly in discovery order; each URL leaves the queue
    /// before it is fetched. Any error aborts the crawl and leaves the file
    /// unfinalized, with every record read so far already on disk.
    pub async fn run(&mut self) -> Result<CrawlStats, ScrapeError> {
        let output_path = Path::new(&self.config.output.path);
        let style = KeyStyle::from_strict(self.config.output.strict_json_keys);
        let mut writer = DatasetWriter::create(output_path, style)?;

        let mut pending = self.discover().await?;
        let mut stats = CrawlStats {
            countries_discovered: pending.len(),
            ..CrawlStats::default()
        };

        while let Some(url) = pending.pop_front() {
            let country = country_code_from_url(&url);

            tracing::info!("Downloading {}...", url);
            let document = self.fetcher.fetch_document(&url).await?;
            stats.countries_fetched += 1;

            let table = parse_asn_table(&document, country).map_err(|source| {
                ScrapeError::Structure {
                    url: url.clone(),
                    source,
                }
            })?;

            match table {
                AsnTable::Absent => {
                    tracing::debug!("No ASN table for {}", country);
                    stats.countries_without_table += 1;
                }
                AsnTable::Present(records) => {
                    tracing::debug!("{} ASNs for {}", records.len(), country);
                    for record in &records {
                        writer.append(record)?;
                    }
                }
            }
        }

        stats.records_written = writer.finalize()?;

        tracing::info!(
            "Wrote {} records from {} countries to {}",
            stats.records_written,
            stats.countries_fetched,
            self.config.output.path
        );

        Ok(stats)
    }
}

/// Runs a crawl with the given configuration
pub async fn run_crawl(config: Config) -> Result<CrawlStats, ScrapeError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
