//! HTML extraction for the world and country reports
//!
//! This module handles pulling structured data out of parsed report pages:
//! - Country report URLs from the world report (`#table_countries`)
//! - ASN rows from a country report (`#asns`)
//! - The country code carried in a country report URL

use crate::record::AsnRecord;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Id of the country listing table on the world report
pub const COUNTRY_TABLE_ID: &str = "table_countries";

/// Id of the ASN table on a country report
pub const ASN_TABLE_ID: &str = "asns";

/// Number of cells a country report row must have
const ASN_ROW_CELLS: usize = 6;

/// A page did not have the shape the extractor relies on
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("missing element '{0}'")]
    MissingElement(String),

    #[error("<{element}> #{index} has no '{attribute}' attribute")]
    MissingAttribute {
        element: String,
        attribute: String,
        index: usize,
    },

    #[error("row #{row} has {cells} cells, expected at least {expected}")]
    MalformedRow {
        row: usize,
        cells: usize,
        expected: usize,
    },

    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// Outcome of looking for the ASN table on a country report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsnTable {
    /// The page has no ASN table; the country has no registered ASNs
    Absent,

    /// Records in document row order
    Present(Vec<AsnRecord>),
}

impl AsnTable {
    /// The records on the page, empty when the table is absent
    pub fn into_records(self) -> Vec<AsnRecord> {
        match self {
            AsnTable::Absent => Vec::new(),
            AsnTable::Present(records) => records,
        }
    }
}

fn selector(css: &str) -> Result<Selector, StructureError> {
    Selector::parse(css).map_err(|e| StructureError::Selector(format!("{}: {:?}", css, e)))
}

/// Finds the first element with the given id, then its first `<tbody>`
fn find_table_body<'a>(document: &'a Html, id: &str) -> Result<Option<ElementRef<'a>>, StructureError> {
    let table_selector = selector(&format!("#{}", id))?;
    let tbody_selector = selector("tbody")?;

    Ok(document
        .select(&table_selector)
        .next()
        .and_then(|table| table.select(&tbody_selector).next()))
}

/// Extracts every country report URL from the world report
///
/// Anchors are read from the body of `#table_countries` in document order.
/// Each URL is `base_url` followed by the anchor's `href`, joined as plain
/// text.
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Absolute country URLs in document order
/// * `Err(StructureError)` - The table is missing or an anchor has no href
///
/// # Example
///
/// ```
/// use asn_harvest::crawler::extract_country_urls;
/// use scraper::Html;
///
/// let html = r#"<table id="table_countries"><tbody>
///     <tr><td><a href="/report/world/DE">DE</a></td></tr>
/// </tbody></table>"#;
/// let document = Html::parse_document(html);
/// let urls = extract_country_urls(&document, "http://bgp.he.net").unwrap();
/// assert_eq!(urls, vec!["http://bgp.he.net/report/world/DE".to_string()]);
/// ```
pub fn extract_country_urls(document: &Html, base_url: &str) -> Result<Vec<String>, StructureError> {
    let tbody = find_table_body(document, COUNTRY_TABLE_ID)?
        .ok_or_else(|| StructureError::MissingElement(format!("#{} tbody", COUNTRY_TABLE_ID)))?;
    let anchor_selector = selector("a")?;

    tbody
        .select(&anchor_selector)
        .enumerate()
        .map(|(index, anchor)| {
            anchor
                .value()
                .attr("href")
                .map(|href| format!("{}{}", base_url, href))
                .ok_or_else(|| StructureError::MissingAttribute {
                    element: "a".to_string(),
                    attribute: "href".to_string(),
                    index,
                })
        })
        .collect()
}

/// Reads the ASN table of a country report
///
/// A page without `#asns` (or without a body in it) is [`AsnTable::Absent`],
/// which is not an error. Each `<tr>` of the table body becomes one record:
///
/// | Cell | Field |
/// |------|-------|
/// | 0 | ASN, first two characters removed |
/// | 1 | organization name |
/// | 3 | IPv4 route count |
/// | 5 | IPv6 route count |
///
/// Cells 2 and 4 are ignored. Text is taken as-is.
///
/// # Arguments
///
/// * `document` - The parsed country report
/// * `country` - Country code to stamp on every record
///
/// # Returns
///
/// * `Ok(AsnTable)` - The table, or its absence
/// * `Err(StructureError)` - A row has fewer than six cells
pub fn parse_asn_table(document: &Html, country: &str) -> Result<AsnTable, StructureError> {
    let tbody = match find_table_body(document, ASN_TABLE_ID)? {
        Some(tbody) => tbody,
        None => return Ok(AsnTable::Absent),
    };

    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let mut records = Vec::new();
    for (row_index, row) in tbody.select(&row_selector).enumerate() {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>())
            .collect();

        if cells.len() < ASN_ROW_CELLS {
            return Err(StructureError::MalformedRow {
                row: row_index,
                cells: cells.len(),
                expected: ASN_ROW_CELLS,
            });
        }

        records.push(AsnRecord::from_cells(
            &cells[0], country, &cells[1], &cells[3], &cells[5],
        ));
    }

    Ok(AsnTable::Present(records))
}

/// Extracts the ASN records of a country report, empty when it has no table
pub fn extract_asn_records(document: &Html, country: &str) -> Result<Vec<AsnRecord>, StructureError> {
    parse_asn_table(document, country).map(AsnTable::into_records)
}

/// Country code of a country report URL: its last `/`-separated segment
///
/// # Example
///
/// ```
/// use asn_harvest::crawler::country_code_from_url;
///
/// assert_eq!(country_code_from_url("http://bgp.he.net/report/world/US"), "US");
/// ```
pub fn country_code_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
