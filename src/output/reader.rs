//! Reading a finished dataset back into records
//!
//! Datasets written with bare numeric keys are not strict JSON, so bare keys
//! are quoted before the text goes through `serde_json`. Entries come back in
//! file order, and repeated ASNs are kept.

use crate::output::OutputResult;
use crate::record::AsnRecord;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Route counts are written unquoted, but accept strings too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RouteCount {
    Number(serde_json::Number),
    Text(String),
}

impl From<RouteCount> for String {
    fn from(count: RouteCount) -> Self {
        match count {
            RouteCount::Number(n) => n.to_string(),
            RouteCount::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntryFields {
    #[serde(rename = "County")]
    country: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Routes v4")]
    routes_v4: RouteCount,
    #[serde(rename = "Routes v6")]
    routes_v6: RouteCount,
}

/// Every entry of the top-level object, in order
struct Dataset(Vec<AsnRecord>);

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DatasetVisitor;

        impl<'de> Visitor<'de> for DatasetVisitor {
            type Value = Dataset;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping ASNs to records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Dataset, A::Error> {
                let mut records = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((asn, fields)) = map.next_entry::<String, EntryFields>()? {
                    records.push(AsnRecord {
                        asn,
                        country: fields.country,
                        name: fields.name,
                        routes_v4: fields.routes_v4.into(),
                        routes_v6: fields.routes_v6.into(),
                    });
                }
                Ok(Dataset(records))
            }
        }

        deserializer.deserialize_map(DatasetVisitor)
    }
}

/// Splits `  3320: {` into the bare key and the rest of the line
fn bare_key(line: &str) -> Option<(&str, &str)> {
    let body = line.strip_prefix("  ")?;
    if body.starts_with(' ') || body.starts_with('"') {
        return None;
    }
    let idx = body.find(": {")?;
    Some((&body[..idx], &body[idx..]))
}

/// Rewrites entry lines with bare keys so the text is strict JSON
fn quote_bare_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    for line in text.split_inclusive('\n') {
        match bare_key(line) {
            Some((key, rest)) => {
                out.push_str("  \"");
                out.push_str(key);
                out.push('"');
                out.push_str(rest);
            }
            None => out.push_str(line),
        }
    }
    out
}

/// Parses the text of a finished dataset
///
/// Both bare and quoted ASN keys are accepted. An unfinished file (no closing
/// brace) is an error.
pub fn parse_dataset(text: &str) -> OutputResult<Vec<AsnRecord>> {
    let json = quote_bare_keys(text);
    let Dataset(records) = serde_json::from_str(&json)?;
    Ok(records)
}

/// Reads and parses a finished dataset file
pub fn read_dataset(path: &Path) -> OutputResult<Vec<AsnRecord>> {
    let text = std::fs::read_to_string(path)?;
    parse_dataset(&text)
}
