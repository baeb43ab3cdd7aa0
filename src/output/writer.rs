//! Streaming writer for the dataset file
//!
//! The file is written as an append log: an opening brace, then one entry per
//! record each followed by [`ENTRY_SEPARATOR`], flushed as it goes. Only
//! [`DatasetWriter::finalize`] turns it into a complete document by dropping
//! the last separator and closing the brace. A crawl that dies half way keeps
//! every record written so far, in a file that lacks its closing brace.

use crate::output::OutputResult;
use crate::record::AsnRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Written after every entry; the last one is removed on finalize
pub const ENTRY_SEPARATOR: &str = ",\n";

const DOCUMENT_OPEN: &str = "{\n";
const DOCUMENT_CLOSE: &str = "\n}\n";

/// How ASN keys are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyStyle {
    /// `3320: {` - a bare numeric key, as the dataset has always been written
    #[default]
    Bare,

    /// `"3320": {` - strict JSON
    Quoted,
}

impl KeyStyle {
    pub fn from_strict(strict_json_keys: bool) -> Self {
        if strict_json_keys {
            KeyStyle::Quoted
        } else {
            KeyStyle::Bare
        }
    }
}

/// Escapes text for use inside a double-quoted string
fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() && c.is_ascii() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Formats one record as a dataset entry, without the trailing separator
///
/// The result contains only ASCII; any other character is dropped.
///
/// ```text
///   3320: {
///     "County": "DE",
///     "Name": "Deutsche Telekom AG",
///     "Routes v4": 13547,
///     "Routes v6": 268
///   }
/// ```
pub fn format_entry(record: &AsnRecord, style: KeyStyle) -> String {
    let key = match style {
        KeyStyle::Bare => record.asn.clone(),
        KeyStyle::Quoted => format!("\"{}\"", escape_str(&record.asn)),
    };

    let entry = format!(
        "  {}: {{\n    \"County\": \"{}\",\n    \"Name\": \"{}\",\n    \"Routes v4\": {},\n    \"Routes v6\": {}\n  }}",
        key,
        escape_str(&record.country),
        escape_str(&record.name),
        record.routes_v4,
        record.routes_v6
    );

    entry.chars().filter(char::is_ascii).collect()
}

/// Owns the dataset file for the duration of a crawl
///
/// Every append is flushed to the file before returning. If the writer is
/// dropped without [`finalize`](Self::finalize), the buffered writer is
/// flushed and the file is left without its closing brace.
#[derive(Debug)]
pub struct DatasetWriter {
    path: PathBuf,
    out: BufWriter<File>,
    style: KeyStyle,
    entries: usize,
}

impl DatasetWriter {
    /// Creates (or truncates) the dataset file and writes the opening brace
    pub fn create(path: &Path, style: KeyStyle) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut out = BufWriter::new(file);
        out.write_all(DOCUMENT_OPEN.as_bytes())?;
        out.flush()?;

        tracing::debug!("Initialized dataset file {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            out,
            style,
            entries: 0,
        })
    }

    /// Appends one record followed by the entry separator
    pub fn append(&mut self, record: &AsnRecord) -> OutputResult<()> {
        let entry = format_entry(record, self.style);
        self.out.write_all(entry.as_bytes())?;
        self.out.write_all(ENTRY_SEPARATOR.as_bytes())?;
        self.out.flush()?;
        self.entries += 1;
        Ok(())
    }

    /// Drops the trailing separator (if any entry was written) and closes the
    /// document
    ///
    /// # Returns
    ///
    /// The number of entries in the finished file
    pub fn finalize(mut self) -> OutputResult<usize> {
        let end = self.out.seek(SeekFrom::End(0))?;

        if self.entries > 0 {
            let trimmed = end.saturating_sub(ENTRY_SEPARATOR.len() as u64);
            self.out.get_ref().set_len(trimmed)?;
            self.out.seek(SeekFrom::End(0))?;
        }

        self.out.write_all(DOCUMENT_CLOSE.as_bytes())?;
        self.out.flush()?;
        self.out.get_ref().sync_all()?;

        tracing::debug!(
            "Finalized {} with {} entries",
            self.path.display(),
            self.entries
        );

        Ok(self.entries)
    }

    /// Number of entries appended so far
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Path of the dataset file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
