// ============================================================
// CSV PARSER
// ============================================================
// The one shared CSV parser: delimiter sniffing, quote escaping,
// encoding fallback. Every server-side CSV path goes through here.

use csv::ReaderBuilder;

use crate::domain::error::{AppError, Result};
use crate::domain::import::{RawRecord, RawTable};

/// CSV parser with delimiter sniffing
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse raw bytes with encoding detection and automatic delimiter sniffing
    pub fn parse_bytes_auto_detect(bytes: &[u8]) -> Result<RawTable> {
        let content = decode_bytes(bytes);
        let delimiter = Self::detect_delimiter(&content);
        Self::new().with_delimiter(delimiter).parse_content(&content)
    }

    /// Detect the delimiter by counting commas vs semicolons over the first
    /// few non-empty lines. The higher count wins; semicolon wins ties.
    pub fn detect_delimiter(content: &str) -> u8 {
        let mut commas = 0usize;
        let mut semicolons = 0usize;

        for line in content.lines().filter(|l| !l.trim().is_empty()).take(3) {
            commas += line.matches(',').count();
            semicolons += line.matches(';').count();
        }

        if semicolons >= commas {
            b';'
        } else {
            b','
        }
    }

    /// Parse CSV content from a string.
    ///
    /// The first line is the header row. Blank lines are skipped. A data line
    /// shorter than the header leaves its missing trailing columns absent from
    /// the record (not empty strings), so "column not provided" stays
    /// distinguishable from "empty value". Double-quote escaping follows the
    /// csv crate's contract: a doubled quote inside a quoted field is a
    /// literal quote, and a delimiter inside quotes is not a field boundary.
    pub fn parse_content(&self, content: &str) -> Result<RawTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true) // Allow rows with different lengths
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::ParseError(
                "CSV header line is empty".to_string(),
            ));
        }

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", row_idx + 2, e))
            })?;

            let mut raw = RawRecord::new();
            for (idx, header) in headers.iter().enumerate() {
                if header.is_empty() {
                    continue;
                }
                // get() is None past the end of a short row: leave the key absent
                if let Some(value) = record.get(idx) {
                    raw.insert(header.clone(), value.to_string());
                }
            }
            records.push(raw);
        }

        Ok(RawTable { headers, records })
    }
}

/// Decode file bytes to a string. Try UTF-8 first (BOM-aware), fall back to
/// Windows-1252 for the legacy exports that still show up.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let (content, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if !had_errors {
        return content.into_owned();
    }

    let (content, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    content.into_owned()
}
