// ============================================================
// FILE PARSING INFRASTRUCTURE
// ============================================================
// CSV and Excel workbook decoding into RawTable

mod csv_parser;
mod workbook_parser;

pub use csv_parser::{decode_bytes, CsvParser};
pub use workbook_parser::parse_workbook_bytes;

use crate::domain::error::Result;
use crate::domain::import::RawTable;

/// Parse an uploaded file, dispatching on the file extension. Anything that
/// is not a spreadsheet binary is treated as delimited text.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<RawTable> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        parse_workbook_bytes(bytes)
    } else {
        CsvParser::parse_bytes_auto_detect(bytes)
    }
}
