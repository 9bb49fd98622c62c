// ============================================================
// WORKBOOK PARSER
// ============================================================
// Decode the first worksheet of an Excel workbook (.xlsx or legacy
// BIFF .xls, detected by content) into the same RawTable the CSV path
// produces. Cells are coerced to their display string first so values
// like phone numbers or "12;34" survive intact.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, DataType, Reader};

use crate::domain::error::{AppError, Result};
use crate::domain::import::{RawRecord, RawTable};

/// Parse an Excel workbook from raw bytes. The first sheet's first row is the
/// header row. A workbook with no populated cell range yields an empty table,
/// not an error; a workbook with no sheet at all is a parse error.
pub fn parse_workbook_bytes(bytes: &[u8]) -> Result<RawTable> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| AppError::ParseError(format!("Failed to open Excel file: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::ParseError("No worksheet found".to_string()))?
        .map_err(|e| AppError::ParseError(format!("Failed to read Excel range: {}", e)))?;

    if range.is_empty() {
        return Ok(RawTable::default());
    }

    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(display_string).collect(),
        None => return Ok(RawTable::default()),
    };

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::ParseError(
            "Excel header row is empty".to_string(),
        ));
    }

    let mut records = Vec::new();
    for row in rows {
        // A fully blank row carries no signal; skip it like a blank CSV line
        if row.iter().all(|cell| display_string(cell).is_empty()) {
            continue;
        }

        let mut raw = RawRecord::new();
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            if let Some(cell) = row.get(idx) {
                raw.insert(header.clone(), display_string(cell));
            }
        }
        records.push(raw);
    }

    Ok(RawTable { headers, records })
}

/// Coerce any cell to the string a user would see in the sheet.
fn display_string(cell: &calamine::Data) -> String {
    if cell.is_empty() {
        return String::new();
    }
    cell.as_string()
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| format!("{}", cell))
}
