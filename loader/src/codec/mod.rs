//! CSV codec with encoding auto-detection.
//!
//! Parses CSV text into string records keyed by column header, and
//! serializes records back out for the sf CLI. Quoting follows the
//! RFC4180-ish rules the fixtures use: a field wrapped in double quotes
//! may contain literal commas, and on output any field containing a comma
//! or a quote is wrapped in quotes with internal quotes doubled.
//!
//! Embedded newlines inside quoted fields are not supported.

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// One CSV row: column name to string value.
pub type Record = HashMap<String, String>;

/// A parsed CSV file. Column order is carried separately from the records
/// so serialization can reproduce the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Data rows, in file order.
    pub records: Vec<Record>,
}

impl Table {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records as JSON objects, for the debug `parse` command.
    pub fn to_json(&self) -> Vec<Value> {
        self.records
            .iter()
            .map(|record| {
                let mut obj = Map::new();
                for header in &self.headers {
                    let value = record.get(header).map(String::as_str).unwrap_or("");
                    obj.insert(header.clone(), json!(value));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        // UTF-8 and anything unrecognized: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Split one CSV line into fields.
///
/// Quote state toggles on each `"`; commas only separate fields when no
/// quote is open. Quote characters themselves are stripped and fields are
/// trimmed.
fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == ',' && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Parse CSV text into a [`Table`].
///
/// The first line is the header row; each subsequent non-empty line maps
/// `headers[i]` to `values[i]`, with missing trailing fields defaulting to
/// the empty string.
pub fn parse(content: &str) -> CsvResult<Table> {
    let mut lines = content.trim().lines();

    let header_line = lines.next().ok_or(CsvError::EmptyFile)?;
    let headers = parse_line(header_line);
    if headers.is_empty() {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let values = parse_line(line);
        let mut record = Record::new();
        for (i, header) in headers.iter().enumerate() {
            let value = values.get(i).cloned().unwrap_or_default();
            record.insert(header.clone(), value);
        }
        records.push(record);
    }

    Ok(Table { headers, records })
}

/// Parse CSV bytes, auto-detecting the encoding first.
pub fn parse_bytes(bytes: &[u8]) -> CsvResult<Table> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse(&content)
}

/// Read and parse a CSV file with encoding auto-detection.
pub fn parse_file<P: AsRef<Path>>(path: P) -> CsvResult<Table> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

/// Quote a field for output if it contains a comma or a double quote.
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Serialize a table back to CSV text.
///
/// Returns `None` when the table has no records: an empty dataset is a
/// skip signal for the writer, not an error.
pub fn serialize(table: &Table) -> Option<String> {
    if table.records.is_empty() {
        return None;
    }

    let mut out = String::new();
    out.push_str(
        &table
            .headers
            .iter()
            .map(|h| escape_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );

    for record in &table.records {
        out.push('\n');
        let row = table
            .headers
            .iter()
            .map(|header| {
                let value = record.get(header).map(String::as_str).unwrap_or("");
                escape_field(value)
            })
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&row);
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        parse(csv).unwrap()
    }

    #[test]
    fn test_simple_csv() {
        let t = table("name,age\nAlice,30\nBob,25");
        assert_eq!(t.len(), 2);
        assert_eq!(t.records[0]["name"], "Alice");
        assert_eq!(t.records[0]["age"], "30");
        assert_eq!(t.records[1]["name"], "Bob");
    }

    #[test]
    fn test_quoted_comma() {
        let t = table("name,notes\nWidget,\"small, blue\"");
        assert_eq!(t.records[0]["notes"], "small, blue");
    }

    #[test]
    fn test_missing_trailing_fields() {
        let t = table("a,b,c\n1,2");
        assert_eq!(t.records[0]["b"], "2");
        assert_eq!(t.records[0]["c"], "");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let t = table("a,b\n1,2\n\n3,4\n");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_values_trimmed() {
        let t = table("a,b\n 1 , 2 ");
        assert_eq!(t.records[0]["a"], "1");
        assert_eq!(t.records[0]["b"], "2");
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse(""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_serialize_quotes_commas_and_quotes() {
        let t = table("name,notes\nWidget,plain");
        let mut t = t;
        t.records[0].insert("notes".into(), "say \"hi\", twice".into());
        let out = serialize(&t).unwrap();
        assert_eq!(out, "name,notes\nWidget,\"say \"\"hi\"\", twice\"");
    }

    #[test]
    fn test_serialize_empty_is_none() {
        let t = table("a,b\n");
        assert!(serialize(&t).is_none());
    }

    #[test]
    fn test_round_trip() {
        let t = table("External_Id__c,Name,Notes\n1,Pump,\"big, loud\"\n2,Valve,");
        let out = serialize(&t).unwrap();
        let again = parse(&out).unwrap();
        assert_eq!(t, again);
    }

    #[test]
    fn test_parse_bytes_latin1() {
        // "Société,1" header row plus one record, in ISO-8859-1
        let mut bytes = vec![0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        bytes.extend_from_slice(b",id\nacme,1");
        let t = parse_bytes(&bytes).unwrap();
        assert_eq!(t.headers.len(), 2);
        assert_eq!(t.records[0]["id"], "1");
    }

    #[test]
    fn test_to_json_keeps_all_columns() {
        let t = table("a,b\n1,");
        let json = t.to_json();
        assert_eq!(json[0]["a"], "1");
        assert_eq!(json[0]["b"], "");
    }
}
