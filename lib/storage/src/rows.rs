// Row store loading.
// Accepts either a JSON array of records or JSON Lines (one record per line).

use hotelrag_core::{Error, Record, Result, RowStore};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Load and validate the row store. Every failure is a startup error.
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<RowStore> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| {
        Error::Startup(format!("cannot read row store {}: {}", path.display(), e))
    })?;

    let records = parse_rows(&raw).map_err(|e| match e {
        Error::Startup(msg) => Error::Startup(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    let rows = RowStore::new(records)?;

    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parse records from file contents without validating positions.
pub fn parse_rows(raw: &str) -> Result<Vec<Record>> {
    if raw.trim_start().starts_with('[') {
        debug!("Parsing row store as JSON array");
        return serde_json::from_str(raw)
            .map_err(|e| Error::Startup(format!("malformed record array: {}", e)));
    }

    debug!("Parsing row store as JSON lines");
    let mut records = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(line).map_err(|e| {
            Error::Startup(format!("malformed record on line {}: {}", lineno + 1, e))
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LINES: &str = r#"{"id":0,"text":"Luxury beach resort","adr":250.0,"is_canceled":0,"lead_time":30}

{"id":1,"text":"Budget city hotel","adr":60.5,"is_canceled":1,"lead_time":2}
"#;

    #[test]
    fn test_parse_json_lines_skips_blank_lines() {
        let records = parse_rows(LINES).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text, "Budget city hotel");
        assert!(records[1].is_canceled);
    }

    #[test]
    fn test_parse_json_array() {
        let raw = r#"[{"id":0,"text":"Mountain lodge","adr":90,"is_canceled":false,"lead_time":7}]"#;
        let records = parse_rows(raw).unwrap();
        assert_eq!(records[0].adr, 90.0);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let raw = "{\"id\":0,\"text\":\"a\",\"adr\":1,\"is_canceled\":0,\"lead_time\":1}\n{not json}\n";
        let err = parse_rows(raw).unwrap_err();
        assert!(matches!(err, Error::Startup(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_rows_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LINES.as_bytes()).unwrap();
        let rows = load_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_missing_file_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rows(dir.path().join("missing.jsonl")).unwrap_err();
        assert!(matches!(err, Error::Startup(_)));
    }

    #[test]
    fn test_misordered_ids_rejected() {
        let raw = "{\"id\":1,\"text\":\"a\",\"adr\":1,\"is_canceled\":0,\"lead_time\":1}\n";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(raw.as_bytes()).unwrap();
        assert!(matches!(load_rows(file.path()), Err(Error::Startup(_))));
    }
}
