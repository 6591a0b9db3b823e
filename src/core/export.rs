// LogGather - core/export.rs
//
// CSV and JSON export of a completed gathering, for tools that want the
// raw values rather than the org tables.
// Core layer: writes to any Write trait object.

use crate::core::model::Gathering;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export the gathering as long-form CSV: `source,datum,value`.
///
/// Returns the number of data records written (header excluded).
pub fn export_csv<W: Write>(
    gathering: &Gathering,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["source", "datum", "value"])
        .map_err(csv_err)?;

    let mut count = 0;
    for (source, datum_key, value) in gathering.iter_cells() {
        csv_writer
            .write_record([source, datum_key, value])
            .map_err(csv_err)?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export the gathering as a pretty JSON object: source -> datum -> value.
///
/// Returns the number of datums written.
pub fn export_json<W: Write>(
    gathering: &Gathering,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, gathering).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(gathering.datum_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::{parse_criteria_json, validate_and_compile};

    fn gathering() -> Gathering {
        let json = r#"{"criteria_per_log": {"uptime.log": {
            "uptime": {"pattern": "up (\\d+) days"},
            "users": {"pattern": "(\\d+) users"}
        }}}"#;
        let criteria =
            validate_and_compile(parse_criteria_json(json, Path::new("c.json")).unwrap()).unwrap();
        let mut g = Gathering::new();
        g.record("web", "uptime.log", &criteria, "up 12 days, 3 users");
        g.record("db", "uptime.log", &criteria, "up 40 days, 1 users");
        g.register_source("cache");
        g
    }

    #[test]
    fn test_csv_export() {
        let mut buf = Vec::new();
        let count = export_csv(&gathering(), &mut buf, Path::new("out.csv")).unwrap();
        assert_eq!(count, 4);

        let output = String::from_utf8(buf).unwrap();
        let rows: Vec<_> = output.lines().collect();
        assert_eq!(rows[0], "source,datum,value");
        assert_eq!(rows[1], "db,uptime,40");
        assert_eq!(rows[2], "db,users,1");
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_json_export() {
        let mut buf = Vec::new();
        let count = export_json(&gathering(), &mut buf, Path::new("out.json")).unwrap();
        assert_eq!(count, 4);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["web"]["uptime"], "12");
        assert_eq!(value["db"]["users"], "1");
        assert!(value["cache"].as_object().unwrap().is_empty());
    }
}
