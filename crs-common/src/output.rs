//! Atomic file output and processed-table reading
//!
//! Every output is written to a temporary file in the destination directory
//! and then renamed over the target, so readers never see a truncated file
//! and a failed write leaves the previous snapshot in place.

use crate::{Error, Result};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// One CSV row keyed by header name
pub type Row = BTreeMap<String, String>;

/// Write through a temp file in the target's directory, then rename
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;

    temp_file.persist(path).map_err(|e| Error::Io(e.error))?;
    debug!(path = %path.display(), "Replaced output atomically");
    Ok(())
}

/// Atomically replace `path` with `content`
pub fn write_string_atomic(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, |w| {
        w.write_all(content.as_bytes())?;
        Ok(())
    })
}

/// Atomically replace `path` with a CSV table
pub fn write_csv_atomic<I>(path: &Path, header: &[String], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    write_atomic(path, |w| {
        let mut writer = csv::Writer::from_writer(w);
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// Read a headed CSV file into rows keyed by column name
///
/// A missing file is [`Error::MissingInput`].
pub fn read_csv_rows(path: &Path) -> Result<Vec<Row>> {
    if !path.is_file() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parent_and_no_leftovers() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested").join("out.txt");

        write_string_atomic(&target, "hello").unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
        let entries: Vec<_> = std::fs::read_dir(target.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp file should be renamed away");
    }

    #[test]
    fn test_failed_write_keeps_previous_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out.txt");
        write_string_atomic(&target, "previous").unwrap();

        let result = write_atomic(&target, |w| {
            w.write_all(b"partial")?;
            Err(Error::InvalidInput("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous");
    }

    #[test]
    fn test_csv_round_trip_with_quoting() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("table.csv");
        let header = vec!["title".to_string(), "keyword_frequencies".to_string()];
        let rows = vec![vec![
            "Data, Society".to_string(),
            r#"{"data":2}"#.to_string(),
        ]];

        write_csv_atomic(&target, &header, rows).unwrap();
        let read = read_csv_rows(&target).unwrap();

        assert_eq!(read.len(), 1);
        assert_eq!(read[0]["title"], "Data, Society");
        assert_eq!(read[0]["keyword_frequencies"], r#"{"data":2}"#);
    }

    #[test]
    fn test_read_missing_csv() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            read_csv_rows(&temp.path().join("absent.csv")),
            Err(Error::MissingInput(_))
        ));
    }
}
