use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::model::{Dataset, RentalRecord};

// ---------------------------------------------------------------------------
// Row-level errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("row {row}: '{value}' is not a date (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: hour {hour} is outside 0-23")]
    HourOutOfRange { row: usize, hour: i64 },
    #[error("row {row}: {column} must not be negative (got {value})")]
    NegativeCount {
        row: usize,
        column: &'static str,
        value: i64,
    },
    #[error("row {row}: {column} must be 0 or 1 (got {value})")]
    InvalidWorkingDay {
        row: usize,
        column: &'static str,
        value: i64,
    },
    #[error("row {row}: {column} is required on hourly rows")]
    MissingValue { row: usize, column: &'static str },
}

// ---------------------------------------------------------------------------
// CSV layout
// ---------------------------------------------------------------------------

/// Columns read from the merged hour/day file. Other columns are ignored.
///
/// Numeric cells may be blank: day-level rows leave the hour side empty, and
/// hourly rows without a matching day leave the day side empty.
#[derive(Debug, Deserialize)]
struct CsvRow {
    dteday: String,
    #[serde(default, deserialize_with = "int_cell")]
    hr: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    season_hour: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    weathersit_hour: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    workingday_hour: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    season_day: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    weathersit_day: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    workingday_day: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    weekday_day: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    casual_hour: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    registered_hour: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    cnt_hour: Option<i64>,
    #[serde(default, deserialize_with = "int_cell")]
    cnt_day: Option<i64>,
}

/// Integer cell that may be blank or written as a whole float (`5.0`), the
/// way integer columns with gaps come out of a dataframe export.
fn int_cell<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = text.parse::<i64>() {
        return Ok(Some(value));
    }
    match text.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 => {
            Ok(Some(value as i64))
        }
        _ => Err(serde::de::Error::custom(format!(
            "'{text}' is not a whole number"
        ))),
    }
}

fn parse_date(s: &str, row: usize) -> Result<NaiveDate, RecordError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| RecordError::InvalidDate {
            row,
            value: s.to_string(),
        })
}

/// A blank count contributes nothing.
fn count(value: Option<i64>, column: &'static str, row: usize) -> Result<u64, RecordError> {
    match value {
        None => Ok(0),
        Some(value) => {
            u64::try_from(value).map_err(|_| RecordError::NegativeCount { row, column, value })
        }
    }
}

fn workingday(
    value: Option<i64>,
    column: &'static str,
    row: usize,
) -> Result<Option<i64>, RecordError> {
    match value {
        Some(value) if value != 0 && value != 1 => {
            Err(RecordError::InvalidWorkingDay { row, column, value })
        }
        other => Ok(other),
    }
}

impl CsvRow {
    fn into_record(self, row: usize) -> Result<RentalRecord, RecordError> {
        let date = parse_date(&self.dteday, row)?;
        let hour = match self.hr {
            None => None,
            Some(h) => Some(
                u8::try_from(h)
                    .ok()
                    .filter(|h| *h < 24)
                    .ok_or(RecordError::HourOutOfRange { row, hour: h })?,
            ),
        };

        // An hourly row must carry its hour-level columns; a day-level row
        // may leave them blank.
        if hour.is_some() {
            let hourly_columns = [
                ("season_hour", self.season_hour),
                ("weathersit_hour", self.weathersit_hour),
                ("workingday_hour", self.workingday_hour),
                ("casual_hour", self.casual_hour),
                ("registered_hour", self.registered_hour),
                ("cnt_hour", self.cnt_hour),
            ];
            if let Some((column, _)) = hourly_columns.into_iter().find(|(_, v)| v.is_none()) {
                return Err(RecordError::MissingValue { row, column });
            }
        }

        let mut record = RentalRecord::from_optional_codes(
            date,
            hour,
            self.season_hour,
            self.weathersit_hour,
            workingday(self.workingday_hour, "workingday_hour", row)?,
        )
        .with_counts(
            count(self.casual_hour, "casual_hour", row)?,
            count(self.registered_hour, "registered_hour", row)?,
            count(self.cnt_hour, "cnt_hour", row)?,
        )
        .with_day_codes(
            self.season_day,
            self.weathersit_day,
            workingday(self.workingday_day, "workingday_day", row)?,
        );

        let weekday = self.weekday_day.unwrap_or(record.weekday_code);
        record = record.with_day(weekday, count(self.cnt_day, "cnt_day", row)?);
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse the whole CSV file. Any bad row fails the load; there is no partial
/// result.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Row numbers are 1-based and exclude the header.
        let row = row_no + 1;
        let raw = result.with_context(|| format!("{}: CSV row {row}", path.display()))?;
        let record = raw
            .into_record(row)
            .with_context(|| format!("{}", path.display()))?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

/// Holds the first successfully loaded dataset, keyed by the path it came
/// from. Failed loads leave the handle empty so a later call can retry.
#[derive(Debug, Default)]
pub struct SnapshotHandle {
    cell: OnceLock<(PathBuf, Arc<Dataset>)>,
}

impl SnapshotHandle {
    pub const fn new() -> Self {
        SnapshotHandle {
            cell: OnceLock::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Return the cached snapshot, loading `path` on first use. Once loaded
    /// the file is never re-read, whatever path later calls name.
    pub fn load(&self, path: &Path) -> Result<Arc<Dataset>> {
        if let Some((cached_path, dataset)) = self.cell.get() {
            if cached_path != path {
                log::warn!(
                    "dataset already loaded from {}, ignoring {}",
                    cached_path.display(),
                    path.display()
                );
            } else {
                log::debug!("dataset cache hit for {}", path.display());
            }
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_csv(path)?);
        log::info!(
            "Loaded {} records from {} ({} seasons, {} weather types)",
            dataset.len(),
            path.display(),
            dataset.season_options.len(),
            dataset.weather_options.len()
        );

        // A concurrent first load may have won the race; keep whichever landed.
        let (_, stored) = self.cell.get_or_init(|| (path.to_path_buf(), dataset));
        Ok(Arc::clone(stored))
    }
}

/// Process-lifetime dataset snapshot.
static SNAPSHOT: SnapshotHandle = SnapshotHandle::new();

/// Load the dataset once and hand out the same immutable snapshot for the rest
/// of the process. Restart to pick up changes to the file.
pub fn load_once(path: &Path) -> Result<Arc<Dataset>> {
    SNAPSHOT.load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "instant,dteday,season_hour,hr,weathersit_hour,workingday_hour,\
casual_hour,registered_hour,cnt_hour,season_day,weathersit_day,workingday_day,weekday_day,cnt_day";

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_basic_rows() {
        let file = write_csv(&[
            "1,2011-01-01,1,0,1,0,3,13,16,1,2,0,6,985",
            "2,2011-01-01,1,1,2,0,8,32,40,1,2,0,6,985",
        ]);
        let ds = load_csv(file.path()).unwrap();
        assert_eq!(ds.len(), 2);

        let first = &ds.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        assert_eq!(first.hour, Some(0));
        assert_eq!(first.season_label(), Some("Spring"));
        assert_eq!(first.weather_label(), Some("Clear"));
        assert_eq!(first.casual_count, 3);
        assert_eq!(first.registered_count, 13);
        assert_eq!(first.total_count_hour, 16);
        assert_eq!(first.weekday_code, 6);
        assert_eq!(first.total_count_day, 985);
        assert_eq!(first.weather_code_day, Some(2));

        assert_eq!(ds.records[1].weather_label(), Some("Cloudy"));
        assert_eq!(ds.weather_options, vec!["Clear", "Cloudy"]);
    }

    #[test]
    fn test_load_accepts_datetime_and_missing_hour() {
        let file = write_csv(&["1,2011-01-03 00:00:00,1,,1,1,0,0,0,,,,,120"]);
        let ds = load_csv(file.path()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2011, 1, 3).unwrap());
        assert_eq!(rec.hour, None);
        // 2011-01-03 was a Monday; weekday falls back to the date.
        assert_eq!(rec.weekday_code, 1);
        assert_eq!(rec.weather_code_day, None);
    }

    #[test]
    fn test_unknown_codes_load_as_raw_labels() {
        let file = write_csv(&["1,2011-01-01,7,5,9,0,1,1,2,7,9,0,6,2"]);
        let ds = load_csv(file.path()).unwrap();
        assert_eq!(ds.records[0].season_label(), Some("7"));
        assert_eq!(ds.records[0].weather_label(), Some("9"));
    }

    #[test]
    fn test_day_level_row_with_blank_hour_side() {
        let file = write_csv(&[
            "1,2011-01-01,1,0,1,0,3,13,16,1,2,0,6,985",
            ",2011-01-02,,,,,,,,1,2,0,0,801",
        ]);
        let ds = load_csv(file.path()).unwrap();
        assert_eq!(ds.len(), 2);

        let day = &ds.records[1];
        assert_eq!(day.hour, None);
        assert_eq!(day.season_label(), None);
        assert_eq!(day.weather_label(), None);
        assert_eq!(day.workingday_flag, None);
        assert_eq!(day.total_count_hour, 0);
        assert_eq!(day.weekday_code, 0);
        assert_eq!(day.total_count_day, 801);
        assert_eq!(day.weather_label_day().as_deref(), Some("Cloudy"));

        // Options come from the hourly row only.
        assert_eq!(ds.season_options, vec!["Spring"]);
        assert_eq!(ds.weather_options, vec!["Clear"]);
    }

    #[test]
    fn test_day_level_file_without_instant_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "dteday,season_hour,hr,weathersit_hour,workingday_hour,casual_hour,\
registered_hour,cnt_hour,season_day,weathersit_day,workingday_day,weekday_day,cnt_day"
        )
        .unwrap();
        writeln!(file, "2011-01-02,,,,,,,,1,2,0,0,801").unwrap();
        file.flush().unwrap();

        let ds = load_csv(file.path()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].total_count_day, 801);
        assert!(ds.season_options.is_empty());
    }

    #[test]
    fn test_whole_floats_load_as_integers() {
        let file = write_csv(&["1.0,2011-01-01,1.0,5.0,2.0,1.0,3.0,13.0,16.0,1.0,2.0,1.0,6.0,985.0"]);
        let ds = load_csv(file.path()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.hour, Some(5));
        assert_eq!(rec.weather_label(), Some("Cloudy"));
        assert_eq!(rec.workingday_flag, Some(1));
        assert_eq!(rec.total_count_hour, 16);
        assert_eq!(rec.total_count_day, 985);
    }

    #[test]
    fn test_fractional_hour_fails() {
        let file = write_csv(&["1,2011-01-01,1,5.5,1,0,3,13,16,1,2,0,6,985"]);
        let err = load_csv(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("not a whole number"));
    }

    #[test]
    fn test_hourly_row_missing_hour_columns_fails() {
        let file = write_csv(&["1,2011-01-01,1,5,,0,3,13,16,1,2,0,6,985"]);
        let err = load_csv(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::MissingValue {
                row: 1,
                column: "weathersit_hour"
            })
        );
    }

    #[test]
    fn test_workingday_outside_flag_domain_fails() {
        let file = write_csv(&[
            "1,2011-01-01,1,0,1,0,3,13,16,1,2,0,6,985",
            "2,2011-01-01,1,1,1,2,3,13,16,1,2,0,6,985",
        ]);
        let err = load_csv(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecordError>(),
            Some(&RecordError::InvalidWorkingDay {
                row: 2,
                column: "workingday_hour",
                value: 2
            })
        );

        let file = write_csv(&["1,2011-01-01,1,0,1,0,3,13,16,1,2,-1,6,985"]);
        let err = load_csv(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecordError>(),
            Some(RecordError::InvalidWorkingDay {
                column: "workingday_day",
                value: -1,
                ..
            })
        ));
    }

    #[test]
    fn test_bad_date_fails() {
        let file = write_csv(&["1,01/01/2011,1,0,1,0,3,13,16,1,2,0,6,985"]);
        let err = load_csv(file.path()).unwrap_err();
        let root = err.downcast_ref::<RecordError>().unwrap();
        assert_eq!(
            *root,
            RecordError::InvalidDate {
                row: 1,
                value: "01/01/2011".to_string()
            }
        );
    }

    #[test]
    fn test_hour_out_of_range_fails() {
        let file = write_csv(&[
            "1,2011-01-01,1,0,1,0,3,13,16,1,2,0,6,985",
            "2,2011-01-01,1,24,1,0,3,13,16,1,2,0,6,985",
        ]);
        let err = load_csv(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecordError>(),
            Some(RecordError::HourOutOfRange { row: 2, hour: 24 })
        ));
    }

    #[test]
    fn test_malformed_number_fails() {
        let file = write_csv(&["1,2011-01-01,1,0,1,0,lots,13,16,1,2,0,6,985"]);
        assert!(load_csv(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("opening CSV"));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let handle = SnapshotHandle::new();
        let dir = tempfile::tempdir().unwrap();
        assert!(handle.load(&dir.path().join("missing.csv")).is_err());
        assert!(!handle.is_loaded());

        let file = write_csv(&["1,2011-01-01,1,0,1,0,3,13,16,1,2,0,6,985"]);
        let first = handle.load(file.path()).unwrap();
        assert!(handle.is_loaded());
        assert_eq!(first.len(), 1);

        let again = handle.load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_bad_rows_leave_handle_empty() {
        let handle = SnapshotHandle::new();
        let bad = write_csv(&["1,2011-01-01,1,0,1,0,-3,13,16,1,2,0,6,985"]);
        let err = handle.load(bad.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RecordError>(),
            Some(RecordError::NegativeCount {
                column: "casual_hour",
                ..
            })
        ));
        assert!(!handle.is_loaded());

        let good = write_csv(&["1,2011-01-01,1,0,1,0,3,13,16,1,2,0,6,985"]);
        assert_eq!(handle.load(good.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_load_once_returns_same_snapshot() {
        let file = write_csv(&["1,2011-01-01,1,0,1,0,3,13,16,1,2,0,6,985"]);
        let first = load_once(file.path()).unwrap();

        // Later calls never touch the file again, whatever path they name.
        let other = tempfile::tempdir().unwrap();
        let second = load_once(&other.path().join("missing.csv")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
