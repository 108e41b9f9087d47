use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::labels::{season_label, weather_label, weather_label_daily};

// ---------------------------------------------------------------------------
// RentalRecord – one row of the merged hour/day dataset
// ---------------------------------------------------------------------------

/// One hourly (or day-level, when `hour` is `None`) rental observation.
///
/// Season and weather codes are private so their display labels, computed
/// once at construction, can never drift from them. Day-level rows may lack
/// the hour-level codes; such a row has no label and no working-day flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalRecord {
    pub date: NaiveDate,
    pub hour: Option<u8>,
    season_code: Option<i64>,
    weather_code: Option<i64>,
    season_label: Option<String>,
    weather_label: Option<String>,
    /// 1 = working day, 0 = weekend or holiday.
    pub workingday_flag: Option<i64>,
    pub season_code_day: Option<i64>,
    pub weather_code_day: Option<i64>,
    pub workingday_flag_day: Option<i64>,
    /// 0–6, day-level grouping key.
    pub weekday_code: i64,
    pub casual_count: u64,
    pub registered_count: u64,
    pub total_count_hour: u64,
    pub total_count_day: u64,
}

impl RentalRecord {
    /// Build a record from its hour-level category codes. Counts start at zero.
    pub fn new(
        date: NaiveDate,
        hour: Option<u8>,
        season_code: i64,
        weather_code: i64,
        workingday_flag: i64,
    ) -> Self {
        Self::from_optional_codes(
            date,
            hour,
            Some(season_code),
            Some(weather_code),
            Some(workingday_flag),
        )
    }

    /// Like [`RentalRecord::new`], for rows whose hour-level codes may be blank.
    pub fn from_optional_codes(
        date: NaiveDate,
        hour: Option<u8>,
        season_code: Option<i64>,
        weather_code: Option<i64>,
        workingday_flag: Option<i64>,
    ) -> Self {
        RentalRecord {
            date,
            hour,
            season_code,
            weather_code,
            season_label: season_code.map(season_label),
            weather_label: weather_code.map(weather_label),
            workingday_flag,
            season_code_day: None,
            weather_code_day: None,
            workingday_flag_day: None,
            weekday_code: i64::from(date.weekday().num_days_from_sunday()),
            casual_count: 0,
            registered_count: 0,
            total_count_hour: 0,
            total_count_day: 0,
        }
    }

    /// Set the hour-level user counts.
    pub fn with_counts(mut self, casual: u64, registered: u64, total: u64) -> Self {
        self.casual_count = casual;
        self.registered_count = registered;
        self.total_count_hour = total;
        self
    }

    /// Set the day-level weekday key and daily total.
    pub fn with_day(mut self, weekday_code: i64, total_count_day: u64) -> Self {
        self.weekday_code = weekday_code;
        self.total_count_day = total_count_day;
        self
    }

    /// Set the day-level category codes.
    pub fn with_day_codes(
        mut self,
        season: Option<i64>,
        weather: Option<i64>,
        workingday: Option<i64>,
    ) -> Self {
        self.season_code_day = season;
        self.weather_code_day = weather;
        self.workingday_flag_day = workingday;
        self
    }

    pub fn season_code(&self) -> Option<i64> {
        self.season_code
    }

    pub fn weather_code(&self) -> Option<i64> {
        self.weather_code
    }

    pub fn season_label(&self) -> Option<&str> {
        self.season_label.as_deref()
    }

    pub fn weather_label(&self) -> Option<&str> {
        self.weather_label.as_deref()
    }

    /// Day-level weather label, if the row carries a day-level code.
    pub fn weather_label_day(&self) -> Option<String> {
        self.weather_code_day.map(weather_label_daily)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the immutable loaded snapshot
// ---------------------------------------------------------------------------

/// A borrowed, read-only selection of records.
pub type RecordView<'a> = Vec<&'a RentalRecord>;

/// The full parsed dataset with pre-computed filter options.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records, in file order.
    pub records: Vec<RentalRecord>,
    /// Season labels present, ordered by code.
    pub season_options: Vec<String>,
    /// Weather labels present, ordered by code.
    pub weather_options: Vec<String>,
    /// Earliest and latest record date.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    /// Build option lists and date bounds from the loaded records.
    pub fn from_records(records: Vec<RentalRecord>) -> Self {
        let mut seasons: BTreeMap<i64, String> = BTreeMap::new();
        let mut weathers: BTreeMap<i64, String> = BTreeMap::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            if let (Some(code), Some(label)) = (rec.season_code, &rec.season_label) {
                seasons.entry(code).or_insert_with(|| label.clone());
            }
            if let (Some(code), Some(label)) = (rec.weather_code, &rec.weather_label) {
                weathers.entry(code).or_insert_with(|| label.clone());
            }
            date_bounds = Some(match date_bounds {
                None => (rec.date, rec.date),
                Some((lo, hi)) => (lo.min(rec.date), hi.max(rec.date)),
            });
        }

        Dataset {
            records,
            season_options: seasons.into_values().collect(),
            weather_options: weathers.into_values().collect(),
            date_bounds,
        }
    }

    /// Requested season labels that no record carries.
    pub fn unknown_seasons<'a>(&self, requested: &'a [String]) -> Vec<&'a str> {
        unknown_labels(&self.season_options, requested)
    }

    /// Requested weather labels that no record carries.
    pub fn unknown_weathers<'a>(&self, requested: &'a [String]) -> Vec<&'a str> {
        unknown_labels(&self.weather_options, requested)
    }

    /// Every record, as a view.
    pub fn view_all(&self) -> RecordView<'_> {
        self.records.iter().collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn unknown_labels<'a>(options: &[String], requested: &'a [String]) -> Vec<&'a str> {
    requested
        .iter()
        .filter(|label| !options.contains(*label))
        .map(String::as_str)
        .collect()
}
