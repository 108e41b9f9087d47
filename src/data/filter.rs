use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use super::model::{Dataset, RecordView, RentalRecord};

// ---------------------------------------------------------------------------
// Filter parameters: what the side panel currently selects
// ---------------------------------------------------------------------------

/// Working-day restriction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayType {
    #[default]
    All,
    Weekday,
    Weekend,
}

impl DayType {
    pub const ALL: [DayType; 3] = [DayType::All, DayType::Weekday, DayType::Weekend];

    /// Whether a record with this working-day flag passes. A record without
    /// a flag is neither a weekday nor a weekend.
    pub fn matches(self, workingday_flag: Option<i64>) -> bool {
        match self {
            DayType::All => true,
            DayType::Weekday => workingday_flag == Some(1),
            DayType::Weekend => workingday_flag == Some(0),
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayType::All => write!(f, "All"),
            DayType::Weekday => write!(f, "Weekday"),
            DayType::Weekend => write!(f, "Weekend"),
        }
    }
}

/// All filter inputs, passed explicitly into [`filter`].
///
/// An empty label set selects nothing; it is never read as "everything".
/// Records without a season or weather label never match a label set.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub seasons: BTreeSet<String>,
    pub weathers: BTreeSet<String>,
    pub day_type: DayType,
}

impl FilterParams {
    /// Everything selected: full date range, every label, all days.
    pub fn select_all(dataset: &Dataset) -> Self {
        let (start, end) = dataset
            .date_bounds
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        FilterParams {
            start,
            end,
            seasons: dataset.season_options.iter().cloned().collect(),
            weathers: dataset.weather_options.iter().cloned().collect(),
            day_type: DayType::All,
        }
    }

    /// Whether one record satisfies every predicate.
    pub fn accepts(&self, record: &RentalRecord) -> bool {
        self.start <= record.date
            && record.date <= self.end
            && record
                .weather_label()
                .is_some_and(|label| self.weathers.contains(label))
            && record
                .season_label()
                .is_some_and(|label| self.seasons.contains(label))
            && self.day_type.matches(record.workingday_flag)
    }
}

/// Records passing all predicates, in input order.
pub fn filter<'a>(records: &'a [RentalRecord], params: &FilterParams) -> RecordView<'a> {
    records.iter().filter(|r| params.accepts(r)).collect()
}

/// Indices of the records passing all predicates.
pub fn filtered_indices(records: &[RentalRecord], params: &FilterParams) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| params.accepts(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            RentalRecord::new(date(2011, 1, 1), Some(0), 1, 1, 0),
            RentalRecord::new(date(2011, 1, 3), Some(8), 1, 2, 1),
            RentalRecord::new(date(2011, 4, 4), Some(17), 2, 1, 1),
            RentalRecord::new(date(2011, 7, 9), Some(12), 3, 3, 0),
            RentalRecord::new(date(2011, 12, 24), Some(9), 4, 4, 0),
            RentalRecord::new(date(2011, 12, 26), Some(9), 4, 1, 1),
        ])
    }

    #[test]
    fn test_select_all_is_identity() {
        let ds = sample();
        let params = FilterParams::select_all(&ds);
        let view = filter(&ds.records, &params);
        assert_eq!(view, ds.view_all());
        assert_eq!(filtered_indices(&ds.records, &params), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_weekday_weekend_partition_all() {
        let ds = sample();
        let mut params = FilterParams::select_all(&ds);
        params.start = date(2011, 1, 2);
        let all = filtered_indices(&ds.records, &params);

        params.day_type = DayType::Weekday;
        let weekday = filtered_indices(&ds.records, &params);
        params.day_type = DayType::Weekend;
        let weekend = filtered_indices(&ds.records, &params);

        let weekday_set: BTreeSet<usize> = weekday.iter().copied().collect();
        assert!(weekend.iter().all(|i| !weekday_set.contains(i)));

        let mut union: Vec<usize> = weekday.into_iter().chain(weekend).collect();
        union.sort_unstable();
        assert_eq!(union, all);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let ds = sample();
        let mut params = FilterParams::select_all(&ds);
        params.start = date(2011, 1, 3);
        params.end = date(2011, 7, 9);
        assert_eq!(filtered_indices(&ds.records, &params), vec![1, 2, 3]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let ds = sample();
        let mut params = FilterParams::select_all(&ds);
        params.start = date(2011, 12, 31);
        params.end = date(2011, 1, 1);
        assert!(filter(&ds.records, &params).is_empty());
    }

    #[test]
    fn test_empty_label_sets_select_nothing() {
        let ds = sample();
        let mut params = FilterParams::select_all(&ds);
        params.seasons.clear();
        assert!(filter(&ds.records, &params).is_empty());

        let mut params = FilterParams::select_all(&ds);
        params.weathers.clear();
        assert!(filter(&ds.records, &params).is_empty());
    }

    #[test]
    fn test_predicates_are_anded() {
        let ds = sample();
        let mut params = FilterParams::select_all(&ds);
        params.seasons = ["Winter".to_string()].into();
        params.weathers = ["Clear".to_string()].into();
        params.day_type = DayType::Weekday;
        assert_eq!(filtered_indices(&ds.records, &params), vec![5]);

        params.day_type = DayType::Weekend;
        assert!(filtered_indices(&ds.records, &params).is_empty());
    }

    #[test]
    fn test_unmapped_label_is_selectable() {
        let ds = Dataset::from_records(vec![
            RentalRecord::new(date(2011, 1, 1), Some(0), 1, 7, 1),
            RentalRecord::new(date(2011, 1, 1), Some(1), 1, 1, 1),
        ]);
        assert_eq!(ds.weather_options, vec!["Clear", "7"]);
        let mut params = FilterParams::select_all(&ds);
        params.weathers = ["7".to_string()].into();
        assert_eq!(filtered_indices(&ds.records, &params), vec![0]);
    }

    #[test]
    fn test_filter_leaves_input_untouched() {
        let ds = sample();
        let before = ds.records.clone();
        let mut params = FilterParams::select_all(&ds);
        params.day_type = DayType::Weekend;
        let _ = filter(&ds.records, &params);
        assert_eq!(ds.records, before);
    }

    #[test]
    fn test_rows_without_hour_codes_only_pass_day_type_all() {
        let mut records = sample().records;
        records.push(RentalRecord::from_optional_codes(
            date(2011, 6, 1),
            None,
            None,
            None,
            None,
        ));
        let ds = Dataset::from_records(records);

        // No label: excluded even when every label is selected.
        let params = FilterParams::select_all(&ds);
        assert_eq!(filtered_indices(&ds.records, &params), vec![0, 1, 2, 3, 4, 5]);

        assert!(DayType::All.matches(None));
        assert!(!DayType::Weekday.matches(None));
        assert!(!DayType::Weekend.matches(None));
    }

    #[test]
    fn test_day_type_display() {
        let names: Vec<String> = DayType::ALL.iter().map(|d| d.to_string()).collect();
        assert_eq!(names, vec!["All", "Weekday", "Weekend"]);
    }
}
