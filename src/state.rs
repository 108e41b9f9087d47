use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::data::aggregate::{
    self, BoxStats, HistogramBin, HourlyUsers, RfmSummary, WeatherPivot,
};
use crate::data::filter::{filtered_indices, DayType, FilterParams};
use crate::data::model::{Dataset, RecordView, RentalRecord};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    RentalPatterns,
    Rfm,
    WeatherSeasons,
    WeekdayWeekend,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tab::RentalPatterns => "Rental Patterns",
            Tab::Rfm => "RFM Analysis",
            Tab::WeatherSeasons => "Weather & Seasons",
            Tab::WeekdayWeekend => "Weekday vs Weekend",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Every aggregate the charts need, computed from one record view.
#[derive(Debug, Clone, Default)]
pub struct DashboardViews {
    pub row_count: usize,
    pub hourly_users: Vec<HourlyUsers>,
    pub recency_days: Vec<i64>,
    pub recency_histogram: Vec<HistogramBin>,
    pub frequency: BTreeMap<i64, usize>,
    pub monetary: BTreeMap<i64, u64>,
    pub rfm: Option<RfmSummary>,
    pub weather_boxes: BTreeMap<String, BoxStats>,
    pub season_boxes: BTreeMap<String, BoxStats>,
    pub weather_pivot: WeatherPivot,
    pub weekday_hourly: BTreeMap<u8, f64>,
    pub weekend_hourly: BTreeMap<u8, f64>,
}

impl DashboardViews {
    pub fn compute(view: &[&RentalRecord], recency_bins: usize) -> Self {
        let recency_days = aggregate::recency_days(view);
        let recency_f64: Vec<f64> = recency_days.iter().map(|&d| d as f64).collect();

        DashboardViews {
            row_count: view.len(),
            hourly_users: aggregate::hourly_user_profile(view),
            recency_histogram: aggregate::histogram(&recency_f64, recency_bins),
            recency_days,
            frequency: aggregate::frequency_by_weekday(view),
            monetary: aggregate::monetary_by_weekday(view),
            rfm: aggregate::rfm_summary(view),
            weather_boxes: aggregate::box_stats_by(view, |r| r.weather_label()),
            season_boxes: aggregate::box_stats_by(view, |r| r.season_label()),
            weather_pivot: aggregate::weather_pivot(view),
            weekday_hourly: aggregate::hourly_mean_by_day_type(view, DayType::Weekday),
            weekend_hourly: aggregate::hourly_mean_by_day_type(view, DayType::Weekend),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Shared immutable snapshot.
    pub dataset: Arc<Dataset>,

    /// Current filter selections.
    pub params: FilterParams,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates over the whole dataset; computed once.
    pub overview: DashboardViews,

    /// Aggregates over the filtered records; recomputed on every change.
    pub filtered: DashboardViews,

    pub active_tab: Tab,
    pub tabs: &'static [Tab],

    /// Whether overview tabs also follow the filters.
    pub filter_all_tabs: bool,

    recency_bins: usize,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, config: &DashboardConfig) -> Self {
        let params = FilterParams::select_all(&dataset);
        let overview = DashboardViews::compute(&dataset.view_all(), config.recency_bins);
        let tabs = config.variant.tabs();

        let mut state = AppState {
            params,
            visible_indices: Vec::new(),
            filtered: DashboardViews::default(),
            overview,
            active_tab: tabs.first().copied().unwrap_or(Tab::WeatherSeasons),
            tabs,
            filter_all_tabs: config.filter_all_tabs,
            recency_bins: config.recency_bins,
            dataset,
        };
        state.refilter();
        state
    }

    /// The currently visible records.
    pub fn visible(&self) -> RecordView<'_> {
        self.visible_indices
            .iter()
            .map(|&i| &self.dataset.records[i])
            .collect()
    }

    /// Views for a tab: the filtered one, or the whole-dataset overview for
    /// tabs that ignore filters.
    pub fn views_for(&self, tab: Tab) -> &DashboardViews {
        if tab == Tab::WeatherSeasons || self.filter_all_tabs {
            &self.filtered
        } else {
            &self.overview
        }
    }

    /// Recompute `visible_indices` and the filtered aggregates.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset.records, &self.params);
        self.filtered = {
            let view = self.visible();
            DashboardViews::compute(&view, self.recency_bins)
        };
        log::debug!(
            "filter {:?}..{:?} {} → {} of {} records",
            self.params.start,
            self.params.end,
            self.params.day_type,
            self.visible_indices.len(),
            self.dataset.len()
        );
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        if (start, end) != (self.params.start, self.params.end) {
            self.params.start = start;
            self.params.end = end;
            self.refilter();
        }
    }

    pub fn set_day_type(&mut self, day_type: DayType) {
        if day_type != self.params.day_type {
            self.params.day_type = day_type;
            self.refilter();
        }
    }

    pub fn toggle_season(&mut self, label: &str) {
        toggle(&mut self.params.seasons, label);
        self.refilter();
    }

    pub fn toggle_weather(&mut self, label: &str) {
        toggle(&mut self.params.weathers, label);
        self.refilter();
    }

    /// Replace the season selection wholesale.
    pub fn set_seasons(&mut self, labels: impl IntoIterator<Item = String>) {
        self.params.seasons = labels.into_iter().collect();
        self.refilter();
    }

    /// Replace the weather selection wholesale.
    pub fn set_weathers(&mut self, labels: impl IntoIterator<Item = String>) {
        self.params.weathers = labels.into_iter().collect();
        self.refilter();
    }

    pub fn select_all_seasons(&mut self) {
        self.params.seasons = self.dataset.season_options.iter().cloned().collect();
        self.refilter();
    }

    pub fn select_no_seasons(&mut self) {
        self.params.seasons.clear();
        self.refilter();
    }

    pub fn select_all_weathers(&mut self) {
        self.params.weathers = self.dataset.weather_options.iter().cloned().collect();
        self.refilter();
    }

    pub fn select_no_weathers(&mut self) {
        self.params.weathers.clear();
        self.refilter();
    }
}

fn toggle(selected: &mut BTreeSet<String>, label: &str) {
    if !selected.remove(label) {
        selected.insert(label.to_string());
    }
}
