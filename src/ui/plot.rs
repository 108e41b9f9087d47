use std::collections::BTreeMap;

use eframe::egui::{Color32, ScrollArea, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, MarkerShape, Plot, PlotPoints, PlotUi,
    Points,
};

use crate::color::{self, CategoryColors, ColorMap};
use crate::data::aggregate::BoxStats;
use crate::data::labels::weather_label;
use crate::report::weekday_name;
use crate::state::{AppState, DashboardViews, Tab};

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active tab.
pub fn dashboard(ui: &mut Ui, state: &AppState, colors: &CategoryColors) {
    let tab = state.active_tab;
    let views = state.views_for(tab);

    ui.heading(tab.to_string());
    ui.separator();

    if views.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data for the current filters");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match tab {
            Tab::RentalPatterns => rental_patterns(ui, views),
            Tab::Rfm => rfm(ui, views),
            Tab::WeatherSeasons => weather_seasons(ui, state, views, colors),
            Tab::WeekdayWeekend => weekday_weekend(ui, views),
        });
}

/// Hour-of-day line plot with the shared axes and legend.
fn hourly_plot(ui: &mut Ui, id: &str, add_contents: impl FnOnce(&mut PlotUi)) {
    Plot::new(id.to_string())
        .legend(Legend::default())
        .x_axis_label("Hour of the Day")
        .y_axis_label("Mean Number of Rentals")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .show(ui, add_contents);
}

/// A line with circle markers, the way every hourly series is drawn.
fn marked_line(plot_ui: &mut PlotUi, name: &str, points: &[[f64; 2]], color: Color32) {
    let line: PlotPoints = points.iter().copied().collect();
    let markers: PlotPoints = points.iter().copied().collect();
    plot_ui.line(Line::new(line).name(name).color(color).width(2.0));
    plot_ui.points(
        Points::new(markers)
            .name(name)
            .color(color)
            .radius(3.0)
            .shape(MarkerShape::Circle),
    );
}

fn series(map: &BTreeMap<u8, f64>) -> Vec<[f64; 2]> {
    map.iter().map(|(&h, &v)| [f64::from(h), v]).collect()
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

fn rental_patterns(ui: &mut Ui, views: &DashboardViews) {
    ui.strong("Bike Rental Patterns by Hour (Casual vs Registered Users)");
    let casual: Vec<[f64; 2]> = views
        .hourly_users
        .iter()
        .map(|h| [f64::from(h.hour), h.casual])
        .collect();
    let registered: Vec<[f64; 2]> = views
        .hourly_users
        .iter()
        .map(|h| [f64::from(h.hour), h.registered])
        .collect();

    hourly_plot(ui, "rental_patterns", |plot_ui| {
        marked_line(plot_ui, "Casual Users", &casual, color::CASUAL);
        marked_line(plot_ui, "Registered Users", &registered, color::REGISTERED);
    });
}

fn rfm(ui: &mut Ui, views: &DashboardViews) {
    ui.strong("Customer Behavior Based on RFM Metrics");
    if let Some(summary) = views.rfm {
        ui.columns(3, |cols: &mut [Ui]| {
            metric(&mut cols[0], "Average Recency (Days)", summary.mean_recency_days);
            metric(&mut cols[1], "Average Frequency", summary.mean_frequency);
            metric(&mut cols[2], "Average Rental Count", summary.mean_monetary);
        });
    }
    ui.separator();

    let recency_bars: Vec<Bar> = views
        .recency_histogram
        .iter()
        .map(|b| Bar::new((b.start + b.end) / 2.0, b.count as f64).width(b.end - b.start))
        .collect();
    let frequency_bars: Vec<Bar> = views
        .frequency
        .iter()
        .map(|(&day, &n)| Bar::new(day as f64, n as f64).name(weekday_name(day)))
        .collect();
    let monetary_bars: Vec<Bar> = views
        .monetary
        .iter()
        .map(|(&day, &total)| Bar::new(day as f64, total as f64).name(weekday_name(day)))
        .collect();

    ui.columns(3, |cols: &mut [Ui]| {
        bar_plot(
            &mut cols[0],
            "recency_hist",
            "Days Since Last Rental",
            "Records",
            recency_bars,
        );
        bar_plot(
            &mut cols[1],
            "frequency_by_weekday",
            "Day of Week (0 = Sun)",
            "Records",
            frequency_bars,
        );
        bar_plot(
            &mut cols[2],
            "monetary_by_weekday",
            "Day of Week (0 = Sun)",
            "Total Rentals",
            monetary_bars,
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: f64) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.heading(format!("{value:.1}"));
    });
}

fn bar_plot(ui: &mut Ui, id: &str, x_label: &str, y_label: &str, bars: Vec<Bar>) {
    Plot::new(id.to_string())
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .height(PLOT_HEIGHT * 0.8)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color::BAR));
        });
}

fn weather_seasons(ui: &mut Ui, state: &AppState, views: &DashboardViews, colors: &CategoryColors) {
    ui.strong("Impact of Weather and Season on Rentals (daily totals)");
    box_plot(
        ui,
        "weather_boxes",
        "Weather Condition",
        &state.dataset.weather_options,
        &views.weather_boxes,
        &colors.weather,
    );
    box_plot(
        ui,
        "season_boxes",
        "Season",
        &state.dataset.season_options,
        &views.season_boxes,
        &colors.seasons,
    );

    ui.strong("Mean Rentals per Hour by Weather");
    let pivot = &views.weather_pivot;
    hourly_plot(ui, "weather_pivot", |plot_ui| {
        for &code in &pivot.weather_codes {
            let label = weather_label(code);
            // Hours without this weather are skipped, not drawn as zero.
            let points: Vec<[f64; 2]> = pivot
                .rows
                .keys()
                .filter_map(|&h| pivot.get(h, code).map(|v| [f64::from(h), v]))
                .collect();
            marked_line(plot_ui, &label, &points, colors.weather.color_for(&label));
        }
    });
}

/// One box per label, in `order`; labels absent from `stats` are skipped.
fn box_plot(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    order: &[String],
    stats: &BTreeMap<String, BoxStats>,
    colors: &ColorMap,
) {
    Plot::new(id.to_string())
        .legend(Legend::default())
        .x_axis_label(x_label.to_string())
        .y_axis_label("Number of Rentals")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (x, label) in order.iter().enumerate() {
                let Some(s) = stats.get(label) else { continue };
                let color = colors.color_for(label);
                let spread =
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker);
                let elem = BoxElem::new(x as f64, spread)
                    .name(label)
                    .box_width(0.6)
                    .fill(color.gamma_multiply(0.5))
                    .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label));
            }
        });
}

fn weekday_weekend(ui: &mut Ui, views: &DashboardViews) {
    ui.strong("Comparison of Bike Rentals: Weekdays vs Weekends");
    let weekday = series(&views.weekday_hourly);
    let weekend = series(&views.weekend_hourly);
    hourly_plot(ui, "weekday_weekend", |plot_ui| {
        marked_line(plot_ui, "Weekday", &weekday, color::WEEKDAY);
        marked_line(plot_ui, "Weekend", &weekend, color::WEEKEND);
    });
}
