use crate::data::aggregate::daily_weather_counts;
use crate::data::labels::weather_label;
use crate::state::AppState;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn weekday_name(code: i64) -> String {
    usize::try_from(code)
        .ok()
        .and_then(|i| WEEKDAYS.get(i))
        .map(|s| (*s).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Plain-text summary of the filtered view, for `--summary`.
pub fn render_summary(state: &AppState) -> String {
    let mut out = String::new();
    let p = &state.params;
    let views = &state.filtered;

    out.push_str("Bike rental summary\n");
    out.push_str(&format!(
        "  filter: {} .. {}, day type {}, seasons [{}], weather [{}]\n",
        p.start,
        p.end,
        p.day_type,
        join(p.seasons.iter()),
        join(p.weathers.iter())
    ));
    out.push_str(&format!(
        "  records: {} of {}\n",
        views.row_count,
        state.dataset.len()
    ));

    if views.is_empty() {
        out.push_str("\nNo data for the current filters.\n");
        return out;
    }

    if let Some(rfm) = views.rfm {
        out.push_str("\nRFM\n");
        out.push_str(&format!(
            "  average recency (days): {:.1}\n",
            rfm.mean_recency_days
        ));
        out.push_str(&format!("  average frequency:      {:.1}\n", rfm.mean_frequency));
        out.push_str(&format!("  average rental count:   {:.1}\n", rfm.mean_monetary));
    }

    out.push_str("\nBy weekday        rows      total\n");
    for (code, rows) in &views.frequency {
        let total = views.monetary.get(code).copied().unwrap_or(0);
        out.push_str(&format!(
            "  {:<12} {:>7} {:>10}\n",
            weekday_name(*code),
            rows,
            total
        ));
    }

    let daily = daily_weather_counts(&state.visible());
    if !daily.is_empty() {
        out.push_str("\nDays by weather\n");
        for (label, days) in &daily {
            out.push_str(&format!("  {label:<12} {days:>7}\n"));
        }
    }

    let pivot = &views.weather_pivot;
    if !pivot.is_empty() {
        out.push_str("\nMean rentals per hour\n  hour");
        for code in &pivot.weather_codes {
            out.push_str(&format!(" {:>12}", weather_label(*code)));
        }
        out.push('\n');
        for hour in pivot.rows.keys() {
            out.push_str(&format!("  {hour:>4}"));
            for code in &pivot.weather_codes {
                let cell = match pivot.get(*hour, *code) {
                    Some(mean) => format!("{mean:.1}"),
                    None => "-".to_string(),
                };
                out.push_str(&format!(" {cell:>12}"));
            }
            out.push('\n');
        }
    }

    out
}

fn join<'a>(labels: impl Iterator<Item = &'a String>) -> String {
    labels.map(String::as_str).collect::<Vec<_>>().join(", ")
}
