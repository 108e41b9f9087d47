// ---------------------------------------------------------------------------
// Category code → display label
// ---------------------------------------------------------------------------

const SEASONS: &[(i64, &str)] = &[
    (1, "Spring"),
    (2, "Summer"),
    (3, "Fall"),
    (4, "Winter"),
];

const WEATHER: &[(i64, &str)] = &[
    (1, "Clear"),
    (2, "Cloudy"),
    (3, "Light Rain"),
    (4, "Heavy Rain"),
];

/// Day-level weather table. Code 4 is absent: it has not been observed at day
/// granularity, so it renders as its raw code until data says otherwise.
const WEATHER_DAILY: &[(i64, &str)] = &[(1, "Clear"), (2, "Cloudy"), (3, "Light Rain")];

fn lookup(table: &[(i64, &str)], code: i64) -> String {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Season code (1–4) → label. Unknown codes pass through as their number.
pub fn season_label(code: i64) -> String {
    lookup(SEASONS, code)
}

/// Hour-level weather code (1–4) → label. Unknown codes pass through.
pub fn weather_label(code: i64) -> String {
    lookup(WEATHER, code)
}

/// Day-level weather code (1–3) → label. Unknown codes pass through.
pub fn weather_label_daily(code: i64) -> String {
    lookup(WEATHER_DAILY, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_season_codes() {
        assert_eq!(season_label(1), "Spring");
        assert_eq!(season_label(2), "Summer");
        assert_eq!(season_label(3), "Fall");
        assert_eq!(season_label(4), "Winter");
    }

    #[test]
    fn test_known_weather_codes() {
        assert_eq!(weather_label(1), "Clear");
        assert_eq!(weather_label(4), "Heavy Rain");
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        assert_eq!(season_label(0), "0");
        assert_eq!(season_label(-7), "-7");
        assert_eq!(weather_label(5), "5");
        assert_eq!(weather_label(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_daily_weather_has_no_heavy_rain() {
        assert_eq!(weather_label_daily(3), "Light Rain");
        assert_eq!(weather_label_daily(4), "4");
    }

    #[test]
    fn test_mapping_is_total() {
        for code in -50..50 {
            assert!(!season_label(code).is_empty());
            assert!(!weather_label(code).is_empty());
            assert!(!weather_label_daily(code).is_empty());
        }
    }
}
