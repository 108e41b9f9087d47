//! Writes a synthetic `all_data.csv` in the merged hour/day layout the
//! dashboard reads: two years of hourly rows, each carrying its day's totals.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use clap::Parser;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(about = "Generate a synthetic bike-rental CSV")]
struct Args {
    /// Output file
    #[arg(long, default_value = "all_data.csv")]
    out: PathBuf,

    /// Number of days to generate, starting 2011-01-01
    #[arg(long, default_value_t = 731)]
    days: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Serialize)]
struct Row {
    instant: usize,
    dteday: String,
    season_hour: u8,
    hr: u8,
    weathersit_hour: u8,
    workingday_hour: u8,
    casual_hour: u64,
    registered_hour: u64,
    cnt_hour: u64,
    season_day: u8,
    weathersit_day: u8,
    workingday_day: u8,
    weekday_day: u32,
    cnt_day: u64,
}

/// SplitMix64: small, seedable and reproducible across platforms.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * f64::EPSILON / 2.0
    }
}

/// Meteorological season: 1 spring … 4 winter.
fn season_of(date: NaiveDate) -> u8 {
    match date.month() {
        3..=5 => 1,
        6..=8 => 2,
        9..=11 => 3,
        _ => 4,
    }
}

/// Day-level weather is 1–3; hours occasionally worsen to heavy rain.
fn day_weather(rng: &mut SplitMix64) -> u8 {
    match rng.unit() {
        p if p < 0.63 => 1,
        p if p < 0.92 => 2,
        _ => 3,
    }
}

/// Relative demand by hour: commuter peaks on working days, a midday hump otherwise.
fn hour_shape(hour: u8, working: bool) -> f64 {
    let h = f64::from(hour);
    let bump = |mu: f64, sigma: f64| (-(h - mu).powi(2) / (2.0 * sigma * sigma)).exp();
    if working {
        0.05 + bump(8.0, 1.2) + 0.9 * bump(17.5, 1.5) + 0.3 * bump(12.5, 2.0)
    } else {
        0.05 + 0.8 * bump(14.0, 3.5)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SplitMix64(args.seed);

    let first_day = NaiveDate::from_ymd_opt(2011, 1, 1).context("invalid start date")?;
    let mut writer = csv::Writer::from_path(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut instant = 0;
    for offset in 0..args.days {
        let date = first_day + Duration::days(i64::from(offset));
        let weekday = date.weekday().num_days_from_sunday();
        let working = (1..=5).contains(&weekday) && rng.unit() > 0.03;
        let season = season_of(date);
        let weather = day_weather(&mut rng);
        let season_factor = [0.0, 0.7, 1.2, 1.1, 0.5][usize::from(season)];
        let growth = 1.0 + f64::from(offset) / 730.0;

        let mut hours = Vec::with_capacity(24);
        for hr in 0..24u8 {
            let hour_weather = if weather == 3 && rng.unit() < 0.05 {
                4
            } else {
                weather
            };
            let weather_factor = [0.0, 1.0, 0.8, 0.4, 0.15][usize::from(hour_weather)];
            let base = 400.0 * hour_shape(hr, working) * season_factor * weather_factor * growth;
            let noise = 0.8 + 0.4 * rng.unit();
            let total = (base * noise).round() as u64;
            let casual_share = if working { 0.12 } else { 0.35 };
            let casual = (total as f64 * casual_share * (0.8 + 0.4 * rng.unit())).round() as u64;
            let casual = casual.min(total);
            hours.push((hr, hour_weather, casual, total - casual, total));
        }
        let cnt_day: u64 = hours.iter().map(|h| h.4).sum();

        for (hr, hour_weather, casual, registered, total) in hours {
            instant += 1;
            writer.serialize(Row {
                instant,
                dteday: date.format("%Y-%m-%d").to_string(),
                season_hour: season,
                hr,
                weathersit_hour: hour_weather,
                workingday_hour: u8::from(working),
                casual_hour: casual,
                registered_hour: registered,
                cnt_hour: total,
                season_day: season,
                weathersit_day: weather,
                workingday_day: u8::from(working),
                weekday_day: weekday,
                cnt_day,
            })?;
        }
    }

    writer.flush().context("flushing CSV")?;
    log::info!("Wrote {instant} rows to {}", args.out.display());
    println!("Wrote {instant} rows to {}", args.out.display());
    Ok(())
}
