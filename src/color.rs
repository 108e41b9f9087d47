use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Dataset;

pub const CASUAL: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
pub const REGISTERED: Color32 = Color32::from_rgb(0xff, 0x7f, 0x0e);
pub const WEEKDAY: Color32 = REGISTERED;
pub const WEEKEND: Color32 = CASUAL;
pub const BAR: Color32 = CASUAL;

/// Weather categories, in code order.
pub const WEATHER_PALETTE: &[Color32] = &[
    Color32::from_rgb(0x1f, 0x3c, 0x88),
    Color32::from_rgb(0x72, 0xa2, 0xc0),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0xd6, 0x27, 0x28),
];

/// Four viridis stops for seasons.
pub const SEASON_PALETTE: &[Color32] = &[
    Color32::from_rgb(0x44, 0x01, 0x54),
    Color32::from_rgb(0x31, 0x68, 0x8e),
    Color32::from_rgb(0x35, 0xb7, 0x79),
    Color32::from_rgb(0xfd, 0xe7, 0x25),
];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Golden-angle hue step, in degrees.
const HUE_STEP: f32 = 137.507_76;

/// `n` extra category colours: hues step by the golden angle from magenta,
/// lightness alternates. A longer palette starts with the shorter one.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (300.0 + i as f32 * HUE_STEP) % 360.0;
            let lightness = if i % 2 == 0 { 0.45 } else { 0.62 };
            let rgb: Srgb = Hsl::new(hue, 0.7, lightness).into_color();
            let [r, g, b] = [rgb.red, rgb.green, rgb.blue]
                .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
            Color32::from_rgb(r, g, b)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels to colours: the fixed palette first, generated hues
/// for any labels beyond it (e.g. unmapped raw codes).
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(labels: &[String], fixed: &[Color32]) -> Self {
        let extra = generate_palette(labels.len().saturating_sub(fixed.len()));
        let mapping = labels
            .iter()
            .cloned()
            .zip(fixed.iter().copied().chain(extra))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

/// Colour maps for both category filters of a loaded dataset.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    pub seasons: ColorMap,
    pub weather: ColorMap,
}

impl CategoryColors {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        CategoryColors {
            seasons: ColorMap::new(&dataset.season_options, SEASON_PALETTE),
            weather: ColorMap::new(&dataset.weather_options, WEATHER_PALETTE),
        }
    }
}
