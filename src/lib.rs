//! Bike-rental dashboard: load the merged hourly/daily rental CSV once, filter
//! it by date, season, weather and day type, and aggregate the result for the
//! egui charts or a plain-text summary.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod report;
pub mod state;
pub mod ui;
