//! egui presentation layer. Reads [`crate::state::AppState`] and calls its
//! setters; never filters or aggregates on its own.

pub mod panels;
pub mod plot;
