use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::color::{CategoryColors, ColorMap};
use crate::data::filter::DayType;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, colors: &CategoryColors) {
    ui.heading("Filter Data");
    ui.separator();

    // Hold our own handle so the option lists stay readable while state mutates.
    let dataset = Arc::clone(&state.dataset);
    if dataset.is_empty() {
        ui.label("Dataset is empty.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            let mut start = state.params.start;
            let mut end = state.params.end;
            ui.strong("Start Date");
            ui.add(DatePickerButton::new(&mut start).id_salt("start_date"));
            ui.strong("End Date");
            ui.add(DatePickerButton::new(&mut end).id_salt("end_date"));
            if start > end {
                ui.label(RichText::new("Start date is after end date").color(Color32::YELLOW));
            }
            state.set_date_range(start, end);
            ui.separator();

            // ---- Seasons ----
            let selected = state.params.seasons.clone();
            match label_checklist(
                ui,
                "Select Season",
                &dataset.season_options,
                &selected,
                &colors.seasons,
            ) {
                Some(ChecklistAction::All) => state.select_all_seasons(),
                Some(ChecklistAction::None) => state.select_no_seasons(),
                Some(ChecklistAction::Toggle(label)) => state.toggle_season(&label),
                None => {}
            }

            // ---- Weather ----
            let selected = state.params.weathers.clone();
            match label_checklist(
                ui,
                "Select Weather",
                &dataset.weather_options,
                &selected,
                &colors.weather,
            ) {
                Some(ChecklistAction::All) => state.select_all_weathers(),
                Some(ChecklistAction::None) => state.select_no_weathers(),
                Some(ChecklistAction::Toggle(label)) => state.toggle_weather(&label),
                None => {}
            }
            ui.separator();

            // ---- Day type ----
            ui.strong("Day Type");
            let mut day_type = state.params.day_type;
            for dt in DayType::ALL {
                ui.radio_value(&mut day_type, dt, dt.to_string());
            }
            state.set_day_type(day_type);
        });
}

enum ChecklistAction {
    All,
    None,
    Toggle(String),
}

/// Collapsible checklist of labels with All/None buttons. Returns the single
/// user action of this frame, if any.
fn label_checklist(
    ui: &mut Ui,
    title: &str,
    options: &[String],
    selected: &std::collections::BTreeSet<String>,
    colors: &ColorMap,
) -> Option<ChecklistAction> {
    let mut action = None;
    let header_text = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    action = Some(ChecklistAction::All);
                }
                if ui.small_button("None").clicked() {
                    action = Some(ChecklistAction::None);
                }
            });

            for label in options {
                let mut checked = selected.contains(label);
                let text = RichText::new(label).color(colors.color_for(label));
                if ui.checkbox(&mut checked, text).changed() {
                    action = Some(ChecklistAction::Toggle(label.clone()));
                }
            }
        });

    action
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title row: tab selector and record counts.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("Bike Rental Analysis Dashboard");
        ui.separator();

        for &tab in state.tabs {
            ui.selectable_value(&mut state.active_tab, tab, tab.to_string());
        }

        ui.separator();
        ui.label(format!(
            "{} records loaded, {} match the filters",
            state.dataset.len(),
            state.visible_indices.len()
        ));
    });
}
