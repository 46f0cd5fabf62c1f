use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::model::InjuryCategory;
use crate::data::query::MAX_INJURY_THRESHOLD;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let mut changed = false;

    // ---- Injured-persons threshold ----
    ui.strong("Injured persons");
    changed |= ui
        .add(
            egui::Slider::new(&mut state.min_injured, 0..=MAX_INJURY_THRESHOLD)
                .text("minimum injured"),
        )
        .changed();
    ui.add_space(8.0);

    // ---- Hour of day ----
    ui.strong("Time of day");
    changed |= ui
        .add(egui::Slider::new(&mut state.hour, 0..=23).text("hour to look at"))
        .changed();
    ui.label(format!(
        "Collisions between {}:00 and {}:00",
        state.hour,
        (state.hour + 1) % 24
    ));
    ui.add_space(8.0);

    // ---- Affected class ----
    ui.strong("Affected class");
    egui::ComboBox::from_id_salt("affected_class")
        .selected_text(state.category.label())
        .show_ui(ui, |ui: &mut Ui| {
            for cat in InjuryCategory::ALL {
                if ui
                    .selectable_label(state.category == cat, cat.label())
                    .clicked()
                {
                    state.category = cat;
                }
            }
        });
    ui.add_space(8.0);

    ui.separator();
    ui.checkbox(&mut state.show_raw, "Show raw data");

    if changed {
        state.refilter();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top summary bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Motor Vehicle Collisions in New York City");
        ui.separator();
        ui.label(format!("{} collisions loaded", state.table.len()));
        ui.separator();
        ui.label(format!(
            "{} above injury threshold, {} in hour {}",
            state.injured_view.len(),
            state.hour_view.len(),
            state.hour
        ));
        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
