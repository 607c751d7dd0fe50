use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – report and figure list
// ---------------------------------------------------------------------------

/// Render the left panel: one collapsible entry per report.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Reports");
    ui.separator();

    if state.reports.is_empty() {
        ui.label("No report loaded.");
        return;
    }

    let mut clicked = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (r, report) in state.reports.iter().enumerate() {
                egui::CollapsingHeader::new(RichText::new(&report.title).strong())
                    .id_salt(r)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        for line in &report.summary {
                            ui.label(RichText::new(line).monospace().small());
                        }
                        ui.add_space(4.0);
                        for (f, figure) in report.figures.iter().enumerate() {
                            let label = format!("{}. {}", f + 1, figure.y_label);
                            if ui
                                .selectable_label(state.selected == (r, f), label)
                                .on_hover_text(&figure.title)
                                .clicked()
                            {
                                clicked = Some((r, f));
                            }
                        }
                    });
            }

            ui.separator();
            ui.strong("Series");
            if let Some(figure) = state.selected_figure() {
                for series in &figure.series {
                    let color = state.color_map.color_for(&series.name);
                    ui.label(RichText::new(&series.name).color(color));
                }
            }
        });

    if let Some((r, f)) = clicked {
        state.select(r, f);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        if ui.button("◀").on_hover_text("Previous figure").clicked() {
            state.step(-1);
        }
        if ui.button("▶").on_hover_text("Next figure").clicked() {
            state.step(1);
        }

        ui.separator();

        if let Some(report) = state.reports.get(state.selected.0) {
            ui.label(format!(
                "{}: figure {} of {}",
                report.title,
                state.selected.1 + 1,
                report.figures.len()
            ));
        }

        ui.separator();

        if ui.selectable_label(state.show_legend, "Legend").clicked() {
            state.show_legend = !state.show_legend;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
