use eframe::egui::{Color32, Ui};
use egui_plot::{AxisHints, HPlacement, Line, MarkerShape, Plot, PlotPoints, Points, Polygon};

use battery_windows::report::{Axis, Figure, Style};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Figure plot (central panel)
// ---------------------------------------------------------------------------

/// Render the selected figure in the central panel.
pub fn figure_plot(ui: &mut Ui, state: &AppState) {
    let figure = match state.selected_figure() {
        Some(fig) => fig,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Nothing to plot");
            });
            return;
        }
    };

    ui.heading(&figure.title);

    let mut plot = Plot::new(("figure_plot", state.selected))
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if state.show_legend {
        plot = plot.legend(egui_plot::Legend::default());
    }

    // Right-axis series are drawn in left-axis coordinates; the right axis
    // labels them with their own values.
    let right = figure.right_axis_map();
    if let (Some(map), Some(label)) = (right, figure.y2_label.as_deref()) {
        plot = plot.custom_y_axes(vec![
            AxisHints::new_y().label(figure.y_label.as_str()),
            AxisHints::new_y()
                .label(label)
                .placement(HPlacement::Right)
                .formatter(move |mark, _range| format!("{:.3}", map.invert(mark.value))),
        ]);
    }

    plot.show(ui, |plot_ui| {
        if let Some(corners) = span_corners(figure) {
            plot_ui.polygon(
                Polygon::new(PlotPoints::new(corners))
                    .name("window")
                    .fill_color(Color32::from_gray(230).gamma_multiply(0.6))
                    .stroke((0.0, Color32::TRANSPARENT)),
            );
        }

        for series in &figure.series {
            let color = state.color_map.color_for(&series.name);
            let points = match (series.axis, right) {
                (Axis::Right, Some(map)) => series
                    .points
                    .iter()
                    .map(|&[x, y]| [x, map.apply(y)])
                    .collect(),
                _ => series.points.clone(),
            };
            let points = PlotPoints::new(points);
            match series.style {
                Style::Line => {
                    plot_ui.line(Line::new(points).name(&series.name).color(color).width(1.5));
                }
                Style::Markers => {
                    plot_ui.points(
                        Points::new(points)
                            .name(&series.name)
                            .color(color)
                            .shape(MarkerShape::Cross)
                            .radius(4.0),
                    );
                }
            }
        }
    });
}

/// Corners of the shaded band over the figure's span, covering the
/// left-axis data range.
fn span_corners(figure: &Figure) -> Option<Vec<[f64; 2]>> {
    let (x0, x1) = figure.span?;
    let (lo, hi) = figure.y_range(Axis::Left)?;
    Some(vec![[x0, lo], [x1, lo], [x1, hi], [x0, hi]])
}
