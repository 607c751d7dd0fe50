use std::collections::BTreeSet;

use battery_windows::report::{Figure, Report};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One report as the viewer shows it.
pub struct ReportView {
    pub title: String,
    pub summary: Vec<String>,
    pub figures: Vec<Figure>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub reports: Vec<ReportView>,

    /// (report, figure) currently plotted.
    pub selected: (usize, usize),

    /// Series name → colour, shared by every figure.
    pub color_map: ColorMap,

    pub show_legend: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(reports: &[Report]) -> Self {
        let reports: Vec<ReportView> = reports
            .iter()
            .map(|r| ReportView {
                title: r.title(),
                summary: r.summary(),
                figures: r.figures(),
            })
            .collect();

        let names: BTreeSet<String> = reports
            .iter()
            .flat_map(|r| &r.figures)
            .flat_map(|f| &f.series)
            .map(|s| s.name.clone())
            .collect();

        let status_message = reports
            .is_empty()
            .then(|| "No report could be built; see the log for details.".to_string());

        Self {
            reports,
            selected: (0, 0),
            color_map: ColorMap::new(&names),
            show_legend: true,
            status_message,
        }
    }

    pub fn selected_figure(&self) -> Option<&Figure> {
        let (r, f) = self.selected;
        self.reports.get(r)?.figures.get(f)
    }

    pub fn select(&mut self, report: usize, figure: usize) {
        self.selected = (report, figure);
    }

    /// Flattened (report, figure) positions in display order.
    fn positions(&self) -> Vec<(usize, usize)> {
        self.reports
            .iter()
            .enumerate()
            .flat_map(|(r, view)| (0..view.figures.len()).map(move |f| (r, f)))
            .collect()
    }

    /// Move the selection forwards (`+1`) or backwards (`-1`), wrapping.
    pub fn step(&mut self, delta: isize) {
        let positions = self.positions();
        if positions.is_empty() {
            return;
        }
        let n = positions.len() as isize;
        let current = positions
            .iter()
            .position(|&p| p == self.selected)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(n) as usize;
        self.selected = positions[next];
    }
}
