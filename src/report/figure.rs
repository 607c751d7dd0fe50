// ---------------------------------------------------------------------------
// Renderer-neutral chart description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Line,
    Markers,
}

/// Which y-axis a series is read against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Left,
    Right,
}

/// One named trace on a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
    pub axis: Axis,
}

/// A single chart: axes, traces, and an optional shaded x-range.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Label of the right-hand axis, when the figure has one.
    pub y2_label: Option<String>,
    pub series: Vec<Series>,
    pub span: Option<(f64, f64)>,
}

/// Linear map from right-axis values onto the left axis: `v * scale + shift`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    pub scale: f64,
    pub shift: f64,
}

impl AxisMap {
    pub fn apply(&self, v: f64) -> f64 {
        v * self.scale + self.shift
    }

    pub fn invert(&self, v: f64) -> f64 {
        (v - self.shift) / self.scale
    }
}

fn y_range<'a>(series: impl Iterator<Item = &'a Series>) -> Option<(f64, f64)> {
    let (lo, hi) = series
        .flat_map(|s| s.points.iter().map(|p| p[1]))
        .filter(|y| y.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    (lo <= hi).then_some((lo, hi))
}

impl Figure {
    pub fn new(title: impl Into<String>, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            y2_label: None,
            series: Vec::new(),
            span: None,
        }
    }

    /// A figure with a second y-axis on the right.
    pub fn twin(title: impl Into<String>, x_label: &str, y_label: &str, y2_label: &str) -> Self {
        Self {
            y2_label: Some(y2_label.to_string()),
            ..Self::new(title, x_label, y_label)
        }
    }

    /// Add a line through `(xs[i], ys[i])`.
    pub fn line(self, name: &str, xs: &[f64], ys: &[f64]) -> Self {
        self.line_on(Axis::Left, name, xs, ys)
    }

    /// Add a line read against the right-hand axis.
    pub fn line_right(self, name: &str, xs: &[f64], ys: &[f64]) -> Self {
        self.line_on(Axis::Right, name, xs, ys)
    }

    fn line_on(mut self, axis: Axis, name: &str, xs: &[f64], ys: &[f64]) -> Self {
        let points = xs.iter().zip(ys).map(|(&x, &y)| [x, y]).collect();
        self.series.push(Series {
            name: name.to_string(),
            points,
            style: Style::Line,
            axis,
        });
        self
    }

    /// Add markers at the given sample indices. Indices past the end of the
    /// data (e.g. the "next sample" of a final marker) are skipped.
    pub fn markers(mut self, name: &str, xs: &[f64], ys: &[f64], at: &[usize]) -> Self {
        let points = at
            .iter()
            .filter_map(|&i| Some([*xs.get(i)?, *ys.get(i)?]))
            .collect();
        self.series.push(Series {
            name: name.to_string(),
            points,
            style: Style::Markers,
            axis: Axis::Left,
        });
        self
    }

    /// Add markers at `(i, ys[i])`, i.e. against sample number.
    pub fn scatter(mut self, name: &str, ys: &[f64]) -> Self {
        let points = ys.iter().enumerate().map(|(i, &y)| [i as f64, y]).collect();
        self.series.push(Series {
            name: name.to_string(),
            points,
            style: Style::Markers,
            axis: Axis::Left,
        });
        self
    }

    pub fn span(mut self, x0: f64, x1: f64) -> Self {
        self.span = Some((x0, x1));
        self
    }

    /// Finite y-range of the series on `axis`.
    pub fn y_range(&self, axis: Axis) -> Option<(f64, f64)> {
        y_range(self.series.iter().filter(|s| s.axis == axis))
    }

    /// How to draw right-axis series in left-axis coordinates so both data
    /// ranges fill the same height. `None` unless both axes carry data.
    pub fn right_axis_map(&self) -> Option<AxisMap> {
        let (l0, l1) = self.y_range(Axis::Left)?;
        let (r0, r1) = self.y_range(Axis::Right)?;
        let (lspan, rspan) = (l1 - l0, r1 - r0);
        let scale = if lspan > 0.0 && rspan > 0.0 {
            lspan / rspan
        } else {
            1.0
        };
        Some(AxisMap {
            scale,
            shift: l0 - r0 * scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_skip_out_of_range_indices() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [5.0, 6.0, 7.0];
        let fig = Figure::new("t", "x", "y").markers("m", &xs, &ys, &[0, 2, 3]);
        assert_eq!(fig.series[0].points, vec![[0.0, 5.0], [2.0, 7.0]]);
        assert_eq!(fig.series[0].style, Style::Markers);
    }

    #[test]
    fn right_axis_is_mapped_onto_left_range() {
        let t = [0.0, 1.0, 2.0];
        let fig = Figure::twin("t", "x", "Current [A]", "Voltage [V]")
            .line("current", &t, &[-30.0, -10.0, 10.0])
            .line_right("voltage", &t, &[3.0, 3.5, 4.0]);
        assert_eq!(fig.y2_label.as_deref(), Some("Voltage [V]"));
        assert_eq!(fig.series[1].axis, Axis::Right);
        let map = fig.right_axis_map().unwrap();
        assert_eq!(map.apply(3.0), -30.0);
        assert_eq!(map.apply(4.0), 10.0);
        assert_eq!(map.invert(-10.0), 3.5);
    }

    #[test]
    fn flat_right_series_is_only_shifted() {
        let t = [0.0, 1.0];
        let fig = Figure::twin("t", "x", "a", "b")
            .line("a", &t, &[0.0, 2.0])
            .line_right("b", &t, &[5.0, 5.0]);
        let map = fig.right_axis_map().unwrap();
        assert_eq!(map.scale, 1.0);
        assert_eq!(map.apply(5.0), 0.0);
        assert!(Figure::new("t", "x", "a").line("a", &t, &t).right_axis_map().is_none());
    }

    #[test]
    fn scatter_uses_sample_number() {
        let fig = Figure::new("t", "x", "y").scatter("dt", &[1.0, 1.5]);
        assert_eq!(fig.series[0].points, vec![[0.0, 1.0], [1.0, 1.5]]);
    }
}
