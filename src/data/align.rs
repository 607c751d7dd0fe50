use log::debug;

use super::error::{DataError, Result};
use super::model::{TemperatureLog, TemperatureWindow, TimeWindow};

/// Sample interval of the thermocouple logger [s].
pub const TEMPERATURE_SAMPLE_INTERVAL_S: f64 = 3.0;

/// Time axis for a logger without a time column: `index * interval`.
pub fn synthesize_time(len: usize, interval_s: f64) -> Vec<f64> {
    (0..len).map(|i| i as f64 * interval_s).collect()
}

/// Index of the sample whose time is closest to `t`.
///
/// On an exact tie the lower index wins. Returns `None` for an empty axis.
pub fn nearest_index(axis: &[f64], t: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &x) in axis.iter().enumerate() {
        let d = (t - x).abs();
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Nearest sample indices for both ends of `window` on a strictly
/// increasing synthetic axis.
///
/// A window end more than half an interval outside the axis cannot be
/// matched to any sample and is rejected.
pub fn locate_window(axis: &[f64], window: TimeWindow, interval_s: f64) -> Result<(usize, usize)> {
    let (Some(&first), Some(&last)) = (axis.first(), axis.last()) else {
        return Err(DataError::Alignment("temperature time axis is empty".into()));
    };
    if !(window.start_s.is_finite() && window.end_s.is_finite()) {
        return Err(DataError::Alignment(format!(
            "window {:?} has non-finite bounds",
            window
        )));
    }
    if window.end_s < window.start_s {
        return Err(DataError::Alignment(format!(
            "window ends ({} s) before it starts ({} s)",
            window.end_s, window.start_s
        )));
    }

    let slack = interval_s / 2.0;
    for t in [window.start_s, window.end_s] {
        if t < first - slack || t > last + slack {
            return Err(DataError::Alignment(format!(
                "{t} s lies outside the temperature record ({first}..={last} s)"
            )));
        }
    }

    // Both lookups succeed: the axis is non-empty.
    let start = nearest_index(axis, window.start_s).unwrap_or(0);
    let end = nearest_index(axis, window.end_s).unwrap_or(axis.len() - 1);
    Ok((start, end))
}

/// Slice a temperature log to the discharge window and re-synthesize its
/// time axis from zero.
pub fn align_temperature(log: &TemperatureLog, window: TimeWindow) -> Result<TemperatureWindow<'_>> {
    let (start, end) = locate_window(&log.time, window, log.interval_s)?;
    debug!(
        "{}: window {:.1}..{:.1} s → samples {start}..={end}",
        log.source.display(),
        window.start_s,
        window.end_s
    );

    let channels = [
        &log.channels[0][start..=end],
        &log.channels[1][start..=end],
        &log.channels[2][start..=end],
        &log.channels[3][start..=end],
    ];
    Ok(TemperatureWindow {
        time: synthesize_time(end - start + 1, log.interval_s),
        channels,
        start_index: start,
        end_index: end,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn temperature(n: usize) -> TemperatureLog {
        let ramp = |k: f64| (0..n).map(|i| 20.0 + k * i as f64).collect::<Vec<_>>();
        TemperatureLog {
            source: PathBuf::from("temp.lvm"),
            channels: [ramp(0.1), ramp(0.2), ramp(0.3), ramp(0.4)],
            time: synthesize_time(n, TEMPERATURE_SAMPLE_INTERVAL_S),
            interval_s: TEMPERATURE_SAMPLE_INTERVAL_S,
        }
    }

    #[test]
    fn synthetic_axis_uses_three_second_stride() {
        let t = synthesize_time(4, TEMPERATURE_SAMPLE_INTERVAL_S);
        assert_eq!(t, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn nearest_picks_closest_sample() {
        let axis = synthesize_time(100, 3.0);
        assert_eq!(nearest_index(&axis, 10.0), Some(3));
        assert_eq!(nearest_index(&axis, 280.0), Some(93));
        assert_eq!(nearest_index(&axis, -50.0), Some(0));
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn ties_resolve_to_lower_index() {
        let axis = synthesize_time(100, 3.0);
        assert_eq!(nearest_index(&axis, 4.5), Some(1));
        assert_eq!(nearest_index(&axis, 7.5), Some(2));
    }

    #[test]
    fn align_slices_and_rezeroes() {
        let log = temperature(100);
        let w = log.align(TimeWindow::new(10.0, 280.0)).unwrap();
        assert_eq!((w.start_index, w.end_index), (3, 93));
        assert_eq!(w.len(), 91);
        assert_eq!(w.time[0], 0.0);
        assert_eq!(*w.time.last().unwrap(), 270.0);
        assert_eq!(w.channels[2][0], log.channels[2][3]);
        assert_eq!(w.channels[3].len(), 91);
    }

    #[test]
    fn aligned_duration_is_within_quantization() {
        let log = temperature(200);
        let window = TimeWindow::new(41.2, 377.9);
        let w = log.align(window).unwrap();
        let aligned = *w.time.last().unwrap();
        assert!((aligned - window.duration()).abs() <= TEMPERATURE_SAMPLE_INTERVAL_S);
    }

    #[test]
    fn empty_axis_is_an_alignment_error() {
        let log = temperature(0);
        let err = log.locate(TimeWindow::new(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, DataError::Alignment(_)));
    }

    #[test]
    fn window_outside_axis_is_rejected() {
        let log = temperature(10); // 0..=27 s
        assert!(log.locate(TimeWindow::new(0.0, 28.5)).is_ok());
        assert!(log.locate(TimeWindow::new(0.0, 29.0)).is_err());
        assert!(log.locate(TimeWindow::new(-2.0, 10.0)).is_err());
        assert!(log.locate(TimeWindow::new(12.0, 6.0)).is_err());
        assert!(log.locate(TimeWindow::new(f64::NAN, 6.0)).is_err());
    }
}
