use log::debug;
use serde::{Deserialize, Serialize};

use super::error::{DataError, Result};
use super::model::{CycleLog, CycleView, DischargeLog, DischargeWindow, Repetition, TimeWindow};

// ---------------------------------------------------------------------------
// Discharge-log policy
// ---------------------------------------------------------------------------

/// Minimum current [A] above which a discharge record is treated as the
/// low-current repetition.
pub const DEFAULT_CURRENT_THRESHOLD_A: f64 = -40.0;

/// Boundary markers a discharge record must carry before it can be windowed.
pub const DISCHARGE_MIN_BOUNDARIES: usize = 6;

/// Boundary markers a cycle/HPPC record must carry before it can be trimmed.
pub const CYCLE_MIN_BOUNDARIES: usize = 2;

/// How a discharge window is picked out of a Bitrode-style record.
///
/// Four consecutive boundary positions starting at `boundary_offset` are
/// candidates. If the record never draws more than `current_threshold`
/// (strictly greater minimum) the window spans candidates 0 and 2, otherwise
/// candidates 1 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DischargeWindowPolicy {
    pub current_threshold: f64,
    pub boundary_offset: usize,
}

impl Default for DischargeWindowPolicy {
    fn default() -> Self {
        Self {
            current_threshold: DEFAULT_CURRENT_THRESHOLD_A,
            boundary_offset: 0,
        }
    }
}

impl DischargeWindowPolicy {
    /// Saturates; an offset near `usize::MAX` can never be satisfied.
    pub fn required_boundaries(&self) -> usize {
        self.boundary_offset
            .saturating_add(4)
            .max(DISCHARGE_MIN_BOUNDARIES)
    }

    /// Choose the repetition from the record's minimum current.
    pub fn repetition_for(&self, min_current: f64) -> Repetition {
        if min_current > self.current_threshold {
            Repetition::First
        } else {
            Repetition::Second
        }
    }

    /// Inclusive sample bounds for a repetition, or `None` when there are
    /// too few boundary markers.
    pub fn bounds(&self, boundaries: &[usize], repetition: Repetition) -> Option<(usize, usize)> {
        if boundaries.len() < self.required_boundaries() {
            return None;
        }
        let o = self.boundary_offset;
        match repetition {
            Repetition::First => Some((boundaries[o], boundaries[o + 2])),
            Repetition::Second => Some((boundaries[o + 1], boundaries[o + 3])),
        }
    }
}

/// Select the physically relevant section of a discharge record.
///
/// Returns a new view; `log` is untouched, so selecting twice yields the same
/// window.
pub fn select_discharge_window<'a>(
    log: &'a DischargeLog,
    policy: &DischargeWindowPolicy,
) -> Result<DischargeWindow<'a>> {
    let min_current = log.min_current();
    let repetition = policy.repetition_for(min_current);
    let (start, end) =
        policy
            .bounds(&log.boundaries, repetition)
            .ok_or_else(|| DataError::IndexDerivation {
                path: log.source.clone(),
                what: "discharge window",
                found: log.boundaries.len(),
                required: policy.required_boundaries(),
            })?;

    if start > end || end >= log.len() {
        return Err(DataError::format(
            &log.source,
            format!(
                "boundary markers {start}..={end} do not fit a record of {} samples",
                log.len()
            ),
        ));
    }

    debug!(
        "{}: min current {min_current} A → {repetition:?} repetition, samples {start}..={end}",
        log.source.display()
    );

    let span = TimeWindow::new(log.time[start], log.time[end]);
    Ok(DischargeWindow {
        time: rezero(&log.time[start..=end]),
        current: &log.current[start..=end],
        voltage: &log.voltage[start..=end],
        start_index: start,
        end_index: end,
        repetition,
        span,
    })
}

/// Shift a time slice so its first sample is zero.
pub fn rezero(time: &[f64]) -> Vec<f64> {
    match time.first() {
        Some(&t0) => time.iter().map(|&t| t - t0).collect(),
        None => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Cycle-log policy
// ---------------------------------------------------------------------------

/// Drop every sample before the second boundary marker. The time axis is
/// kept as recorded.
pub fn trim_cycle_log(log: &CycleLog) -> Result<CycleView<'_>> {
    let full = log.view();
    let boundaries = full.boundary_indices();
    let Some(&start) = boundaries.get(CYCLE_MIN_BOUNDARIES - 1) else {
        return Err(DataError::IndexDerivation {
            path: log.source.clone(),
            what: "cycle-log trim",
            found: boundaries.len(),
            required: CYCLE_MIN_BOUNDARIES,
        });
    };

    debug!(
        "{}: dropping {start} samples before the second boundary",
        log.source.display()
    );

    Ok(CycleView {
        source: &log.source,
        offset: start,
        time: &log.time[start..],
        current: &log.current[start..],
        voltage: &log.voltage[start..],
        flags: &log.flags[start..],
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::model::Flag;

    fn discharge(min_current: f64, boundaries: Vec<usize>) -> DischargeLog {
        let n = 40;
        let mut current = vec![-10.0; n];
        current[22] = min_current;
        DischargeLog {
            source: PathBuf::from("synthetic.csv"),
            time: (0..n).map(|i| 100.0 + 2.0 * i as f64).collect(),
            current,
            voltage: (0..n).map(|i| 4.2 - 0.01 * i as f64).collect(),
            boundaries,
        }
    }

    #[test]
    fn low_current_uses_first_and_third_candidates() {
        let log = discharge(-39.0, vec![5, 10, 15, 20, 25, 30]);
        let w = select_discharge_window(&log, &DischargeWindowPolicy::default()).unwrap();
        assert_eq!(w.repetition, Repetition::First);
        assert_eq!((w.start_index, w.end_index), (5, 15));
        assert_eq!(w.len(), 11);
        assert_eq!(w.time[0], 0.0);
        assert_eq!(w.span, TimeWindow::new(110.0, 130.0));
        assert_eq!(w.current.len(), 11);
        assert_eq!(w.voltage[0], log.voltage[5]);
    }

    #[test]
    fn high_current_uses_second_and_fourth_candidates() {
        let log = discharge(-41.0, vec![5, 10, 15, 20, 25, 30]);
        let w = select_discharge_window(&log, &DischargeWindowPolicy::default()).unwrap();
        assert_eq!(w.repetition, Repetition::Second);
        assert_eq!((w.start_index, w.end_index), (10, 20));
        assert_eq!(w.time[0], 0.0);
        assert_eq!(*w.time.last().unwrap(), 20.0);
    }

    #[test]
    fn threshold_is_strict() {
        let policy = DischargeWindowPolicy::default();
        assert_eq!(policy.repetition_for(-40.0), Repetition::Second);
        assert_eq!(policy.repetition_for(-39.999), Repetition::First);
    }

    #[test]
    fn offset_shifts_candidates() {
        let log = discharge(-5.0, vec![1, 3, 5, 10, 15, 20]);
        let policy = DischargeWindowPolicy {
            boundary_offset: 2,
            ..Default::default()
        };
        let w = select_discharge_window(&log, &policy).unwrap();
        assert_eq!((w.start_index, w.end_index), (5, 15));
    }

    #[test]
    fn too_few_boundaries_is_a_derivation_error() {
        let log = discharge(-5.0, vec![5, 10, 15, 20, 25]);
        let err = select_discharge_window(&log, &DischargeWindowPolicy::default()).unwrap_err();
        match err {
            DataError::IndexDerivation { found, required, .. } => {
                assert_eq!((found, required), (5, 6));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn huge_offset_is_a_derivation_error() {
        let log = discharge(-5.0, vec![5, 10, 15, 20, 25, 30]);
        let policy = DischargeWindowPolicy {
            boundary_offset: usize::MAX,
            ..Default::default()
        };
        assert_eq!(policy.required_boundaries(), usize::MAX);
        assert_eq!(policy.bounds(&log.boundaries, Repetition::First), None);
        let err = select_discharge_window(&log, &policy).unwrap_err();
        assert!(matches!(
            err,
            DataError::IndexDerivation { found: 6, required: usize::MAX, .. }
        ));
    }

    #[test]
    fn selecting_twice_is_idempotent() {
        let log = discharge(-39.0, vec![5, 10, 15, 20, 25, 30]);
        let policy = DischargeWindowPolicy::default();
        let a = select_discharge_window(&log, &policy).unwrap();
        let b = select_discharge_window(&log, &policy).unwrap();
        assert_eq!(a.time, b.time);
        assert_eq!((a.start_index, a.end_index), (b.start_index, b.end_index));
        assert_eq!(log.len(), 40);
    }

    #[test]
    fn rezero_handles_empty_and_offset() {
        assert!(rezero(&[]).is_empty());
        assert_eq!(rezero(&[7.5, 8.0, 10.5]), vec![0.0, 0.5, 3.0]);
    }

    fn cycle(flags: Vec<Flag>) -> CycleLog {
        let n = flags.len();
        CycleLog {
            source: PathBuf::from("hppc.csv"),
            time: (0..n).map(|i| i as f64 * 10.0).collect(),
            current: vec![0.0; n],
            voltage: vec![4.0; n],
            flags,
        }
    }

    #[test]
    fn trim_starts_at_second_boundary_and_keeps_time() {
        let mut flags = vec![Flag::Blank; 12];
        flags[2] = Flag::Boundary;
        flags[6] = Flag::Boundary;
        flags[9] = Flag::Boundary;
        flags[11] = Flag::Terminal;
        let log = cycle(flags);
        let v = trim_cycle_log(&log).unwrap();
        assert_eq!(v.offset, 6);
        assert_eq!(v.len(), 6);
        assert_eq!(v.time[0], 60.0);
        assert_eq!(v.boundary_indices(), vec![0, 3]);
        assert_eq!(v.terminal_indices(), vec![5]);
    }

    #[test]
    fn trim_twice_gives_same_view() {
        let mut flags = vec![Flag::Blank; 10];
        flags[1] = Flag::Boundary;
        flags[4] = Flag::Boundary;
        flags[7] = Flag::Boundary;
        let log = cycle(flags);
        let a = log.processed().unwrap();
        let b = log.processed().unwrap();
        assert_eq!(a.offset, b.offset);
        assert_eq!(a.time, b.time);
        assert_eq!(log.len(), 10);
    }

    #[test]
    fn trim_needs_two_boundaries() {
        let mut flags = vec![Flag::Blank; 5];
        flags[3] = Flag::Boundary;
        let err = trim_cycle_log(&cycle(flags)).unwrap_err();
        assert!(matches!(
            err,
            DataError::IndexDerivation { found: 1, required: 2, .. }
        ));
        assert!(!err.is_fatal());
    }
}
