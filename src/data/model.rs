use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::segment::{self, IndexGroup};
use super::window::DischargeWindowPolicy;

// ---------------------------------------------------------------------------
// Flag – one cell of the instrument's state-flag column
// ---------------------------------------------------------------------------

/// A state marker from the flag column of a cycler log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Flag {
    /// `S`: start/stop transition between operational phases.
    Boundary,
    /// `Q`: final valid sample of a recorded test.
    Terminal,
    /// Empty or missing cell.
    #[default]
    Blank,
    /// Any other marker text, kept verbatim.
    Other(String),
}

impl Flag {
    /// Normalize a raw cell. Missing and whitespace-only cells both become
    /// [`Flag::Blank`].
    pub fn from_cell(cell: &str) -> Self {
        match cell.trim() {
            "" => Flag::Blank,
            "S" => Flag::Boundary,
            "Q" => Flag::Terminal,
            other => Flag::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Boundary => write!(f, "S"),
            Flag::Terminal => write!(f, "Q"),
            Flag::Blank => write!(f, " "),
            Flag::Other(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeWindow – a span on the discharge logger's clock
// ---------------------------------------------------------------------------

/// Start and end of the physically relevant discharge section, in seconds of
/// the original (not re-zeroed) record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_s: f64,
    pub end_s: f64,
}

impl TimeWindow {
    pub fn new(start_s: f64, end_s: f64) -> Self {
        Self { start_s, end_s }
    }

    pub fn duration(&self) -> f64 {
        self.end_s - self.start_s
    }
}

// ---------------------------------------------------------------------------
// CycleLog – cycler charge/discharge or HPPC record
// ---------------------------------------------------------------------------

/// A cycle or HPPC log as read from disk. Never modified after loading.
#[derive(Debug, Clone)]
pub struct CycleLog {
    pub source: PathBuf,
    /// Time [s].
    pub time: Vec<f64>,
    /// Current [A].
    pub current: Vec<f64>,
    /// Voltage [V].
    pub voltage: Vec<f64>,
    pub flags: Vec<Flag>,
}

impl CycleLog {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The whole record as a view.
    pub fn view(&self) -> CycleView<'_> {
        CycleView {
            source: &self.source,
            offset: 0,
            time: &self.time,
            current: &self.current,
            voltage: &self.voltage,
            flags: &self.flags,
        }
    }

    /// The record with the initial transient before the second boundary
    /// marker removed. See [`super::window::trim_cycle_log`].
    pub fn processed(&self) -> Result<CycleView<'_>> {
        super::window::trim_cycle_log(self)
    }
}

/// A borrowed, index-aligned slice of a [`CycleLog`].
///
/// Index derivations on a view are relative to the view's first sample.
#[derive(Debug, Clone, Copy)]
pub struct CycleView<'a> {
    pub source: &'a Path,
    /// Position of the view's first sample in the full log.
    pub offset: usize,
    pub time: &'a [f64],
    pub current: &'a [f64],
    pub voltage: &'a [f64],
    pub flags: &'a [Flag],
}

impl<'a> CycleView<'a> {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Positions of `S` markers.
    pub fn boundary_indices(&self) -> Vec<usize> {
        segment::find_boundary_indices(self.flags)
    }

    /// Positions of `Q` markers.
    pub fn terminal_indices(&self) -> Vec<usize> {
        segment::find_terminal_indices(self.flags)
    }

    /// Indices for pulse-discharge parameter fitting.
    pub fn pulse_indices(&self) -> IndexGroup {
        segment::derive_pulse_indices(&self.boundary_indices())
    }

    /// Indices for resistor/capacitor parameter fitting.
    pub fn rest_indices(&self) -> IndexGroup {
        segment::derive_rest_indices(&self.boundary_indices())
    }
}

// ---------------------------------------------------------------------------
// DischargeLog – Bitrode-style constant-discharge record
// ---------------------------------------------------------------------------

/// A discharge log. Only the boundary positions of its flag column are kept.
#[derive(Debug, Clone)]
pub struct DischargeLog {
    pub source: PathBuf,
    pub time: Vec<f64>,
    pub current: Vec<f64>,
    pub voltage: Vec<f64>,
    /// Positions of `S` markers, captured at load time.
    pub boundaries: Vec<usize>,
}

impl DischargeLog {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Smallest current in the record, ignoring NaN cells.
    pub fn min_current(&self) -> f64 {
        self.current.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// The physically relevant section. See
    /// [`super::window::select_discharge_window`].
    pub fn window(&self, policy: &DischargeWindowPolicy) -> Result<DischargeWindow<'_>> {
        super::window::select_discharge_window(self, policy)
    }
}

/// Which of the two recorded repetitions a discharge window covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// Low-current record: boundaries `offset` and `offset + 2`.
    First,
    /// High-current record: boundaries `offset + 1` and `offset + 3`.
    Second,
}

/// The selected section of a [`DischargeLog`].
#[derive(Debug, Clone)]
pub struct DischargeWindow<'a> {
    /// Time re-zeroed to the first sample of the window.
    pub time: Vec<f64>,
    pub current: &'a [f64],
    pub voltage: &'a [f64],
    /// First sample of the window in the full log.
    pub start_index: usize,
    /// Last sample of the window in the full log (inclusive).
    pub end_index: usize,
    pub repetition: Repetition,
    /// Original start and end times, for cross-instrument alignment.
    pub span: TimeWindow,
}

impl DischargeWindow<'_> {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TemperatureLog – four-thermocouple logger record
// ---------------------------------------------------------------------------

/// Number of thermocouple channels in a temperature log.
pub const THERMOCOUPLES: usize = 4;

/// A temperature log sampled at a fixed interval with no time column.
#[derive(Debug, Clone)]
pub struct TemperatureLog {
    pub source: PathBuf,
    /// Thermocouples 1–4 [°C].
    pub channels: [Vec<f64>; THERMOCOUPLES],
    /// Synthesized as `index * interval_s`.
    pub time: Vec<f64>,
    pub interval_s: f64,
}

impl TemperatureLog {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Sample indices nearest to the window's start and end times.
    pub fn locate(&self, window: TimeWindow) -> Result<(usize, usize)> {
        super::align::locate_window(&self.time, window, self.interval_s)
    }

    /// The section of this log that overlaps the discharge window.
    pub fn align(&self, window: TimeWindow) -> Result<TemperatureWindow<'_>> {
        super::align::align_temperature(self, window)
    }
}

/// The section of a [`TemperatureLog`] matching a discharge window.
#[derive(Debug, Clone)]
pub struct TemperatureWindow<'a> {
    pub channels: [&'a [f64]; THERMOCOUPLES],
    /// Re-synthesized from zero with the log's interval.
    pub time: Vec<f64>,
    pub start_index: usize,
    /// Inclusive.
    pub end_index: usize,
}

impl TemperatureWindow<'_> {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}
