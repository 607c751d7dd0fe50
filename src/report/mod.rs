//! Report building: load → derive indices → window → align, then describe
//! the raw and processed data as [`Figure`]s for whatever renders them.

pub mod figure;

use anyhow::Result;
use log::{debug, info, warn};

use crate::config::{Rate, ReportConfig};
use crate::data::loader::{load_cycle_log, load_discharge_log, load_temperature_log};
use crate::data::model::{
    CycleLog, DischargeLog, DischargeWindow, Repetition, TemperatureLog, TemperatureWindow,
    TimeWindow,
};
use crate::data::segment::IndexGroup;
use crate::data::DataError;

pub use figure::{Axis, AxisMap, Figure, Series, Style};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Which report to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Cycle,
    Hppc,
    Temp(Rate),
}

impl ReportKind {
    /// Every report, in the order `all` builds them.
    pub fn all() -> Vec<ReportKind> {
        let mut kinds = vec![ReportKind::Cycle, ReportKind::Hppc];
        kinds.extend(Rate::ALL.into_iter().map(ReportKind::Temp));
        kinds
    }
}

#[derive(Debug, Clone)]
pub enum Report {
    Cycle(CycleReport),
    Hppc(HppcReport),
    Discharge(DischargeReport),
}

impl Report {
    pub fn build(kind: ReportKind, config: &ReportConfig) -> Result<Report> {
        let files = &config.data_files;
        let report = match kind {
            ReportKind::Cycle => Report::Cycle(CycleReport::build(load_cycle_log(&files.cycle)?)),
            ReportKind::Hppc => Report::Hppc(HppcReport::build(load_cycle_log(&files.hppc)?)?),
            ReportKind::Temp(rate) => {
                let pair = files.discharge(rate)?;
                let bitrode = load_discharge_log(&pair.bitrode)?;
                let temperature =
                    load_temperature_log(&pair.temperature, config.temperature_interval_s)?;
                Report::Discharge(DischargeReport::build(rate, bitrode, temperature, config)?)
            }
        };
        info!("built report: {}", report.title());
        Ok(report)
    }

    pub fn title(&self) -> String {
        match self {
            Report::Cycle(_) => "Battery cell cycle data".to_string(),
            Report::Hppc(_) => "HPPC data".to_string(),
            Report::Discharge(r) => format!("{} discharge", r.rate),
        }
    }

    /// Text printed to stdout.
    pub fn summary(&self) -> Vec<String> {
        match self {
            Report::Cycle(r) => r.summary(),
            Report::Hppc(r) => r.summary(),
            Report::Discharge(r) => r.summary(),
        }
    }

    pub fn figures(&self) -> Vec<Figure> {
        match self {
            Report::Cycle(r) => r.figures(),
            Report::Hppc(r) => r.figures(),
            Report::Discharge(r) => r.figures(),
        }
    }
}

/// Build several reports in order.
///
/// A report that fails on index derivation or alignment is skipped with a
/// warning; anything else (unreadable or malformed file, bad config) aborts.
pub fn build_all(kinds: &[ReportKind], config: &ReportConfig) -> Result<Vec<Report>> {
    let mut reports = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        match Report::build(kind, config) {
            Ok(report) => reports.push(report),
            Err(err) if is_recoverable(&err) => warn!("skipping {kind:?} report: {err:#}"),
            Err(err) => return Err(err.context(format!("building {kind:?} report"))),
        }
    }
    Ok(reports)
}

fn is_recoverable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DataError>()
        .is_some_and(|e| !e.is_fatal())
}

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub log: CycleLog,
}

impl CycleReport {
    pub fn build(log: CycleLog) -> Self {
        Self { log }
    }

    pub fn summary(&self) -> Vec<String> {
        let hours = self.log.time.last().copied().unwrap_or(0.0) / SECONDS_PER_HOUR;
        vec![format!(
            "Cycle data:\t {} samples over {hours:.2} hr",
            self.log.len()
        )]
    }

    pub fn figures(&self) -> Vec<Figure> {
        let hours: Vec<f64> = self.log.time.iter().map(|t| t / SECONDS_PER_HOUR).collect();
        vec![
            Figure::new("Battery cell cycle data", "Time [hr]", "Current [A]").line(
                "current",
                &hours,
                &self.log.current,
            ),
            Figure::new("Battery cell cycle data", "Time [hr]", "Voltage [V]").line(
                "voltage",
                &hours,
                &self.log.voltage,
            ),
        ]
    }
}

// ---------------------------------------------------------------------------
// HPPC report
// ---------------------------------------------------------------------------

/// Raw HPPC log plus the indices derived from its processed (trimmed) view.
/// All indices are relative to the trimmed start at `offset`.
#[derive(Debug, Clone)]
pub struct HppcReport {
    pub log: CycleLog,
    pub offset: usize,
    pub boundaries: Vec<usize>,
    pub terminals: Vec<usize>,
    pub pulse: IndexGroup,
    pub rest: IndexGroup,
}

impl HppcReport {
    pub fn build(log: CycleLog) -> Result<Self, DataError> {
        let processed = log.processed()?;
        let offset = processed.offset;
        let boundaries = processed.boundary_indices();
        let terminals = processed.terminal_indices();
        let pulse = processed.pulse_indices();
        let rest = processed.rest_indices();
        // Rest groups drop their last unit, so only pulse raggedness means a
        // partial unit in the file.
        if pulse.is_ragged() {
            warn!(
                "{}: pulse index groups are ragged {:?}",
                log.source.display(),
                pulse.lens()
            );
        }
        debug!(
            "{}: {} boundary markers, pulse groups {:?}, rest groups {:?}",
            log.source.display(),
            boundaries.len(),
            pulse.lens(),
            rest.lens()
        );
        Ok(Self {
            log,
            offset,
            boundaries,
            terminals,
            pulse,
            rest,
        })
    }

    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("HPPC data trimmed at sample:\t {}", self.offset),
            format!(
                "Boundary markers:\t {} (terminal {})",
                self.boundaries.len(),
                self.terminals.len()
            ),
            format!("Pulse groups:\t {}", self.pulse.complete_units()),
            format!("Rest groups:\t {}", self.rest.complete_units()),
        ]
    }

    pub fn figures(&self) -> Vec<Figure> {
        let log = &self.log;
        let o = self.offset;
        let (time, current, voltage) = (&log.time[o..], &log.current[o..], &log.voltage[o..]);

        let mut processed_voltage =
            Figure::new("HPPC processed data for model development", "Time [s]", "Voltage [V]")
                .line("data", time, voltage)
                .markers("ids", time, voltage, &self.boundaries)
                .markers("idq", time, voltage, &self.terminals);
        for (name, ids) in ["id0", "id1", "id2", "id3", "id4"]
            .into_iter()
            .zip(self.rest.slots())
        {
            processed_voltage = processed_voltage.markers(name, time, voltage, ids);
        }

        vec![
            Figure::new("HPPC original data", "Time [s]", "Voltage [V]").line(
                "voltage",
                &log.time,
                &log.voltage,
            ),
            Figure::new("HPPC original data", "Time [s]", "Current [A]").line(
                "current",
                &log.time,
                &log.current,
            ),
            Figure::twin("HPPC original data", "Time [s]", "Current [A]", "Voltage [V]")
                .line("current", &log.time, &log.current)
                .line_right("voltage", &log.time, &log.voltage),
            processed_voltage,
            Figure::new("HPPC processed data for model development", "Time [s]", "Current [A]")
                .line("data", time, current)
                .markers("ids", time, current, &self.boundaries)
                .markers("idq", time, current, &self.terminals),
        ]
    }
}

// ---------------------------------------------------------------------------
// Discharge + temperature report
// ---------------------------------------------------------------------------

/// A Bitrode discharge window and the matching thermocouple window.
#[derive(Debug, Clone)]
pub struct DischargeReport {
    pub rate: Rate,
    pub bitrode: DischargeLog,
    pub temperature: TemperatureLog,
    pub repetition: Repetition,
    /// Inclusive sample range in the Bitrode log.
    pub bitrode_range: (usize, usize),
    /// Re-zeroed Bitrode time over `bitrode_range`.
    pub bitrode_time: Vec<f64>,
    pub span: TimeWindow,
    /// Inclusive sample range in the temperature log.
    pub temperature_range: (usize, usize),
    /// Re-synthesized temperature time over `temperature_range`.
    pub temperature_time: Vec<f64>,
    /// Candidate boundaries the window policy chose from.
    pub candidates: Vec<usize>,
}

impl DischargeReport {
    pub fn build(
        rate: Rate,
        bitrode: DischargeLog,
        temperature: TemperatureLog,
        config: &ReportConfig,
    ) -> Result<Self, DataError> {
        let policy = &config.discharge;
        let DischargeWindow {
            time: bitrode_time,
            start_index,
            end_index,
            repetition,
            span,
            ..
        } = bitrode.window(policy)?;
        let TemperatureWindow {
            time: temperature_time,
            start_index: temp_start,
            end_index: temp_end,
            ..
        } = temperature.align(span)?;

        let o = policy.boundary_offset;
        let candidates = bitrode.boundaries[o..o + 4].to_vec();
        let bitrode_range = (start_index, end_index);
        let temperature_range = (temp_start, temp_end);

        Ok(Self {
            rate,
            bitrode,
            temperature,
            repetition,
            bitrode_range,
            bitrode_time,
            span,
            temperature_range,
            temperature_time,
            candidates,
        })
    }

    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("Time at start of first section:\t {:?} s", self.span.start_s),
            format!("Time at end of first section:\t {:?} s", self.span.end_s),
        ]
    }

    pub fn figures(&self) -> Vec<Figure> {
        let dis = self.rate;
        let raw = &self.bitrode;
        let (a, b) = self.bitrode_range;
        let steps: Vec<f64> = self.bitrode_time.windows(2).map(|w| w[1] - w[0]).collect();

        let mut raw_current = Figure::new(
            format!("Bitrode original data {dis} discharge"),
            "Time [s]",
            "Current [A]",
        )
        .line("data", &raw.time, &raw.current)
        .markers("ids", &raw.time, &raw.current, &raw.boundaries);
        let mut raw_voltage = Figure::new(
            format!("Bitrode original data {dis} discharge"),
            "Time [s]",
            "Voltage [V]",
        )
        .line("data", &raw.time, &raw.voltage)
        .markers("ids", &raw.time, &raw.voltage, &raw.boundaries);
        for (k, &id) in self.candidates.iter().enumerate() {
            let name = format!("id{k}");
            raw_current = raw_current.markers(&name, &raw.time, &raw.current, &[id]);
            raw_voltage = raw_voltage.markers(&name, &raw.time, &raw.voltage, &[id]);
        }

        let tc = &self.temperature;
        let (ta, tb) = self.temperature_range;
        let mut temp_raw = Figure::new(
            format!("Temperature original data {dis} discharge"),
            "Time [s]",
            "Temperature [°C]",
        )
        .span(tc.time[ta], tc.time[tb]);
        let mut temp_processed = Figure::new(
            format!("Temperature processed data {dis} discharge"),
            "Time [s]",
            "Temperature [°C]",
        );
        for (k, channel) in tc.channels.iter().enumerate() {
            let name = format!("tc{}", k + 1);
            temp_raw = temp_raw.line(&name, &tc.time, channel);
            temp_processed =
                temp_processed.line(&name, &self.temperature_time, &channel[ta..=tb]);
        }

        vec![
            raw_current,
            raw_voltage,
            Figure::twin(
                format!("Bitrode original data {dis} discharge"),
                "Time [s]",
                "Current [A]",
                "Voltage [V]",
            )
            .line("current", &raw.time, &raw.current)
            .line_right("voltage", &raw.time, &raw.voltage),
            Figure::new(
                format!("Bitrode processed data {dis} discharge"),
                "Item [-]",
                "Time step [s]",
            )
            .scatter("dt", &steps),
            Figure::twin(
                format!("Bitrode processed data {dis} discharge"),
                "Time [s]",
                "Current [A]",
                "Voltage [V]",
            )
            .line("current", &self.bitrode_time, &raw.current[a..=b])
            .line_right("voltage", &self.bitrode_time, &raw.voltage[a..=b]),
            temp_raw,
            temp_processed,
        ]
    }
}
