use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::data::align::TEMPERATURE_SAMPLE_INTERVAL_S;
use crate::data::window::DischargeWindowPolicy;

/// Position of the first window candidate among the boundary markers of the
/// recorded Bitrode sessions in the default file map.
pub const RECORDED_BOUNDARY_OFFSET: usize = 2;

// ---------------------------------------------------------------------------
// Discharge rate selector
// ---------------------------------------------------------------------------

/// Constant-discharge rate of a Bitrode/thermocouple file pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Rate {
    #[serde(rename = "1c")]
    #[value(name = "1c")]
    OneC,
    #[serde(rename = "2c")]
    #[value(name = "2c")]
    TwoC,
    #[serde(rename = "3c")]
    #[value(name = "3c")]
    ThreeC,
}

impl Rate {
    pub const ALL: [Rate; 3] = [Rate::OneC, Rate::TwoC, Rate::ThreeC];
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rate::OneC => write!(f, "1C"),
            Rate::TwoC => write!(f, "2C"),
            Rate::ThreeC => write!(f, "3C"),
        }
    }
}

// ---------------------------------------------------------------------------
// File mapping
// ---------------------------------------------------------------------------

/// The two files recorded during one constant-rate discharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DischargeFiles {
    pub bitrode: PathBuf,
    pub temperature: PathBuf,
}

/// Which file feeds which report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub cycle: PathBuf,
    pub hppc: PathBuf,
    pub discharge: BTreeMap<Rate, DischargeFiles>,
}

impl Default for DataFiles {
    fn default() -> Self {
        let pair = |n: u8| DischargeFiles {
            bitrode: PathBuf::from(format!("data/{n}C-Discharge-Bitrode-data.csv")),
            temperature: PathBuf::from(format!("data/Temperature-{n}C-discharge.lvm")),
        };
        Self {
            cycle: PathBuf::from("data/NissanLeaf-cell-Cycling-10C-24C-40C.csv"),
            hppc: PathBuf::from("data/NissanLeaf-cell-Low-Current-HPPC-25C-2.csv"),
            discharge: BTreeMap::from([
                (Rate::OneC, pair(1)),
                (Rate::TwoC, pair(2)),
                (Rate::ThreeC, pair(3)),
            ]),
        }
    }
}

impl DataFiles {
    pub fn discharge(&self, rate: Rate) -> Result<&DischargeFiles> {
        self.discharge
            .get(&rate)
            .with_context(|| format!("no discharge files configured for {rate}"))
    }
}

// ---------------------------------------------------------------------------
// ReportConfig
// ---------------------------------------------------------------------------

/// Everything a report needs besides the files' contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub data_files: DataFiles,
    /// Offset 2 by default. A `discharge` object in a config file fills its
    /// omitted keys from [`DischargeWindowPolicy::default`] (offset 0).
    pub discharge: DischargeWindowPolicy,
    pub temperature_interval_s: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_files: DataFiles::default(),
            discharge: DischargeWindowPolicy {
                boundary_offset: RECORDED_BOUNDARY_OFFSET,
                ..Default::default()
            },
            temperature_interval_s: TEMPERATURE_SAMPLE_INTERVAL_S,
        }
    }
}

impl ReportConfig {
    /// Read a JSON config file; keys left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ReportConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.temperature_interval_s.is_finite() && self.temperature_interval_s > 0.0) {
            bail!(
                "temperature_interval_s must be a positive number, got {}",
                self.temperature_interval_s
            );
        }
        if !self.discharge.current_threshold.is_finite() {
            bail!("discharge.current_threshold must be finite");
        }
        Ok(())
    }
}
