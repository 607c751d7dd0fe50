//! Writes synthetic instrument logs to the default `data/` paths so every
//! report can be run without the recorded files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use battery_windows::config::{DataFiles, Rate};

/// Deterministic measurement noise (splitmix64 + Box-Muller).
struct Noise(u64);

impl Noise {
    fn next_unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normally distributed sample with standard deviation `sigma`.
    fn sample(&mut self, sigma: f64) -> f64 {
        let r = (-2.0 * self.next_unit().max(f64::MIN_POSITIVE).ln()).sqrt();
        r * (std::f64::consts::TAU * self.next_unit()).cos() * sigma
    }
}

// ---------------------------------------------------------------------------
// Cell model
// ---------------------------------------------------------------------------

const CAPACITY_AH: f64 = 33.1;
const R0_OHM: f64 = 0.0012;

/// Open-circuit voltage over state of charge (0..=1).
fn ocv(soc: f64) -> f64 {
    3.0 + 1.2 * soc.clamp(0.0, 1.0) - 0.15 * (-12.0 * soc.clamp(0.0, 1.0)).exp()
}

/// One constant-current phase. Positive current charges.
struct Phase {
    seconds: f64,
    current: f64,
    marker: &'static str,
}

struct Sample {
    time: f64,
    current: f64,
    voltage: f64,
    flag: &'static str,
}

/// Integrate `phases` at a fixed step, flagging the first sample of each.
fn simulate(phases: &[Phase], dt: f64, soc0: f64, noise: &mut Noise) -> Vec<Sample> {
    let mut soc = soc0;
    let mut t = 0.0;
    let mut out = Vec::new();
    for phase in phases {
        let steps = (phase.seconds / dt).round().max(1.0) as usize;
        for k in 0..steps {
            soc += phase.current * dt / 3600.0 / CAPACITY_AH;
            let voltage = ocv(soc) + phase.current * R0_OHM + noise.sample(0.0005);
            out.push(Sample {
                time: t,
                current: phase.current,
                voltage,
                flag: if k == 0 { phase.marker } else { "" },
            });
            t += dt;
        }
    }
    if let Some(last) = out.last_mut() {
        last.flag = "Q";
    }
    out
}

fn phase(seconds: f64, current: f64, marker: &'static str) -> Phase {
    Phase {
        seconds,
        current,
        marker,
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_cycler_csv(path: &Path, samples: &[Sample]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create(path)?);
    writer.write_record(["Time(s)", "Current(A)", "Voltage(V)", "Data"])?;
    for s in samples {
        writer.write_record([
            format!("{:.1}", s.time),
            format!("{:.3}", s.current),
            format!("{:.4}", s.voltage),
            s.flag.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Bitrode layout: 15 unnamed columns; time, current, voltage and flag sit
/// at 1, 8, 9 and 14.
fn write_bitrode_csv(path: &Path, samples: &[Sample]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(create(path)?);
    for (i, s) in samples.iter().enumerate() {
        let mut row = vec![String::new(); 15];
        row[0] = i.to_string();
        row[1] = format!("{:.1}", s.time);
        row[8] = format!("{:.3}", s.current);
        row[9] = format!("{:.4}", s.voltage);
        row[14] = if s.flag == "S" { "S".to_string() } else { String::new() };
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Thermocouple layout: tab separated, no header, elapsed seconds then
/// four temperatures.
fn write_lvm(
    path: &Path,
    duration_s: f64,
    heat: &dyn Fn(f64) -> f64,
    noise: &mut Noise,
) -> Result<()> {
    let mut out = create(path)?;
    let rows = (duration_s / 3.0) as usize;
    for i in 0..rows {
        let t = i as f64 * 3.0;
        let base = 24.0 + heat(t);
        write!(out, "{t:.1}")?;
        for k in 0..4 {
            write!(out, "\t{:.3}", base + 0.3 * k as f64 + noise.sample(0.05))?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

fn cycling(noise: &mut Noise) -> Vec<Sample> {
    let mut phases = vec![phase(1800.0, 0.0, "S")];
    for _ in 0..3 {
        phases.push(phase(3400.0, -CAPACITY_AH * 0.9, "S"));
        phases.push(phase(1800.0, 0.0, "S"));
        phases.push(phase(3600.0, CAPACITY_AH * 0.85, "S"));
        phases.push(phase(1800.0, 0.0, "S"));
    }
    simulate(&phases, 10.0, 0.5, noise)
}

/// Initial charge then ten units of five markers: discharge pulse start,
/// pulse end, charge pulse start, constant discharge start, rest start.
fn hppc(noise: &mut Noise) -> Vec<Sample> {
    let mut phases = vec![phase(3600.0, CAPACITY_AH * 0.5, "S")];
    for _ in 0..10 {
        phases.push(phase(10.0, -CAPACITY_AH, "S"));
        phases.push(phase(40.0, 0.0, "S"));
        phases.push(phase(10.0, CAPACITY_AH * 0.75, "S"));
        phases.push(phase(330.0, -CAPACITY_AH, "S"));
        phases.push(phase(3600.0, 0.0, "S"));
    }
    simulate(&phases, 1.0, 0.5, noise)
}

/// Two conditioning markers, then the recorded sequence. The faster rates
/// add a check pulse, so the main discharge starts at the third marker for
/// 1C and the fourth otherwise; the default window offset of 2 picks it up.
fn discharge(rate: Rate, noise: &mut Noise) -> Vec<Sample> {
    let c = match rate {
        Rate::OneC => 1.0,
        Rate::TwoC => 2.0,
        Rate::ThreeC => 3.0,
    };
    let main = 3300.0 / c;
    let mut phases = vec![
        phase(600.0, 0.0, ""),
        phase(300.0, -CAPACITY_AH * 0.2, "S"),
        phase(600.0, 0.0, "S"),
    ];
    if rate != Rate::OneC {
        phases.push(phase(30.0, -CAPACITY_AH, "S"));
    }
    phases.push(phase(main, -CAPACITY_AH * c, "S"));
    phases.push(phase(1800.0, 0.0, "S"));
    phases.push(phase(3600.0, CAPACITY_AH * 0.9, "S"));
    phases.push(phase(1200.0, 0.0, "S"));
    phases.push(phase(main, -CAPACITY_AH * c, "S"));
    if rate == Rate::OneC {
        phases.push(phase(600.0, 0.0, "S"));
    }
    simulate(&phases, 2.0, 1.0, noise)
}

fn main() -> Result<()> {
    let mut noise = Noise(42);
    let files = DataFiles::default();

    write_cycler_csv(&files.cycle, &cycling(&mut noise))?;
    println!("Wrote {}", files.cycle.display());
    write_cycler_csv(&files.hppc, &hppc(&mut noise))?;
    println!("Wrote {}", files.hppc.display());

    for rate in Rate::ALL {
        let pair = files.discharge(rate)?;
        let samples = discharge(rate, &mut noise);
        let duration = samples.last().map(|s| s.time).unwrap_or(0.0) + 300.0;
        write_bitrode_csv(&pair.bitrode, &samples)?;

        // Cell heating tracks the square of the applied current.
        let heat_log: Vec<(f64, f64)> = samples.iter().map(|s| (s.time, s.current)).collect();
        let heat = move |t: f64| {
            let i = heat_log.partition_point(|&(ts, _)| ts <= t).saturating_sub(1);
            heat_log
                .get(i)
                .map(|&(_, cur)| 0.004 * cur * cur / 10.0)
                .unwrap_or(0.0)
        };
        write_lvm(&pair.temperature, duration, &heat, &mut noise)?;
        println!(
            "Wrote {} and {} ({} samples)",
            pair.bitrode.display(),
            pair.temperature.display(),
            samples.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(samples: &[Sample]) -> Vec<usize> {
        samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.flag == "S")
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn noise_is_deterministic_and_centred() {
        let (mut a, mut b) = (Noise(7), Noise(7));
        let xs: Vec<f64> = (0..2000).map(|_| a.sample(1.0)).collect();
        let ys: Vec<f64> = (0..2000).map(|_| b.sample(1.0)).collect();
        assert_eq!(xs, ys);
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        assert!(mean.abs() < 0.1);
    }

    #[test]
    fn default_offset_frames_the_main_discharge() {
        for rate in Rate::ALL {
            let samples = discharge(rate, &mut Noise(1));
            let ids = markers(&samples);
            assert!(ids.len() >= 6);
            // First repetition for 1C (markers 2..4), second otherwise (3..5).
            let start = if rate == Rate::OneC { ids[2] } else { ids[3] };
            let main = samples[start].current;
            assert!(samples.iter().all(|s| s.current >= main));
            assert_eq!(samples[start + 1].current, main);
        }
    }
}
