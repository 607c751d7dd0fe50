use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};

use super::align::synthesize_time;
use super::error::{DataError, Result};
use super::model::{CycleLog, DischargeLog, Flag, TemperatureLog};
use super::segment::find_boundary_indices;

// ---------------------------------------------------------------------------
// Column layouts
// ---------------------------------------------------------------------------

/// Where a column lives in a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Header name (file must have a header row).
    Named(&'static str),
    /// Zero-based field position.
    At(usize),
}

/// Declared layout of one instrument's export format.
#[derive(Debug, Clone)]
pub struct Layout {
    pub delimiter: u8,
    pub has_headers: bool,
    /// Numeric channels, in output order.
    pub numeric: Vec<Column>,
    /// State-flag channel, if the format carries one.
    pub flags: Option<Column>,
}

impl Layout {
    /// Cycler export: header row, `Time(s)`, `Current(A)`, `Voltage(V)`, `Data`.
    pub fn cycle() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            numeric: vec![
                Column::Named("Time(s)"),
                Column::Named("Current(A)"),
                Column::Named("Voltage(V)"),
            ],
            flags: Some(Column::Named("Data")),
        }
    }

    /// Bitrode export: no header, time/current/voltage/flag at 1, 8, 9, 14.
    pub fn discharge() -> Self {
        Self {
            delimiter: b',',
            has_headers: false,
            numeric: vec![Column::At(1), Column::At(8), Column::At(9)],
            flags: Some(Column::At(14)),
        }
    }

    /// Thermocouple logger export: tab separated, no header, channels 1–4.
    pub fn temperature() -> Self {
        Self {
            delimiter: b'\t',
            has_headers: false,
            numeric: vec![Column::At(1), Column::At(2), Column::At(3), Column::At(4)],
            flags: None,
        }
    }
}

/// Parallel channels read from one file.
#[derive(Debug, Clone, Default)]
pub struct FlaggedSeries {
    pub numeric: Vec<Vec<f64>>,
    /// Empty when the layout has no flag column.
    pub flags: Vec<Flag>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a cycle or HPPC log.
pub fn load_cycle_log(path: &Path) -> Result<CycleLog> {
    let FlaggedSeries { numeric, flags } = read_flagged_series(path, &Layout::cycle())?;
    let [time, current, voltage] = into_array::<3>(path, numeric)?;
    info!("loaded cycle log {} ({} samples)", path.display(), time.len());
    Ok(CycleLog {
        source: path.to_path_buf(),
        time,
        current,
        voltage,
        flags,
    })
}

/// Load a Bitrode discharge log. The flag column is reduced to its boundary
/// positions here and then dropped.
pub fn load_discharge_log(path: &Path) -> Result<DischargeLog> {
    let FlaggedSeries { numeric, flags } = read_flagged_series(path, &Layout::discharge())?;
    let [time, current, voltage] = into_array::<3>(path, numeric)?;
    let boundaries = find_boundary_indices(&flags);
    info!(
        "loaded discharge log {} ({} samples, {} boundary markers)",
        path.display(),
        time.len(),
        boundaries.len()
    );
    Ok(DischargeLog {
        source: path.to_path_buf(),
        time,
        current,
        voltage,
        boundaries,
    })
}

/// Load a thermocouple log and synthesize its time axis.
pub fn load_temperature_log(path: &Path, interval_s: f64) -> Result<TemperatureLog> {
    let FlaggedSeries { numeric, .. } = read_flagged_series(path, &Layout::temperature())?;
    let channels: [Vec<f64>; 4] = into_array(path, numeric)?;
    let time = synthesize_time(channels[0].len(), interval_s);
    info!(
        "loaded temperature log {} ({} samples at {interval_s} s)",
        path.display(),
        time.len()
    );
    Ok(TemperatureLog {
        source: path.to_path_buf(),
        channels,
        time,
        interval_s,
    })
}

// ---------------------------------------------------------------------------
// Flagged-series reader
// ---------------------------------------------------------------------------

/// Read the columns named by `layout` from a delimited file.
///
/// Every row must provide every numeric column; an empty numeric cell reads
/// as NaN. A missing or empty flag cell reads as [`Flag::Blank`].
pub fn read_flagged_series(path: &Path, layout: &Layout) -> Result<FlaggedSeries> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .has_headers(layout.has_headers)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers = if layout.has_headers {
        Some(reader.headers().map_err(|e| DataError::csv(path, e))?.clone())
    } else {
        None
    };
    let numeric_at: Vec<usize> = layout
        .numeric
        .iter()
        .map(|c| resolve(path, headers.as_ref(), *c))
        .collect::<Result<_>>()?;
    let flag_at = layout
        .flags
        .map(|c| resolve(path, headers.as_ref(), c))
        .transpose()?;

    let mut series = FlaggedSeries {
        numeric: vec![Vec::new(); numeric_at.len()],
        flags: Vec::new(),
    };

    let mut record = StringRecord::new();
    let mut row = 0usize;
    while reader
        .read_record(&mut record)
        .map_err(|e| DataError::csv(path, e))?
    {
        row += 1;
        for (channel, &col) in series.numeric.iter_mut().zip(&numeric_at) {
            let cell = record.get(col).ok_or_else(|| {
                DataError::format(
                    path,
                    format!("row {row} has {} fields, column {col} is missing", record.len()),
                )
            })?;
            channel.push(parse_number(path, row, col, cell)?);
        }
        if let Some(col) = flag_at {
            let flag = Flag::from_cell(record.get(col).unwrap_or(""));
            if matches!(flag, Flag::Other(_)) {
                debug!("{}: row {row}: unrecognized flag '{flag}'", path.display());
            }
            series.flags.push(flag);
        }
    }

    debug!("{}: read {row} rows", path.display());
    Ok(series)
}

fn resolve(path: &Path, headers: Option<&StringRecord>, column: Column) -> Result<usize> {
    match (column, headers) {
        (Column::At(i), _) => Ok(i),
        (Column::Named(name), Some(headers)) => headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::format(path, format!("missing '{name}' column"))),
        (Column::Named(name), None) => Err(DataError::format(
            path,
            format!("column '{name}' requested from a file without headers"),
        )),
    }
}

fn parse_number(path: &Path, row: usize, col: usize, cell: &str) -> Result<f64> {
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| {
        DataError::format(path, format!("row {row}, column {col}: '{cell}' is not a number"))
    })
}

fn into_array<const N: usize>(path: &Path, columns: Vec<Vec<f64>>) -> Result<[Vec<f64>; N]> {
    let lens: Vec<usize> = columns.iter().map(Vec::len).collect();
    if lens.windows(2).any(|w| w[0] != w[1]) {
        return Err(DataError::format(
            path,
            format!("channel lengths disagree: {lens:?}"),
        ));
    }
    columns.try_into().map_err(|cols: Vec<Vec<f64>>| {
        DataError::format(path, format!("expected {N} channels, read {}", cols.len()))
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn cycle_columns_by_header() {
        let f = write(
            "Step,Time(s),Voltage(V),Current(A),Data\n\
             1,0.0,4.10,0.0,\n\
             1,1.0,4.05,-2.5,S\n\
             2,2.0,4.00,-2.5, \n\
             2,3.0,3.95,0.0,Q\n",
        );
        let log = load_cycle_log(f.path()).unwrap();
        assert_eq!(log.time, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(log.current, vec![0.0, -2.5, -2.5, 0.0]);
        assert_eq!(log.voltage[3], 3.95);
        assert_eq!(
            log.flags,
            vec![Flag::Blank, Flag::Boundary, Flag::Blank, Flag::Terminal]
        );
    }

    #[test]
    fn cycle_missing_column_is_format_error() {
        let f = write("Time(s),Current(A),Data\n0,1,S\n");
        let err = load_cycle_log(f.path()).unwrap_err();
        assert!(matches!(err, DataError::Format { .. }));
        assert!(err.to_string().contains("Voltage(V)"));
        assert!(err.is_fatal());
    }

    #[test]
    fn discharge_positional_columns() {
        let row = |t: f64, i: f64, v: f64, flag: &str| {
            format!("0,{t},x,x,x,x,x,x,{i},{v},x,x,x,x,{flag}\n")
        };
        let mut text = String::new();
        text += &row(0.0, 0.0, 4.1, "");
        text += &row(1.0, -20.0, 4.0, "S");
        text += &row(2.0, -20.0, 3.9, "");
        text += &row(3.0, 0.0, 3.95, "S");
        let f = write(&text);
        let log = load_discharge_log(f.path()).unwrap();
        assert_eq!(log.time, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(log.current[1], -20.0);
        assert_eq!(log.voltage[2], 3.9);
        assert_eq!(log.boundaries, vec![1, 3]);
    }

    #[test]
    fn short_row_is_format_error() {
        let f = write("0,1,x,x,x,x,x,x,-1,4.0,x,x,x,x,S\n0,2,x,x\n");
        let err = load_discharge_log(f.path()).unwrap_err();
        match err {
            DataError::Format { message, .. } => assert!(message.contains("row 2")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_trailing_flag_cell_reads_blank() {
        let f = write("0,1,x,x,x,x,x,x,-1,4.0\n0,2,x,x,x,x,x,x,-1,4.0,x,x,x,x,S\n");
        let log = load_discharge_log(f.path()).unwrap();
        assert_eq!(log.boundaries, vec![1]);
    }

    #[test]
    fn unknown_flag_text_is_kept() {
        let f = write("Time(s),Current(A),Voltage(V),Data\n0,0,4.1,S\n1,0,4.1,R\n");
        let log = load_cycle_log(f.path()).unwrap();
        assert_eq!(log.flags[1], Flag::Other("R".into()));
        assert_eq!(log.flags[1].to_string(), "R");
    }

    #[test]
    fn temperature_time_is_synthesized() {
        let f = write("0\t21.0\t22.0\t23.0\t24.0\n1\t21.5\t22.5\t23.5\t24.5\n2\t22.0\t23.0\t24.0\t25.0\n");
        let log = load_temperature_log(f.path(), 3.0).unwrap();
        assert_eq!(log.time, vec![0.0, 3.0, 6.0]);
        assert_eq!(log.channels[0], vec![21.0, 21.5, 22.0]);
        assert_eq!(log.channels[3][2], 25.0);
    }

    #[test]
    fn non_numeric_cell_is_format_error() {
        let f = write("0\t21.0\tbad\t23.0\t24.0\n");
        let err = load_temperature_log(f.path(), 3.0).unwrap_err();
        assert!(err.to_string().contains("'bad' is not a number"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_cycle_log(Path::new("/nonexistent/cells.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/cells.csv"));
    }
}
