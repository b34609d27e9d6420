//! Plain-text result tables.

use crate::error::{AppError, AppResult};
use gd_sim::Trajectory;
use gd_stability::Mode;
use nalgebra::DMatrix;
use std::io;
use std::iter;

/// CSV with a `time` column followed by one column per variable slot.
///
/// Names containing delimiters or quotes are quoted.
pub fn write_trajectory_csv<W: io::Write>(
    writer: W,
    trajectory: &Trajectory,
    names: &[String],
) -> AppResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(iter::once("time").chain(names.iter().map(String::as_str)))?;
    for (i, t) in trajectory.times().iter().enumerate() {
        let Some(z) = trajectory.vars_at(i) else {
            continue;
        };
        csv.write_record(iter::once(t.to_string()).chain(z.iter().map(f64::to_string)))?;
    }
    csv.flush()?;
    Ok(())
}

/// [`write_trajectory_csv`] into a string.
pub fn trajectory_csv(trajectory: &Trajectory, names: &[String]) -> AppResult<String> {
    let mut buf = Vec::new();
    write_trajectory_csv(&mut buf, trajectory, names)?;
    String::from_utf8(buf).map_err(|e| AppError::InvalidInput(e.to_string()))
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// One row per mode: eigenvalue, damping ratio, frequency and dominant state.
pub fn modes_table(modes: &[Mode], state_names: &[String]) -> String {
    let mut out = format!(
        "{:>5} {:>14} {:>14} {:>10} {:>10}  {}\n",
        "mode", "real", "imag", "damping", "freq_hz", "dominant state"
    );
    for mode in modes {
        let state = state_names
            .get(mode.dominant_state)
            .map(String::as_str)
            .unwrap_or("?");
        out.push_str(&format!(
            "{:>5} {:>14.6} {:>14.6} {:>10} {:>10}  {} ({:.3})\n",
            mode.index + 1,
            mode.real,
            mode.imag,
            optional(mode.damping_ratio, 4),
            optional(mode.frequency_hz, 4),
            state,
            mode.dominant_participation,
        ));
    }
    out
}

/// Participation factors with one row per state and one column per mode.
pub fn participation_table(participation: &DMatrix<f64>, state_names: &[String]) -> String {
    let width = state_names.iter().map(String::len).max().unwrap_or(5).max(5);
    let mut out = format!("{:<width$}", "state");
    for k in 0..participation.ncols() {
        out.push_str(&format!(" {:>8}", format!("m{}", k + 1)));
    }
    out.push('\n');
    for (i, row) in participation.row_iter().enumerate() {
        let name = state_names.get(i).map(String::as_str).unwrap_or("?");
        out.push_str(&format!("{name:<width$}"));
        for v in row.iter() {
            out.push_str(&format!(" {v:>8.4}"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participation_table_has_one_row_per_state() {
        let pf = DMatrix::from_row_slice(2, 2, &[0.75, 0.25, 0.25, 0.75]);
        let names = vec!["g1.delta".to_string(), "g1.omega".to_string()];
        let table = participation_table(&pf, &names);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("m1") && lines[0].contains("m2"));
        assert!(lines[1].starts_with("g1.delta"));
        assert!(lines[1].contains("0.7500"));
    }

    #[test]
    fn modes_table_marks_missing_frequency() {
        let modes = vec![Mode {
            index: 0,
            real: -2.0,
            imag: 0.0,
            damping_ratio: Some(1.0),
            frequency_hz: None,
            dominant_state: 0,
            dominant_participation: 1.0,
        }];
        let table = modes_table(&modes, &["x".to_string()]);
        let row = table.lines().nth(1).unwrap();
        assert!(row.contains(" - "));
        assert!(row.contains("x (1.000)"));
    }
}
