//! CSV export of dissonance maps and extremum lists.
//!
//! - 2D maps: one `frequency_hz,dissonance` row per step
//! - 3D maps: a header row of y-axis frequencies, then one row per x-axis
//!   step led by its frequency
//! - Extrema: one `frequency_hz,dissonance` row per entry

use std::io::Write;
use std::path::Path;

use crate::extrema::ExtremumList;
use crate::grid::FrequencyGrid;
use crate::sweep::DissonanceMap;

/// Write a map as CSV, labelling steps with the grid's frequencies.
pub fn write_map_csv<W: Write>(
    mut out: W,
    grid: &FrequencyGrid,
    map: &DissonanceMap,
) -> std::io::Result<()> {
    match map {
        DissonanceMap::TwoD(values) => {
            writeln!(out, "frequency_hz,dissonance")?;
            for (freq, value) in grid.frequencies().zip(values) {
                writeln!(out, "{freq:.6},{value:.9}")?;
            }
        }
        DissonanceMap::ThreeD(rows) => {
            write!(out, "x_hz\\y_hz")?;
            for freq in grid.frequencies() {
                write!(out, ",{freq:.6}")?;
            }
            writeln!(out)?;
            for (freq, row) in grid.frequencies().zip(rows) {
                write!(out, "{freq:.6}")?;
                for value in row {
                    write!(out, ",{value:.9}")?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

/// Export a map to a CSV file.
///
/// # Example
///
/// ```rust,ignore
/// use dismal_core::export::export_map_csv;
///
/// let map = calc.calculate_dissonance_map()?.clone();
/// export_map_csv(&calc.grid()?, &map, "curve.csv")?;
/// ```
pub fn export_map_csv(
    grid: &FrequencyGrid,
    map: &DissonanceMap,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_map_csv(&mut out, grid, map)?;
    out.flush()
}

/// Write extrema as CSV.
pub fn write_extrema_csv<W: Write>(mut out: W, extrema: &ExtremumList) -> std::io::Result<()> {
    writeln!(out, "frequency_hz,dissonance")?;
    for e in extrema {
        writeln!(out, "{:.6},{:.9}", e.frequency, e.dissonance)?;
    }
    Ok(())
}

/// Export extrema to a CSV file.
pub fn export_extrema_csv(extrema: &ExtremumList, path: impl AsRef<Path>) -> std::io::Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_extrema_csv(&mut out, extrema)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrema::Extremum;
    use crate::grid::{FrequencyRange, StepMode};
    use crate::optimize::Direction;

    fn grid(steps: usize) -> FrequencyGrid {
        let range = FrequencyRange::new(100.0, 200.0).unwrap();
        FrequencyGrid::new(range, steps, StepMode::Linear).unwrap()
    }

    #[test]
    fn curve_csv_has_one_row_per_step() {
        let mut out = Vec::new();
        let map = DissonanceMap::TwoD(vec![0.5, 0.25]);
        write_map_csv(&mut out, &grid(2), &map).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "frequency_hz,dissonance\n100.000000,0.500000000\n150.000000,0.250000000\n"
        );
    }

    #[test]
    fn surface_csv_labels_both_axes() {
        let mut out = Vec::new();
        let map = DissonanceMap::ThreeD(vec![vec![0.0, 1.0], vec![2.0, 3.0]]);
        write_map_csv(&mut out, &grid(2), &map).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "x_hz\\y_hz,100.000000,150.000000");
        assert_eq!(lines[2], "150.000000,2.000000000,3.000000000");
    }

    #[test]
    fn extrema_csv() {
        let mut list = ExtremumList::new(Direction::Minimize);
        list.insert(Extremum {
            frequency: 330.0,
            dissonance: 0.125,
        });
        let mut out = Vec::new();
        write_extrema_csv(&mut out, &list).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "frequency_hz,dissonance\n330.000000,0.125000000\n"
        );
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.csv");
        export_map_csv(&grid(2), &DissonanceMap::TwoD(vec![1.0, 2.0]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("frequency_hz,dissonance\n"));
    }
}
