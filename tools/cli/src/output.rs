//! Result writers

use std::io::{self, Write};

use gc_pacer::{CycleInput, CycleResult};

/// Column header of the CSV report
pub const CSV_HEADER: &str = "Allocation Rate,Growth Rate,Scan Rate,Scannable Rate,Stack Bytes,R,Live Bytes,Scannable Live Bytes,Goal,Actual Utilization,Target Utilization,Trigger,Peak";

/// Write one CSV row per cycle, pairing each input with its result
///
/// Floats are printed with six decimals.
pub fn write_csv<W: Write>(
    mut out: W,
    cycles: &[CycleInput],
    results: &[CycleResult],
) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for (cycle, result) in cycles.iter().zip(results) {
        writeln!(
            out,
            "{:.6},{:.6},{:.6},{:.6},{},{:.6},{},{},{},{:.6},{:.6},{},{}",
            cycle.alloc_rate,
            cycle.growth_rate,
            cycle.scan_rate,
            cycle.scannable_frac,
            cycle.stack_bytes,
            result.r,
            result.live_bytes,
            result.live_scan_bytes,
            result.goal_bytes,
            result.actual_utilization,
            result.target_utilization,
            result.trigger_point,
            result.peak_bytes,
        )?;
    }
    Ok(())
}

/// Write all results as a single-line JSON array
pub fn write_json<W: Write>(mut out: W, results: &[CycleResult]) -> io::Result<()> {
    serde_json::to_writer(&mut out, results)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> CycleResult {
        CycleResult {
            r: 0.5,
            live_bytes: 100,
            live_scan_bytes: 50,
            goal_bytes: 4194304,
            actual_utilization: 0.25,
            target_utilization: 0.3,
            trigger_point: 3000000,
            peak_bytes: 4000000,
        }
    }

    #[test]
    fn test_csv_row_format() {
        let mut out = Vec::new();
        write_csv(&mut out, &[CycleInput::default()], &[result()]).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "1.000000,1.000000,31.000000,1.000000,8192,0.500000,100,50,4194304,0.250000,0.300000,3000000,4000000"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_json_array() {
        let mut out = Vec::new();
        write_json(&mut out, &[result(), result()]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[{\"r\":0.5,\"live\":100,"));
        assert!(text.ends_with("}]\n"));
    }
}
