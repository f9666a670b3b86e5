//! # 比较结果导出
//!
//! 导出能量差表与扫描汇总表为 CSV。
//!
//! ## 支持格式
//! - 能量差: `formula, energy_a, energy_b, diff`
//! - 扫描汇总: `formula, <容差标签>...`，不匹配已消失的格子为 `X`
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 调用
//! - 使用 `analysis/sweep.rs` 的 EnergyDiffMap, ComparisonReport
//! - 使用 `csv` 库写入 CSV 文件

use crate::analysis::{persistence_table, ComparisonReport, EnergyDiffMap};
use crate::error::{GsError, Result};

use std::path::Path;

/// 导出能量差为 CSV
pub fn energy_diffs_to_csv(diffs: &EnergyDiffMap, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(GsError::CsvError)?;

    wtr.write_record(["formula", "energy_a", "energy_b", "diff"])
        .map_err(GsError::CsvError)?;

    for (formula, d) in diffs {
        wtr.write_record([
            formula.clone(),
            format!("{:.6}", d.energy_a),
            format!("{:.6}", d.energy_b),
            format!("{:.6}", d.diff),
        ])
        .map_err(GsError::CsvError)?;
    }

    wtr.flush().map_err(|e| GsError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 扫描汇总格子：该容差下不匹配已消失记为 `X`
pub fn persistence_mark(still_mismatched: bool) -> &'static str {
    if still_mismatched {
        ""
    } else {
        "X"
    }
}

/// 导出扫描汇总为 CSV
pub fn sweep_summary_to_csv(reports: &[ComparisonReport<'_>], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(GsError::CsvError)?;

    let mut header = vec!["formula".to_string()];
    header.extend(reports.iter().map(|r| r.config.label()));
    wtr.write_record(&header).map_err(GsError::CsvError)?;

    for (formula, flags) in persistence_table(reports) {
        let mut row = vec![formula];
        row.extend(flags.iter().map(|&still| persistence_mark(still).to_string()));
        wtr.write_record(&row).map_err(GsError::CsvError)?;
    }

    wtr.flush().map_err(|e| GsError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sweep::EntryPair;
    use crate::analysis::{EnergyDiff, ToleranceConfig};
    use crate::models::{Atom, Crystal, Entry, Lattice};
    use std::collections::BTreeMap;

    #[test]
    fn test_energy_diffs_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diffs.csv");

        let mut diffs = EnergyDiffMap::new();
        diffs.insert(
            "Fe".to_string(),
            EnergyDiff {
                energy_a: -8.2,
                energy_b: -7.9,
                diff: -0.3,
            },
        );
        energy_diffs_to_csv(&diffs, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "formula,energy_a,energy_b,diff");
        assert_eq!(lines[1], "Fe,-8.200000,-7.900000,-0.300000");
    }

    #[test]
    fn test_sweep_summary_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv");

        let reports = vec![
            ComparisonReport {
                config: ToleranceConfig::default(),
                mismatches: BTreeMap::new(),
                matched: vec!["Cu".to_string()],
                only_in_a: vec![],
                only_in_b: vec![],
            },
            ComparisonReport {
                config: ToleranceConfig::new(0.4, 0.6, 10.0, true),
                mismatches: BTreeMap::new(),
                matched: vec!["Cu".to_string()],
                only_in_a: vec![],
                only_in_b: vec![],
            },
        ];
        sweep_summary_to_csv(&reports, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().next(),
            Some("formula,l0.2/s0.3/a5,l0.4/s0.6/a10+sub")
        );
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_sweep_summary_marks_resolved_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv");

        let lattice = Lattice::from_parameters(2.87, 2.87, 2.87, 90.0, 90.0, 90.0);
        let fe_a = Entry::new(
            Crystal::new("Fe", lattice.clone(), vec![Atom::new("Fe", [0.0; 3])]),
            -8.2,
        );
        let fe_b = Entry::new(
            Crystal::new("Fe", lattice, vec![Atom::new("Fe", [0.0; 3])]),
            -7.9,
        );
        let pair = EntryPair {
            entry_a: &fe_a,
            entry_b: &fe_b,
        };

        let reports = vec![
            ComparisonReport {
                config: ToleranceConfig::default(),
                mismatches: BTreeMap::from([("Fe".to_string(), pair)]),
                matched: vec![],
                only_in_a: vec![],
                only_in_b: vec![],
            },
            ComparisonReport {
                config: ToleranceConfig::new(0.4, 0.6, 10.0, true),
                mismatches: BTreeMap::new(),
                matched: vec!["Fe".to_string()],
                only_in_a: vec![],
                only_in_b: vec![],
            },
        ];
        sweep_summary_to_csv(&reports, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().nth(1), Some("Fe,,X"));
    }

    #[test]
    fn test_persistence_mark() {
        assert_eq!(persistence_mark(true), "");
        assert_eq!(persistence_mark(false), "X");
    }
}
