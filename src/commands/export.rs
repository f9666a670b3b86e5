//! # export 命令实现
//!
//! 把两套数据集的基态结构写成 CIF：`<root>/<tag>/<formula>_<tag>.cif`。
//! 已存在的文件默认覆盖，`--no-clobber` 时跳过。
//!
//! ## 依赖关系
//! - 使用 `cli/export.rs` 定义的参数
//! - 被 `commands/compare.rs` 复用
//! - 使用 `parsers/cif.rs`, `utils/output.rs`

use super::load_ground_states;
use crate::analysis::GroundStateMap;
use crate::cli::export::ExportArgs;
use crate::error::{GsError, Result};
use crate::parsers::write_cif_file;
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 一次导出的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub skipped: usize,
}

/// 执行 export 命令
pub fn execute(args: ExportArgs) -> Result<()> {
    output::print_header(&format!(
        "Exporting ground states: {} / {}",
        args.datasets.tag_a, args.datasets.tag_b
    ));

    let (gs_a, gs_b) = load_ground_states(&args.datasets)?;
    export_both(&gs_a, &gs_b, &args.datasets.tag_a, &args.datasets.tag_b, &args.output, args.no_clobber)
}

/// 导出两套基态并打印汇总
pub(crate) fn export_both(
    gs_a: &GroundStateMap,
    gs_b: &GroundStateMap,
    tag_a: &str,
    tag_b: &str,
    root: &Path,
    no_clobber: bool,
) -> Result<()> {
    let mut total = ExportSummary::default();
    for (gs, tag) in [(gs_a, tag_a), (gs_b, tag_b)] {
        let summary = export_ground_states(gs, tag, root, no_clobber)?;
        total.written += summary.written;
        total.skipped += summary.skipped;
    }

    output::print_done(&format!(
        "Wrote {} CIF file(s) under '{}' ({} skipped)",
        total.written,
        root.display(),
        total.skipped
    ));
    Ok(())
}

/// CIF 输出路径
pub fn cif_path(root: &Path, tag: &str, formula: &str) -> PathBuf {
    root.join(tag).join(format!("{}_{}.cif", formula, tag))
}

/// 导出一套基态结构
pub fn export_ground_states(
    ground_states: &GroundStateMap,
    tag: &str,
    root: &Path,
    no_clobber: bool,
) -> Result<ExportSummary> {
    let dir = root.join(tag);
    fs::create_dir_all(&dir).map_err(|e| GsError::FileWriteError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut summary = ExportSummary::default();
    for (formula, entry) in ground_states {
        let path = cif_path(root, tag, formula);
        if no_clobber && path.exists() {
            output::print_skip(&format!("{} exists", path.display()));
            summary.skipped += 1;
            continue;
        }

        write_cif_file(&entry.structure, &path)?;
        output::print_written(&format!("{} ({})", formula, tag), &path.display().to_string());
        summary.written += 1;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ground_states_of;
    use crate::models::{Atom, Crystal, Entry, Lattice};
    use crate::parsers::parse_cif_file;

    fn ground_states() -> GroundStateMap {
        let lattice = Lattice::from_parameters(2.87, 2.87, 2.87, 90.0, 90.0, 90.0);
        let fe = Crystal::new(
            "mp-13",
            lattice.clone(),
            vec![Atom::new("Fe", [0.0; 3]), Atom::new("Fe", [0.5, 0.5, 0.5])],
        );
        let o = Crystal::new(
            "mp-12957",
            lattice,
            vec![Atom::new("O", [0.0; 3]), Atom::new("O", [0.2, 0.0, 0.0])],
        );
        ground_states_of(vec![Entry::new(fe, -16.4), Entry::new(o, -9.8)])
    }

    #[test]
    fn test_cif_path() {
        let path = cif_path(Path::new("cif_files"), "scan", "Fe");
        assert_eq!(path, Path::new("cif_files/scan/Fe_scan.cif"));
    }

    #[test]
    fn test_export_one_file_per_structure() {
        let dir = tempfile::tempdir().unwrap();
        let summary = export_ground_states(&ground_states(), "scan", dir.path(), false).unwrap();
        assert_eq!(summary, ExportSummary { written: 2, skipped: 0 });

        let mut names: Vec<String> = fs::read_dir(dir.path().join("scan"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["Fe_scan.cif", "O2_scan.cif"]);

        let fe = parse_cif_file(&cif_path(dir.path(), "scan", "Fe")).unwrap();
        assert_eq!(fe.num_sites(), 2);
    }

    #[test]
    fn test_existing_files_overwritten_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let stale = cif_path(dir.path(), "gga", "Fe");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "stale").unwrap();

        let summary = export_ground_states(&ground_states(), "gga", dir.path(), false).unwrap();
        assert_eq!(summary, ExportSummary { written: 2, skipped: 0 });
        let fe = parse_cif_file(&stale).unwrap();
        assert_eq!(fe.num_sites(), 2);
    }

    #[test]
    fn test_no_clobber_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let gs = ground_states();
        export_ground_states(&gs, "gga", dir.path(), false).unwrap();

        let again = export_ground_states(&gs, "gga", dir.path(), true).unwrap();
        assert_eq!(again, ExportSummary { written: 0, skipped: 2 });
    }
}
