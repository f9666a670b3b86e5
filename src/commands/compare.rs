//! # compare 命令实现
//!
//! 完整比较流程。
//!
//! ## 功能
//! - 读取两套条目，按化学式分组并选出基态
//! - 在 9 组逐步放宽的容差下比较基态结构（rayon 并行）
//! - 打印各组容差的匹配统计与不匹配项汇总
//! - 计算所选容差组下不匹配化学式的能量差 E(A) - E(B)
//! - 绘制周期表热图，可选导出 CSV
//! - 导出全部基态结构为 CIF
//!
//! ## 依赖关系
//! - 使用 `cli/compare.rs` 定义的参数
//! - 使用 `analysis/`, `plot/`, `commands/export.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use super::export::export_both;
use super::load_ground_states;
use crate::analysis::{
    default_configs, energy_differences, persistence_table, sweep, ComparisonReport, EnergyBasis,
    EnergyDiffMap,
};
use crate::cli::compare::{ColormapChoice, CompareArgs};
use crate::error::{GsError, Result};
use crate::plot::export::{self as report_csv, persistence_mark};
use crate::plot::{self, Colormap, HeatmapOptions};
use crate::utils::{output, progress};

use std::collections::BTreeMap;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

/// 容差组统计行
#[derive(Debug, Clone, Tabled)]
struct ConfigRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ltol")]
    ltol: f64,
    #[tabled(rename = "stol")]
    stol: f64,
    #[tabled(rename = "angle_tol")]
    angle_tol: f64,
    #[tabled(rename = "Subset")]
    subset: String,
    #[tabled(rename = "Compared")]
    compared: usize,
    #[tabled(rename = "Matched")]
    matched: usize,
    #[tabled(rename = "Mismatched")]
    mismatched: usize,
}

impl From<ColormapChoice> for Colormap {
    fn from(choice: ColormapChoice) -> Self {
        match choice {
            ColormapChoice::Spectral => Colormap::Spectral,
            ColormapChoice::Coolwarm => Colormap::Coolwarm,
        }
    }
}

/// 执行 compare 命令
pub fn execute(args: CompareArgs) -> Result<()> {
    args.tolerance.validate().map_err(GsError::InvalidArgument)?;

    let tags = &args.datasets;
    output::print_header(&format!(
        "Ground-state comparison: {} vs {}",
        tags.tag_a, tags.tag_b
    ));

    let t = args.tolerance;
    let configs = default_configs(t.ltol, t.stol, t.angle_tol);
    let selected = args.config_index.unwrap_or(configs.len() - 1);
    if selected >= configs.len() {
        return Err(GsError::InvalidArgument(format!(
            "--config-index {} out of range (0..{})",
            selected,
            configs.len()
        )));
    }

    let (gs_a, gs_b) = load_ground_states(tags)?;

    // 设置并行度
    let num_threads = if args.jobs == 0 {
        num_cpus::get()
    } else {
        args.jobs
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok();

    let pb = progress::create_progress_bar(configs.len() as u64, "Sweeping tolerances");
    let reports = sweep(&gs_a, &gs_b, &configs, |_| pb.inc(1));
    pb.finish_and_clear();

    if let Some(first) = reports.first() {
        report_missing(first, &tags.tag_a, &tags.tag_b);
    }

    print_config_table(&reports);
    print_persistence_table(&reports);

    let report = &reports[selected];
    let basis = if args.per_atom {
        EnergyBasis::PerAtom
    } else {
        EnergyBasis::Total
    };
    let diffs = energy_differences(report, basis);

    output::print_separator();
    output::print_info(&format!(
        "Energy differences from configuration #{} ({})",
        selected,
        report.config.label()
    ));

    if diffs.is_empty() {
        output::print_success("No structural mismatches under the selected configuration");
    } else {
        print_diff_table(report, &diffs, &tags.tag_a, &tags.tag_b, basis);
    }

    if let Some(path) = &args.diff_csv {
        report_csv::energy_diffs_to_csv(&diffs, path)?;
        output::print_success(&format!("Energy differences saved to {}", path.display()));
    }

    if let Some(path) = &args.sweep_csv {
        report_csv::sweep_summary_to_csv(&reports, path)?;
        output::print_success(&format!("Sweep summary saved to {}", path.display()));
    }

    if args.no_plot {
        output::print_skip("Heatmap generation disabled");
    } else if diffs.is_empty() {
        output::print_skip("Heatmap not drawn: no energy differences");
    } else {
        let values: BTreeMap<String, f64> =
            diffs.iter().map(|(f, d)| (f.clone(), d.diff)).collect();
        let options = HeatmapOptions {
            title: format!("E({}) - E({})", tags.tag_a, tags.tag_b),
            value_label: match basis {
                EnergyBasis::Total => "ΔE (eV)".to_string(),
                EnergyBasis::PerAtom => "ΔE (eV/atom)".to_string(),
            },
            colormap: args.cmap.into(),
            ..HeatmapOptions::default()
        };

        output::print_info(&format!("Rendering heatmap ({} colormap)", options.colormap));
        let skipped = plot::generate_heatmap(&values, &args.heatmap, &options)?;
        for formula in &skipped {
            output::print_warning(&format!(
                "{} is not a single element; left out of the heatmap",
                formula
            ));
        }
        output::print_success(&format!("Heatmap saved to {}", args.heatmap.display()));
    }

    if args.no_cif {
        output::print_skip("CIF export disabled");
    } else {
        output::print_separator();
        export_both(
            &gs_a,
            &gs_b,
            &tags.tag_a,
            &tags.tag_b,
            &args.cif_dir,
            args.no_clobber,
        )?;
    }

    output::print_done(&format!(
        "{} mismatched formula(s) under configuration #{}",
        report.mismatches.len(),
        selected
    ));

    Ok(())
}

/// 只在一套数据中出现的化学式
fn report_missing(report: &ComparisonReport<'_>, tag_a: &str, tag_b: &str) {
    for (formulas, present, absent) in [
        (&report.only_in_a, tag_a, tag_b),
        (&report.only_in_b, tag_b, tag_a),
    ] {
        if !formulas.is_empty() {
            output::print_warning(&format!(
                "{} formula(s) only in {} (missing from {}): {}",
                formulas.len(),
                present,
                absent,
                formulas.join(", ")
            ));
        }
    }
}

fn print_config_table(reports: &[ComparisonReport<'_>]) {
    let rows: Vec<ConfigRow> = reports
        .iter()
        .enumerate()
        .map(|(index, r)| ConfigRow {
            index,
            ltol: r.config.ltol,
            stol: r.config.stol,
            angle_tol: r.config.angle_tol,
            subset: if r.config.allow_subset { "yes" } else { "no" }.to_string(),
            compared: r.num_compared(),
            matched: r.matched.len(),
            mismatched: r.mismatches.len(),
        })
        .collect();

    println!("{}", Table::new(&rows));
}

/// 第一组容差下的不匹配项在哪些容差下消失
fn print_persistence_table(reports: &[ComparisonReport<'_>]) {
    let table = persistence_table(reports);
    if table.is_empty() {
        return;
    }

    let mut builder = Builder::default();
    let mut header = vec!["Formula".to_string()];
    header.extend((0..reports.len()).map(|i| format!("#{}", i)));
    builder.push_record(header);

    for (formula, flags) in table {
        let mut row = vec![formula];
        row.extend(flags.iter().map(|&still| persistence_mark(still).to_string()));
        builder.push_record(row);
    }

    println!();
    output::print_info("Mismatches under #0 and where they resolve (X = structures match):");
    println!("{}", builder.build());
}

/// 不匹配化学式的两个基态条目与能量差
fn print_diff_table(
    report: &ComparisonReport<'_>,
    diffs: &EnergyDiffMap,
    tag_a: &str,
    tag_b: &str,
    basis: EnergyBasis,
) {
    let ids: BTreeMap<&str, (&str, &str)> = report
        .mismatches
        .iter()
        .map(|(f, pair)| (f.as_str(), (pair.entry_a.label(), pair.entry_b.label())))
        .collect();

    let unit = match basis {
        EnergyBasis::Total => "eV",
        EnergyBasis::PerAtom => "eV/atom",
    };

    let mut builder = Builder::default();
    builder.push_record([
        "Formula".to_string(),
        format!("ID({})", tag_a),
        format!("ID({})", tag_b),
        format!("E({}) ({})", tag_a, unit),
        format!("E({}) ({})", tag_b, unit),
        format!("ΔE ({})", unit),
    ]);
    for (formula, d) in diffs {
        let (id_a, id_b) = ids
            .get(formula.as_str())
            .copied()
            .unwrap_or(("-", "-"));
        builder.push_record([
            formula.clone(),
            id_a.to_string(),
            id_b.to_string(),
            format!("{:.4}", d.energy_a),
            format!("{:.4}", d.energy_b),
            format!("{:+.4}", d.diff),
        ]);
    }
    println!("{}", builder.build());
}
