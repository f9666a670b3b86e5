//! # fit 命令实现
//!
//! 读取两个 CIF 结构，按给定容差判断是否为同一结构，并给出位移统计。
//!
//! ## 依赖关系
//! - 使用 `cli/fit.rs` 定义的参数
//! - 使用 `parsers/cif.rs`, `analysis/matcher.rs`

use crate::analysis::StructureMatcher;
use crate::cli::fit::FitArgs;
use crate::error::{GsError, Result};
use crate::models::Crystal;
use crate::parsers::parse_cif_file;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 结构概要行
#[derive(Debug, Clone, Tabled)]
struct StructureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "Sites")]
    sites: usize,
    #[tabled(rename = "a, b, c (Å)")]
    lengths: String,
    #[tabled(rename = "α, β, γ (°)")]
    angles: String,
    #[tabled(rename = "V/atom (Å³)")]
    volume: String,
}

impl StructureRow {
    fn new(file: String, crystal: &Crystal) -> Self {
        let (a, b, c, alpha, beta, gamma) = crystal.lattice.parameters();
        StructureRow {
            file,
            formula: crystal.reduced_formula(),
            sites: crystal.num_sites(),
            lengths: format!("{:.3}, {:.3}, {:.3}", a, b, c),
            angles: format!("{:.2}, {:.2}, {:.2}", alpha, beta, gamma),
            volume: crystal
                .volume_per_site()
                .map(|v| format!("{:.3}", v))
                .unwrap_or_default(),
        }
    }
}

/// 执行 fit 命令
pub fn execute(args: FitArgs) -> Result<()> {
    args.tolerance.validate().map_err(GsError::InvalidArgument)?;

    output::print_header("Structure fit");

    let a = parse_cif_file(&args.structure_a)?;
    let b = parse_cif_file(&args.structure_b)?;

    let rows = vec![
        StructureRow::new(args.structure_a.display().to_string(), &a),
        StructureRow::new(args.structure_b.display().to_string(), &b),
    ];
    println!("{}", Table::new(&rows));

    let t = args.tolerance;
    let matcher = StructureMatcher::new(t.ltol, t.stol, t.angle_tol).with_subset(args.allow_subset);
    output::print_info(&format!(
        "ltol = {}, stol = {}, angle_tol = {}°{}",
        t.ltol,
        t.stol,
        t.angle_tol,
        if args.allow_subset { ", subset allowed" } else { "" }
    ));

    match matcher.get_rms_dist(&a, &b) {
        Some(result) => output::print_verdict(
            true,
            &format!(
                "Structures match (rms = {:.4}, max = {:.4})",
                result.rms, result.max_dist
            ),
        ),
        None => output::print_verdict(false, "Structures do not match"),
    }

    Ok(())
}
