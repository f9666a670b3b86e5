//! # compare 子命令 CLI 定义
//!
//! 完整比较流程的参数：数据集、扫描容差、能量差口径、热图、CSV、CIF 导出。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compare.rs`

use super::{DatasetArgs, ToleranceArgs};

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 热图色带
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ColormapChoice {
    /// Red-yellow-blue (ColorBrewer Spectral)
    #[default]
    Spectral,
    /// Blue-gray-red diverging map
    Coolwarm,
}

/// compare 子命令参数
#[derive(Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub datasets: DatasetArgs,

    // 基础容差，扫描时按 9 种组合加倍
    #[command(flatten)]
    pub tolerance: ToleranceArgs,

    /// Sweep configuration whose mismatches feed the energy differences (default: last)
    #[arg(long)]
    pub config_index: Option<usize>,

    /// Report per-atom energy differences instead of total energies
    #[arg(long, default_value_t = false)]
    pub per_atom: bool,

    /// Output path of the periodic-table heatmap (.png or .svg)
    #[arg(long, default_value = "energy_heatmap.png")]
    pub heatmap: PathBuf,

    /// Skip heatmap generation
    #[arg(long, default_value_t = false)]
    pub no_plot: bool,

    /// Heatmap color map
    #[arg(long, value_enum, default_value = "spectral")]
    pub cmap: ColormapChoice,

    /// Write the energy differences to this CSV file
    #[arg(long)]
    pub diff_csv: Option<PathBuf>,

    /// Write the sweep summary to this CSV file
    #[arg(long)]
    pub sweep_csv: Option<PathBuf>,

    /// Root directory for exported CIF files
    #[arg(long, default_value = "cif_files")]
    pub cif_dir: PathBuf,

    /// Skip CIF export
    #[arg(long, default_value_t = false)]
    pub no_cif: bool,

    /// Keep existing CIF files instead of overwriting them
    #[arg(long, default_value_t = false)]
    pub no_clobber: bool,

    /// Number of parallel jobs (0 = number of CPU cores)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
