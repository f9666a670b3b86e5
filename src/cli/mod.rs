//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `compare`: 两套数据集的基态结构比较（完整流程）
//! - `export`: 导出两套数据集的基态结构为 CIF
//! - `fit`: 比较两个 CIF 结构
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: compare, export, fit

pub mod compare;
pub mod export;
pub mod fit;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// gscompare - 元素基态结构跨泛函比较工具
#[derive(Parser)]
#[command(name = "gscompare")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Compare elemental ground-state structures between two DFT functionals",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compare ground states of two entry sets, plot energy differences and export CIFs
    Compare(compare::CompareArgs),

    /// Export the ground-state structures of both entry sets as CIF files
    Export(export::ExportArgs),

    /// Check whether two CIF structures match under the given tolerances
    Fit(fit::FitArgs),
}

// ─────────────────────────────────────────────────────────────
// 共享参数
// ─────────────────────────────────────────────────────────────

/// 两套条目数据集
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// JSON file with the entries of dataset A (e.g. SCAN)
    #[arg(long, env = "GSCOMPARE_DATASET_A")]
    pub dataset_a: PathBuf,

    /// JSON file with the entries of dataset B (e.g. GGA)
    #[arg(long, env = "GSCOMPARE_DATASET_B")]
    pub dataset_b: PathBuf,

    /// Tag of dataset A, used in file names and table headers
    #[arg(long, default_value = "scan")]
    pub tag_a: String,

    /// Tag of dataset B, used in file names and table headers
    #[arg(long, default_value = "gga")]
    pub tag_b: String,
}

/// 结构匹配容差
#[derive(Args, Debug, Clone, Copy)]
pub struct ToleranceArgs {
    /// Fractional length tolerance
    #[arg(long, default_value_t = 0.2)]
    pub ltol: f64,

    /// Site tolerance, normalized by (V/n)^(1/3)
    #[arg(long, default_value_t = 0.3)]
    pub stol: f64,

    /// Angle tolerance in degrees
    #[arg(long, default_value_t = 5.0)]
    pub angle_tol: f64,
}

impl ToleranceArgs {
    /// 容差必须为正数
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("ltol", self.ltol),
            ("stol", self.stol),
            ("angle-tol", self.angle_tol),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("--{} must be a positive number, got {}", name, value));
            }
        }
        Ok(())
    }
}
