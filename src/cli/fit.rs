//! # fit 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fit.rs`

use super::ToleranceArgs;

use clap::Args;
use std::path::PathBuf;

/// fit 子命令参数
#[derive(Args, Debug)]
pub struct FitArgs {
    /// First CIF file
    pub structure_a: PathBuf,

    /// Second CIF file
    pub structure_b: PathBuf,

    #[command(flatten)]
    pub tolerance: ToleranceArgs,

    /// Allow the smaller structure to match a subset of the larger one
    #[arg(long, default_value_t = false)]
    pub allow_subset: bool,
}
