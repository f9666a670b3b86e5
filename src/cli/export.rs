//! # export 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/export.rs`

use super::DatasetArgs;

use clap::Args;
use std::path::PathBuf;

/// export 子命令参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub datasets: DatasetArgs,

    /// Root output directory; files go to <OUTPUT>/<TAG>/<FORMULA>_<TAG>.cif
    #[arg(short, long, default_value = "cif_files")]
    pub output: PathBuf,

    /// Keep existing CIF files instead of overwriting them
    #[arg(long, default_value_t = false)]
    pub no_clobber: bool,
}
