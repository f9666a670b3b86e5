//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `analysis/`, `parsers/`, `plot/`, `utils/`
//! - 子模块: compare, export, fit

pub mod compare;
pub mod export;
pub mod fit;

use crate::analysis::{ground_states_of, GroundStateMap};
use crate::cli::{Commands, DatasetArgs};
use crate::error::Result;
use crate::parsers;
use crate::utils::{output, progress};

use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Compare(args) => compare::execute(args),
        Commands::Export(args) => export::execute(args),
        Commands::Fit(args) => fit::execute(args),
    }
}

/// 读取两套数据集并选出各化学式的基态
pub(crate) fn load_ground_states(datasets: &DatasetArgs) -> Result<(GroundStateMap, GroundStateMap)> {
    let a = load_one(&datasets.dataset_a, &datasets.tag_a)?;
    let b = load_one(&datasets.dataset_b, &datasets.tag_b)?;
    Ok((a, b))
}

fn load_one(path: &Path, tag: &str) -> Result<GroundStateMap> {
    let spinner = progress::create_spinner(&format!("Loading {} entries from {}", tag, path.display()));
    let entries = parsers::load_entries(path);
    spinner.finish_and_clear();
    let entries = entries?;

    let count = entries.len();
    let ground_states = ground_states_of(entries);
    output::print_info(&format!(
        "{}: {} entries, {} formulas ({})",
        tag,
        count,
        ground_states.len(),
        path.display()
    ));
    Ok(ground_states)
}
