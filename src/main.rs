//! # gscompare - 元素基态结构跨泛函比较工具
//!
//! 比较两套 DFT 泛函（如 SCAN 与 GGA）计算得到的元素基态结构，
//! 找出结构不一致的元素，并在元素周期表热图上展示能量差。
//!
//! ## 子命令
//! - `compare` - 完整流程：分组、选基态、多容差扫描、能量差、热图、CIF
//! - `export`  - 仅导出两套数据的基态结构为 CIF
//! - `fit`     - 比较两个 CIF 结构文件
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── analysis/  (分组、基态、结构匹配、扫描)
//!   │     ├── parsers/   (JSON 条目、CIF)
//!   │     ├── plot/      (周期表热图)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod analysis;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod plot;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
