//! # 解析器模块
//!
//! 读取条目 JSON 数据集，读写 CIF 结构文件。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: entries, cif

pub mod cif;
pub mod entries;

pub use cif::{parse_cif_file, write_cif_file};
pub use entries::load_entries;
