//! # 数据模型模块
//!
//! 定义晶体结构、化学组成、计算条目和元素周期表数据。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `analysis/` 和 `commands/` 使用
//! - 子模块: structure, composition, entry, element

pub mod composition;
pub mod element;
pub mod entry;
pub mod structure;

pub use composition::Composition;
pub use entry::Entry;
pub use structure::{Atom, Crystal, Lattice};
