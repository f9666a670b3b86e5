//! # 工具函数模块
//!
//! 提供美化输出、进度条和 3x3 线性代数等工具。
//!
//! ## 依赖关系
//! - 被 `commands/`, `analysis/`, `models/` 使用
//! - 子模块: output, progress, linalg

pub mod linalg;
pub mod output;
pub mod progress;
