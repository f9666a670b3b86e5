//! # 绘图与导出
//!
//! 周期表热图、色带，以及比较结果的 CSV 导出。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 使用
//! - 子模块: colormap, heatmap, export

pub mod colormap;
pub mod export;
pub mod heatmap;

pub use colormap::Colormap;
pub use heatmap::{generate_heatmap, HeatmapOptions};
