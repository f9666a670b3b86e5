//! # 基态结构比较
//!
//! 分组选基态、结构匹配、多容差扫描与能量差计算。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: grouping, reduction, assignment, matcher, sweep

pub mod assignment;
pub mod grouping;
pub mod matcher;
pub mod reduction;
pub mod sweep;

pub use grouping::{ground_states_of, GroundStateMap};
pub use matcher::StructureMatcher;
pub use sweep::{
    default_configs, energy_differences, persistence_table, sweep, ComparisonReport, EnergyBasis,
    EnergyDiff, EnergyDiffMap, ToleranceConfig,
};
