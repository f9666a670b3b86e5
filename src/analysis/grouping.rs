//! # 按化学式分组与基态选择
//!
//! - `group_by_formula`: 约化化学式 -> 条目列表（保持输入顺序）
//! - `ground_states`: 每组取每原子能量最低的条目
//!
//! 能量相同时按条目 ID 字典序（无 ID 排最后），再按输入顺序。
//!
//! ## 依赖关系
//! - 被 `analysis/sweep.rs`, `commands/compare.rs`, `commands/export.rs` 使用
//! - 使用 `models/entry.rs`

use crate::models::Entry;

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// 约化化学式 -> 该化学式的全部条目
pub type FormulaGroups = BTreeMap<String, Vec<Entry>>;

/// 约化化学式 -> 基态条目
pub type GroundStateMap = BTreeMap<String, Entry>;

/// 按约化化学式分组
pub fn group_by_formula(entries: impl IntoIterator<Item = Entry>) -> FormulaGroups {
    let mut groups = FormulaGroups::new();
    for entry in entries {
        groups.entry(entry.reduced_formula()).or_default().push(entry);
    }
    groups
}

/// 每个化学式选出基态条目
pub fn ground_states(groups: &FormulaGroups) -> GroundStateMap {
    groups
        .iter()
        .filter_map(|(formula, entries)| {
            select_ground_state(entries).map(|e| (formula.clone(), e.clone()))
        })
        .collect()
}

/// 分组并选基态
pub fn ground_states_of(entries: impl IntoIterator<Item = Entry>) -> GroundStateMap {
    ground_states(&group_by_formula(entries))
}

fn select_ground_state(entries: &[Entry]) -> Option<&Entry> {
    // min_by 在相等时返回第一个，即输入顺序靠前者
    entries.iter().min_by(|a, b| compare_stability(a, b))
}

fn compare_stability(a: &Entry, b: &Entry) -> Ordering {
    a.energy_per_atom()
        .total_cmp(&b.energy_per_atom())
        .then_with(|| match (&a.id, &b.id) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
