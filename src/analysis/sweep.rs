//! # 多容差扫描与能量差
//!
//! - `find_mismatches`: 单一容差下比较两组基态，收集结构不匹配的化学式
//! - `sweep`: 依次在多组容差下比较（组内用 rayon 并行）
//! - `energy_differences`: 不匹配化学式的能量差 E(A) - E(B)
//! - `persistence_table`: 第一组容差下的不匹配项在各组容差下是否仍不匹配
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs`, `plot/` 使用
//! - 使用 `analysis/matcher.rs`, `analysis/grouping.rs`
//! - 使用 `rayon` 并行比较

use super::grouping::GroundStateMap;
use super::matcher::StructureMatcher;
use crate::models::Entry;

use rayon::prelude::*;
use std::collections::BTreeMap;

/// 一组匹配容差
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceConfig {
    pub ltol: f64,
    pub stol: f64,
    pub angle_tol: f64,
    pub allow_subset: bool,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        ToleranceConfig::new(0.2, 0.3, 5.0, false)
    }
}

impl ToleranceConfig {
    pub fn new(ltol: f64, stol: f64, angle_tol: f64, allow_subset: bool) -> Self {
        ToleranceConfig {
            ltol,
            stol,
            angle_tol,
            allow_subset,
        }
    }

    /// 表头用的简短标签，如 `l0.2/s0.3/a5`，子集模式加 `+sub`
    pub fn label(&self) -> String {
        let mut label = format!("l{}/s{}/a{}", self.ltol, self.stol, self.angle_tol);
        if self.allow_subset {
            label.push_str("+sub");
        }
        label
    }
}

/// 由基础容差生成默认的 9 组扫描配置，逐步放宽
pub fn default_configs(ltol: f64, stol: f64, angle_tol: f64) -> Vec<ToleranceConfig> {
    let (l, s, a) = (ltol, stol, angle_tol);
    vec![
        ToleranceConfig::new(l, s, a, false),
        ToleranceConfig::new(2.0 * l, s, a, false),
        ToleranceConfig::new(l, 2.0 * s, a, false),
        ToleranceConfig::new(l, s, 2.0 * a, false),
        ToleranceConfig::new(2.0 * l, s, 2.0 * a, false),
        ToleranceConfig::new(2.0 * l, 2.0 * s, a, false),
        ToleranceConfig::new(l, 2.0 * s, 2.0 * a, false),
        ToleranceConfig::new(2.0 * l, 2.0 * s, 2.0 * a, false),
        ToleranceConfig::new(2.0 * l, 2.0 * s, 2.0 * a, true),
    ]
}

/// 同一化学式在两个数据集中的基态
#[derive(Debug, Clone, Copy)]
pub struct EntryPair<'a> {
    pub entry_a: &'a Entry,
    pub entry_b: &'a Entry,
}

/// 单一容差下的比较结果
#[derive(Debug, Clone)]
pub struct ComparisonReport<'a> {
    pub config: ToleranceConfig,
    /// 结构不匹配的化学式
    pub mismatches: BTreeMap<String, EntryPair<'a>>,
    /// 结构匹配的化学式
    pub matched: Vec<String>,
    pub only_in_a: Vec<String>,
    pub only_in_b: Vec<String>,
}

impl ComparisonReport<'_> {
    pub fn num_compared(&self) -> usize {
        self.mismatches.len() + self.matched.len()
    }
}

/// 单一容差下比较两组基态
pub fn find_mismatches<'a>(
    a: &'a GroundStateMap,
    b: &'a GroundStateMap,
    config: &ToleranceConfig,
) -> ComparisonReport<'a> {
    let matcher = StructureMatcher::from_config(config);

    let pairs: Vec<(&String, EntryPair<'a>)> = a
        .iter()
        .filter_map(|(formula, entry_a)| {
            b.get(formula)
                .map(|entry_b| (formula, EntryPair { entry_a, entry_b }))
        })
        .collect();

    let outcomes: Vec<(&String, EntryPair<'a>, bool)> = pairs
        .into_par_iter()
        .map(|(formula, pair)| {
            let fit = matcher.fit(&pair.entry_a.structure, &pair.entry_b.structure);
            (formula, pair, fit)
        })
        .collect();

    let mut mismatches = BTreeMap::new();
    let mut matched = Vec::new();
    for (formula, pair, fit) in outcomes {
        if fit {
            matched.push(formula.clone());
        } else {
            mismatches.insert(formula.clone(), pair);
        }
    }

    ComparisonReport {
        config: *config,
        mismatches,
        matched,
        only_in_a: a.keys().filter(|f| !b.contains_key(*f)).cloned().collect(),
        only_in_b: b.keys().filter(|f| !a.contains_key(*f)).cloned().collect(),
    }
}

/// 按顺序在每组容差下比较；每完成一组调用一次 `on_done`
pub fn sweep<'a, F>(
    a: &'a GroundStateMap,
    b: &'a GroundStateMap,
    configs: &[ToleranceConfig],
    on_done: F,
) -> Vec<ComparisonReport<'a>>
where
    F: Fn(&ComparisonReport<'a>),
{
    configs
        .iter()
        .map(|config| {
            let report = find_mismatches(a, b, config);
            on_done(&report);
            report
        })
        .collect()
}

/// 能量差的口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyBasis {
    /// 总能量差
    #[default]
    Total,
    /// 每原子能量差
    PerAtom,
}

/// 一个不匹配化学式的能量差
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyDiff {
    pub energy_a: f64,
    pub energy_b: f64,
    /// energy_a - energy_b
    pub diff: f64,
}

/// 化学式 -> 能量差
pub type EnergyDiffMap = BTreeMap<String, EnergyDiff>;

/// 计算不匹配化学式的能量差 E(A) - E(B)
pub fn energy_differences(report: &ComparisonReport<'_>, basis: EnergyBasis) -> EnergyDiffMap {
    let energy = |e: &Entry| match basis {
        EnergyBasis::Total => e.energy(),
        EnergyBasis::PerAtom => e.energy_per_atom(),
    };

    report
        .mismatches
        .iter()
        .map(|(formula, pair)| {
            let (energy_a, energy_b) = (energy(pair.entry_a), energy(pair.entry_b));
            (
                formula.clone(),
                EnergyDiff {
                    energy_a,
                    energy_b,
                    diff: energy_a - energy_b,
                },
            )
        })
        .collect()
}

/// 第一组容差下不匹配的化学式，在每组容差下是否仍不匹配
pub fn persistence_table(reports: &[ComparisonReport<'_>]) -> Vec<(String, Vec<bool>)> {
    let Some(first) = reports.first() else {
        return vec![];
    };
    first
        .mismatches
        .keys()
        .map(|formula| {
            let flags = reports
                .iter()
                .map(|r| r.mismatches.contains_key(formula))
                .collect();
            (formula.clone(), flags)
        })
        .collect()
}
