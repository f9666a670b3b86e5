//! # 计算条目数据模型
//!
//! 一个条目 = 一个弛豫后的晶体结构 + 其 DFT 总能量。
//! 条目在载入后不再修改。
//!
//! ## 依赖关系
//! - 被 `parsers/entries.rs` 创建
//! - 被 `analysis/` 和 `commands/` 使用

use super::structure::Crystal;

/// DFT 计算条目
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// 条目标识（如 "mp-13"），可缺省
    pub id: Option<String>,

    /// 未修正总能量 (eV)
    pub uncorrected_energy: f64,

    /// 能量修正 (eV)
    pub correction: f64,

    /// 结构
    pub structure: Crystal,
}

impl Entry {
    pub fn new(structure: Crystal, uncorrected_energy: f64) -> Self {
        Entry {
            id: None,
            uncorrected_energy,
            correction: 0.0,
            structure,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_correction(mut self, correction: f64) -> Self {
        self.correction = correction;
        self
    }

    /// 总能量（含修正）
    pub fn energy(&self) -> f64 {
        self.uncorrected_energy + self.correction
    }

    /// 每原子能量
    pub fn energy_per_atom(&self) -> f64 {
        let n = self.structure.num_sites().max(1);
        self.energy() / n as f64
    }

    /// 约化化学式
    pub fn reduced_formula(&self) -> String {
        self.structure.reduced_formula()
    }

    /// 用于显示的名称：优先使用条目标识
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.structure.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    fn bcc_fe() -> Crystal {
        let lattice = Lattice::from_parameters(2.87, 2.87, 2.87, 90.0, 90.0, 90.0);
        let atoms = vec![
            Atom::new("Fe", [0.0, 0.0, 0.0]),
            Atom::new("Fe", [0.5, 0.5, 0.5]),
        ];
        Crystal::new("Fe", lattice, atoms)
    }

    #[test]
    fn test_energy_with_correction() {
        let entry = Entry::new(bcc_fe(), -16.0).with_correction(-0.4);
        assert!((entry.energy() - (-16.4)).abs() < 1e-12);
        assert!((entry.energy_per_atom() - (-8.2)).abs() < 1e-12);
    }

    #[test]
    fn test_label() {
        let entry = Entry::new(bcc_fe(), -16.0);
        assert_eq!(entry.label(), "Fe");
        let entry = entry.with_id("mp-13");
        assert_eq!(entry.label(), "mp-13");
        assert_eq!(entry.reduced_formula(), "Fe");
    }
}
