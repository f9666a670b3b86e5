//! # 化学组成与约化化学式
//!
//! 统计结构中各元素的原子数，并生成约化化学式（分组键与 CIF 文件名）。
//!
//! ## 约化规则
//! - 各元素原子数除以最大公约数
//! - 元素按 Pauling 电负性升序排列（未定义者排最后，同值按符号）
//! - 数量为 1 时省略
//! - 双原子分子单质等特例：`O` -> `O2`, `HO` -> `H2O2`, `NaO` -> `NaO2` ...
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 使用
//! - 使用 `models/element.rs`

use super::element;
use std::collections::BTreeMap;

/// 约化后需要整体替换的化学式
const SPECIAL_FORMULAS: [(&str, &str); 14] = [
    ("H", "H2"),
    ("N", "N2"),
    ("O", "O2"),
    ("F", "F2"),
    ("Cl", "Cl2"),
    ("Br", "Br2"),
    ("I", "I2"),
    ("HO", "H2O2"),
    ("LiO", "LiO2"),
    ("NaO", "NaO2"),
    ("KO", "KO2"),
    ("RbO", "RbO2"),
    ("CsO", "CsO2"),
    ("HgCl", "Hg2Cl2"),
];

/// 化学组成：元素符号 -> 原子数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    counts: BTreeMap<String, usize>,
}

impl Composition {
    /// 从元素符号序列统计组成
    pub fn from_symbols<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = BTreeMap::new();
        for s in symbols {
            *counts.entry(s.to_string()).or_insert(0) += 1;
        }
        Composition { counts }
    }

    /// 解析化学式字符串，如 `Fe`, `O2`, `H2O2`；不支持括号
    pub fn from_formula(formula: &str) -> Option<Self> {
        let mut counts = BTreeMap::new();
        let mut chars = formula.chars().peekable();

        while let Some(c) = chars.next() {
            if !c.is_ascii_uppercase() {
                return None;
            }
            let mut symbol = c.to_string();
            while let Some(&l) = chars.peek().filter(|l| l.is_ascii_lowercase()) {
                symbol.push(l);
                chars.next();
            }
            if !element::is_element(&symbol) {
                return None;
            }

            let mut digits = String::new();
            while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(d);
                chars.next();
            }
            let n = if digits.is_empty() {
                1
            } else {
                digits.parse::<usize>().ok().filter(|n| *n > 0)?
            };
            *counts.entry(symbol).or_insert(0) += n;
        }

        if counts.is_empty() {
            return None;
        }
        Some(Composition { counts })
    }

    pub fn num_atoms(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, symbol: &str) -> usize {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(|s| s.as_str())
    }

    /// 单质时返回该元素符号
    pub fn single_element(&self) -> Option<&str> {
        if self.counts.len() == 1 {
            self.counts.keys().next().map(|s| s.as_str())
        } else {
            None
        }
    }

    /// 约化组成（各原子数除以最大公约数）
    pub fn reduced(&self) -> Composition {
        let divisor = self.counts.values().copied().fold(0, gcd);
        if divisor <= 1 {
            return self.clone();
        }
        Composition {
            counts: self
                .counts
                .iter()
                .map(|(el, n)| (el.clone(), n / divisor))
                .collect(),
        }
    }

    /// 按电负性排序的化学式字符串（不约化）
    pub fn formula(&self) -> String {
        let mut elements: Vec<(&str, usize)> =
            self.counts.iter().map(|(el, n)| (el.as_str(), *n)).collect();
        elements.sort_by(|a, b| compare_electronegativity(a.0, b.0));

        elements
            .into_iter()
            .map(|(el, n)| {
                if n == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, n)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 约化化学式
    pub fn reduced_formula(&self) -> String {
        let formula = self.reduced().formula();
        SPECIAL_FORMULAS
            .iter()
            .find(|(plain, _)| *plain == formula)
            .map(|(_, special)| special.to_string())
            .unwrap_or(formula)
    }

    /// `self` 的每种元素在 `other` 中都存在且数量不多于 `other`
    pub fn is_subset_of(&self, other: &Composition) -> bool {
        self.counts.iter().all(|(el, n)| other.count(el) >= *n)
    }
}

fn compare_electronegativity(a: &str, b: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (element::electronegativity(a), element::electronegativity(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then(a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
