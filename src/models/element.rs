//! # 元素周期表数据
//!
//! 元素符号、原子序数、Pauling 电负性，以及热图使用的周期表位置。
//! 覆盖 H (1) 到 Lr (103)。
//!
//! ## 依赖关系
//! - 被 `models/composition.rs` 使用（化学式元素排序）
//! - 被 `plot/heatmap.rs` 使用（格子位置）

/// (符号, Pauling 电负性)，按原子序数排列
const ELEMENTS: [(&str, Option<f64>); 103] = [
    // --- Period 1 ---
    ("H", Some(2.20)),
    ("He", None),
    // --- Period 2 ---
    ("Li", Some(0.98)),
    ("Be", Some(1.57)),
    ("B", Some(2.04)),
    ("C", Some(2.55)),
    ("N", Some(3.04)),
    ("O", Some(3.44)),
    ("F", Some(3.98)),
    ("Ne", None),
    // --- Period 3 ---
    ("Na", Some(0.93)),
    ("Mg", Some(1.31)),
    ("Al", Some(1.61)),
    ("Si", Some(1.90)),
    ("P", Some(2.19)),
    ("S", Some(2.58)),
    ("Cl", Some(3.16)),
    ("Ar", None),
    // --- Period 4 ---
    ("K", Some(0.82)),
    ("Ca", Some(1.00)),
    ("Sc", Some(1.36)),
    ("Ti", Some(1.54)),
    ("V", Some(1.63)),
    ("Cr", Some(1.66)),
    ("Mn", Some(1.55)),
    ("Fe", Some(1.83)),
    ("Co", Some(1.88)),
    ("Ni", Some(1.91)),
    ("Cu", Some(1.90)),
    ("Zn", Some(1.65)),
    ("Ga", Some(1.81)),
    ("Ge", Some(2.01)),
    ("As", Some(2.18)),
    ("Se", Some(2.55)),
    ("Br", Some(2.96)),
    ("Kr", Some(3.00)),
    // --- Period 5 ---
    ("Rb", Some(0.82)),
    ("Sr", Some(0.95)),
    ("Y", Some(1.22)),
    ("Zr", Some(1.33)),
    ("Nb", Some(1.60)),
    ("Mo", Some(2.16)),
    ("Tc", Some(1.90)),
    ("Ru", Some(2.20)),
    ("Rh", Some(2.28)),
    ("Pd", Some(2.20)),
    ("Ag", Some(1.93)),
    ("Cd", Some(1.69)),
    ("In", Some(1.78)),
    ("Sn", Some(1.96)),
    ("Sb", Some(2.05)),
    ("Te", Some(2.10)),
    ("I", Some(2.66)),
    ("Xe", Some(2.60)),
    // --- Period 6 ---
    ("Cs", Some(0.79)),
    ("Ba", Some(0.89)),
    ("La", Some(1.10)),
    ("Ce", Some(1.12)),
    ("Pr", Some(1.13)),
    ("Nd", Some(1.14)),
    ("Pm", Some(1.13)),
    ("Sm", Some(1.17)),
    ("Eu", Some(1.20)),
    ("Gd", Some(1.20)),
    ("Tb", Some(1.10)),
    ("Dy", Some(1.22)),
    ("Ho", Some(1.23)),
    ("Er", Some(1.24)),
    ("Tm", Some(1.25)),
    ("Yb", Some(1.10)),
    ("Lu", Some(1.27)),
    ("Hf", Some(1.30)),
    ("Ta", Some(1.50)),
    ("W", Some(2.36)),
    ("Re", Some(1.90)),
    ("Os", Some(2.20)),
    ("Ir", Some(2.20)),
    ("Pt", Some(2.28)),
    ("Au", Some(2.54)),
    ("Hg", Some(2.00)),
    ("Tl", Some(1.62)),
    ("Pb", Some(2.33)),
    ("Bi", Some(2.02)),
    ("Po", Some(2.00)),
    ("At", Some(2.20)),
    ("Rn", Some(2.20)),
    // --- Period 7 ---
    ("Fr", Some(0.70)),
    ("Ra", Some(0.90)),
    ("Ac", Some(1.10)),
    ("Th", Some(1.30)),
    ("Pa", Some(1.50)),
    ("U", Some(1.38)),
    ("Np", Some(1.36)),
    ("Pu", Some(1.28)),
    ("Am", Some(1.13)),
    ("Cm", Some(1.28)),
    ("Bk", Some(1.30)),
    ("Cf", Some(1.30)),
    ("Es", Some(1.30)),
    ("Fm", Some(1.30)),
    ("Md", Some(1.30)),
    ("No", Some(1.30)),
    ("Lr", Some(1.30)),
];

/// 元素总数
pub const NUM_ELEMENTS: usize = ELEMENTS.len();

/// 由元素符号获取原子序数
pub fn atomic_number(symbol: &str) -> Option<u32> {
    ELEMENTS
        .iter()
        .position(|(s, _)| *s == symbol)
        .map(|i| i as u32 + 1)
}

/// 由原子序数获取元素符号
pub fn symbol(z: u32) -> Option<&'static str> {
    if z == 0 {
        return None;
    }
    ELEMENTS.get(z as usize - 1).map(|(s, _)| *s)
}

/// Pauling 电负性（稀有气体等未定义时为 None）
pub fn electronegativity(symbol: &str) -> Option<f64> {
    ELEMENTS
        .iter()
        .find(|(s, _)| *s == symbol)
        .and_then(|(_, x)| *x)
}

pub fn is_element(symbol: &str) -> bool {
    atomic_number(symbol).is_some()
}

/// 周期表中的位置 (行, 列)，均从 0 开始
///
/// 行 0-6 为主表；镧系放在行 8、锕系放在行 9（行 7 留空作间隔），
/// 列 2..=16 对应 La..Lu / Ac..Lr。
pub fn table_position(z: u32) -> Option<(usize, usize)> {
    let pos = match z {
        1 => (0, 0),
        2 => (0, 17),
        3..=4 => (1, z as usize - 3),
        5..=10 => (1, z as usize + 7),
        11..=12 => (2, z as usize - 11),
        13..=18 => (2, z as usize - 1),
        19..=36 => (3, z as usize - 19),
        37..=54 => (4, z as usize - 37),
        55..=56 => (5, z as usize - 55),
        57..=71 => (8, z as usize - 55),
        72..=86 => (5, z as usize - 69),
        87..=88 => (6, z as usize - 87),
        89..=103 => (9, z as usize - 87),
        _ => return None,
    };
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_number_lookup() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("Fe"), Some(26));
        assert_eq!(atomic_number("Lr"), Some(103));
        assert_eq!(atomic_number("Xx"), None);
        assert_eq!(symbol(79), Some("Au"));
        assert_eq!(symbol(0), None);
    }

    #[test]
    fn test_table_positions() {
        // 主族与过渡金属
        assert_eq!(table_position(1), Some((0, 0)));
        assert_eq!(table_position(2), Some((0, 17)));
        assert_eq!(table_position(5), Some((1, 12)));
        assert_eq!(table_position(26), Some((3, 7)));
        assert_eq!(table_position(72), Some((5, 3)));
        assert_eq!(table_position(86), Some((5, 17)));
        // f 区
        assert_eq!(table_position(57), Some((8, 2)));
        assert_eq!(table_position(71), Some((8, 16)));
        assert_eq!(table_position(103), Some((9, 16)));
        assert_eq!(table_position(104), None);
    }

    #[test]
    fn test_positions_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for z in 1..=NUM_ELEMENTS as u32 {
            let pos = table_position(z).unwrap();
            assert!(seen.insert(pos), "duplicate position for Z={}", z);
        }
    }

    #[test]
    fn test_electronegativity() {
        assert_eq!(electronegativity("F"), Some(3.98));
        assert_eq!(electronegativity("He"), None);
    }
}
