//! # 晶格约化与原胞查找
//!
//! 结构匹配前的预处理：
//! - `reduce_lattice`: 两两 Gauss 约化，得到短且接近正交的基矢
//! - `find_primitive`: 找出把每个原子映射到同种原子的纯平移，构造原胞
//! - `min_image`: 周期边界下的最短差矢量
//!
//! ## 依赖关系
//! - 被 `analysis/matcher.rs` 使用
//! - 使用 `models/structure.rs`, `utils/linalg.rs`

use crate::models::{Atom, Crystal, Lattice};
use crate::utils::linalg::{self, Mat3, Vec3};

/// 约化迭代上限
const MAX_REDUCTION_STEPS: usize = 200;

/// 原胞候选平移向量最多保留的数量
const MAX_PRIMITIVE_CANDIDATES: usize = 40;

/// 两两 Gauss 约化：反复用 v_i - round(v_i·v_j / v_j·v_j) v_j 缩短基矢，
/// 再尝试 v_k ± v_i ± v_j 组合，直到不再变短。结果按长度排序并保持右手系。
pub fn reduce_lattice(lattice: &Lattice) -> Lattice {
    let mut m = lattice.matrix;
    let eps = 1e-8 * lattice.volume().cbrt().max(1.0);

    for _ in 0..MAX_REDUCTION_STEPS {
        let mut changed = false;

        for i in 0..3 {
            for j in 0..3 {
                if i == j {
                    continue;
                }
                let vj2 = linalg::dot(&m[j], &m[j]);
                let mu = (linalg::dot(&m[i], &m[j]) / vj2).round();
                if mu != 0.0 {
                    let candidate = linalg::sub(&m[i], &linalg::scale(&m[j], mu));
                    if linalg::norm(&candidate) < linalg::norm(&m[i]) - eps {
                        m[i] = candidate;
                        changed = true;
                    }
                }
            }
        }

        // 三向量组合
        for k in 0..3 {
            let (i, j) = ((k + 1) % 3, (k + 2) % 3);
            for (si, sj) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
                let shift = linalg::add(&linalg::scale(&m[i], si), &linalg::scale(&m[j], sj));
                let candidate = linalg::add(&m[k], &shift);
                if linalg::norm(&candidate) < linalg::norm(&m[k]) - eps {
                    m[k] = candidate;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    m.sort_by(|a, b| linalg::norm(a).total_cmp(&linalg::norm(b)));

    if linalg::det(&m) < 0.0 {
        for row in m.iter_mut() {
            *row = linalg::scale(row, -1.0);
        }
    }

    Lattice::from_vectors(m)
}

/// 用新基矢重新表达结构，分数坐标折回 [0, 1)
pub fn with_basis(crystal: &Crystal, basis: Mat3) -> Option<Crystal> {
    let lattice = Lattice::from_vectors(basis);
    let atoms = crystal
        .cartesian_positions()
        .iter()
        .zip(&crystal.atoms)
        .map(|(cart, atom)| {
            lattice
                .to_fractional(cart)
                .map(|f| Atom::new(atom.element.clone(), linalg::wrap_unit(&f)))
        })
        .collect::<Option<Vec<_>>>()?;
    Some(Crystal::new(crystal.name.clone(), lattice, atoms))
}

/// 约化晶格后的结构
pub fn reduced_structure(crystal: &Crystal) -> Crystal {
    let reduced = reduce_lattice(&crystal.lattice);
    with_basis(crystal, reduced.matrix).unwrap_or_else(|| crystal.clone())
}

/// 周期边界下的最短差矢量（分数坐标）及其笛卡尔长度
///
/// 先折回 [-0.5, 0.5)，再检查相邻 27 个像，适用于斜晶胞。
pub fn min_image(lattice: &Lattice, frac_diff: &Vec3) -> (Vec3, f64) {
    let centered = linalg::wrap_centered(frac_diff);
    let mut best = (centered, linalg::norm(&lattice.to_cartesian(&centered)));

    for a in [-1.0, 0.0, 1.0] {
        for b in [-1.0, 0.0, 1.0] {
            for c in [-1.0, 0.0, 1.0] {
                let image = [centered[0] + a, centered[1] + b, centered[2] + c];
                let d = linalg::norm(&lattice.to_cartesian(&image));
                if d < best.1 {
                    best = (image, d);
                }
            }
        }
    }
    best
}

/// 查找原胞
///
/// `tol` 为笛卡尔距离容差 (Å)。找不到更小的平移周期时返回约化后的原结构。
pub fn find_primitive(crystal: &Crystal, tol: f64) -> Crystal {
    let n = crystal.num_sites();
    if n <= 1 {
        return reduced_structure(crystal);
    }

    let translations = pure_translations(crystal, tol);
    let k = translations.len() + 1;
    if k == 1 || n % k != 0 {
        return reduced_structure(crystal);
    }

    let target_volume = crystal.lattice.volume() / k as f64;
    let Some(basis) = primitive_basis(&crystal.lattice, &translations, target_volume) else {
        return reduced_structure(crystal);
    };

    let Some(expressed) = with_basis(crystal, basis) else {
        return reduced_structure(crystal);
    };

    // 去除平移等价的重复原子
    let mut kept: Vec<Atom> = Vec::with_capacity(n / k);
    for atom in expressed.atoms {
        let duplicate = kept.iter().any(|other| {
            other.element == atom.element
                && min_image(
                    &expressed.lattice,
                    &linalg::sub(&atom.position, &other.position),
                )
                .1 < tol
        });
        if !duplicate {
            kept.push(atom);
        }
    }

    if kept.len() * k != n {
        return reduced_structure(crystal);
    }

    let primitive = Crystal::new(crystal.name.clone(), expressed.lattice, kept);
    reduced_structure(&primitive)
}

/// 把每个原子映射到同种原子的非零平移（分数坐标，折回 [-0.5, 0.5)）
fn pure_translations(crystal: &Crystal, tol: f64) -> Vec<Vec3> {
    let composition = crystal.composition();
    let Some(anchor_element) = composition
        .elements()
        .min_by_key(|el| (composition.count(el), el.to_string()))
        .map(str::to_string)
    else {
        return vec![];
    };

    let anchor_sites: Vec<&Atom> = crystal
        .atoms
        .iter()
        .filter(|a| a.element == anchor_element)
        .collect();
    let origin = anchor_sites[0].position;

    anchor_sites
        .iter()
        .skip(1)
        .map(|a| linalg::wrap_centered(&linalg::sub(&a.position, &origin)))
        .filter(|t| is_symmetry_translation(crystal, t, tol))
        .collect()
}

fn is_symmetry_translation(crystal: &Crystal, t: &Vec3, tol: f64) -> bool {
    crystal.atoms.iter().all(|atom| {
        let moved = linalg::add(&atom.position, t);
        crystal.atoms.iter().any(|other| {
            other.element == atom.element
                && min_image(&crystal.lattice, &linalg::sub(&moved, &other.position)).1 < tol
        })
    })
}

/// 在平移格点中找出体积为 `target_volume` 的最短基矢组
fn primitive_basis(lattice: &Lattice, translations: &[Vec3], target_volume: f64) -> Option<Mat3> {
    let mut candidates: Vec<Vec3> = Vec::new();
    let zero = [0.0; 3];

    for t in std::iter::once(&zero).chain(translations.iter()) {
        for a in [-1.0, 0.0, 1.0] {
            for b in [-1.0, 0.0, 1.0] {
                for c in [-1.0, 0.0, 1.0] {
                    let frac = [t[0] + a, t[1] + b, t[2] + c];
                    let cart = lattice.to_cartesian(&frac);
                    if linalg::norm(&cart) < 1e-8 {
                        continue;
                    }
                    // v 与 -v 只保留一个
                    let duplicate = candidates.iter().any(|v| {
                        linalg::norm(&linalg::sub(v, &cart)) < 1e-6
                            || linalg::norm(&linalg::add(v, &cart)) < 1e-6
                    });
                    if !duplicate {
                        candidates.push(cart);
                    }
                }
            }
        }
    }

    candidates.sort_by(|a, b| linalg::norm(a).total_cmp(&linalg::norm(b)));
    candidates.truncate(MAX_PRIMITIVE_CANDIDATES);

    let mut best: Option<(f64, Mat3)> = None;
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            for l in (j + 1)..candidates.len() {
                let basis = [candidates[i], candidates[j], candidates[l]];
                let volume = linalg::det(&basis).abs();
                if (volume - target_volume).abs() > 1e-3 * target_volume {
                    continue;
                }
                let total: f64 = basis.iter().map(linalg::norm).sum();
                if best.as_ref().map_or(true, |(b, _)| total < *b - 1e-9) {
                    best = Some((total, basis));
                }
            }
        }
    }

    best.map(|(_, basis)| basis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(a: f64, atoms: Vec<Atom>, name: &str) -> Crystal {
        Crystal::new(
            name,
            Lattice::from_parameters(a, a, a, 90.0, 90.0, 90.0),
            atoms,
        )
    }

    #[test]
    fn test_reduce_skewed_lattice() {
        // 简单立方的斜基矢表示 (a, a+b, a+b+c)
        let skewed = Lattice::from_vectors([
            [3.0, 0.0, 0.0],
            [3.0, 3.0, 0.0],
            [3.0, 3.0, 3.0],
        ]);
        let reduced = reduce_lattice(&skewed);
        let lengths = reduced.lengths();
        assert!(lengths.iter().all(|l| (l - 3.0).abs() < 1e-9));
        assert!((reduced.volume() - 27.0).abs() < 1e-9);
        assert!(reduced.signed_volume() > 0.0);
    }

    #[test]
    fn test_min_image_distance() {
        let lattice = Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0);
        let (diff, d) = min_image(&lattice, &[0.9, 0.0, 0.0]);
        assert!((d - 0.4).abs() < 1e-9);
        assert!((diff[0] + 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_primitive_of_conventional_fcc() {
        let fcc = cubic(
            4.05,
            vec![
                Atom::new("Al", [0.0, 0.0, 0.0]),
                Atom::new("Al", [0.5, 0.5, 0.0]),
                Atom::new("Al", [0.5, 0.0, 0.5]),
                Atom::new("Al", [0.0, 0.5, 0.5]),
            ],
            "Al",
        );
        let prim = find_primitive(&fcc, 0.25);
        assert_eq!(prim.num_sites(), 1);
        assert!((prim.lattice.volume() - 4.05_f64.powi(3) / 4.0).abs() < 1e-6);
        // fcc 原胞基矢长度 a/√2
        let expected = 4.05 / 2.0_f64.sqrt();
        assert!(prim.lattice.lengths().iter().all(|l| (l - expected).abs() < 1e-6));
    }

    #[test]
    fn test_primitive_of_bcc() {
        let bcc = cubic(
            2.87,
            vec![
                Atom::new("Fe", [0.0, 0.0, 0.0]),
                Atom::new("Fe", [0.5, 0.5, 0.5]),
            ],
            "Fe",
        );
        let prim = find_primitive(&bcc, 0.25);
        assert_eq!(prim.num_sites(), 1);
        assert!((prim.lattice.volume() - 2.87_f64.powi(3) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_primitive_keeps_rocksalt_basis() {
        let nacl = cubic(
            5.64,
            vec![
                Atom::new("Na", [0.0, 0.0, 0.0]),
                Atom::new("Na", [0.5, 0.5, 0.0]),
                Atom::new("Na", [0.5, 0.0, 0.5]),
                Atom::new("Na", [0.0, 0.5, 0.5]),
                Atom::new("Cl", [0.5, 0.0, 0.0]),
                Atom::new("Cl", [0.0, 0.5, 0.0]),
                Atom::new("Cl", [0.0, 0.0, 0.5]),
                Atom::new("Cl", [0.5, 0.5, 0.5]),
            ],
            "NaCl",
        );
        let prim = find_primitive(&nacl, 0.25);
        assert_eq!(prim.num_sites(), 2);
        assert_eq!(prim.reduced_formula(), "NaCl");
    }

    #[test]
    fn test_primitive_of_already_primitive() {
        let sc = cubic(3.0, vec![Atom::new("Po", [0.0, 0.0, 0.0])], "Po");
        let prim = find_primitive(&sc, 0.25);
        assert_eq!(prim.num_sites(), 1);
        assert!((prim.lattice.volume() - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_supercell_reduces_back() {
        // 2x1x1 简单立方超胞
        let lattice = Lattice::from_vectors([[6.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]]);
        let supercell = Crystal::new(
            "Po2",
            lattice,
            vec![
                Atom::new("Po", [0.0, 0.0, 0.0]),
                Atom::new("Po", [0.5, 0.0, 0.0]),
            ],
        );
        let prim = find_primitive(&supercell, 0.25);
        assert_eq!(prim.num_sites(), 1);
        assert!((prim.lattice.volume() - 27.0).abs() < 1e-9);
    }
}
