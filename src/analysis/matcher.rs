//! # 晶体结构匹配器
//!
//! 判断两个周期结构在给定容差下是否为同一结构。
//!
//! ## 算法
//! 1. 组成检查（`allow_subset` 时允许较小结构为较大结构的子集）
//! 2. 约化到原胞，缩放到相同体积（几何平均），约化晶格
//! 3. 在结构 B 的格点中枚举与 A 的约化基矢长度、夹角相符且体积一致的基矢组
//! 4. 对每组基矢及每个锚点平移，按元素做最小代价指派，去掉平均平移后
//!    以 `(V_avg / n)^(1/3)` 归一化位移
//! 5. 任一映射的最大归一化位移 `<= stol` 即匹配
//!
//! 参数相同时 `fit(a, b) == fit(b, a)`。
//!
//! ## 依赖关系
//! - 被 `analysis/sweep.rs`, `commands/fit.rs` 使用
//! - 使用 `analysis/reduction.rs`, `analysis/assignment.rs`

use super::assignment::min_cost_assignment;
use super::reduction::{find_primitive, min_image, reduced_structure};
use super::sweep::ToleranceConfig;
use crate::models::{Crystal, Lattice};
use crate::utils::linalg::{self, Mat3, Vec3};

/// 原胞查找使用的位点容差 (Å)
pub const SITE_TOLERANCE: f64 = 0.25;

/// 一次成功匹配的位移统计（已归一化）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub rms: f64,
    pub max_dist: f64,
}

/// 结构匹配器
#[derive(Debug, Clone, PartialEq)]
pub struct StructureMatcher {
    /// 晶格长度相对容差
    pub ltol: f64,
    /// 位点位移容差（归一化）
    pub stol: f64,
    /// 夹角容差（度）
    pub angle_tol: f64,
    /// 允许子集匹配
    pub allow_subset: bool,
}

impl Default for StructureMatcher {
    fn default() -> Self {
        StructureMatcher::from_config(&ToleranceConfig::default())
    }
}

/// 同一元素在两个结构中的位点下标
struct SpeciesSites {
    sites1: Vec<usize>,
    sites2: Vec<usize>,
}

impl StructureMatcher {
    pub fn new(ltol: f64, stol: f64, angle_tol: f64) -> Self {
        StructureMatcher {
            ltol,
            stol,
            angle_tol,
            allow_subset: false,
        }
    }

    pub fn with_subset(mut self, allow_subset: bool) -> Self {
        self.allow_subset = allow_subset;
        self
    }

    pub fn from_config(config: &ToleranceConfig) -> Self {
        StructureMatcher::new(config.ltol, config.stol, config.angle_tol)
            .with_subset(config.allow_subset)
    }

    /// 两个结构是否匹配
    pub fn fit(&self, a: &Crystal, b: &Crystal) -> bool {
        self.find_match(a, b, true).is_some()
    }

    /// 所有满足容差的映射中 rms 最小者；不匹配时返回 None
    pub fn get_rms_dist(&self, a: &Crystal, b: &Crystal) -> Option<MatchResult> {
        self.find_match(a, b, false)
    }

    fn find_match(&self, a: &Crystal, b: &Crystal, first_only: bool) -> Option<MatchResult> {
        if a.atoms.is_empty() || b.atoms.is_empty() || !self.compositions_compatible(a, b) {
            return None;
        }

        let a = find_primitive(a, SITE_TOLERANCE);
        let b = find_primitive(b, SITE_TOLERANCE);

        // 位点少的结构在前；位点数相同时两个方向都试，保证对称
        match a.num_sites().cmp(&b.num_sites()) {
            std::cmp::Ordering::Less => self.match_ordered(&a, &b, first_only),
            std::cmp::Ordering::Greater => self.match_ordered(&b, &a, first_only),
            std::cmp::Ordering::Equal => {
                let forward = self.match_ordered(&a, &b, first_only);
                if first_only && forward.is_some() {
                    return forward;
                }
                let backward = self.match_ordered(&b, &a, first_only);
                better(forward, backward)
            }
        }
    }

    /// 子集模式的组成检查在约化到原胞后按位点数决定方向，这里只查约化组成
    fn compositions_compatible(&self, a: &Crystal, b: &Crystal) -> bool {
        self.allow_subset || a.composition().reduced() == b.composition().reduced()
    }

    /// `s1` 的位点数不多于 `s2`
    fn match_ordered(&self, s1: &Crystal, s2: &Crystal, first_only: bool) -> Option<MatchResult> {
        let (c1, c2) = (s1.composition(), s2.composition());
        if self.allow_subset {
            if !c1.is_subset_of(&c2) {
                return None;
            }
        } else if c1 != c2 {
            return None;
        }

        let (s1, s2) = scale_to_common_volume(s1, s2);
        let s1 = reduced_structure(&s1);
        let s2 = reduced_structure(&s2);

        let species = species_sites(&s1, &s2);
        let anchor = species
            .iter()
            .min_by_key(|sp| sp.sites1.len())
            .filter(|sp| !sp.sites1.is_empty() && !sp.sites2.is_empty())?;
        let anchor1 = s1.atoms[anchor.sites1[0]].position;

        let cart2 = s2.cartesian_positions();

        let mut best: Option<MatchResult> = None;
        for aligned in self.lattice_mappings(&s1.lattice, &s2.lattice) {
            let Some(inv) = linalg::inverse(&aligned) else {
                continue;
            };
            let frac2: Vec<Vec3> = cart2.iter().map(|c| linalg::vec_mat(c, &inv)).collect();
            // 度量取 s1 与实际对应上的基矢组的平均
            let avg_lattice = average_lattice(&s1.lattice, &Lattice::from_vectors(aligned));
            let norm_length = (avg_lattice.volume() / s2.num_sites() as f64).cbrt();

            for &j in &anchor.sites2 {
                let shift = linalg::sub(&frac2[j], &anchor1);
                let Some(result) =
                    site_displacements(&s1, &frac2, &shift, &species, &avg_lattice, norm_length)
                else {
                    continue;
                };
                if result.max_dist <= self.stol {
                    if first_only {
                        return Some(result);
                    }
                    best = better(best, Some(result));
                }
            }
        }
        best
    }

    /// 在 `source` 的格点中寻找与 `target` 基矢长度、夹角相符的基矢组
    fn lattice_mappings(&self, target: &Lattice, source: &Lattice) -> Vec<Mat3> {
        let lengths = target.lengths();
        let [alpha, beta, gamma] = target.angles();
        let max_length = lengths.iter().copied().fold(0.0, f64::max) * (1.0 + self.ltol);

        let Some(recip) = source.reciprocal_lengths() else {
            return vec![];
        };
        let bound = |r: f64| (max_length * r).ceil() as i32;
        let (na, nb, nc) = (bound(recip[0]), bound(recip[1]), bound(recip[2]));

        let mut candidates: [Vec<Vec3>; 3] = [vec![], vec![], vec![]];
        for i in -na..=na {
            for j in -nb..=nb {
                for k in -nc..=nc {
                    let v = source.to_cartesian(&[i as f64, j as f64, k as f64]);
                    let len = linalg::norm(&v);
                    if len < 1e-8 {
                        continue;
                    }
                    for (t, &target_len) in lengths.iter().enumerate() {
                        let ratio = len / target_len;
                        if ratio < 1.0 + self.ltol && ratio > 1.0 / (1.0 + self.ltol) {
                            candidates[t].push(v);
                        }
                    }
                }
            }
        }

        let volume = source.volume();
        let angle_ok = |u: &Vec3, v: &Vec3, expected: f64| {
            (linalg::angle_deg(u, v) - expected).abs() <= self.angle_tol
        };

        let mut mappings = Vec::new();
        for a in &candidates[0] {
            for b in &candidates[1] {
                if !angle_ok(a, b, gamma) {
                    continue;
                }
                for c in &candidates[2] {
                    if !angle_ok(b, c, alpha) || !angle_ok(a, c, beta) {
                        continue;
                    }
                    let basis = [*a, *b, *c];
                    if (linalg::det(&basis).abs() - volume).abs() < 0.01 * volume {
                        mappings.push(basis);
                    }
                }
            }
        }
        mappings
    }
}

/// 对给定平移做逐元素指派，返回归一化位移统计
fn site_displacements(
    s1: &Crystal,
    frac2: &[Vec3],
    shift: &Vec3,
    species: &[SpeciesSites],
    lattice: &Lattice,
    norm_length: f64,
) -> Option<MatchResult> {
    let mut offsets: Vec<Vec3> = Vec::with_capacity(s1.num_sites());

    for sp in species {
        let diff = |i: usize, k: usize| {
            let moved = linalg::sub(&frac2[k], shift);
            min_image(lattice, &linalg::sub(&moved, &s1.atoms[i].position))
        };
        let cost: Vec<Vec<f64>> = sp
            .sites1
            .iter()
            .map(|&i| sp.sites2.iter().map(|&k| diff(i, k).1).collect())
            .collect();
        let assignment = min_cost_assignment(&cost)?;
        for (row, &col) in assignment.iter().enumerate() {
            offsets.push(diff(sp.sites1[row], sp.sites2[col]).0);
        }
    }

    if offsets.is_empty() {
        return None;
    }

    let n = offsets.len() as f64;
    let mean = offsets
        .iter()
        .fold([0.0; 3], |acc, d| linalg::add(&acc, d));
    let mean = linalg::scale(&mean, 1.0 / n);

    let dists: Vec<f64> = offsets
        .iter()
        .map(|d| min_image(lattice, &linalg::sub(d, &mean)).1 / norm_length)
        .collect();

    let max_dist = dists.iter().copied().fold(0.0, f64::max);
    let rms = (dists.iter().map(|d| d * d).sum::<f64>() / n).sqrt();
    Some(MatchResult { rms, max_dist })
}

fn species_sites(s1: &Crystal, s2: &Crystal) -> Vec<SpeciesSites> {
    let composition = s1.composition();
    composition
        .elements()
        .map(|el| SpeciesSites {
            sites1: indices_of(s1, el),
            sites2: indices_of(s2, el),
        })
        .collect()
}

fn indices_of(crystal: &Crystal, element: &str) -> Vec<usize> {
    crystal
        .atoms
        .iter()
        .enumerate()
        .filter(|(_, a)| a.element == element)
        .map(|(i, _)| i)
        .collect()
}

/// 两个结构缩放到相同体积（几何平均）
fn scale_to_common_volume(s1: &Crystal, s2: &Crystal) -> (Crystal, Crystal) {
    let (v1, v2) = (s1.lattice.volume(), s2.lattice.volume());
    let target = (v1 * v2).sqrt();
    let scale = |s: &Crystal, v: f64| {
        let mut scaled = s.clone();
        scaled.lattice = s.lattice.scaled((target / v).cbrt());
        scaled
    };
    (scale(s1, v1), scale(s2, v2))
}

/// 由两组对应基矢的平均晶格参数构造距离度量用的晶格
fn average_lattice(l1: &Lattice, l2: &Lattice) -> Lattice {
    let (a1, b1, c1, al1, be1, ga1) = l1.parameters();
    let (a2, b2, c2, al2, be2, ga2) = l2.parameters();
    Lattice::from_parameters(
        (a1 + a2) / 2.0,
        (b1 + b2) / 2.0,
        (c1 + c2) / 2.0,
        (al1 + al2) / 2.0,
        (be1 + be2) / 2.0,
        (ga1 + ga2) / 2.0,
    )
}

fn better(a: Option<MatchResult>, b: Option<MatchResult>) -> Option<MatchResult> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if y.rms < x.rms { y } else { x }),
        (x, None) => x,
        (None, y) => y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Atom;

    fn cubic(name: &str, a: f64, atoms: &[(&str, [f64; 3])]) -> Crystal {
        Crystal::new(
            name,
            Lattice::from_parameters(a, a, a, 90.0, 90.0, 90.0),
            atoms.iter().map(|(el, p)| Atom::new(*el, *p)).collect(),
        )
    }

    fn fcc_conventional(a: f64) -> Crystal {
        cubic(
            "Cu",
            a,
            &[
                ("Cu", [0.0, 0.0, 0.0]),
                ("Cu", [0.5, 0.5, 0.0]),
                ("Cu", [0.5, 0.0, 0.5]),
                ("Cu", [0.0, 0.5, 0.5]),
            ],
        )
    }

    fn fcc_primitive(a: f64) -> Crystal {
        let h = a / 2.0;
        Crystal::new(
            "Cu",
            Lattice::from_vectors([[0.0, h, h], [h, 0.0, h], [h, h, 0.0]]),
            vec![Atom::new("Cu", [0.0, 0.0, 0.0])],
        )
    }

    fn bcc(a: f64) -> Crystal {
        cubic("Cu", a, &[("Cu", [0.0, 0.0, 0.0]), ("Cu", [0.5, 0.5, 0.5])])
    }

    fn cscl(z: f64) -> Crystal {
        cubic("CsCl", 3.0, &[("Cs", [0.0, 0.0, 0.0]), ("Cl", [0.5, 0.5, z])])
    }

    #[test]
    fn test_identical_structures_fit() {
        let m = StructureMatcher::default();
        let fcc = fcc_conventional(3.61);
        assert!(m.fit(&fcc, &fcc));
        let result = m.get_rms_dist(&fcc, &fcc).unwrap();
        assert!(result.rms < 1e-8);
    }

    #[test]
    fn test_conventional_and_primitive_cells_fit() {
        let m = StructureMatcher::default();
        // 不同晶格常数经体积缩放后仍匹配
        assert!(m.fit(&fcc_conventional(3.61), &fcc_primitive(3.70)));
        assert!(m.fit(&fcc_primitive(3.70), &fcc_conventional(3.61)));
    }

    #[test]
    fn test_bcc_and_fcc_do_not_fit() {
        let m = StructureMatcher::new(0.2, 0.3, 5.0);
        assert!(!m.fit(&bcc(2.87), &fcc_conventional(3.61)));
        assert!(!m.fit(&fcc_conventional(3.61), &bcc(2.87)));
    }

    #[test]
    fn test_length_tolerance() {
        // c/a = 1.15 的四方晶格与简单立方
        let sc = cubic("Po", 3.35, &[("Po", [0.0, 0.0, 0.0])]);
        let tetragonal = Crystal::new(
            "Po",
            Lattice::from_parameters(3.2, 3.2, 3.68, 90.0, 90.0, 90.0),
            vec![Atom::new("Po", [0.0, 0.0, 0.0])],
        );
        assert!(StructureMatcher::new(0.2, 0.3, 5.0).fit(&sc, &tetragonal));
        assert!(!StructureMatcher::new(0.05, 0.3, 5.0).fit(&sc, &tetragonal));
    }

    #[test]
    fn test_site_tolerance() {
        let reference = cscl(0.5);
        let displaced = cscl(0.6);

        let loose = StructureMatcher::new(0.2, 0.3, 5.0);
        let result = loose.get_rms_dist(&reference, &displaced).unwrap();
        // 平均平移后每个位点位移 0.15 Å，归一化长度 (27/2)^(1/3)
        let expected = 0.15 / 13.5_f64.cbrt();
        assert!((result.max_dist - expected).abs() < 1e-6);
        assert!((result.rms - expected).abs() < 1e-6);

        let strict = StructureMatcher::new(0.2, 0.03, 5.0);
        assert!(!strict.fit(&reference, &displaced));
    }

    #[test]
    fn test_fit_is_symmetric() {
        let structures = [
            fcc_conventional(3.61),
            fcc_primitive(3.5),
            bcc(2.87),
            cscl(0.5),
            cscl(0.58),
        ];
        let m = StructureMatcher::new(0.2, 0.3, 5.0);
        for a in &structures {
            for b in &structures {
                assert_eq!(m.fit(a, b), m.fit(b, a));
            }
        }
    }

    #[test]
    fn test_loosening_never_breaks_fit() {
        let pairs = [
            (cscl(0.5), cscl(0.6)),
            (fcc_conventional(3.61), fcc_primitive(3.4)),
            (bcc(2.87), fcc_primitive(3.6)),
        ];
        let strict = StructureMatcher::new(0.2, 0.05, 5.0);
        let loose = StructureMatcher::new(0.4, 0.6, 10.0);
        for (a, b) in &pairs {
            if strict.fit(a, b) {
                assert!(loose.fit(a, b));
            }
        }
    }

    #[test]
    fn test_composition_mismatch() {
        let m = StructureMatcher::default();
        let cs = cubic("Cs", 3.0, &[("Cs", [0.0, 0.0, 0.0])]);
        assert!(!m.fit(&cs, &cscl(0.5)));
    }

    #[test]
    fn test_subset_fit_is_symmetric_for_equal_site_counts() {
        // 两个输入都是 2 个位点，Cs 超胞约化后只剩 1 个位点
        let cs_supercell = Crystal::new(
            "Cs",
            Lattice::from_parameters(3.0, 3.0, 6.0, 90.0, 90.0, 90.0),
            vec![
                Atom::new("Cs", [0.0, 0.0, 0.0]),
                Atom::new("Cs", [0.0, 0.0, 0.5]),
            ],
        );
        let m = StructureMatcher::default().with_subset(true);
        assert!(m.fit(&cscl(0.5), &cs_supercell));
        assert!(m.fit(&cs_supercell, &cscl(0.5)));
    }

    fn hcp_mg(gamma: f64, z2: f64) -> Crystal {
        // gamma = 120 为常规设置；gamma = 60 时 b' = a + b，分数坐标 (x - y, y, z)
        let (p1, p2) = if gamma > 90.0 {
            ([1.0 / 3.0, 2.0 / 3.0, 0.25], [2.0 / 3.0, 1.0 / 3.0, z2])
        } else {
            ([2.0 / 3.0, 2.0 / 3.0, 0.25], [1.0 / 3.0, 1.0 / 3.0, z2])
        };
        Crystal::new(
            "Mg",
            Lattice::from_parameters(3.21, 3.21, 5.21, 90.0, 90.0, gamma),
            vec![Atom::new("Mg", p1), Atom::new("Mg", p2)],
        )
    }

    #[test]
    fn test_rms_independent_of_cell_setting() {
        let m = StructureMatcher::default();
        let reference = hcp_mg(120.0, 0.75);
        let setting_120 = m.get_rms_dist(&reference, &hcp_mg(120.0, 0.77)).unwrap();
        let setting_60 = m.get_rms_dist(&reference, &hcp_mg(60.0, 0.77)).unwrap();
        assert!((setting_120.rms - setting_60.rms).abs() < 1e-6);
        assert!((setting_120.max_dist - setting_60.max_dist).abs() < 1e-6);

        // 每个位点沿 c 位移 0.01 * 5.21 Å
        let volume = 3.21 * 3.21 * 5.21 * 3.0_f64.sqrt() / 2.0;
        let expected = 0.01 * 5.21 / (volume / 2.0).cbrt();
        assert!((setting_120.rms - expected).abs() < 1e-6);
    }

    #[test]
    fn test_subset_matching() {
        let cs = cubic("Cs", 3.0, &[("Cs", [0.0, 0.0, 0.0])]);
        let m = StructureMatcher::default().with_subset(true);
        assert!(m.fit(&cs, &cscl(0.5)));
        assert!(m.fit(&cscl(0.5), &cs));
    }
}
