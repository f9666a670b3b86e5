//! # 晶体结构数据模型
//!
//! 定义统一的周期性晶体结构表示：晶格 + 分数坐标原子。
//! JSON 条目、CIF 文件读入后都转换为该结构，结构匹配也在其上进行。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `analysis/` 和 `commands/` 使用
//! - 使用 `models/composition.rs`, `utils/linalg.rs`

use super::composition::Composition;
use crate::utils::linalg::{self, Mat3, Vec3};

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: Mat3,
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let cos_gamma = gamma.to_radians().cos();
        let sin_gamma = gamma.to_radians().sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();
        let c_vec = [c1, c2, c3];

        Lattice {
            matrix: [a_vec, b_vec, c_vec],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: Mat3) -> Self {
        Lattice { matrix }
    }

    /// 三个晶格向量的长度 (a, b, c)
    pub fn lengths(&self) -> Vec3 {
        [
            linalg::norm(&self.matrix[0]),
            linalg::norm(&self.matrix[1]),
            linalg::norm(&self.matrix[2]),
        ]
    }

    /// 晶格夹角 (alpha, beta, gamma)，单位：度
    pub fn angles(&self) -> Vec3 {
        let [a, b, c] = self.matrix;
        [
            linalg::angle_deg(&b, &c),
            linalg::angle_deg(&a, &c),
            linalg::angle_deg(&a, &b),
        ]
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a, b, c] = self.lengths();
        let [alpha, beta, gamma] = self.angles();
        (a, b, c, alpha, beta, gamma)
    }

    /// 有向体积（行列式）；右手系为正
    pub fn signed_volume(&self) -> f64 {
        linalg::det(&self.matrix)
    }

    /// 晶格体积
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// 按比例缩放晶格向量
    pub fn scaled(&self, factor: f64) -> Lattice {
        Lattice {
            matrix: [
                linalg::scale(&self.matrix[0], factor),
                linalg::scale(&self.matrix[1], factor),
                linalg::scale(&self.matrix[2], factor),
            ],
        }
    }

    /// 分数坐标 -> 笛卡尔坐标
    pub fn to_cartesian(&self, frac: &Vec3) -> Vec3 {
        linalg::vec_mat(frac, &self.matrix)
    }

    /// 笛卡尔坐标 -> 分数坐标，晶格奇异时返回 None
    pub fn to_fractional(&self, cart: &Vec3) -> Option<Vec3> {
        linalg::inverse(&self.matrix).map(|inv| linalg::vec_mat(cart, &inv))
    }

    /// 倒格子向量长度（不含 2π），用于确定格点搜索范围
    pub fn reciprocal_lengths(&self) -> Option<Vec3> {
        let inv = linalg::inverse(&self.matrix)?;
        // 倒格子矩阵为 (M^-1)^T，其行向量即 M^-1 的列
        let col = |j: usize| [inv[0][j], inv[1][j], inv[2][j]];
        Some([
            linalg::norm(&col(0)),
            linalg::norm(&col(1)),
            linalg::norm(&col(2)),
        ])
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: Vec3,
}

impl Atom {
    pub fn new(element: impl Into<String>, position: Vec3) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
        }
    }

    pub fn num_sites(&self) -> usize {
        self.atoms.len()
    }

    /// 化学组成
    pub fn composition(&self) -> Composition {
        Composition::from_symbols(self.atoms.iter().map(|a| a.element.as_str()))
    }

    /// 约化化学式（分组键）
    pub fn reduced_formula(&self) -> String {
        self.composition().reduced_formula()
    }

    /// 每原子体积
    pub fn volume_per_site(&self) -> Option<f64> {
        if self.atoms.is_empty() {
            return None;
        }
        Some(self.lattice.volume() / self.atoms.len() as f64)
    }

    /// 各原子的笛卡尔坐标
    pub fn cartesian_positions(&self) -> Vec<Vec3> {
        self.atoms
            .iter()
            .map(|a| self.lattice.to_cartesian(&a.position))
            .collect()
    }
}
