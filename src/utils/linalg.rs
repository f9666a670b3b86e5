//! # 3x3 线性代数工具
//!
//! 晶格运算所需的小型向量/矩阵函数，直接作用于 `[f64; 3]` 与
//! `[[f64; 3]; 3]`。矩阵按行存储晶格向量，分数坐标为行向量：
//! `cart = frac · M`。
//!
//! ## 依赖关系
//! - 被 `models/structure.rs` 和 `analysis/` 使用
//! - 无外部模块依赖

pub type Vec3 = [f64; 3];
pub type Mat3 = [[f64; 3]; 3];

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(a: &Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// 两向量夹角（度）
pub fn angle_deg(a: &Vec3, b: &Vec3) -> f64 {
    let cos = dot(a, b) / (norm(a) * norm(b));
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// 行列式
pub fn det(m: &Mat3) -> f64 {
    dot(&m[0], &cross(&m[1], &m[2]))
}

/// 逆矩阵，奇异时返回 None
pub fn inverse(m: &Mat3) -> Option<Mat3> {
    let d = det(m);
    if d.abs() < 1e-12 {
        return None;
    }

    // 伴随矩阵的列是行向量两两叉积
    let c0 = cross(&m[1], &m[2]);
    let c1 = cross(&m[2], &m[0]);
    let c2 = cross(&m[0], &m[1]);

    let mut inv = [[0.0; 3]; 3];
    for i in 0..3 {
        inv[i] = [c0[i] / d, c1[i] / d, c2[i] / d];
    }
    Some(inv)
}

/// 行向量乘矩阵: v · M
pub fn vec_mat(v: &Vec3, m: &Mat3) -> Vec3 {
    [
        v[0] * m[0][0] + v[1] * m[1][0] + v[2] * m[2][0],
        v[0] * m[0][1] + v[1] * m[1][1] + v[2] * m[2][1],
        v[0] * m[0][2] + v[1] * m[1][2] + v[2] * m[2][2],
    ]
}

/// 分数坐标折回 [0, 1)
pub fn wrap_unit(v: &Vec3) -> Vec3 {
    let mut out = [0.0; 3];
    for i in 0..3 {
        let x = v[i] - v[i].floor();
        // 浮点误差可能得到恰好 1.0
        out[i] = if x >= 1.0 - 1e-12 { 0.0 } else { x };
    }
    out
}

/// 分数坐标折回 [-0.5, 0.5]
pub fn wrap_centered(v: &Vec3) -> Vec3 {
    [v[0] - v[0].round(), v[1] - v[1].round(), v[2] - v[2].round()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_round_trip() {
        let m = [[3.0, 0.0, 0.0], [1.5, 2.6, 0.0], [0.2, 0.3, 5.0]];
        let inv = inverse(&m).unwrap();
        let id = [
            vec_mat(&m[0], &inv),
            vec_mat(&m[1], &inv),
            vec_mat(&m[2], &inv),
        ];

        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((id[i][j] - expected).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_singular_matrix() {
        let m = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(inverse(&m).is_none());
    }

    #[test]
    fn test_wrap() {
        let w = wrap_unit(&[1.25, -0.25, 3.0]);
        assert!((w[0] - 0.25).abs() < 1e-12);
        assert!((w[1] - 0.75).abs() < 1e-12);
        assert!(w[2].abs() < 1e-12);

        let c = wrap_centered(&[0.9, -0.6, 0.2]);
        assert!((c[0] + 0.1).abs() < 1e-12);
        assert!((c[1] - 0.4).abs() < 1e-12);
        assert!((c[2] - 0.2).abs() < 1e-12);
    }
}
