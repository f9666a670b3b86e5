//! # 最小代价指派（匈牙利算法）
//!
//! 在同种元素的位点之间求一一对应，使距离总和最小。
//! 支持行数不多于列数的矩形代价矩阵（子集匹配）。
//!
//! ## 依赖关系
//! - 被 `analysis/matcher.rs` 使用

/// 求解最小代价指派
///
/// `cost[i][j]` 为第 i 行指派到第 j 列的代价。返回每行对应的列下标；
/// 行数多于列数或代价非有限值时返回 None。
pub fn min_cost_assignment(cost: &[Vec<f64>]) -> Option<Vec<usize>> {
    let n = cost.len();
    if n == 0 {
        return Some(vec![]);
    }
    let m = cost[0].len();
    if m < n || cost.iter().any(|row| row.len() != m) {
        return None;
    }
    if cost.iter().flatten().any(|c| !c.is_finite()) {
        return None;
    }

    // 势函数 u, v；p[j] 为第 j 列匹配的行（1 起始，0 表示未匹配）
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            if j1 == 0 {
                return None;
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=m {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    Some(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(cost: &[Vec<f64>], assignment: &[usize]) -> f64 {
        assignment.iter().enumerate().map(|(i, &j)| cost[i][j]).sum()
    }

    #[test]
    fn test_square_assignment() {
        let cost = vec![
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ];
        let assignment = min_cost_assignment(&cost).unwrap();
        assert_eq!(assignment, vec![1, 0, 2]);
        assert!((total(&cost, &assignment) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_rectangular_assignment() {
        let cost = vec![vec![9.0, 0.5, 7.0, 3.0], vec![0.2, 8.0, 6.0, 4.0]];
        let assignment = min_cost_assignment(&cost).unwrap();
        assert_eq!(assignment, vec![1, 0]);
    }

    #[test]
    fn test_distinct_columns() {
        let cost = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let assignment = min_cost_assignment(&cost).unwrap();
        assert_ne!(assignment[0], assignment[1]);
    }

    #[test]
    fn test_invalid_shapes() {
        assert_eq!(min_cost_assignment(&[]), Some(vec![]));
        let tall = vec![vec![1.0], vec![2.0]];
        assert!(min_cost_assignment(&tall).is_none());
        let nan = vec![vec![f64::NAN]];
        assert!(min_cost_assignment(&nan).is_none());
    }
}
