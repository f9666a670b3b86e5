//! # CIF 格式读写
//!
//! 写出 P1 CIF 文件（基态结构导出），并读回同类文件（`fit` 子命令）。
//!
//! ## CIF 格式说明
//! ```text
//! data_Fe
//! _symmetry_space_group_name_H-M   'P 1'
//! _cell_length_a    2.870000
//! ...
//! loop_
//!  _atom_site_label
//!  _atom_site_type_symbol
//!  _atom_site_fract_x
//!  _atom_site_fract_y
//!  _atom_site_fract_z
//!  _atom_site_occupancy
//!  Fe1 Fe 0.0000000000 0.0000000000 0.0000000000 1.0
//! ```
//! 读取时不展开对称操作：含非恒等对称操作的文件会被拒绝。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs`, `commands/fit.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{GsError, Result};
use crate::models::element;
use crate::models::{Atom, Crystal, Lattice};

use std::fs;
use std::path::Path;

/// 转换为 CIF 格式字符串
pub fn to_cif_string(crystal: &Crystal) -> String {
    let (a, b, c, alpha, beta, gamma) = crystal.lattice.parameters();
    let composition = crystal.composition();
    let reduced = composition.reduced_formula();
    let z = composition.num_atoms() / composition.reduced().num_atoms().max(1);

    let mut result = String::new();
    result.push_str(&format!("# generated by gscompare from {}\n", crystal.name));
    result.push_str(&format!("data_{}\n", reduced));
    result.push_str("_symmetry_space_group_name_H-M    'P 1'\n");
    result.push_str("_symmetry_Int_Tables_number       1\n");
    result.push_str(&format!(
        "_chemical_formula_structural      {}\n",
        reduced
    ));
    result.push_str(&format!(
        "_chemical_formula_sum             '{}'\n",
        composition.formula()
    ));
    result.push_str(&format!("_cell_length_a    {:.6}\n", a));
    result.push_str(&format!("_cell_length_b    {:.6}\n", b));
    result.push_str(&format!("_cell_length_c    {:.6}\n", c));
    result.push_str(&format!("_cell_angle_alpha {:.4}\n", alpha));
    result.push_str(&format!("_cell_angle_beta  {:.4}\n", beta));
    result.push_str(&format!("_cell_angle_gamma {:.4}\n", gamma));
    result.push_str(&format!("_cell_volume      {:.6}\n", crystal.lattice.volume()));
    result.push_str(&format!("_cell_formula_units_Z {}\n\n", z));

    result.push_str("loop_\n");
    result.push_str(" _symmetry_equiv_pos_site_id\n");
    result.push_str(" _symmetry_equiv_pos_as_xyz\n");
    result.push_str("  1  'x, y, z'\n\n");

    result.push_str("loop_\n");
    result.push_str(" _atom_site_label\n");
    result.push_str(" _atom_site_type_symbol\n");
    result.push_str(" _atom_site_fract_x\n");
    result.push_str(" _atom_site_fract_y\n");
    result.push_str(" _atom_site_fract_z\n");
    result.push_str(" _atom_site_occupancy\n");

    // 标签按元素分别编号：Fe1, Fe2, O1 ...
    let mut counters: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for atom in &crystal.atoms {
        let n = counters.entry(atom.element.as_str()).or_insert(0);
        *n += 1;
        result.push_str(&format!(
            "  {}{} {} {:.10} {:.10} {:.10} 1.0\n",
            atom.element, n, atom.element, atom.position[0], atom.position[1], atom.position[2]
        ));
    }

    result
}

/// 写出 CIF 文件
pub fn write_cif_file(crystal: &Crystal, path: &Path) -> Result<()> {
    fs::write(path, to_cif_string(crystal)).map_err(|e| GsError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 解析 CIF 文件
pub fn parse_cif_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| GsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_cif_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 CIF（仅第一个 data 块）
pub fn parse_cif_content(content: &str, default_name: &str) -> Result<Crystal> {
    let parse_error = |reason: String| GsError::ParseError {
        format: "cif".to_string(),
        path: default_name.to_string(),
        reason,
    };

    let mut name: Option<String> = None;
    let mut cell: [Option<f64>; 6] = [None; 6];
    let mut atoms: Vec<Atom> = Vec::new();
    let mut symmetry_ops = 0usize;

    let mut loop_headers: Vec<String> = Vec::new();
    let mut in_loop = false;
    let mut in_loop_body = false;

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(block) = line.strip_prefix("data_") {
            if name.is_some() {
                break;
            }
            name = Some(block.trim().to_string());
            continue;
        }

        if line.starts_with("loop_") {
            loop_headers.clear();
            in_loop = true;
            in_loop_body = false;
            continue;
        }

        if line.starts_with('_') {
            if in_loop && !in_loop_body {
                loop_headers.push(line.to_lowercase());
                continue;
            }

            // 循环结束后的普通键值对
            in_loop = false;
            loop_headers.clear();

            let mut parts = line.splitn(2, char::is_whitespace);
            let key = parts.next().unwrap_or_default().to_lowercase();
            let value = parts.next().map(str::trim).unwrap_or_default();

            let slot = match key.as_str() {
                "_cell_length_a" => Some(0),
                "_cell_length_b" => Some(1),
                "_cell_length_c" => Some(2),
                "_cell_angle_alpha" => Some(3),
                "_cell_angle_beta" => Some(4),
                "_cell_angle_gamma" => Some(5),
                _ => None,
            };
            if let Some(i) = slot {
                cell[i] = Some(
                    parse_cif_number(value)
                        .ok_or_else(|| parse_error(format!("invalid value for {}", key)))?,
                );
            }
            continue;
        }

        if !in_loop || loop_headers.is_empty() {
            continue;
        }
        in_loop_body = true;

        let tokens = tokenize(line);

        if loop_headers
            .iter()
            .any(|h| h == "_symmetry_equiv_pos_as_xyz" || h == "_space_group_symop_operation_xyz")
        {
            symmetry_ops += 1;
            continue;
        }

        let column = |tag: &str| loop_headers.iter().position(|h| h == tag);
        let (Some(ix), Some(iy), Some(iz)) = (
            column("_atom_site_fract_x"),
            column("_atom_site_fract_y"),
            column("_atom_site_fract_z"),
        ) else {
            continue;
        };

        if tokens.len() < loop_headers.len() {
            return Err(parse_error(format!("incomplete atom row: '{}'", line)));
        }

        let symbol_token = column("_atom_site_type_symbol")
            .or_else(|| column("_atom_site_label"))
            .map(|i| tokens[i].as_str())
            .ok_or_else(|| parse_error("atom loop without type symbol or label".to_string()))?;
        let element = element_from_token(symbol_token)
            .ok_or_else(|| parse_error(format!("unknown element '{}'", symbol_token)))?;

        let coord = |i: usize| {
            parse_cif_number(&tokens[i])
                .ok_or_else(|| parse_error(format!("invalid coordinate '{}'", tokens[i])))
        };
        atoms.push(Atom::new(element, [coord(ix)?, coord(iy)?, coord(iz)?]));
    }

    if symmetry_ops > 1 {
        return Err(parse_error(format!(
            "{} symmetry operations found; only P1 files are supported",
            symmetry_ops
        )));
    }

    let [Some(a), Some(b), Some(c), Some(alpha), Some(beta), Some(gamma)] = cell else {
        return Err(parse_error("missing cell parameters".to_string()));
    };

    if atoms.is_empty() {
        return Err(parse_error("no atom sites found".to_string()));
    }

    let lattice = Lattice::from_parameters(a, b, c, alpha, beta, gamma);
    let name = name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_name.to_string());

    Ok(Crystal::new(name, lattice, atoms))
}

/// 解析 CIF 数值，去掉不确定度括号，如 "5.4310(2)"
fn parse_cif_number(token: &str) -> Option<f64> {
    let token = token.trim_matches(|c| c == '\'' || c == '"');
    let token = token.split('(').next().unwrap_or(token);
    token.parse().ok()
}

/// 从标签或类型符号提取元素，如 "Fe1" -> "Fe", "O2-" -> "O"
fn element_from_token(token: &str) -> Option<String> {
    let letters: String = token
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    // 先试两个字母，再试一个字母
    let candidates = [letters.get(..2), letters.get(..1)];
    let found = candidates
        .into_iter()
        .flatten()
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .find(|s| element::is_element(s));
    found
}

/// 按空白切分一行，保留引号内的空格
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => {
                quote = None;
            }
            Some(_) => current.push(ch),
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hcp_mg() -> Crystal {
        let lattice = Lattice::from_parameters(3.21, 3.21, 5.21, 90.0, 90.0, 120.0);
        let atoms = vec![
            Atom::new("Mg", [1.0 / 3.0, 2.0 / 3.0, 0.25]),
            Atom::new("Mg", [2.0 / 3.0, 1.0 / 3.0, 0.75]),
        ];
        Crystal::new("mp-153", lattice, atoms)
    }

    #[test]
    fn test_cif_string_contents() {
        let cif = to_cif_string(&hcp_mg());
        assert!(cif.contains("data_Mg"));
        assert!(cif.contains("_cell_angle_gamma 120.0000"));
        assert!(cif.contains("_cell_formula_units_Z 2"));
        assert!(cif.contains("Mg1 Mg"));
        assert!(cif.contains("Mg2 Mg"));
    }

    #[test]
    fn test_cif_written_structure_reads_back() {
        let source = hcp_mg();
        let parsed = parse_cif_content(&to_cif_string(&source), "fallback").unwrap();

        assert_eq!(parsed.name, "Mg");
        assert_eq!(parsed.atoms.len(), 2);
        assert!((parsed.lattice.volume() - source.lattice.volume()).abs() < 1e-4);
        assert!((parsed.atoms[1].position[2] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_parse_cif_with_uncertainties_and_labels() {
        let content = r#"
data_Si
_cell_length_a 5.4310(2)
_cell_length_b 5.4310(2)
_cell_length_c 5.4310(2)
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_atom_site_label
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Si1 0.0 0.0 0.0
Si2 0.25 0.25 0.25
"#;
        let crystal = parse_cif_content(content, "si").unwrap();
        assert_eq!(crystal.atoms.len(), 2);
        assert_eq!(crystal.atoms[0].element, "Si");
        assert!((crystal.lattice.lengths()[0] - 5.431).abs() < 1e-9);
    }

    #[test]
    fn test_reject_symmetrized_cif() {
        let content = r#"
data_Fe
_cell_length_a 2.87
_cell_length_b 2.87
_cell_length_c 2.87
_cell_angle_alpha 90
_cell_angle_beta 90
_cell_angle_gamma 90
loop_
_symmetry_equiv_pos_as_xyz
'x, y, z'
'-x, -y, -z'
loop_
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Fe 0 0 0
"#;
        assert!(parse_cif_content(content, "fe").is_err());
    }

    #[test]
    fn test_missing_cell() {
        let content = "data_X\nloop_\n_atom_site_type_symbol\n_atom_site_fract_x\n_atom_site_fract_y\n_atom_site_fract_z\nFe 0 0 0\n";
        assert!(parse_cif_content(content, "x").is_err());
    }

    #[test]
    fn test_element_from_token() {
        assert_eq!(element_from_token("Fe1").as_deref(), Some("Fe"));
        assert_eq!(element_from_token("O2-").as_deref(), Some("O"));
        assert_eq!(element_from_token("CL3").as_deref(), Some("Cl"));
        assert_eq!(element_from_token("C12").as_deref(), Some("C"));
        assert_eq!(element_from_token("123"), None);
    }

    #[test]
    fn test_write_cif_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Mg_scan.cif");
        write_cif_file(&hcp_mg(), &path).unwrap();
        let parsed = parse_cif_file(&path).unwrap();
        assert_eq!(parsed.reduced_formula(), "Mg");
    }
}
