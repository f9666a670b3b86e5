//! # 计算条目 JSON 解析器
//!
//! 读取序列化的计算结构条目列表（两套泛函的元素数据集）。
//!
//! ## 格式说明
//! ```text
//! [
//!   {
//!     "@class": "ComputedStructureEntry",      # 忽略
//!     "entry_id": "mp-13",                     # 可选，字符串或数字
//!     "energy": -16.4,                          # 未修正总能量 (eV)
//!     "correction": 0.0,                        # 可选
//!     "structure": {
//!       "lattice": {"matrix": [[..], [..], [..]]},
//!       "sites": [
//!         {"species": [{"element": "Fe", "occu": 1}],
//!          "abc": [0, 0, 0], "xyz": [0, 0, 0]}
//!       ]
//!     }
//!   }
//! ]
//! ```
//! 顶层也可以是 `{"entries": [...]}`。其余字段一律忽略。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs`, `commands/export.rs` 使用
//! - 使用 `models/`
//! - 使用 `serde_json` 反序列化

use crate::error::{GsError, Result};
use crate::models::element;
use crate::models::{Atom, Crystal, Entry, Lattice};

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntryFile {
    List(Vec<RawEntry>),
    Wrapped { entries: Vec<RawEntry> },
}

#[derive(Deserialize)]
struct RawEntry {
    energy: f64,
    #[serde(default)]
    correction: Option<f64>,
    #[serde(default)]
    entry_id: Option<serde_json::Value>,
    structure: Option<RawStructure>,
}

#[derive(Deserialize)]
struct RawStructure {
    lattice: RawLattice,
    sites: Vec<RawSite>,
}

#[derive(Deserialize)]
struct RawLattice {
    matrix: [[f64; 3]; 3],
}

#[derive(Deserialize)]
struct RawSite {
    species: Vec<RawSpecies>,
    #[serde(default)]
    abc: Option<[f64; 3]>,
    #[serde(default)]
    xyz: Option<[f64; 3]>,
}

#[derive(Deserialize)]
struct RawSpecies {
    element: String,
    #[serde(default = "full_occupancy")]
    occu: f64,
}

fn full_occupancy() -> f64 {
    1.0
}

/// 读取条目 JSON 文件
pub fn load_entries(path: &Path) -> Result<Vec<Entry>> {
    if !path.exists() {
        return Err(GsError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| GsError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_entries_str(&content, &path.display().to_string())
}

/// 从 JSON 字符串解析条目
pub fn parse_entries_str(content: &str, source: &str) -> Result<Vec<Entry>> {
    let raw: RawEntryFile = serde_json::from_str(content).map_err(|e| GsError::JsonError {
        path: source.to_string(),
        source: e,
    })?;

    let raw_entries = match raw {
        RawEntryFile::List(entries) => entries,
        RawEntryFile::Wrapped { entries } => entries,
    };

    raw_entries
        .into_iter()
        .enumerate()
        .map(|(i, raw)| convert_entry(raw, i, source))
        .collect()
}

fn convert_entry(raw: RawEntry, index: usize, source: &str) -> Result<Entry> {
    let parse_error = |reason: String| GsError::ParseError {
        format: "entries".to_string(),
        path: source.to_string(),
        reason: format!("entry #{}: {}", index, reason),
    };

    let id = raw.entry_id.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    });

    let raw_structure = raw
        .structure
        .ok_or_else(|| parse_error("missing 'structure' (plain energy entries cannot be matched)".to_string()))?;

    let lattice = Lattice::from_vectors(raw_structure.lattice.matrix);
    if lattice.volume() < 1e-8 {
        return Err(parse_error("singular lattice matrix".to_string()));
    }

    let mut atoms = Vec::with_capacity(raw_structure.sites.len());
    for (j, site) in raw_structure.sites.into_iter().enumerate() {
        let species = match site.species.as_slice() {
            [single] => single,
            [] => return Err(parse_error(format!("site #{} has no species", j))),
            _ => {
                return Err(parse_error(format!(
                    "site #{} is disordered ({} species); only ordered structures are supported",
                    j,
                    site.species.len()
                )))
            }
        };

        if !element::is_element(&species.element) {
            return Err(parse_error(format!(
                "site #{} has unknown element '{}'",
                j, species.element
            )));
        }
        if (species.occu - 1.0).abs() > 1e-6 {
            return Err(parse_error(format!(
                "site #{} has partial occupancy {}",
                j, species.occu
            )));
        }

        let position = match (site.abc, site.xyz) {
            (Some(abc), _) => abc,
            (None, Some(xyz)) => lattice
                .to_fractional(&xyz)
                .ok_or_else(|| parse_error("singular lattice matrix".to_string()))?,
            (None, None) => {
                return Err(parse_error(format!("site #{} has no coordinates", j)));
            }
        };

        atoms.push(Atom::new(species.element.clone(), position));
    }

    if atoms.is_empty() {
        return Err(parse_error("structure has no sites".to_string()));
    }

    let mut crystal = Crystal::new("", lattice, atoms);
    crystal.name = match &id {
        Some(id) => id.clone(),
        None => format!("{}-{}", crystal.reduced_formula(), index),
    };

    let entry = Entry::new(crystal, raw.energy).with_correction(raw.correction.unwrap_or(0.0));
    Ok(match id {
        Some(id) => entry.with_id(id),
        None => entry,
    })
}
