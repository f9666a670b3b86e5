//! # 周期表热图
//!
//! 把每个化学式的能量差画在周期表对应元素的格子上。
//!
//! ## 功能
//! - 18 列主表 + 镧系/锕系两行
//! - 按数值着色（spectral / coolwarm），无数据的元素留白
//! - 底部色条标注最小值与最大值
//! - 按扩展名输出 PNG 或 SVG
//!
//! 只有单质化学式（如 `Fe`, `O2`）可以放到周期表上，其余化学式跳过并返回。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs` 调用
//! - 使用 `plot/colormap.rs`, `models/element.rs`, `models/composition.rs`
//! - 使用 `plotters` 渲染图表

use super::colormap::Colormap;
use crate::error::{GsError, Result};
use crate::models::{element, Composition};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;
use std::path::Path;

/// 周期表行数（含间隔行 7）
const TABLE_ROWS: usize = 10;
const TABLE_COLS: usize = 18;

/// 色条分段数
const COLORBAR_STEPS: usize = 120;

/// 热图选项
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    pub title: String,
    pub value_label: String,
    pub colormap: Colormap,
    pub width: u32,
    pub height: u32,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        HeatmapOptions {
            title: "Energy difference".to_string(),
            value_label: "ΔE (eV)".to_string(),
            colormap: Colormap::default(),
            width: 1600,
            height: 1000,
        }
    }
}

/// 周期表中的一个格子
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub symbol: &'static str,
    pub row: usize,
    pub col: usize,
    pub value: Option<f64>,
}

/// 热图布局：格子、无法放置的化学式、数值范围
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayout {
    pub cells: Vec<TableCell>,
    pub skipped: Vec<String>,
    pub range: Option<(f64, f64)>,
}

/// 计算热图布局
pub fn layout(values: &BTreeMap<String, f64>) -> HeatmapLayout {
    let mut by_element: BTreeMap<String, f64> = BTreeMap::new();
    let mut skipped = Vec::new();

    for (formula, value) in values {
        let single = Composition::from_formula(formula)
            .and_then(|c| c.single_element().map(str::to_string));
        match single {
            Some(symbol) => {
                by_element.insert(symbol, *value);
            }
            None => skipped.push(formula.clone()),
        }
    }

    let cells = (1..=element::NUM_ELEMENTS as u32)
        .filter_map(|z| {
            let symbol = element::symbol(z)?;
            let (row, col) = element::table_position(z)?;
            Some(TableCell {
                symbol,
                row,
                col,
                value: by_element.get(symbol).copied(),
            })
        })
        .collect();

    let range = by_element.values().fold(None, |acc: Option<(f64, f64)>, &v| {
        Some(match acc {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        })
    });

    HeatmapLayout {
        cells,
        skipped,
        range,
    }
}

/// 生成周期表热图，返回无法放置的化学式
pub fn generate_heatmap(
    values: &BTreeMap<String, f64>,
    output_path: &Path,
    options: &HeatmapOptions,
) -> Result<Vec<String>> {
    let layout = layout(values);
    let use_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_heatmap(&root, &layout, options)?;
        root.present()
            .map_err(|e| GsError::PlotError(e.to_string()))?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_heatmap(&root, &layout, options)?;
        root.present()
            .map_err(|e| GsError::PlotError(e.to_string()))?;
    }

    Ok(layout.skipped)
}

/// 绘制热图的核心逻辑
///
/// 坐标系：x 为列 [0, 18]，y 向上；第 r 行占据 y ∈ [9 - r, 10 - r]，色条画在 y < 0 处。
fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    layout: &HeatmapLayout,
    options: &HeatmapOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 32).into_font())
        .margin(30)
        .build_cartesian_2d(0.0..TABLE_COLS as f64, -2.2..TABLE_ROWS as f64)
        .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;

    let (min, max) = layout.range.unwrap_or((0.0, 0.0));
    let border = RGBColor(120, 120, 120);
    let empty_text = RGBColor(170, 170, 170);
    let centered = Pos::new(HPos::Center, VPos::Center);

    for cell in &layout.cells {
        let x0 = cell.col as f64 + 0.04;
        let x1 = cell.col as f64 + 0.96;
        let y1 = (TABLE_ROWS - cell.row) as f64 - 0.04;
        let y0 = (TABLE_ROWS - cell.row - 1) as f64 + 0.04;

        let fill = match cell.value {
            Some(v) => options.colormap.color_for(v, min, max),
            None => WHITE,
        };

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x0, y0), (x1, y1)],
                fill.filled(),
            )))
            .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(x0, y0), (x1, y1)],
                border.stroke_width(1),
            )))
            .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;

        let x_mid = cell.col as f64 + 0.5;
        let y_mid = (y0 + y1) / 2.0;
        let (symbol_y, symbol_color) = match cell.value {
            Some(_) => (y_mid + 0.15, BLACK),
            None => (y_mid, empty_text),
        };

        chart
            .draw_series(std::iter::once(Text::new(
                cell.symbol.to_string(),
                (x_mid, symbol_y),
                ("sans-serif", 20)
                    .into_font()
                    .color(&symbol_color)
                    .pos(centered),
            )))
            .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;

        if let Some(v) = cell.value {
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{:.2}", v),
                    (x_mid, y_mid - 0.22),
                    ("sans-serif", 13).into_font().color(&BLACK).pos(centered),
                )))
                .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;
        }
    }

    if layout.range.is_some() {
        draw_colorbar(&mut chart, min, max, options)?;
    }

    Ok(())
}

/// 在表格下方绘制水平色条
fn draw_colorbar<DB: DrawingBackend>(
    chart: &mut ChartContext<
        '_,
        DB,
        Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>,
    >,
    min: f64,
    max: f64,
    options: &HeatmapOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (x_start, x_end) = (3.0, 15.0);
    let (y0, y1) = (-1.0, -0.5);
    let step = (x_end - x_start) / COLORBAR_STEPS as f64;

    chart
        .draw_series((0..COLORBAR_STEPS).map(|i| {
            let t = (i as f64 + 0.5) / COLORBAR_STEPS as f64;
            let x = x_start + i as f64 * step;
            Rectangle::new(
                [(x, y0), (x + step, y1)],
                options.colormap.color_at(t).filled(),
            )
        }))
        .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;

    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(x_start, y0), (x_end, y1)],
            BLACK.stroke_width(1),
        )))
        .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;

    let label_style = ("sans-serif", 16)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let labels = [
        (x_start, format!("{:.3}", min)),
        (x_end, format!("{:.3}", max)),
        ((x_start + x_end) / 2.0, options.value_label.clone()),
    ];
    for (x, text) in labels {
        chart
            .draw_series(std::iter::once(Text::new(
                text,
                (x, y0 - 0.15),
                label_style.clone(),
            )))
            .map_err(|e| GsError::PlotError(format!("{:?}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diffs() -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("Fe".to_string(), -0.3),
            ("O2".to_string(), 0.12),
            ("La".to_string(), 0.05),
            ("NaCl".to_string(), 1.0),
        ])
    }

    #[test]
    fn test_layout_places_single_elements() {
        let layout = layout(&diffs());
        assert_eq!(layout.cells.len(), element::NUM_ELEMENTS);
        assert_eq!(layout.skipped, vec!["NaCl".to_string()]);
        assert_eq!(layout.range, Some((-0.3, 0.12)));

        let fe = layout.cells.iter().find(|c| c.symbol == "Fe").unwrap();
        assert_eq!((fe.row, fe.col), (3, 7));
        assert_eq!(fe.value, Some(-0.3));

        let o = layout.cells.iter().find(|c| c.symbol == "O").unwrap();
        assert_eq!(o.value, Some(0.12));

        let la = layout.cells.iter().find(|c| c.symbol == "La").unwrap();
        assert_eq!(la.row, 8);

        let cu = layout.cells.iter().find(|c| c.symbol == "Cu").unwrap();
        assert_eq!(cu.value, None);
    }

    #[test]
    fn test_layout_empty() {
        let layout = layout(&BTreeMap::new());
        assert!(layout.range.is_none());
        assert!(layout.cells.iter().all(|c| c.value.is_none()));
    }
}
