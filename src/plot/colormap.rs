//! # 颜色映射
//!
//! 把 [0, 1] 内的数值线性插值到色带上。
//!
//! ## 依赖关系
//! - 被 `plot/heatmap.rs` 使用
//! - 使用 `plotters` 的 `RGBColor`

use plotters::style::RGBColor;

/// ColorBrewer Spectral（红 -> 黄 -> 蓝）
const SPECTRAL: [(u8, u8, u8); 11] = [
    (158, 1, 66),
    (213, 62, 79),
    (244, 109, 67),
    (253, 174, 97),
    (254, 224, 139),
    (255, 255, 191),
    (230, 245, 152),
    (171, 221, 164),
    (102, 194, 165),
    (50, 136, 189),
    (94, 79, 162),
];

/// 冷暖发散色带（蓝 -> 灰 -> 红）
const COOLWARM: [(u8, u8, u8); 7] = [
    (59, 76, 192),
    (123, 159, 249),
    (192, 212, 245),
    (221, 221, 221),
    (242, 203, 183),
    (238, 132, 104),
    (180, 4, 38),
];

/// 可用色带
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Spectral,
    Coolwarm,
}

impl Colormap {
    fn stops(&self) -> &'static [(u8, u8, u8)] {
        match self {
            Colormap::Spectral => &SPECTRAL,
            Colormap::Coolwarm => &COOLWARM,
        }
    }

    /// `t` 超出 [0, 1] 时截断，NaN 按 0.5 处理
    pub fn color_at(&self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };

        let scaled = t * (stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - i as f64;

        let (r0, g0, b0) = stops[i];
        let (r1, g1, b1) = stops[i + 1];
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }

    /// 在 [min, max] 范围内取色；范围退化时取中间色
    pub fn color_for(&self, value: f64, min: f64, max: f64) -> RGBColor {
        let span = max - min;
        if span.abs() < f64::EPSILON {
            return self.color_at(0.5);
        }
        self.color_at((value - min) / span)
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Spectral => write!(f, "spectral"),
            Colormap::Coolwarm => write!(f, "coolwarm"),
        }
    }
}
