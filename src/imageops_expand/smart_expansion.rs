use crate::error::SmartExpansionError;
use crate::imageops_expand::config::ExpansionSpec;
use image::{ImageBuffer, Pixel, Rgba};
use std::fmt;
use std::str::FromStr;

/// 比率文字列で使用できる区切り文字
const RATIO_SEPARATORS: [char; 4] = [':', '.', 'x', '/'];

/// 拡張量を前後の辺にどう配分するかを指定する列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distribution {
    /// 両側に均等（余りは下側・右側）
    #[default]
    Even,
    /// すべて上側・左側
    Start,
    /// すべて下側・右側
    End,
}

impl Distribution {
    /// 合計量を (上側・左側, 下側・右側) に分割する
    pub fn split(self, total: u32) -> (u32, u32) {
        match self {
            Self::Even => {
                let lead = total / 2;
                (lead, total - lead)
            }
            Self::Start => (total, 0),
            Self::End => (0, total),
        }
    }
}

impl FromStr for Distribution {
    type Err = SmartExpansionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "even" | "center" | "centre" => Ok(Self::Even),
            "start" | "top" | "left" => Ok(Self::Start),
            "end" | "bottom" | "right" => Ok(Self::End),
            _ => Err(SmartExpansionError::UnknownDistribution(s.to_string())),
        }
    }
}

/// どの軸を拡張したかを表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionAxis {
    /// 既に目標比率と一致している
    None,
    /// 幅（左右）を拡張
    Width,
    /// 高さ（上下）を拡張
    Height,
}

impl ExpansionAxis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

impl fmt::Display for ExpansionAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 目標比率から計算された拡張量
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartExpansion {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
    pub axis: ExpansionAxis,
    /// 利用者向けの説明文
    pub description: String,
}

impl SmartExpansion {
    /// 背景色を指定して [`ExpansionSpec`] に変換する
    pub fn to_spec(&self, background: Rgba<u8>) -> ExpansionSpec {
        ExpansionSpec::new(self.top, self.bottom, self.left, self.right, background)
    }
}

/// 目標比率から拡張量を求める戦略を表すトレイト
pub trait ExpansionStrategy {
    /// 画像サイズ・目標比率・配分方法から拡張量を計算する
    ///
    /// # 引数
    ///
    /// * `size` - 元画像のサイズ (幅, 高さ)
    /// * `target_ratio` - 目標比率（例: `"16:9"`）
    /// * `distribution` - 配分方法
    ///
    /// # エラー
    ///
    /// エラーの `Display` はそのまま利用者に表示できる
    fn calculate(
        &self,
        size: (u32, u32),
        target_ratio: &str,
        distribution: Distribution,
    ) -> Result<SmartExpansion, SmartExpansionError>;
}

/// 幅か高さの一方だけを伸ばして目標比率に合わせる既定の戦略
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioExpansion;

impl ExpansionStrategy for RatioExpansion {
    fn calculate(
        &self,
        size: (u32, u32),
        target_ratio: &str,
        distribution: Distribution,
    ) -> Result<SmartExpansion, SmartExpansionError> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return Err(SmartExpansionError::EmptyImage);
        }

        let (ratio_w, ratio_h) = parse_ratio(target_ratio)?;
        let (w, h) = (f64::from(width), f64::from(height));
        let too_large = || SmartExpansionError::ExpansionTooLarge(target_ratio.to_string());

        // Compare w/h against ratio_w/ratio_h without dividing.
        let lhs = w * ratio_h;
        let rhs = h * ratio_w;
        let tolerance = 1e-9 * lhs.max(rhs);

        let (axis, total) = if (lhs - rhs).abs() <= tolerance {
            (ExpansionAxis::None, 0)
        } else if lhs < rhs {
            let target = grown_length(h * ratio_w / ratio_h).ok_or_else(too_large)?;
            (ExpansionAxis::Width, target.saturating_sub(width))
        } else {
            let target = grown_length(w * ratio_h / ratio_w).ok_or_else(too_large)?;
            (ExpansionAxis::Height, target.saturating_sub(height))
        };

        let (lead, trail) = distribution.split(total);
        let (top, bottom, left, right) = match axis {
            ExpansionAxis::None => (0, 0, 0, 0),
            ExpansionAxis::Width => (0, 0, lead, trail),
            ExpansionAxis::Height => (lead, trail, 0, 0),
        };

        let description = match axis {
            ExpansionAxis::None => format!("{width}x{height} already matches {target_ratio}"),
            ExpansionAxis::Width => format!(
                "Expand width by {total}px: {width}x{height} -> {}x{height} ({target_ratio})",
                width + total
            ),
            ExpansionAxis::Height => format!(
                "Expand height by {total}px: {width}x{height} -> {width}x{} ({target_ratio})",
                height + total
            ),
        };

        Ok(SmartExpansion {
            top,
            bottom,
            left,
            right,
            axis,
            description,
        })
    }
}

/// 比率文字列を (幅, 高さ) に分解する
///
/// 区切り文字 `:` `.` `x` `/` のいずれかがちょうど1つ含まれ、
/// その両側が正の有限数である必要がある。
pub fn parse_ratio(text: &str) -> Result<(f64, f64), SmartExpansionError> {
    let invalid = || SmartExpansionError::InvalidRatio(text.to_string());
    let trimmed = text.trim();

    let mut separators = trimmed.match_indices(&RATIO_SEPARATORS[..]);
    let (index, separator) = separators.next().ok_or_else(invalid)?;
    if separators.next().is_some() {
        return Err(invalid());
    }

    let parse_side = |side: &str| {
        side.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value > 0.0)
    };

    let ratio_w = parse_side(&trimmed[..index]).ok_or_else(invalid)?;
    let ratio_h = parse_side(&trimmed[index + separator.len()..]).ok_or_else(invalid)?;
    Ok((ratio_w, ratio_h))
}

/// 目標の長さを切り上げて `u32` に収める
fn grown_length(length: f64) -> Option<u32> {
    let rounded = (length - 1e-9).ceil();
    (rounded.is_finite() && rounded <= f64::from(u32::MAX)).then_some(rounded as u32)
}

/// 画像から直接目標比率の拡張量を計算するトレイト
pub trait SmartExpand {
    /// [`RatioExpansion`] で拡張量を計算する
    fn calculate_smart_expansion(
        &self,
        target_ratio: &str,
        distribution: Distribution,
    ) -> Result<SmartExpansion, SmartExpansionError>;
}

impl<P: Pixel> SmartExpand for ImageBuffer<P, Vec<P::Subpixel>> {
    fn calculate_smart_expansion(
        &self,
        target_ratio: &str,
        distribution: Distribution,
    ) -> Result<SmartExpansion, SmartExpansionError> {
        RatioExpansion.calculate(self.dimensions(), target_ratio, distribution)
    }
}
