use crate::error::ExpandError;
use crate::imageops_expand::blend::{blend_colors, calculate_blend_factor};
use crate::imageops_expand::config::{BlendConfig, Edge, ExpansionSpec};
use crate::imageops_expand::context::RunContext;
use crate::Image;
use image::Rgba;

/// グラデーション処理完了時の進捗
pub const PROGRESS_BLENDED: u8 = 95;

/// 各辺のパスを開始する前に通知する進捗
fn pass_checkpoint(edge: Edge) -> Option<u8> {
    match edge {
        Edge::Top => Some(70),
        Edge::Bottom => Some(80),
        Edge::Left => Some(90),
        Edge::Right => None,
    }
}

/// 実効ブレンド距離を計算する
///
/// 帯の幅は4辺の拡張量のうち最小のものに制限される。
/// 1辺でも拡張量が 0 であれば結果は 0 となり、グラデーションは適用されない。
pub fn effective_blend_distance(spec: &ExpansionSpec, config: &BlendConfig) -> u32 {
    config.blend_distance.min(spec.min_expansion())
}

/// 拡張されたキャンバスの余白に、元画像の端の色へ向かうグラデーションを適用する
///
/// 各辺（上・下・左・右の順）について、元画像に最も近い帯を
/// 背景色と元画像の端のピクセルとの補間色で上書きする。
/// 帯の外側の端は背景色そのままで、元画像に近づくほど端の色に近づく。
///
/// # 引数
///
/// * `canvas` - [`ExpandCanvas::expand_canvas`](crate::ExpandCanvas::expand_canvas) の結果
/// * `source` - 元画像
/// * `spec` - キャンバス作成時の拡張量
/// * `config` - ブレンド設定
/// * `ctx` - 進捗通知とキャンセル確認
///
/// # 戻り値
///
/// グラデーション適用後のキャンバス。無効な設定の場合は入力をそのまま返す
///
/// # エラー
///
/// * 処理中にキャンセルされた場合（途中結果は破棄される）
pub fn apply_edge_gradient(
    mut canvas: Image<Rgba<u8>>,
    source: &Image<Rgba<u8>>,
    spec: &ExpansionSpec,
    config: &BlendConfig,
    ctx: &RunContext<'_>,
) -> Result<Image<Rgba<u8>>, ExpandError> {
    if !config.enable_gradient || config.blend_distance == 0 || spec.is_noop() {
        return Ok(canvas);
    }

    let distance = effective_blend_distance(spec, config);
    if distance == 0 || source.width() == 0 || source.height() == 0 {
        return Ok(canvas);
    }

    let background = *canvas.get_pixel(0, 0);

    for edge in Edge::ALL {
        match pass_checkpoint(edge) {
            Some(percentage) => ctx.checkpoint(percentage)?,
            None => ctx.check_cancelled()?,
        }
        blend_margin(
            &mut canvas,
            source,
            spec,
            edge,
            distance,
            config.gradient_strength,
            background,
            ctx,
        )?;
    }

    ctx.report(PROGRESS_BLENDED);
    Ok(canvas)
}

#[allow(clippy::too_many_arguments)]
fn blend_margin(
    canvas: &mut Image<Rgba<u8>>,
    source: &Image<Rgba<u8>>,
    spec: &ExpansionSpec,
    edge: Edge,
    distance: u32,
    strength: f64,
    background: Rgba<u8>,
    ctx: &RunContext<'_>,
) -> Result<(), ExpandError> {
    let (width, height) = source.dimensions();
    let band = spec.amount(edge).min(distance);

    // `step` counts from the outer edge of the band toward the image.
    for step in 0..band {
        ctx.check_cancelled()?;
        let factor = calculate_blend_factor(step, distance, strength);
        let toward = band - 1 - step;
        let blend = |edge_pixel: &Rgba<u8>| blend_colors(background, *edge_pixel, factor);

        match edge {
            Edge::Top => {
                let y = spec.top - 1 - toward;
                for x in 0..width {
                    canvas.put_pixel(spec.left + x, y, blend(source.get_pixel(x, 0)));
                }
            }
            Edge::Bottom => {
                let y = spec.top + height + toward;
                for x in 0..width {
                    canvas.put_pixel(spec.left + x, y, blend(source.get_pixel(x, height - 1)));
                }
            }
            Edge::Left => {
                let x = spec.left - 1 - toward;
                for y in 0..height {
                    canvas.put_pixel(x, spec.top + y, blend(source.get_pixel(0, y)));
                }
            }
            Edge::Right => {
                let x = spec.left + width + toward;
                for y in 0..height {
                    canvas.put_pixel(x, spec.top + y, blend(source.get_pixel(width - 1, y)));
                }
            }
        }
    }

    Ok(())
}
