use crate::utils::truncate_channel;
use image::Rgba;

/// 2色を線形補間する
///
/// `factor` は [0, 1] にクランプされ、R・G・B・A の各チャンネルを
/// 独立に `a * (1 - factor) + b * factor` で補間した後、切り捨てる。
///
/// # 引数
///
/// * `a` - `factor = 0` のときの色
/// * `b` - `factor = 1` のときの色
/// * `factor` - 補間係数
///
/// # 戻り値
///
/// 補間された色
pub fn blend_colors(a: Rgba<u8>, b: Rgba<u8>, factor: f64) -> Rgba<u8> {
    let factor = factor.clamp(0.0, 1.0);
    let inverse = 1.0 - factor;

    let Rgba([ar, ag, ab, aa]) = a;
    let Rgba([br, bg, bb, ba]) = b;
    let mix = |x: u8, y: u8| truncate_channel(f64::from(x) * inverse + f64::from(y) * factor);

    Rgba([mix(ar, br), mix(ag, bg), mix(ab, bb), mix(aa, ba)])
}

/// スムーズステップ関数でブレンド係数を計算する
///
/// `normalized = distance / max_distance` に対して
/// `normalized² × (3 − 2 × normalized)` を求め、`strength` を掛けてから
/// [0, 1] にクランプする。クランプは必ず乗算の後に行う。
///
/// # 引数
///
/// * `distance` - 帯の外側の端からの距離（ピクセル）
/// * `max_distance` - 実効ブレンド距離
/// * `strength` - グラデーション強度
///
/// # 戻り値
///
/// ブレンド係数。`max_distance` が 0 の場合は 0
pub fn calculate_blend_factor(distance: u32, max_distance: u32, strength: f64) -> f64 {
    if max_distance == 0 {
        return 0.0;
    }

    let normalized = f64::from(distance) / f64::from(max_distance);
    let factor = normalized * normalized * (3.0 - 2.0 * normalized);

    (factor * strength).clamp(0.0, 1.0)
}
