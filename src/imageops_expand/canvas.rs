use crate::error::ExpandError;
use crate::imageops_expand::config::ExpansionSpec;
use crate::imageops_expand::context::RunContext;
use crate::utils::{expanded_dimensions, validate_non_empty_image};
use crate::Image;
use image::{ImageBuffer, Rgba};

const CHANNELS: usize = 4;

/// キャンバス確保後の進捗
pub const PROGRESS_ALLOCATED: u8 = 10;
/// 元画像のコピー完了時の進捗
pub const PROGRESS_COPIED: u8 = 60;

/// キャンバス拡張操作を提供するトレイト
pub trait ExpandCanvas {
    /// 上下左右に指定したピクセル数だけキャンバスを広げる
    ///
    /// 新しいキャンバスは背景色（アルファ値を含む）で塗りつぶされ、
    /// 元画像は `(left, top)` の位置にそのままコピーされる。
    ///
    /// # 引数
    ///
    /// * `spec` - 各辺の拡張量と背景色
    /// * `ctx` - 進捗通知とキャンセル確認
    ///
    /// # 戻り値
    ///
    /// 拡張されたキャンバス
    ///
    /// # エラー
    ///
    /// * 元画像が空の場合
    /// * すべての拡張量が 0 の場合
    /// * 拡張後のサイズが大きすぎる場合
    /// * 処理中にキャンセルされた場合
    fn expand_canvas(
        &self,
        spec: &ExpansionSpec,
        ctx: &RunContext<'_>,
    ) -> Result<Image<Rgba<u8>>, ExpandError>;
}

impl ExpandCanvas for Image<Rgba<u8>> {
    fn expand_canvas(
        &self,
        spec: &ExpansionSpec,
        ctx: &RunContext<'_>,
    ) -> Result<Self, ExpandError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height)?;

        if spec.is_noop() {
            return Err(ExpandError::NoExpansion);
        }

        let horizontal = u64::from(spec.left) + u64::from(spec.right);
        let vertical = u64::from(spec.top) + u64::from(spec.bottom);
        let (new_width, new_height) = expanded_dimensions((width, height), horizontal, vertical)?;

        let mut canvas = try_filled_canvas(new_width, new_height, spec.background).ok_or(
            ExpandError::CanvasTooLarge {
                width,
                height,
                horizontal,
                vertical,
            },
        )?;
        ctx.checkpoint(PROGRESS_ALLOCATED)?;

        copy_rows(self, &mut canvas, spec.offset(), ctx)?;

        ctx.report(PROGRESS_COPIED);
        Ok(canvas)
    }
}

/// 背景色で塗りつぶしたキャンバスを確保する
///
/// メモリを確保できない場合はプロセスを中断せず `None` を返す。
fn try_filled_canvas(width: u32, height: u32, background: Rgba<u8>) -> Option<Image<Rgba<u8>>> {
    let len = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)?;

    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).ok()?;
    buffer.resize(len, 0);
    buffer
        .chunks_exact_mut(CHANNELS)
        .for_each(|pixel| pixel.copy_from_slice(&background.0));

    ImageBuffer::from_raw(width, height, buffer)
}

/// 元画像を1行ずつキャンバスの指定位置へコピーする
fn copy_rows(
    source: &Image<Rgba<u8>>,
    canvas: &mut Image<Rgba<u8>>,
    (x, y): (u32, u32),
    ctx: &RunContext<'_>,
) -> Result<(), ExpandError> {
    let height = source.height();
    let source_stride = source.width() as usize * CHANNELS;
    let canvas_stride = canvas.width() as usize * CHANNELS;
    let start = x as usize * CHANNELS;
    let span = start..start + source_stride;

    let source_rows = source.as_raw().chunks_exact(source_stride);
    let canvas_rows = canvas
        .chunks_exact_mut(canvas_stride)
        .skip(y as usize);

    for (row, (source_row, canvas_row)) in (0u32..).zip(source_rows.zip(canvas_rows)) {
        ctx.check_cancelled()?;

        canvas_row[span.clone()].copy_from_slice(source_row);

        if row % 10 == 0 {
            let copied = u64::from(row) * 50 / u64::from(height);
            ctx.report(PROGRESS_ALLOCATED + copied as u8);
        }
    }

    Ok(())
}
