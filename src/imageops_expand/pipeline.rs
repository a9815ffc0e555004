use crate::error::ExpandError;
use crate::imageops_expand::canvas::ExpandCanvas;
use crate::imageops_expand::config::{BlendConfig, ExpansionSpec};
use crate::imageops_expand::context::{CancellationToken, NoProgress, RunContext};
use crate::imageops_expand::gradient::apply_edge_gradient;
use crate::Image;
use image::Rgba;

pub const PROGRESS_STARTED: u8 = 0;
pub const PROGRESS_DONE: u8 = 100;

/// Runs the full expansion pipeline on the calling thread.
///
/// The canvas is allocated and filled, the source is copied in, and the
/// edge gradient is applied when `config` enables it. Progress is
/// reported at fixed checkpoints: 0, 10, 10 to 60, 60, then 70, 80, 90
/// and 95 for the gradient passes, and 100 at the end.
///
/// # Errors
///
/// See [`ExpandError`]; [`ExpandError::is_silent`] distinguishes
/// "nothing to do" from real failures.
pub fn expand_background(
    source: &Image<Rgba<u8>>,
    spec: &ExpansionSpec,
    config: &BlendConfig,
    ctx: &RunContext<'_>,
) -> Result<Image<Rgba<u8>>, ExpandError> {
    ctx.checkpoint(PROGRESS_STARTED)?;

    let canvas = source.expand_canvas(spec, ctx)?;
    let canvas = if config.enable_gradient && !spec.is_noop() {
        apply_edge_gradient(canvas, source, spec, config, ctx)?
    } else {
        canvas
    };

    ctx.checkpoint(PROGRESS_DONE)?;
    Ok(canvas)
}

/// Runs [`expand_background`] directly on an image.
pub trait ExpandBackground {
    /// Runs the full pipeline without progress reporting or cancellation.
    fn expand_background(
        &self,
        spec: &ExpansionSpec,
        config: &BlendConfig,
    ) -> Result<Image<Rgba<u8>>, ExpandError>;
}

impl ExpandBackground for Image<Rgba<u8>> {
    fn expand_background(
        &self,
        spec: &ExpansionSpec,
        config: &BlendConfig,
    ) -> Result<Image<Rgba<u8>>, ExpandError> {
        let token = CancellationToken::new();
        expand_background(self, spec, config, &RunContext::new(&token, &NoProgress))
    }
}
