mod error;
mod imageops_expand;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use error::{ExpandError, JobError, SmartExpansionError};
pub use imageops_expand::blend::{blend_colors, calculate_blend_factor};
pub use imageops_expand::canvas::ExpandCanvas;
pub use imageops_expand::color_analysis::{
    average_color, dominant_color, edge_color, extract_region, ColorAnalysis, Region,
};
pub use imageops_expand::config::{
    BlendConfig, Edge, ExpansionSpec, DEFAULT_BLEND_DISTANCE, DEFAULT_GRADIENT_STRENGTH,
};
pub use imageops_expand::context::{CancellationToken, NoProgress, Progress, RunContext};
pub use imageops_expand::gradient::{apply_edge_gradient, effective_blend_distance};
pub use imageops_expand::job::{
    ExpansionJob, ExpansionRequest, JobEvent, JobOptions, JobState, DEFAULT_DEBOUNCE,
};
pub use imageops_expand::pipeline::{expand_background, ExpandBackground};
pub use imageops_expand::smart_expansion::{
    parse_ratio, Distribution, ExpansionAxis, ExpansionStrategy, RatioExpansion, SmartExpand,
    SmartExpansion,
};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
