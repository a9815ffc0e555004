use image::Rgba;

/// Default width of the gradient band in pixels.
pub const DEFAULT_BLEND_DISTANCE: u32 = 10;
/// Default multiplier applied to the smooth-step factor.
pub const DEFAULT_GRADIENT_STRENGTH: f64 = 0.3;

/// Settings for the edge gradient pass.
///
/// `gradient_strength` is deliberately not range-checked here; the blend
/// factor is clamped only after the strength has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendConfig {
    /// Maximum band width in pixels.
    pub blend_distance: u32,
    /// Whether the gradient pass runs at all.
    pub enable_gradient: bool,
    /// Multiplier on the smooth-step factor, nominally in `[0, 1]`.
    pub gradient_strength: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            blend_distance: DEFAULT_BLEND_DISTANCE,
            enable_gradient: true,
            gradient_strength: DEFAULT_GRADIENT_STRENGTH,
        }
    }
}

impl BlendConfig {
    pub fn set_blend_distance(&mut self, distance: u32) {
        self.blend_distance = distance;
    }

    pub fn set_gradient_enabled(&mut self, enabled: bool) {
        self.enable_gradient = enabled;
    }

    pub fn set_gradient_strength(&mut self, strength: f64) {
        self.gradient_strength = strength;
    }

    /// Returns a copy with the gradient pass turned off.
    pub fn without_gradient(mut self) -> Self {
        self.enable_gradient = false;
        self
    }
}

/// One side of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Processing order of the gradient passes.
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];
}

/// Pixels to add on each edge, plus the fill color for the new margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionSpec {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
    pub background: Rgba<u8>,
}

impl ExpansionSpec {
    pub fn new(top: u32, bottom: u32, left: u32, right: u32, background: Rgba<u8>) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            background,
        }
    }

    /// Same amount on every side.
    pub fn uniform(amount: u32, background: Rgba<u8>) -> Self {
        Self::new(amount, amount, amount, amount, background)
    }

    /// `true` when every amount is zero.
    pub fn is_noop(&self) -> bool {
        self.top == 0 && self.bottom == 0 && self.left == 0 && self.right == 0
    }

    /// Amount added on `edge`.
    pub fn amount(&self, edge: Edge) -> u32 {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    /// The smallest of the four amounts.
    pub fn min_expansion(&self) -> u32 {
        self.top.min(self.bottom).min(self.left).min(self.right)
    }

    /// Where the source image lands on the expanded canvas.
    pub fn offset(&self) -> (u32, u32) {
        (self.left, self.top)
    }
}
