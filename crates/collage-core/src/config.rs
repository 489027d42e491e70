use serde::{Deserialize, Serialize};

/// Pixels left between neighbouring images and between rows.
pub const MARGIN_SIZE: u32 = 2;
/// Amount the target row height shrinks by on each rebalancing attempt.
pub const SHRINK_STEP: u32 = 10;
/// Neutral-dark canvas fill.
pub const BACKGROUND: [u8; 3] = [35, 35, 35];

/// Collage configuration.
/// Key notes:
///   - `width` is the final canvas width; `row_height` is only the starting target,
///     the packer may lower it to get rid of single-image rows
///   - `margin` is added after every image and after every row
///   - `parallel` only has an effect when the crate is built with feature "parallel"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollageConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Initial target row height in pixels.
    pub row_height: u32,

    /// Gap after each image and each row.
    #[serde(default = "default_margin")]
    pub margin: u32,
    /// Row height decrement per rebalancing attempt.
    #[serde(default = "default_shrink_step")]
    pub shrink_step: u32,
    /// Canvas background (RGB).
    #[serde(default = "default_background")]
    pub background: [u8; 3],

    /// Convert the final canvas to a single luma channel.
    #[serde(default)]
    pub greyscale: bool,
    /// Probe and decode images in parallel when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            row_height: 256,
            margin: default_margin(),
            shrink_step: default_shrink_step(),
            background: default_background(),
            greyscale: false,
            parallel: default_parallel(),
        }
    }
}

impl CollageConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Width or row height is zero
    /// - The shrink step is zero (the packer could never make progress)
    /// - The margin alone is as wide as the canvas
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CollageError;

        if self.width == 0 || self.row_height == 0 {
            return Err(CollageError::InvalidDimensions {
                width: self.width,
                height: self.row_height,
            });
        }

        if self.shrink_step == 0 {
            return Err(CollageError::InvalidConfig(
                "shrink_step must be greater than 0".into(),
            ));
        }

        if self.margin >= self.width {
            return Err(CollageError::InvalidConfig(format!(
                "margin ({}) leaves no room in a {} px wide canvas",
                self.margin, self.width
            )));
        }

        Ok(())
    }
}

fn default_margin() -> u32 {
    MARGIN_SIZE
}
fn default_shrink_step() -> u32 {
    SHRINK_STEP
}
fn default_background() -> [u8; 3] {
    BACKGROUND
}
fn default_parallel() -> bool {
    false
}

/// Builder for `CollageConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct CollageConfigBuilder {
    cfg: CollageConfig,
}

impl CollageConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: CollageConfig::default(),
        }
    }
    pub fn with_dimensions(mut self, width: u32, row_height: u32) -> Self {
        self.cfg.width = width;
        self.cfg.row_height = row_height;
        self
    }
    pub fn margin(mut self, v: u32) -> Self {
        self.cfg.margin = v;
        self
    }
    pub fn shrink_step(mut self, v: u32) -> Self {
        self.cfg.shrink_step = v;
        self
    }
    pub fn background(mut self, v: [u8; 3]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn greyscale(mut self, v: bool) -> Self {
        self.cfg.greyscale = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> CollageConfig {
        self.cfg
    }
}

impl CollageConfig {
    /// Create a fluent builder for `CollageConfig`.
    pub fn builder() -> CollageConfigBuilder {
        CollageConfigBuilder::new()
    }
}
