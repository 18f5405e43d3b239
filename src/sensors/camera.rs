// Copyright @yucwang 2026

use crate::core::config::{Config, ConfigError};
use crate::math::constants::{Float, Vector2f, Vector3f};

/// Rectangular grid of photomultiplier tubes centred on the focal-plane axis.
/// Positions are in the telescope frame, in cm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    width: Float,
    height: Float,
    tubes_x: usize,
    tubes_y: usize,
    transparent: bool,
}

impl Camera {
    pub fn new(width: Float,
               height: Float,
               tubes_x: usize,
               tubes_y: usize,
               transparent: bool) -> Result<Self, ConfigError> {
        if !(width > 0.0) || !(height > 0.0) {
            return Err(ConfigError::InvalidGeometry(
                format!("camera extent must be positive, got {} x {}", width, height)));
        }
        if tubes_x == 0 || tubes_y == 0 {
            return Err(ConfigError::InvalidGeometry(
                format!("camera needs at least one tube per axis, got {} x {}", tubes_x, tubes_y)));
        }
        Ok(Self { width, height, tubes_x, tubes_y, transparent })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(config.float("camera_width")?,
                  config.float("camera_height")?,
                  config.usize("camera_tubes_x")?,
                  config.usize("camera_tubes_y")?,
                  config.bool_or("camera_transparent", false)?)
    }

    pub fn width(&self) -> Float {
        self.width
    }

    pub fn height(&self) -> Float {
        self.height
    }

    pub fn tubes_x(&self) -> usize {
        self.tubes_x
    }

    pub fn tubes_y(&self) -> usize {
        self.tubes_y
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Side length of one tube along x.
    pub fn pmt_linear_size(&self) -> Float {
        self.width / self.tubes_x as Float
    }

    /// Tube hit at a focal-plane position, or `None` off the grid.
    pub fn pixel_index(&self, x: Float, y: Float) -> Option<(usize, usize)> {
        let x_bin = bin(x, self.width, self.tubes_x)?;
        let y_bin = bin(y, self.height, self.tubes_y)?;
        Some((x_bin, y_bin))
    }

    /// Centre of a tube, or `None` past the last tube.
    pub fn pixel_center(&self, x_index: usize, y_index: usize) -> Option<Vector2f> {
        if x_index >= self.tubes_x || y_index >= self.tubes_y {
            return None;
        }
        let x = (x_index as Float + 0.5) * self.width / self.tubes_x as Float - self.width / 2.0;
        let y = (y_index as Float + 0.5) * self.height / self.tubes_y as Float - self.height / 2.0;
        Some(Vector2f::new(x, y))
    }

    pub fn contains(&self, position: &Vector3f) -> bool {
        position.x.abs() <= self.width / 2.0 && position.y.abs() <= self.height / 2.0
    }

    /// True when a ray at this position is absorbed by the housing. A
    /// transparent camera never absorbs.
    pub fn check_collision(&self, position: &Vector3f) -> bool {
        if self.transparent {
            return false;
        }
        !self.contains(position)
    }
}

fn bin(coord: Float, extent: Float, count: usize) -> Option<usize> {
    let index = ((coord + extent / 2.0) / extent * count as Float).floor();
    if index >= 0.0 && index < count as Float {
        Some(index as usize)
    } else {
        None
    }
}
