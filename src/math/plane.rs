// Copyright @yucwang 2026

use super::constants::{Float, Vector3f};

/// An oriented plane `n·p = d` with a unit normal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    normal: Vector3f,
    coefficient: Float,
}

impl Default for Plane {
    fn default() -> Self {
        Plane::new(Vector3f::zeros(), Vector3f::zeros())
    }
}

impl Plane {
    /// A zero normal falls back to `(0, 0, 1)`.
    pub fn new(normal: Vector3f, point: Vector3f) -> Self {
        let normal = if normal.norm() > 0.0 {
            normal.normalize()
        } else {
            Vector3f::new(0.0, 0.0, 1.0)
        };
        Self { normal, coefficient: normal.dot(&point) }
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    pub fn coefficient(&self) -> Float {
        self.coefficient
    }

    /// Whether a ray leaving the origin along `direction` eventually hits the plane.
    pub fn in_front_of(&self, direction: Vector3f) -> bool {
        let along = self.normal.dot(&direction);
        if self.coefficient == 0.0 || along == 0.0 {
            return false;
        }
        self.coefficient / along > 0.0
    }

    pub fn signed_distance(&self, point: Vector3f) -> Float {
        self.normal.dot(&point) - self.coefficient
    }
}
