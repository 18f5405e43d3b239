// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Rotation3f, Vector3f, C_CENT};
use super::plane::Plane;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    ZeroNormal,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::ZeroNormal => write!(f, "the normal vector must be nonzero"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// A light ray moving at the speed of light in a vacuum (cgs units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3f {
    time: Float,
    position: Vector3f,
    velocity: Vector3f,
}

impl Ray3f {
    /// A zero direction falls back to `(0, 0, 1)`.
    pub fn new(position: Vector3f, direction: Vector3f, time: Float) -> Self {
        let mut ray = Self { time, position, velocity: Vector3f::zeros() };
        ray.set_direction(direction);
        ray
    }

    pub fn position(&self) -> Vector3f {
        self.position
    }

    pub fn velocity(&self) -> Vector3f {
        self.velocity
    }

    pub fn direction(&self) -> Vector3f {
        self.velocity / C_CENT
    }

    pub fn time(&self) -> Float {
        self.time
    }

    pub fn set_direction(&mut self, direction: Vector3f) {
        let direction = if direction.norm() > 0.0 {
            direction.normalize()
        } else {
            Vector3f::new(0.0, 0.0, 1.0)
        };
        self.velocity = direction * C_CENT;
    }

    pub(crate) fn increment_position(&mut self, distance: Float) {
        self.increment_time(distance / C_CENT);
    }

    pub(crate) fn increment_time(&mut self, time_step: Float) {
        self.position += self.velocity * time_step;
        self.time += time_step;
    }

    /// Moves to `destination`, turning to face it first.
    pub fn propagate_to_point(&mut self, destination: Vector3f) {
        let offset = destination - self.position;
        let distance = offset.norm();
        if distance == 0.0 {
            return;
        }
        self.set_direction(offset);
        self.increment_position(distance);
    }

    /// Moves along the ray's line to the plane, backward if the plane is behind.
    /// A ray parallel to the plane is left where it is.
    pub fn propagate_to_plane(&mut self, plane: &Plane) {
        let t = self.time_to_plane(plane);
        if t.is_finite() {
            self.increment_time(t);
        }
    }

    pub fn plane_impact(&self, plane: &Plane) -> Vector3f {
        let t = self.time_to_plane(plane);
        if t.is_finite() {
            self.position + self.velocity * t
        } else {
            self.position
        }
    }

    /// Signed time until the plane is crossed; infinite when parallel.
    pub fn time_to_plane(&self, plane: &Plane) -> Float {
        let along = plane.normal().dot(&self.velocity);
        if along == 0.0 {
            return Float::INFINITY;
        }
        (plane.coefficient() - plane.normal().dot(&self.position)) / along
    }

    /// Mirror reflection about `normal`; the sign of the normal does not matter.
    pub fn reflect(&mut self, normal: Vector3f) -> Result<(), GeometryError> {
        if normal.norm() == 0.0 {
            return Err(GeometryError::ZeroNormal);
        }
        let n = normal.normalize();
        self.velocity -= 2.0 * self.velocity.dot(&n) * n;
        Ok(())
    }

    /// Snell's law. `normal` points out of the refracting surface, against the
    /// ray. Returns false on total internal reflection and leaves the ray as is.
    pub fn refract(&mut self, normal: Vector3f, n_in: Float, n_out: Float) -> bool {
        if normal.norm() == 0.0 || n_out == 0.0 {
            return false;
        }
        let n = normal.normalize();
        let d = self.direction();
        let ratio = n_in / n_out;
        let cos_in = -n.dot(&d);
        let discriminant = 1.0 - ratio * ratio * (1.0 - cos_in * cos_in);
        if discriminant < 0.0 {
            return false;
        }
        let refracted = ratio * d + (ratio * cos_in - discriminant.sqrt()) * n;
        self.set_direction(refracted);
        true
    }

    /// Rotates position and velocity into a new frame.
    pub fn transform(&mut self, rotation: &Rotation3f) {
        self.position = rotation * self.position;
        self.velocity = rotation * self.velocity;
    }
}

/* Tests for Ray */
