// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Rotation3f, Vector3f, HALF_PI };

/// A rigid frame change: `world = rotation * local + translation`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    rotation: Rotation3f,
    translation: Vector3f
}

impl Default for Transform {
    fn default() -> Self {
        Self { rotation: Rotation3f::identity(),
               translation: Vector3f::zeros() }
    }
}

impl Transform {
    pub fn new(rotation: Rotation3f, translation: Vector3f) -> Self {
        Self { rotation, translation }
    }

    // Tilts about y by the inclination first, then turns about x by the azimuth.
    pub fn from_orientation(inclination: Float, azimuth: Float, origin: Vector3f) -> Self {
        let rotation = Rotation3f::from_axis_angle(&Vector3f::x_axis(), azimuth) *
            Rotation3f::from_axis_angle(&Vector3f::y_axis(), inclination);
        Self::new(rotation, origin)
    }

    pub fn rotation(&self) -> Rotation3f {
        self.rotation
    }

    pub fn translation(&self) -> Vector3f {
        self.translation
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        self.rotation * p + self.translation
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        self.rotation * v
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        self.rotation.inverse() * (p - self.translation)
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        self.rotation.inverse() * v
    }
}

/// Detector to world rotation for a detector whose axis sits `elevation` above
/// the horizon. The two frames share the x-axis.
pub fn elevation_rotation(elevation: Float) -> Rotation3f {
    Rotation3f::from_axis_angle(&Vector3f::x_axis(), -HALF_PI + elevation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_round_trip() {
        let transform = Transform::from_orientation(0.3, -0.7, Vector3f::new(1.0, 2.0, 3.0));
        let p = Vector3f::new(-4.0, 0.5, 9.0);
        let back = transform.inv_apply_point(transform.apply_point(p));
        assert!((back - p).norm() < 1e-12);

        let v = Vector3f::new(0.0, 0.0, 1.0);
        assert!((transform.apply_vector(v).norm() - 1.0).abs() < 1e-12);
        let v_back = transform.inv_apply_vector(transform.apply_vector(v));
        assert!((v_back - v).norm() < 1e-12);
    }

    #[test]
    fn test_identity_orientation() {
        let transform = Transform::from_orientation(0.0, 0.0, Vector3f::zeros());
        let axis = transform.apply_vector(Vector3f::new(0.0, 0.0, 1.0));
        assert!((axis - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_elevation_rotation() {
        let axis = elevation_rotation(0.0) * Vector3f::new(0.0, 0.0, 1.0);
        assert!((axis - Vector3f::new(0.0, 1.0, 0.0)).norm() < 1e-12);

        let axis = elevation_rotation(HALF_PI) * Vector3f::new(0.0, 0.0, 1.0);
        assert!((axis - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }
}
