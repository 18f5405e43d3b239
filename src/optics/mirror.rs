// Copyright @yucwang 2026

use crate::core::config::{Config, ConfigError};
use crate::math::constants::{Float, Vector3f};
use crate::math::transform::Transform;
use crate::math::warp::{sample_uniform_disk, sample_uniform_square};

use rand::Rng;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorShape {
    Disk,
    Square,
}

impl FromStr for MirrorShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disk" | "0" => Ok(MirrorShape::Disk),
            "square" | "1" => Ok(MirrorShape::Square),
            other => Err(ConfigError::InvalidMirrorShape(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorProfile {
    Spherical,
    Parabolic,
}

impl FromStr for MirrorProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spherical" | "0" => Ok(MirrorProfile::Spherical),
            "parabolic" | "1" => Ok(MirrorProfile::Parabolic),
            other => Err(ConfigError::InvalidMirrorProfile(other.to_string())),
        }
    }
}

/// Primary mirror. The local frame has the centre of curvature at the origin
/// and the optical axis along +z, with the vertex at `z = -radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mirror {
    shape: MirrorShape,
    profile: MirrorProfile,
    radius: Float,
    focal_length: Float,
    f_number: Float,
    transform: Transform,
}

impl Mirror {
    pub fn new(shape: MirrorShape,
               profile: MirrorProfile,
               radius: Float,
               focal_length: Float,
               f_number: Float,
               transform: Transform) -> Result<Self, ConfigError> {
        if !(radius > 0.0) || !(focal_length > 0.0) || !(f_number > 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "mirror radius, focal length and f-number must be positive, got {}, {}, {}",
                radius, focal_length, f_number)));
        }
        if focal_length >= radius {
            return Err(ConfigError::InvalidGeometry(format!(
                "focal length {} must be shorter than the radius of curvature {}", focal_length, radius)));
        }
        let mirror = Self { shape, profile, radius, focal_length, f_number, transform };
        if mirror.aperture_reach() > radius {
            return Err(ConfigError::InvalidGeometry(format!(
                "aperture of diameter {} does not fit on a mirror of radius {}", mirror.diameter(), radius)));
        }
        Ok(mirror)
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let shape: MirrorShape = config.string("mirror_shape")?.parse()?;
        let profile: MirrorProfile = config.string("mirror_profile")?.parse()?;
        let transform = Transform::from_orientation(
            config.float_or("inclination", 0.0)?,
            config.float_or("azimuth", 0.0)?,
            config.vector_or("center_of_curvature", Vector3f::zeros())?);
        Self::new(shape,
                  profile,
                  config.float("mirror_radius")?,
                  config.float("focal_length")?,
                  config.float("f_number")?,
                  transform)
    }

    pub fn shape(&self) -> MirrorShape {
        self.shape
    }

    pub fn profile(&self) -> MirrorProfile {
        self.profile
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn focal_length(&self) -> Float {
        self.focal_length
    }

    pub fn f_number(&self) -> Float {
        self.f_number
    }

    pub fn diameter(&self) -> Float {
        self.focal_length / self.f_number
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn center_of_curvature(&self) -> Vector3f {
        self.transform.translation()
    }

    pub fn axis(&self) -> Vector3f {
        self.transform.apply_vector(Vector3f::new(0.0, 0.0, 1.0))
    }

    /// Uniform point on the aperture, lifted onto the mirror surface, in world
    /// coordinates.
    pub fn sample_impact_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3f {
        let p = match self.shape {
            MirrorShape::Disk => sample_uniform_disk(self.diameter(), rng),
            MirrorShape::Square => sample_uniform_square(self.diameter(), rng),
        };
        let r2 = p.x * p.x + p.y * p.y;
        let z = match self.profile {
            MirrorProfile::Spherical => -(self.radius * self.radius - r2).max(0.0).sqrt(),
            MirrorProfile::Parabolic => -self.radius + r2 / (2.0 * self.radius),
        };
        self.transform.apply_point(Vector3f::new(p.x, p.y, z))
    }

    /// Unnormalized surface normal at a world impact point, facing the
    /// centre of curvature.
    pub fn surface_normal(&self, impact: &Vector3f) -> Vector3f {
        match self.profile {
            MirrorProfile::Spherical => self.center_of_curvature() - impact,
            MirrorProfile::Parabolic => {
                let local = self.transform.inv_apply_point(*impact);
                self.transform.apply_vector(Vector3f::new(-local.x, -local.y, self.radius))
            }
        }
    }

    // Largest distance of an aperture point from the axis.
    fn aperture_reach(&self) -> Float {
        match self.shape {
            MirrorShape::Disk => self.diameter() / 2.0,
            MirrorShape::Square => self.diameter() / std::f64::consts::SQRT_2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;

    fn mirror(shape: MirrorShape, profile: MirrorProfile, transform: Transform) -> Mirror {
        Mirror::new(shape, profile, 400.0, 200.0, 1.0, transform).unwrap()
    }

    #[test]
    fn test_parse_shape_and_profile() {
        assert_eq!("disk".parse::<MirrorShape>().unwrap(), MirrorShape::Disk);
        assert_eq!("1".parse::<MirrorShape>().unwrap(), MirrorShape::Square);
        assert_eq!(" Parabolic ".parse::<MirrorProfile>().unwrap(), MirrorProfile::Parabolic);
        assert!(matches!("hexagon".parse::<MirrorShape>(), Err(ConfigError::InvalidMirrorShape(_))));
        assert!(matches!("2".parse::<MirrorProfile>(), Err(ConfigError::InvalidMirrorProfile(_))));
    }

    #[test]
    fn test_spherical_points_on_sphere() {
        let transform = Transform::from_orientation(0.3, -0.2, Vector3f::new(10.0, -5.0, 100.0));
        let mut rng = LcgRng::new(99);
        for &shape in [MirrorShape::Disk, MirrorShape::Square].iter() {
            let m = mirror(shape, MirrorProfile::Spherical, transform);
            for _ in 0..1000 {
                let p = m.sample_impact_point(&mut rng);
                let distance = (p - m.center_of_curvature()).norm();
                assert!((distance - 400.0).abs() < 1e-9);
                // Always on the far side of the centre from the sky.
                assert!((p - m.center_of_curvature()).dot(&m.axis()) < 0.0);
            }
        }
    }

    #[test]
    fn test_aperture_footprint() {
        let mut rng = LcgRng::new(5);
        let m = mirror(MirrorShape::Disk, MirrorProfile::Parabolic, Transform::default());
        for _ in 0..1000 {
            let p = m.sample_impact_point(&mut rng);
            assert!(p.x * p.x + p.y * p.y <= 100.0 * 100.0 + 1e-9);
            assert!((p.z - (-400.0 + (p.x * p.x + p.y * p.y) / 800.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normals() {
        let m = mirror(MirrorShape::Disk, MirrorProfile::Parabolic, Transform::default());
        let vertex = Vector3f::new(0.0, 0.0, -400.0);
        assert_eq!(m.surface_normal(&vertex).normalize(), Vector3f::new(0.0, 0.0, 1.0));
        let off_axis = Vector3f::new(40.0, 0.0, -400.0 + 1600.0 / 800.0);
        let n = m.surface_normal(&off_axis).normalize();
        assert!(n.x < 0.0 && n.z > 0.0);

        let sphere = mirror(MirrorShape::Disk, MirrorProfile::Spherical, Transform::default());
        let n = sphere.surface_normal(&vertex);
        assert_eq!(n, Vector3f::new(0.0, 0.0, 400.0));
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(Mirror::new(MirrorShape::Disk, MirrorProfile::Spherical, 400.0, 200.0, 0.2,
                            Transform::default()).is_err());
        assert!(Mirror::new(MirrorShape::Square, MirrorProfile::Spherical, 400.0, 200.0, 0.3,
                            Transform::default()).is_err());
        assert!(Mirror::new(MirrorShape::Disk, MirrorProfile::Spherical, 400.0, 500.0, 2.0,
                            Transform::default()).is_err());
        assert!(Mirror::new(MirrorShape::Disk, MirrorProfile::Spherical, -1.0, 200.0, 1.0,
                            Transform::default()).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_pairs(vec![
            ("mirror_shape", "square"),
            ("mirror_profile", "spherical"),
            ("mirror_radius", "400"),
            ("focal_length", "200"),
            ("f_number", "1"),
        ]);
        let m = Mirror::from_config(&config).unwrap();
        assert_eq!(m.shape(), MirrorShape::Square);
        assert!((m.diameter() - 200.0).abs() < 1e-12);

        let mut bad = config.clone();
        bad.set("mirror_shape", "triangle");
        assert!(matches!(Mirror::from_config(&bad), Err(ConfigError::InvalidMirrorShape(_))));
    }
}
