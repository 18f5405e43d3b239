// Copyright @yucwang 2026

use crate::core::config::{Config, ConfigError};
use crate::core::photon_count::PhotonCount;
use crate::math::constants::{Float, Rotation3f, Vector3f, EPSILON, PI};
use crate::math::plane::Plane;
use crate::math::transform::elevation_rotation;
use crate::reconstruction::plane_fit::fit_sd_plane;
use crate::reconstruction::timing_fit::fit_timing;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructionError {
    NoValidPixels,
    NoSignal,
}

impl fmt::Display for ReconstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconstructionError::NoValidPixels => write!(f, "the photon count has no valid pixels"),
            ReconstructionError::NoSignal => write!(f, "no pixel carries enough signal to fit"),
        }
    }
}

impl std::error::Error for ReconstructionError {}

/// Result of a full reconstruction, in the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowerFit {
    pub sdp_normal: Vector3f,
    pub impact_param: Float,
    pub shower_angle: Float,
}

/// Timing data of one pixel inside the shower-detector plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSample {
    pub x: usize,
    pub y: usize,
    pub angle: Float,
    pub time: Float,
    pub weight: Float,
}

#[derive(Debug, Clone)]
pub struct Reconstructor {
    ground: Plane,
    rotation: Rotation3f,
    trigger_threshold: u32,
}

impl Reconstructor {
    pub fn new(ground: Plane, rotation: Rotation3f) -> Self {
        Self { ground, rotation, trigger_threshold: 1 }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let ground = Plane::new(config.vector("ground_normal")?, config.vector("ground_point")?);
        let rotation = elevation_rotation(config.float("elevation_angle")?);
        let threshold = config.u32_or("trigger_threshold", 1)?;
        Ok(Self::new(ground, rotation).with_trigger_threshold(threshold))
    }

    /// Minimum summed count for a pixel to take part in the timing fit.
    pub fn with_trigger_threshold(mut self, threshold: u32) -> Self {
        self.trigger_threshold = threshold.max(1);
        self
    }

    pub fn ground_plane(&self) -> &Plane {
        &self.ground
    }

    /// Detector to world rotation.
    pub fn rotation(&self) -> Rotation3f {
        self.rotation
    }

    pub fn fit_sd_plane(&self, data: &PhotonCount) -> Result<Vector3f, ReconstructionError> {
        fit_sd_plane(data, &self.rotation)
    }

    /// Intersection direction of the shower-detector plane with the ground.
    pub fn ground_line(&self, sdp_normal: &Vector3f) -> Vector3f {
        let line = sdp_normal.cross(&self.ground.normal());
        if line.norm() > EPSILON {
            return line.normalize();
        }
        // The plane is parallel to the ground; any in-plane direction will do.
        let helper = if sdp_normal.x.abs() < 0.9 {
            Vector3f::new(1.0, 0.0, 0.0)
        } else {
            Vector3f::new(0.0, 1.0, 0.0)
        };
        sdp_normal.cross(&helper).normalize()
    }

    /// Triggered pixels with their in-plane angle from `ground_line` and
    /// average arrival time. Pixels looking into the ground are skipped.
    pub fn plane_samples(&self, data: &PhotonCount, sdp_normal: &Vector3f,
                         ground_line: &Vector3f) -> Vec<PlaneSample> {
        let mut samples = Vec::new();
        for (x, y) in data.iter() {
            let weight = data.sum_bins(x, y);
            if weight < self.trigger_threshold {
                continue;
            }
            let time = match data.average_time(x, y) {
                Some(t) => t,
                None => continue,
            };
            let direction = self.rotation * data.direction(x, y);
            if self.ground.in_front_of(direction) {
                continue;
            }
            let projection = direction - direction.dot(sdp_normal) * sdp_normal;
            if projection.norm() < EPSILON {
                continue;
            }
            samples.push(PlaneSample {
                x,
                y,
                angle: projection.angle(ground_line),
                time,
                weight: weight as Float,
            });
        }
        samples
    }

    /// Fits the shower-detector plane, then the impact parameter and angle.
    ///
    /// The ground line is oriented so that the in-plane angle falls as the
    /// shower develops, which is the sense the timing model expects.
    pub fn reconstruct(&self, data: &PhotonCount) -> Result<ShowerFit, ReconstructionError> {
        if data.valid_count() == 0 {
            return Err(ReconstructionError::NoValidPixels);
        }
        let mut normal = self.fit_sd_plane(data)?;
        let ground_line = self.ground_line(&normal);
        let mut samples = self.plane_samples(data, &normal, &ground_line);
        if samples.is_empty() {
            return Err(ReconstructionError::NoSignal);
        }

        if angle_time_covariance(&samples) > 0.0 {
            normal = -normal;
            for s in samples.iter_mut() {
                s.angle = PI - s.angle;
            }
        }

        let angles: Vec<Float> = samples.iter().map(|s| s.angle).collect();
        let times: Vec<Float> = samples.iter().map(|s| s.time).collect();
        let timing = fit_timing(&angles, &times)?;
        log::info!("Reconstructed impact parameter {} and angle {} from {} pixels.",
                   timing.impact_param, timing.shower_angle, samples.len());

        Ok(ShowerFit {
            sdp_normal: normal,
            impact_param: timing.impact_param,
            shower_angle: timing.shower_angle,
        })
    }
}

fn angle_time_covariance(samples: &[PlaneSample]) -> Float {
    let total: Float = samples.iter().map(|s| s.weight).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mean_angle = samples.iter().map(|s| s.weight * s.angle).sum::<Float>() / total;
    let mean_time = samples.iter().map(|s| s.weight * s.time).sum::<Float>() / total;
    samples.iter()
        .map(|s| s.weight * (s.angle - mean_angle) * (s.time - mean_time))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shower::tests::test_params;
    use crate::core::shower_generator::ShowerGenerator;
    use crate::reconstruction::timing_fit::expected_time;

    fn flat_ground() -> Plane {
        Plane::new(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1000.0))
    }

    // One column of pixels, with arrival times from the timing model and the
    // in-plane angle measured from +y.
    fn track(impact_param: Float, shower_angle: Float) -> PhotonCount {
        let mut data = PhotonCount::new(40, 40, 2e-6, 1e-9, 2000, 0.025, 1.0);
        for y in 0..40 {
            let direction = data.direction(20, y);
            let chi = direction.angle(&Vector3f::new(0.0, 1.0, 0.0));
            let time = expected_time(2.1e-6, impact_param, shower_angle, chi);
            for _ in 0..4 {
                data.add_photon(time, &direction);
            }
        }
        data
    }

    #[test]
    fn test_reconstruct_synthetic_track() {
        let data = track(90000.0, 1.0);
        assert_eq!(data.total(), 160);
        let reconstructor = Reconstructor::new(flat_ground(), Rotation3f::identity());
        let fit = reconstructor.reconstruct(&data).unwrap();
        assert!(fit.sdp_normal.x.abs() > 0.999);
        assert_eq!(fit.shower_angle, 1.0);
        assert!((fit.impact_param - 90000.0).abs() <= 300.0);
    }

    #[test]
    fn test_ground_line_orientation() {
        let reconstructor = Reconstructor::new(flat_ground(), Rotation3f::identity());
        let normal = Vector3f::new(0.0, -1.0, 0.0);
        let line = reconstructor.ground_line(&normal);
        assert!((line.norm() - 1.0).abs() < 1e-12);
        assert!(line.dot(&normal).abs() < 1e-12);
        assert!(line.dot(&reconstructor.ground_plane().normal()).abs() < 1e-12);

        let level = reconstructor.ground_line(&Vector3f::new(0.0, 0.0, 1.0));
        assert!((level.norm() - 1.0).abs() < 1e-12);
        assert!(level.z.abs() < 1e-12);
    }

    #[test]
    fn test_generated_shower_geometry_matches_samples() {
        // The in-plane angle of the point of closest approach is pi/2 - psi.
        let generator = ShowerGenerator { start_distance: 8e5, ..ShowerGenerator::default() };
        let shower = generator.shower_at(test_params(), 2e5, 0.8, 0.0);
        let normal = Vector3f::new(0.0, -1.0, 0.0);
        let ground_line = Vector3f::new(1.0, 0.0, 0.0);
        let closest = shower.position() + shower.direction() * (-shower.position().dot(&shower.direction()));
        let projected = closest - closest.dot(&normal) * normal;
        assert!((projected.angle(&ground_line) - (PI / 2.0 - 0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_data_is_an_error() {
        let reconstructor = Reconstructor::new(flat_ground(), Rotation3f::identity());
        let blank = PhotonCount::new(10, 10, 0.0, 1e-7, 10, 0.01, 1.0);
        assert_eq!(reconstructor.reconstruct(&blank), Err(ReconstructionError::NoSignal));
        let none = PhotonCount::new(0, 0, 0.0, 1e-7, 10, 0.01, 1.0);
        assert_eq!(reconstructor.reconstruct(&none), Err(ReconstructionError::NoValidPixels));
    }

    #[test]
    fn test_from_config() {
        let config = Config::from_pairs(vec![
            ("ground_normal", "0 0 1"),
            ("ground_point", "0 0 -1000"),
            ("elevation_angle", "0.5"),
            ("trigger_threshold", "3"),
        ]);
        let reconstructor = Reconstructor::from_config(&config).unwrap();
        let up = reconstructor.rotation() * Vector3f::new(0.0, 0.0, 1.0);
        // The detector axis sits 0.5 rad above the horizon.
        assert!((up.z - (0.5 as Float).sin()).abs() < 1e-12);
        assert_eq!(reconstructor.trigger_threshold, 3);

        let mut oversized = config.clone();
        oversized.set("trigger_threshold", "4294967296");
        assert!(matches!(Reconstructor::from_config(&oversized), Err(ConfigError::InvalidValue { .. })));

        let missing = Config::from_pairs(vec![("ground_normal", "0 0 1")]);
        assert!(matches!(Reconstructor::from_config(&missing), Err(ConfigError::MissingKey(_))));
    }
}
