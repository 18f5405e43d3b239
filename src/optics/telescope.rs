// Copyright @yucwang 2026

use crate::core::config::{Config, ConfigError};
use crate::core::detector::{Detection, Detector};
use crate::core::photon_count::PhotonCount;
use crate::core::shower::Shower;
use crate::math::constants::{Float, Rotation3f, Vector3f};
use crate::math::plane::Plane;
use crate::math::ray::Ray3f;
use crate::optics::mirror::Mirror;
use crate::sensors::camera::Camera;

use rand::{Rng, RngCore};

/// A mirror with a camera at its focal plane, watching for light over a
/// ground plane.
#[derive(Debug, Clone)]
pub struct Telescope {
    mirror: Mirror,
    camera: Camera,
    ground: Plane,
}

impl Telescope {
    pub fn new(mirror: Mirror, camera: Camera, ground: Plane) -> Self {
        Self { mirror, camera, ground }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mirror = Mirror::from_config(config)?;
        let camera = Camera::from_config(config)?;
        let ground = Plane::new(config.vector("ground_normal")?, config.vector("ground_point")?);
        log::info!("Telescope: {:?} {:?} mirror, diameter {}, camera {} x {} tubes.",
                   mirror.shape(), mirror.profile(), mirror.diameter(),
                   camera.tubes_x(), camera.tubes_y());
        Ok(Self::new(mirror, camera, ground))
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Telescope to world rotation.
    pub fn rotation(&self) -> Rotation3f {
        self.mirror.transform().rotation()
    }

    pub fn axis(&self) -> Vector3f {
        self.mirror.axis()
    }

    pub fn focal_plane(&self) -> Plane {
        let offset = self.mirror.focal_length() - self.mirror.radius();
        let axis = self.axis();
        Plane::new(axis, self.mirror.center_of_curvature() + offset * axis)
    }

    /// Traces one photon from the shower to the focal plane. `None` is a
    /// physical non-detection.
    pub fn trace_photon<R: Rng + ?Sized>(&self, shower: &Shower, rng: &mut R) -> Option<Detection> {
        let impact = self.mirror.sample_impact_point(rng);
        let normal = self.mirror.surface_normal(&impact);
        let focal_plane = self.focal_plane();
        let transform = self.mirror.transform();

        let mut ray = Ray3f::new(shower.position(), impact - shower.position(), shower.time());
        ray.propagate_to_plane(&focal_plane);
        if self.camera.check_collision(&transform.inv_apply_point(ray.position())) {
            return None;
        }

        ray.propagate_to_point(impact);
        ray.reflect(normal).ok()?;
        ray.propagate_to_plane(&focal_plane);

        let local = transform.inv_apply_point(ray.position());
        if !self.camera.contains(&local) {
            return None;
        }
        Some(Detection { x: local.x, y: local.y, time: ray.time() })
    }

    /// Bins a raw detection stream by pixel view direction. The time axis
    /// starts at the earliest detection and covers the latest.
    pub fn count_photons(&self, detections: &[Detection], time_bin: Float) -> PhotonCount {
        let depth = self.mirror.radius() - self.mirror.focal_length();
        let linear_size = self.camera.pmt_linear_size();
        let angular_size = linear_size / depth;

        let (start, end) = detections.iter().fold((Float::INFINITY, Float::NEG_INFINITY),
            |(lo, hi), d| (lo.min(d.time), hi.max(d.time)));
        let (start, n_bins) = if detections.is_empty() || !(time_bin > 0.0) {
            (0.0, 1)
        } else {
            (start, ((end - start) / time_bin).floor() as usize + 1)
        };

        let mut data = PhotonCount::new(self.camera.tubes_x(), self.camera.tubes_y(),
                                        start, time_bin, n_bins, angular_size, linear_size);
        let mut stored = 0usize;
        for d in detections {
            let direction = Vector3f::new(-d.x, -d.y, depth).normalize();
            if data.add_photon(d.time, &direction) {
                stored += 1;
            }
        }
        log::debug!("Binned {} of {} detections into {} time bins.", stored, detections.len(), n_bins);
        data
    }
}

impl Detector for Telescope {
    fn view_point(&self, shower: &Shower, photons: usize, rng: &mut dyn RngCore) -> Vec<Detection> {
        (0..photons).filter_map(|_| self.trace_photon(shower, rng)).collect()
    }

    fn ground_plane(&self) -> &Plane {
        &self.ground
    }
}
