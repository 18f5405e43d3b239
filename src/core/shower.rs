// Copyright @yucwang 2026

use crate::core::config::{Config, ConfigError};
use crate::math::constants::{Float, Vector3f, FINE_STRUCT, MASS_E, PI};
use crate::math::plane::Plane;
use crate::math::ray::Ray3f;

use std::fmt;

// Fixed Gaisser-Hillas parameters - g/cm^2
const X_0: Float = -70.0;
const GH_LAMBDA: Float = 70.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShowerError {
    NonPositiveThreshold(Float),
}

impl fmt::Display for ShowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowerError::NonPositiveThreshold(delta) =>
                write!(f, "no Cherenkov threshold exists for n - 1 = {}", delta),
        }
    }
}

impl std::error::Error for ShowerError {}

/// Shower profile and atmosphere parameters (eV, g/cm^2, cgs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowerParams {
    pub energy: Float,
    pub x_max: Float,
    pub n_max: Float,
    pub rho_0: Float,
    pub scale_height: Float,
    pub delta_0: Float,
}

impl ShowerParams {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            energy: config.float("energy")?,
            x_max: config.float("x_max")?,
            n_max: config.float("n_max")?,
            rho_0: config.float("rho_0")?,
            scale_height: config.float("scale_height")?,
            delta_0: config.float("delta_0")?,
        })
    }
}

/// A cosmic-ray air shower moving down its axis at the speed of light.
///
/// The kinematic state can only be read from outside; the shower moves by
/// slant depth or by time, never by direct assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shower {
    ray: Ray3f,
    params: ShowerParams,
}

impl Shower {
    pub fn new(params: ShowerParams, position: Vector3f, direction: Vector3f, time: Float) -> Self {
        Self { ray: Ray3f::new(position, direction, time), params }
    }

    pub fn params(&self) -> &ShowerParams {
        &self.params
    }

    pub fn position(&self) -> Vector3f {
        self.ray.position()
    }

    pub fn velocity(&self) -> Vector3f {
        self.ray.velocity()
    }

    pub fn direction(&self) -> Vector3f {
        self.ray.direction()
    }

    pub fn time(&self) -> Float {
        self.ray.time()
    }

    pub fn time_to_plane(&self, plane: &Plane) -> Float {
        self.ray.time_to_plane(plane)
    }

    pub fn plane_impact(&self, plane: &Plane) -> Vector3f {
        self.ray.plane_impact(plane)
    }

    pub fn energy_ev(&self) -> Float {
        self.params.energy
    }

    pub fn energy_mev(&self) -> Float {
        self.params.energy * 1e-6
    }

    /// Slant depth along the axis, using the local zenith angle.
    pub fn depth(&self) -> Float {
        let p = &self.params;
        let cos_zenith = self.direction().z.abs().max(1e-6);
        p.rho_0 * p.scale_height * (-self.height() / p.scale_height).exp() / cos_zenith
    }

    pub fn age(&self) -> Float {
        let x = self.depth();
        3.0 * x / (x + 2.0 * self.params.x_max)
    }

    /// Atmospheric density; the exponential model is evaluated at any height,
    /// including below zero.
    pub fn local_rho(&self) -> Float {
        self.params.rho_0 * (-self.height() / self.params.scale_height).exp()
    }

    /// Local value of n - 1.
    pub fn local_delta(&self) -> Float {
        self.params.delta_0 * (-self.height() / self.params.scale_height).exp()
    }

    /// Number of charged particles at the current depth.
    pub fn gaisser_hillas(&self) -> Float {
        let x = self.depth();
        if x <= X_0 {
            return 0.0;
        }
        let p = &self.params;
        let span = p.x_max - X_0;
        p.n_max * ((x - X_0) / span).powf(span / GH_LAMBDA) * ((p.x_max - x) / GH_LAMBDA).exp()
    }

    /// Cherenkov threshold energy of an electron at the current height (MeV).
    pub fn e_thresh(&self) -> Result<Float, ShowerError> {
        let delta = self.local_delta();
        let n = 1.0 + delta;
        let kinematic = 1.0 - 1.0 / (n * n);
        if !(delta > 0.0) || !(kinematic > 0.0) {
            return Err(ShowerError::NonPositiveThreshold(delta));
        }
        Ok(MASS_E / kinematic.sqrt())
    }

    /// Cherenkov photons emitted per cm per particle between two wavelengths (cm).
    pub fn photon_yield(&self, lambda_min: Float, lambda_max: Float) -> Float {
        let n = 1.0 + self.local_delta();
        let sin2 = (1.0 - 1.0 / (n * n)).max(0.0);
        2.0 * PI * FINE_STRUCT * (1.0 / lambda_min - 1.0 / lambda_max) * sin2
    }

    /// Distance from the origin to the shower axis.
    pub fn impact_param(&self) -> Float {
        self.position().cross(&self.direction()).norm()
    }

    /// Angle of the axis inside its shower-detector plane, measured from the
    /// ground line `z × n`.
    pub fn impact_angle(&self) -> Float {
        let normal = self.direction().cross(&self.position());
        if normal.norm() == 0.0 {
            return 0.0;
        }
        let ground_line = Vector3f::new(0.0, 0.0, 1.0).cross(&normal.normalize());
        if ground_line.norm() == 0.0 {
            return 0.0;
        }
        self.direction().angle(&ground_line.normalize())
    }

    /// Moves down the axis by a slant depth, using the local density.
    pub fn increment_depth(&mut self, depth: Float) {
        let distance = depth / self.local_rho();
        self.ray.increment_position(distance);
    }

    pub fn increment_time(&mut self, time_step: Float) {
        self.ray.increment_time(time_step);
    }

    /// One comma separated record: impact parameter, impact angle, direction.
    pub fn header() -> &'static str {
        "impact_param,impact_angle,dir_x,dir_y,dir_z"
    }

    pub fn to_record(&self) -> String {
        let d = self.direction();
        format!("{},{},{},{},{}", self.impact_param(), self.impact_angle(), d.x, d.y, d.z)
    }

    fn height(&self) -> Float {
        self.position().z
    }
}
