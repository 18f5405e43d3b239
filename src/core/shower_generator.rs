// Copyright @yucwang 2026

use crate::core::config::{Config, ConfigError};
use crate::core::shower::{Shower, ShowerParams};
use crate::math::constants::{Float, Vector3f, PI};
use crate::math::warp::{rand_linear, rand_power};

use rand::Rng;

/// Places showers around a detector at the origin, ground line along x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowerGenerator {
    pub energy_min: Float,
    pub energy_max: Float,
    pub power_index: Float,
    pub impact_max: Float,
    pub tilt_max: Float,
    pub start_distance: Float,
}

impl Default for ShowerGenerator {
    fn default() -> Self {
        Self {
            energy_min: 1e17,
            energy_max: 1e20,
            power_index: -2.7,
            impact_max: 2e6,
            tilt_max: PI / 3.0,
            start_distance: 2e6,
        }
    }
}

impl ShowerGenerator {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            energy_min: config.float_or("energy_min", defaults.energy_min)?,
            energy_max: config.float_or("energy_max", defaults.energy_max)?,
            power_index: config.float_or("power_index", defaults.power_index)?,
            impact_max: config.float_or("impact_max", defaults.impact_max)?,
            tilt_max: config.float_or("tilt_max", defaults.tilt_max)?,
            start_distance: config.float_or("start_distance", defaults.start_distance)?,
        })
    }

    /// A shower whose axis passes `impact_param` from the origin at angle
    /// `impact_angle` to the ground line, inside a shower-detector plane tilted
    /// by `sdp_tilt` from the vertical. It starts `start_distance` up the axis
    /// from the point of closest approach, at time zero.
    pub fn shower_at(&self, params: ShowerParams, impact_param: Float, impact_angle: Float,
                     sdp_tilt: Float) -> Shower {
        let ground_line = Vector3f::new(1.0, 0.0, 0.0);
        let normal = Vector3f::new(0.0, -sdp_tilt.cos(), sdp_tilt.sin());
        let up = normal.cross(&ground_line);

        let (sin_psi, cos_psi) = impact_angle.sin_cos();
        let direction = cos_psi * ground_line - sin_psi * up;
        let closest = impact_param * (sin_psi * ground_line + cos_psi * up);
        let start = closest - self.start_distance * direction;

        Shower::new(params, start, direction, 0.0)
    }

    /// Random energy (power law), impact parameter (linear density), angle and tilt.
    pub fn random_shower<R: Rng + ?Sized>(&self, params: ShowerParams, rng: &mut R) -> Shower {
        let mut params = params;
        params.energy = rand_power(self.energy_min, self.energy_max, self.power_index, rng);
        let impact_param = rand_linear(self.impact_max, rng);
        let impact_angle = PI * rng.gen::<Float>();
        let tilt = self.tilt_max * rng.gen::<Float>();
        self.shower_at(params, impact_param, impact_angle, tilt)
    }
}
