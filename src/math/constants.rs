/* Copyright 2020 @Yuchen Wong */

use nalgebra as na;

pub type Float = f64;
pub type Int = i32;
pub type UInt = u32;

pub type Vector2f = na::Vector2<Float>;
pub type Vector3f = na::Vector3<Float>;
pub type Matrix3f = na::Matrix3<Float>;
pub type Rotation3f = na::Rotation3<Float>;

pub const EPSILON: Float = 1e-9;
pub const PI: Float = std::f64::consts::PI;
pub const HALF_PI: Float = std::f64::consts::FRAC_PI_2;

// Physics constants - MeV, cgs
pub const MASS_E: Float = 0.511;
pub const FINE_STRUCT: Float = 0.007297;
pub const C_CENT: Float = 2.998e10;
