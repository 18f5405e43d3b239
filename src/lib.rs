// Copyright @yucwang 2021

pub mod core;
pub mod math;
pub mod optics;
pub mod reconstruction;
pub mod sensors;
