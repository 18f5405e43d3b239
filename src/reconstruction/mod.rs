// Copyright @yucwang 2026

pub mod analysis;
pub mod plane_fit;
pub mod reconstructor;
pub mod timing_fit;
