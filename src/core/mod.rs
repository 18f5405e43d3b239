// Copyright @yucwang 2021

pub mod config;
pub mod detector;
pub mod photon_count;
pub mod rng;
pub mod shower;
pub mod shower_generator;
