// Copyright @yucwang 2021

pub mod rng;
pub mod volume_loader;
pub mod volume_region;
