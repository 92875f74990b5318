// Copyright @yucwang 2026

pub mod aurora;
pub mod photon_grid;
