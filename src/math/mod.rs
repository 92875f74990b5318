// Copyright 2020 @TwoCookingMice

pub mod aabb;
pub mod constants;
pub mod curve;
pub mod phase;
pub mod ray;
pub mod transform;
pub mod spectrum;
