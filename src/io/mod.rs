// Copyright 2020 @TwoCookingMice

pub mod curve_utils;
pub mod density_utils;
pub mod exr_utils;
