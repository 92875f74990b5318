// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use std::ops;

/// Common queries over a radiometric quantity carried per color channel.
pub trait Spectrum {
    fn is_black(&self) -> bool;
    fn max_component(&self) -> Float;
    fn luminance(&self) -> Float;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RGBSpectrum {
    rgb: Vector3f
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: Vector3f::new(0.0, 0.0, 0.0) }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: Vector3f::new(r, g, b) }
    }

    pub fn from_vector3(v: Vector3f) -> Self {
        Self { rgb: v }
    }

    pub fn to_vector3(&self) -> Vector3f {
        self.rgb
    }
}

impl Spectrum for RGBSpectrum {
    fn is_black(&self) -> bool {
        self.rgb[0] == 0.0 && self.rgb[1] == 0.0 && self.rgb[2] == 0.0
    }

    fn max_component(&self) -> Float {
        self.rgb[0].max(self.rgb[1]).max(self.rgb[2])
    }

    fn luminance(&self) -> Float {
        0.2126 * self.rgb[0] + 0.7152 * self.rgb[1] + 0.0722 * self.rgb[2]
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Float {
        &self.rgb[index]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = RGBSpectrum;

    fn add(self, other: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb + other.rgb }
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, other: RGBSpectrum) {
        self.rgb += other.rgb;
    }
}

impl ops::Sub for RGBSpectrum {
    type Output = RGBSpectrum;

    fn sub(self, other: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb - other.rgb }
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = RGBSpectrum;

    fn mul(self, scale: Float) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb * scale }
    }
}

// Component-wise product, e.g. transmittance times radiance.
impl ops::Mul for RGBSpectrum {
    type Output = RGBSpectrum;

    fn mul(self, other: RGBSpectrum) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb.component_mul(&other.rgb) }
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = RGBSpectrum;

    fn div(self, denom: Float) -> RGBSpectrum {
        RGBSpectrum { rgb: self.rgb / denom }
    }
}

/* Tests for RGBSpectrum */
