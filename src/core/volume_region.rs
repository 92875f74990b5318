// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub trait VolumeRegion: Send + Sync {
    fn world_bound(&self) -> AABB;

    fn intersect_p(&self, ray: &Ray3f) -> Option<(Float, Float)>;

    fn sigma_a(&self, p_world: Vector3f, w: Vector3f, time: Float) -> RGBSpectrum;

    fn sigma_s(&self, p_world: Vector3f, w: Vector3f, time: Float) -> RGBSpectrum;

    fn sigma_t(&self, p_world: Vector3f, w: Vector3f, time: Float) -> RGBSpectrum {
        self.sigma_a(p_world, w, time) + self.sigma_s(p_world, w, time)
    }

    fn lve(&self, p_world: Vector3f, w: Vector3f, time: Float) -> RGBSpectrum;

    fn phase(&self, p_world: Vector3f, w_in: Vector3f, w_out: Vector3f, time: Float) -> Float;

    // Optical depth by fixed-step marching. The ray is normalized first and
    // its t-range rescaled, so step_size is in world units no matter how the
    // caller parameterized the ray.
    fn tau(&self, ray: &Ray3f, step_size: Float, offset: Float) -> RGBSpectrum {
        let length = ray.dir().norm();
        if length == 0.0 || step_size <= 0.0 {
            return RGBSpectrum::default();
        }

        let rn = Ray3f::from_parts(
            ray.origin(),
            ray.dir() / length,
            ray.min_t * length,
            ray.max_t * length,
        );
        let (t0, t1) = match self.intersect_p(&rn) {
            Some(range) => range,
            None => return RGBSpectrum::default(),
        };

        let mut result = RGBSpectrum::default();
        let mut t = t0 + offset * step_size;
        while t < t1 {
            result += self.sigma_t(rn.at(t), -rn.dir(), 0.0);
            let next = t + step_size;
            if next <= t {
                break;
            }
            t = next;
        }
        result * step_size
    }
}
