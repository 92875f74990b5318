// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    pub fn next_f32(&mut self) -> Float {
        (self.next_u32() as Float) / (u32::MAX as Float)
    }

    pub fn next_vector3(&mut self) -> Vector3f {
        let x = self.next_f32();
        let y = self.next_f32();
        let z = self.next_f32();
        Vector3f::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::LcgRng;

    #[test]
    fn rng_is_deterministic_and_bounded() {
        let mut a = LcgRng::new(42);
        let mut b = LcgRng::new(42);
        for _ in 0..100 {
            let v = a.next_f32();
            assert!(v >= 0.0 && v <= 1.0);
            assert_eq!(v, b.next_f32());
        }

        let jitter = a.next_vector3();
        for idx in 0..3 {
            assert!(jitter[idx] >= 0.0 && jitter[idx] <= 1.0);
        }
    }
}
