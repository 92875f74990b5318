// Copyright @yucwang 2026

use crate::math::constants::Float;

pub struct CatmullRomCurve {
    positions: Vec<Float>,
    values: Vec<Float>,
}

impl CatmullRomCurve {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    // Keeps samples sorted by position so eval() can bisect.
    pub fn add_sample(&mut self, position: Float, value: Float) {
        let idx = self.positions.partition_point(|p| *p <= position);
        self.positions.insert(idx, position);
        self.values.insert(idx, value);
    }

    // Clamps to the first/last sample outside the covered range.
    pub fn eval(&self, x: Float) -> Float {
        let n = self.positions.len();
        if n == 0 {
            return 0.0;
        }
        if n == 1 || x <= self.positions[0] {
            return self.values[0];
        }
        if x >= self.positions[n - 1] {
            return self.values[n - 1];
        }

        let hi = self.positions.partition_point(|p| *p <= x).clamp(1, n - 1);
        let lo = hi - 1;

        let x0 = self.positions[lo];
        let x1 = self.positions[hi];
        let width = x1 - x0;
        if width < 1e-8 {
            return self.values[hi];
        }
        let t = (x - x0) / width;

        // Finite-difference tangents, one-sided at the ends of the range.
        let d0 = if lo > 0 {
            width * (self.values[hi] - self.values[lo - 1]) / (x1 - self.positions[lo - 1])
        } else {
            self.values[hi] - self.values[lo]
        };
        let d1 = if hi + 1 < n {
            width * (self.values[hi + 1] - self.values[lo]) / (self.positions[hi + 1] - x0)
        } else {
            self.values[hi] - self.values[lo]
        };

        let t2 = t * t;
        let t3 = t2 * t;
        (2.0 * t3 - 3.0 * t2 + 1.0) * self.values[lo]
            + (-2.0 * t3 + 3.0 * t2) * self.values[hi]
            + (t3 - 2.0 * t2 + t) * d0
            + (t3 - t2) * d1
    }
}
