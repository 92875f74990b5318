// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(std::f32::MAX)}
    }

    // Keeps `d` exactly as given. Transformed rays go through here so that
    // a parameter t addresses the same point before and after the transform.
    pub fn from_parts(o: Vector3f, d: Vector3f, min_t: Float, max_t: Float) -> Self {
        Self { origin: o, dir: d, min_t, max_t }
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::{Ray3f, Vector3f};

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(2.0, 0.0, 0.0);
        let ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());
        assert!((ray.dir().norm() - 1.0).abs() < 1e-6);

        let p = ray.at(3.0);
        assert!((p[0] - 3.0).abs() < 1e-6);
        assert!((p[1] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_ray3f_from_parts() {
        let o = Vector3f::new(1.0, 0.0, 0.0);
        let d = Vector3f::new(0.0, 2.0, 0.0);
        let ray = Ray3f::from_parts(o, d, 0.5, 4.0);

        // Direction length is preserved, so t = 1 advances two units.
        assert_eq!(ray.dir(), d);
        assert_eq!(ray.at(1.0), Vector3f::new(1.0, 2.0, 0.0));
        assert_eq!(ray.min_t, 0.5);
        assert_eq!(ray.max_t, 4.0);
    }
}
