// Copyright 2020 @TwoCookingMice

use super::constants::{ Vector3f, Matrix4f };
use super::ray::Ray3f;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix: matrix,
               inv_matrix: matrix.try_inverse().unwrap_or(Matrix4f::identity())}
    }

    pub fn inverse(&self) -> Self {
        Self { matrix: self.inv_matrix,
               inv_matrix: self.matrix }
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        let x = p[0] * self.matrix[(0, 0)] + p[1] * self.matrix[(0, 1)] +
            p[2] * self.matrix[(0, 2)] + self.matrix[(0, 3)];
        let y = p[0] * self.matrix[(1, 0)] + p[1] * self.matrix[(1, 1)] +
            p[2] * self.matrix[(1, 2)] + self.matrix[(1, 3)];
        let z = p[0] * self.matrix[(2, 0)] + p[1] * self.matrix[(2, 1)] +
            p[2] * self.matrix[(2, 2)] + self.matrix[(2, 3)];
        let w = p[0] * self.matrix[(3, 0)] + p[1] * self.matrix[(3, 1)] +
            p[2] * self.matrix[(3, 2)] + self.matrix[(3, 3)];

        Vector3f::new(x / w, y / w, z / w)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        let x = v[0] * self.matrix[(0, 0)] + v[1] * self.matrix[(0, 1)] + v[2] * self.matrix[(0, 2)];
        let y = v[0] * self.matrix[(1, 0)] + v[1] * self.matrix[(1, 1)] + v[2] * self.matrix[(1, 2)];
        let z = v[0] * self.matrix[(2, 0)] + v[1] * self.matrix[(2, 1)] + v[2] * self.matrix[(2, 2)];

        Vector3f::new(x, y, z)
    }

    // The direction is kept exactly as mapped, without re-normalization,
    // so that a parameter t names the same point on both sides of the
    // transform.
    pub fn apply_ray(&self, ray: &Ray3f) -> Ray3f {
        let new_p = self.apply_point(ray.origin());
        let new_d = self.apply_vector(ray.dir());

        Ray3f::from_parts(new_p, new_d, ray.min_t, ray.max_t)
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        let x = p[0] * self.inv_matrix[(0, 0)] + p[1] * self.inv_matrix[(0, 1)] +
            p[2] * self.inv_matrix[(0, 2)] + self.inv_matrix[(0, 3)];
        let y = p[0] * self.inv_matrix[(1, 0)] + p[1] * self.inv_matrix[(1, 1)] +
            p[2] * self.inv_matrix[(1, 2)] + self.inv_matrix[(1, 3)];
        let z = p[0] * self.inv_matrix[(2, 0)] + p[1] * self.inv_matrix[(2, 1)] +
            p[2] * self.inv_matrix[(2, 2)] + self.inv_matrix[(2, 3)];
        let w = p[0] * self.inv_matrix[(3, 0)] + p[1] * self.inv_matrix[(3, 1)] +
            p[2] * self.inv_matrix[(3, 2)] + self.inv_matrix[(3, 3)];

        Vector3f::new(x / w, y / w, z / w)
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        let x = v[0] * self.inv_matrix[(0, 0)] + v[1] * self.inv_matrix[(0, 1)] + v[2] * self.inv_matrix[(0, 2)];
        let y = v[0] * self.inv_matrix[(1, 0)] + v[1] * self.inv_matrix[(1, 1)] + v[2] * self.inv_matrix[(1, 2)];
        let z = v[0] * self.inv_matrix[(2, 0)] + v[1] * self.inv_matrix[(2, 1)] + v[2] * self.inv_matrix[(2, 2)];

        Vector3f::new(x, y, z)
    }

    pub fn inv_apply_ray(&self, ray: &Ray3f) -> Ray3f {
        let new_p = self.inv_apply_point(ray.origin());
        let new_d = self.inv_apply_vector(ray.dir());

        Ray3f::from_parts(new_p, new_d, ray.min_t, ray.max_t)
    }
}

/* Test for Transform */
