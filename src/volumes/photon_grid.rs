// Copyright @yucwang 2026

use crate::io::curve_utils::{self, CurveLoadError};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::curve::CatmullRomCurve;
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Copy, Clone)]
pub struct Photon {
    pub position: Vector3f,
    pub weight: RGBSpectrum,
}

impl Photon {
    pub fn new(position: Vector3f, weight: RGBSpectrum) -> Self {
        Self { position, weight }
    }
}

// Uniform voxel grid of emissive photon samples. The cell size is at least
// twice the search radius, so a radius-limited gather only ever touches a
// small fixed neighborhood of voxels.
pub struct PhotonGrid {
    extent: AABB,
    step: Float,
    radius: Float,
    nx: usize,
    ny: usize,
    nz: usize,
    photons: Vec<Photon>,
    voxels: Vec<Vec<u32>>,
    clamped: u32,
    aurora_color: [CatmullRomCurve; 3],
    aurora_intensity: CatmullRomCurve,
}

impl PhotonGrid {
    pub fn new(extent: AABB, xres: usize, yres: usize, zres: usize, search_radius: Float,
               color_curves: [CatmullRomCurve; 3], intensity_curve: CatmullRomCurve) -> Self {
        let vox = extent.diagnal();
        let dx = vox[0] / xres.max(1) as Float;
        let dy = vox[1] / yres.max(1) as Float;
        let dz = vox[2] / zres.max(1) as Float;
        let mut step = dx.max(dy).max(dz);
        step = step.max(2.0 * search_radius);

        let nx = (vox[0] / step) as usize + 1;
        let ny = (vox[1] / step) as usize + 1;
        let nz = (vox[2] / step) as usize + 1;

        // The covering box is a whole number of cells, so it can exceed the
        // requested extent.
        let p_min = extent.p_min;
        let p_max = p_min + Vector3f::new(step * nx as Float,
                                          step * ny as Float,
                                          step * nz as Float);

        log::info!("Photon grid: {}x{}x{} voxels, step {}.", nx, ny, nz, step);

        Self {
            extent: AABB::new(p_min, p_max),
            step,
            radius: search_radius,
            nx,
            ny,
            nz,
            photons: Vec::new(),
            voxels: vec![Vec::new(); nx * ny * nz],
            clamped: 0,
            aurora_color: color_curves,
            aurora_intensity: intensity_curve,
        }
    }

    pub fn from_curve_files(extent: AABB, xres: usize, yres: usize, zres: usize,
                            search_radius: Float,
                            r_path: &str, g_path: &str, b_path: &str,
                            intensity_path: &str) -> Result<Self, CurveLoadError> {
        let color_curves = [
            curve_utils::load_curve_from_file(r_path)?,
            curve_utils::load_curve_from_file(g_path)?,
            curve_utils::load_curve_from_file(b_path)?,
        ];
        let intensity_curve = curve_utils::load_curve_from_file(intensity_path)?;
        Ok(Self::new(extent, xres, yres, zres, search_radius, color_curves, intensity_curve))
    }

    // Out-of-box positions land in the nearest edge voxel.
    pub fn add_photon(&mut self, photon: Photon) {
        if !self.extent.contains(&photon.position) {
            self.clamped += 1;
        }
        let (x, y, z) = self.voxel_coord(photon.position);
        let voxel = self.voxel_index(x, y, z);
        let arena_index = self.photons.len() as u32;
        self.photons.push(photon);
        self.voxels[voxel].push(arena_index);
    }

    // Gaussian-kernel gather over the voxels whose centers lie within
    // `radius` of `p`. Black when nothing is in range.
    pub fn search(&self, p: Vector3f, radius: Float) -> RGBSpectrum {
        if radius <= 0.0 || self.photons.is_empty() {
            return RGBSpectrum::default();
        }

        let r_vec = Vector3f::new(radius, radius, radius);
        let (x0, y0, z0) = self.voxel_coord(p - r_vec);
        let (x1, y1, z1) = self.voxel_coord(p + r_vec);

        let mut sum = RGBSpectrum::default();
        let mut weight_sum: Float = 0.0;
        let inv_r2 = 1.0 / (radius * radius);

        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let center = self.voxel_center(x, y, z);
                    if (center - p).norm() > radius {
                        continue;
                    }
                    for &photon_index in &self.voxels[self.voxel_index(x, y, z)] {
                        let photon = &self.photons[photon_index as usize];
                        let d2 = (photon.position - p).norm_squared();
                        let weight = (-2.0 * d2 * inv_r2).exp();
                        sum += photon.weight * weight;
                        weight_sum += weight;
                    }
                }
            }
        }

        if weight_sum <= 0.0 {
            return RGBSpectrum::default();
        }
        sum / weight_sum
    }

    pub fn color_at(&self, height: Float) -> RGBSpectrum {
        RGBSpectrum::new(
            self.aurora_color[0].eval(height),
            self.aurora_color[1].eval(height),
            self.aurora_color[2].eval(height),
        )
    }

    pub fn intensity_at(&self, height: Float) -> Float {
        self.aurora_intensity.eval(height)
    }

    pub fn photon_count(&self) -> usize {
        self.photons.len()
    }

    pub fn voxel_photon_count(&self, x: usize, y: usize, z: usize) -> usize {
        if x >= self.nx || y >= self.ny || z >= self.nz {
            return 0;
        }
        self.voxels[self.voxel_index(x, y, z)].len()
    }

    pub fn clamped_count(&self) -> u32 {
        self.clamped
    }

    pub fn search_radius(&self) -> Float {
        self.radius
    }

    pub fn step(&self) -> Float {
        self.step
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn bbox(&self) -> AABB {
        self.extent
    }

    fn voxel_coord(&self, p: Vector3f) -> (usize, usize, usize) {
        let rel = (p - self.extent.p_min) / self.step;
        let x = (rel[0].floor() as isize).clamp(0, self.nx as isize - 1) as usize;
        let y = (rel[1].floor() as isize).clamp(0, self.ny as isize - 1) as usize;
        let z = (rel[2].floor() as isize).clamp(0, self.nz as isize - 1) as usize;
        (x, y, z)
    }

    fn voxel_index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.nx * self.ny + y * self.nx + x
    }

    fn voxel_center(&self, x: usize, y: usize, z: usize) -> Vector3f {
        self.extent.p_min + Vector3f::new((x as Float + 0.5) * self.step,
                                          (y as Float + 0.5) * self.step,
                                          (z as Float + 0.5) * self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::spectrum::Spectrum;

    fn test_curves() -> ([CatmullRomCurve; 3], CatmullRomCurve) {
        let mut r = CatmullRomCurve::new();
        r.add_sample(0.0, 1.0);
        let mut g = CatmullRomCurve::new();
        g.add_sample(0.0, 0.5);
        let mut b = CatmullRomCurve::new();
        b.add_sample(0.0, 0.25);
        let mut intensity = CatmullRomCurve::new();
        intensity.add_sample(0.0, 2.0);
        ([r, g, b], intensity)
    }

    fn unit_extent_grid(search_radius: Float) -> PhotonGrid {
        let extent = AABB::new(Vector3f::new(0.0, 0.0, 0.0),
                               Vector3f::new(10.0, 10.0, 10.0));
        let (color, intensity) = test_curves();
        PhotonGrid::new(extent, 5, 5, 5, search_radius, color, intensity)
    }

    #[test]
    fn test_grid_covering_box() {
        let grid = unit_extent_grid(1.0);

        // Requested spacing 2 per axis, 2 * radius = 2, so step stays 2 and
        // the box rounds up to 6 whole cells per axis.
        assert!((grid.step() - 2.0).abs() < 1e-6);
        assert_eq!(grid.dims(), (6, 6, 6));
        assert_eq!(grid.bbox().p_min, Vector3f::new(0.0, 0.0, 0.0));
        assert_eq!(grid.bbox().p_max, Vector3f::new(12.0, 12.0, 12.0));

        // A wide search radius dominates the requested spacing.
        let coarse = unit_extent_grid(3.0);
        assert!((coarse.step() - 6.0).abs() < 1e-6);
        assert_eq!(coarse.dims(), (2, 2, 2));
    }

    #[test]
    fn test_add_photon_indexing() {
        let mut grid = unit_extent_grid(1.0);

        grid.add_photon(Photon::new(Vector3f::new(5.0, 5.0, 5.0),
                                    RGBSpectrum::new(1.0, 0.0, 0.0)));
        assert_eq!(grid.photon_count(), 1);
        assert_eq!(grid.voxel_photon_count(2, 2, 2), 1);
        assert_eq!(grid.clamped_count(), 0);

        // Out-of-box photon clamps to the nearest edge voxel.
        grid.add_photon(Photon::new(Vector3f::new(100.0, 5.0, 5.0),
                                    RGBSpectrum::new(0.0, 1.0, 0.0)));
        assert_eq!(grid.photon_count(), 2);
        assert_eq!(grid.voxel_photon_count(5, 2, 2), 1);
        assert_eq!(grid.clamped_count(), 1);
    }

    #[test]
    fn test_search_single_photon() {
        let mut grid = unit_extent_grid(1.0);
        grid.add_photon(Photon::new(Vector3f::new(5.0, 5.0, 5.0),
                                    RGBSpectrum::new(1.0, 0.0, 0.0)));

        let found = grid.search(Vector3f::new(5.0, 5.0, 5.0), 1.0);
        assert!((found[0] - 1.0).abs() < 1e-5);
        assert!(found[1].abs() < 1e-6);
        assert!(found[2].abs() < 1e-6);

        // Far away and with a tiny radius nothing is in range.
        let far = grid.search(Vector3f::new(25.0, 5.0, 5.0), 0.001);
        assert!(far.is_black());
    }

    #[test]
    fn test_search_empty_grid_is_black() {
        let grid = unit_extent_grid(1.0);
        assert!(grid.search(Vector3f::new(5.0, 5.0, 5.0), 1.0).is_black());
    }

    #[test]
    fn test_search_averages_colocated_photons() {
        let mut grid = unit_extent_grid(1.0);
        let p = Vector3f::new(5.0, 5.0, 5.0);
        grid.add_photon(Photon::new(p, RGBSpectrum::new(1.0, 0.0, 0.0)));
        grid.add_photon(Photon::new(p, RGBSpectrum::new(0.0, 1.0, 0.0)));
        grid.add_photon(Photon::new(p, RGBSpectrum::new(0.0, 0.0, 1.0)));

        let found = grid.search(p, 1.0);
        for idx in 0..3 {
            assert!((found[idx] - 1.0 / 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_search_weighs_near_photons_higher() {
        let mut grid = unit_extent_grid(1.0);
        let p = Vector3f::new(5.0, 5.0, 5.0);
        grid.add_photon(Photon::new(p, RGBSpectrum::new(1.0, 0.0, 0.0)));
        grid.add_photon(Photon::new(p + Vector3f::new(0.9, 0.0, 0.0),
                                    RGBSpectrum::new(0.0, 1.0, 0.0)));

        let found = grid.search(p, 1.0);
        assert!(found[0] > found[1]);
        assert!(found[1] > 0.0);
    }

    #[test]
    fn test_curve_accessors() {
        let grid = unit_extent_grid(1.0);
        let color = grid.color_at(0.0);
        assert!((color[0] - 1.0).abs() < 1e-6);
        assert!((color[1] - 0.5).abs() < 1e-6);
        assert!((color[2] - 0.25).abs() < 1e-6);
        assert!((grid.intensity_at(0.0) - 2.0).abs() < 1e-6);
        assert!((grid.search_radius() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_curve_files() {
        let dir = std::env::temp_dir();
        let mut paths = Vec::new();
        for (name, data) in [("photon_grid_r.crv", "0 1 200 1"),
                             ("photon_grid_g.crv", "0 0.5 200 0.5"),
                             ("photon_grid_b.crv", "0 0 200 0"),
                             ("photon_grid_i.crv", "0 2 200 4")].iter() {
            let mut path = dir.clone();
            path.push(name);
            std::fs::write(&path, data).expect("write curve fixture");
            paths.push(path);
        }

        let extent = AABB::new(Vector3f::new(0.0, 0.0, 0.0),
                               Vector3f::new(10.0, 10.0, 10.0));
        let grid = PhotonGrid::from_curve_files(
            extent, 5, 5, 5, 1.0,
            paths[0].to_str().expect("utf8 path"),
            paths[1].to_str().expect("utf8 path"),
            paths[2].to_str().expect("utf8 path"),
            paths[3].to_str().expect("utf8 path"),
        ).expect("curve files should load");

        assert!((grid.color_at(0.0)[0] - 1.0).abs() < 1e-6);
        assert!((grid.intensity_at(100.0) - 3.0).abs() < 1e-5);

        let missing = PhotonGrid::from_curve_files(
            extent, 5, 5, 5, 1.0,
            "/nonexistent/r.crv", "/nonexistent/g.crv",
            "/nonexistent/b.crv", "/nonexistent/i.crv");
        assert!(matches!(missing, Err(CurveLoadError::Io(_))));
    }
}
