// Copyright @yucwang 2026

use std::fmt;

use crate::core::rng::LcgRng;
use crate::core::volume_region::VolumeRegion;
use crate::io::curve_utils::{self, CurveLoadError};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::curve::CatmullRomCurve;
use crate::math::phase::phase_henyey_greenstein;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::volumes::photon_grid::{Photon, PhotonGrid};

#[derive(Debug)]
pub enum VolumeBuildError {
    Curve(CurveLoadError),
    Config(String),
}

impl From<CurveLoadError> for VolumeBuildError {
    fn from(err: CurveLoadError) -> Self {
        VolumeBuildError::Curve(err)
    }
}

impl fmt::Display for VolumeBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeBuildError::Curve(err) => write!(f, "curve error: {}", err),
            VolumeBuildError::Config(err) => write!(f, "invalid volume config: {}", err),
        }
    }
}

impl std::error::Error for VolumeBuildError {}

#[derive(Debug, Clone)]
pub struct AuroraConfig {
    pub extent: AABB,
    pub xres: usize,
    pub yres: usize,
    pub zres: usize,
    pub search_radius: Float,
    pub sig_a: RGBSpectrum,
    pub sig_s: RGBSpectrum,
    pub g: Float,
    pub a: Float,
    pub b: Float,
    pub up: Vector3f,
    pub color_curve_paths: [String; 3],
    pub intensity_curve_path: String,
    pub density: Option<Vec<Float>>,
}

impl Default for AuroraConfig {
    fn default() -> Self {
        Self {
            extent: AABB::new(Vector3f::new(0.0, 0.0, 0.0),
                              Vector3f::new(1.0, 1.0, 1.0)),
            xres: 1,
            yres: 1,
            zres: 1,
            search_radius: 0.1,
            sig_a: RGBSpectrum::default(),
            sig_s: RGBSpectrum::default(),
            g: 0.0,
            a: 1.0,
            b: 1.0,
            up: Vector3f::new(0.0, 1.0, 0.0),
            color_curve_paths: [String::new(), String::new(), String::new()],
            intensity_curve_path: String::new(),
            density: None,
        }
    }
}

// Aurora participating medium: a bounded density field shaped by a vertical
// falloff profile, emitting through height-indexed curves and a photon grid.
pub struct AuroraVolume {
    sig_a: RGBSpectrum,
    sig_s: RGBSpectrum,
    g: Float,
    world_to_volume: Transform,
    extent: AABB,
    a: Float,
    b: Float,
    up_dir: Vector3f,
    ele_density: Vec<Float>,
    nx: usize,
    ny: usize,
    nz: usize,
    grid: PhotonGrid,
}

impl AuroraVolume {
    pub fn from_config(volume_to_world: Transform, config: AuroraConfig)
                       -> Result<Self, VolumeBuildError> {
        let color_curves = [
            curve_utils::load_curve_from_file(&config.color_curve_paths[0])?,
            curve_utils::load_curve_from_file(&config.color_curve_paths[1])?,
            curve_utils::load_curve_from_file(&config.color_curve_paths[2])?,
        ];
        let intensity_curve = curve_utils::load_curve_from_file(&config.intensity_curve_path)?;
        Self::with_curves(volume_to_world, config, color_curves, intensity_curve)
    }

    pub fn with_curves(volume_to_world: Transform, config: AuroraConfig,
                       color_curves: [CatmullRomCurve; 3], intensity_curve: CatmullRomCurve)
                       -> Result<Self, VolumeBuildError> {
        if config.xres == 0 || config.yres == 0 || config.zres == 0 {
            return Err(VolumeBuildError::Config("resolution must be positive".to_string()));
        }
        if config.search_radius <= 0.0 {
            return Err(VolumeBuildError::Config("search radius must be positive".to_string()));
        }

        let diag = config.extent.diagnal();
        if diag[0] <= 0.0 || diag[1] <= 0.0 || diag[2] <= 0.0 {
            return Err(VolumeBuildError::Config("extent must have positive volume".to_string()));
        }

        let up_norm = config.up.norm();
        if up_norm <= 0.0 || !up_norm.is_finite() {
            return Err(VolumeBuildError::Config("up vector must not be zero".to_string()));
        }

        let cell_count = config.xres.checked_mul(config.yres)
            .and_then(|v| v.checked_mul(config.zres))
            .ok_or_else(|| VolumeBuildError::Config("resolution overflow".to_string()))?;

        let ele_density = match config.density {
            Some(density) => {
                if density.len() != cell_count {
                    return Err(VolumeBuildError::Config(format!(
                        "density has {} values, resolution needs {}",
                        density.len(), cell_count)));
                }
                density
            }
            None => vec![1.0; cell_count],
        };

        let grid = PhotonGrid::new(config.extent, config.xres, config.yres, config.zres,
                                   config.search_radius, color_curves, intensity_curve);

        Ok(Self {
            sig_a: config.sig_a,
            sig_s: config.sig_s,
            g: config.g,
            world_to_volume: volume_to_world.inverse(),
            extent: config.extent,
            a: config.a,
            b: config.b,
            up_dir: config.up / up_norm,
            ele_density,
            nx: config.xres,
            ny: config.yres,
            nz: config.zres,
            grid,
        })
    }

    pub fn grid(&self) -> &PhotonGrid {
        &self.grid
    }

    pub fn extent(&self) -> AABB {
        self.extent
    }

    // Raw density accessor. Indices clamp to the array on every axis, so
    // interpolation never reads outside the grid.
    pub fn d(&self, x: isize, y: isize, z: isize) -> Float {
        let x = x.clamp(0, self.nx as isize - 1) as usize;
        let y = y.clamp(0, self.ny as isize - 1) as usize;
        let z = z.clamp(0, self.nz as isize - 1) as usize;
        self.ele_density[z * self.nx * self.ny + y * self.nx + x]
    }

    // Continuous density over the extent, trilinear between cell centers.
    pub fn density(&self, p_obj: Vector3f) -> Float {
        if !self.extent.contains(&p_obj) {
            return 0.0;
        }

        let mut vox = self.extent.offset(&p_obj);
        vox[0] = vox[0] * self.nx as Float - 0.5;
        vox[1] = vox[1] * self.ny as Float - 0.5;
        vox[2] = vox[2] * self.nz as Float - 0.5;
        let vx = vox[0].floor() as isize;
        let vy = vox[1].floor() as isize;
        let vz = vox[2].floor() as isize;
        let dx = vox[0] - vx as Float;
        let dy = vox[1] - vy as Float;
        let dz = vox[2] - vz as Float;

        let d00 = lerp(dx, self.d(vx, vy, vz), self.d(vx + 1, vy, vz));
        let d10 = lerp(dx, self.d(vx, vy + 1, vz), self.d(vx + 1, vy + 1, vz));
        let d01 = lerp(dx, self.d(vx, vy, vz + 1), self.d(vx + 1, vy, vz + 1));
        let d11 = lerp(dx, self.d(vx, vy + 1, vz + 1), self.d(vx + 1, vy + 1, vz + 1));
        let d0 = lerp(dy, d00, d10);
        let d1 = lerp(dy, d01, d11);
        lerp(dz, d0, d1)
    }

    // Per-cell lookup without interpolation, answering whether aurora
    // structure exists at all around the point.
    pub fn ele_density(&self, p_obj: Vector3f) -> Float {
        if !self.extent.contains(&p_obj) {
            return 0.0;
        }

        let vox = self.extent.offset(&p_obj);
        let vx = (vox[0] * self.nx as Float).floor() as isize;
        let vy = (vox[1] * self.ny as Float).floor() as isize;
        let vz = (vox[2] * self.nz as Float).floor() as isize;
        self.d(vx, vy, vz)
    }

    // Walks every density cell and drops jittered photons where aurora
    // structure exists, weighted by the emission curves at photon height.
    // Runs once before rendering; all queries afterwards take &self.
    pub fn seed_photons(&mut self, per_cell: usize, rng: &mut LcgRng) {
        let diag = self.extent.diagnal();
        let cell = Vector3f::new(diag[0] / self.nx as Float,
                                 diag[1] / self.ny as Float,
                                 diag[2] / self.nz as Float);

        let mut seeded: usize = 0;
        for z in 0..self.nz {
            for y in 0..self.ny {
                for x in 0..self.nx {
                    let cell_min = self.extent.p_min
                        + Vector3f::new(x as Float * cell[0],
                                        y as Float * cell[1],
                                        z as Float * cell[2]);
                    let density = self.ele_density(cell_min + 0.5 * cell);
                    if density <= 0.0 {
                        continue;
                    }

                    for _ in 0..per_cell {
                        let jitter = rng.next_vector3();
                        let position = cell_min
                            + Vector3f::new(jitter[0] * cell[0],
                                            jitter[1] * cell[1],
                                            jitter[2] * cell[2]);
                        let height = (position - self.extent.p_min).dot(&self.up_dir);
                        let weight = self.grid.color_at(height)
                            * (self.grid.intensity_at(height) * density);
                        self.grid.add_photon(Photon::new(position, weight));
                        seeded += 1;
                    }
                }
            }
        }

        log::info!("Seeded {} photons into the aurora grid.", seeded);
        if self.grid.clamped_count() > 0 {
            log::warn!("{} photons were clamped to the grid boundary.",
                       self.grid.clamped_count());
        }
    }

    pub fn deposit_photon(&mut self, photon: Photon) {
        self.grid.add_photon(photon);
    }
}

impl VolumeRegion for AuroraVolume {
    fn world_bound(&self) -> AABB {
        let mut out = AABB::default();
        let min = self.extent.p_min;
        let max = self.extent.p_max;
        let corners = [
            Vector3f::new(min.x, min.y, min.z),
            Vector3f::new(max.x, min.y, min.z),
            Vector3f::new(min.x, max.y, min.z),
            Vector3f::new(max.x, max.y, min.z),
            Vector3f::new(min.x, min.y, max.z),
            Vector3f::new(max.x, min.y, max.z),
            Vector3f::new(min.x, max.y, max.z),
            Vector3f::new(max.x, max.y, max.z),
        ];
        for corner in corners {
            out.expand_by_point(&self.world_to_volume.inv_apply_point(corner));
        }
        out
    }

    fn intersect_p(&self, ray: &Ray3f) -> Option<(Float, Float)> {
        let ray_v = self.world_to_volume.apply_ray(ray);
        self.extent.ray_intersect_range(&ray_v)
    }

    fn sigma_a(&self, p_world: Vector3f, _w: Vector3f, _time: Float) -> RGBSpectrum {
        self.sig_a * self.density(self.world_to_volume.apply_point(p_world))
    }

    fn sigma_s(&self, p_world: Vector3f, _w: Vector3f, _time: Float) -> RGBSpectrum {
        self.sig_s * self.density(self.world_to_volume.apply_point(p_world))
    }

    fn sigma_t(&self, p_world: Vector3f, _w: Vector3f, _time: Float) -> RGBSpectrum {
        (self.sig_a + self.sig_s) * self.density(self.world_to_volume.apply_point(p_world))
    }

    // Emission: curve color plus the smoothed photon estimate, scaled by the
    // intensity curve, the vertical falloff a * exp(-b * height) and the
    // local density clamped to [0, 1].
    fn lve(&self, p_world: Vector3f, _w: Vector3f, _time: Float) -> RGBSpectrum {
        let p_obj = self.world_to_volume.apply_point(p_world);
        if !self.extent.contains(&p_obj) {
            return RGBSpectrum::default();
        }

        let height = (p_obj - self.extent.p_min).dot(&self.up_dir);
        let falloff = self.a * (-self.b * height).exp();
        let density = self.density(p_obj).clamp(0.0, 1.0);

        let glow = self.grid.color_at(height)
            + self.grid.search(p_obj, self.grid.search_radius());
        glow * (self.grid.intensity_at(height) * falloff * density)
    }

    fn phase(&self, _p_world: Vector3f, w_in: Vector3f, w_out: Vector3f, _time: Float) -> Float {
        phase_henyey_greenstein(&w_in, &w_out, self.g)
    }
}

fn lerp(t: Float, a: Float, b: Float) -> Float {
    a + t * (b - a)
}
