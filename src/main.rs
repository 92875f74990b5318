// Copyright 2020 TwoCookingMice

#![allow(dead_code)]

pub extern crate nalgebra as na;

mod core;
mod io;
mod math;
mod volumes;

use self::core::rng::LcgRng;
use self::core::volume_loader::load_volume;
use self::core::volume_region::VolumeRegion;
use self::io::exr_utils;
use self::math::constants::{Float, Vector3f};
use self::math::ray::Ray3f;
use self::math::spectrum::{RGBSpectrum, Spectrum};
use self::volumes::aurora::AuroraVolume;

use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <volume.xml> <output.exr> [--width N] [--height N] [--per-cell N] [--seed N] [--step S]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut width: usize = 512;
    let mut height: usize = 512;
    let mut per_cell: usize = 8;
    let mut seed: u64 = 0;
    let mut step_override: Option<Float> = None;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                width = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(512);
            }
            "--height" => {
                i += 1;
                height = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(512);
            }
            "--per-cell" => {
                i += 1;
                per_cell = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(8);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
            }
            "--step" => {
                i += 1;
                step_override = args.get(i).and_then(|v| v.parse::<Float>().ok());
            }
            _ => {}
        }
        i += 1;
    }

    let (to_world, config) = load_volume(input_path)
        .expect("failed to load volume description");
    let mut volume = AuroraVolume::from_config(to_world, config)
        .expect("failed to build aurora volume");

    let mut rng = LcgRng::new(seed);
    volume.seed_photons(per_cell, &mut rng);

    let bound = volume.world_bound();
    let step_size = step_override.unwrap_or_else(|| bound.diagnal().norm() / 256.0);

    let center = bound.center();
    let probe = Ray3f::new(Vector3f::new(center.x, center.y, bound.p_min.z - 1.0),
                           Vector3f::new(0.0, 0.0, 1.0), Some(0.0), None);
    let tau = volume.tau(&probe, step_size, 0.5);
    log::info!("Optical depth through the volume center: [{}, {}, {}].",
               tau[0], tau[1], tau[2]);

    let image = render_volume(&volume, width, height, step_size);
    exr_utils::write_exr_to_file(&image, width, height, output_path);
}

// Orthographic emission-absorption march over the volume bound, looking
// down +z. Rows are rendered in blocks pulled off a shared counter.
fn render_volume(volume: &dyn VolumeRegion, width: usize, height: usize,
                 step_size: Float) -> Vec<RGBSpectrum> {
    let mut output = vec![RGBSpectrum::default(); width * height];
    let bound = volume.world_bound();
    if !bound.is_valid() || width == 0 || height == 0 {
        return output;
    }

    let diag = bound.diagnal();
    let origin_z = bound.p_min.z - 1.0;

    let rows_per_block = 32usize;
    let total_blocks = (height + rows_per_block - 1) / rows_per_block;

    let progress = ProgressBar::new(total_blocks as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let next_block = Arc::new(AtomicUsize::new(0));
    let thread_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let (tx, rx) = mpsc::channel::<(usize, usize, Vec<RGBSpectrum>)>();

    thread::scope(|scope| {
        for _ in 0..thread_count {
            let next_block = Arc::clone(&next_block);
            let tx = tx.clone();
            scope.spawn(move || {
                loop {
                    let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                    if block_index >= total_blocks {
                        break;
                    }

                    let y0 = block_index * rows_per_block;
                    let y1 = (y0 + rows_per_block).min(height);
                    let mut block = vec![RGBSpectrum::default(); (y1 - y0) * width];
                    for y in y0..y1 {
                        for x in 0..width {
                            let u = (x as Float + 0.5) / width as Float;
                            let v = (y as Float + 0.5) / height as Float;
                            let origin = Vector3f::new(bound.p_min.x + u * diag[0],
                                                       bound.p_max.y - v * diag[1],
                                                       origin_z);
                            let ray = Ray3f::new(origin, Vector3f::new(0.0, 0.0, 1.0),
                                                 Some(0.0), None);
                            block[x + (y - y0) * width] = march_ray(volume, &ray, step_size);
                        }
                    }
                    if tx.send((y0, y1, block)).is_err() {
                        break;
                    }
                }
            });
        }

        drop(tx);
        for _ in 0..total_blocks {
            if let Ok((y0, y1, block)) = rx.recv() {
                for y in y0..y1 {
                    for x in 0..width {
                        output[x + width * y] = block[x + (y - y0) * width];
                    }
                }
                progress.inc(1);
            }
        }
    });
    progress.finish_and_clear();
    output
}

fn march_ray(volume: &dyn VolumeRegion, ray: &Ray3f, step_size: Float) -> RGBSpectrum {
    let mut radiance = RGBSpectrum::default();
    if step_size <= 0.0 {
        return radiance;
    }
    let (t0, t1) = match volume.intersect_p(ray) {
        Some(range) => range,
        None => return radiance,
    };

    let mut transmittance = RGBSpectrum::new(1.0, 1.0, 1.0);
    let mut t = t0 + 0.5 * step_size;
    while t < t1 {
        let p = ray.at(t);
        let w = -ray.dir();
        radiance += transmittance * volume.lve(p, w, 0.0) * step_size;

        let sigma_t = volume.sigma_t(p, w, 0.0);
        transmittance = transmittance * RGBSpectrum::new((-sigma_t[0] * step_size).exp(),
                                                         (-sigma_t[1] * step_size).exp(),
                                                         (-sigma_t[2] * step_size).exp());
        if transmittance.max_component() < 1e-4 {
            break;
        }

        let next = t + step_size;
        if next <= t {
            break;
        }
        t = next;
    }
    radiance
}
