/* Copyright 2020 @TwoCookingMice */

use crate::math::spectrum::RGBSpectrum;

use exr::prelude::*;

// Write EXR Image to file
pub fn write_exr_to_file(image: &[RGBSpectrum],
                         width: usize,
                         height: usize,
                         file_path: &str) {
    log::info!("Starting writing openexr images: {}.", file_path);

    let write_result = write_rgb_file(file_path, width, height, |x, y| {
        let pixel = image[y * width + x];
        (pixel[0], pixel[1], pixel[2])
    });
    match write_result {
        Ok(()) => println!("EXR written to: {}.", file_path),
        Err(e) => println!("EXR written error: {}.", e.to_string())
    }
}
