// Copyright @yucwang 2026

use std::fmt;
use std::fs;
use std::path::Path;

use crate::math::constants::Float;

#[derive(Debug)]
pub enum DensityLoadError {
    Io(std::io::Error),
    Malformed(String),
}

impl From<std::io::Error> for DensityLoadError {
    fn from(err: std::io::Error) -> Self {
        DensityLoadError::Io(err)
    }
}

impl fmt::Display for DensityLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DensityLoadError::Io(err) => write!(f, "io error: {}", err),
            DensityLoadError::Malformed(err) => write!(f, "malformed density file: {}", err),
        }
    }
}

impl std::error::Error for DensityLoadError {}

// Flat little-endian f32 buffer, row-major with x fastest.
pub fn load_density_from_file<P: AsRef<Path>>(path: P, expected: usize) -> Result<Vec<Float>, DensityLoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    let expected_bytes = expected
        .checked_mul(4)
        .ok_or_else(|| DensityLoadError::Malformed("density size overflow".to_string()))?;
    if bytes.len() != expected_bytes {
        return Err(DensityLoadError::Malformed(format!(
            "expected {} density values ({} bytes), file has {} bytes",
            expected, expected_bytes, bytes.len())));
    }

    let mut data = Vec::with_capacity(expected);
    for chunk in bytes.chunks_exact(4) {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(chunk);
        data.push(Float::from_le_bytes(buf));
    }

    log::info!("Loaded {} density values from {}.", data.len(), path.display());
    Ok(data)
}
