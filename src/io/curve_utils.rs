// Copyright @yucwang 2026

use std::fmt;
use std::fs;
use std::path::Path;

use crate::math::constants::Float;
use crate::math::curve::CatmullRomCurve;

#[derive(Debug)]
pub enum CurveLoadError {
    Io(std::io::Error),
    Parse(String),
}

impl From<std::io::Error> for CurveLoadError {
    fn from(err: std::io::Error) -> Self {
        CurveLoadError::Io(err)
    }
}

impl fmt::Display for CurveLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveLoadError::Io(err) => write!(f, "io error: {}", err),
            CurveLoadError::Parse(err) => write!(f, "parse error: {}", err),
        }
    }
}

impl std::error::Error for CurveLoadError {}

// Reads whitespace-separated (height, value) pairs. A dangling final token
// is dropped with a warning instead of being paired with a stale value.
pub fn load_curve_from_str(input: &str) -> Result<CatmullRomCurve, CurveLoadError> {
    let mut curve = CatmullRomCurve::new();
    let mut tokens = input.split_whitespace();

    loop {
        let height = match tokens.next() {
            Some(token) => parse_token(token)?,
            None => break,
        };
        let value = match tokens.next() {
            Some(token) => parse_token(token)?,
            None => {
                log::warn!("dangling height sample {} at end of curve data", height);
                break;
            }
        };
        curve.add_sample(height, value);
    }

    Ok(curve)
}

pub fn load_curve_from_file<P: AsRef<Path>>(path: P) -> Result<CatmullRomCurve, CurveLoadError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    let curve = load_curve_from_str(&data)?;
    log::info!("Loaded {} curve samples from {}.", curve.len(), path.display());
    Ok(curve)
}

fn parse_token(token: &str) -> Result<Float, CurveLoadError> {
    token.parse::<Float>()
        .map_err(|_| CurveLoadError::Parse(format!("invalid float: {}", token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_curve_from_str_pairs() {
        let input = "0.0 1.0\n100.0 2.0\n200.0 3.0\n";
        let curve = load_curve_from_str(input).expect("curve should parse");
        assert_eq!(curve.len(), 3);
        assert!((curve.eval(0.0) - 1.0).abs() < 1e-6);
        assert!((curve.eval(100.0) - 2.0).abs() < 1e-6);
        assert!((curve.eval(200.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_curve_drops_dangling_token() {
        let input = "0.0 1.0 100.0";
        let curve = load_curve_from_str(input).expect("curve should parse");
        assert_eq!(curve.len(), 1);
        assert!((curve.eval(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_curve_rejects_bad_token() {
        let result = load_curve_from_str("0.0 sideways");
        assert!(matches!(result, Err(CurveLoadError::Parse(_))));
    }

    #[test]
    fn test_load_curve_from_file() {
        let mut path = std::env::temp_dir();
        path.push("borealis_curve_utils_test.crv");
        std::fs::write(&path, "0.0 0.5 150.0 1.5").expect("write curve fixture");

        let curve = load_curve_from_file(&path).expect("curve file should load");
        assert_eq!(curve.len(), 2);
        assert!((curve.eval(150.0) - 1.5).abs() < 1e-6);

        let missing = load_curve_from_file("/nonexistent/borealis.crv");
        assert!(matches!(missing, Err(CurveLoadError::Io(_))));
    }
}
