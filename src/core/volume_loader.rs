// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::io::density_utils;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Matrix4f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::volumes::aurora::AuroraConfig;

#[derive(Debug)]
pub enum VolumeLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
}

impl From<std::io::Error> for VolumeLoadError {
    fn from(err: std::io::Error) -> Self {
        VolumeLoadError::Io(err)
    }
}

pub fn load_volume<P: AsRef<Path>>(path: P) -> Result<(Transform, AuroraConfig), VolumeLoadError> {
    let path = path.as_ref();
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_volume(&xml, base_dir)
}

fn parse_volume(xml: &str, base_dir: &Path) -> Result<(Transform, AuroraConfig), VolumeLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();

    let mut in_volume = false;
    let mut in_transform = false;

    let mut translate = Vector3f::new(0.0, 0.0, 0.0);
    let mut scale = Vector3f::new(1.0, 1.0, 1.0);

    let mut extent_min: Option<Vector3f> = None;
    let mut extent_max: Option<Vector3f> = None;
    let mut xres: Option<usize> = None;
    let mut yres: Option<usize> = None;
    let mut zres: Option<usize> = None;
    let mut search_radius: Option<Float> = None;
    let mut sig_a: Option<RGBSpectrum> = None;
    let mut sig_s: Option<RGBSpectrum> = None;
    let mut g: Option<Float> = None;
    let mut falloff_a: Option<Float> = None;
    let mut falloff_b: Option<Float> = None;
    let mut up: Option<Vector3f> = None;
    let mut color_curve_r: Option<String> = None;
    let mut color_curve_g: Option<String> = None;
    let mut color_curve_b: Option<String> = None;
    let mut intensity_curve: Option<String> = None;
    let mut density_file: Option<String> = None;

    let mut result: Option<(Transform, AuroraConfig)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"default" => {
                        let mut key: Option<String> = None;
                        let mut value: Option<String> = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => key = Some(attr.unescape_value().unwrap_or_default().to_string()),
                                b"value" => value = Some(attr.unescape_value().unwrap_or_default().to_string()),
                                _ => {}
                            }
                        }
                        if let (Some(k), Some(v)) = (key, value) {
                            defaults.insert(k, v);
                        }
                    }
                    b"volume" => {
                        let mut volume_type: Option<String> = None;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"type" {
                                volume_type = Some(resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults));
                            }
                        }
                        match volume_type.as_deref() {
                            Some("aurora") => in_volume = true,
                            Some(other) => {
                                return Err(VolumeLoadError::Parse(format!("unsupported volume: {}", other)));
                            }
                            None => return Err(VolumeLoadError::MissingField("volume.type")),
                        }
                    }
                    b"transform" => {
                        if in_volume {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"name" {
                                    let name = attr.unescape_value().unwrap_or_default();
                                    in_transform = name.as_ref() == "to_world";
                                }
                            }
                        }
                    }
                    b"translate" => {
                        if in_volume && in_transform {
                            let mut x: Float = 0.0;
                            let mut y: Float = 0.0;
                            let mut z: Float = 0.0;
                            for attr in e.attributes().flatten() {
                                match attr.key.as_ref() {
                                    b"x" => x = parse_float(&resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults))?,
                                    b"y" => y = parse_float(&resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults))?,
                                    b"z" => z = parse_float(&resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults))?,
                                    _ => {}
                                }
                            }
                            translate += Vector3f::new(x, y, z);
                        }
                    }
                    b"scale" => {
                        if in_volume && in_transform {
                            let mut sx: Option<Float> = None;
                            let mut sy: Option<Float> = None;
                            let mut sz: Option<Float> = None;
                            let mut uniform: Option<Float> = None;
                            for attr in e.attributes().flatten() {
                                match attr.key.as_ref() {
                                    b"x" => sx = Some(parse_float(&resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults))?),
                                    b"y" => sy = Some(parse_float(&resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults))?),
                                    b"z" => sz = Some(parse_float(&resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults))?),
                                    b"value" => uniform = Some(parse_float(&resolve_value(&attr.unescape_value().unwrap_or_default(), &defaults))?),
                                    _ => {}
                                }
                            }
                            let s = if let Some(u) = uniform {
                                Vector3f::new(u, u, u)
                            } else {
                                Vector3f::new(sx.unwrap_or(1.0), sy.unwrap_or(1.0), sz.unwrap_or(1.0))
                            };
                            scale = scale.component_mul(&s);
                        }
                    }
                    b"float" => {
                        if in_volume {
                            if let Some((name, value)) = named_value(&e, &defaults) {
                                match name.as_str() {
                                    "search_radius" => search_radius = Some(parse_float(&value)?),
                                    "g" => g = Some(parse_float(&value)?),
                                    "a" => falloff_a = Some(parse_float(&value)?),
                                    "b" => falloff_b = Some(parse_float(&value)?),
                                    _ => {}
                                }
                            }
                        }
                    }
                    b"integer" => {
                        if in_volume {
                            if let Some((name, value)) = named_value(&e, &defaults) {
                                match name.as_str() {
                                    "xres" => xres = Some(parse_usize(&value)?),
                                    "yres" => yres = Some(parse_usize(&value)?),
                                    "zres" => zres = Some(parse_usize(&value)?),
                                    _ => {}
                                }
                            }
                        }
                    }
                    b"vector" => {
                        if in_volume {
                            if let Some((name, value)) = named_value(&e, &defaults) {
                                match name.as_str() {
                                    "extent_min" => extent_min = Some(parse_vec3(&value)?),
                                    "extent_max" => extent_max = Some(parse_vec3(&value)?),
                                    "up" => up = Some(parse_vec3(&value)?),
                                    _ => {}
                                }
                            }
                        }
                    }
                    b"rgb" => {
                        if in_volume {
                            if let Some((name, value)) = named_value(&e, &defaults) {
                                match name.as_str() {
                                    "sigma_a" => sig_a = Some(parse_vec3_spectrum(&value)?),
                                    "sigma_s" => sig_s = Some(parse_vec3_spectrum(&value)?),
                                    _ => {}
                                }
                            }
                        }
                    }
                    b"string" => {
                        if in_volume {
                            if let Some((name, value)) = named_value(&e, &defaults) {
                                match name.as_str() {
                                    "color_curve_r" => color_curve_r = Some(value),
                                    "color_curve_g" => color_curve_g = Some(value),
                                    "color_curve_b" => color_curve_b = Some(value),
                                    "intensity_curve" => intensity_curve = Some(value),
                                    "density_file" => density_file = Some(value),
                                    _ => {}
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"transform" => {
                        in_transform = false;
                    }
                    b"volume" => {
                        if in_volume {
                            let mut config = AuroraConfig::default();

                            let p_min = extent_min.unwrap_or(Vector3f::new(0.0, 0.0, 0.0));
                            let p_max = extent_max.unwrap_or(Vector3f::new(1.0, 1.0, 1.0));
                            config.extent = AABB::new(p_min, p_max);

                            config.xres = xres.unwrap_or(config.xres);
                            config.yres = yres.unwrap_or(config.yres);
                            config.zres = zres.unwrap_or(config.zres);
                            config.search_radius = search_radius.unwrap_or(config.search_radius);
                            config.sig_a = sig_a.unwrap_or(config.sig_a);
                            config.sig_s = sig_s.unwrap_or(config.sig_s);
                            config.g = g.unwrap_or(config.g);
                            config.a = falloff_a.unwrap_or(config.a);
                            config.b = falloff_b.unwrap_or(config.b);
                            config.up = up.unwrap_or(config.up);

                            let r_path = color_curve_r.take()
                                .ok_or(VolumeLoadError::MissingField("volume.color_curve_r"))?;
                            let g_path = color_curve_g.take()
                                .ok_or(VolumeLoadError::MissingField("volume.color_curve_g"))?;
                            let b_path = color_curve_b.take()
                                .ok_or(VolumeLoadError::MissingField("volume.color_curve_b"))?;
                            let i_path = intensity_curve.take()
                                .ok_or(VolumeLoadError::MissingField("volume.intensity_curve"))?;
                            config.color_curve_paths = [
                                resolve_path(&r_path, base_dir),
                                resolve_path(&g_path, base_dir),
                                resolve_path(&b_path, base_dir),
                            ];
                            config.intensity_curve_path = resolve_path(&i_path, base_dir);

                            if let Some(file) = density_file.take() {
                                let file = resolve_path(&file, base_dir);
                                let expected = config.xres.checked_mul(config.yres)
                                    .and_then(|v| v.checked_mul(config.zres))
                                    .ok_or_else(|| VolumeLoadError::Parse(
                                        "resolution overflow".to_string()))?;
                                let data = density_utils::load_density_from_file(&file, expected)
                                    .map_err(|e| VolumeLoadError::Parse(format!("density load failed: {}", e)))?;
                                config.density = Some(data);
                            }

                            let matrix = Matrix4f::new_translation(&translate)
                                * Matrix4f::new_nonuniform_scaling(&scale);
                            result = Some((Transform::new(matrix), config));
                        }

                        in_volume = false;
                        in_transform = false;
                        translate = Vector3f::new(0.0, 0.0, 0.0);
                        scale = Vector3f::new(1.0, 1.0, 1.0);
                    }
                    _ => {}
                }
            }
            Err(e) => {
                return Err(VolumeLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    result.ok_or(VolumeLoadError::MissingField("volume"))
}

fn named_value(e: &quick_xml::events::BytesStart, defaults: &HashMap<String, String>) -> Option<(String, String)> {
    let mut name: Option<String> = None;
    let mut value: Option<String> = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"name" => name = Some(attr.unescape_value().unwrap_or_default().to_string()),
            b"value" => value = Some(resolve_value(&attr.unescape_value().unwrap_or_default(), defaults)),
            _ => {}
        }
    }
    match (name, value) {
        (Some(name), Some(value)) => Some((name, value)),
        _ => None,
    }
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn resolve_path(filename: &str, base_dir: &Path) -> String {
    if Path::new(filename).is_absolute() {
        filename.to_string()
    } else {
        base_dir.join(filename).to_string_lossy().to_string()
    }
}

fn parse_float(value: &str) -> Result<Float, VolumeLoadError> {
    value.parse::<Float>().map_err(|_| VolumeLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, VolumeLoadError> {
    value.parse::<usize>().map_err(|_| VolumeLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_vec3(value: &str) -> Result<Vector3f, VolumeLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| VolumeLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| VolumeLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| VolumeLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

fn parse_vec3_spectrum(value: &str) -> Result<RGBSpectrum, VolumeLoadError> {
    Ok(RGBSpectrum::from_vector3(parse_vec3(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: &str = r#"
        <string name="color_curve_r" value="curves/r.crv"/>
        <string name="color_curve_g" value="curves/g.crv"/>
        <string name="color_curve_b" value="curves/b.crv"/>
        <string name="intensity_curve" value="curves/intensity.crv"/>
    "#;

    #[test]
    fn test_parse_volume_description() {
        let xml = format!(r#"
            <scene>
                <default name="radius" value="0.25"/>
                <volume type="aurora">
                    <transform name="to_world">
                        <scale x="2.0" y="4.0" z="2.0"/>
                        <translate x="1.0" y="0.0" z="0.0"/>
                    </transform>
                    <vector name="extent_min" value="0, 0, 0"/>
                    <vector name="extent_max" value="10, 10, 10"/>
                    <integer name="xres" value="5"/>
                    <integer name="yres" value="5"/>
                    <integer name="zres" value="5"/>
                    <float name="search_radius" value="$radius"/>
                    <float name="g" value="0.4"/>
                    <float name="a" value="1.5"/>
                    <float name="b" value="0.2"/>
                    <vector name="up" value="0, 1, 0"/>
                    <rgb name="sigma_a" value="0.01, 0.02, 0.03"/>
                    <rgb name="sigma_s" value="0.1, 0.1, 0.1"/>
                    {}
                </volume>
            </scene>
        "#, CURVES);

        let (transform, config) = parse_volume(&xml, Path::new("/tmp"))
            .expect("volume description should parse");

        assert_eq!(config.xres, 5);
        assert_eq!(config.yres, 5);
        assert_eq!(config.zres, 5);
        assert!((config.search_radius - 0.25).abs() < 1e-6);
        assert!((config.g - 0.4).abs() < 1e-6);
        assert!((config.a - 1.5).abs() < 1e-6);
        assert!((config.b - 0.2).abs() < 1e-6);
        assert_eq!(config.extent.p_min, Vector3f::new(0.0, 0.0, 0.0));
        assert_eq!(config.extent.p_max, Vector3f::new(10.0, 10.0, 10.0));
        assert!((config.sig_a.to_vector3() - Vector3f::new(0.01, 0.02, 0.03)).norm() < 1e-6);
        assert!(config.color_curve_paths[0].ends_with("r.crv"));
        assert!(config.intensity_curve_path.ends_with("intensity.crv"));
        assert!(config.density.is_none());

        // Scale then translate.
        let p = transform.apply_point(Vector3f::new(1.0, 1.0, 1.0));
        assert!((p - Vector3f::new(3.0, 4.0, 2.0)).norm() < 1e-5);
    }

    #[test]
    fn test_parse_volume_missing_curve() {
        let xml = r#"
            <scene>
                <volume type="aurora">
                    <string name="color_curve_r" value="curves/r.crv"/>
                </volume>
            </scene>
        "#;

        match parse_volume(xml, Path::new("/tmp")) {
            Err(VolumeLoadError::MissingField(field)) => {
                assert_eq!(field, "volume.color_curve_g");
            }
            other => panic!("expected missing field error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_volume_rejects_unknown_type() {
        let xml = r#"<scene><volume type="fog"></volume></scene>"#;
        assert!(matches!(parse_volume(xml, Path::new("/tmp")),
                         Err(VolumeLoadError::Parse(_))));
    }
}
