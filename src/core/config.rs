// Copyright @yucwang 2026

use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::math::constants::{Float, Vector3f};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    MissingKey(String),
    InvalidValue { key: String, value: String },
    InvalidMirrorShape(String),
    InvalidMirrorProfile(String),
    InvalidGeometry(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read configuration: {}", err),
            ConfigError::Parse(msg) => write!(f, "malformed configuration: {}", msg),
            ConfigError::MissingKey(key) => write!(f, "missing required parameter \"{}\"", key),
            ConfigError::InvalidValue { key, value } =>
                write!(f, "invalid value \"{}\" for parameter \"{}\"", value, key),
            ConfigError::InvalidMirrorShape(shape) =>
                write!(f, "the mirror shape must be disk (0) or square (1), got \"{}\"", shape),
            ConfigError::InvalidMirrorProfile(profile) =>
                write!(f, "the mirror profile must be spherical (0) or parabolic (1), got \"{}\"", profile),
            ConfigError::InvalidGeometry(msg) => write!(f, "invalid geometry: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Flat key/value parameters read from an XML file.
///
/// Entries may be written as `<param name="k" value="v"/>` or as
/// `<k>v</k>`. `<default name="k" value="v"/>` declares a substitution that
/// later values reference as `$k`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path)?;
        let config = Self::parse(&xml)?;
        log::info!("Loaded {} parameters from {}.", config.values.len(), path.display());
        Ok(config)
    }

    pub fn parse(xml: &str) -> Result<Self, ConfigError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut buf = Vec::new();

        let mut defaults: HashMap<String, String> = HashMap::new();
        let mut values: HashMap<String, String> = HashMap::new();
        let mut open: Vec<String> = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if let Some((k, v)) = name_value(&e, &defaults)? {
                        insert_entry(&tag, k, v, &mut defaults, &mut values);
                    }
                    open.push(tag);
                }
                Ok(Event::Empty(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if let Some((k, v)) = name_value(&e, &defaults)? {
                        insert_entry(&tag, k, v, &mut defaults, &mut values);
                    }
                }
                Ok(Event::Text(e)) => {
                    // Text directly under the root has no key to attach to.
                    if open.len() >= 2 {
                        let text = e.unescape()
                            .map_err(|err| ConfigError::Parse(err.to_string()))?;
                        if let Some(key) = open.last() {
                            values.insert(key.clone(), resolve_value(text.trim(), &defaults));
                        }
                    }
                }
                Ok(Event::End(_)) => {
                    open.pop();
                }
                Ok(_) => {}
                Err(e) => return Err(ConfigError::Parse(format!(
                    "error at position {}: {}", reader.buffer_position(), e))),
            }
            buf.clear();
        }

        Ok(Self { values })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn string(&self, key: &str) -> Result<&str, ConfigError> {
        self.values
            .get(key)
            .map(|v| v.as_str())
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    pub fn float(&self, key: &str) -> Result<Float, ConfigError> {
        let value = self.string(key)?;
        parse_float(value).ok_or_else(|| invalid(key, value))
    }

    pub fn float_or(&self, key: &str, default: Float) -> Result<Float, ConfigError> {
        if self.contains(key) { self.float(key) } else { Ok(default) }
    }

    pub fn usize(&self, key: &str) -> Result<usize, ConfigError> {
        let value = self.string(key)?;
        value.trim().parse::<usize>().map_err(|_| invalid(key, value))
    }

    pub fn usize_or(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        if self.contains(key) { self.usize(key) } else { Ok(default) }
    }

    pub fn u64_or(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        match self.values.get(key) {
            Some(value) => value.trim().parse::<u64>().map_err(|_| invalid(key, value)),
            None => Ok(default),
        }
    }

    /// Counts that must fit a `u32`; larger values are invalid, not truncated.
    pub fn u32_or(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        match self.values.get(key) {
            Some(value) => value.trim().parse::<u64>().ok()
                .and_then(|wide| u32::try_from(wide).ok())
                .ok_or_else(|| invalid(key, value)),
            None => Ok(default),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.values.get(key).map(|v| v.trim()) {
            None => Ok(default),
            Some("true") | Some("1") | Some("yes") => Ok(true),
            Some("false") | Some("0") | Some("no") => Ok(false),
            Some(other) => Err(invalid(key, other)),
        }
    }

    /// Three floats separated by commas and/or whitespace.
    pub fn vector(&self, key: &str) -> Result<Vector3f, ConfigError> {
        let value = self.string(key)?;
        parse_vec3(value).ok_or_else(|| invalid(key, value))
    }

    pub fn vector_or(&self, key: &str, default: Vector3f) -> Result<Vector3f, ConfigError> {
        if self.contains(key) { self.vector(key) } else { Ok(default) }
    }
}

fn name_value(e: &quick_xml::events::BytesStart,
              defaults: &HashMap<String, String>) -> Result<Option<(String, String)>, ConfigError> {
    let mut key: Option<String> = None;
    let mut value: Option<String> = None;
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConfigError::Parse(err.to_string()))?;
        let text = attr.unescape_value().map_err(|err| ConfigError::Parse(err.to_string()))?;
        match attr.key.as_ref() {
            b"name" => key = Some(text.to_string()),
            b"value" => value = Some(resolve_value(&text, defaults)),
            _ => {}
        }
    }
    Ok(match (key, value) {
        (Some(k), Some(v)) => Some((k, v)),
        _ => None,
    })
}

fn insert_entry(tag: &str, key: String, value: String,
                defaults: &mut HashMap<String, String>,
                values: &mut HashMap<String, String>) {
    if tag == "default" {
        defaults.insert(key, value);
    } else {
        values.insert(key, value);
    }
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }
}

fn parse_float(value: &str) -> Option<Float> {
    value.trim().parse::<Float>().ok()
}

fn parse_vec3(value: &str) -> Option<Vector3f> {
    let mut parts = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    let x = parse_float(parts.next()?)?;
    let y = parse_float(parts.next()?)?;
    let z = parse_float(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Vector3f::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"
        <config>
            <default name="radius" value="400"/>
            <param name="mirror_radius" value="$radius"/>
            <param name="camera_transparent" value="true"/>
            <focal_length>200</focal_length>
            <ground_normal>0, 0, 1</ground_normal>
            <param name="ground_point" value="0 0 -1000"/>
            <camera_tubes_x>20</camera_tubes_x>
        </config>
    "#;

    #[test]
    fn test_parse_both_forms() {
        let config = Config::parse(XML).unwrap();
        assert_eq!(config.float("mirror_radius").unwrap(), 400.0);
        assert_eq!(config.float("focal_length").unwrap(), 200.0);
        assert_eq!(config.usize("camera_tubes_x").unwrap(), 20);
        assert!(config.bool_or("camera_transparent", false).unwrap());
        assert_eq!(config.vector("ground_normal").unwrap(), Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(config.vector("ground_point").unwrap(), Vector3f::new(0.0, 0.0, -1000.0));
        assert!(!config.contains("radius"));
    }

    #[test]
    fn test_missing_key() {
        let config = Config::parse(XML).unwrap();
        match config.float("f_number") {
            Err(ConfigError::MissingKey(key)) => assert_eq!(key, "f_number"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(config.float_or("f_number", 1.5).unwrap(), 1.5);
        assert_eq!(config.u64_or("seed", 9).unwrap(), 9);
    }

    #[test]
    fn test_invalid_values() {
        let config = Config::from_pairs(vec![("a", "abc"), ("v", "1 2"), ("b", "maybe")]);
        assert!(matches!(config.float("a"), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(config.vector("v"), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(config.bool_or("b", true), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_u32_range() {
        let config = Config::from_pairs(vec![("low", "4294967295"), ("high", "4294967296"), ("neg", "-1")]);
        assert_eq!(config.u32_or("low", 1).unwrap(), u32::MAX);
        assert!(matches!(config.u32_or("high", 1), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(config.u32_or("neg", 1), Err(ConfigError::InvalidValue { .. })));
        assert_eq!(config.u32_or("missing", 7).unwrap(), 7);
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::MissingKey("mirror_radius".to_string());
        assert_eq!(err.to_string(), "missing required parameter \"mirror_radius\"");
    }
}
