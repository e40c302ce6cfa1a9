use super::errors::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

// ── OperationName ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationName(String);

impl OperationName {
    /// Kept exactly as given; only the empty string is rejected.
    pub fn new(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(DomainError::InvalidData(
                "operation name cannot be empty".into(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OperationName {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Borrow<str> for OperationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── SchemaType ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    #[default]
    Input,
    Output,
}

impl SchemaType {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::Input => "input",
            SchemaType::Output => "output",
        }
    }
}

impl FromStr for SchemaType {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" => Ok(SchemaType::Input),
            "output" => Ok(SchemaType::Output),
            other => Err(DomainError::InvalidData(format!(
                "unknown schemaType '{}'; expected 'input' or 'output'",
                other
            ))),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── JsonPointer ───────────────────────────────────────────────────────────────

/// Parsed RFC 6901 pointer. Parsing is total: anything that is not a valid
/// path is rejected later, during resolution, with the offending segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPointer {
    raw: String,
    segments: Vec<String>,
}

impl JsonPointer {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() || raw == "/" {
            return Self {
                raw: raw.to_string(),
                segments: Vec::new(),
            };
        }

        let normalized = if raw.starts_with('/') {
            raw.to_string()
        } else {
            format!("/{}", raw)
        };
        let segments = normalized
            .split('/')
            .skip(1)
            .map(unescape_segment)
            .collect();

        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The pointer exactly as the caller wrote it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

// `~1` must be decoded before `~0` so that `~01` yields `~1`, not `/`.
fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

impl FromStr for JsonPointer {
    type Err = DomainError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ── DepthLimit ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthLimit {
    Bounded(usize),
    #[default]
    Unbounded,
}

impl DepthLimit {
    pub const TRUNCATION_DEFAULT: DepthLimit = DepthLimit::Bounded(1);

    /// True once `depth` has reached the ceiling.
    pub fn reached_at(self, depth: usize) -> bool {
        match self {
            DepthLimit::Bounded(max) => depth >= max,
            DepthLimit::Unbounded => false,
        }
    }
}

impl From<Option<usize>> for DepthLimit {
    fn from(value: Option<usize>) -> Self {
        value.map_or(DepthLimit::Unbounded, DepthLimit::Bounded)
    }
}
