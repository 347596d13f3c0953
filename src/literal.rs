//! Typed interpretation of a single textual cell.
//!
//! A [`Literal`] keeps the raw string it was parsed from together with the
//! best-effort kind: integer first, then floating point, else plain string.
//! Construction never fails.

use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeStruct};

#[derive(Debug, Clone, Copy)]
pub enum LiteralKind {
    Integer(i64),
    Float(f64),
    String,
}

impl LiteralKind {
    pub fn name(&self) -> &'static str {
        match self {
            LiteralKind::Integer(_) => "integer",
            LiteralKind::Float(_) => "float",
            LiteralKind::String => "string",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Literal {
    raw: String,
    kind: LiteralKind,
}

/// Floats compare by bit pattern, so a `NaN` kind equals itself.
impl PartialEq for LiteralKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LiteralKind::Integer(a), LiteralKind::Integer(b)) => a == b,
            (LiteralKind::Float(a), LiteralKind::Float(b)) => a.to_bits() == b.to_bits(),
            (LiteralKind::String, LiteralKind::String) => true,
            _ => false,
        }
    }
}

/// The kind is a function of the raw text, so comparing the raw text is
/// enough.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Literal {}

impl Literal {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = resolve_kind(&raw);
        Self { raw, kind }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> LiteralKind {
        self.kind
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            LiteralKind::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Integers widen to floats; strings have no numeric value.
    pub fn as_float(&self) -> Option<f64> {
        match self.kind {
            LiteralKind::Integer(i) => Some(i as f64),
            LiteralKind::Float(f) => Some(f),
            LiteralKind::String => None,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self.kind, LiteralKind::Integer(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self.kind, LiteralKind::Float(_))
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

fn resolve_kind(raw: &str) -> LiteralKind {
    if let Ok(i) = raw.parse::<i64>() {
        return LiteralKind::Integer(i);
    }
    match raw.parse::<f64>() {
        Ok(f) => LiteralKind::Float(f),
        Err(_) => LiteralKind::String,
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::new(value)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::new(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Literal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Literal", 2)?;
        state.serialize_field("kind", self.kind.name())?;
        state.serialize_field("value", &self.raw)?;
        state.end()
    }
}
