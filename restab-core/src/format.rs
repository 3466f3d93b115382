//! Scalar formatters.
//!
//! Every table and every array resource renders its scalars through a
//! [`Formatter`]. A formatter only accepts the scalar kinds it knows how to
//! render; anything else is reported as a [`FormatError`] while the table is
//! being built, long before any artifact is written.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::value::Scalar;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{formatter} formatter cannot render {kind} value {value}")]
pub struct FormatError {
    pub formatter: String,
    pub kind: &'static str,
    pub value: String,
}

impl FormatError {
    pub fn new(formatter: impl Into<String>, scalar: &Scalar) -> Self {
        FormatError {
            formatter: formatter.into(),
            kind: scalar.kind(),
            value: scalar.to_string(),
        }
    }
}

type CustomFn = dyn Fn(&Scalar) -> Result<String, FormatError> + Send + Sync;

#[derive(Clone, Default)]
pub enum Formatter {
    /// `%d` for integers, `1`/`0` for booleans.
    #[default]
    Decimal,
    /// `0x` prefixed lower-case hex, zero padded to `digits`.
    Hex { digits: usize },
    /// C float literal with an `f` suffix.
    Float,
    /// Text emitted verbatim (enumerators, macros, expressions).
    Symbol,
    /// Text emitted as a quoted C string literal.
    String,
    Custom { name: String, render: Arc<CustomFn> },
}

impl Formatter {
    pub fn hex(digits: usize) -> Self {
        Formatter::Hex { digits }
    }

    pub fn custom(
        name: impl Into<String>,
        render: impl Fn(&Scalar) -> Result<String, FormatError> + Send + Sync + 'static,
    ) -> Self {
        Formatter::Custom {
            name: name.into(),
            render: Arc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Formatter::Decimal => "decimal",
            Formatter::Hex { .. } => "hex",
            Formatter::Float => "float",
            Formatter::Symbol => "symbol",
            Formatter::String => "string",
            Formatter::Custom { name, .. } => name,
        }
    }

    pub fn format(&self, scalar: &Scalar) -> Result<String, FormatError> {
        let mismatch = || FormatError::new(self.name(), scalar);
        match (self, scalar) {
            (Formatter::Decimal, Scalar::Int(value)) => Ok(value.to_string()),
            (Formatter::Decimal, Scalar::Bool(value)) => Ok(u8::from(*value).to_string()),
            (Formatter::Hex { digits }, Scalar::Int(value)) if *value >= 0 => {
                Ok(format!("0x{value:0digits$x}", digits = *digits))
            }
            (Formatter::Float, Scalar::Float(value)) if value.is_finite() => {
                Ok(float_literal(*value))
            }
            (Formatter::Float, Scalar::Int(value)) => Ok(float_literal(*value as f64)),
            (Formatter::Symbol, Scalar::Text(text)) if !text.is_empty() => Ok(text.clone()),
            (Formatter::String, Scalar::Text(text)) => Ok(string_literal(text)),
            (Formatter::Custom { render, .. }, _) => render(scalar),
            _ => Err(mismatch()),
        }
    }

    /// Checks that every scalar can be rendered.
    pub fn validate<'a>(
        &self,
        scalars: impl IntoIterator<Item = &'a Scalar>,
    ) -> Result<(), FormatError> {
        for scalar in scalars {
            self.format(scalar)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatter::Hex { digits } => f.debug_struct("Hex").field("digits", digits).finish(),
            Formatter::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
            other => f.write_str(other.name()),
        }
    }
}

fn float_literal(value: f64) -> String {
    // `{:?}` always keeps a fractional part or an exponent.
    format!("{value:?}f")
}

fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
