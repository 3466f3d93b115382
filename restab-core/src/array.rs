//! Nested array resources.
//!
//! An [`ArrayResource`] is a flat, typed list of scalars that lives inside
//! a table entry's value. It is emitted as its own `static const` array and
//! referenced by name from the entry that owns it.

use std::fmt::Write;

use crate::error::{ConfigError, CoreError};
use crate::format::Formatter;
use crate::value::Scalar;

pub const DEFAULT_VALUES_PER_LINE: usize = 8;

#[derive(Debug, Clone, PartialEq)]
struct Resolution {
    enumerator: String,
    qualified: String,
}

#[derive(Debug, Clone)]
pub struct ArrayResource {
    name: String,
    c_type: String,
    values: Vec<Scalar>,
    formatter: Formatter,
    values_per_line: usize,
    resolution: Option<Resolution>,
}

impl ArrayResource {
    pub fn new(
        name: impl Into<String>,
        c_type: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Scalar>>,
    ) -> Self {
        ArrayResource {
            name: name.into(),
            c_type: c_type.into(),
            values: values.into_iter().map(Into::into).collect(),
            formatter: Formatter::default(),
            values_per_line: DEFAULT_VALUES_PER_LINE,
            resolution: None,
        }
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_values_per_line(mut self, values_per_line: usize) -> Self {
        self.values_per_line = values_per_line;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn c_type(&self) -> &str {
        &self.c_type
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `<owner-alias>_<name>`, available once resolved.
    pub fn qualified_name(&self) -> Option<&str> {
        self.resolution
            .as_ref()
            .map(|resolution| resolution.qualified.as_str())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName("array resource name"));
        }
        if self.c_type.is_empty() {
            return Err(ConfigError::EmptyName("array resource type"));
        }
        if self.values.is_empty() {
            return Err(ConfigError::EmptyArray(self.name.clone()));
        }
        if self.values_per_line == 0 {
            return Err(ConfigError::ZeroValuesPerLine(self.name.clone()));
        }
        self.formatter.validate(&self.values)?;
        Ok(())
    }

    /// Binds this array to the entry that owns it. An array has exactly one
    /// owner, so a second call is an error.
    pub fn resolve(&mut self, enumerator: &str, owner_alias: &str) -> Result<(), CoreError> {
        if let Some(existing) = &self.resolution {
            return Err(CoreError::AlreadyResolved {
                name: self.name.clone(),
                qualified: existing.qualified.clone(),
            });
        }
        let qualified = format!("{owner_alias}_{}", self.name);
        tracing::trace!(array = %self.name, %qualified, "array resource resolved");
        self.resolution = Some(Resolution {
            enumerator: enumerator.to_string(),
            qualified,
        });
        Ok(())
    }

    pub(crate) fn resolved_name(&self) -> Result<&str, CoreError> {
        self.qualified_name()
            .ok_or_else(|| CoreError::Unresolved(self.name.clone()))
    }

    pub fn emit(&self, out: &mut impl Write, with_enum_comment: bool) -> Result<(), CoreError> {
        let resolution = self
            .resolution
            .as_ref()
            .ok_or_else(|| CoreError::Unresolved(self.name.clone()))?;
        if with_enum_comment {
            writeln!(out, "// {}", resolution.enumerator)?;
        }
        write!(
            out,
            "static const {} {}[{}] = {{",
            self.c_type,
            resolution.qualified,
            self.values.len()
        )?;

        let rendered = self.render_values()?;
        if rendered.len() > self.values_per_line {
            writeln!(out)?;
            for row in rendered.chunks(self.values_per_line) {
                writeln!(out, "  {},", row.join(", "))?;
            }
        } else {
            write!(out, " {} ", rendered.join(", "))?;
        }
        writeln!(out, "}};")?;
        Ok(())
    }

    fn render_values(&self) -> Result<Vec<String>, CoreError> {
        self.values
            .iter()
            .map(|value| self.formatter.format(value))
            .collect::<Result<_, _>>()
            .map_err(|err| CoreError::config(self.name.clone(), err))
    }
}

// Formatters carry closures, so equality is structural over everything else.
impl PartialEq for ArrayResource {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.c_type == other.c_type
            && self.values == other.values
            && self.formatter.name() == other.formatter.name()
            && self.values_per_line == other.values_per_line
            && self.resolution == other.resolution
    }
}
