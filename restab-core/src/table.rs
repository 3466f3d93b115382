//! Enumerated resource tables.
//!
//! A table turns an ordered list of `(key, value)` entries into an enum
//! (one enumerator per entry plus a `_LAST` sentinel) and a data array
//! indexed by that enum. The [`Strategy`] decides how the array is laid out:
//!
//! - [`Strategy::Inline`] stores every compiled value directly in one
//!   contiguous array. Entries must share a regular shape.
//! - [`Strategy::Aliased`] gives every entry its own named constant
//!   (`<table>_<key>`) and stores pointers to those, so entries may differ in
//!   size and shape.
//!
//! Nested [`ArrayResource`](crate::array::ArrayResource)s are always
//! emitted before the entry that references them.

use std::collections::HashSet;
use std::fmt::Write;

use crate::error::{ConfigError, CoreError};
use crate::format::Formatter;
use crate::naming;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One contiguous array of values.
    #[default]
    Inline,
    /// Named constant per entry plus an array of pointers to them.
    Aliased,
}

impl Strategy {
    pub fn from_use_aliases(use_aliases: bool) -> Self {
        if use_aliases {
            Strategy::Aliased
        } else {
            Strategy::Inline
        }
    }

    pub fn uses_aliases(self) -> bool {
        self == Strategy::Aliased
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Caller-supplied description of one table.
#[derive(Debug, Clone)]
pub struct TableDescription {
    pub name: String,
    pub prefix: String,
    pub c_type: String,
    pub entries: Vec<Entry>,
    pub strategy: Strategy,
    pub formatter: Formatter,
    pub includes: Vec<String>,
}

impl TableDescription {
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        c_type: impl Into<String>,
    ) -> Self {
        TableDescription {
            name: name.into(),
            prefix: prefix.into(),
            c_type: c_type.into(),
            entries: Vec::new(),
            strategy: Strategy::default(),
            formatter: Formatter::default(),
            includes: Vec::new(),
        }
    }

    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push(Entry::new(key, value));
        self
    }

    pub fn use_aliases(mut self, use_aliases: bool) -> Self {
        self.strategy = Strategy::from_use_aliases(use_aliases);
        self
    }

    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn include(mut self, line: impl Into<String>) -> Self {
        self.includes.push(line.into());
        self
    }
}

#[derive(Debug, Clone)]
struct TableEntry {
    enumerator: String,
    alias: String,
    value: Value,
}

#[derive(Debug, Clone)]
pub struct ResourceTable {
    name: String,
    prefix: String,
    c_type: String,
    strategy: Strategy,
    formatter: Formatter,
    includes: Vec<String>,
    enum_name: String,
    declaration: String,
    entries: Vec<TableEntry>,
    resolved: bool,
}

impl ResourceTable {
    /// Validates a description and derives every generated identifier.
    pub fn new(description: TableDescription) -> Result<Self, CoreError> {
        let TableDescription {
            name,
            prefix,
            c_type,
            entries,
            strategy,
            formatter,
            includes,
        } = description;
        let invalid = |source: ConfigError| CoreError::config(name.clone(), source);

        if name.is_empty() {
            return Err(invalid(ConfigError::EmptyName("table name")));
        }
        if prefix.is_empty() {
            return Err(invalid(ConfigError::EmptyName("enum prefix")));
        }
        if c_type.is_empty() {
            return Err(invalid(ConfigError::EmptyName("element type")));
        }
        if entries.is_empty() {
            return Err(invalid(ConfigError::EmptyTable));
        }

        let mut seen = HashSet::new();
        let mut table_entries = Vec::with_capacity(entries.len());
        for Entry { key, value } in entries {
            if !naming::is_key(&key) {
                return Err(invalid(ConfigError::InvalidKey(key)));
            }
            if !seen.insert(key.to_lowercase()) {
                return Err(invalid(ConfigError::DuplicateKey(key)));
            }
            formatter
                .validate(value.scalars())
                .map_err(|err| invalid(err.into()))?;
            for array in value.arrays() {
                array.validate().map_err(&invalid)?;
            }
            table_entries.push(TableEntry {
                enumerator: naming::enumerator(&prefix, &key),
                alias: naming::alias(&name, &key),
                value,
            });
        }

        let pointer = if strategy.uses_aliases() { "*" } else { "" };
        let declaration = format!(
            "const {c_type} {pointer}{name}s[{}]",
            naming::sentinel(&prefix)
        );
        let enum_name = naming::enum_name(&name);
        tracing::debug!(
            table = %name,
            entries = table_entries.len(),
            ?strategy,
            "resource table built"
        );

        Ok(ResourceTable {
            name,
            prefix,
            c_type,
            strategy,
            formatter,
            includes,
            enum_name,
            declaration,
            entries: table_entries,
            resolved: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }

    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enumerators(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.enumerator.as_str())
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Every identifier this table adds to the namespace: the enum, its
    /// enumerators and sentinel, the storage array, the per-entry aliases
    /// when aliased, and the qualified names of resolved nested arrays.
    pub fn identifiers(&self) -> Vec<String> {
        let mut names = vec![self.enum_name.clone(), format!("{}s", self.name)];
        names.extend(self.entries.iter().map(|entry| entry.enumerator.clone()));
        names.push(naming::sentinel(&self.prefix));
        for entry in &self.entries {
            if self.strategy.uses_aliases() {
                names.push(entry.alias.clone());
            }
            names.extend(
                entry
                    .value
                    .arrays()
                    .into_iter()
                    .filter_map(|array| array.qualified_name().map(str::to_string)),
            );
        }
        names
    }

    /// Assigns qualified names to every nested array resource.
    ///
    /// Each array is named after the alias of the entry that contains it.
    /// Runs once; arrays reject a second owner.
    pub fn resolve(&mut self) -> Result<(), CoreError> {
        let mut nested = 0;
        for entry in &mut self.entries {
            for array in entry.value.arrays_mut() {
                array.resolve(&entry.enumerator, &entry.alias)?;
                nested += 1;
            }
        }
        self.resolved = true;
        tracing::debug!(table = %self.name, nested, "resource table resolved");
        Ok(())
    }

    /// Writes the enum and the `extern` declaration of the table storage.
    pub fn declare(&self, out: &mut impl Write) -> Result<(), CoreError> {
        writeln!(out, "enum {} {{", self.enum_name)?;
        for entry in &self.entries {
            writeln!(out, "  {},", entry.enumerator)?;
        }
        writeln!(out, "  {}", naming::sentinel(&self.prefix))?;
        writeln!(out, "}}; // enum {}", self.enum_name)?;
        writeln!(out)?;
        writeln!(out, "extern {};", self.declaration)?;
        writeln!(out)?;
        Ok(())
    }

    /// Writes the table storage, nested arrays first.
    pub fn emit(&self, out: &mut impl Write) -> Result<(), CoreError> {
        if !self.resolved {
            return Err(CoreError::Unresolved(self.name.clone()));
        }
        match self.strategy {
            Strategy::Aliased => self.emit_aliased(out),
            Strategy::Inline => self.emit_inline(out),
        }
    }

    fn emit_aliased(&self, out: &mut impl Write) -> Result<(), CoreError> {
        for entry in &self.entries {
            writeln!(out, "// {}", entry.enumerator)?;
            for array in entry.value.arrays() {
                array.emit(out, false)?;
            }
            writeln!(
                out,
                "static const {} {} = {};",
                self.c_type,
                entry.alias,
                self.compile_value(&entry.value)?
            )?;
        }
        writeln!(out)?;

        writeln!(out, "{} = {{", self.declaration)?;
        for entry in &self.entries {
            writeln!(out, "  &{},", entry.alias)?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;
        Ok(())
    }

    fn emit_inline(&self, out: &mut impl Write) -> Result<(), CoreError> {
        for entry in &self.entries {
            for array in entry.value.arrays() {
                array.emit(out, true)?;
            }
        }
        writeln!(out)?;

        writeln!(out, "{} = {{", self.declaration)?;
        for entry in &self.entries {
            writeln!(out, "  // {}", entry.enumerator)?;
            writeln!(out, "  {}, ", self.compile_value(&entry.value)?)?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;
        Ok(())
    }

    fn compile_value(&self, value: &Value) -> Result<String, CoreError> {
        match value {
            Value::Scalar(scalar) => self
                .formatter
                .format(scalar)
                .map_err(|err| CoreError::config(self.name.clone(), err)),
            Value::Sequence(items) => {
                let compiled = items
                    .iter()
                    .map(|item| self.compile_value(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{{ {} }}", compiled.join(", ")))
            }
            Value::Array(array) => Ok(array.resolved_name()?.to_string()),
        }
    }
}
