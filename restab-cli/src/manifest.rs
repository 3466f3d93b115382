//! TOML manifests describing one resource library.
//!
//! ```toml
//! target = "stm32x"
//! namespace = "resources"
//! includes = ["#include <stdint.h>"]
//!
//! [[table]]
//! name = "led"
//! prefix = "LED"
//! c_type = "uint32_t"
//! format = "hex"
//! entries = [
//!   { key = "red", value = 0xFF0000 },
//!   { key = "green", value = 0x00FF00 },
//! ]
//! ```
//!
//! Entry values map onto the core value model: integers, floats, booleans
//! and strings become scalars, arrays become brace-initialized sequences,
//! and an inline table `{ array = { ... } }` becomes a nested array
//! resource.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use restab_core::{ArrayResource, Formatter, ResourceLibrary, Scalar, TableDescription, Value};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub target: String,
    pub namespace: String,
    /// Basename of the generated `.h`/`.cc` pair; defaults to the namespace.
    pub output: Option<String>,
    pub header: Option<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default, rename = "table")]
    pub tables: Vec<TableManifest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableManifest {
    pub name: String,
    pub prefix: String,
    pub c_type: String,
    #[serde(default)]
    pub use_aliases: bool,
    pub format: Option<FormatKind>,
    pub hex_digits: Option<usize>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub entries: Vec<EntryManifest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryManifest {
    pub key: String,
    pub value: toml::Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArrayManifest {
    pub name: String,
    pub c_type: String,
    pub values: Vec<toml::Value>,
    pub format: Option<FormatKind>,
    pub hex_digits: Option<usize>,
    pub per_line: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Decimal,
    Hex,
    Float,
    Symbol,
    String,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid manifest {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn basename(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.namespace)
    }

    pub fn into_library(self) -> Result<ResourceLibrary> {
        let descriptions = self
            .tables
            .into_iter()
            .map(TableManifest::into_description)
            .collect::<Result<Vec<_>>>()?;
        let mut library = ResourceLibrary::new(&self.target, self.namespace, descriptions)?
            .with_includes(self.includes);
        if let Some(header) = self.header {
            library = library.with_header(header);
        }
        Ok(library)
    }
}

impl TableManifest {
    fn into_description(self) -> Result<TableDescription> {
        let context = format!("table `{}`", self.name);
        let formatter = formatter(self.format, self.hex_digits).context(context.clone())?;
        let mut description = TableDescription::new(self.name, self.prefix, self.c_type)
            .use_aliases(self.use_aliases)
            .formatter(formatter);
        description.includes = self.includes;
        for entry in self.entries {
            let value = value(&entry.value)
                .with_context(|| format!("{context}, entry `{}`", entry.key))?;
            description = description.entry(entry.key, value);
        }
        Ok(description)
    }
}

fn formatter(kind: Option<FormatKind>, hex_digits: Option<usize>) -> Result<Formatter> {
    let kind = kind.unwrap_or(FormatKind::Decimal);
    if hex_digits.is_some() && kind != FormatKind::Hex {
        bail!("hex_digits only applies to format = \"hex\"");
    }
    Ok(match kind {
        FormatKind::Decimal => Formatter::Decimal,
        FormatKind::Hex => Formatter::hex(hex_digits.unwrap_or(0)),
        FormatKind::Float => Formatter::Float,
        FormatKind::Symbol => Formatter::Symbol,
        FormatKind::String => Formatter::String,
    })
}

fn value(raw: &toml::Value) -> Result<Value> {
    match raw {
        toml::Value::Array(items) => Ok(Value::Sequence(
            items.iter().map(value).collect::<Result<_>>()?,
        )),
        toml::Value::Table(table) => match (table.len(), table.get("array")) {
            (1, Some(array)) => Ok(Value::Array(array_resource(array)?)),
            _ => bail!("inline tables must have the form {{ array = {{ ... }} }}"),
        },
        other => Ok(Value::Scalar(scalar(other)?)),
    }
}

fn array_resource(raw: &toml::Value) -> Result<ArrayResource> {
    let manifest: ArrayManifest = raw.clone().try_into()?;
    let values = manifest
        .values
        .iter()
        .map(scalar)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("array `{}`", manifest.name))?;
    let formatter = formatter(manifest.format, manifest.hex_digits)
        .with_context(|| format!("array `{}`", manifest.name))?;
    let mut array = ArrayResource::new(manifest.name, manifest.c_type, values).with_formatter(formatter);
    if let Some(per_line) = manifest.per_line {
        array = array.with_values_per_line(per_line);
    }
    Ok(array)
}

fn scalar(raw: &toml::Value) -> Result<Scalar> {
    match raw {
        toml::Value::Integer(value) => Ok(Scalar::Int(*value)),
        toml::Value::Float(value) => Ok(Scalar::Float(*value)),
        toml::Value::Boolean(value) => Ok(Scalar::Bool(*value)),
        toml::Value::String(value) => Ok(Scalar::Text(value.clone())),
        other => Err(anyhow!("unsupported {} value `{other}`", other.type_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDS: &str = r##"
target = "stm32x"
namespace = "resources"
includes = ["#include <stdint.h>"]

[[table]]
name = "led"
prefix = "LED"
c_type = "uint32_t"
entries = [
  { key = "red", value = 0xFF0000 },
  { key = "green", value = 0x00FF00 },
]
"##;

    #[test]
    fn parses_a_simple_manifest() {
        let manifest = Manifest::parse(LEDS).expect("valid manifest");
        assert_eq!(manifest.basename(), "resources");
        assert_eq!(manifest.tables.len(), 1);
        assert!(!manifest.tables[0].use_aliases);

        let library = manifest.into_library().expect("valid library");
        let artifacts = library.render().unwrap();
        assert!(artifacts.header.contains("#include <stdint.h>\n"));
        assert!(artifacts.source.contains("  // LED_RED\n  16711680, \n"));
    }

    #[test]
    fn maps_nested_values_onto_the_core_model() {
        let raw: toml::Value = toml::from_str(
            r#"value = [1, 2.5, true, "MODE", { array = { name = "steps", c_type = "uint8_t", values = [1, 2], per_line = 4, format = "hex", hex_digits = 2 } }]"#,
        )
        .unwrap();
        let value = value(&raw["value"]).unwrap();

        let Value::Sequence(items) = &value else {
            panic!("expected a sequence, got {value:?}");
        };
        assert_eq!(items[0], Value::Scalar(Scalar::Int(1)));
        assert_eq!(items[1], Value::Scalar(Scalar::Float(2.5)));
        assert_eq!(items[2], Value::Scalar(Scalar::Bool(true)));
        assert_eq!(items[3], Value::Scalar(Scalar::Text("MODE".into())));
        let Value::Array(array) = &items[4] else {
            panic!("expected an array resource");
        };
        assert_eq!(array.name(), "steps");
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn output_overrides_basename() {
        let manifest = Manifest::parse(&format!("output = \"leds\"\n{LEDS}")).unwrap();
        assert_eq!(manifest.basename(), "leds");
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = Manifest::parse("target = \"a\"\nnamespace = \"b\"\nnamspace = \"c\"\n").unwrap_err();
        assert!(err.to_string().contains("namspace"));
    }

    #[test]
    fn rejects_malformed_inline_tables() {
        let raw: toml::Value = toml::from_str("value = { values = [1] }").unwrap();
        assert!(value(&raw["value"]).is_err());
    }

    #[test]
    fn rejects_nested_sequences_inside_arrays() {
        let raw: toml::Value =
            toml::from_str(r#"value = { array = { name = "x", c_type = "int", values = [[1]] } }"#).unwrap();
        let err = value(&raw["value"]).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported array value"));
    }

    #[test]
    fn hex_digits_require_hex_format() {
        assert!(formatter(Some(FormatKind::Decimal), Some(2)).is_err());
        assert!(matches!(
            formatter(Some(FormatKind::Hex), Some(4)).unwrap(),
            Formatter::Hex { digits: 4 }
        ));
        assert!(matches!(formatter(None, None).unwrap(), Formatter::Decimal));
    }

    #[test]
    fn core_errors_name_the_table() {
        let text = LEDS.replace("0x00FF00", "\"GREEN\"");
        let err = Manifest::parse(&text).unwrap().into_library().unwrap_err();
        assert!(format!("{err:#}").contains("invalid table `led`"));
    }
}
