//! Resource libraries: a namespace full of tables written as a `.h`/`.cc`
//! pair.
//!
//! Building a [`ResourceLibrary`] validates and resolves every table, so a
//! library that exists can always be rendered. Rendering is pure; writing
//! goes through temporary files that are persisted under their final names
//! only once both artifacts are complete.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{ConfigError, CoreError};
use crate::naming;
use crate::table::{ResourceTable, TableDescription};

pub const HEADER_SUFFIX: &str = "h";
pub const SOURCE_SUFFIX: &str = "cc";

/// The rendered declaration (`.h`) and definition (`.cc`) artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub header: String,
    pub source: String,
}

/// Paths written by [`ResourceLibrary::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub header: PathBuf,
    pub source: PathBuf,
}

impl GeneratedFiles {
    pub fn for_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        GeneratedFiles {
            header: with_suffix(base, HEADER_SUFFIX),
            source: with_suffix(base, SOURCE_SUFFIX),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceLibrary {
    namespace: String,
    header_guard: String,
    includes: Vec<String>,
    header: Option<String>,
    tables: Vec<ResourceTable>,
}

impl ResourceLibrary {
    /// Builds and resolves every table in order.
    ///
    /// Any configuration or resolution error aborts here, before anything
    /// can be rendered. All tables share one namespace, so an identifier
    /// generated twice, within a table or across tables, is rejected.
    pub fn new(
        target: &str,
        namespace: impl Into<String>,
        descriptions: impl IntoIterator<Item = TableDescription>,
    ) -> Result<Self, CoreError> {
        let namespace = namespace.into();
        let mut tables = Vec::new();
        let mut identifiers = HashSet::new();
        for description in descriptions {
            let mut table = ResourceTable::new(description)?;
            table.resolve()?;
            for identifier in table.identifiers() {
                if !identifiers.insert(identifier.clone()) {
                    return Err(CoreError::config(
                        table.name(),
                        ConfigError::DuplicateIdentifier(identifier),
                    ));
                }
            }
            tables.push(table);
        }
        tracing::debug!(%namespace, tables = tables.len(), "resource library resolved");

        Ok(ResourceLibrary {
            header_guard: naming::header_guard(target, &namespace),
            namespace,
            includes: Vec::new(),
            header: None,
            tables,
        })
    }

    /// Library-level include lines, emitted before those of the tables.
    pub fn with_includes(mut self, includes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.includes = includes.into_iter().map(Into::into).collect();
        self
    }

    /// Leading text (license, "generated by" banner) for both artifacts.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn header_guard(&self) -> &str {
        &self.header_guard
    }

    pub fn tables(&self) -> &[ResourceTable] {
        &self.tables
    }

    /// Own includes followed by every table's includes, first occurrence
    /// wins.
    pub fn includes(&self) -> Vec<&str> {
        let mut includes: Vec<&str> = Vec::new();
        let table_includes = self.tables.iter().flat_map(|table| table.includes());
        for line in self.includes.iter().chain(table_includes) {
            if !includes.contains(&line.as_str()) {
                includes.push(line);
            }
        }
        includes
    }

    pub fn render(&self) -> Result<Artifacts, CoreError> {
        Ok(Artifacts {
            header: self.render_header()?,
            source: self.render_source()?,
        })
    }

    pub fn render_header(&self) -> Result<String, CoreError> {
        let mut out = String::new();
        self.write_banner(&mut out)?;
        writeln!(out, "#ifndef {}", self.header_guard)?;
        writeln!(out, "#define {}", self.header_guard)?;
        writeln!(out)?;

        writeln!(out, "{}", self.includes().join("\n"))?;
        writeln!(out)?;

        self.open_namespace(&mut out)?;
        for table in &self.tables {
            table.declare(&mut out)?;
        }
        self.close_namespace(&mut out)?;

        writeln!(out)?;
        writeln!(out, "#endif // {}", self.header_guard)?;
        Ok(out)
    }

    pub fn render_source(&self) -> Result<String, CoreError> {
        let mut out = String::new();
        self.write_banner(&mut out)?;
        writeln!(out, "#include \"{}.{HEADER_SUFFIX}\"", self.namespace)?;
        writeln!(out)?;

        self.open_namespace(&mut out)?;
        for table in &self.tables {
            table.emit(&mut out)?;
        }
        self.close_namespace(&mut out)?;
        Ok(out)
    }

    /// Writes `<base>.h` and `<base>.cc`.
    ///
    /// Both artifacts are rendered before any file is touched, then each is
    /// written to a temporary file next to its destination and renamed into
    /// place.
    pub fn generate(&self, base: impl AsRef<Path>) -> Result<GeneratedFiles, CoreError> {
        let artifacts = self.render()?;
        let files = GeneratedFiles::for_base(base);

        let header = stage(&files.header, &artifacts.header)?;
        let source = stage(&files.source, &artifacts.source)?;
        persist(header, &files.header)?;
        persist(source, &files.source)?;

        tracing::debug!(
            header = %files.header.display(),
            source = %files.source.display(),
            "resource library written"
        );
        Ok(files)
    }

    fn write_banner(&self, out: &mut String) -> Result<(), CoreError> {
        if let Some(header) = &self.header {
            writeln!(out, "{header}")?;
        }
        Ok(())
    }

    fn open_namespace(&self, out: &mut String) -> Result<(), CoreError> {
        writeln!(out, "namespace {} {{", self.namespace)?;
        writeln!(out)?;
        Ok(())
    }

    fn close_namespace(&self, out: &mut String) -> Result<(), CoreError> {
        writeln!(out, "}} // namespace {}", self.namespace)?;
        Ok(())
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}

fn stage(destination: &Path, contents: &str) -> Result<NamedTempFile, CoreError> {
    let io_error = |source| CoreError::Io {
        path: destination.to_path_buf(),
        source,
    };
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(contents.as_bytes()).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    Ok(file)
}

fn persist(file: NamedTempFile, destination: &Path) -> Result<(), CoreError> {
    file.persist(destination)
        .map_err(|err| CoreError::Io {
            path: destination.to_path_buf(),
            source: err.error,
        })?;
    Ok(())
}
