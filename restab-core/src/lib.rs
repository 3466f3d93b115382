//! Core of the restab resource-table compiler.
//!
//! This crate turns in-memory table descriptions into a matched pair of
//! C++ artifacts: a declaration header with enums and `extern` arrays, and a
//! definition source with the initialized data. The pipeline is roughly:
//!
//!   TableDescription[]
//!     -> ResourceTable::new  (validation, identifier derivation)
//!     -> ResourceTable::resolve  (qualified names for nested arrays)
//!     -> ResourceLibrary::render_header  (enums + externs)
//!     -> ResourceLibrary::render_source  (arrays, aliases, tables)
//!
//! Reading descriptions from disk is left to front ends such as the CLI.
//!
//! ```
//! use restab_core::{ResourceLibrary, TableDescription};
//!
//! let leds = TableDescription::new("led", "LED", "uint32_t")
//!     .entry("red", 0xFF0000)
//!     .entry("green", 0x00FF00);
//! let library = ResourceLibrary::new("stm32x", "resources", [leds]).unwrap();
//! let artifacts = library.render().unwrap();
//! assert!(artifacts.header.contains("enum ELed {\n  LED_RED,\n  LED_GREEN,\n  LED_LAST\n}"));
//! assert!(artifacts.source.contains("  // LED_GREEN\n  65280, \n"));
//! ```

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Values and how they are rendered
// ---------------------------------------------------------------------

pub mod value;
pub mod format;
pub mod naming;

// ---------------------------------------------------------------------
// Resources: nested arrays, tables and libraries
// ---------------------------------------------------------------------

pub mod array;
pub mod table;
pub mod library;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use array::ArrayResource;
pub use error::{ConfigError, CoreError};
pub use format::{FormatError, Formatter};
pub use library::{Artifacts, GeneratedFiles, ResourceLibrary};
pub use table::{Entry, ResourceTable, Strategy, TableDescription};
pub use value::{Scalar, Value};
