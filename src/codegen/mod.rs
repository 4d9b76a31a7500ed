//! Code generation
//!
//! This module turns introspected tables into generated source units. A
//! [`CodeGenerator`] renders units; an [`OutputSink`] persists them.

use std::path::PathBuf;

use tracing::trace;

use crate::error::GenError;
use crate::introspect::SchemaFetcher;

pub mod go;
pub mod model;
pub mod sink;

pub use go::GoGenerator;
pub use model::{FieldModel, TableModel};
pub use sink::{FileSink, OutputSink};

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedUnit {
    /// Path relative to the output directory
    pub path: PathBuf,
    pub content: String,
}

impl EmittedUnit {
    pub fn new(path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

/// Trait for language-specific code generators
pub trait CodeGenerator {
    /// Render the shared unit: version guard, marker aliases and table lookup
    fn emit_base(
        &self,
        database_name: &str,
        table_names: &[String],
        force_cases: &[String],
    ) -> Result<EmittedUnit, GenError>;

    /// Render the accessor unit of one table
    fn render_table(&self, database_name: &str, table: &TableModel)
        -> Result<EmittedUnit, GenError>;

    /// Fetch a table's columns and render its accessor unit
    fn emit_table(
        &self,
        fetcher: &mut dyn SchemaFetcher,
        database_name: &str,
        table_name: &str,
        force_cases: &[String],
    ) -> Result<EmittedUnit, GenError> {
        let columns = fetcher.field_descriptors(table_name)?;
        trace!(table = ?table_name, columns = ?columns.len(), "Found columns");

        let table = TableModel::build(table_name, &columns, force_cases, |identifier| {
            fetcher.quote_identifier(identifier)
        })?;
        self.render_table(database_name, &table)
    }
}
