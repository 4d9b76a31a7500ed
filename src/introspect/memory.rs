//! Fixture-backed schema fetcher
//!
//! Serves a fixed set of tables without a database connection, for
//! generating accessors from a hand-written schema.

use tracing::trace;

use super::{QuoteStyle, SchemaFetcher};
use crate::error::GenError;
use crate::schema::ColumnDescriptor;

/// In-memory schema fetcher
#[derive(Debug, Clone)]
pub struct MemoryFetcher {
    database_name: String,
    tables: Vec<(String, Vec<ColumnDescriptor>)>,
    quote_style: QuoteStyle,
}

impl MemoryFetcher {
    pub fn new(database_name: impl Into<String>, quote_style: QuoteStyle) -> Self {
        Self {
            database_name: database_name.into(),
            tables: Vec::new(),
            quote_style,
        }
    }

    /// Add a table; tables are reported in insertion order
    pub fn with_table(mut self, name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        self.tables.push((name.into(), columns));
        self
    }
}

impl SchemaFetcher for MemoryFetcher {
    fn database_name(&mut self) -> Result<String, GenError> {
        Ok(self.database_name.clone())
    }

    fn table_names(&mut self) -> Result<Vec<String>, GenError> {
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    fn field_descriptors(&mut self, table_name: &str) -> Result<Vec<ColumnDescriptor>, GenError> {
        trace!(table = ?table_name, "Looking up fixture table");
        self.tables
            .iter()
            .find(|(name, _)| name == table_name)
            .map(|(_, columns)| columns.clone())
            .ok_or_else(|| GenError::Introspection {
                object: format!("table '{}'", table_name),
                message: "table does not exist".to_string(),
            })
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        self.quote_style.quote(identifier)
    }
}
