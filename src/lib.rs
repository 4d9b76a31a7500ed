//! # tabledsl
//!
//! Generate typed table accessors from database schemas
//!
//! This crate provides a CLI tool and library for introspecting database
//! schemas and generating statically-typed accessor code for the sqlingo
//! query builder.

pub mod codegen;
pub mod config;
pub mod error;
pub mod generate;
pub mod introspect;
pub mod naming;
pub mod schema;

pub mod prelude {
    pub use crate::codegen::{CodeGenerator, EmittedUnit, FileSink, GoGenerator, OutputSink};
    pub use crate::config::GenerationOptions;
    pub use crate::error::GenError;
    pub use crate::generate::{generate, GenerationReport, Orchestrator};
    pub use crate::introspect::{Driver, MemoryFetcher, QuoteStyle, SchemaFetcher};
    pub use crate::naming::{sanitize_identifier, to_exported_identifier};
    pub use crate::schema::{map_type, ColumnDescriptor, FieldCategory, MappedType};
}

pub use generate::generate;
