use thiserror::Error;

/// tabledsl errors
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Failed to connect to database: {0}")]
    Connection(String),

    /// A catalog query failed on an open connection
    #[error("Failed to introspect {object}: {message}")]
    Introspection { object: String, message: String },

    #[error("no database selected")]
    NoDatabaseSelected,

    #[error("unknown field type {raw_type} (column '{column}')")]
    UnknownType { column: String, raw_type: String },

    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    #[error("{0} support not enabled. Rebuild with --features {0}")]
    DriverNotEnabled(&'static str),

    #[error("Code generation failed for table '{table}': {message}")]
    CodeGen { table: String, message: String },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
