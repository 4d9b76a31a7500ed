//! Database introspection
//!
//! This module provides the [`SchemaFetcher`] abstraction over database
//! catalogs. Each supported engine has its own submodule; the connection
//! holding fetchers are feature-gated, their parsing helpers are not.

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::error::GenError;
use crate::schema::ColumnDescriptor;

pub mod memory;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use memory::MemoryFetcher;

#[cfg(feature = "mysql")]
pub use mysql::MySqlFetcher;
#[cfg(feature = "postgres")]
pub use postgres::PostgresFetcher;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteFetcher;

/// Catalog access for one database engine
///
/// A fetcher owns its connection for the whole run; every call is a blocking
/// query on that single connection.
pub trait SchemaFetcher {
    /// Name of the selected database, empty when none is selected
    fn database_name(&mut self) -> Result<String, GenError>;

    /// Names of all tables, in the order the engine reports them
    fn table_names(&mut self) -> Result<Vec<String>, GenError>;

    /// Columns of `table_name`, in declaration order
    fn field_descriptors(&mut self, table_name: &str) -> Result<Vec<ColumnDescriptor>, GenError>;

    /// Quote an identifier for use in SQL text
    fn quote_identifier(&self, identifier: &str) -> String;
}

/// Identifier quoting convention of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// `name`, MySQL family
    Backtick,
    /// "name", SQL standard (SQLite, Postgres)
    DoubleQuote,
}

impl QuoteStyle {
    pub fn quote(self, identifier: &str) -> String {
        let q = match self {
            QuoteStyle::Backtick => '`',
            QuoteStyle::DoubleQuote => '"',
        };
        let mut quoted = String::with_capacity(identifier.len() + 2);
        quoted.push(q);
        for c in identifier.chars() {
            if c == q {
                quoted.push(q);
            }
            quoted.push(c);
        }
        quoted.push(q);
        quoted
    }
}

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    MySql,
    Sqlite,
    Postgres,
}

impl Driver {
    /// Cargo feature enabling this driver
    pub fn feature(self) -> &'static str {
        match self {
            Driver::MySql => "mysql",
            Driver::Sqlite => "sqlite",
            Driver::Postgres => "postgres",
        }
    }

    pub fn quote_style(self) -> QuoteStyle {
        match self {
            Driver::MySql => QuoteStyle::Backtick,
            Driver::Sqlite | Driver::Postgres => QuoteStyle::DoubleQuote,
        }
    }

    /// Open a connection and wrap it in this engine's fetcher
    pub fn connect(self, data_source_name: &str) -> Result<Box<dyn SchemaFetcher>, GenError> {
        info!(driver = %self, "Connecting to database");
        match self {
            Driver::MySql => connect_mysql(data_source_name),
            Driver::Sqlite => connect_sqlite(data_source_name),
            Driver::Postgres => connect_postgres(data_source_name),
        }
    }
}

impl FromStr for Driver {
    type Err = GenError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "mysql" => Ok(Driver::MySql),
            "sqlite3" | "sqlite" => Ok(Driver::Sqlite),
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            other => Err(GenError::UnsupportedDriver(other.to_string())),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Driver::MySql => "mysql",
            Driver::Sqlite => "sqlite3",
            Driver::Postgres => "postgres",
        })
    }
}

#[cfg(feature = "mysql")]
fn connect_mysql(data_source_name: &str) -> Result<Box<dyn SchemaFetcher>, GenError> {
    Ok(Box::new(MySqlFetcher::connect(data_source_name)?))
}

#[cfg(not(feature = "mysql"))]
fn connect_mysql(_data_source_name: &str) -> Result<Box<dyn SchemaFetcher>, GenError> {
    Err(GenError::DriverNotEnabled(Driver::MySql.feature()))
}

#[cfg(feature = "sqlite")]
fn connect_sqlite(data_source_name: &str) -> Result<Box<dyn SchemaFetcher>, GenError> {
    Ok(Box::new(SqliteFetcher::open(data_source_name)?))
}

#[cfg(not(feature = "sqlite"))]
fn connect_sqlite(_data_source_name: &str) -> Result<Box<dyn SchemaFetcher>, GenError> {
    Err(GenError::DriverNotEnabled(Driver::Sqlite.feature()))
}

#[cfg(feature = "postgres")]
fn connect_postgres(data_source_name: &str) -> Result<Box<dyn SchemaFetcher>, GenError> {
    Ok(Box::new(PostgresFetcher::connect(data_source_name)?))
}

#[cfg(not(feature = "postgres"))]
fn connect_postgres(_data_source_name: &str) -> Result<Box<dyn SchemaFetcher>, GenError> {
    Err(GenError::DriverNotEnabled(Driver::Postgres.feature()))
}

/// Split a declared type such as `decimal(10,2)` into name and first size
/// argument. The name is lower-cased and trimmed; a missing or unparsable
/// size is 0.
pub(crate) fn split_type_size(declared: &str) -> (String, u32) {
    match declared.find('(') {
        Some(open) => {
            let name = declared[..open].trim().to_lowercase();
            let args = declared[open + 1..]
                .split(')')
                .next()
                .unwrap_or_default();
            let size = args
                .split(',')
                .next()
                .and_then(|n| n.trim().parse().ok())
                .unwrap_or(0);
            (name, size)
        }
        None => (declared.trim().to_lowercase(), 0),
    }
}

/// Catalog rows for one table; no rows means the table does not exist
#[cfg(any(feature = "sqlite", feature = "postgres", test))]
pub(crate) fn require_table<T>(object: String, rows: Vec<T>) -> Result<Vec<T>, GenError> {
    if rows.is_empty() {
        return Err(GenError::Introspection {
            object,
            message: "table does not exist".to_string(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_name() {
        assert_eq!("mysql".parse::<Driver>().unwrap(), Driver::MySql);
        assert_eq!("sqlite3".parse::<Driver>().unwrap(), Driver::Sqlite);
        assert_eq!("sqlite".parse::<Driver>().unwrap(), Driver::Sqlite);
        assert_eq!("postgres".parse::<Driver>().unwrap(), Driver::Postgres);
        assert_eq!("postgresql".parse::<Driver>().unwrap(), Driver::Postgres);
    }

    #[test]
    fn test_unsupported_driver() {
        let err = "oracle".parse::<Driver>().unwrap_err();
        assert!(matches!(err, GenError::UnsupportedDriver(ref name) if name == "oracle"));
        assert_eq!(err.to_string(), "unsupported driver oracle");
        assert!("MySQL".parse::<Driver>().is_err());
    }

    #[test]
    fn test_quote_styles() {
        assert_eq!(QuoteStyle::Backtick.quote("order"), "`order`");
        assert_eq!(QuoteStyle::Backtick.quote("we`ird"), "`we``ird`");
        assert_eq!(QuoteStyle::DoubleQuote.quote("user"), "\"user\"");
        assert_eq!(QuoteStyle::DoubleQuote.quote("a\"b"), "\"a\"\"b\"");
        assert_eq!(Driver::MySql.quote_style(), QuoteStyle::Backtick);
        assert_eq!(Driver::Postgres.quote_style(), QuoteStyle::DoubleQuote);
    }

    #[test]
    fn test_split_type_size() {
        assert_eq!(split_type_size("varchar(255)"), ("varchar".to_string(), 255));
        assert_eq!(split_type_size("decimal(10,2)"), ("decimal".to_string(), 10));
        assert_eq!(split_type_size("BIT(1)"), ("bit".to_string(), 1));
        assert_eq!(split_type_size("enum('a','b')"), ("enum".to_string(), 0));
        assert_eq!(split_type_size(" text "), ("text".to_string(), 0));
    }

    #[test]
    fn test_require_table() {
        assert_eq!(require_table("t".to_string(), vec![1, 2]).unwrap(), vec![1, 2]);

        let err = require_table::<u8>("columns of table 'ordrs'".to_string(), vec![]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to introspect columns of table 'ordrs': table does not exist"
        );
    }

    #[cfg(not(feature = "postgres"))]
    #[test]
    fn test_disabled_driver() {
        let err = Driver::Postgres.connect("host=localhost").err().unwrap();
        assert!(matches!(err, GenError::DriverNotEnabled("postgres")));
    }
}
