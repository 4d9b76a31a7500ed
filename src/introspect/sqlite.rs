//! SQLite catalog introspection

use std::path::Path;

use super::split_type_size;

/// Parse a declared column type such as `VARCHAR(255)` or `INT UNSIGNED`
///
/// SQLite accepts any declared type, including none; a column without a type
/// has BLOB affinity and is reported as `blob`.
pub fn parse_declared_type(declared: &str) -> (String, u32, bool) {
    let lower = declared.trim().to_lowercase();
    let unsigned = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == "unsigned");

    let (name, size) = split_type_size(&lower);
    let name = name
        .split_whitespace()
        .filter(|word| *word != "unsigned")
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        ("blob".to_string(), size, unsigned)
    } else {
        (name, size, unsigned)
    }
}

/// Database name derived from the file backing the `main` schema
pub fn database_name_from_file(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "main".to_string())
}

#[cfg(feature = "sqlite")]
pub use fetcher::SqliteFetcher;

#[cfg(feature = "sqlite")]
mod fetcher {
    use rusqlite::{Connection, OpenFlags};
    use tracing::{debug, error, info, trace};

    use super::{database_name_from_file, parse_declared_type};
    use crate::error::GenError;
    use crate::introspect::{require_table, Driver, SchemaFetcher};
    use crate::schema::ColumnDescriptor;

    /// SQLite schema fetcher
    pub struct SqliteFetcher {
        conn: Connection,
    }

    impl SqliteFetcher {
        /// Open an existing database file (or `file:` URI) read-only
        pub fn open(path: &str) -> Result<Self, GenError> {
            let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI;
            let conn = Connection::open_with_flags(path, flags).map_err(|e| {
                error!(path = ?path, error = ?e, "Failed to open SQLite database");
                GenError::Connection(e.to_string())
            })?;
            info!(path = ?path, "Opened database");
            Ok(Self::new(conn))
        }

        pub fn new(conn: Connection) -> Self {
            Self { conn }
        }
    }

    fn introspection_error(object: &str, e: rusqlite::Error) -> GenError {
        error!(object = ?object, error = ?e, "Catalog query failed");
        GenError::Introspection {
            object: object.to_string(),
            message: e.to_string(),
        }
    }

    impl SchemaFetcher for SqliteFetcher {
        fn database_name(&mut self) -> Result<String, GenError> {
            let object = "database name";
            let mut stmt = self
                .conn
                .prepare("SELECT name, file FROM pragma_database_list")
                .map_err(|e| introspection_error(object, e))?;
            let databases = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
                })
                .map_err(|e| introspection_error(object, e))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| introspection_error(object, e))?;

            let file = databases
                .into_iter()
                .find(|(name, _)| name == "main")
                .and_then(|(_, file)| file)
                .unwrap_or_default();
            let name = database_name_from_file(&file);
            debug!(file = ?file, database = ?name, "Main database");
            Ok(name)
        }

        fn table_names(&mut self) -> Result<Vec<String>, GenError> {
            trace!("Querying tables");
            let object = "tables";
            let mut stmt = self
                .conn
                .prepare(
                    "SELECT name FROM sqlite_master
                     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
                )
                .map_err(|e| introspection_error(object, e))?;
            let tables = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| introspection_error(object, e))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| introspection_error(object, e))?;
            trace!(tables = ?tables, "Tables found");
            Ok(tables)
        }

        fn field_descriptors(
            &mut self,
            table_name: &str,
        ) -> Result<Vec<ColumnDescriptor>, GenError> {
            trace!(table = ?table_name, "Querying columns");
            let object = format!("columns of table '{}'", table_name);

            let mut stmt = self
                .conn
                .prepare(
                    r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?1) ORDER BY cid"#,
                )
                .map_err(|e| introspection_error(&object, e))?;
            let rows = stmt
                .query_map([table_name], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                })
                .map_err(|e| introspection_error(&object, e))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| introspection_error(&object, e))?;
            let rows = require_table(object, rows)?;

            let pk_count = rows.iter().filter(|(_, _, _, pk)| *pk > 0).count();
            let mut columns = Vec::with_capacity(rows.len());
            for (name, declared, not_null, pk) in rows {
                let (raw_type, size, unsigned) = parse_declared_type(&declared);
                // INTEGER PRIMARY KEY aliases the rowid and is never NULL
                let rowid_alias = pk_count == 1 && pk > 0 && raw_type == "integer";
                let column = ColumnDescriptor {
                    name,
                    raw_type,
                    size,
                    unsigned,
                    nullable: not_null == 0 && !rowid_alias,
                    comment: String::new(),
                };
                trace!(
                    column = ?column.name,
                    declared = ?declared,
                    nullable = ?column.nullable,
                    "Parsed column"
                );
                columns.push(column);
            }

            Ok(columns)
        }

        fn quote_identifier(&self, identifier: &str) -> String {
            Driver::Sqlite.quote_style().quote(identifier)
        }
    }

}
