//! PostgreSQL catalog introspection
//!
//! Tables and columns are read from the connection's current schema.

/// Translate an `information_schema` type into the generic type vocabulary
///
/// `data_type` is the SQL-standard spelling (`timestamp without time zone`,
/// `USER-DEFINED`, ...), `udt_name` the underlying type name.
pub fn canonical_type(data_type: &str, udt_name: &str, is_enum: bool) -> String {
    let lower = data_type.trim().to_lowercase();
    let canonical = match lower.as_str() {
        "timestamp without time zone" | "timestamp with time zone" => "timestamp",
        "time without time zone" | "time with time zone" => "time",
        "double precision" => "double",
        "character" => "char",
        "character varying" => "varchar",
        "bytea" => "blob",
        "jsonb" => "json",
        "uuid" => "char",
        "user-defined" if is_enum => "enum",
        // extension types such as PostGIS geometry
        "user-defined" => return udt_name.trim().to_lowercase(),
        _ => return lower,
    };
    canonical.to_string()
}

#[cfg(feature = "postgres")]
pub use fetcher::PostgresFetcher;

#[cfg(feature = "postgres")]
mod fetcher {
    use postgres::{Client, NoTls};
    use tracing::{debug, error, info, trace};

    use super::canonical_type;
    use crate::config::redact_data_source_name;
    use crate::error::GenError;
    use crate::introspect::{require_table, Driver, SchemaFetcher};
    use crate::schema::ColumnDescriptor;

    /// PostgreSQL schema fetcher
    pub struct PostgresFetcher {
        client: Client,
    }

    impl PostgresFetcher {
        /// Connect with a libpq-style connection string or URL
        pub fn connect(data_source_name: &str) -> Result<Self, GenError> {
            let client = Client::connect(data_source_name, NoTls).map_err(|e| {
                error!(
                    connection = ?redact_data_source_name(data_source_name),
                    error = ?e,
                    "Failed to connect to PostgreSQL"
                );
                GenError::Connection(e.to_string())
            })?;
            info!("Connected to database");
            Ok(Self::new(client))
        }

        pub fn new(client: Client) -> Self {
            Self { client }
        }
    }

    fn query_error(object: String) -> impl FnOnce(postgres::Error) -> GenError {
        move |e| {
            error!(object = ?object, error = ?e, "Catalog query failed");
            GenError::Introspection {
                object,
                message: e.to_string(),
            }
        }
    }

    impl SchemaFetcher for PostgresFetcher {
        fn database_name(&mut self) -> Result<String, GenError> {
            let row = self
                .client
                .query_one("SELECT current_database()::text AS name", &[])
                .map_err(query_error("database name".to_string()))?;
            let name: Option<String> = row.get("name");
            debug!(database = ?name, "Current database");
            Ok(name.unwrap_or_default())
        }

        fn table_names(&mut self) -> Result<Vec<String>, GenError> {
            trace!("Querying tables");

            let sql = r#"
                SELECT c.relname::text AS table_name
                FROM pg_class c
                JOIN pg_namespace n ON n.oid = c.relnamespace
                WHERE c.relkind IN ('r', 'p')
                    AND n.nspname = current_schema()
                ORDER BY c.relname
            "#;

            let rows = self
                .client
                .query(sql, &[])
                .map_err(query_error("tables".to_string()))?;

            let tables: Vec<String> = rows.iter().map(|row| row.get("table_name")).collect();
            trace!(tables = ?tables, "Tables found");
            Ok(tables)
        }

        fn field_descriptors(
            &mut self,
            table_name: &str,
        ) -> Result<Vec<ColumnDescriptor>, GenError> {
            trace!(table = ?table_name, "Querying columns");

            let sql = r#"
                SELECT
                    c.column_name::text AS column_name,
                    c.data_type::text AS data_type,
                    c.udt_name::text AS udt_name,
                    COALESCE(c.character_maximum_length, 0)::int4 AS size,
                    (c.is_nullable::text = 'YES') AS is_nullable,
                    COALESCE(col_description(cls.oid, c.ordinal_position::int4), '') AS comment,
                    EXISTS (
                        SELECT 1 FROM pg_type t
                        WHERE t.typname = c.udt_name::text AND t.typtype = 'e'
                    ) AS is_enum
                FROM information_schema.columns c
                JOIN pg_namespace n ON n.nspname = c.table_schema::text
                JOIN pg_class cls ON cls.relname = c.table_name::text AND cls.relnamespace = n.oid
                WHERE c.table_schema::text = current_schema()
                    AND c.table_name::text = $1
                ORDER BY c.ordinal_position
            "#;

            let object = format!("columns of table '{}'", table_name);
            let rows = self
                .client
                .query(sql, &[&table_name])
                .map_err(query_error(object.clone()))?;
            let rows = require_table(object, rows)?;

            let mut columns = Vec::with_capacity(rows.len());
            for row in rows {
                let name: String = row.get("column_name");
                let data_type: String = row.get("data_type");
                let udt_name: String = row.get("udt_name");
                let size: i32 = row.get("size");
                let is_enum: bool = row.get("is_enum");

                let column = ColumnDescriptor {
                    name,
                    raw_type: canonical_type(&data_type, &udt_name, is_enum),
                    size: u32::try_from(size).unwrap_or(0),
                    unsigned: false,
                    nullable: row.get("is_nullable"),
                    comment: row.get("comment"),
                };
                trace!(
                    column = ?column.name,
                    data_type = ?data_type,
                    raw_type = ?column.raw_type,
                    nullable = ?column.nullable,
                    "Parsed column"
                );
                columns.push(column);
            }

            Ok(columns)
        }

        fn quote_identifier(&self, identifier: &str) -> String {
            Driver::Postgres.quote_style().quote(identifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporal_types() {
        assert_eq!(
            canonical_type("timestamp without time zone", "timestamp", false),
            "timestamp"
        );
        assert_eq!(
            canonical_type("timestamp with time zone", "timestamptz", false),
            "timestamp"
        );
        assert_eq!(canonical_type("time with time zone", "timetz", false), "time");
        assert_eq!(canonical_type("date", "date", false), "date");
    }

    #[test]
    fn test_renamed_types() {
        assert_eq!(canonical_type("double precision", "float8", false), "double");
        assert_eq!(canonical_type("character", "bpchar", false), "char");
        assert_eq!(canonical_type("character varying", "varchar", false), "varchar");
        assert_eq!(canonical_type("bytea", "bytea", false), "blob");
        assert_eq!(canonical_type("jsonb", "jsonb", false), "json");
        assert_eq!(canonical_type("uuid", "uuid", false), "char");
    }

    #[test]
    fn test_passthrough_types() {
        assert_eq!(canonical_type("integer", "int4", false), "integer");
        assert_eq!(canonical_type("bigint", "int8", false), "bigint");
        assert_eq!(canonical_type("boolean", "bool", false), "boolean");
        assert_eq!(canonical_type("ARRAY", "_int4", false), "array");
    }

    #[test]
    fn test_user_defined_types() {
        assert_eq!(canonical_type("USER-DEFINED", "order_status", true), "enum");
        assert_eq!(canonical_type("USER-DEFINED", "geometry", false), "geometry");
    }
}
