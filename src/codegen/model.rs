//! Per-table derived structures
//!
//! Everything a generator needs about one table, computed once from its
//! column descriptors. Fields keep the descriptor order; the model record and
//! its value list both follow it.

use tracing::error;

use crate::error::GenError;
use crate::naming::{sanitize_identifier, to_exported_identifier};
use crate::schema::{map_type, ColumnDescriptor, MappedType};

/// One column as seen by a generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldModel {
    pub column_name: String,
    /// Exported field name
    pub go_name: String,
    pub mapped: MappedType,
    /// Private wrapper type standing for this field of this table
    pub wrapper_type: String,
    /// Single-line comment, if the column has one
    pub comment: Option<String>,
}

/// One table as seen by a generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub table_name: String,
    /// Exported name of the accessor singleton
    pub class_name: String,
    pub fields: Vec<FieldModel>,
    /// Quoted column names, comma separated
    pub fields_sql: String,
    /// Quoted `table.column` pairs, comma separated
    pub full_fields_sql: String,
}

impl TableModel {
    /// Build the model of `table_name`
    ///
    /// `quote` quotes an identifier the way the source engine does. Fails with
    /// [`GenError::UnknownType`] on the first column whose type cannot be
    /// mapped.
    pub fn build<Q>(
        table_name: &str,
        columns: &[ColumnDescriptor],
        force_cases: &[String],
        quote: Q,
    ) -> Result<Self, GenError>
    where
        Q: Fn(&str) -> String,
    {
        let class_name = to_exported_identifier(table_name, force_cases);
        let quoted_table = quote(table_name);

        let mut fields = Vec::with_capacity(columns.len());
        let mut quoted_columns = Vec::with_capacity(columns.len());
        let mut qualified_columns = Vec::with_capacity(columns.len());

        for column in columns {
            let go_name = to_exported_identifier(&column.name, force_cases);
            let mapped = map_type(column).inspect_err(|e| {
                error!(table = ?table_name, column = ?column.name, error = %e, "Unmappable column");
            })?;
            let wrapper_type = format!(
                "{}_{}_{}",
                sanitize_identifier(&column.raw_type.to_lowercase()),
                class_name,
                go_name
            );
            let comment = Some(column.comment.replace(['\r', '\n'], " "))
                .filter(|c| !c.trim().is_empty());

            let quoted = quote(&column.name);
            qualified_columns.push(format!("{}.{}", quoted_table, quoted));
            quoted_columns.push(quoted);

            fields.push(FieldModel {
                column_name: column.name.clone(),
                go_name,
                mapped,
                wrapper_type,
                comment,
            });
        }

        Ok(Self {
            table_name: table_name.to_string(),
            class_name,
            fields,
            fields_sql: quoted_columns.join(", "),
            full_fields_sql: qualified_columns.join(", "),
        })
    }

    /// Accessor record type name
    pub fn struct_name(&self) -> String {
        format!("t{}", self.class_name)
    }

    /// Runtime table object name
    pub fn object_name(&self) -> String {
        format!("o{}", self.class_name)
    }

    /// Plain data record type name
    pub fn model_name(&self) -> String {
        format!("{}Model", self.class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::QuoteStyle;
    use crate::schema::FieldCategory;

    fn orders() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", "bigint"),
            ColumnDescriptor::new("total", "decimal"),
            ColumnDescriptor::new("note", "varchar")
                .with_nullable(true)
                .with_comment("free text\nfrom checkout"),
        ]
    }

    fn build(columns: &[ColumnDescriptor], style: QuoteStyle) -> TableModel {
        TableModel::build("orders", columns, &[], |i| style.quote(i)).unwrap()
    }

    #[test]
    fn test_names() {
        let table = build(&orders(), QuoteStyle::DoubleQuote);
        assert_eq!(table.class_name, "Orders");
        assert_eq!(table.struct_name(), "tOrders");
        assert_eq!(table.object_name(), "oOrders");
        assert_eq!(table.model_name(), "OrdersModel");
    }

    #[test]
    fn test_fields_follow_column_order() {
        let table = build(&orders(), QuoteStyle::DoubleQuote);
        let names: Vec<_> = table.fields.iter().map(|f| f.go_name.as_str()).collect();
        assert_eq!(names, vec!["Id", "Total", "Note"]);
        let types: Vec<_> = table.fields.iter().map(|f| f.mapped.go_type()).collect();
        assert_eq!(types, vec!["int64", "float64", "*string"]);
        assert_eq!(table.fields[0].mapped.category, FieldCategory::Number);
    }

    #[test]
    fn test_fields_sql() {
        let table = build(&orders(), QuoteStyle::DoubleQuote);
        assert_eq!(table.fields_sql, r#""id", "total", "note""#);
        assert_eq!(
            table.full_fields_sql,
            r#""orders"."id", "orders"."total", "orders"."note""#
        );

        let table = build(&orders(), QuoteStyle::Backtick);
        assert_eq!(table.fields_sql, "`id`, `total`, `note`");
    }

    #[test]
    fn test_wrapper_types_are_per_table() {
        let table = build(&orders(), QuoteStyle::DoubleQuote);
        assert_eq!(table.fields[0].wrapper_type, "bigint_Orders_Id");
        assert_eq!(table.fields[2].wrapper_type, "varchar_Orders_Note");

        let users = TableModel::build(
            "users",
            &[ColumnDescriptor::new("id", "BIGINT")],
            &[],
            |i| QuoteStyle::DoubleQuote.quote(i),
        )
        .unwrap();
        assert_eq!(users.fields[0].wrapper_type, "bigint_Users_Id");
    }

    #[test]
    fn test_comments_are_single_line() {
        let table = build(&orders(), QuoteStyle::DoubleQuote);
        assert_eq!(table.fields[0].comment, None);
        assert_eq!(
            table.fields[2].comment.as_deref(),
            Some("free text from checkout")
        );
    }

    #[test]
    fn test_force_cases_apply_to_table_and_columns() {
        let forced = vec!["ID".to_string()];
        let table = TableModel::build(
            "user_ids",
            &[ColumnDescriptor::new("user_id", "int")],
            &forced,
            |i| QuoteStyle::Backtick.quote(i),
        )
        .unwrap();
        assert_eq!(table.class_name, "UserIds");
        assert_eq!(table.fields[0].go_name, "UserID");
        assert_eq!(table.fields[0].wrapper_type, "int_UserIds_UserID");
    }

    #[test]
    fn test_unknown_type_fails_table() {
        let columns = vec![
            ColumnDescriptor::new("id", "bigint"),
            ColumnDescriptor::new("tags", "hstore"),
        ];
        let err = TableModel::build("orders", &columns, &[], |i| i.to_string()).unwrap_err();
        assert!(matches!(err, GenError::UnknownType { .. }));
    }

    #[test]
    fn test_empty_table() {
        let table = build(&[], QuoteStyle::DoubleQuote);
        assert!(table.fields.is_empty());
        assert_eq!(table.fields_sql, "");
        assert_eq!(table.full_fields_sql, "");
    }
}
