//! Go code generator
//!
//! Generates table accessors for the sqlingo query builder runtime
//! (`github.com/lqs/sqlingo`).

use minijinja::Environment;
use tracing::debug;

use crate::codegen::{CodeGenerator, EmittedUnit, TableModel};
use crate::error::GenError;
use crate::naming::{sanitize_identifier, to_exported_identifier};
use crate::schema::FieldCategory;

/// Version the generated code expects `sqlingo.SqlingoRuntimeVersion` to be
pub const GENERATOR_VERSION: u32 = 2;

/// Path of the shared unit, relative to the output directory
pub const BASE_UNIT_PATH: &str = "base.dsl.go";

/// Go code generator
pub struct GoGenerator {
    env: Environment<'static>,
}

impl GoGenerator {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        // Register templates
        env.add_template("header", include_str!("templates/header.go.jinja"))
            .expect("Failed to load header template");
        env.add_template("base", include_str!("templates/base.go.jinja"))
            .expect("Failed to load base template");
        env.add_template("table", include_str!("templates/table.go.jinja"))
            .expect("Failed to load table template");

        Self { env }
    }

    fn render(
        &self,
        template_name: &str,
        unit: &str,
        ctx: minijinja::Value,
    ) -> Result<String, GenError> {
        let template = self
            .env
            .get_template(template_name)
            .map_err(|e| GenError::CodeGen {
                table: unit.to_string(),
                message: format!("Template error: {}", e),
            })?;

        template.render(ctx).map_err(|e| GenError::CodeGen {
            table: unit.to_string(),
            message: format!("Render error: {}", e),
        })
    }
}

impl Default for GoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for GoGenerator {
    fn emit_base(
        &self,
        database_name: &str,
        table_names: &[String],
        force_cases: &[String],
    ) -> Result<EmittedUnit, GenError> {
        let ctx = minijinja::context! {
            package_name => package_name(database_name),
            generator_version => GENERATOR_VERSION,
            field_aliases => FieldCategory::ALL.iter().map(|category| {
                minijinja::context! {
                    name => category.marker_alias(),
                    capability => category.runtime_field(),
                }
            }).collect::<Vec<_>>(),
            tables => table_names.iter().map(|name| {
                minijinja::context! {
                    name_literal => go_quote(name),
                    class_name => to_exported_identifier(name, force_cases),
                }
            }).collect::<Vec<_>>(),
        };

        let content = self.render("base", "base", ctx)?;
        debug!(tables = table_names.len(), "Rendered base unit");
        Ok(EmittedUnit::new(BASE_UNIT_PATH, content))
    }

    fn render_table(
        &self,
        database_name: &str,
        table: &TableModel,
    ) -> Result<EmittedUnit, GenError> {
        let fields: Vec<_> = table
            .fields
            .iter()
            .map(|f| {
                minijinja::context! {
                    go_name => &f.go_name,
                    go_type => f.mapped.go_type(),
                    wrapper_type => &f.wrapper_type,
                    runtime_field => f.mapped.category.runtime_field(),
                    marker_alias => f.mapped.category.marker_alias(),
                    name_literal => go_quote(&f.column_name),
                    comment => &f.comment,
                }
            })
            .collect();

        let field_refs = join_refs("t", table);
        let value_refs = join_refs("m", table);

        let ctx = minijinja::context! {
            package_name => package_name(database_name),
            class_name => &table.class_name,
            struct_name => table.struct_name(),
            object_name => table.object_name(),
            model_name => table.model_name(),
            table_literal => go_quote(&table.table_name),
            fields => fields,
            field_refs => field_refs,
            value_refs => value_refs,
            fields_sql_literal => go_quote(&table.fields_sql),
            full_fields_sql_literal => go_quote(&table.full_fields_sql),
        };

        let content = self.render("table", &table.table_name, ctx)?;
        debug!(table = ?table.table_name, fields = table.fields.len(), "Rendered table unit");
        Ok(EmittedUnit::new(table_unit_path(&table.table_name), content))
    }
}

/// Go package of every unit generated for `database_name`
pub fn package_name(database_name: &str) -> String {
    format!("{}_dsl", sanitize_identifier(database_name))
}

/// Path of a table's unit, relative to the output directory
pub fn table_unit_path(table_name: &str) -> String {
    format!("{}.go", sanitize_identifier(table_name))
}

/// `t.Id, t.Total, ...` in field order
fn join_refs(receiver: &str, table: &TableModel) -> String {
    table
        .fields
        .iter()
        .map(|f| format!("{}.{}", receiver, f.go_name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quote `s` as a Go interpreted string literal
pub fn go_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                quoted.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{MemoryFetcher, QuoteStyle};
    use crate::schema::ColumnDescriptor;

    fn orders_columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", "bigint"),
            ColumnDescriptor::new("total", "decimal"),
            ColumnDescriptor::new("note", "varchar").with_nullable(true),
        ]
    }

    fn render_orders(style: QuoteStyle) -> String {
        let mut fetcher = MemoryFetcher::new("shop", style).with_table("orders", orders_columns());
        GoGenerator::new()
            .emit_table(&mut fetcher, "shop", "orders", &[])
            .unwrap()
            .content
    }

    #[test]
    fn test_go_quote() {
        assert_eq!(go_quote("orders"), "\"orders\"");
        assert_eq!(go_quote(r#""id", "total""#), r#""\"id\", \"total\"""#);
        assert_eq!(go_quote("a\\b\nc"), r#""a\\b\nc""#);
        assert_eq!(go_quote("\u{1}"), r#""\x01""#);
    }

    #[test]
    fn test_package_and_paths() {
        assert_eq!(package_name("shop"), "shop_dsl");
        assert_eq!(package_name("my-shop"), "my_shop_dsl");
        assert_eq!(package_name("2024"), "_2024_dsl");
        assert_eq!(table_unit_path("orders"), "orders.go");
        assert_eq!(table_unit_path("order items"), "order_items.go");
    }

    #[test]
    fn test_table_unit_header() {
        let content = render_orders(QuoteStyle::DoubleQuote);
        assert!(content.starts_with(
            "// This file is generated by tabledsl.\n// DO NOT EDIT.\n\npackage shop_dsl\n\nimport sqlingo \"github.com/lqs/sqlingo\"\n\ntype tOrders struct {\n\ttable\n\n"
        ));
    }

    #[test]
    fn test_table_unit_model_record() {
        let content = render_orders(QuoteStyle::DoubleQuote);
        assert!(content.contains(
            "type OrdersModel struct {\n\tId int64\n\tTotal float64\n\tNote *string\n}\n"
        ));
        assert!(content.contains("return []interface{}{m.Id, m.Total, m.Note}\n"));
        assert!(content.contains("func (m OrdersModel) GetTable() sqlingo.Table {\n\treturn Orders\n}"));
    }

    #[test]
    fn test_table_unit_accessor() {
        let content = render_orders(QuoteStyle::DoubleQuote);
        assert!(content.contains("\tId bigint_Orders_Id\n"));
        assert!(content.contains("type bigint_Orders_Id struct{ numberField }\n"));
        assert!(content.contains("type varchar_Orders_Note struct{ stringField }\n"));
        assert!(content.contains("var oOrders = sqlingo.NewTable(\"orders\")\n"));
        assert!(content.contains("var Orders = tOrders{\n\ttable: oOrders,\n\n"));
        assert!(content.contains(
            "\tNote: varchar_Orders_Note{sqlingo.NewStringField(oOrders, \"note\")},\n"
        ));
        assert!(content.contains("return []sqlingo.Field{t.Id, t.Total, t.Note}\n"));
    }

    #[test]
    fn test_table_unit_field_lookup() {
        let content = render_orders(QuoteStyle::DoubleQuote);
        assert!(content.contains(
            "\tswitch name {\n\tcase \"id\":\n\t\treturn t.Id\n\tcase \"total\":\n\t\treturn t.Total\n\tcase \"note\":\n\t\treturn t.Note\n\tdefault:\n\t\treturn nil\n\t}\n"
        ));
    }

    #[test]
    fn test_table_unit_fields_sql() {
        let content = render_orders(QuoteStyle::DoubleQuote);
        assert!(content.contains(
            "GetFieldsSQL() string {\n\treturn \"\\\"id\\\", \\\"total\\\", \\\"note\\\"\"\n}"
        ));
        let content = render_orders(QuoteStyle::Backtick);
        assert!(content.contains("GetFieldsSQL() string {\n\treturn \"`id`, `total`, `note`\"\n}"));
        assert!(content.contains(
            "GetFullFieldsSQL() string {\n\treturn \"`orders`.`id`, `orders`.`total`, `orders`.`note`\"\n}"
        ));
    }

    #[test]
    fn test_table_unit_comments() {
        let mut fetcher = MemoryFetcher::new("shop", QuoteStyle::Backtick).with_table(
            "users",
            vec![ColumnDescriptor::new("email", "varchar").with_comment("login\nname")],
        );
        let content = GoGenerator::new()
            .emit_table(&mut fetcher, "shop", "users", &[])
            .unwrap()
            .content;
        assert_eq!(content.matches("\t// login name\n").count(), 3);
        assert!(content.contains("\t// login name\n\tEmail string\n"));
    }

    #[test]
    fn test_geometry_and_boolean_fields() {
        let mut fetcher = MemoryFetcher::new("geo", QuoteStyle::Backtick).with_table(
            "places",
            vec![
                ColumnDescriptor::new("shape", "geometry").with_nullable(true),
                ColumnDescriptor::new("active", "bit").with_size(1),
            ],
        );
        let unit = GoGenerator::new()
            .emit_table(&mut fetcher, "geo", "places", &[])
            .unwrap();
        assert_eq!(unit.path.to_str(), Some("places.go"));
        let content = unit.content;
        assert!(content.contains("type geometry_Places_Shape struct{ wellKnownBinaryField }\n"));
        assert!(content.contains("sqlingo.NewWellKnownBinaryField(oPlaces, \"shape\")"));
        assert!(content.contains("\tShape *sqlingo.WellKnownBinary\n"));
        assert!(content.contains("sqlingo.NewBooleanField(oPlaces, \"active\")"));
        assert!(content.contains("\tActive bool\n"));
    }

    #[test]
    fn test_empty_table_unit() {
        let mut fetcher = MemoryFetcher::new("shop", QuoteStyle::Backtick).with_table("empty", vec![]);
        let content = GoGenerator::new()
            .emit_table(&mut fetcher, "shop", "empty", &[])
            .unwrap()
            .content;
        assert!(content.contains("return []sqlingo.Field{}\n"));
        assert!(content.contains("return []interface{}{}\n"));
        assert!(content.contains("type EmptyModel struct {\n}\n"));
    }

    #[test]
    fn test_base_unit() {
        let tables = vec!["orders".to_string(), "user_ids".to_string()];
        let forced = vec!["ID".to_string()];
        let unit = GoGenerator::new().emit_base("shop", &tables, &forced).unwrap();
        assert_eq!(unit.path.to_str(), Some(BASE_UNIT_PATH));

        let content = unit.content;
        assert!(content.starts_with("// This file is generated by tabledsl.\n// DO NOT EDIT.\n"));
        assert!(content.contains("package shop_dsl\n"));
        assert!(content.contains(
            "const _ = sqlingoRuntimeAndGeneratorVersionsShouldBeTheSame(sqlingo.SqlingoRuntimeVersion - 2)\n"
        ));
        assert!(content.contains(
            "const _ = sqlingoRuntimeAndGeneratorVersionsShouldBeTheSame(2 - sqlingo.SqlingoRuntimeVersion)\n"
        ));
        for category in FieldCategory::ALL {
            assert!(content.contains(&format!(
                "type {} interface {{\n\tsqlingo.{}\n}}\n",
                category.marker_alias(),
                category.runtime_field()
            )));
        }
        assert!(content.contains("\tcase \"orders\":\n\t\treturn Orders\n"));
        assert!(content.contains("\tcase \"user_ids\":\n\t\treturn UserIds\n"));
        assert!(content.contains("\tdefault:\n\t\treturn nil\n"));
        assert!(content.contains("\treturn []sqlingo.Table{\n\t\tOrders,\n\t\tUserIds,\n\t}\n}\n"));
    }
}
