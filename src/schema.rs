//! Schema data structures and column type mapping
//!
//! These types form the contract between introspection (produces column
//! descriptors) and code generation (consumes mapped types).

use crate::error::GenError;

/// Engine-independent description of one table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Type name as reported by the engine, without size or modifiers
    pub raw_type: String,
    /// Declared length, 0 when the type has none
    pub size: u32,
    pub unsigned: bool,
    pub nullable: bool,
    /// Column comment, empty when absent
    pub comment: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_type: raw_type.into(),
            size: 0,
            unsigned: false,
            nullable: false,
            comment: String::new(),
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.unsigned = unsigned;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Semantic grouping deciding which runtime field wrapper a column gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Number,
    String,
    Boolean,
    WellKnownBinary,
}

impl FieldCategory {
    pub const ALL: [FieldCategory; 4] = [
        FieldCategory::Number,
        FieldCategory::String,
        FieldCategory::Boolean,
        FieldCategory::WellKnownBinary,
    ];

    /// Runtime capability implemented by fields of this category
    pub fn runtime_field(self) -> &'static str {
        match self {
            FieldCategory::Number => "NumberField",
            FieldCategory::String => "StringField",
            FieldCategory::Boolean => "BooleanField",
            FieldCategory::WellKnownBinary => "WellKnownBinaryField",
        }
    }

    /// Package-private alias of [`FieldCategory::runtime_field`]
    pub fn marker_alias(self) -> &'static str {
        match self {
            FieldCategory::Number => "numberField",
            FieldCategory::String => "stringField",
            FieldCategory::Boolean => "booleanField",
            FieldCategory::WellKnownBinary => "wellKnownBinaryField",
        }
    }
}

/// Target scalar type before nullability is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int { bits: u8, unsigned: bool },
    Float64,
    String,
    Bool,
    WellKnownBinary,
}

impl ScalarType {
    fn signed(bits: u8) -> Self {
        ScalarType::Int {
            bits,
            unsigned: false,
        }
    }

    /// Go spelling of the type
    pub fn go_type(self) -> String {
        match self {
            ScalarType::Int { bits, unsigned } => {
                format!("{}int{}", if unsigned { "u" } else { "" }, bits)
            }
            ScalarType::Float64 => "float64".to_string(),
            ScalarType::String => "string".to_string(),
            ScalarType::Bool => "bool".to_string(),
            ScalarType::WellKnownBinary => "sqlingo.WellKnownBinary".to_string(),
        }
    }
}

/// Result of mapping a column descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedType {
    pub scalar: ScalarType,
    pub nullable: bool,
    pub category: FieldCategory,
}

impl MappedType {
    /// Go spelling, nullable types become pointers
    pub fn go_type(&self) -> String {
        let base = self.scalar.go_type();
        if self.nullable {
            format!("*{}", base)
        } else {
            base
        }
    }
}

/// Map a column to its scalar type and field category
///
/// Fails with [`GenError::UnknownType`] for type names outside the recognized
/// families; there is no fallback type.
pub fn map_type(column: &ColumnDescriptor) -> Result<MappedType, GenError> {
    let raw = column.raw_type.to_lowercase();

    let (scalar, category) = match raw.as_str() {
        "tinyint" => (ScalarType::signed(8), FieldCategory::Number),
        "smallint" => (ScalarType::signed(16), FieldCategory::Number),
        "int" | "mediumint" => (ScalarType::signed(32), FieldCategory::Number),
        "bigint" | "integer" => (ScalarType::signed(64), FieldCategory::Number),
        "float" | "double" | "decimal" | "real" => (ScalarType::Float64, FieldCategory::Number),
        "char" | "varchar" | "character varying" | "text" | "tinytext" | "mediumtext"
        | "longtext" | "enum" | "datetime" | "date" | "time" | "timestamp" | "json"
        | "numeric" => (ScalarType::String, FieldCategory::String),
        // raw bytes are carried as strings
        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => {
            (ScalarType::String, FieldCategory::String)
        }
        "geometry" | "point" | "linestring" | "polygon" | "multipoint" | "multilinestring"
        | "multipolygon" | "geometrycollection" => {
            (ScalarType::WellKnownBinary, FieldCategory::WellKnownBinary)
        }
        "bit" if column.size == 1 => (ScalarType::Bool, FieldCategory::Boolean),
        "bit" => (ScalarType::String, FieldCategory::String),
        "boolean" | "bool" => (ScalarType::Bool, FieldCategory::Boolean),
        _ => {
            return Err(GenError::UnknownType {
                column: column.name.clone(),
                raw_type: column.raw_type.clone(),
            })
        }
    };

    let scalar = match scalar {
        ScalarType::Int { bits, .. } if column.unsigned => ScalarType::Int {
            bits,
            unsigned: true,
        },
        other => other,
    };

    Ok(MappedType {
        scalar,
        nullable: column.nullable,
        category,
    })
}
