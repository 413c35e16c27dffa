//! Form synthesizer.
//!
//! Maps each column's declared type string to an input widget category and
//! parses the raw strings a user submits into typed SQL values. The
//! dispatch is a closed [`WidgetKind`] mapping — new categories extend the
//! enum, not branch logic at call sites.
//!
//! No cross-field validation happens here: not-null and primary-key
//! constraints are left to the storage engine.

use serde::Serialize;

use crate::data::CellValue;
use crate::metadata::ColumnInfo;

/// Errors from parsing submitted field values.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("field '{field}': '{value}' is not a whole number")]
    InvalidInteger { field: String, value: String },

    #[error("field '{field}': '{value}' is not a decimal number")]
    InvalidFloat { field: String, value: String },
}

/// Input widget category for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    /// Whole-number input.
    Integer,
    /// Decimal-number input.
    Float,
    /// Free-text input.
    Text,
    /// Free-text fallback for a declared type we do not recognize.
    Unknown,
}

impl WidgetKind {
    /// Dispatch on the declared type string, case-insensitively.
    pub fn for_decl_type(decl_type: &str) -> Self {
        match decl_type.trim().to_lowercase().as_str() {
            "integer" | "int" => WidgetKind::Integer,
            "real" | "float" | "double" => WidgetKind::Float,
            "text" | "varchar" | "char" | "string" => WidgetKind::Text,
            _ => WidgetKind::Unknown,
        }
    }
}

/// One synthesized input field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    /// Column name; doubles as the submission key.
    pub name: String,
    /// Declared type as reported by the catalog.
    pub decl_type: String,
    /// Widget category the UI should render.
    pub widget: WidgetKind,
    /// Human-readable label.
    pub label: String,
}

impl FieldSpec {
    fn from_column(column: &ColumnInfo) -> Self {
        let widget = WidgetKind::for_decl_type(&column.decl_type);
        let label = match widget {
            WidgetKind::Integer => format!("{} (Integer)", column.name),
            WidgetKind::Float => format!("{} (Float)", column.name),
            WidgetKind::Text => format!("{} (Text)", column.name),
            WidgetKind::Unknown => {
                format!("{} (unknown type '{}')", column.name, column.decl_type)
            }
        };

        Self {
            name: column.name.clone(),
            decl_type: column.decl_type.clone(),
            widget,
            label,
        }
    }

    /// Parse a submitted raw string into a typed SQL value.
    ///
    /// Text widgets keep the raw string untouched. Numeric widgets trim
    /// whitespace and map empty input to SQL NULL — a number input that was
    /// left blank is an absent value, not zero.
    pub fn parse_input(&self, raw: &str) -> Result<CellValue, FormError> {
        match self.widget {
            WidgetKind::Integer => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(CellValue::Null);
                }
                trimmed
                    .parse::<i64>()
                    .map(CellValue::Integer)
                    .map_err(|_| FormError::InvalidInteger {
                        field: self.name.clone(),
                        value: raw.to_string(),
                    })
            }
            WidgetKind::Float => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(CellValue::Null);
                }
                trimmed
                    .parse::<f64>()
                    .map(CellValue::Real)
                    .map_err(|_| FormError::InvalidFloat {
                        field: self.name.clone(),
                        value: raw.to_string(),
                    })
            }
            WidgetKind::Text | WidgetKind::Unknown => Ok(CellValue::Text(raw.to_string())),
        }
    }
}

/// Synthesize one input field per column, in column order.
pub fn synthesize_fields(columns: &[ColumnInfo]) -> Vec<FieldSpec> {
    columns.iter().map(FieldSpec::from_column).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, decl_type: &str) -> ColumnInfo {
        ColumnInfo {
            cid: 0,
            name: name.to_string(),
            decl_type: decl_type.to_string(),
            not_null: false,
            default_value: None,
            pk: 0,
        }
    }

    #[test]
    fn test_widget_dispatch_table() {
        for decl in ["integer", "int", "INTEGER", "Int"] {
            assert_eq!(WidgetKind::for_decl_type(decl), WidgetKind::Integer);
        }
        for decl in ["real", "float", "double", "REAL", "Double"] {
            assert_eq!(WidgetKind::for_decl_type(decl), WidgetKind::Float);
        }
        for decl in ["text", "varchar", "char", "string", "TEXT", "VarChar"] {
            assert_eq!(WidgetKind::for_decl_type(decl), WidgetKind::Text);
        }
        for decl in ["BLOB", "DATETIME", "NUMERIC", "VARCHAR(40)", ""] {
            assert_eq!(WidgetKind::for_decl_type(decl), WidgetKind::Unknown);
        }
    }

    #[test]
    fn test_synthesize_one_field_per_column_in_order() {
        let columns = vec![
            column("id", "INTEGER"),
            column("name", "TEXT"),
            column("birthday", "DATETIME"),
        ];
        let fields = synthesize_fields(&columns);

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "id");
        assert_eq!(fields[0].widget, WidgetKind::Integer);
        assert_eq!(fields[0].label, "id (Integer)");
        assert_eq!(fields[1].widget, WidgetKind::Text);
        assert_eq!(fields[2].widget, WidgetKind::Unknown);
        assert_eq!(fields[2].label, "birthday (unknown type 'DATETIME')");
    }

    #[test]
    fn test_parse_integer_input() {
        let field = FieldSpec::from_column(&column("id", "INTEGER"));
        assert_eq!(field.parse_input("3").unwrap(), CellValue::Integer(3));
        assert_eq!(field.parse_input(" -12 ").unwrap(), CellValue::Integer(-12));
        assert_eq!(field.parse_input("").unwrap(), CellValue::Null);
        assert!(matches!(
            field.parse_input("three"),
            Err(FormError::InvalidInteger { .. })
        ));
        assert!(field.parse_input("1.5").is_err());
    }

    #[test]
    fn test_parse_float_input() {
        let field = FieldSpec::from_column(&column("score", "REAL"));
        assert_eq!(field.parse_input("0.5").unwrap(), CellValue::Real(0.5));
        assert_eq!(field.parse_input("2").unwrap(), CellValue::Real(2.0));
        assert_eq!(field.parse_input("  ").unwrap(), CellValue::Null);
        assert!(matches!(
            field.parse_input("half"),
            Err(FormError::InvalidFloat { .. })
        ));
    }

    #[test]
    fn test_parse_text_keeps_raw_string() {
        let field = FieldSpec::from_column(&column("name", "TEXT"));
        assert_eq!(
            field.parse_input("  Ana  ").unwrap(),
            CellValue::Text("  Ana  ".to_string())
        );
        assert_eq!(field.parse_input("").unwrap(), CellValue::Text(String::new()));
    }

    #[test]
    fn test_unknown_widget_parses_as_raw_string() {
        let field = FieldSpec::from_column(&column("created", "DATETIME"));
        assert_eq!(
            field.parse_input("2024-01-01").unwrap(),
            CellValue::Text("2024-01-01".to_string())
        );
    }
}
