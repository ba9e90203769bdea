use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::types::{DataType, Row, Value},
};

/// Length applied to VARCHAR columns declared without one
pub const DEFAULT_VARCHAR_LENGTH: u32 = 255;

/// Text values accepted as `true` by BOOLEAN columns (compared lower-cased)
const TRUTHY: [&str; 4] = ["true", "1", "yes", "on"];

/// Column type descriptor
///
/// Immutable once built. `max_length` is present iff the column is VARCHAR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColumnDescription", into = "ColumnDescription")]
pub struct Column {
    name: String,
    datatype: DataType,
    nullable: bool,
    max_length: Option<u32>,
}

impl Column {
    /// Creates a nullable column; VARCHAR gets the default length
    pub fn new(name: impl Into<String>, datatype: DataType) -> Result<Self> {
        Self::with_options(name, datatype, true, None)
    }

    /// Creates a VARCHAR column with an explicit length
    pub fn varchar(name: impl Into<String>, max_length: u32) -> Result<Self> {
        Self::with_options(name, DataType::Varchar, true, Some(max_length))
    }

    pub fn with_options(
        name: impl Into<String>,
        datatype: DataType,
        nullable: bool,
        max_length: Option<u32>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::validation("Column name cannot be empty"));
        }
        let max_length = match (datatype, max_length) {
            (_, Some(0)) => {
                return Err(Error::Validation {
                    message: format!("max_length must be positive for column {}", name),
                    table: None,
                    column: Some(name),
                });
            }
            (DataType::Varchar, len) => Some(len.unwrap_or(DEFAULT_VARCHAR_LENGTH)),
            (_, None) => None,
            (other, Some(_)) => {
                return Err(Error::Validation {
                    message: format!("max_length is only allowed on VARCHAR, column {} is {}", name, other),
                    table: None,
                    column: Some(name),
                });
            }
        };
        Ok(Self {
            name,
            datatype,
            nullable,
            max_length,
        })
    }

    /// Returns a copy of this column with the given nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    /// Validates a value against this column and converts it to the column's type
    pub fn convert(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            if self.nullable {
                return Ok(Value::Null);
            }
            return Err(Error::Validation {
                message: format!("Column {} cannot be null", self.name),
                table: None,
                column: Some(self.name.clone()),
            });
        }

        let converted = match self.datatype {
            DataType::Int => Self::to_int(&value),
            DataType::Float => Self::to_float(&value),
            DataType::Boolean => Ok(Self::to_boolean(&value)),
            DataType::Varchar => {
                let text = value.to_text();
                let limit = self.max_length.unwrap_or(DEFAULT_VARCHAR_LENGTH);
                if text.chars().count() > limit as usize {
                    Err(format!(
                        "String too long for column {} (max_length {})",
                        self.name, limit
                    ))
                } else {
                    Ok(Value::Text(text))
                }
            }
        };

        converted.map_err(|reason| Error::Validation {
            message: format!(
                "Cannot convert value {} to {} for column {}: {}",
                value.to_text(),
                self.datatype,
                self.name,
                reason
            ),
            table: None,
            column: Some(self.name.clone()),
        })
    }

    fn to_int(value: &Value) -> std::result::Result<Value, String> {
        match value {
            Value::Integer(i) => Ok(Value::Integer(*i)),
            Value::Float(f) if !f.is_finite() || f.fract() != 0.0 => {
                Err(format!("Cannot convert non-integer float {} to INT", f))
            }
            // i64::MAX as f64 rounds up to 2^63, hence the strict bound
            Value::Float(f) if *f >= i64::MAX as f64 || *f < i64::MIN as f64 => {
                Err(format!("Float {} is out of INT range", f))
            }
            Value::Float(f) => Ok(Value::Integer(*f as i64)),
            Value::Boolean(b) => Ok(Value::Integer(*b as i64)),
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| e.to_string()),
            Value::Null => Ok(Value::Null),
        }
    }

    fn to_float(value: &Value) -> std::result::Result<Value, String> {
        match value {
            Value::Integer(i) => Ok(Value::Float(*i as f64)),
            Value::Float(f) => Self::finite(*f),
            Value::Boolean(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| e.to_string())
                .and_then(Self::finite),
            Value::Null => Ok(Value::Null),
        }
    }

    fn finite(f: f64) -> std::result::Result<Value, String> {
        if f.is_finite() {
            Ok(Value::Float(f))
        } else {
            Err(format!("FLOAT values must be finite, got {}", f))
        }
    }

    fn to_boolean(value: &Value) -> Value {
        Value::Boolean(match value {
            Value::Boolean(b) => *b,
            Value::Text(s) => TRUTHY.contains(&s.to_lowercase().as_str()),
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Null => false,
        })
    }
}

/// Serialized description of a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: DataType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
}

fn default_nullable() -> bool {
    true
}

impl TryFrom<ColumnDescription> for Column {
    type Error = Error;

    fn try_from(desc: ColumnDescription) -> Result<Self> {
        Column::with_options(desc.name, desc.data_type, desc.nullable, desc.max_length)
    }
}

impl From<Column> for ColumnDescription {
    fn from(column: Column) -> Self {
        Self {
            name: column.name,
            data_type: column.datatype,
            nullable: column.nullable,
            max_length: column.max_length,
        }
    }
}

/// Ordered, non-empty set of columns with case-insensitively unique names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDescription", into = "SchemaDescription")]
pub struct Schema {
    columns: Vec<Column>,
    /// Lower-cased column name -> position
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::validation("Schema must have at least one column"));
        }

        let duplicates = duplicate_names(columns.iter().map(|c| c.name()));
        if !duplicates.is_empty() {
            return Err(Error::validation(format!(
                "Duplicate column names are not allowed: {}",
                duplicates.join(", ")
            )));
        }

        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name().to_lowercase(), i))
            .collect();
        Ok(Self { columns, index })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Returns the column index for a given column name (case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Checks arity, then converts every value to its column's type
    pub fn convert_row(&self, values: Vec<Value>) -> Result<Row> {
        if values.len() != self.columns.len() {
            return Err(Error::validation(format!(
                "Expected {} values, got {}",
                self.columns.len(),
                values.len()
            )));
        }
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.convert(value))
            .collect()
    }

    pub fn describe(&self) -> SchemaDescription {
        self.clone().into()
    }
}

/// Serialized description of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub columns: Vec<ColumnDescription>,
}

impl TryFrom<SchemaDescription> for Schema {
    type Error = Error;

    fn try_from(desc: SchemaDescription) -> Result<Self> {
        let columns = desc
            .columns
            .into_iter()
            .map(Column::try_from)
            .collect::<Result<Vec<_>>>()?;
        Schema::new(columns)
    }
}

impl From<Schema> for SchemaDescription {
    fn from(schema: Schema) -> Self {
        Self {
            columns: schema.columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Returns the lower-cased names occurring more than once, sorted
pub fn duplicate_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for name in names {
        let lower = name.to_lowercase();
        if !seen.insert(lower.clone()) {
            duplicates.insert(lower);
        }
    }
    duplicates.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{Column, Schema, SchemaDescription};
    use crate::{
        error::{Error, Result},
        sql::types::{DataType, Value},
    };

    fn users() -> Result<Schema> {
        Schema::new(vec![
            Column::new("id", DataType::Int)?,
            Column::varchar("name", 50)?,
            Column::new("score", DataType::Float)?,
            Column::new("active", DataType::Boolean)?,
        ])
    }

    #[test]
    fn test_column_max_length_invariant() -> Result<()> {
        assert_eq!(Column::new("a", DataType::Varchar)?.max_length(), Some(255));
        assert_eq!(Column::new("a", DataType::Int)?.max_length(), None);
        assert!(Column::with_options("a", DataType::Int, true, Some(10)).is_err());
        assert!(Column::varchar("a", 0).is_err());
        assert!(Column::new("", DataType::Int).is_err());
        Ok(())
    }

    #[test]
    fn test_schema_rejects_duplicates_case_insensitively() -> Result<()> {
        let err = Schema::new(vec![
            Column::new("Id", DataType::Int)?,
            Column::new("id", DataType::Float)?,
        ])
        .unwrap_err();
        assert!(err.message().contains("id"));
        assert!(Schema::new(vec![]).is_err());
        Ok(())
    }

    #[test]
    fn test_schema_lookup() -> Result<()> {
        let schema = users()?;
        assert_eq!(schema.column_index("NAME"), Some(1));
        assert_eq!(schema.column_index("missing"), None);
        assert_eq!(schema.column("Score").map(|c| c.datatype()), Some(DataType::Float));
        assert_eq!(schema.column_names(), vec!["id", "name", "score", "active"]);
        Ok(())
    }

    #[test]
    fn test_convert_row() -> Result<()> {
        let schema = users()?;
        let row = schema.convert_row(vec![
            Value::Float(3.0),
            Value::Integer(7),
            Value::Integer(4),
            Value::Text("YES".into()),
        ])?;
        assert_eq!(
            row,
            vec![
                Value::Integer(3),
                Value::Text("7".into()),
                Value::Float(4.0),
                Value::Boolean(true),
            ]
        );

        let err = schema.convert_row(vec![Value::Integer(1)]).unwrap_err();
        assert!(err.message().contains("Expected 4 values"));

        let err = schema
            .convert_row(vec![
                Value::Float(1.5),
                Value::Null,
                Value::Null,
                Value::Null,
            ])
            .unwrap_err();
        assert!(matches!(err, Error::Validation { column: Some(ref c), .. } if c == "id"));
        Ok(())
    }

    #[test]
    fn test_convert_value_rules() -> Result<()> {
        let flag = Column::new("flag", DataType::Boolean)?;
        assert_eq!(flag.convert(Value::Text("on".into()))?, Value::Boolean(true));
        assert_eq!(flag.convert(Value::Text("nope".into()))?, Value::Boolean(false));

        let short = Column::varchar("n", 3)?;
        assert_eq!(short.convert(Value::Text("abc".into()))?, Value::Text("abc".into()));
        assert!(short.convert(Value::Text("toolong".into())).is_err());

        let strict = Column::new("id", DataType::Int)?.with_nullable(false);
        let err = strict.convert(Value::Null).unwrap_err();
        assert!(err.message().contains("cannot be null"));
        assert!(strict.convert(Value::Text("abc".into())).is_err());
        assert_eq!(strict.convert(Value::Text("12".into()))?, Value::Integer(12));
        Ok(())
    }

    #[test]
    fn test_convert_float_must_be_finite() -> Result<()> {
        let score = Column::new("score", DataType::Float)?.with_nullable(false);
        assert_eq!(score.convert(Value::Text(" 1.5 ".into()))?, Value::Float(1.5));
        for text in ["inf", "-infinity", "NaN", "1e999"] {
            match score.convert(Value::Text(text.into())) {
                Err(Error::Validation { message, .. }) => assert!(message.contains("finite")),
                other => panic!("unexpected result {:?}", other),
            }
        }
        assert!(score.convert(Value::Float(f64::NAN)).is_err());
        Ok(())
    }

    #[test]
    fn test_schema_description_round_trip() -> Result<()> {
        let schema = Schema::new(vec![
            Column::new("id", DataType::Int)?.with_nullable(false),
            Column::varchar("name", 20)?,
            Column::new("bio", DataType::Varchar)?,
        ])?;

        let json = serde_json::to_string(&schema)?;
        let rebuilt: Schema = serde_json::from_str(&json)?;
        assert_eq!(rebuilt, schema);

        let bytes = bincode::serialize(&schema)?;
        let rebuilt: Schema = bincode::deserialize(&bytes)?;
        assert_eq!(rebuilt, schema);

        assert_eq!(Schema::try_from(schema.describe())?, schema);
        Ok(())
    }

    #[test]
    fn test_invalid_description_is_rejected() {
        let json = r#"{"columns":[{"name":"a","data_type":"INT"},{"name":"A","data_type":"FLOAT"}]}"#;
        assert!(serde_json::from_str::<Schema>(json).is_err());

        let desc: SchemaDescription =
            serde_json::from_str(r#"{"columns":[{"name":"s","data_type":"VARCHAR"}]}"#).unwrap();
        let schema = Schema::try_from(desc).unwrap();
        assert_eq!(schema.columns()[0].max_length(), Some(255));
        assert!(schema.columns()[0].is_nullable());
    }
}
