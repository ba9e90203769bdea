use std::{fmt::Display, slice};

use crate::{
    error::{Error, Result},
    sql::{
        schema::Schema,
        types::{Row, Value},
    },
};

/// A named table: a schema plus its append-only rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::validation("Table name cannot be empty"));
        }
        Ok(Self {
            name,
            schema,
            rows: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validates and converts the values, then appends them as a new row
    ///
    /// Nothing is appended if any value fails.
    pub fn insert(&mut self, values: Vec<Value>) -> Result<()> {
        let row = self
            .schema
            .convert_row(values)
            .map_err(|e| e.with_table(&self.name))?;
        self.rows.push(row);
        Ok(())
    }

    /// Iterates the rows in insertion order
    pub fn scan(&self) -> slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Removes every row, keeping the schema
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.column_names()
    }

    /// Resolves a column name to its index, failing with ColumnNotFound
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.schema
            .column_index(column)
            .ok_or_else(|| Error::ColumnNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table(name='{}', columns={}, rows={})",
            self.name,
            self.schema.len(),
            self.rows.len()
        )
    }
}
