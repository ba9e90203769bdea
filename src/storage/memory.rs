use std::{collections::BTreeMap, slice};

use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    sql::{
        schema::Schema,
        table::Table,
        types::{Row, Value},
    },
    storage::engine::{Engine, ScanIterator},
};

/// In-memory table registry
///
/// Tables are keyed by their lower-cased name; each table keeps the name it
/// was created with for display.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    tables: BTreeMap<String, Table>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        let key = name.to_lowercase();
        if !self.tables.contains_key(&key) {
            return Err(self.not_found(name));
        }
        self.tables
            .get_mut(&key)
            .ok_or_else(|| Error::Internal(format!("table {} vanished", name)))
    }

    fn not_found(&self, name: &str) -> Error {
        let message = if self.tables.is_empty() {
            format!("Table '{}' does not exist. No tables have been created yet", name)
        } else {
            let available = self.list_tables();
            format!(
                "Table '{}' does not exist. Available tables: {}",
                name,
                available.join(", ")
            )
        };
        Error::TableNotFound {
            table: name.to_string(),
            message,
        }
    }
}

/// Implements the registry contract over a BTreeMap
impl Engine for MemoryEngine {
    type ScanIterator<'a> = MemoryScanIterator<'a>;

    fn create_table(&mut self, name: &str, schema: Schema) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::validation("Table name cannot be empty"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::Validation {
                message: format!(
                    "Invalid table name: '{}'. Table names must contain only letters, numbers, underscores, and hyphens",
                    name
                ),
                table: Some(name.to_string()),
                column: None,
            });
        }
        if schema.is_empty() {
            return Err(Error::validation("Schema must have at least one column"));
        }

        let key = name.to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(Error::storage(
                format!("Table '{}' already exists", name),
                "create_table",
            ));
        }

        let table = Table::new(name, schema)?;
        info!(table = name, columns = table.schema().len(), "created table");
        self.tables.insert(key, table);
        Ok(())
    }

    fn get_table(&self, name: &str) -> Result<&Table> {
        if name.trim().is_empty() {
            return Err(Error::validation("Table name cannot be empty"));
        }
        self.tables
            .get(&name.to_lowercase())
            .ok_or_else(|| self.not_found(name))
    }

    fn insert_values(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.is_empty() {
            return Err(Error::Validation {
                message: "Cannot insert empty values".to_string(),
                table: Some(name.to_string()),
                column: None,
            });
        }
        let table = self.table_mut(name)?;
        table.insert(values)?;
        debug!(table = name, rows = table.len(), "inserted row");
        Ok(())
    }

    fn scan_table(&self, name: &str) -> Result<Self::ScanIterator<'_>> {
        Ok(MemoryScanIterator {
            inner: self.get_table(name)?.scan(),
        })
    }

    fn drop_table(&mut self, name: &str) -> Result<()> {
        match self.tables.remove(&name.to_lowercase()) {
            Some(_) => {
                info!(table = name, "dropped table");
                Ok(())
            }
            None => Err(self.not_found(name)),
        }
    }

    fn clear_table(&mut self, name: &str) -> Result<()> {
        self.table_mut(name)?.clear();
        Ok(())
    }

    fn clear_all(&mut self) {
        self.tables.clear();
    }

    fn list_tables(&self) -> Vec<String> {
        self.tables.values().map(|t| t.name().to_string()).collect()
    }
}

/// In-memory table scan iterator
pub struct MemoryScanIterator<'a> {
    inner: slice::Iter<'a, Row>,
}

impl<'a> ScanIterator<'a> for MemoryScanIterator<'a> {}

impl<'a> Iterator for MemoryScanIterator<'a> {
    type Item = &'a Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> DoubleEndedIterator for MemoryScanIterator<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<'a> ExactSizeIterator for MemoryScanIterator<'a> {}
