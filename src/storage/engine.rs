use crate::{
    error::Result,
    sql::{
        schema::Schema,
        table::Table,
        types::{Row, Value},
    },
};

/// Abstract table registry interface
///
/// Table names are case-insensitive: every lookup normalizes the name first.
pub trait Engine {
    type ScanIterator<'a>: ScanIterator<'a>
    where
        Self: 'a;

    fn create_table(&mut self, name: &str, schema: Schema) -> Result<()>;
    fn get_table(&self, name: &str) -> Result<&Table>;
    /// Validates, converts and appends one row
    fn insert_values(&mut self, name: &str, values: Vec<Value>) -> Result<()>;
    /// Iterates the table's rows in insertion order
    ///
    /// Each call starts over from the first row.
    fn scan_table(&self, name: &str) -> Result<Self::ScanIterator<'_>>;

    fn drop_table(&mut self, name: &str) -> Result<()>;
    /// Removes every row of the table, keeping its schema
    fn clear_table(&mut self, name: &str) -> Result<()>;
    fn clear_all(&mut self);

    /// Registered table names, ordered by normalized name
    fn list_tables(&self) -> Vec<String>;

    fn table_exists(&self, name: &str) -> bool {
        self.get_table(name).is_ok()
    }
}

/// Row iterator returned by a table scan
pub trait ScanIterator<'a>: DoubleEndedIterator<Item = &'a Row> + ExactSizeIterator {}
