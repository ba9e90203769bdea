use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    sql::{schema::Schema, types::Value},
    storage::engine::Engine,
};

/// On-disk encoding of saved tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PersistFormat {
    /// Human-readable JSON, one `<table>.json` file per table
    #[default]
    Json,
    /// bincode, one `<table>.bin` file per table
    Binary,
}

impl PersistFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PersistFormat::Json => "json",
            PersistFormat::Binary => "bin",
        }
    }
}

/// Saved form of a table
#[derive(Debug, Serialize, Deserialize)]
struct TableFile<V> {
    name: String,
    schema: Schema,
    rows: Vec<Vec<V>>,
    row_count: usize,
}

/// JSON scalar form of a value
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PlainValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&Value> for PlainValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => PlainValue::Null,
            Value::Boolean(b) => PlainValue::Boolean(*b),
            Value::Integer(i) => PlainValue::Integer(*i),
            Value::Float(f) => PlainValue::Float(*f),
            Value::Text(s) => PlainValue::Text(s.clone()),
        }
    }
}

impl From<PlainValue> for Value {
    fn from(value: PlainValue) -> Self {
        match value {
            PlainValue::Null => Value::Null,
            PlainValue::Boolean(b) => Value::Boolean(b),
            PlainValue::Integer(i) => Value::Integer(i),
            PlainValue::Float(f) => Value::Float(f),
            PlainValue::Text(s) => Value::Text(s),
        }
    }
}

/// Saves tables to and loads them from a data directory
///
/// Loading replays every stored row through `insert_values`, so reloaded
/// data passes the same validation as a live INSERT.
#[derive(Debug, Clone)]
pub struct Persistence {
    dir: PathBuf,
    format: PersistFormat,
}

impl Persistence {
    /// Opens a data directory, creating it if missing
    pub fn new(dir: impl Into<PathBuf>, format: PersistFormat) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| storage_error("create directory", &dir, e))?;
        Ok(Self { dir, format })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> PersistFormat {
        self.format
    }

    /// Path a table is saved to: the lower-cased name plus the format's extension
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", name.to_lowercase(), self.format.extension()))
    }

    /// Writes one table to its file, replacing any previous save
    pub fn save_table<E: Engine>(&self, engine: &E, name: &str) -> Result<PathBuf> {
        let table = engine.get_table(name)?;
        let path = self.table_path(name);

        let bytes = match self.format {
            PersistFormat::Json => {
                let file = TableFile {
                    name: table.name().to_string(),
                    schema: table.schema().clone(),
                    rows: table
                        .scan()
                        .map(|row| row.iter().map(PlainValue::from).collect())
                        .collect(),
                    row_count: table.len(),
                };
                serde_json::to_vec_pretty(&file)
                    .map_err(|e| storage_error("save table", &path, e))?
            }
            PersistFormat::Binary => {
                let file = TableFile {
                    name: table.name().to_string(),
                    schema: table.schema().clone(),
                    rows: table.rows().to_vec(),
                    row_count: table.len(),
                };
                bincode::serialize(&file).map_err(|e| storage_error("save table", &path, e))?
            }
        };

        fs::write(&path, bytes).map_err(|e| storage_error("save table", &path, e))?;
        info!(table = table.name(), rows = table.len(), path = %path.display(), "saved table");
        Ok(path)
    }

    /// Loads one file from the data directory as a new table
    ///
    /// The table is named `table_name`, or the file stem when absent. A row
    /// that fails validation aborts the load and removes the partial table.
    pub fn load_table<E: Engine>(
        &self,
        engine: &mut E,
        file_name: &str,
        table_name: Option<&str>,
    ) -> Result<String> {
        let path = self.dir.join(file_name);
        let name = match table_name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::storage(
                        format!("Cannot derive a table name from '{}'", file_name),
                        "load table",
                    )
                })?,
        };

        let bytes = fs::read(&path).map_err(|e| storage_error("load table", &path, e))?;
        let (schema, rows) = match self.format {
            PersistFormat::Json => {
                let file: TableFile<PlainValue> = serde_json::from_slice(&bytes)
                    .map_err(|e| storage_error("load table", &path, e))?;
                let rows = file
                    .rows
                    .into_iter()
                    .map(|row| row.into_iter().map(Value::from).collect())
                    .collect::<Vec<Vec<Value>>>();
                (file.schema, rows)
            }
            PersistFormat::Binary => {
                let file: TableFile<Value> = bincode::deserialize(&bytes)
                    .map_err(|e| storage_error("load table", &path, e))?;
                (file.schema, file.rows)
            }
        };

        engine.create_table(&name, schema)?;
        let count = rows.len();
        for row in rows {
            if let Err(err) = engine.insert_values(&name, row) {
                engine.drop_table(&name)?;
                return Err(err);
            }
        }
        info!(table = %name, rows = count, path = %path.display(), "loaded table");
        Ok(name)
    }

    /// Saves every registered table
    pub fn save_all<E: Engine>(&self, engine: &E) -> Result<Vec<PathBuf>> {
        engine
            .list_tables()
            .iter()
            .map(|name| self.save_table(engine, name))
            .collect()
    }

    /// Loads every file with the format's extension, skipping files that fail
    ///
    /// Returns the names of the loaded tables.
    pub fn load_all<E: Engine>(&self, engine: &mut E) -> Result<Vec<String>> {
        let entries =
            fs::read_dir(&self.dir).map_err(|e| storage_error("list directory", &self.dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| storage_error("list directory", &self.dir, e))?
                .path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(self.format.extension())
            {
                if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(file_name.to_string());
                }
            }
        }
        files.sort();

        let mut loaded = Vec::new();
        for file_name in files {
            match self.load_table(engine, &file_name, None) {
                Ok(name) => loaded.push(name),
                Err(err) => warn!(file = %file_name, error = %err, "skipping table file"),
            }
        }
        Ok(loaded)
    }
}

fn storage_error(operation: &str, path: &Path, err: impl Into<Error>) -> Error {
    Error::storage(
        format!(
            "Failed to {} '{}': {}",
            operation,
            path.display(),
            err.into().message()
        ),
        operation,
    )
}
