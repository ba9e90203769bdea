use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use tracing::{info, warn};

use crate::{
    error::Result,
    sql::engine::SqlEngine,
    storage::{
        engine::Engine,
        memory::MemoryEngine,
        persist::{PersistFormat, Persistence},
    },
};

const PROMPT: &str = "sql> ";

const HELP: &str = "Available Commands:
  CREATE TABLE table_name (column1 type1, column2 type2, ...);
    - Create a new table with specified columns and types
    - Supported types: INT, VARCHAR[(n)], FLOAT, BOOLEAN, optionally NOT NULL
  INSERT INTO table_name VALUES (value1, value2, ...);
    - Insert a new row into the specified table
  SELECT column1, column2, ... FROM table_name [WHERE condition];
  SELECT * FROM table_name [WHERE condition];
    - Select data from a table
    - Use * to select all columns
    - WHERE clause supports: =, >, <, >=, <=, !=, <>
  SHOW TABLES;
    - List all tables in the database
  HELP;
    - Show this help message
  EXIT; or QUIT;
    - Exit the SQL shell

Examples:
  CREATE TABLE users (id INT, name VARCHAR, age INT);
  INSERT INTO users VALUES (1, 'Alice', 25);
  SELECT * FROM users;
  SELECT name, age FROM users WHERE age > 20;";

/// Shell settings
#[derive(Debug, Clone, Default)]
pub struct ShellConfig {
    /// Directory tables are loaded from at start and saved to on exit
    pub data_dir: Option<PathBuf>,
    pub format: PersistFormat,
}

/// Line-oriented SQL shell over an in-memory engine
pub struct Shell {
    engine: SqlEngine<MemoryEngine>,
    persistence: Option<Persistence>,
    running: bool,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Result<Self> {
        let persistence = config
            .data_dir
            .map(|dir| Persistence::new(dir, config.format))
            .transpose()?;
        Ok(Self {
            engine: SqlEngine::in_memory(),
            persistence,
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn engine(&self) -> &SqlEngine<MemoryEngine> {
        &self.engine
    }

    /// Handles one input line and returns the text to print
    pub fn process_command(&mut self, line: &str) -> String {
        let command = line.trim();
        if command.is_empty() {
            return String::new();
        }

        let normalized = command.trim_end_matches(';').trim().to_lowercase();
        let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.as_str() {
            "exit" | "quit" => {
                self.running = false;
                "Goodbye!".to_string()
            }
            "help" => HELP.to_string(),
            "show tables" => self.show_tables(),
            _ => match self.engine.execute(command) {
                Ok(result) => result.to_string(),
                Err(err) => format!("Error: {}", err),
            },
        }
    }

    fn show_tables(&self) -> String {
        let tables = self.engine.storage().list_tables();
        if tables.is_empty() {
            return "No tables found.".to_string();
        }
        let mut out = String::from("Tables:");
        for table in tables {
            out.push_str("\n  ");
            out.push_str(&table);
        }
        out
    }

    /// Loads every saved table, if a data directory is configured
    pub fn load(&mut self) -> Result<Vec<String>> {
        match &self.persistence {
            Some(persistence) => {
                let loaded = persistence.load_all(self.engine.storage_mut())?;
                info!(tables = loaded.len(), dir = %persistence.dir().display(), "loaded tables");
                Ok(loaded)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Saves every table, if a data directory is configured
    pub fn save(&self) -> Result<usize> {
        match &self.persistence {
            Some(persistence) => {
                let saved = persistence.save_all(self.engine.storage())?;
                info!(tables = saved.len(), dir = %persistence.dir().display(), "saved tables");
                Ok(saved.len())
            }
            None => Ok(0),
        }
    }

    /// Runs the read-eval-print loop until `exit`, `quit` or end of input
    ///
    /// Tables are loaded before the first prompt and saved after the last
    /// statement, also when reading input fails.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        let loaded = self.load()?;
        writeln!(output, "Mini SQL Engine")?;
        writeln!(output, "Type 'help' for available commands, 'exit' or 'quit' to exit.")?;
        if !loaded.is_empty() {
            writeln!(output, "Loaded tables: {}", loaded.join(", "))?;
        }
        writeln!(output)?;

        let mut lines = input.lines();
        while self.running {
            write!(output, "{}", PROMPT)?;
            output.flush()?;
            let Some(line) = lines.next() else {
                writeln!(output, "\nGoodbye!")?;
                break;
            };
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(error = %err, "failed to read input, stopping");
                    writeln!(output, "\nError: failed to read input: {}", err)?;
                    break;
                }
            };
            let result = self.process_command(&line);
            if !result.is_empty() {
                writeln!(output, "{}", result)?;
            }
        }

        self.save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempfile::TempDir;

    use super::{Shell, ShellConfig};
    use crate::{
        error::{Error, Result},
        storage::{engine::Engine, persist::PersistFormat},
    };

    #[test]
    fn test_process_command() -> Result<()> {
        let mut shell = Shell::new(ShellConfig::default())?;
        assert_eq!(shell.process_command("   "), "");
        assert_eq!(shell.process_command("SHOW TABLES;"), "No tables found.");
        assert!(shell.process_command("help").starts_with("Available Commands:"));

        assert_eq!(
            shell.process_command("CREATE TABLE users (id INT, name VARCHAR(10));"),
            "Table 'users' created successfully."
        );
        assert_eq!(shell.process_command("show  tables"), "Tables:\n  users");
        shell.process_command("INSERT INTO users VALUES (1, 'Alice')");
        assert_eq!(
            shell.process_command("SELECT name FROM users"),
            "name \n-----\nAlice\n\n(1 row)"
        );

        let err = shell.process_command("SELECT * FROM ghost");
        assert!(err.starts_with("Error: table error: Table 'ghost' does not exist"));

        assert!(shell.is_running());
        assert_eq!(shell.process_command("Quit;"), "Goodbye!");
        assert!(!shell.is_running());
        Ok(())
    }

    #[test]
    fn test_run_loop() -> Result<()> {
        let mut shell = Shell::new(ShellConfig::default())?;
        let input = Cursor::new("CREATE TABLE t (a INT)\nINSERT INTO t VALUES (7)\nexit\nSELECT * FROM t\n");
        let mut output = Vec::new();
        shell.run(input, &mut output)?;

        let text = String::from_utf8(output).map_err(|e| Error::Internal(e.to_string()))?;
        assert!(text.starts_with("Mini SQL Engine\n"));
        assert!(text.contains("sql> Table 't' created successfully."));
        assert!(text.contains("sql> 1 row inserted into table 't'."));
        assert!(text.ends_with("sql> Goodbye!\n"));
        assert_eq!(shell.engine().storage().get_table("t")?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_run_persists_between_sessions() -> Result<()> {
        let dir = TempDir::new()?;
        let config = ShellConfig {
            data_dir: Some(dir.path().to_path_buf()),
            format: PersistFormat::Binary,
        };

        let mut first = Shell::new(config.clone())?;
        let input = Cursor::new("CREATE TABLE Notes (body VARCHAR(20))\nINSERT INTO notes VALUES ('hello')\n");
        first.run(input, Vec::new())?;
        assert!(dir.path().join("notes.bin").exists());

        let mut second = Shell::new(config)?;
        let mut output = Vec::new();
        second.run(Cursor::new("SELECT * FROM notes\n"), &mut output)?;
        let text = String::from_utf8(output).map_err(|e| Error::Internal(e.to_string()))?;
        assert!(text.contains("Loaded tables: notes"));
        assert!(text.contains("hello"));
        Ok(())
    }

    #[test]
    fn test_run_saves_after_read_error() -> Result<()> {
        let dir = TempDir::new()?;
        let config = ShellConfig {
            data_dir: Some(dir.path().to_path_buf()),
            format: PersistFormat::Json,
        };

        let mut shell = Shell::new(config.clone())?;
        let input = Cursor::new(b"CREATE TABLE t (a INT)\nINSERT INTO t VALUES (1)\n\xff\xfe\nSELECT * FROM t\n".to_vec());
        let mut output = Vec::new();
        shell.run(input, &mut output)?;

        let text = String::from_utf8(output).map_err(|e| Error::Internal(e.to_string()))?;
        assert!(text.contains("Error: failed to read input"));
        assert!(dir.path().join("t.json").exists());

        let mut reloaded = Shell::new(config)?;
        assert_eq!(reloaded.load()?, vec!["t".to_string()]);
        assert_eq!(reloaded.engine().storage().get_table("t")?.len(), 1);
        Ok(())
    }
}
