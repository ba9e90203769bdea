use std::fmt::Display;

use crate::{
    error::Result,
    sql::{
        executor::{ExecutionEngine, ResultSet},
        parser::ast::{Statement, WhereClause},
        schema::Schema,
        types::Value,
    },
    storage::engine::Engine,
};

mod planner;

pub use planner::Planner;

/// Creates a table with a validated schema
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableOperation {
    pub table_name: String,
    pub schema: Schema,
}

/// Appends one row of literal values to a table
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOperation {
    pub table_name: String,
    pub values: Vec<Value>,
}

/// Reads every row of a table in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOperation {
    pub table_name: String,
}

/// Keeps the rows satisfying a single predicate
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOperation {
    pub predicate: WhereClause,
}

/// Narrows rows to the named columns, `["*"]` keeps them all
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOperation {
    pub columns: Vec<String>,
}

impl ProjectOperation {
    pub fn is_wildcard(&self) -> bool {
        matches!(self.columns.as_slice(), [only] if only == "*")
    }
}

/// Primitive relational operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreateTable(CreateTableOperation),
    Insert(InsertOperation),
    Scan(ScanOperation),
    Filter(FilterOperation),
    Project(ProjectOperation),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateTable(_) => "CreateTableOperation",
            Operation::Insert(_) => "InsertOperation",
            Operation::Scan(_) => "ScanOperation",
            Operation::Filter(_) => "FilterOperation",
            Operation::Project(_) => "ProjectOperation",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::CreateTable(op) => write!(f, "CreateTable({})", op.table_name),
            Operation::Insert(op) => write!(f, "Insert({}, {} values)", op.table_name, op.values.len()),
            Operation::Scan(op) => write!(f, "Scan({})", op.table_name),
            Operation::Filter(op) => write!(f, "Filter({})", op.predicate),
            Operation::Project(op) => write!(f, "Project({})", op.columns.join(", ")),
        }
    }
}

/// Execution plan: an ordered sequence of operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    operations: Vec<Operation>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a plan from a parsed statement
    pub fn build(stmt: Statement) -> Result<Self> {
        Planner::new().build(stmt)
    }

    pub fn add(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// A plan containing a scan is run as a SELECT pipeline
    pub fn has_scan(&self) -> bool {
        self.operations
            .iter()
            .any(|op| matches!(op, Operation::Scan(_)))
    }

    /// Executes the plan against a storage engine
    pub fn execute<E: Engine + 'static>(self, engine: &mut E) -> Result<ResultSet> {
        ExecutionEngine::execute(self, engine)
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ops = self
            .operations
            .iter()
            .map(|op| op.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", ops.join(" -> "))
    }
}
