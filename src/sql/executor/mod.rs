use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        executor::query::Select,
        plan::{Operation, Plan},
        types::Row,
    },
    storage::engine::Engine,
};

mod format;
mod mutation;
mod query;
mod schema;

/// SQL executor trait
pub trait Executor<E: Engine> {
    fn execute(self: Box<Self>, engine: &mut E) -> Result<ResultSet>;
}

impl<E: Engine + 'static> dyn Executor<E> {
    /// Builds the executor of a standalone operation
    ///
    /// Scan, Filter and Project only run inside a SELECT pipeline.
    pub fn build(operation: Operation) -> Result<Box<dyn Executor<E>>> {
        let executor: Box<dyn Executor<E>> = match operation {
            Operation::CreateTable(op) => Box::new(op),
            Operation::Insert(op) => Box::new(op),
            op @ (Operation::Scan(_) | Operation::Filter(_) | Operation::Project(_)) => {
                return Err(Error::Execution {
                    message: format!("{} cannot run outside a SELECT query", op.name()),
                    operation: Some(op.name().to_string()),
                });
            }
        };
        Ok(executor)
    }
}

/// Execution result set
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    /// Rows of a SELECT, possibly empty
    Scan { columns: Vec<String>, rows: Vec<Row> },
    /// Status message of a statement that returns no rows
    Message { text: String },
}

impl ResultSet {
    pub fn message(text: impl Into<String>) -> Self {
        ResultSet::Message { text: text.into() }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, ResultSet::Scan { .. })
    }

    pub fn row_count(&self) -> usize {
        match self {
            ResultSet::Scan { rows, .. } => rows.len(),
            ResultSet::Message { .. } => 0,
        }
    }
}

/// Runs plans against a storage engine
pub struct ExecutionEngine;

impl ExecutionEngine {
    /// Executes a plan
    ///
    /// A plan holding a Scan runs as a scan, filter, project pipeline. Any
    /// other plan runs its operations in order and returns the last result.
    /// Domain errors pass through; anything else becomes an execution error.
    pub fn execute<E: Engine + 'static>(plan: Plan, engine: &mut E) -> Result<ResultSet> {
        Self::run(plan, engine).map_err(|err| {
            if err.is_domain() {
                return err;
            }
            Error::Execution {
                message: format!("Failed to execute query plan: {}", err.message()),
                operation: None,
            }
        })
    }

    fn run<E: Engine + 'static>(plan: Plan, engine: &mut E) -> Result<ResultSet> {
        if plan.is_empty() {
            return Ok(ResultSet::message("No operations to execute."));
        }
        if plan.has_scan() {
            return Box::new(Select::from_plan(plan)?).execute(engine);
        }

        let mut result = None;
        for operation in plan.into_operations() {
            let name = operation.name();
            debug!(operation = name, "executing operation");
            let executor = <dyn Executor<E>>::build(operation)?;
            let set = executor.execute(engine).map_err(|err| {
                if err.is_domain() {
                    return err;
                }
                Error::Execution {
                    message: format!("Failed to execute {}: {}", name, err.message()),
                    operation: Some(name.to_string()),
                }
            })?;
            result = Some(set);
        }
        Ok(result.unwrap_or_else(|| ResultSet::message("Operation completed successfully.")))
    }
}
