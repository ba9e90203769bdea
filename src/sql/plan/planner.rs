use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        parser::ast::Statement,
        plan::{
            CreateTableOperation, FilterOperation, InsertOperation, Operation, Plan,
            ProjectOperation, ScanOperation,
        },
        schema::Schema,
    },
};

/// Query planner - converts AST into execution plans
#[derive(Debug, Default)]
pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self {}
    }

    /// Builds an execution plan from an AST statement
    ///
    /// Failures come back as processing errors naming the statement kind.
    pub fn build(&mut self, stmt: Statement) -> Result<Plan> {
        let node = stmt.kind();
        let plan = self.build_statement(stmt).map_err(|err| match err {
            Error::Processing { .. } => err,
            other => Error::Processing {
                message: format!("Failed to process {} statement: {}", node, other.message()),
                node: node.to_string(),
            },
        })?;
        debug!(node, plan = %plan, "built plan");
        Ok(plan)
    }

    fn build_statement(&self, stmt: Statement) -> Result<Plan> {
        let node = stmt.kind();
        if stmt.table_name().trim().is_empty() {
            return Err(processing("Table name cannot be empty", node));
        }

        let mut plan = Plan::new();
        match stmt {
            Statement::CreateTable { name, columns } => {
                if columns.is_empty() {
                    return Err(processing("CREATE TABLE requires at least one column", node));
                }
                plan.add(Operation::CreateTable(CreateTableOperation {
                    table_name: name,
                    schema: Schema::new(columns)?,
                }));
            }
            Statement::Insert { table_name, values } => {
                if values.is_empty() {
                    return Err(processing("INSERT requires at least one value", node));
                }
                plan.add(Operation::Insert(InsertOperation { table_name, values }));
            }
            Statement::Select {
                table_name,
                columns,
                where_clause,
            } => {
                if columns.is_empty() {
                    return Err(processing("SELECT requires at least one column", node));
                }
                // scan -> filter -> project
                plan.add(Operation::Scan(ScanOperation { table_name }));
                if let Some(predicate) = where_clause {
                    plan.add(Operation::Filter(FilterOperation { predicate }));
                }
                plan.add(Operation::Project(ProjectOperation { columns }));
            }
        }
        Ok(plan)
    }
}

fn processing(message: &str, node: &str) -> Error {
    Error::Processing {
        message: message.to_string(),
        node: node.to_string(),
    }
}
