use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        executor::ResultSet,
        plan::{FilterOperation, Operation, Plan, ProjectOperation, ScanOperation},
        table::Table,
        types::Row,
    },
    storage::engine::Engine,
};

use super::Executor;

impl ScanOperation {
    /// Returns every row of the table in insertion order
    pub fn scan<'a, E: Engine>(&self, engine: &'a E) -> Result<Vec<&'a Row>> {
        Ok(engine.scan_table(&self.table_name)?.collect())
    }
}

impl FilterOperation {
    /// Keeps the rows whose predicate column satisfies the predicate
    ///
    /// The column is resolved even when there are no rows, and the output
    /// preserves the input order.
    pub fn filter<'a>(&self, table: &Table, rows: Vec<&'a Row>) -> Result<Vec<&'a Row>> {
        let index = table.column_index(&self.predicate.column)?;
        Ok(rows
            .into_iter()
            .filter(|row| self.predicate.evaluate(&row[index]))
            .collect())
    }
}

impl ProjectOperation {
    /// Builds rows holding only the requested columns, in the requested order
    pub fn project(&self, table: &Table, rows: Vec<&Row>) -> Result<Vec<Row>> {
        if self.is_wildcard() {
            return Ok(rows.into_iter().cloned().collect());
        }
        let indexes = self
            .columns
            .iter()
            .map(|c| table.column_index(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .map(|row| indexes.iter().map(|&i| row[i].clone()).collect())
            .collect())
    }

    /// Column names of the projected result
    pub fn output_columns(&self, table: &Table) -> Vec<String> {
        if self.is_wildcard() {
            table.column_names()
        } else {
            self.columns.clone()
        }
    }
}

/// SELECT executor - scan, optional filter, then project
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    scan: ScanOperation,
    filter: Option<FilterOperation>,
    project: ProjectOperation,
}

impl Select {
    pub fn new(
        scan: ScanOperation,
        filter: Option<FilterOperation>,
        project: ProjectOperation,
    ) -> Self {
        Self {
            scan,
            filter,
            project,
        }
    }

    /// Picks the pipeline stages out of a plan
    pub fn from_plan(plan: Plan) -> Result<Self> {
        let mut scan = None;
        let mut filter = None;
        let mut project = None;
        for operation in plan.into_operations() {
            match operation {
                Operation::Scan(op) => scan = Some(op),
                Operation::Filter(op) => filter = Some(op),
                Operation::Project(op) => project = Some(op),
                other => {
                    return Err(Error::Execution {
                        message: format!("{} cannot be part of a SELECT query", other.name()),
                        operation: Some(other.name().to_string()),
                    });
                }
            }
        }

        let scan = scan.ok_or_else(|| missing("ScanOperation"))?;
        let project = project.ok_or_else(|| missing("ProjectOperation"))?;
        Ok(Self::new(scan, filter, project))
    }
}

fn missing(operation: &str) -> Error {
    Error::Execution {
        message: format!("No {} found in SELECT query", operation),
        operation: Some(operation.to_string()),
    }
}

impl<E: Engine> Executor<E> for Select {
    fn execute(self: Box<Self>, engine: &mut E) -> Result<ResultSet> {
        let engine = &*engine;
        let table = engine.get_table(&self.scan.table_name)?;

        let mut rows = self.scan.scan(engine)?;
        if let Some(filter) = &self.filter {
            rows = filter.filter(table, rows)?;
        }
        let rows = self.project.project(table, rows)?;
        debug!(table = table.name(), rows = rows.len(), "selected rows");

        Ok(ResultSet::Scan {
            columns: self.project.output_columns(table),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Select;
    use crate::{
        error::{Error, Result},
        sql::{
            executor::{Executor, ResultSet},
            parser::ast::{Operator, WhereClause},
            plan::{FilterOperation, ProjectOperation, ScanOperation},
            schema::{Column, Schema},
            types::{DataType, Row, Value},
        },
        storage::{engine::Engine, memory::MemoryEngine},
    };

    fn setup() -> Result<MemoryEngine> {
        let mut engine = MemoryEngine::new();
        engine.create_table(
            "people",
            Schema::new(vec![
                Column::new("id", DataType::Int)?,
                Column::varchar("name", 20)?,
                Column::new("age", DataType::Int)?,
            ])?,
        )?;
        for (id, name, age) in [(1, "Alice", Some(25)), (2, "Bob", Some(30)), (3, "Cy", None)] {
            engine.insert_values(
                "people",
                vec![
                    Value::Integer(id),
                    Value::Text(name.into()),
                    age.map_or(Value::Null, Value::Integer),
                ],
            )?;
        }
        Ok(engine)
    }

    fn predicate(column: &str, operator: Operator, value: Value) -> FilterOperation {
        FilterOperation {
            predicate: WhereClause::new(column, operator, value),
        }
    }

    #[test]
    fn test_projection_identity() -> Result<()> {
        let engine = setup()?;
        let table = engine.get_table("people")?;
        let rows = table.scan().collect::<Vec<_>>();
        let star = ProjectOperation {
            columns: vec!["*".into()],
        };

        let projected = star.project(table, rows.clone())?;
        assert_eq!(projected, table.rows().to_vec());
        assert!(projected.iter().all(|r| r.len() == 3));
        assert_eq!(star.output_columns(table), vec!["id", "name", "age"]);
        Ok(())
    }

    #[test]
    fn test_projection_order_and_missing_column() -> Result<()> {
        let engine = setup()?;
        let table = engine.get_table("people")?;
        let rows = table.scan().collect::<Vec<_>>();

        let project = ProjectOperation {
            columns: vec!["AGE".into(), "id".into()],
        };
        let projected = project.project(table, rows)?;
        assert_eq!(projected[1], vec![Value::Integer(30), Value::Integer(2)]);
        assert_eq!(project.output_columns(table), vec!["AGE", "id"]);

        let err = ProjectOperation {
            columns: vec!["id".into(), "salary".into()],
        }
        .project(table, vec![])
        .unwrap_err();
        assert_eq!(
            err,
            Error::ColumnNotFound {
                table: "people".into(),
                column: "salary".into()
            }
        );
        Ok(())
    }

    #[test]
    fn test_filter_stability() -> Result<()> {
        let engine = setup()?;
        let table = engine.get_table("people")?;
        let rows = table.scan().collect::<Vec<_>>();

        let filters = [
            predicate("age", Operator::Greater, Value::Integer(20)),
            predicate("age", Operator::NotEqual, Value::Integer(30)),
            predicate("age", Operator::Equal, Value::Null),
            predicate("name", Operator::Less, Value::Text("C".into())),
            predicate("name", Operator::Equal, Value::Integer(1)),
        ];
        for filter in filters {
            let once = filter.filter(table, rows.clone())?;
            // order-preserving subsequence
            let mut remaining = rows.iter();
            for row in &once {
                assert!(remaining.any(|r| std::ptr::eq(*r, *row)));
            }
            let twice = filter.filter(table, once.clone())?;
            assert_eq!(once, twice);
        }

        let kept = predicate("age", Operator::NotEqual, Value::Integer(30)).filter(table, rows)?;
        let ids = kept.iter().map(|r| r[0].clone()).collect::<Vec<_>>();
        assert_eq!(ids, vec![Value::Integer(1), Value::Integer(3)]);
        Ok(())
    }

    #[test]
    fn test_filter_missing_column_on_empty_input() -> Result<()> {
        let engine = setup()?;
        let table = engine.get_table("people")?;
        let err = predicate("ghost", Operator::Equal, Value::Integer(1))
            .filter(table, vec![])
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { ref column, .. } if column == "ghost"));
        Ok(())
    }

    #[test]
    fn test_select_pipeline() -> Result<()> {
        let mut engine = setup()?;
        let select = Select::new(
            ScanOperation {
                table_name: "PEOPLE".into(),
            },
            Some(predicate("age", Operator::GreaterEqual, Value::Float(25.0))),
            ProjectOperation {
                columns: vec!["name".into()],
            },
        );
        let result = Box::new(select).execute(&mut engine)?;
        let expected: Vec<Row> = vec![
            vec![Value::Text("Alice".into())],
            vec![Value::Text("Bob".into())],
        ];
        assert_eq!(
            result,
            ResultSet::Scan {
                columns: vec!["name".into()],
                rows: expected,
            }
        );
        Ok(())
    }
}
