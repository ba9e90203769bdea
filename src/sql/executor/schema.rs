use crate::{
    error::Result,
    sql::{executor::ResultSet, plan::CreateTableOperation},
    storage::engine::Engine,
};

use super::Executor;

/// CREATE TABLE executor
impl<E: Engine> Executor<E> for CreateTableOperation {
    fn execute(self: Box<Self>, engine: &mut E) -> Result<ResultSet> {
        let CreateTableOperation { table_name, schema } = *self;
        engine.create_table(&table_name, schema)?;
        Ok(ResultSet::message(format!(
            "Table '{}' created successfully.",
            table_name
        )))
    }
}
