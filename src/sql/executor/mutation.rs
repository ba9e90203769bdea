use crate::{
    error::Result,
    sql::{executor::ResultSet, plan::InsertOperation},
    storage::engine::Engine,
};

use super::Executor;

/// INSERT executor
impl<E: Engine> Executor<E> for InsertOperation {
    fn execute(self: Box<Self>, engine: &mut E) -> Result<ResultSet> {
        let InsertOperation { table_name, values } = *self;
        // report the name the table was created with
        let canonical = engine.get_table(&table_name)?.name().to_string();
        engine.insert_values(&table_name, values)?;
        Ok(ResultSet::message(format!(
            "1 row inserted into table '{}'.",
            canonical
        )))
    }
}
