use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{
            Executor, MutationKind, ResultSet, persisted,
            query::{Filter, matching_rows},
        },
        parser::ast::{Condition, Literal},
        schema::ID_COLUMN,
        types::{Row, Value},
    },
    storage::{Database, engine::Storage},
};

/// INSERT executor
pub struct Insert {
    table_name: String,
    values: Vec<Literal>,
}

impl Insert {
    pub fn new(table_name: String, values: Vec<Literal>) -> Box<Self> {
        Box::new(Self { table_name, values })
    }
}

impl<S: Storage> Executor<S> for Insert {
    fn execute(self: Box<Self>, db: &mut Database, storage: &mut S) -> Result<ResultSet> {
        let table = db.table_mut(&self.table_name)?;
        let user_columns = table.schema.user_columns();
        if self.values.len() != user_columns.len() {
            return Err(Error::Validation(format!(
                "expected {} values, got {}",
                user_columns.len(),
                self.values.len()
            )));
        }

        // Coerce every literal before the id is reserved
        let values = user_columns
            .iter()
            .zip(&self.values)
            .map(|(col, literal)| Value::coerce(literal, col.datatype))
            .collect::<Result<Vec<_>>>()?;

        let mut row: Row = Vec::with_capacity(values.len() + 1);
        row.push(Value::Int(table.next_id()));
        row.extend(values);
        debug!(table = %self.table_name, row = ?row, "inserting row");
        table.rows.push(row.clone());

        let result = ResultSet::Rows {
            columns: table.schema.column_names(),
            rows: vec![row],
        };
        persisted(storage.save(db), result)
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    assignments: Vec<(String, Literal)>,
    filter: Option<Condition>,
}

impl Update {
    pub fn new(
        table_name: String,
        assignments: Vec<(String, Literal)>,
        filter: Option<Condition>,
    ) -> Box<Self> {
        Box::new(Self {
            table_name,
            assignments,
            filter,
        })
    }
}

impl<S: Storage> Executor<S> for Update {
    fn execute(self: Box<Self>, db: &mut Database, storage: &mut S) -> Result<ResultSet> {
        let table = db.table_mut(&self.table_name)?;
        let schema = &table.schema;

        // Resolve assignments to (column position, typed value)
        let mut changes = Vec::with_capacity(self.assignments.len());
        for (col_name, literal) in &self.assignments {
            let index = schema.get_col_index(col_name)?;
            if col_name == ID_COLUMN {
                return Err(Error::Validation(format!(
                    "column {} cannot be updated",
                    ID_COLUMN
                )));
            }
            changes.push((index, Value::coerce(literal, schema.columns[index].datatype)?));
        }
        let filter = Filter::build(schema, self.filter)?;
        let matches = matching_rows(&filter, &table.rows)?;

        let mut count = 0;
        for (row, matched) in table.rows.iter_mut().zip(matches) {
            if !matched {
                continue;
            }
            for (index, value) in &changes {
                row[*index] = value.clone();
            }
            count += 1;
        }
        debug!(table = %self.table_name, count, "updated rows");

        persisted(
            storage.save(db),
            ResultSet::Mutation {
                kind: MutationKind::Update,
                count,
            },
        )
    }
}

/// DELETE executor
pub struct Delete {
    table_name: String,
    filter: Option<Condition>,
}

impl Delete {
    pub fn new(table_name: String, filter: Option<Condition>) -> Box<Self> {
        Box::new(Self { table_name, filter })
    }
}

impl<S: Storage> Executor<S> for Delete {
    fn execute(self: Box<Self>, db: &mut Database, storage: &mut S) -> Result<ResultSet> {
        let table = db.table_mut(&self.table_name)?;
        let filter = Filter::build(&table.schema, self.filter)?;
        let matches = matching_rows(&filter, &table.rows)?;

        let before = table.rows.len();
        table.rows = std::mem::take(&mut table.rows)
            .into_iter()
            .zip(matches)
            .filter_map(|(row, matched)| (!matched).then_some(row))
            .collect();
        let count = before - table.rows.len();
        debug!(table = %self.table_name, count, "deleted rows");

        persisted(
            storage.save(db),
            ResultSet::Mutation {
                kind: MutationKind::Delete,
                count,
            },
        )
    }
}
