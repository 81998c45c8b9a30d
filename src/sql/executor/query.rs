use crate::{
    error::{Error, Result},
    sql::{
        executor::{Executor, ResultSet},
        parser::ast::{CompareOp, Condition, Projection},
        schema::Table,
        types::{Row, Value},
    },
    storage::{Database, engine::Storage},
};

/// A WHERE condition resolved against a schema
///
/// The literal is coerced once, up front, to the column's type.
pub struct Filter {
    index: usize,
    op: CompareOp,
    value: Value,
}

impl Filter {
    /// Resolves `condition` for `table`; `None` matches every row
    pub fn build(table: &Table, condition: Option<Condition>) -> Result<Option<Filter>> {
        let Some(condition) = condition else {
            return Ok(None);
        };
        let index = table.get_col_index(&condition.column)?;
        let datatype = table.columns[index].datatype;
        condition.op.check(datatype)?;
        Ok(Some(Filter {
            index,
            op: condition.op,
            value: Value::coerce(&condition.literal, datatype)?,
        }))
    }

    /// A row without the column never matches
    pub fn matches(&self, row: &Row) -> Result<bool> {
        match row.get(self.index) {
            Some(value) => value.compare(&self.value, self.op),
            None => Ok(false),
        }
    }
}

/// Evaluates `filter` against every row, in row order
pub fn matching_rows(filter: &Option<Filter>, rows: &[Row]) -> Result<Vec<bool>> {
    rows.iter()
        .map(|row| match filter {
            Some(f) => f.matches(row),
            None => Ok(true),
        })
        .collect()
}

/// Table scan executor (SELECT)
pub struct Scan {
    table_name: String,
    projection: Projection,
    filter: Option<Condition>,
}

impl Scan {
    pub fn new(table_name: String, projection: Projection, filter: Option<Condition>) -> Box<Self> {
        Box::new(Self {
            table_name,
            projection,
            filter,
        })
    }
}

impl<S: Storage> Executor<S> for Scan {
    fn execute(self: Box<Self>, db: &mut Database, _storage: &mut S) -> Result<ResultSet> {
        let table = db.table(&self.table_name)?;
        let schema = &table.schema;

        // Column positions to keep, in output order
        let indices = match self.projection {
            Projection::All => (0..schema.columns.len()).collect::<Vec<_>>(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| {
                    schema.get_col_index(name).map_err(|_| {
                        Error::Validation(format!(
                            "column {} does not exist in table {}",
                            name, schema.name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };
        let filter = Filter::build(schema, self.filter)?;
        let matches = matching_rows(&filter, &table.rows)?;

        let rows: Vec<Row> = table
            .rows
            .iter()
            .zip(matches)
            .filter(|(_, matched)| *matched)
            .map(|(row, _)| indices.iter().map(|&i| row[i].clone()).collect::<Row>())
            .collect();
        Ok(ResultSet::Rows {
            columns: indices
                .iter()
                .map(|&i| schema.columns[i].name.clone())
                .collect(),
            rows,
        })
    }
}
