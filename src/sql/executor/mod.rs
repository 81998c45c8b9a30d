use std::fmt::Display;

use tracing::warn;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{
            mutation::{Delete, Insert, Update},
            query::Scan,
            schema::{CreateTable, DropTable, ListTables},
        },
        parser::ast::Statement,
        types::Row,
    },
    storage::{Database, engine::Storage},
};

mod mutation;
mod query;
mod schema;

/// Text returned by HELP
pub const HELP_TEXT: &str = "\
Available commands:

  CREATE TABLE name (col1 type1, col2 type2, ...)
      Creates a table; an `id int` column is added automatically
      Example: CREATE TABLE users (name str, age int)

  DROP TABLE name
      Deletes a table and all its rows

  LIST TABLES
      Shows all tables

  INSERT INTO name VALUES (val1, val2, ...)
      Inserts a row, one value per column
      Example: INSERT INTO users VALUES (\"John\", 25)

  SELECT * FROM name [WHERE condition]
  SELECT col1, col2 FROM name [WHERE condition]
      Example: SELECT name, age FROM users WHERE age > 20

  UPDATE name SET col1=val1, col2=val2 [WHERE condition]
      Example: UPDATE users SET age=26 WHERE name=\"John\"

  DELETE FROM name [WHERE condition]
      Without WHERE every row is deleted
      Example: DELETE FROM users WHERE age < 18

  HELP, EXIT

Conditions: column =, !=, >, <, >=, <= value (ordering only for int and float)
Supported data types: int, str, float, bool";

/// Command executor
///
/// Executors validate everything before touching `db`, so a failing command
/// leaves the tables as they were.
pub trait Executor<S: Storage> {
    fn execute(self: Box<Self>, db: &mut Database, storage: &mut S) -> Result<ResultSet>;
}

impl<S: Storage + 'static> dyn Executor<S> {
    /// Builds the executor for a parsed statement
    pub fn build(stmt: Statement) -> Box<dyn Executor<S>> {
        match stmt {
            Statement::CreateTable { name, columns } => CreateTable::new(name, columns),
            Statement::DropTable { name } => DropTable::new(name),
            Statement::ListTables => ListTables::new(),
            Statement::Insert { table_name, values } => Insert::new(table_name, values),
            Statement::Select {
                table_name,
                projection,
                where_clause,
            } => Scan::new(table_name, projection, where_clause),
            Statement::Update {
                table_name,
                assignments,
                where_clause,
            } => Update::new(table_name, assignments, where_clause),
            Statement::Delete {
                table_name,
                where_clause,
            } => Delete::new(table_name, where_clause),
            Statement::Help => Signal::new(ResultSet::Ack {
                message: HELP_TEXT.to_string(),
            }),
            Statement::Exit => Signal::new(ResultSet::Exit),
        }
    }
}

/// HELP and EXIT: no data effect, the result is fixed
struct Signal {
    result: ResultSet,
}

impl Signal {
    fn new(result: ResultSet) -> Box<Self> {
        Box::new(Self { result })
    }
}

impl<S: Storage> Executor<S> for Signal {
    fn execute(self: Box<Self>, _db: &mut Database, _storage: &mut S) -> Result<ResultSet> {
        Ok(self.result)
    }
}

/// Turns the outcome of a write-back into the command's result.
///
/// The in-memory change has already happened at this point, so a failed
/// write is reported as `Unpersisted` rather than a plain storage error.
fn persisted(saved: Result<()>, result: ResultSet) -> Result<ResultSet> {
    match saved {
        Ok(()) => Ok(result),
        Err(err) => {
            warn!(error = %err, "write-back failed, change is only in memory");
            Err(Error::unpersisted(result, err))
        }
    }
}

/// Execution result set
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    /// LIST TABLES
    TableList { tables: Vec<String> },
    /// SELECT, and the row just written by INSERT
    Rows { columns: Vec<String>, rows: Vec<Row> },
    /// UPDATE and DELETE
    Mutation { kind: MutationKind, count: usize },
    /// CREATE TABLE, DROP TABLE and HELP
    Ack { message: String },
    /// EXIT
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Update,
    Delete,
}

impl Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MutationKind::Update => "updated",
            MutationKind::Delete => "deleted",
        })
    }
}
