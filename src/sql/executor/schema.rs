use tracing::info;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{Executor, ResultSet, persisted},
        parser::ast,
        schema::Table,
    },
    storage::{Database, engine::Storage},
};

/// CREATE TABLE executor
pub struct CreateTable {
    name: String,
    columns: Vec<ast::Column>,
}

impl CreateTable {
    pub fn new(name: String, columns: Vec<ast::Column>) -> Box<Self> {
        Box::new(Self { name, columns })
    }
}

impl<S: Storage> Executor<S> for CreateTable {
    fn execute(self: Box<Self>, db: &mut Database, storage: &mut S) -> Result<ResultSet> {
        if db.exists(&self.name) {
            return Err(Error::AlreadyExists(format!("table {}", self.name)));
        }
        let schema = Table::new(
            self.name,
            self.columns.into_iter().map(Into::into).collect(),
        )?;
        info!(table = %schema.name, "creating table");
        let result = ResultSet::Ack {
            message: format!("table {} created ({})", schema.name, schema.summary()),
        };
        persisted(storage.create_table(db, schema), result)
    }
}

/// DROP TABLE executor
pub struct DropTable {
    name: String,
}

impl DropTable {
    pub fn new(name: String) -> Box<Self> {
        Box::new(Self { name })
    }
}

impl<S: Storage> Executor<S> for DropTable {
    fn execute(self: Box<Self>, db: &mut Database, storage: &mut S) -> Result<ResultSet> {
        db.get(&self.name)?;
        info!(table = %self.name, "dropping table");
        let result = ResultSet::Ack {
            message: format!("table {} dropped", self.name),
        };
        persisted(storage.drop_table(db, &self.name), result)
    }
}

/// LIST TABLES executor
pub struct ListTables;

impl ListTables {
    pub fn new() -> Box<Self> {
        Box::new(Self)
    }
}

impl<S: Storage> Executor<S> for ListTables {
    fn execute(self: Box<Self>, db: &mut Database, storage: &mut S) -> Result<ResultSet> {
        Ok(ResultSet::TableList {
            tables: storage.list_tables(db),
        })
    }
}
