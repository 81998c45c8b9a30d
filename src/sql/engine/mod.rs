use tracing::{debug, info};

use crate::{
    error::Result,
    sql::{
        executor::{Executor, ResultSet},
        parser::{Parser, ast::Statement},
    },
    storage::{Database, engine::Storage},
};

/// A single session over one storage backend
///
/// Owns the in-memory database for its whole lifetime. Commands run one at a
/// time; mutating commands are written back before `execute` returns.
pub struct Session<S: Storage> {
    db: Database,
    storage: S,
}

impl<S: Storage + 'static> Session<S> {
    /// Loads the persisted state and starts a session on it
    pub fn open(mut storage: S) -> Result<Self> {
        let db = storage.load()?;
        info!(tables = db.len(), "session opened");
        Ok(Self { db, storage })
    }

    /// Parses and executes one command line
    pub fn execute(&mut self, text: &str) -> Result<ResultSet> {
        let stmt = Parser::new(text).parse()?;
        self.execute_statement(stmt)
    }

    /// Executes an already parsed command
    pub fn execute_statement(&mut self, stmt: Statement) -> Result<ResultSet> {
        debug!(mutating = stmt.is_mutating(), statement = ?stmt, "executing");
        <dyn Executor<S>>::build(stmt).execute(&mut self.db, &mut self.storage)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
