//! tabledb - a small persistent table store
//!
//! Tables with typed columns are created, queried and modified through a
//! restricted SQL-like command language, one command per line:
//! - Command parsing (lexer, parser, AST)
//! - Schema-aware coercion and single-predicate WHERE filtering
//! - Whole-database write-back after every mutating command
//!
//! ```no_run
//! use tabledb::{sql::engine::Session, storage::disk::DiskStorage};
//!
//! let mut session = Session::open(DiskStorage::new("tabledb_data"))?;
//! session.execute("CREATE TABLE users (name str, age int)")?;
//! session.execute(r#"INSERT INTO users VALUES ("John", 25)"#)?;
//! let result = session.execute("SELECT name FROM users WHERE age > 20")?;
//! # Ok::<(), tabledb::error::Error>(())
//! ```

pub mod error;
pub mod sql;
pub mod storage;
