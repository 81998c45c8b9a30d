//! Command processing
//!
//! This module provides:
//! - `parser`: command lexer and parser
//! - `types`: column types, values, coercion and comparison
//! - `schema`: table and column schema definitions
//! - `executor`: per-command executors and their results
//! - `engine`: the session that ties parsing, execution and persistence together

pub mod engine;
pub mod executor;
pub mod parser;
pub mod schema;
pub mod types;
