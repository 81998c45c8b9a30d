use std::fmt::Display;

use crate::sql::types::DataType;

/// Abstract Syntax Tree (AST) node definitions for commands
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    /// DROP TABLE statement
    DropTable {
        name: String,
    },
    /// LIST TABLES
    ListTables,
    /// INSERT statement, one literal per user column
    Insert {
        table_name: String,
        values: Vec<Literal>,
    },
    /// SELECT statement
    Select {
        table_name: String,
        projection: Projection,
        where_clause: Option<Condition>,
    },
    /// UPDATE statement, assignments in the order they were written
    Update {
        table_name: String,
        assignments: Vec<(String, Literal)>,
        where_clause: Option<Condition>,
    },
    /// DELETE statement
    Delete {
        table_name: String,
        where_clause: Option<Condition>,
    },
    Help,
    Exit,
}

impl Statement {
    /// Commands that change persisted state and trigger a write-back
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Statement::CreateTable { .. }
                | Statement::DropTable { .. }
                | Statement::Insert { .. }
                | Statement::Update { .. }
                | Statement::Delete { .. }
        )
    }

    /// Commands that throw away a table or every row of one
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Statement::DropTable { .. }
                | Statement::Delete {
                    where_clause: None,
                    ..
                }
        )
    }
}

/// Column list of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`, every column in schema order
    All,
    Columns(Vec<String>),
}

/// Column definition for CREATE TABLE statements
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
}

/// Literal as written in the command, coerced once the target column type is known
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    /// Numeric text, e.g. `12`, `-3` or `4.5`
    Number(String),
    Boolean(bool),
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Number(n) => f.write_str(n),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// WHERE condition: `<column> <op> <literal>`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: CompareOp,
    pub literal: Literal,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
}

impl CompareOp {
    pub fn is_ordering(&self) -> bool {
        !matches!(self, CompareOp::Equal | CompareOp::NotEqual)
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::Greater => ">",
            CompareOp::Less => "<",
            CompareOp::GreaterEqual => ">=",
            CompareOp::LessEqual => "<=",
        })
    }
}
