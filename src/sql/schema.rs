use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::types::DataType,
};

/// Name of the implicit auto-incrementing column every table starts with
pub const ID_COLUMN: &str = "id";

/// Table schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Builds a schema from the user's columns, prepending the `id` column
    pub fn new(name: String, user_columns: Vec<Column>) -> Result<Self> {
        let mut columns = Vec::with_capacity(user_columns.len() + 1);
        columns.push(Column {
            name: ID_COLUMN.to_string(),
            datatype: DataType::Int,
        });
        columns.extend(user_columns);
        let table = Table { name, columns };
        table.validate()?;
        Ok(table)
    }

    /// Validates table schema
    pub fn validate(&self) -> Result<()> {
        if self.columns.len() < 2 {
            return Err(Error::Validation(format!(
                "table {} has no columns",
                self.name
            )));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::Validation(match column.name.as_str() {
                    ID_COLUMN => format!("column {} is reserved in table {}", ID_COLUMN, self.name),
                    name => format!("duplicate column {} in table {}", name, self.name),
                }));
            }
        }
        Ok(())
    }

    /// Columns given at creation, without the `id` column
    pub fn user_columns(&self) -> &[Column] {
        &self.columns[1..]
    }

    /// Returns the column index for a given column name
    pub fn get_col_index(&self, col_name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == col_name)
            .ok_or_else(|| {
                Error::NotFound(format!("column {} in table {}", col_name, self.name))
            })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Human readable column list, e.g. `id int, name str`
    pub fn summary(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.datatype))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
}

impl From<crate::sql::parser::ast::Column> for Column {
    fn from(value: crate::sql::parser::ast::Column) -> Self {
        Self {
            name: value.name,
            datatype: value.datatype,
        }
    }
}
