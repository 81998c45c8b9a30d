//! Persisted table state
//!
//! `Database` is the in-memory image of every table. It also serves as the
//! schema store: lookups by table name go through it. A `Storage` backend
//! loads it at session start and writes it back after every change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::{
        schema::{ID_COLUMN, Table},
        types::{DataType, Row, Value},
    },
};

pub mod disk;
pub mod engine;
pub mod memory;

/// A table's schema together with its rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub schema: Table,
    pub rows: Vec<Row>,
    /// Highest id ever handed out, kept so ids are not reused after deletes
    pub last_id: i64,
}

impl TableData {
    pub fn new(schema: Table) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            last_id: 0,
        }
    }

    /// Verifies loaded state against its schema, so a damaged data directory
    /// fails at load time instead of during a query
    pub fn check(&self) -> Result<()> {
        let name = &self.schema.name;
        let corrupt =
            |detail: String| Error::Storage(format!("table {} is corrupt: {}", name, detail));

        self.schema.validate().map_err(|err| corrupt(err.to_string()))?;
        match self.schema.columns.first() {
            Some(col) if col.name == ID_COLUMN && col.datatype == DataType::Int => {}
            _ => return Err(corrupt(format!("first column is not {} int", ID_COLUMN))),
        }
        if self.last_id < 0 || self.last_id == i64::MAX {
            return Err(corrupt(format!("id counter {} out of range", self.last_id)));
        }

        for row in &self.rows {
            if row.len() != self.schema.columns.len() {
                return Err(corrupt(format!(
                    "row has {} values, expected {}",
                    row.len(),
                    self.schema.columns.len()
                )));
            }
            for (value, column) in row.iter().zip(&self.schema.columns) {
                if value.datatype() != column.datatype {
                    return Err(corrupt(format!(
                        "value {} in column {} is not {}",
                        value, column.name, column.datatype
                    )));
                }
            }
            if row[0] == Value::Int(i64::MAX) {
                return Err(corrupt("row id out of range".to_string()));
            }
        }
        Ok(())
    }

    /// Reserves the next row id
    pub fn next_id(&mut self) -> i64 {
        let max_existing = self
            .rows
            .iter()
            .filter_map(|row| match row.first() {
                Some(Value::Int(id)) => Some(*id),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        self.last_id = self.last_id.max(max_existing) + 1;
        self.last_id
    }
}

/// All tables of one data directory, keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    tables: BTreeMap<String, TableData>,
}

impl Database {
    /// Returns the schema of `name`
    pub fn get(&self, name: &str) -> Result<&Table> {
        self.table(name).map(|t| &t.schema)
    }

    /// Registers a schema with no rows, replacing any table of the same name
    pub fn put(&mut self, schema: Table) {
        self.insert(TableData::new(schema));
    }

    pub fn remove(&mut self, name: &str) -> Result<TableData> {
        self.tables
            .remove(name)
            .ok_or_else(|| Error::NotFound(format!("table {}", name)))
    }

    /// Table names in sorted order
    pub fn list(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table(&self, name: &str) -> Result<&TableData> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("table {}", name)))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut TableData> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(format!("table {}", name)))
    }

    /// Adds a loaded table, schema and rows together
    pub fn insert(&mut self, data: TableData) {
        self.tables.insert(data.schema.name.clone(), data);
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableData> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Database, TableData};
    use crate::{
        error::{Error, Result},
        sql::{
            schema::{Column, Table},
            types::{DataType, Value},
        },
    };

    fn schema(name: &str) -> Result<Table> {
        Table::new(
            name.to_string(),
            vec![Column {
                name: "v".to_string(),
                datatype: DataType::Int,
            }],
        )
    }

    #[test]
    fn test_catalog_operations() -> Result<()> {
        let mut db = Database::default();
        assert!(db.is_empty());
        assert!(matches!(db.get("b"), Err(Error::NotFound(_))));

        db.put(schema("b")?);
        db.put(schema("a")?);
        assert!(db.exists("a"));
        assert_eq!(db.list(), vec!["a", "b"]);
        assert_eq!(db.get("b")?.name, "b");

        db.remove("a")?;
        assert!(!db.exists("a"));
        assert_eq!(db.len(), 1);
        assert!(matches!(db.remove("a"), Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_next_id_never_reuses() -> Result<()> {
        let mut data = TableData::new(schema("t")?);
        assert_eq!(data.next_id(), 1);
        data.rows.push(vec![Value::Int(1), Value::Int(10)]);
        assert_eq!(data.next_id(), 2);
        data.rows.push(vec![Value::Int(2), Value::Int(20)]);

        data.rows.clear();
        assert_eq!(data.next_id(), 3);

        // rows written by an older version without a counter still win
        data.last_id = 0;
        data.rows.push(vec![Value::Int(7), Value::Int(70)]);
        assert_eq!(data.next_id(), 8);
        Ok(())
    }
}
