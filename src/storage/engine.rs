use crate::{error::Result, sql::schema::Table, storage::Database};

/// Persistence backend for a `Database`
///
/// Implementations only move whole snapshots in and out; the schema-level
/// operations are built on top of `save`.
pub trait Storage {
    /// Reads the persisted state, or an empty database if nothing was saved yet
    fn load(&mut self) -> Result<Database>;

    /// Writes every table and its rows, overwriting the previous state
    fn save(&mut self, db: &Database) -> Result<()>;

    /// Registers a new table with no rows and persists
    fn create_table(&mut self, db: &mut Database, schema: Table) -> Result<()> {
        db.put(schema);
        self.save(db)
    }

    /// Removes a table's schema and rows and persists
    fn drop_table(&mut self, db: &mut Database, name: &str) -> Result<()> {
        db.remove(name)?;
        self.save(db)
    }

    fn list_tables(&self, db: &Database) -> Vec<String> {
        db.list()
    }
}

#[cfg(test)]
mod tests {
    use super::Storage;
    use crate::{
        error::Result,
        sql::{
            schema::{Column, Table},
            types::{DataType, Value},
        },
        storage::{Database, disk::DiskStorage, memory::MemoryStorage},
    };

    fn populate(storage: &mut impl Storage) -> Result<Database> {
        let mut db = storage.load()?;
        assert!(db.is_empty());

        let schema = Table::new(
            "items".to_string(),
            vec![
                Column { name: "label".to_string(), datatype: DataType::Str },
                Column { name: "price".to_string(), datatype: DataType::Float },
                Column { name: "stock".to_string(), datatype: DataType::Bool },
            ],
        )?;
        storage.create_table(&mut db, schema)?;
        let other = Table::new(
            "other".to_string(),
            vec![Column { name: "n".to_string(), datatype: DataType::Int }],
        )?;
        storage.create_table(&mut db, other)?;

        let items = db.table_mut("items")?;
        for (label, price) in [("pen", 1.5), ("ink", 7.25)] {
            let id = items.next_id();
            items.rows.push(vec![
                Value::Int(id),
                Value::Str(label.to_string()),
                Value::Float(price),
                Value::Bool(true),
            ]);
        }
        storage.save(&db)?;
        Ok(db)
    }

    fn test_round_trip(mut storage: impl Storage) -> Result<()> {
        let mut db = populate(&mut storage)?;
        assert_eq!(storage.load()?, db);
        assert_eq!(storage.list_tables(&db), vec!["items", "other"]);

        storage.drop_table(&mut db, "other")?;
        let loaded = storage.load()?;
        assert_eq!(loaded, db);
        assert_eq!(loaded.list(), vec!["items"]);
        assert_eq!(loaded.table("items")?.rows.len(), 2);
        assert_eq!(loaded.table("items")?.last_id, 2);
        assert!(storage.drop_table(&mut db, "other").is_err());
        Ok(())
    }

    #[test]
    fn test_memory() -> Result<()> {
        test_round_trip(MemoryStorage::new())
    }

    #[test]
    fn test_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        test_round_trip(DiskStorage::new(dir.path()))
    }
}
