use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::Builder;
use tracing::debug;

use crate::{
    error::Result,
    sql::{schema::Table, types::Row},
    storage::{Database, TableData, engine::Storage},
};

/// Catalog file in the data directory
const CATALOG_FILE: &str = "catalog.db";
/// Subdirectory holding one row file per table
const DATA_DIR: &str = "data";
const DATA_EXT: &str = "tbl";
/// Prefix of in-flight temp files; leftovers of an interrupted write are swept on save
const TEMP_PREFIX: &str = ".tabledb-tmp";

/// Catalog record for one table; its rows live in a separate file
#[derive(Debug, Serialize, Deserialize)]
struct CatalogEntry {
    schema: Table,
    last_id: i64,
}

/// Storage engine backed by a directory on disk
///
/// Layout:
///
/// ```text
/// <dir>/catalog.db        schemas and id counters of every table
/// <dir>/data/<table>.tbl  rows of one table
/// ```
///
/// Every file is replaced through a temp file and a rename, so a crash leaves
/// either the old or the new version of each file.
pub struct DiskStorage {
    dir: PathBuf,
}

impl DiskStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.join(DATA_DIR)
    }

    fn data_path(&self, table_name: &str) -> PathBuf {
        self.data_dir().join(format!("{}.{}", table_name, DATA_EXT))
    }

    fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let mut file = Builder::new().prefix(TEMP_PREFIX).tempfile_in(parent)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        file.persist(path)?;
        Ok(())
    }

    /// Deletes row files whose table is no longer in the catalog, and temp
    /// files left behind by an interrupted write
    fn remove_stale(&self, db: &Database) -> Result<()> {
        Self::remove_temp_files(&self.dir)?;
        let data_dir = self.data_dir();
        if !data_dir.exists() {
            return Ok(());
        }
        Self::remove_temp_files(&data_dir)?;
        for entry in fs::read_dir(&data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DATA_EXT) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !db.exists(name) {
                debug!(table = name, "removing rows of dropped table");
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    fn remove_temp_files(dir: &Path) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_temp = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(TEMP_PREFIX));
            if is_temp && path.is_file() {
                debug!(path = %path.display(), "removing leftover temp file");
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

impl Storage for DiskStorage {
    fn load(&mut self) -> Result<Database> {
        let mut db = Database::default();
        let catalog_path = self.catalog_path();
        if !catalog_path.exists() {
            debug!(dir = %self.dir.display(), "no catalog found, starting empty");
            return Ok(db);
        }

        let entries: Vec<CatalogEntry> = bincode::deserialize(&fs::read(&catalog_path)?)?;
        for entry in entries {
            let data_path = self.data_path(&entry.schema.name);
            // A table created right before a crash may have no row file yet
            let rows: Vec<Row> = if data_path.exists() {
                bincode::deserialize(&fs::read(&data_path)?)?
            } else {
                Vec::new()
            };
            let table = TableData {
                schema: entry.schema,
                rows,
                last_id: entry.last_id,
            };
            table.check()?;
            db.insert(table);
        }
        debug!(dir = %self.dir.display(), tables = db.len(), "loaded catalog");
        Ok(db)
    }

    fn save(&mut self, db: &Database) -> Result<()> {
        // Rows first: a catalog never names a table whose rows were not written
        for table in db.tables() {
            Self::write_file(
                &self.data_path(&table.schema.name),
                &bincode::serialize(&table.rows)?,
            )?;
        }

        let entries = db
            .tables()
            .map(|t| CatalogEntry {
                schema: t.schema.clone(),
                last_id: t.last_id,
            })
            .collect::<Vec<_>>();
        Self::write_file(&self.catalog_path(), &bincode::serialize(&entries)?)?;

        self.remove_stale(db)?;
        debug!(dir = %self.dir.display(), tables = db.len(), "saved catalog");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{DiskStorage, TEMP_PREFIX};
    use crate::{
        error::{Error, Result},
        sql::schema::{Column, Table},
        sql::types::{DataType, Row, Value},
        storage::engine::Storage,
    };

    fn column(name: &str, datatype: DataType) -> Column {
        Column {
            name: name.to_string(),
            datatype,
        }
    }

    fn schema(name: &str) -> Result<Table> {
        Table::new(
            name.to_string(),
            vec![column("v", DataType::Int)],
        )
    }

    #[test]
    fn test_layout() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut storage = DiskStorage::new(dir.path());
        let mut db = storage.load()?;

        storage.create_table(&mut db, schema("alpha")?)?;
        storage.create_table(&mut db, schema("beta")?)?;
        assert!(dir.path().join("catalog.db").exists());
        assert!(dir.path().join("data/alpha.tbl").exists());
        assert!(dir.path().join("data/beta.tbl").exists());

        storage.drop_table(&mut db, "alpha")?;
        assert!(!dir.path().join("data/alpha.tbl").exists());
        assert!(dir.path().join("data/beta.tbl").exists());
        Ok(())
    }

    #[test]
    fn test_missing_row_file_loads_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut storage = DiskStorage::new(dir.path());
        let mut db = storage.load()?;
        storage.create_table(&mut db, schema("alpha")?)?;
        fs::remove_file(dir.path().join("data/alpha.tbl"))?;

        let loaded = DiskStorage::new(dir.path()).load()?;
        assert_eq!(loaded.list(), vec!["alpha"]);
        assert!(loaded.table("alpha")?.rows.is_empty());
        Ok(())
    }

    #[test]
    fn test_rows_not_matching_schema() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut storage = DiskStorage::new(dir.path());
        let mut db = storage.load()?;
        let wide = Table::new(
            "t".to_string(),
            vec![
                column("a", DataType::Int),
                column("b", DataType::Str),
                column("c", DataType::Bool),
            ],
        )?;
        storage.create_table(&mut db, wide)?;

        // Too few values
        let short: Vec<Row> = vec![vec![Value::Int(1), Value::Int(5)]];
        fs::write(dir.path().join("data/t.tbl"), bincode::serialize(&short)?)?;
        let result = DiskStorage::new(dir.path()).load();
        assert!(matches!(result, Err(Error::Storage(_))));

        // Right width, wrong type in column b
        let mistyped: Vec<Row> = vec![vec![
            Value::Int(1),
            Value::Int(5),
            Value::Int(2),
            Value::Bool(true),
        ]];
        fs::write(dir.path().join("data/t.tbl"), bincode::serialize(&mistyped)?)?;
        let result = DiskStorage::new(dir.path()).load();
        assert!(matches!(result, Err(Error::Storage(_))));

        // A well-formed row still loads
        let good: Vec<Row> = vec![vec![
            Value::Int(1),
            Value::Int(5),
            Value::Str("x".to_string()),
            Value::Bool(true),
        ]];
        fs::write(dir.path().join("data/t.tbl"), bincode::serialize(&good)?)?;
        let loaded = DiskStorage::new(dir.path()).load()?;
        assert_eq!(loaded.table("t")?.rows, good);
        Ok(())
    }

    #[test]
    fn test_exhausted_id_counter() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut storage = DiskStorage::new(dir.path());
        let mut db = storage.load()?;
        storage.create_table(&mut db, schema("alpha")?)?;
        db.table_mut("alpha")?.last_id = i64::MAX;
        storage.save(&db)?;

        let result = DiskStorage::new(dir.path()).load();
        assert!(matches!(result, Err(Error::Storage(_))));
        Ok(())
    }

    #[test]
    fn test_leftover_temp_files_removed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut storage = DiskStorage::new(dir.path());
        let mut db = storage.load()?;
        storage.create_table(&mut db, schema("alpha")?)?;

        let data_leftover = dir.path().join(format!("data/{}abc123", TEMP_PREFIX));
        let root_leftover = dir.path().join(format!("{}def456", TEMP_PREFIX));
        fs::write(&data_leftover, b"partial")?;
        fs::write(&root_leftover, b"partial")?;

        storage.create_table(&mut db, schema("beta")?)?;
        assert!(!data_leftover.exists());
        assert!(!root_leftover.exists());
        assert!(dir.path().join("data/alpha.tbl").exists());
        assert!(dir.path().join("catalog.db").exists());
        Ok(())
    }

    #[test]
    fn test_corrupt_catalog() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("catalog.db"), b"\xff\xff\xff\xff\xff\xff\xff\xff\xff")?;
        let result = DiskStorage::new(dir.path()).load();
        assert!(matches!(result, Err(Error::Storage(_))));
        Ok(())
    }
}
