use tracing::debug;

use crate::{
    error::Result,
    storage::{Database, TableData, engine::Storage},
};

/// Non-persistent storage engine
///
/// Keeps the last saved snapshot as encoded bytes, so a session running on it
/// goes through the same encode/decode path as the on-disk engine.
pub struct MemoryStorage {
    snapshot: Option<Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self { snapshot: None }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn load(&mut self) -> Result<Database> {
        let mut db = Database::default();
        if let Some(bytes) = &self.snapshot {
            let tables: Vec<TableData> = bincode::deserialize(bytes)?;
            for table in tables {
                db.insert(table);
            }
        }
        Ok(db)
    }

    fn save(&mut self, db: &Database) -> Result<()> {
        let tables = db.tables().collect::<Vec<_>>();
        let bytes = bincode::serialize(&tables)?;
        debug!(tables = tables.len(), bytes = bytes.len(), "saved snapshot in memory");
        self.snapshot = Some(bytes);
        Ok(())
    }
}
