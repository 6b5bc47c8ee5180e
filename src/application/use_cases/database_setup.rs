// ============================================================
// DATABASE SETUP USE CASE
// ============================================================
// Mirror the entity files into the relational store, query the join there

use std::path::PathBuf;

use tracing::{info, warn};

use crate::domain::enrollment::{columns, EnrollmentTable, Entity};
use crate::domain::error::Result;
use crate::infrastructure::csv::{CsvParser, DelimitedParser, TableLoader};
use crate::infrastructure::db::{enrollment_query, TableStore};
use crate::infrastructure::storage::resolve_entity_path;

pub struct DatabaseSetup<'a, S, P = CsvParser> {
    store: &'a S,
    loader: TableLoader<P>,
    data_dir: PathBuf,
}

impl<'a, S: TableStore> DatabaseSetup<'a, S, CsvParser> {
    pub fn new(store: &'a S, loader: TableLoader<CsvParser>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            loader,
            data_dir: data_dir.into(),
        }
    }
}

impl<'a, S: TableStore, P: DelimitedParser> DatabaseSetup<'a, S, P> {
    /// Load every entity file that exists, replacing its table.
    /// Missing files are skipped; returns the entities loaded.
    pub async fn load_all(&self) -> Result<Vec<Entity>> {
        let mut loaded = Vec::new();
        for entity in Entity::ALL {
            let Some(path) = resolve_entity_path(&self.data_dir, entity) else {
                warn!(
                    entity = entity.name(),
                    data_dir = %self.data_dir.display(),
                    "Entity file not found, skipping"
                );
                continue;
            };
            let table = self.loader.load(&path)?;
            self.store.load_table(&table, entity.name()).await?;
            loaded.push(entity);
        }
        info!(tables = loaded.len(), "Database setup finished");
        Ok(loaded)
    }

    /// The enrollment join computed by the store itself
    pub async fn enrollment(&self) -> Result<EnrollmentTable> {
        let section = self
            .store
            .query(&format!("SELECT * FROM {} LIMIT 0", Entity::Section.name()))
            .await?;
        let sql = enrollment_query(section.has_column(columns::DEPARTMENT_ID));
        Ok(EnrollmentTable::new(self.store.query(&sql).await?))
    }
}
