// ============================================================
// ENROLLMENT PIPELINE USE CASE
// ============================================================
// Load the four entity files, join them, summarize

use std::path::{Path, PathBuf};

use tracing::info;

use super::enrollment_join::join;
use super::enrollment_summary::summarize;
use crate::domain::enrollment::{EnrollmentTable, Entity, Summary};
use crate::domain::error::{AppError, Result};
use crate::domain::tabular::Table;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::csv::{write_table, CsvParser, DelimitedParser, TableLoader};
use crate::infrastructure::storage::{ensure_output_dir, resolve_entity_path};

pub const PROCESSED_FILE: &str = "processed_enrollment.csv";

/// The four source tables as loaded, never mutated afterwards
#[derive(Debug, Clone, Default)]
pub struct EnrollmentSources {
    pub course: Table,
    pub section: Table,
    pub instructor: Table,
    pub department: Table,
}

impl EnrollmentSources {
    fn slot(&mut self, entity: Entity) -> &mut Table {
        match entity {
            Entity::Course => &mut self.course,
            Entity::Section => &mut self.section,
            Entity::Instructor => &mut self.instructor,
            Entity::Department => &mut self.department,
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct ProcessedEnrollment {
    pub enrollment: EnrollmentTable,
    pub summary: Summary,
}

pub struct EnrollmentPipeline<P = CsvParser> {
    data_dir: PathBuf,
    loader: TableLoader<P>,
}

impl EnrollmentPipeline<CsvParser> {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            loader: TableLoader::new(config.ingest.clone()),
        }
    }
}

impl<P: DelimitedParser> EnrollmentPipeline<P> {
    pub fn with_loader(data_dir: impl Into<PathBuf>, loader: TableLoader<P>) -> Self {
        Self {
            data_dir: data_dir.into(),
            loader,
        }
    }

    /// Load one entity file; a missing file is `NotFound`
    pub fn load_entity(&self, entity: Entity) -> Result<Table> {
        let path = resolve_entity_path(&self.data_dir, entity).ok_or_else(|| {
            AppError::NotFound(format!(
                "No {} file under {}",
                entity,
                self.data_dir.display()
            ))
        })?;
        self.loader.load(&path)
    }

    /// Load all four entities, one after the other. The first failure aborts.
    pub fn load_sources(&self) -> Result<EnrollmentSources> {
        let mut sources = EnrollmentSources::default();
        for entity in Entity::ALL {
            *sources.slot(entity) = self.load_entity(entity)?;
        }
        Ok(sources)
    }

    pub fn run(&self) -> Result<ProcessedEnrollment> {
        let sources = self.load_sources()?;
        let enrollment = join(
            &sources.course,
            &sources.section,
            &sources.instructor,
            &sources.department,
        );
        let summary = summarize(&enrollment);

        info!(
            sections = enrollment.len(),
            total_enrollments = summary.total_enrollments,
            "Enrollment pipeline finished"
        );
        Ok(ProcessedEnrollment {
            enrollment,
            summary,
        })
    }
}

impl ProcessedEnrollment {
    /// Export the joined table as `processed_enrollment.csv` under `dir`
    pub fn write_processed(&self, dir: &Path) -> Result<PathBuf> {
        let dir = ensure_output_dir(dir).map_err(|e| {
            AppError::IoError(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        let path = dir.join(PROCESSED_FILE);
        write_table(&path, self.enrollment.table())?;
        info!(path = %path.display(), rows = self.enrollment.len(), "Processed data saved");
        Ok(path)
    }
}
