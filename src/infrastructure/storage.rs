use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::enrollment::Entity;

/// Locate an entity's source file: the bare name first (`course`), then the
/// first file, by name order, whose stem matches (`course.csv`)
pub fn resolve_entity_path(data_dir: &Path, entity: Entity) -> Option<PathBuf> {
    let exact = data_dir.join(entity.name());
    if exact.is_file() {
        return Some(exact);
    }

    let mut matches: Vec<PathBuf> = fs::read_dir(data_dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| path.file_stem().and_then(|s| s.to_str()) == Some(entity.name()))
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Regular files directly under `data_dir`, sorted by name
pub fn list_data_files(data_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

pub fn ensure_output_dir(dir: &Path) -> std::io::Result<PathBuf> {
    ensure_dir(dir)?;
    Ok(dir.to_path_buf())
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
