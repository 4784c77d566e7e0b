//! Validation, scanning and conflict helpers for copy operations.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::types::WriteOperationError;
use crate::file_system::space::get_space_info_for_path;

// ============================================================================
// Validation helpers
// ============================================================================

pub(crate) fn validate_sources(sources: &[PathBuf]) -> Result<(), WriteOperationError> {
    for source in sources {
        // symlink_metadata so dangling symlinks still count as existing
        if fs::symlink_metadata(source).is_err() {
            return Err(WriteOperationError::SourceNotFound {
                path: source.display().to_string(),
            });
        }
    }
    Ok(())
}

pub(crate) fn validate_destination(destination: &Path) -> Result<(), WriteOperationError> {
    if !destination.exists() {
        return Err(WriteOperationError::InvalidDestination {
            path: destination.display().to_string(),
            message: "it does not exist".to_string(),
        });
    }
    if !destination.is_dir() {
        return Err(WriteOperationError::InvalidDestination {
            path: destination.display().to_string(),
            message: "it is not a folder".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_not_same_location(sources: &[PathBuf], destination: &Path) -> Result<(), WriteOperationError> {
    for source in sources {
        if let Some(parent) = source.parent()
            && parent == destination
        {
            return Err(WriteOperationError::SameLocation {
                path: source.display().to_string(),
            });
        }
    }
    Ok(())
}

pub(crate) fn validate_destination_not_inside_source(
    sources: &[PathBuf],
    destination: &Path,
) -> Result<(), WriteOperationError> {
    // Canonicalize so ".." and symlinks can't sneak the destination inside a source
    let destination = destination.canonicalize().unwrap_or_else(|_| destination.to_path_buf());
    for source in sources {
        let canonical = source.canonicalize().unwrap_or_else(|_| source.clone());
        if canonical.is_dir() && destination.starts_with(&canonical) {
            return Err(WriteOperationError::DestinationInsideSource {
                source: source.display().to_string(),
                destination: destination.display().to_string(),
            });
        }
    }
    Ok(())
}

pub(crate) fn validate_disk_space(destination: &Path, required_bytes: u64) -> Result<(), WriteOperationError> {
    let space = get_space_info_for_path(destination).map_err(|e| WriteOperationError::io(destination, e))?;
    if space.available_bytes < required_bytes {
        return Err(WriteOperationError::InsufficientSpace {
            required: required_bytes,
            available: space.available_bytes,
        });
    }
    Ok(())
}

// ============================================================================
// Scanning
// ============================================================================

/// One entry to create at the destination.
#[derive(Debug, Clone)]
pub(crate) struct ScannedEntry {
    /// Absolute source path
    pub path: PathBuf,
    /// Index into the scanned sources
    pub source_index: usize,
    /// Path relative to its source root (empty for the root itself)
    pub relative: PathBuf,
    pub size: u64,
    pub is_dir: bool,
    pub is_symlink: bool,
}

#[derive(Debug, Default)]
pub(crate) struct ScanResult {
    pub entries: Vec<ScannedEntry>,
    pub file_count: usize,
    pub total_bytes: u64,
}

/// Walks every source (symlinks are not followed) and lists what the copy will create,
/// parents before children.
pub(crate) fn scan_sources(
    sources: &[PathBuf],
    is_cancelled: &dyn Fn() -> bool,
) -> Result<ScanResult, WriteOperationError> {
    let mut result = ScanResult::default();

    for (source_index, source) in sources.iter().enumerate() {
        if source.file_name().is_none() {
            return Err(WriteOperationError::IoError {
                path: source.display().to_string(),
                message: "source has no file name".to_string(),
            });
        }

        for entry in WalkDir::new(source).follow_links(false).follow_root_links(false) {
            if is_cancelled() {
                return Err(WriteOperationError::Cancelled);
            }
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source.clone());
                match e.into_io_error() {
                    Some(io) => WriteOperationError::io(&path, io),
                    None => WriteOperationError::IoError {
                        path: path.display().to_string(),
                        message: "filesystem loop detected".to_string(),
                    },
                }
            })?;

            let file_type = entry.file_type();
            // Sockets, FIFOs and devices can't be copied meaningfully
            if !(file_type.is_dir() || file_type.is_file() || file_type.is_symlink()) {
                log::debug!("scan_sources: skipping special file {}", entry.path().display());
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(source)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let size = if file_type.is_file() {
                entry.metadata().map(|m| m.len()).unwrap_or(0)
            } else {
                0
            };

            if !file_type.is_dir() {
                result.file_count += 1;
                result.total_bytes += size;
            }
            result.entries.push(ScannedEntry {
                path: entry.path().to_path_buf(),
                source_index,
                relative,
                size,
                is_dir: file_type.is_dir(),
                is_symlink: file_type.is_symlink(),
            });
        }
    }

    Ok(result)
}

// ============================================================================
// Conflict helpers
// ============================================================================

/// Finds a free name next to `path` by appending " (1)", " (2)", ... before the extension.
///
/// A name is free when nothing exists there on disk and it isn't in `claimed`.
pub(crate) fn find_unique_name(path: &Path, claimed: &HashSet<PathBuf>) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut counter = 1;
    loop {
        let name = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, counter, ext),
            None => format!("{} ({})", stem, counter),
        };
        let candidate = parent.join(name);
        if !claimed.contains(&candidate) && fs::symlink_metadata(&candidate).is_err() {
            return candidate;
        }
        counter += 1;
    }
}
