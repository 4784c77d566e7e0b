//! Copy implementation.
//!
//! Runs on a blocking worker: scan, pre-flight space check, then a copy loop that
//! checks the cancellation flag between entries. Any failure rolls back what was created.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::helpers::{ScanResult, find_unique_name, scan_sources, validate_disk_space};
use super::state::{CopyOperationState, CopyTransaction, OperationRegistry};
use super::types::{ConflictResolution, CopyConfig, CopyOutcome, WriteOperationError, WriteOperationPhase};

/// Where one source root lands, or `None` when it is skipped.
type RootTargets = Vec<Option<PathBuf>>;

pub(super) fn copy_files_with_progress(
    registry: &OperationRegistry,
    operation_id: &str,
    state: &Arc<CopyOperationState>,
    sources: &[PathBuf],
    destination: &Path,
    config: &CopyConfig,
) -> Result<CopyOutcome, WriteOperationError> {
    log::debug!(
        "copy_files_with_progress: starting operation_id={}, {} sources",
        operation_id,
        sources.len()
    );

    // Phase 1: scan
    let scan = scan_sources(sources, &|| state.is_cancelled())?;
    log::info!(
        "copy_files_with_progress: scan complete for operation_id={}, files={}, bytes={}",
        operation_id,
        scan.file_count,
        scan.total_bytes
    );
    registry.update(
        operation_id,
        WriteOperationPhase::Copying,
        None,
        0,
        scan.file_count,
        0,
        scan.total_bytes,
    );

    if config.check_space {
        validate_disk_space(destination, scan.total_bytes)?;
    }

    // Phase 2: copy, with rollback on failure
    let targets = resolve_root_targets(sources, destination, config.conflict_resolution);
    let mut transaction = CopyTransaction::new();
    let result = copy_entries(registry, operation_id, state, &scan, &targets, config, &mut transaction);

    match result {
        Ok(outcome) => {
            transaction.commit();
            log::info!(
                "copy_files_with_progress: completed op={} files={} skipped={} bytes={}",
                operation_id,
                outcome.files_copied,
                outcome.files_skipped,
                outcome.bytes_copied
            );
            Ok(outcome)
        }
        Err(e) => {
            if e == WriteOperationError::Cancelled {
                log::info!(
                    "copy_files_with_progress: cancelled op={}, rolling back {} files",
                    operation_id,
                    transaction.created_files.len()
                );
            } else {
                log::error!(
                    "copy_files_with_progress: failed op={} error={:?}, rolling back",
                    operation_id,
                    e
                );
            }
            transaction.rollback();
            Err(e)
        }
    }
}

/// Applies the conflict resolution to each top-level source.
///
/// A target counts as taken when it exists on disk or an earlier source in the same
/// request already landed there. Sources sharing a name never overwrite each other:
/// under `Overwrite` the later one is renamed instead.
fn resolve_root_targets(sources: &[PathBuf], destination: &Path, resolution: ConflictResolution) -> RootTargets {
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    sources
        .iter()
        .map(|source| {
            let name = source.file_name()?;
            let target = destination.join(name);
            let claimed_earlier = claimed.contains(&target);
            let resolved = if !claimed_earlier && fs::symlink_metadata(&target).is_err() {
                target
            } else {
                match resolution {
                    ConflictResolution::Skip => {
                        log::debug!("copy: skipping existing {}", target.display());
                        return None;
                    }
                    // Directories merge, files are replaced when written
                    ConflictResolution::Overwrite if !claimed_earlier => target,
                    ConflictResolution::Overwrite | ConflictResolution::Rename => find_unique_name(&target, &claimed),
                }
            };
            claimed.insert(resolved.clone());
            Some(resolved)
        })
        .collect()
}

fn copy_entries(
    registry: &OperationRegistry,
    operation_id: &str,
    state: &Arc<CopyOperationState>,
    scan: &ScanResult,
    targets: &RootTargets,
    config: &CopyConfig,
    transaction: &mut CopyTransaction,
) -> Result<CopyOutcome, WriteOperationError> {
    let mut outcome = CopyOutcome {
        files_copied: 0,
        files_skipped: 0,
        bytes_copied: 0,
    };

    for entry in &scan.entries {
        if state.is_cancelled() {
            return Err(WriteOperationError::Cancelled);
        }

        let Some(Some(root)) = targets.get(entry.source_index) else {
            if !entry.is_dir {
                outcome.files_skipped += 1;
            }
            continue;
        };
        let dest = if entry.relative.as_os_str().is_empty() {
            root.clone()
        } else {
            root.join(&entry.relative)
        };

        if entry.is_dir {
            if !dest.is_dir() {
                if fs::symlink_metadata(&dest).is_ok() {
                    // Only `Overwrite` targets an existing non-directory
                    log::debug!("copy: replacing {} with a directory", dest.display());
                    fs::remove_file(&dest).map_err(|e| WriteOperationError::io(&dest, e))?;
                }
                fs::create_dir(&dest).map_err(|e| WriteOperationError::io(&dest, e))?;
                transaction.record_dir(dest);
            }
            continue;
        }

        if fs::symlink_metadata(&dest).is_ok_and(|m| m.is_dir()) {
            log::warn!("copy: not replacing directory {} with a file", dest.display());
            outcome.files_skipped += 1;
            continue;
        }

        let existed = fs::symlink_metadata(&dest).is_ok();
        if existed && config.conflict_resolution != ConflictResolution::Overwrite {
            // Only reachable inside a merged directory
            outcome.files_skipped += 1;
            continue;
        }

        if entry.is_symlink {
            copy_symlink(&entry.path, &dest, existed)?;
        } else {
            fs::copy(&entry.path, &dest).map_err(|e| WriteOperationError::io(&entry.path, e))?;
        }
        if !existed {
            transaction.record_file(dest.clone());
        }

        outcome.files_copied += 1;
        outcome.bytes_copied += entry.size;
        registry.update(
            operation_id,
            WriteOperationPhase::Copying,
            dest.file_name().map(|n| n.to_string_lossy().into_owned()),
            outcome.files_copied + outcome.files_skipped,
            scan.file_count,
            outcome.bytes_copied,
            scan.total_bytes,
        );
    }

    Ok(outcome)
}

/// Recreates a symlink instead of copying its target.
#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path, replace: bool) -> Result<(), WriteOperationError> {
    let target = fs::read_link(source).map_err(|e| WriteOperationError::io(source, e))?;
    if replace {
        fs::remove_file(dest).map_err(|e| WriteOperationError::io(dest, e))?;
    }
    std::os::unix::fs::symlink(&target, dest).map_err(|e| WriteOperationError::io(dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path, _replace: bool) -> Result<(), WriteOperationError> {
    fs::copy(source, dest)
        .map(|_| ())
        .map_err(|e| WriteOperationError::io(source, e))
}
