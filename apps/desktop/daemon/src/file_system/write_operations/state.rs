//! Operation state management.
//!
//! Tracks in-progress copies (cancellation flags and status) for query APIs, plus the
//! rollback transaction used when a copy fails or is cancelled.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::types::{OperationStatus, OperationSummary, WriteOperationPhase};

// ============================================================================
// Operation state
// ============================================================================

/// State for an in-progress copy.
#[derive(Default)]
pub struct CopyOperationState {
    /// Cancellation flag, polled between files
    pub cancelled: AtomicBool,
}

impl CopyOperationState {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Internal status tracking for operations.
#[derive(Debug, Clone)]
struct OperationStatusInternal {
    phase: WriteOperationPhase,
    current_file: Option<String>,
    files_done: usize,
    files_total: usize,
    bytes_done: u64,
    bytes_total: u64,
    started_at: u64,
}

struct RegistryEntry {
    state: Arc<CopyOperationState>,
    status: OperationStatusInternal,
}

/// Registry of running copies, owned by the file-operations engine.
#[derive(Default)]
pub struct OperationRegistry {
    entries: RwLock<HashMap<String, RegistryEntry>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new operation and returns its cancellation state.
    pub fn register(&self, operation_id: &str) -> Arc<CopyOperationState> {
        let state = Arc::new(CopyOperationState::default());
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            operation_id.to_string(),
            RegistryEntry {
                state: Arc::clone(&state),
                status: OperationStatusInternal {
                    phase: WriteOperationPhase::Scanning,
                    current_file: None,
                    files_done: 0,
                    files_total: 0,
                    bytes_done: 0,
                    bytes_total: 0,
                    started_at: now,
                },
            },
        );
        state
    }

    /// Removes a finished operation.
    pub fn unregister(&self, operation_id: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(operation_id);
    }

    #[allow(clippy::too_many_arguments, reason = "Mirrors the status fields one to one")]
    pub fn update(
        &self,
        operation_id: &str,
        phase: WriteOperationPhase,
        current_file: Option<String>,
        files_done: usize,
        files_total: usize,
        bytes_done: u64,
        bytes_total: u64,
    ) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(operation_id) {
            let status = &mut entry.status;
            status.phase = phase;
            status.current_file = current_file;
            status.files_done = files_done;
            status.files_total = files_total;
            status.bytes_done = bytes_done;
            status.bytes_total = bytes_total;
        }
    }

    /// Lists all running copies.
    pub fn list_active(&self) -> Vec<OperationSummary> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .map(|(id, entry)| {
                let status = &entry.status;
                let percent_complete = if status.bytes_total > 0 {
                    ((status.bytes_done as f64 / status.bytes_total as f64) * 100.0).min(100.0) as u8
                } else if status.files_total > 0 {
                    ((status.files_done as f64 / status.files_total as f64) * 100.0).min(100.0) as u8
                } else {
                    0
                };

                OperationSummary {
                    operation_id: id.clone(),
                    phase: status.phase,
                    percent_complete,
                    started_at: status.started_at,
                }
            })
            .collect()
    }

    /// Returns `None` if the operation never existed or already completed.
    pub fn status(&self, operation_id: &str) -> Option<OperationStatus> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(operation_id)?;
        let status = &entry.status;
        Some(OperationStatus {
            operation_id: operation_id.to_string(),
            phase: status.phase,
            is_running: !entry.state.is_cancelled(),
            current_file: status.current_file.clone(),
            files_done: status.files_done,
            files_total: status.files_total,
            bytes_done: status.bytes_done,
            bytes_total: status.bytes_total,
            started_at: status.started_at,
        })
    }

    /// Flags an operation as cancelled. Returns false when the id is unknown.
    pub fn cancel(&self, operation_id: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match entries.get(operation_id) {
            Some(entry) => {
                entry.state.cancelled.store(true, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Rollback
// ============================================================================

/// Records everything a copy creates so a failure can undo it.
#[derive(Debug, Default)]
pub struct CopyTransaction {
    /// Files created during the operation (in creation order)
    pub created_files: Vec<PathBuf>,
    /// Directories created during the operation (in creation order)
    pub created_dirs: Vec<PathBuf>,
}

impl CopyTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_file(&mut self, path: PathBuf) {
        self.created_files.push(path);
    }

    pub fn record_dir(&mut self, path: PathBuf) {
        self.created_dirs.push(path);
    }

    /// Deletes files (newest first), then directories (deepest first).
    pub fn rollback(&self) {
        for file in self.created_files.iter().rev() {
            let _ = std::fs::remove_file(file);
        }
        for dir in self.created_dirs.iter().rev() {
            let _ = std::fs::remove_dir(dir);
        }
    }

    /// Keeps everything that was created.
    pub fn commit(self) {}
}
