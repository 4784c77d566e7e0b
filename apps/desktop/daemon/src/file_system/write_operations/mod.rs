//! Copy operations started on behalf of other processes.
//!
//! The bus service hands over locations and returns immediately; everything here runs
//! in background tasks and is observable only through the status APIs and the log.
//!
//! Safety features:
//! - Sources and destination validated before starting
//! - Destination-inside-source check on canonical paths
//! - Pre-flight disk space validation after scan
//! - Symlinks recreated, not dereferenced
//! - Special files (sockets, FIFOs, devices) skipped
//! - Rollback of created files on failure or cancellation (`CopyTransaction`)

mod copy;
mod helpers;
mod state;
mod types;


use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use uuid::Uuid;

use crate::file_system::location::Location;
use copy::copy_files_with_progress;
use helpers::{validate_destination, validate_destination_not_inside_source, validate_not_same_location, validate_sources};
pub use state::OperationRegistry;
pub use types::{
    ConflictResolution, CopyConfig, CopyOutcome, OperationStatus, OperationSummary, WriteOperationError,
    WriteOperationPhase,
};

/// The copy collaborator used by the bus service.
///
/// Fire-and-forget: the caller never observes the result.
pub trait FileOperations: Send + Sync {
    fn copy(&self, sources: Vec<Location>, destination: Location);
}

/// Copies between local paths on the tokio blocking pool.
pub struct LocalFileOperations {
    runtime: Handle,
    registry: Arc<OperationRegistry>,
    config: CopyConfig,
}

impl LocalFileOperations {
    pub fn new(runtime: Handle, config: CopyConfig) -> Self {
        Self {
            runtime,
            registry: Arc::new(OperationRegistry::new()),
            config,
        }
    }

    /// Validates and starts a copy, returning its operation id.
    pub fn start_copy(&self, sources: Vec<Location>, destination: Location) -> Result<String, WriteOperationError> {
        let Some(destination) = destination.local_path().map(PathBuf::from) else {
            return Err(WriteOperationError::NotSupported { uri: destination.uri() });
        };

        let mut paths = Vec::with_capacity(sources.len());
        for source in &sources {
            match source.local_path() {
                Some(path) => paths.push(path.to_path_buf()),
                None => log::warn!("copy: skipping non-local source {}", source),
            }
        }
        if paths.is_empty() {
            return Err(WriteOperationError::NotSupported {
                uri: sources.first().map(Location::uri).unwrap_or_default(),
            });
        }

        validate_sources(&paths)?;
        validate_destination(&destination)?;
        // Copying into the source's own folder makes numbered duplicates when renaming
        if self.config.conflict_resolution != ConflictResolution::Rename {
            validate_not_same_location(&paths, &destination)?;
        }
        validate_destination_not_inside_source(&paths, &destination)?;

        let operation_id = Uuid::new_v4().to_string();
        log::info!(
            "start_copy: operation_id={}, sources={:?}, destination={:?}",
            operation_id,
            paths,
            destination
        );
        let state = self.registry.register(&operation_id);

        let registry = Arc::clone(&self.registry);
        let config = self.config.clone();
        let operation_id_for_spawn = operation_id.clone();
        self.runtime.spawn(async move {
            let registry_for_cleanup = Arc::clone(&registry);
            let operation_id_for_cleanup = operation_id_for_spawn.clone();

            let result = tokio::task::spawn_blocking(move || {
                copy_files_with_progress(
                    &registry,
                    &operation_id_for_spawn,
                    &state,
                    &paths,
                    &destination,
                    &config,
                )
            })
            .await;

            registry_for_cleanup.unregister(&operation_id_for_cleanup);

            match result {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => log::warn!("copy {} failed: {}", operation_id_for_cleanup, e),
                Err(e) => log::error!("copy {} task failed: {}", operation_id_for_cleanup, e),
            }
        });

        Ok(operation_id)
    }

    pub fn list_active_operations(&self) -> Vec<OperationSummary> {
        self.registry.list_active()
    }

    pub fn get_operation_status(&self, operation_id: &str) -> Option<OperationStatus> {
        self.registry.status(operation_id)
    }

    pub fn cancel_operation(&self, operation_id: &str) -> bool {
        self.registry.cancel(operation_id)
    }
}

impl FileOperations for LocalFileOperations {
    fn copy(&self, sources: Vec<Location>, destination: Location) {
        if let Err(e) = self.start_copy(sources, destination) {
            log::warn!("copy: not started: {}", e);
        }
    }
}
