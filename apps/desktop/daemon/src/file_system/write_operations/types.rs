//! Type definitions for copy operations.
//!
//! Contains enums, status structs, error types, and configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::file_system::space::format_size;

// ============================================================================
// Operation types
// ============================================================================

/// Phase of the operation (for status reporting).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteOperationPhase {
    /// Scanning source files to calculate total size
    Scanning,
    /// Copying files
    Copying,
}

// ============================================================================
// Conflict resolution
// ============================================================================

/// How to handle conflicts when destination files already exist.
///
/// The bus caller can't answer prompts, so there is no "ask" mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    /// Skip conflicting files, continue with others
    Skip,
    /// Overwrite all conflicts
    Overwrite,
    /// Rename conflicting files (append " (1)", " (2)", etc.)
    #[default]
    Rename,
}

impl ConflictResolution {
    /// Parses the config/env spelling (`skip`, `overwrite`, `rename`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(Self::Skip),
            "overwrite" => Some(Self::Overwrite),
            "rename" => Some(Self::Rename),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration shared by every copy started through `LocalFileOperations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyConfig {
    #[serde(default)]
    pub conflict_resolution: ConflictResolution,
    /// Whether to run the free-space check before copying.
    #[serde(default = "default_check_space")]
    pub check_space: bool,
}

fn default_check_space() -> bool {
    true
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            conflict_resolution: ConflictResolution::default(),
            check_space: default_check_space(),
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// Detailed status of one copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub operation_id: String,
    pub phase: WriteOperationPhase,
    pub is_running: bool,
    /// Current file being processed (filename only, not full path)
    pub current_file: Option<String>,
    pub files_done: usize,
    pub files_total: usize,
    pub bytes_done: u64,
    pub bytes_total: u64,
    /// Unix timestamp in milliseconds
    pub started_at: u64,
}

/// Short summary of a running copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    pub operation_id: String,
    pub phase: WriteOperationPhase,
    pub percent_complete: u8,
    pub started_at: u64,
}

/// Final outcome of a copy, returned by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub files_copied: usize,
    pub files_skipped: usize,
    pub bytes_copied: u64,
}

// ============================================================================
// Errors
// ============================================================================

/// Error type for copy operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WriteOperationError {
    /// Source path not found
    SourceNotFound { path: String },
    /// Destination missing or not a directory
    InvalidDestination { path: String, message: String },
    /// Location can't be handled by the local engine
    NotSupported { uri: String },
    /// Permission denied
    PermissionDenied { path: String, message: String },
    /// Not enough space on destination
    InsufficientSpace { required: u64, available: u64 },
    /// Cannot copy an item onto its own parent
    SameLocation { path: String },
    /// Destination is inside source (would cause infinite recursion)
    DestinationInsideSource { source: String, destination: String },
    /// Operation was cancelled
    Cancelled,
    /// Generic I/O error
    IoError { path: String, message: String },
}

impl WriteOperationError {
    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::SourceNotFound { path } => {
                format!("Cannot find \"{}\". It may have been moved or deleted.", path)
            }
            Self::InvalidDestination { path, message } => {
                format!("Cannot copy to \"{}\": {}.", path, message)
            }
            Self::NotSupported { uri } => format!("\"{}\" is not on a local filesystem.", uri),
            Self::PermissionDenied { path, .. } => {
                let name = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.clone());
                format!("Cannot write to \"{}\": permission denied.", name)
            }
            Self::InsufficientSpace { required, available } => format!(
                "Not enough space on the destination. Need {}, but only {} available.",
                format_size(*required),
                format_size(*available)
            ),
            Self::SameLocation { path } => format!("\"{}\" is already in this location.", path),
            Self::DestinationInsideSource { source, .. } => {
                format!("Cannot copy \"{}\" into itself.", source)
            }
            Self::Cancelled => "The copy was cancelled.".to_string(),
            Self::IoError { path, message } => format!("Error while copying \"{}\": {}", path, message),
        }
    }

    pub fn io(path: &Path, err: std::io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::SourceNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path,
                message: err.to_string(),
            },
            _ => Self::IoError {
                path,
                message: err.to_string(),
            },
        }
    }
}

impl std::fmt::Display for WriteOperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for WriteOperationError {}
