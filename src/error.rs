//! Error types for sync and git operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Main error type for sync operations
#[derive(Debug)]
pub enum SyncError {
	/// Invalid configuration (non-absolute paths, ...); raised before any
	/// filesystem mutation
	Config { message: String },

	/// A directory could not be enumerated during the walk
	Traversal { path: PathBuf, source: io::Error },

	/// An individual entry could not be linked, copied or symlinked
	Reconcile { path: PathBuf, source: io::Error },

	/// An orphaned destination entry could not be removed
	Prune { path: PathBuf, source: io::Error },

	/// An exclude glob failed to compile
	Pattern { pattern: String, message: String },

	/// I/O error outside the per-entry paths (e.g. creating the target root)
	Io(io::Error),
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::Config { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			SyncError::Traversal { path, source } => {
				write!(f, "Cannot enumerate {}: {}", path.display(), source)
			}
			SyncError::Reconcile { path, source } => {
				write!(f, "Cannot reconcile {}: {}", path.display(), source)
			}
			SyncError::Prune { path, source } => {
				write!(f, "Cannot remove orphan {}: {}", path.display(), source)
			}
			SyncError::Pattern { pattern, message } => {
				write!(f, "Invalid exclude pattern '{}': {}", pattern, message)
			}
			SyncError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::Traversal { source, .. } => Some(source),
			SyncError::Reconcile { source, .. } => Some(source),
			SyncError::Prune { source, .. } => Some(source),
			SyncError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for SyncError {
	fn from(e: io::Error) -> Self {
		SyncError::Io(e)
	}
}

/// Errors from the git collaborator glue
#[derive(Debug)]
pub enum GitError {
	/// The git binary could not be spawned
	Spawn { source: io::Error },

	/// git exited non-zero
	NonZero { status: ExitStatus, stderr: String },

	/// git produced output we could not decode as UTF-8
	Utf8 { what: String },

	/// git produced output we could not parse
	Parse { output: String },
}

impl fmt::Display for GitError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GitError::Spawn { source } => write!(f, "Failed to spawn git: {}", source),
			GitError::NonZero { status, stderr } => {
				write!(f, "git exited with {}: {}", status, stderr.trim())
			}
			GitError::Utf8 { what } => write!(f, "git produced non-UTF-8 {}", what),
			GitError::Parse { output } => write!(f, "Cannot parse git output: {}", output),
		}
	}
}

impl Error for GitError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			GitError::Spawn { source } => Some(source),
			_ => None,
		}
	}
}

// vim: ts=4
