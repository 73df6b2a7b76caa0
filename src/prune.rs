//! Orphan removal
//!
//! After the live set for a pass is complete, destination entries with no
//! corresponding live source entry are deleted. Symlinks are treated as
//! leaves (never descended into) and anything at or under a registered
//! symlink is left alone. The destination root itself is never removed.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::SyncError;
use crate::logging::*;
use crate::reconcile::SymlinkRegistry;
use crate::types::{relative_of, EntryKind};

/// Per-entry error handler; `Ok(())` swallows, `Err` aborts the pass.
pub type ErrorSink<'a> = dyn FnMut(SyncError) -> Result<(), SyncError> + 'a;

/// Remove destination orphans. Returns the number of entries removed
/// (a pruned directory counts once, regardless of its contents).
pub fn prune(
	dst_root: &Path,
	live: &BTreeSet<String>,
	registry: &SymlinkRegistry,
	handler: &mut ErrorSink<'_>,
) -> Result<u64, SyncError> {
	let mut removed = 0;
	prune_dir(dst_root, dst_root, live, registry, handler, &mut removed)?;
	Ok(removed)
}

fn prune_dir(
	root: &Path,
	dir: &Path,
	live: &BTreeSet<String>,
	registry: &SymlinkRegistry,
	handler: &mut ErrorSink<'_>,
	removed: &mut u64,
) -> Result<(), SyncError> {
	let entries = match fs::read_dir(dir) {
		Ok(rd) => rd,
		Err(e) => {
			handler(SyncError::Prune { path: dir.to_path_buf(), source: e })?;
			return Ok(());
		}
	};

	for dirent in entries {
		let dirent = match dirent {
			Ok(d) => d,
			Err(e) => {
				handler(SyncError::Prune { path: dir.to_path_buf(), source: e })?;
				continue;
			}
		};
		let path = dirent.path();
		let meta = match fs::symlink_metadata(&path) {
			Ok(m) => m,
			Err(e) => {
				handler(SyncError::Prune { path, source: e })?;
				continue;
			}
		};

		let ft = meta.file_type();
		let kind = if ft.is_symlink() {
			EntryKind::Symlink
		} else if ft.is_dir() {
			EntryKind::Dir
		} else {
			EntryKind::File
		};
		let relative = relative_of(root, &path, kind);

		// Subtrees reached through a symlink we materialized were already
		// handled; never prune inside them
		if registry.covers(&relative) {
			continue;
		}

		if live.contains(&relative) {
			if kind == EntryKind::Dir {
				prune_dir(root, &path, live, registry, handler, removed)?;
			}
			continue;
		}

		debug!("pruning orphan {}", relative);
		let result = if kind == EntryKind::Dir {
			// Recursive removal deletes children before the directory itself
			fs::remove_dir_all(&path)
		} else {
			fs::remove_file(&path)
		};
		match result {
			Ok(()) => *removed += 1,
			Err(e) => handler(SyncError::Prune { path, source: e })?,
		}
	}
	Ok(())
}


// vim: ts=4
