//! Per-entry destination reconciliation
//!
//! For each included source entry the reconciler makes the destination
//! match: directories are created (never linked), files become hardlinks of
//! the source (or content copies in copy mode), symlinks are materialized as
//! destination symlinks pointing back at the source path. Every operation is
//! idempotent; the common repeat-sync case is an inode comparison and a
//! no-op.

use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SyncError;
use crate::logging::*;
use crate::types::{Entry, EntryKind};

/// How file content reaches the destination.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SyncMode {
	/// Destination files share the source inode (default)
	Hardlink,
	/// Destination files are content copies
	Copy,
}

impl Default for SyncMode {
	fn default() -> Self {
		SyncMode::Hardlink
	}
}

/// What the reconciler did for one entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
	/// Destination was already in sync
	Unchanged,
	DirCreated,
	Linked,
	Copied,
	Symlinked,
	/// Source entry is a symlink and symlink support is off
	SkippedSymlink,
}

/// Relative paths materialized as destination symlinks during one sync pass.
///
/// The pruner consults this so entries that appear underneath a symlinked
/// directory are not treated as orphans. One registry is created per `sync`
/// call; nothing leaks across invocations.
#[derive(Debug, Default)]
pub struct SymlinkRegistry {
	paths: Vec<String>,
}

impl SymlinkRegistry {
	pub fn new() -> Self {
		SymlinkRegistry { paths: Vec::new() }
	}

	pub fn record(&mut self, relative: &str) {
		self.paths.push(relative.trim_end_matches('/').to_string());
	}

	/// True when `relative` is a registered symlink or lies beneath one.
	pub fn covers(&self, relative: &str) -> bool {
		let rel = relative.trim_end_matches('/');
		self.paths.iter().any(|p| {
			rel == p || rel.strip_prefix(p.as_str()).map_or(false, |rest| rest.starts_with('/'))
		})
	}

	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}
}

/// Destination path for an entry (relative paths keep their trailing `/`
/// only for matching; it is stripped here).
pub fn target_path(dst_root: &Path, relative: &str) -> PathBuf {
	dst_root.join(relative.trim_end_matches('/'))
}

/// Reconcile one source entry into the destination tree.
pub fn reconcile(
	entry: &Entry,
	dst_root: &Path,
	mode: SyncMode,
	support_symlink: bool,
	registry: &mut SymlinkRegistry,
) -> Result<Action, SyncError> {
	let target = target_path(dst_root, &entry.relative);
	let wrap = |source: io::Error| SyncError::Reconcile { path: target_path(dst_root, &entry.relative), source };

	match entry.kind {
		EntryKind::Dir => {
			let action = ensure_dir(&target).map_err(wrap)?;
			if action != Action::Unchanged {
				debug!("created directory {}", entry.relative);
			}
			Ok(action)
		}
		EntryKind::Symlink => {
			if support_symlink {
				let action = ensure_symlink(&entry.path, &target).map_err(wrap)?;
				registry.record(&entry.relative);
				if action != Action::Unchanged {
					debug!("symlinked {} -> {}", entry.relative, entry.path.display());
				}
				Ok(action)
			} else {
				debug!("skipping symlink {} (symlink support disabled)", entry.relative);
				Ok(Action::SkippedSymlink)
			}
		}
		EntryKind::File => {
			let action = match mode {
				SyncMode::Hardlink => link_file(&entry.path, &target).map_err(wrap)?,
				SyncMode::Copy => copy_file(&entry.path, &target).map_err(wrap)?,
			};
			if action != Action::Unchanged {
				debug!("{} {}", if mode == SyncMode::Hardlink { "linked" } else { "copied" }, entry.relative);
			}
			Ok(action)
		}
	}
}

/// Backdate the destination mtime a few seconds so mtime-comparing build
/// tools never see the mirror as newer than source-derived artifacts.
fn backdate(target: &Path) -> io::Result<()> {
	let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64;
	set_file_mtime(target, FileTime::from_unix_time(now - 10, 0))
}

fn ensure_parent(target: &Path) -> io::Result<()> {
	if let Some(parent) = target.parent() {
		fs::create_dir_all(parent)?;
	}
	Ok(())
}

fn ensure_dir(target: &Path) -> io::Result<Action> {
	match fs::symlink_metadata(target) {
		Ok(meta) if meta.is_dir() => Ok(Action::Unchanged),
		Ok(_) => {
			// A file or symlink occupies the directory's path
			fs::remove_file(target)?;
			fs::create_dir_all(target)?;
			Ok(Action::DirCreated)
		}
		Err(e) if e.kind() == io::ErrorKind::NotFound => {
			fs::create_dir_all(target)?;
			Ok(Action::DirCreated)
		}
		Err(e) => Err(e),
	}
}

#[cfg(unix)]
fn same_identity(a: &fs::Metadata, b: &fs::Metadata) -> bool {
	use std::os::unix::fs::MetadataExt;
	a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_identity(_a: &fs::Metadata, _b: &fs::Metadata) -> bool {
	false
}

fn link_file(src: &Path, target: &Path) -> io::Result<Action> {
	match fs::symlink_metadata(target) {
		Ok(meta) => {
			if meta.is_file() {
				let src_meta = fs::metadata(src)?;
				if same_identity(&src_meta, &meta) {
					// Already the same inode; leave mtime alone
					return Ok(Action::Unchanged);
				}
				fs::remove_file(target)?;
			} else if meta.is_dir() {
				fs::remove_dir_all(target)?;
			} else {
				fs::remove_file(target)?;
			}
		}
		Err(e) if e.kind() == io::ErrorKind::NotFound => {
			// Parent may be missing when a force-synced path skipped its
			// excluded ancestors
			ensure_parent(target)?;
		}
		Err(e) => return Err(e),
	}
	fs::hard_link(src, target)?;
	backdate(target)?;
	Ok(Action::Linked)
}

/// Streaming blake3 of a file's content.
fn content_hash(path: &Path) -> io::Result<blake3::Hash> {
	use std::io::Read;

	let mut file = fs::File::open(path)?;
	let mut hasher = blake3::Hasher::new();
	let mut buf = [0u8; 65536];
	loop {
		let n = file.read(&mut buf)?;
		if n == 0 {
			break;
		}
		hasher.update(&buf[..n]);
	}
	Ok(hasher.finalize())
}

fn copy_file(src: &Path, target: &Path) -> io::Result<Action> {
	match fs::symlink_metadata(target) {
		Ok(meta) => {
			if meta.is_file() && content_hash(src)? == content_hash(target)? {
				return Ok(Action::Unchanged);
			}
			if meta.is_dir() {
				fs::remove_dir_all(target)?;
			} else {
				fs::remove_file(target)?;
			}
		}
		Err(e) if e.kind() == io::ErrorKind::NotFound => {
			ensure_parent(target)?;
		}
		Err(e) => return Err(e),
	}
	fs::copy(src, target)?;
	backdate(target)?;
	Ok(Action::Copied)
}

#[cfg(unix)]
fn ensure_symlink(src: &Path, target: &Path) -> io::Result<Action> {
	match fs::symlink_metadata(target) {
		Ok(meta) => {
			if meta.file_type().is_symlink() && fs::read_link(target)? == src {
				return Ok(Action::Unchanged);
			}
			if meta.is_dir() {
				fs::remove_dir_all(target)?;
			} else {
				fs::remove_file(target)?;
			}
		}
		Err(e) if e.kind() == io::ErrorKind::NotFound => {
			ensure_parent(target)?;
		}
		Err(e) => return Err(e),
	}
	std::os::unix::fs::symlink(src, target)?;
	Ok(Action::Symlinked)
}

#[cfg(not(unix))]
fn ensure_symlink(_src: &Path, _target: &Path) -> io::Result<Action> {
	Err(io::Error::new(io::ErrorKind::Unsupported, "symlink sync requires unix"))
}


// vim: ts=4
