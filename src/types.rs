//! Entry model produced by the tree walk

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What kind of filesystem object an entry is.
///
/// Classification is lstat-based: a symlink is reported as `Symlink`
/// regardless of what it points at.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
	File,
	Dir,
	Symlink,
}

/// One filesystem entry discovered during traversal.
///
/// Entries are ephemeral: they are produced per walk and never persisted.
/// `relative` uses `/` separators and carries a trailing `/` when the entry
/// is a directory, so exclude rules can tell `build/` apart from a file
/// whose name merely starts with `build`.
#[derive(Clone, PartialEq, Debug)]
pub struct Entry {
	/// Absolute path under the source root
	pub path: PathBuf,
	/// Path relative to the sync root
	pub relative: String,
	pub kind: EntryKind,
}

/// Classify a path without following symlinks.
///
/// Transient stat failures (entry vanished mid-walk, permission) surface as
/// the `io::Error`; callers decide whether to report or skip.
pub fn classify(path: &Path) -> io::Result<EntryKind> {
	let meta = fs::symlink_metadata(path)?;
	let ft = meta.file_type();
	if ft.is_symlink() {
		Ok(EntryKind::Symlink)
	} else if ft.is_dir() {
		Ok(EntryKind::Dir)
	} else {
		Ok(EntryKind::File)
	}
}

/// Compute the root-relative path of `path`, `/`-separated, with a trailing
/// `/` appended for directories.
pub fn relative_of(root: &Path, path: &Path, kind: EntryKind) -> String {
	let rel = path.strip_prefix(root).unwrap_or(path);
	let mut s = rel
		.components()
		.map(|c| c.as_os_str().to_string_lossy())
		.collect::<Vec<_>>()
		.join("/");
	if kind == EntryKind::Dir {
		s.push('/');
	}
	s
}


// vim: ts=4
