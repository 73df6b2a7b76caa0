//! Lazy depth-first source traversal
//!
//! `Walk` is a pre-order iterator: a directory is always yielded before any
//! of its children, so the reconciler can create destination directories
//! ahead of their contents. Exclusion happens during traversal, not after:
//! an excluded directory is never descended into, which bounds the cost of
//! huge or cyclic excluded subtrees.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::types::{classify, relative_of, Entry, EntryKind};

/// Depth-first, filtered enumeration of all entries under `root`.
///
/// `include` receives the root-relative path (trailing `/` for directories)
/// and decides whether the entry is part of the sync pass. Unreadable
/// directories yield `SyncError::Traversal` items; traversal continues with
/// the remaining siblings. Symlinked directories are never descended into.
pub struct Walk<'a> {
	root: PathBuf,
	include: &'a dyn Fn(&str) -> bool,
	/// Directories still being enumerated, innermost last
	stack: Vec<(PathBuf, fs::ReadDir)>,
	/// Root enumeration is deferred to the first `next` call
	start: bool,
	/// Error to deliver on the next call (set when a just-yielded directory
	/// turned out to be unreadable)
	pending: Option<SyncError>,
}

impl<'a> Walk<'a> {
	pub fn new(root: &Path, include: &'a dyn Fn(&str) -> bool) -> Self {
		Walk { root: root.to_path_buf(), include, stack: Vec::new(), start: true, pending: None }
	}

	fn descend(&mut self, dir: PathBuf) {
		match fs::read_dir(&dir) {
			Ok(rd) => self.stack.push((dir, rd)),
			Err(e) => self.pending = Some(SyncError::Traversal { path: dir, source: e }),
		}
	}
}

impl<'a> Iterator for Walk<'a> {
	type Item = Result<Entry, SyncError>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(err) = self.pending.take() {
			return Some(Err(err));
		}
		if self.start {
			self.start = false;
			let root = self.root.clone();
			self.descend(root);
			if let Some(err) = self.pending.take() {
				return Some(Err(err));
			}
		}

		loop {
			let (dir, rd) = match self.stack.last_mut() {
				Some(top) => top,
				None => return None,
			};
			let dirent = match rd.next() {
				None => {
					self.stack.pop();
					continue;
				}
				Some(Ok(d)) => d,
				Some(Err(e)) => {
					let path = dir.clone();
					return Some(Err(SyncError::Traversal { path, source: e }));
				}
			};

			let path = dirent.path();
			let kind = match classify(&path) {
				Ok(k) => k,
				// Entry vanished mid-walk or cannot be stat'ed; report and
				// keep going with the siblings
				Err(e) => return Some(Err(SyncError::Traversal { path, source: e })),
			};
			let relative = relative_of(&self.root, &path, kind);

			if !(self.include)(&relative) {
				// Pruned: excluded directories are not descended into
				continue;
			}

			if kind == EntryKind::Dir {
				self.descend(path.clone());
			}
			return Some(Ok(Entry { path, relative, kind }));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn walk_all(root: &Path, include: &dyn Fn(&str) -> bool) -> Vec<String> {
		Walk::new(root, include).map(|r| r.unwrap().relative).collect()
	}

	fn setup_tree() -> TempDir {
		let tmp = TempDir::new().unwrap();
		fs::write(tmp.path().join("a.txt"), b"a").unwrap();
		fs::create_dir(tmp.path().join("sub")).unwrap();
		fs::write(tmp.path().join("sub/b.txt"), b"b").unwrap();
		fs::write(tmp.path().join("sub/c.log"), b"c").unwrap();
		tmp
	}

	#[test]
	fn test_preorder_parent_before_child() {
		let tmp = setup_tree();
		let rels = walk_all(tmp.path(), &|_| true);

		let dir = rels.iter().position(|r| r == "sub/").unwrap();
		let child = rels.iter().position(|r| r == "sub/b.txt").unwrap();
		assert!(dir < child, "directory must precede its children: {:?}", rels);
		assert!(rels.contains(&"a.txt".to_string()));
		assert_eq!(rels.len(), 4);
	}

	#[test]
	fn test_excluded_directory_is_pruned() {
		let tmp = setup_tree();
		let rels = walk_all(tmp.path(), &|rel| !rel.starts_with("sub/"));

		assert_eq!(rels, vec!["a.txt".to_string()]);
	}

	#[test]
	fn test_filtered_file() {
		let tmp = setup_tree();
		let rels = walk_all(tmp.path(), &|rel| !rel.ends_with(".log"));

		assert!(rels.contains(&"sub/b.txt".to_string()));
		assert!(!rels.contains(&"sub/c.log".to_string()));
	}

	#[test]
	#[cfg(unix)]
	fn test_symlinked_dir_yielded_not_descended() {
		let tmp = setup_tree();
		std::os::unix::fs::symlink(tmp.path().join("sub"), tmp.path().join("link")).unwrap();

		let rels = walk_all(tmp.path(), &|_| true);
		assert!(rels.contains(&"link".to_string()));
		assert!(!rels.iter().any(|r| r.starts_with("link/")));
	}

	#[test]
	fn test_missing_root_reports_error() {
		let tmp = TempDir::new().unwrap();
		let missing = tmp.path().join("nope");
		let include = |_: &str| true;
		let mut walk = Walk::new(&missing, &include);

		match walk.next() {
			Some(Err(SyncError::Traversal { .. })) => {}
			other => panic!("expected traversal error, got {:?}", other.map(|r| r.is_ok())),
		}
		assert!(walk.next().is_none());
	}

	#[test]
	#[cfg(unix)]
	fn test_unreadable_dir_does_not_abort_siblings() {
		use std::os::unix::fs::PermissionsExt;

		let tmp = setup_tree();
		let locked = tmp.path().join("locked");
		fs::create_dir(&locked).unwrap();
		fs::write(locked.join("hidden.txt"), b"x").unwrap();
		fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

		// root ignores permission bits; nothing to test then
		if fs::read_dir(&locked).is_ok() {
			fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
			return;
		}

		let include = |_: &str| true;
		let mut seen = Vec::new();
		let mut errors = 0;
		for item in Walk::new(tmp.path(), &include) {
			match item {
				Ok(entry) => seen.push(entry.relative),
				Err(SyncError::Traversal { .. }) => errors += 1,
				Err(e) => panic!("unexpected error: {}", e),
			}
		}
		fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

		assert_eq!(errors, 1);
		assert!(seen.contains(&"a.txt".to_string()));
		assert!(seen.contains(&"sub/b.txt".to_string()));
		// The locked directory itself is still yielded (pre-order, before
		// its enumeration failed)
		assert!(seen.contains(&"locked/".to_string()));
	}
}

// vim: ts=4
