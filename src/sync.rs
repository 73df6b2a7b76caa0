//! Sync engine
//!
//! `sync` mirrors one source tree into one destination tree in a single
//! blocking pass: walk the source (with exclusion pruning), reconcile each
//! entry, then remove destination orphans. Calls against disjoint
//! source/destination pairs are independent; two concurrent calls sharing a
//! destination race and must be serialized by the caller.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::SyncError;
use crate::exclude::{is_excluded, ExcludeRule};
use crate::logging::*;
use crate::prune::prune;
use crate::reconcile::{reconcile, Action, SymlinkRegistry, SyncMode};
use crate::walk::Walk;

/// Predicate over root-relative paths.
pub type PathPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Per-entry error handler. Returning `Ok(())` swallows the error and the
/// sync continues; returning it back aborts the whole call. When no handler
/// is configured every per-entry error aborts.
pub type ErrorHandler = Box<dyn FnMut(SyncError) -> Result<(), SyncError>>;

/// Configuration for one sync pass.
pub struct SyncOptions {
	pub mode: SyncMode,
	/// Disjunctive rule set; a path matching ANY rule is excluded
	pub exclude: Vec<ExcludeRule>,
	/// Overrides exclusion for specific paths
	pub force_sync: Option<PathPredicate>,
	/// Gates inclusion independently of the exclude rules
	pub filter: Option<PathPredicate>,
	pub delete_orphaned: bool,
	pub support_symlink: bool,
	pub on_error: Option<ErrorHandler>,
}

impl Default for SyncOptions {
	fn default() -> Self {
		SyncOptions {
			mode: SyncMode::Hardlink,
			exclude: Vec::new(),
			force_sync: None,
			filter: None,
			delete_orphaned: true,
			support_symlink: false,
			on_error: None,
		}
	}
}

impl SyncOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn mode(mut self, mode: SyncMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn exclude(mut self, rule: ExcludeRule) -> Self {
		self.exclude.push(rule);
		self
	}

	pub fn excludes(mut self, rules: impl IntoIterator<Item = ExcludeRule>) -> Self {
		self.exclude.extend(rules);
		self
	}

	pub fn force_sync(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
		self.force_sync = Some(Box::new(f));
		self
	}

	pub fn filter(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
		self.filter = Some(Box::new(f));
		self
	}

	pub fn delete_orphaned(mut self, yes: bool) -> Self {
		self.delete_orphaned = yes;
		self
	}

	pub fn support_symlink(mut self, yes: bool) -> Self {
		self.support_symlink = yes;
		self
	}

	pub fn on_error(mut self, h: impl FnMut(SyncError) -> Result<(), SyncError> + 'static) -> Self {
		self.on_error = Some(Box::new(h));
		self
	}
}

/// What one sync pass did.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SyncReport {
	/// Entries the walk yielded (after exclusion)
	pub entries: u64,
	pub dirs_created: u64,
	pub files_linked: u64,
	pub files_copied: u64,
	pub symlinks: u64,
	pub orphans_removed: u64,
}

impl SyncReport {
	fn count(&mut self, action: Action) {
		match action {
			Action::Unchanged | Action::SkippedSymlink => {}
			Action::DirCreated => self.dirs_created += 1,
			Action::Linked => self.files_linked += 1,
			Action::Copied => self.files_copied += 1,
			Action::Symlinked => self.symlinks += 1,
		}
	}

	/// Link/copy/symlink operations performed (repeat syncs of an unchanged
	/// tree report zero).
	pub fn changes(&self) -> u64 {
		self.dirs_created + self.files_linked + self.files_copied + self.symlinks
	}
}

/// Mirror `source` into `target`.
///
/// Both paths must be absolute; anything else fails before the filesystem is
/// touched. The target root is created if missing. There is no rollback: an
/// aborted pass may leave the destination partially reconciled.
pub fn sync(source: &Path, target: &Path, options: SyncOptions) -> Result<SyncReport, SyncError> {
	if !source.is_absolute() || !target.is_absolute() {
		return Err(SyncError::Config {
			message: format!(
				"source and target must be absolute paths (got {} and {})",
				source.display(),
				target.display()
			),
		});
	}

	let SyncOptions { mode, exclude, force_sync, filter, delete_orphaned, support_symlink, mut on_error } =
		options;

	info!("syncing {} -> {}", source.display(), target.display());
	fs::create_dir_all(target)?;

	// force_sync beats exclusion; filter gates independently of both
	let include = move |rel: &str| -> bool {
		if let Some(f) = &force_sync {
			if f(rel) {
				return true;
			}
		}
		if let Some(f) = &filter {
			if !f(rel) {
				return false;
			}
		}
		!is_excluded(rel, &exclude)
	};

	let mut handle = move |err: SyncError| match on_error.as_mut() {
		Some(h) => h(err),
		None => Err(err),
	};

	let mut registry = SymlinkRegistry::new();
	let mut live: BTreeSet<String> = BTreeSet::new();
	let mut report = SyncReport::default();

	for item in Walk::new(source, &include) {
		match item {
			Ok(entry) => {
				live.insert(entry.relative.clone());
				report.entries += 1;
				match reconcile(&entry, target, mode, support_symlink, &mut registry) {
					Ok(action) => report.count(action),
					Err(e) => handle(e)?,
				}
			}
			Err(e) => handle(e)?,
		}
	}

	if delete_orphaned {
		report.orphans_removed = prune(target, &live, &registry, &mut handle)?;
	}

	info!(
		"sync done: {} entries, {} changes, {} orphans removed",
		report.entries,
		report.changes(),
		report.orphans_removed
	);
	Ok(report)
}


// vim: ts=4
