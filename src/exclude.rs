//! Exclusion rules
//!
//! A path is excluded when ANY rule matches its root-relative path. Rules
//! come in three shapes: literal substring, compiled glob, or an arbitrary
//! predicate. Directory paths are tested with their trailing `/` so a rule
//! can match directories without also matching file-name prefixes.

use globset::{Glob, GlobMatcher};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::SyncError;

/// One exclusion rule, matched against root-relative paths.
pub enum ExcludeRule {
	/// Substring containment test
	Literal(String),
	/// Full glob match; `*` spans path separators, so `*.log` also matches
	/// `sub/c.log`
	Pattern(GlobMatcher),
	/// Caller-supplied predicate
	Predicate(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl ExcludeRule {
	pub fn literal(s: impl Into<String>) -> Self {
		ExcludeRule::Literal(s.into())
	}

	/// Compile a glob into a pattern rule.
	pub fn pattern(glob: &str) -> Result<Self, SyncError> {
		let matcher = Glob::new(glob)
			.map_err(|e| SyncError::Pattern { pattern: glob.to_string(), message: e.to_string() })?
			.compile_matcher();
		Ok(ExcludeRule::Pattern(matcher))
	}

	pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
		ExcludeRule::Predicate(Box::new(f))
	}

	/// Test this rule against a relative path.
	pub fn matches(&self, relative: &str) -> bool {
		match self {
			ExcludeRule::Literal(s) => relative.contains(s.as_str()),
			ExcludeRule::Pattern(m) => m.is_match(Path::new(relative)),
			ExcludeRule::Predicate(f) => f(relative),
		}
	}
}

impl fmt::Debug for ExcludeRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExcludeRule::Literal(s) => write!(f, "Literal({:?})", s),
			ExcludeRule::Pattern(m) => write!(f, "Pattern({:?})", m.glob().glob()),
			ExcludeRule::Predicate(_) => write!(f, "Predicate(..)"),
		}
	}
}

/// True when any rule matches. No rules means nothing is excluded.
pub fn is_excluded(relative: &str, rules: &[ExcludeRule]) -> bool {
	rules.iter().any(|rule| rule.matches(relative))
}

/// Load literal exclude rules from a `.rsync-exclude.txt`-style file.
///
/// Each non-empty line becomes one literal rule; the surrounding pipeline
/// conventionally writes `.gitignore` and `.git` into the file itself.
pub fn load_exclude_file(path: &Path) -> Result<Vec<ExcludeRule>, SyncError> {
	let text = fs::read_to_string(path)?;
	Ok(text
		.split(|c| c == '\n' || c == '\r')
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(ExcludeRule::literal)
		.collect())
}


// vim: ts=4
