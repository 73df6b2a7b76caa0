//! # dirsync - Incremental Build-Directory Mirror
//!
//! dirsync mirrors a source tree into a destination tree using hardlinks
//! (or copies), with exclude-rule filtering, orphan deletion and optional
//! symlink materialization. It is the piece of a deployment pipeline that
//! keeps a build output directory in sync with a scratch git checkout
//! before the checkout gets committed and pushed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dirsync::sync::{sync, SyncOptions};
//! use dirsync::exclude::ExcludeRule;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = sync(
//!         "/work/build".as_ref(),
//!         "/work/mirror".as_ref(),
//!         SyncOptions::new().exclude(ExcludeRule::pattern("*.log")?),
//!     )?;
//!     println!("{} changes", report.changes());
//!     Ok(())
//! }
//! ```
//!
//! A second pass over an unchanged source is a no-op: destination files
//! already sharing the source inode are left alone, mtimes included.

pub mod error;
pub mod exclude;
pub mod git;
pub mod logging;
pub mod prune;
pub mod reconcile;
pub mod sync;
pub mod types;
pub mod walk;

// Re-export commonly used types and functions
pub use error::{GitError, SyncError};
pub use exclude::{load_exclude_file, ExcludeRule};
pub use reconcile::SyncMode;
pub use sync::{sync, SyncOptions, SyncReport};
pub use types::{Entry, EntryKind};

// vim: ts=4
