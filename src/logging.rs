//! Logging prelude: re-exports of the tracing macros used across the crate.
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("syncing {} -> {}", src.display(), dst.display());
//! debug!("linked {}", relative);
//! ```

pub use tracing::{debug, error, info, warn};

/// Initialize the tracing subscriber, writing to stderr.
///
/// INFO and above by default; override with `RUST_LOG`:
///
/// ```bash
/// RUST_LOG=debug dirsync ./build ./mirror
/// RUST_LOG=dirsync::prune=trace dirsync ./build ./mirror
/// ```
pub fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();
}
