use clap::{Arg, ArgAction, Command};
use std::error::Error;
use std::path::PathBuf;
use std::{env, fs};

use dirsync::exclude::{load_exclude_file, ExcludeRule};
use dirsync::logging::{info, init_tracing};
use dirsync::reconcile::SyncMode;
use dirsync::sync::{sync, SyncOptions};

/// The engine wants absolute paths; resolve against the current directory.
fn absolutize(path: &str) -> Result<PathBuf, Box<dyn Error>> {
	let p = PathBuf::from(path);
	if p.is_absolute() {
		Ok(p)
	} else {
		Ok(env::current_dir()?.join(p))
	}
}

fn main() -> Result<(), Box<dyn Error>> {
	init_tracing();

	let matches = Command::new("dirsync")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Mirror a build directory into a destination tree using hardlinks")
		.arg(Arg::new("source").required(true).help("Source directory"))
		.arg(Arg::new("target").required(true).help("Destination directory (created if missing)"))
		.arg(
			Arg::new("exclude")
				.short('e')
				.long("exclude")
				.value_name("GLOB")
				.action(ArgAction::Append)
				.help("Exclude paths matching this glob (repeatable)"),
		)
		.arg(
			Arg::new("exclude-from")
				.long("exclude-from")
				.value_name("FILE")
				.help("Read literal exclude rules from a newline-delimited file"),
		)
		.arg(
			Arg::new("copy")
				.long("copy")
				.action(ArgAction::SetTrue)
				.help("Copy file content instead of hardlinking"),
		)
		.arg(
			Arg::new("keep-orphaned")
				.long("keep-orphaned")
				.action(ArgAction::SetTrue)
				.help("Keep destination entries that no longer exist in the source"),
		)
		.arg(
			Arg::new("symlinks")
				.long("symlinks")
				.action(ArgAction::SetTrue)
				.help("Materialize source symlinks as destination symlinks"),
		)
		.get_matches();

	let source = fs::canonicalize(
		matches.get_one::<String>("source").ok_or("source argument required")?,
	)?;
	let target = absolutize(matches.get_one::<String>("target").ok_or("target argument required")?)?;

	let mut excludes: Vec<ExcludeRule> = Vec::new();
	if let Some(globs) = matches.get_many::<String>("exclude") {
		for glob in globs {
			excludes.push(ExcludeRule::pattern(glob)?);
		}
	}
	if let Some(file) = matches.get_one::<String>("exclude-from") {
		excludes.extend(load_exclude_file(file.as_ref())?);
	}

	let options = SyncOptions::new()
		.mode(if matches.get_flag("copy") { SyncMode::Copy } else { SyncMode::Hardlink })
		.excludes(excludes)
		.delete_orphaned(!matches.get_flag("keep-orphaned"))
		.support_symlink(matches.get_flag("symlinks"));

	let report = sync(&source, &target, options)?;
	info!(
		"{} entries, {} dirs created, {} linked, {} copied, {} symlinks, {} orphans removed",
		report.entries,
		report.dirs_created,
		report.files_linked,
		report.files_copied,
		report.symlinks,
		report.orphans_removed
	);

	Ok(())
}

// vim: ts=4
