//! Git collaborator glue
//!
//! The surrounding pipeline shells out to git; nothing here reimplements it.
//! `git_exec` runs one argument vector and captures stdout, `commit_info`
//! collects the metadata of a single commit, and `commit_message` renders
//! the commit message used when mirroring a build into its build repository.

use std::path::Path;
use std::process::Command;

use crate::error::GitError;
use crate::logging::*;

/// Field separator for single-call log formats. Subjects may contain almost
/// anything, so this stays deliberately unlikely.
const DELIMITER: &str = "--*--";

/// Run `git <args>` in `dir`, returning captured stdout (trailing newline
/// trimmed). Non-zero exit is an error carrying stderr.
pub fn git_exec(dir: &Path, args: &[&str]) -> Result<String, GitError> {
	debug!("git {}", args.join(" "));
	let output = Command::new("git")
		.args(args)
		.current_dir(dir)
		.output()
		.map_err(|e| GitError::Spawn { source: e })?;

	if !output.status.success() {
		return Err(GitError::NonZero {
			status: output.status,
			stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
		});
	}

	let stdout = String::from_utf8(output.stdout)
		.map_err(|_| GitError::Utf8 { what: "stdout".to_string() })?;
	Ok(stdout.trim_end_matches('\n').to_string())
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CommitAuthor {
	pub name: String,
	pub email: String,
}

/// Metadata of one commit, as reported to the deployment tracking API.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CommitInfo {
	pub hash: String,
	pub subject: String,
	/// Author date, ISO 8601
	pub date: String,
	pub author: CommitAuthor,
	pub branch: String,
}

/// Collect commit metadata with a single delimited `git log` call.
pub fn commit_info(dir: &Path, commit: &str, branch: &str) -> Result<CommitInfo, GitError> {
	let format = format!("--pretty=format:%H{d}%s{d}%aI{d}%aN{d}%aE", d = DELIMITER);
	let output = git_exec(dir, &["log", format.as_str(), "-n", "1", commit])?;

	let fields: Vec<&str> = output.split(DELIMITER).collect();
	if fields.len() != 5 {
		return Err(GitError::Parse { output });
	}

	Ok(CommitInfo {
		hash: fields[0].to_string(),
		subject: fields[1].to_string(),
		date: fields[2].to_string(),
		author: CommitAuthor { name: fields[3].to_string(), email: fields[4].to_string() },
		branch: branch.to_string(),
	})
}

/// Input for the build-repository commit message.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DeploySummary {
	/// Deploy index assigned by the tracking API
	pub index: Option<String>,
	/// Public deploy URL
	pub url: Option<String>,
	/// New commit subjects since the previous build, newest first
	pub messages: Vec<String>,
}

/// Render the commit message for a build-repository commit.
///
/// `#<index> <first message>` followed by the deploy URL; further messages
/// are appended under "Also includes:". Double quotes become single quotes
/// and backticks are escaped so the message survives shell interpolation
/// downstream.
pub fn commit_message(summary: &DeploySummary) -> String {
	let messages: Vec<String> = summary
		.messages
		.iter()
		.map(|m| m.replace('"', "'").replace('`', "\\`"))
		.collect();

	let index = summary.index.as_deref().unwrap_or("");
	let url = summary.url.as_deref().unwrap_or("");
	let first = messages.first().map(String::as_str).unwrap_or("No commit messages");
	let more = if messages.len() > 1 {
		format!("\n\nAlso includes:\n{}", messages[1..].join("\n"))
	} else {
		String::new()
	};

	format!("#{} {}\n{}{}", index, first, url, more)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn scratch_repo() -> TempDir {
		let tmp = TempDir::new().unwrap();
		let dir = tmp.path();
		git_exec(dir, &["init", "-q", "-b", "main"]).unwrap();
		git_exec(dir, &["config", "user.email", "build@example.com"]).unwrap();
		git_exec(dir, &["config", "user.name", "Build Bot"]).unwrap();
		std::fs::write(dir.join("a.txt"), b"a").unwrap();
		git_exec(dir, &["add", "."]).unwrap();
		git_exec(dir, &["commit", "-q", "-m", "first commit"]).unwrap();
		tmp
	}

	#[test]
	fn test_git_exec_captures_stdout() {
		let repo = scratch_repo();
		let out = git_exec(repo.path(), &["rev-parse", "--is-inside-work-tree"]).unwrap();
		assert_eq!(out, "true");
	}

	#[test]
	fn test_git_exec_nonzero_is_error() {
		let repo = scratch_repo();
		match git_exec(repo.path(), &["rev-parse", "no-such-ref-xyz"]) {
			Err(GitError::NonZero { stderr, .. }) => assert!(!stderr.is_empty()),
			other => panic!("expected non-zero exit, got {:?}", other),
		}
	}

	#[test]
	fn test_commit_info_round_trip() {
		let repo = scratch_repo();
		let info = commit_info(repo.path(), "HEAD", "main").unwrap();

		assert_eq!(info.subject, "first commit");
		assert_eq!(info.branch, "main");
		assert_eq!(info.hash.len(), 40);
		assert_eq!(info.author.name, "Build Bot");
		assert_eq!(info.author.email, "build@example.com");
		assert!(info.date.contains('T'), "author date should be ISO 8601: {}", info.date);
	}

	#[test]
	fn test_commit_message_full() {
		let summary = DeploySummary {
			index: Some("42".to_string()),
			url: Some("https://example.netlify.app".to_string()),
			messages: vec!["Fix header".to_string(), "Tweak footer".to_string()],
		};
		assert_eq!(
			commit_message(&summary),
			"#42 Fix header\nhttps://example.netlify.app\n\nAlso includes:\nTweak footer"
		);
	}

	#[test]
	fn test_commit_message_empty() {
		assert_eq!(commit_message(&DeploySummary::default()), "# No commit messages\n");
	}

	#[test]
	fn test_commit_message_sanitizes_quotes() {
		let summary = DeploySummary {
			index: Some("7".to_string()),
			url: None,
			messages: vec!["Say \"hi\" in `code`".to_string()],
		};
		assert_eq!(commit_message(&summary), "#7 Say 'hi' in \\`code\\`\n");
	}
}

// vim: ts=4
