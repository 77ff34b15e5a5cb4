//! Fetching and refreshing the corpus checkout with the `git` binary.
//!
//! A failed refresh only logs a warning; a failed first clone is an error
//! because there is nothing to serve.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use docdb_core::error::{Error, Result};

/// Lines of `README.md` inspected for a version string.
const VERSION_SCAN_LINES: usize = 30;

static RELEASE_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"仓颉编程语言\s+([vV]?\d+(?:\.\d+)*)").ok());
static RELEASE_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").ok());
static VERSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"版本\s*[:：]?\s*([vV]?\d+(?:\.\d+)*)",
        r"Version\s*[:：]?\s*([vV]?\d+(?:\.\d+)*)",
        r"\b([vV]?\d+(?:\.\d+)+)\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Makes sure `root` holds a checkout: clones when absent, refreshes when `auto_update` is set.
pub fn ensure_corpus(root: &Path, repo_url: &str, auto_update: bool) -> Result<()> {
    if root.exists() {
        if auto_update {
            info!(root = %root.display(), "updating corpus");
            match update(root) {
                Ok(()) => info!("corpus updated"),
                Err(e) => warn!(error = %e, "corpus update failed, continuing with existing files"),
            }
        }
        return Ok(());
    }

    info!(repo = repo_url, root = %root.display(), "corpus missing, cloning");
    if let Some(parent) = root.parent() {
        fs::create_dir_all(parent)?;
    }
    let root_arg = root.to_string_lossy();
    if let Err(e) = git(None, &["clone", "--depth", "1", repo_url, &root_arg]) {
        let _ = fs::remove_dir_all(root);
        return Err(e);
    }
    info!("corpus cloned");
    Ok(())
}

fn update(root: &Path) -> Result<()> {
    if !root.join(".git").exists() {
        return Err(Error::Operation(format!("{} is not a git checkout", root.display())));
    }
    git(Some(root), &["fetch", "--all"])?;
    let branch = default_branch(root);
    git(Some(root), &["reset", "--hard", &format!("origin/{}", branch)])?;
    if let Err(e) = git(Some(root), &["clean", "-fd"]) {
        warn!(error = %e, "git clean failed");
    }
    Ok(())
}

/// Upstream branch name, else `main` or `master` if they exist on origin.
fn default_branch(root: &Path) -> String {
    let upstream = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
        .stderr(Stdio::null())
        .output();
    if let Ok(out) = upstream {
        if out.status.success() {
            let name = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if let Some((_, branch)) = name.split_once('/') {
                if !branch.is_empty() && !branch.contains('/') {
                    return branch.to_string();
                }
            }
        }
    }
    for candidate in ["main", "master"] {
        let verified = Command::new("git")
            .arg("-C")
            .arg(root)
            .args(["rev-parse", "--verify", &format!("origin/{}", candidate)])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if verified.is_ok_and(|s| s.success()) {
            return candidate.to_string();
        }
    }
    "main".to_string()
}

/// Runs git with its output sent to stderr so stdout stays clean for command results.
fn git(dir: Option<&Path>, args: &[&str]) -> Result<()> {
    let mut cmd = Command::new("git");
    if let Some(dir) = dir {
        cmd.arg("-C").arg(dir);
    }
    let status = cmd
        .args(args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| Error::Operation(format!("failed to run git: {}", e)))?;
    if !status.success() {
        return Err(Error::Operation(format!("git {} exited with {}", args.join(" "), status)));
    }
    Ok(())
}

/// Version string from the first lines of the corpus `README.md`, if any.
pub fn corpus_version(root: &Path) -> Option<String> {
    let file = fs::File::open(root.join("README.md")).ok()?;
    BufReader::new(file)
        .lines()
        .take(VERSION_SCAN_LINES)
        .map_while(|l| l.ok())
        .find_map(|line| version_in_line(line.trim()))
}

fn version_in_line(line: &str) -> Option<String> {
    if let Some(caps) = RELEASE_LINE.as_ref().and_then(|re| re.captures(line)) {
        let version = caps[1].trim().to_string();
        let date = RELEASE_DATE.as_ref().and_then(|re| re.captures(line)).map(|c| c[1].to_string());
        return Some(match date {
            Some(date) => format!("{} (released {})", version, date),
            None => version,
        });
    }
    VERSION_PATTERNS
        .iter()
        .find_map(|re| re.captures(line).map(|c| c[1].trim().to_string()))
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn release_line_with_date() {
        assert_eq!(
            version_in_line("仓颉编程语言 v1.0.0（对应官网文档发布日期：2025-07-01）").as_deref(),
            Some("v1.0.0 (released 2025-07-01)")
        );
    }

    #[test]
    fn generic_version_markers() {
        assert_eq!(version_in_line("Version: 0.53.18").as_deref(), Some("0.53.18"));
        assert_eq!(version_in_line("文档 v2.1 更新").as_deref(), Some("v2.1"));
        assert_eq!(version_in_line("plain prose without numbers"), None);
    }

    #[test]
    fn readme_scan_is_limited_to_leading_lines() {
        let tmp = TempDir::new().unwrap();
        let mut readme = "filler line\n".repeat(40);
        readme.push_str("Version 9.9.9\n");
        fs::write(tmp.path().join("README.md"), readme).unwrap();
        assert_eq!(corpus_version(tmp.path()), None);

        fs::write(tmp.path().join("README.md"), "# Corpus\n\nVersion: 1.2.3\n").unwrap();
        assert_eq!(corpus_version(tmp.path()).as_deref(), Some("1.2.3"));
        assert_eq!(corpus_version(&tmp.path().join("missing")), None);
    }

    #[test]
    fn existing_root_without_update_is_left_alone() {
        let tmp = TempDir::new().unwrap();
        assert!(ensure_corpus(tmp.path(), "file:///nonexistent", false).is_ok());
    }
}
