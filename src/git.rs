//! Repository state collection through the `git` CLI.
//!
//! Every query runs as its own subprocess with a short timeout. A failed,
//! missing, or timed-out query counts as empty output, so collection always
//! produces a `GitInfo`, possibly the empty one.

use std::env;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{Result, StatuslineError};

const GIT_BIN_ENV: &str = "PI_STATUSLINE_GIT_BIN";
pub const GIT_TIMEOUT: Duration = Duration::from_secs(2);

static GITHUB_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[:/](.+/.+?)(?:\.git)?$").expect("valid remote pattern")
});

/// Working tree counters from one status snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GitCounts {
    pub staged: u64,
    pub modified: u64,
    pub untracked: u64,
    pub ahead: u64,
    pub behind: u64,
}

/// Repository summary shown on the second footer line.
///
/// The default value means "not a repository" or "not collected yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    /// `owner/name` for GitHub remotes, otherwise empty.
    pub repository: String,
    pub branch: String,
    pub commit: String,
    pub added: u64,
    pub removed: u64,
    pub counts: GitCounts,
}

/// Line totals from `git diff --numstat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStat {
    pub added: u64,
    pub removed: u64,
}

impl std::ops::Add for DiffStat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            added: self.added + rhs.added,
            removed: self.removed + rhs.removed,
        }
    }
}

/// Runs one git query. Implementations return "" on any failure.
pub trait GitRunner: Send + Sync {
    fn run(&self, cwd: &Path, args: &[&str]) -> impl Future<Output = String> + Send;
}

/// Spawns the real `git` binary.
#[derive(Debug, Clone)]
pub struct ProcessGitRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for ProcessGitRunner {
    fn default() -> Self {
        let binary = env::var_os(GIT_BIN_ENV)
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from("git"), PathBuf::from);
        Self::with_binary(binary, GIT_TIMEOUT)
    }
}

impl ProcessGitRunner {
    pub fn with_binary(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    async fn output(&self, cwd: &Path, args: &[&str]) -> Result<String> {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .current_dir(cwd)
            .env("GIT_OPTIONAL_LOCKS", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(StatuslineError::Timeout {
                    command: format!("git {}", args.join(" ")),
                    timeout: self.timeout,
                });
            }
        };
        if !output.status.success() {
            return Err(StatuslineError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                status: output.status.to_string(),
            });
        }

        // Porcelain output starts with significant spaces; only drop trailing newlines.
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl GitRunner for ProcessGitRunner {
    async fn run(&self, cwd: &Path, args: &[&str]) -> String {
        match self.output(cwd, args).await {
            Ok(stdout) => stdout,
            Err(err) => {
                debug!(cwd = %cwd.display(), %err, "git query degraded to empty output");
                String::new()
            }
        }
    }
}

/// Extract `owner/repo` from a GitHub remote URL; anything else yields "".
pub fn parse_github_remote(url: &str) -> String {
    GITHUB_REMOTE
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Count staged, modified and untracked entries in `git status --porcelain` output.
pub fn parse_porcelain(output: &str) -> GitCounts {
    let mut counts = GitCounts::default();
    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        let mut chars = line.chars();
        let x = chars.next().unwrap_or(' ');
        let y = chars.next().unwrap_or(' ');

        if x == '?' {
            counts.untracked += 1;
            continue;
        }
        if x != ' ' {
            counts.staged += 1;
        }
        if y != ' ' && y != '?' {
            counts.modified += 1;
        }
    }
    counts
}

/// Sum `git diff --numstat` output. Binary entries (`-\t-\tpath`) are skipped.
pub fn parse_numstat(output: &str) -> DiffStat {
    let mut stat = DiffStat::default();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.split('\t');
        let (Some(added), Some(removed)) = (parts.next(), parts.next()) else {
            continue;
        };
        if added == "-" || removed == "-" {
            continue;
        }
        stat.added += parse_count(added);
        stat.removed += parse_count(removed);
    }
    stat
}

/// Parse a count, flooring fractions and mapping garbage or negatives to 0.
pub fn parse_count(value: &str) -> u64 {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n.floor() as u64,
        _ => 0,
    }
}

async fn ahead_behind<R: GitRunner>(runner: &R, cwd: &Path) -> (u64, u64) {
    let upstream = runner
        .run(cwd, &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
        .await;
    let upstream = upstream.trim();
    if upstream.is_empty() {
        return (0, 0);
    }

    let ahead_range = format!("{upstream}..HEAD");
    let behind_range = format!("HEAD..{upstream}");
    let ahead_args = ["rev-list", "--count", ahead_range.as_str()];
    let behind_args = ["rev-list", "--count", behind_range.as_str()];
    let (ahead, behind) = tokio::join!(runner.run(cwd, &ahead_args), runner.run(cwd, &behind_args));
    (parse_count(&ahead), parse_count(&behind))
}

async fn diff_stat<R: GitRunner>(runner: &R, cwd: &Path) -> DiffStat {
    let head = runner.run(cwd, &["diff", "--numstat", "HEAD"]).await;
    if !head.is_empty() {
        return parse_numstat(&head);
    }

    // No HEAD yet (fresh repository) or nothing changed against it.
    let (staged, unstaged) = tokio::join!(
        runner.run(cwd, &["diff", "--numstat", "--cached"]),
        runner.run(cwd, &["diff", "--numstat"]),
    );
    parse_numstat(&staged) + parse_numstat(&unstaged)
}

/// Collect the full repository summary for `cwd`.
pub async fn collect_git_info<R: GitRunner>(runner: &R, cwd: &Path) -> GitInfo {
    let git_dir = runner.run(cwd, &["rev-parse", "--git-dir"]).await;
    if git_dir.trim().is_empty() {
        return GitInfo::default();
    }

    let (branch, commit, remote_url, porcelain) = tokio::join!(
        runner.run(cwd, &["branch", "--show-current"]),
        runner.run(cwd, &["rev-parse", "--short", "HEAD"]),
        runner.run(cwd, &["config", "--get", "remote.origin.url"]),
        runner.run(cwd, &["status", "--porcelain"]),
    );

    let mut counts = parse_porcelain(&porcelain);
    (counts.ahead, counts.behind) = ahead_behind(runner, cwd).await;
    let stat = diff_stat(runner, cwd).await;

    GitInfo {
        repository: parse_github_remote(&remote_url),
        branch: branch.trim().to_string(),
        commit: commit.trim().to_string(),
        added: stat.added,
        removed: stat.removed,
        counts,
    }
}
