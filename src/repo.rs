//! Repository identifier in `owner/repo` form.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    /// Finds the GitHub repository of the `origin` remote in `git remote -v` output.
    ///
    /// Accepts `git@github.com:owner/repo.git` and `https://github.com/owner/repo(.git)`,
    /// with or without a trailing slash.
    pub fn from_git_remotes(output: &str) -> Option<RepoId> {
        output.lines().find_map(|line| {
            let (name, rest) = line.split_once('\t')?;
            if name != "origin" {
                return None;
            }
            let url = rest.split_whitespace().next()?;
            let (_, path) = url.split_once("github.com")?;
            let path = path.strip_prefix(':').or_else(|| path.strip_prefix('/'))?;
            let path = path.trim_end_matches('/');
            let path = path.strip_suffix(".git").unwrap_or(path);
            path.parse().ok()
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            Err(Error::Configuration(format!(
                "Invalid repository format '{}'. Expected 'owner/repo'.",
                s
            )))
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}
