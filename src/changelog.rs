//! Deploy message built from commit history handed in by the caller.

use serde::Deserialize;

use crate::repo::RepoId;

/// A commit listed in a deploy message.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Commit {
    pub sha: String,
    pub subject: String,
}

/// Builds the release body for a deploy of `hash` tagged `tag_name`.
///
/// `last_tag` is the previous deploy tag; `commits` are the commits between
/// it and `hash`, in the order given.
///
/// On a first deploy there is no previous tag: pass the short root commit
/// hash as `last_tag` and append the root commit itself as the last entry of
/// `commits`, since a `root..hash` range does not contain it.
pub fn deploy_message(
    repo: &RepoId,
    hash: &str,
    last_tag: &str,
    tag_name: &str,
    commits: &[Commit],
) -> String {
    let short: String = hash.chars().take(7).collect();
    let lines = commits
        .iter()
        .map(|c| format!("- [{}](https://github.com/{}/commit/{})", c.subject, repo, c.sha))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Deploy {}\n\nDiff: https://github.com/{}/compare/{}...{}\n{}",
        short, repo, last_tag, tag_name, lines
    )
}
