use std::path::Path;

use anyhow::{Context, Result, bail};
use log::debug;
use serde::Deserialize;

use crate::{
    changelog::{Commit, deploy_message},
    config::Config,
    release::{BatchSession, GitHubReleases},
    repo::RepoId,
    runtime::Runtime,
};

use super::report;

/// One tag to reconcile in a batch run.
///
/// Either `message` is given, or `commit` + `since` (+ `commits`) from which
/// the deploy message is built.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl ManifestEntry {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.tag_name)
    }

    pub fn message(&self, repo: &RepoId) -> Result<String> {
        if let Some(message) = &self.message {
            return Ok(message.clone());
        }
        match (&self.commit, &self.since) {
            (Some(commit), Some(since)) => Ok(deploy_message(
                repo,
                commit,
                since,
                &self.tag_name,
                &self.commits,
            )),
            _ => bail!(
                "manifest entry {} needs either 'message' or both 'commit' and 'since'",
                self.tag_name
            ),
        }
    }
}

/// Reads a JSON array of [`ManifestEntry`].
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    debug!("Read {} manifest entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Reconciles every manifest entry against one release listing.
#[tracing::instrument(skip(runtime, api_url))]
pub async fn sync<R: Runtime>(
    runtime: &R,
    repo: Option<&str>,
    api_url: Option<String>,
    manifest: &Path,
) -> Result<()> {
    let config = Config::load(runtime, repo, api_url)?;

    // Validate the whole manifest before touching the API.
    let entries = read_manifest(manifest)?;
    let messages = entries
        .iter()
        .map(|entry| entry.message(&config.repo))
        .collect::<Result<Vec<_>>>()?;

    let github = GitHubReleases::from_config(&config)?;
    github
        .verify_access()
        .await
        .context("Cannot access the GitHub API")?;

    let mut session = BatchSession::start(&github)
        .await
        .context("Failed to list GitHub releases")?;
    println!("Found {} releases.", session.releases().len());
    println!("Found {} tags.", entries.len());

    for (entry, message) in entries.iter().zip(&messages) {
        report(
            session
                .update_or_create(&entry.tag_name, entry.name(), message)
                .await,
        );
    }

    println!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TOKEN_ENV;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use mockito::Matcher;
    use std::io::Write;

    fn runtime_with_token() -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(TOKEN_ENV))
            .returning(|_| Ok("t0ken".to_string()));
        runtime
    }

    fn manifest_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_entry_message_prefers_explicit_message() {
        let entry: ManifestEntry =
            serde_json::from_str(r#"{"tag_name": "v1", "message": "hi", "commit": "abc", "since": "v0"}"#)
                .unwrap();
        assert_eq!(entry.message(&"o/r".parse().unwrap()).unwrap(), "hi");
        assert_eq!(entry.name(), "v1");
    }

    #[test]
    fn test_entry_message_from_commits() {
        let entry: ManifestEntry = serde_json::from_str(
            r#"{"tag_name": "heroku/v2", "name": "v2", "commit": "0123456789", "since": "heroku/v1",
                "commits": [{"sha": "0123456789", "subject": "Ship it"}]}"#,
        )
        .unwrap();
        let message = entry.message(&"o/r".parse().unwrap()).unwrap();
        assert!(message.starts_with("Deploy 0123456\n\nDiff: https://github.com/o/r/compare/heroku/v1...heroku/v2\n"));
        assert!(message.ends_with("- [Ship it](https://github.com/o/r/commit/0123456789)"));
    }

    #[test]
    fn test_entry_without_message_source_is_rejected() {
        let entry: ManifestEntry = serde_json::from_str(r#"{"tag_name": "v1", "commit": "abc"}"#).unwrap();
        assert!(entry.message(&"o/r".parse().unwrap()).is_err());
    }

    #[test]
    fn test_read_manifest_invalid_json() {
        let file = manifest_file("{not json");
        assert!(read_manifest(file.path()).is_err());
    }

    #[tokio::test]
    async fn test_sync_invalid_manifest_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let any = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let file = manifest_file(r#"[{"tag_name": "v1"}]"#);

        let result = sync(&runtime_with_token(), Some("o/r"), Some(server.url()), file.path()).await;

        assert!(result.is_err());
        any.assert_async().await;
    }

    #[tokio::test]
    async fn test_sync_lists_once_and_reconciles_each_entry() {
        let mut server = mockito::Server::new_async().await;
        let _user = server
            .mock("GET", "/user")
            .with_status(200)
            .with_body(r#"{"login": "octocat"}"#)
            .create_async()
            .await;
        let p1 = server
            .mock("GET", "/repos/o/r/releases?page=1")
            .with_status(200)
            .with_body(r#"[{"id": 11, "tag_name": "heroku/v1"}]"#)
            .expect(1)
            .create_async()
            .await;
        let p2 = server
            .mock("GET", "/repos/o/r/releases?page=2")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", "/repos/o/r/releases/11")
            .match_body(Matcher::PartialJson(serde_json::json!({"name": "v1", "body": "first"})))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        // A failed create for v2 must not stop v3.
        let post_v2 = server
            .mock("POST", "/repos/o/r/releases")
            .match_body(Matcher::PartialJson(serde_json::json!({"tag_name": "heroku/v2"})))
            .with_status(422)
            .expect(1)
            .create_async()
            .await;
        let post_v3 = server
            .mock("POST", "/repos/o/r/releases")
            .match_body(Matcher::PartialJson(serde_json::json!({"tag_name": "heroku/v3"})))
            .with_status(201)
            .with_body(r#"{"id": 13, "tag_name": "heroku/v3"}"#)
            .expect(1)
            .create_async()
            .await;

        let file = manifest_file(
            r#"[
                {"tag_name": "heroku/v1", "name": "v1", "message": "first"},
                {"tag_name": "heroku/v2", "name": "v2", "message": "second"},
                {"tag_name": "heroku/v3", "name": "v3", "message": "third"}
            ]"#,
        );

        sync(&runtime_with_token(), Some("o/r"), Some(server.url()), file.path())
            .await
            .unwrap();

        p1.assert_async().await;
        p2.assert_async().await;
        patch.assert_async().await;
        post_v2.assert_async().await;
        post_v3.assert_async().await;
    }
}
