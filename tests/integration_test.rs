use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::str::contains;
use std::io::Write;
use tempfile::NamedTempFile;

fn release_party(api_url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("release-party"));
    cmd.env("GITHUB_RELEASE_TOKEN", "test_token")
        .env_remove("GITHUB_RELEASE_REPO")
        .arg("--repo")
        .arg("owner/repo")
        .arg("--api-url")
        .arg(api_url);
    cmd
}

fn mock_user(server: &mut Server) -> mockito::Mock {
    server
        .mock("GET", "/user")
        .match_header("authorization", "Bearer test_token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login": "deployer"}"#)
        .create()
}

#[test]
fn test_missing_token_fails_before_any_request() {
    let mut server = Server::new();
    let any = server.mock("GET", Matcher::Any).expect(0).create();

    Command::new(cargo::cargo_bin!("release-party"))
        .env_remove("GITHUB_RELEASE_TOKEN")
        .arg("--repo")
        .arg("owner/repo")
        .arg("--api-url")
        .arg(server.url())
        .arg("verify")
        .assert()
        .failure()
        .stderr(contains("GITHUB_RELEASE_TOKEN"));

    any.assert();
}

#[test]
fn test_verify() {
    let mut server = Server::new();
    let user = mock_user(&mut server);

    release_party(&server.url())
        .arg("verify")
        .assert()
        .success()
        .stdout(contains("GitHub access OK for owner/repo as deployer"));

    user.assert();
}

#[test]
fn test_verify_bad_credentials_is_fatal() {
    let mut server = Server::new();
    let _user = server
        .mock("GET", "/user")
        .with_status(401)
        .with_body(r#"{"message": "Bad credentials"}"#)
        .create();

    release_party(&server.url())
        .arg("verify")
        .assert()
        .failure()
        .stderr(contains("Bad credentials"));
}

#[test]
fn test_create_release() {
    let mut server = Server::new();
    let post = server
        .mock("POST", "/repos/owner/repo/releases")
        .match_body(Matcher::Json(serde_json::json!({
            "tag_name": "heroku/v1",
            "name": "v1",
            "body": "Deploy 1234567"
        })))
        .with_status(201)
        .with_body(r#"{"id": 1, "tag_name": "heroku/v1", "name": "v1", "body": "Deploy 1234567"}"#)
        .create();

    release_party(&server.url())
        .args(["create", "--tag", "heroku/v1", "--name", "v1", "--message", "Deploy 1234567"])
        .assert()
        .success()
        .stdout(contains("GitHub release heroku/v1 created!"));

    post.assert();
}

#[test]
fn test_create_refused_prints_manual_fallback_and_succeeds() {
    let mut server = Server::new();
    let _post = server
        .mock("POST", "/repos/owner/repo/releases")
        .with_status(422)
        .with_body(r#"{"message":"Validation Failed"}"#)
        .create();

    let mut message = NamedTempFile::new().unwrap();
    write!(message, "Deploy 1234567\n\n- [Fix](https://github.com/owner/repo/commit/1234567)").unwrap();

    release_party(&server.url())
        .args(["create", "--tag", "heroku/v1", "--name", "v1", "--message-file"])
        .arg(message.path())
        .assert()
        .success()
        .stdout(contains("422 Unprocessable Entity"))
        .stdout(contains(r#"Body sent: {"tag_name":"heroku/v1","name":"v1","body":"Deploy 1234567"#))
        .stdout(contains(
            "Create it manually here: https://github.com/owner/repo/releases/new?tag=heroku%2Fv1&title=v1",
        ))
        .stdout(contains("Tag version: heroku/v1"))
        .stdout(contains("- [Fix](https://github.com/owner/repo/commit/1234567)"));
}

#[test]
fn test_publish_updates_existing_release() {
    let mut server = Server::new();
    let _user = mock_user(&mut server);
    let _p1 = server
        .mock("GET", "/repos/owner/repo/releases?page=1")
        .with_status(200)
        .with_body(r#"[{"id": 77, "tag_name": "fly/v3", "name": "v3", "body": "old"}]"#)
        .create();
    let _p2 = server
        .mock("GET", "/repos/owner/repo/releases?page=2")
        .with_status(200)
        .with_body("[]")
        .create();
    let patch = server
        .mock("PATCH", "/repos/owner/repo/releases/77")
        .match_body(Matcher::Json(serde_json::json!({"name": "v3", "body": "new"})))
        .with_status(200)
        .create();
    let post = server
        .mock("POST", "/repos/owner/repo/releases")
        .expect(0)
        .create();

    release_party(&server.url())
        .args(["publish", "--tag", "fly/v3", "--name", "v3", "--message", "new"])
        .assert()
        .success()
        .stdout(contains("GitHub release v3 updated!"));

    patch.assert();
    post.assert();
}

#[test]
fn test_publish_listing_failure_is_fatal() {
    let mut server = Server::new();
    let _user = mock_user(&mut server);
    let _p1 = server
        .mock("GET", "/repos/owner/repo/releases?page=1")
        .with_status(502)
        .with_body("bad gateway")
        .create();

    release_party(&server.url())
        .args(["publish", "--tag", "fly/v3", "--message", "new"])
        .assert()
        .failure()
        .stderr(contains("Failed to list GitHub releases"));
}

#[test]
fn test_sync_manifest() {
    let mut server = Server::new();
    let _user = mock_user(&mut server);
    let _p1 = server
        .mock("GET", "/repos/owner/repo/releases?page=1")
        .with_status(200)
        .with_body(r#"[{"id": 5, "tag_name": "heroku/v1"}]"#)
        .expect(1)
        .create();
    let _p2 = server
        .mock("GET", "/repos/owner/repo/releases?page=2")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create();
    let patch = server
        .mock("PATCH", "/repos/owner/repo/releases/5")
        .with_status(200)
        .create();
    let post = server
        .mock("POST", "/repos/owner/repo/releases")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "tag_name": "heroku/v2",
            "body": "Deploy abcdef0\n\nDiff: https://github.com/owner/repo/compare/heroku/v1...heroku/v2\n- [Ship](https://github.com/owner/repo/commit/abcdef0123)"
        })))
        .with_status(201)
        .with_body(r#"{"id": 6, "tag_name": "heroku/v2"}"#)
        .create();

    let mut manifest = NamedTempFile::new().unwrap();
    write!(
        manifest,
        r#"[
            {{"tag_name": "heroku/v1", "name": "v1", "message": "Deploy 0000000"}},
            {{"tag_name": "heroku/v2", "name": "v2", "commit": "abcdef0123", "since": "heroku/v1",
              "commits": [{{"sha": "abcdef0123", "subject": "Ship"}}]}}
        ]"#
    )
    .unwrap();

    release_party(&server.url())
        .arg("sync")
        .arg("--manifest")
        .arg(manifest.path())
        .assert()
        .success()
        .stdout(contains("Found 1 releases."))
        .stdout(contains("GitHub release v1 updated!"))
        .stdout(contains("GitHub release heroku/v2 created!"))
        .stdout(contains("Done"));

    patch.assert();
    post.assert();
}
