use super::*;
use libbupkis::Config;
use tempfile::TempDir;

const MANIFEST: &str = r#"{"schemaVersion":1,"history":[{"v1Compatibility":"{\"created\":\"2020-01-01T00:00:00Z\"}"}]}"#;

fn test_ctx(dir: &TempDir) -> AppContext {
    let mut config = Config::default();
    config.network.plain_http = true;
    config.credentials.path = Some(
        dir.path()
            .join("credentials.toml")
            .to_string_lossy()
            .into_owned(),
    );
    AppContext::from_config(config, VerbosityLevel::Normal)
}

#[test]
fn test_get_single_tag() {
    let mut server = mockito::Server::new();
    let manifest = server
        .mock("GET", "/v2/ns/app/manifests/v1.2")
        .with_status(200)
        .with_body(MANIFEST)
        .create();

    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);
    let host = server.host_with_port();

    let records = get_images(&ctx, &format!("{}/ns/app:v1.2", host)).unwrap();

    manifest.assert();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].hostname, host);
    assert_eq!(records[0].repository, "ns/app");
    assert_eq!(records[0].tag, "v1.2");
}

#[test]
fn test_get_without_tag_lists_every_tag() {
    let mut server = mockito::Server::new();
    let _tags = server
        .mock("GET", "/v2/app/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"app","tags":["v1","v2"]}"#)
        .create();
    let _v1 = server
        .mock("GET", "/v2/app/manifests/v1")
        .with_status(200)
        .with_body(MANIFEST)
        .create();
    let _v2 = server
        .mock("GET", "/v2/app/manifests/v2")
        .with_status(200)
        .with_body(MANIFEST)
        .create();

    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);

    let records = get_images(&ctx, &format!("{}/app", server.host_with_port())).unwrap();
    let tags: Vec<&str> = records.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, vec!["v1", "v2"]);
}

#[test]
fn test_get_uses_stored_credential() {
    let mut server = mockito::Server::new();
    let manifest = server
        .mock("GET", "/v2/app/manifests/v1")
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .with_status(200)
        .with_body(MANIFEST)
        .create();

    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);
    let host = server.host_with_port();
    ctx.credential_store()
        .unwrap()
        .store(&libbupkis::Credential::new(host.clone(), "user", "pass"))
        .unwrap();

    let records = get_images(&ctx, &format!("{}/app:v1", host)).unwrap();
    manifest.assert();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_get_malformed_reference() {
    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);

    let err = get_images(&ctx, "registry.example.com").unwrap_err();
    assert!(err.contains("malformed image reference"));

    assert!(get_images(&ctx, "").is_err());
}

#[test]
fn test_get_missing_tag_reports_registry_error() {
    let mut server = mockito::Server::new();
    let _manifest = server
        .mock("GET", "/v2/app/manifests/nope")
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"MANIFEST_UNKNOWN"}]}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);

    let err = get_images(&ctx, &format!("{}/app:nope", server.host_with_port())).unwrap_err();
    assert!(err.contains("404"));
    assert!(err.contains("MANIFEST_UNKNOWN"));
}
