use super::*;
use crate::auth::Credential;
use crate::client::ClientConfig;
use mockito::{Mock, Server};

fn manifest(created: &str) -> String {
    let v1 = format!(r#"{{"created":"{}"}}"#, created);
    serde_json::json!({
        "schemaVersion": 1,
        "history": [{ "v1Compatibility": v1 }]
    })
    .to_string()
}

fn client_for(servers: &[&Server], config: ClientConfig) -> RegistryClient {
    let credentials = servers
        .iter()
        .map(|server| Credential::anonymous(server.host_with_port()))
        .collect::<Vec<_>>();
    RegistryClient::from_credentials(credentials, config.with_plain_http(true)).unwrap()
}

fn mock_catalog(server: &mut Server, repositories: &[&str]) -> Mock {
    server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(serde_json::json!({ "repositories": repositories }).to_string())
        .create()
}

fn mock_tags(server: &mut Server, repository: &str, tags: &[&str]) -> Mock {
    server
        .mock("GET", format!("/v2/{}/tags/list", repository).as_str())
        .with_status(200)
        .with_body(serde_json::json!({ "name": repository, "tags": tags }).to_string())
        .create()
}

fn mock_manifest(server: &mut Server, repository: &str, tag: &str, created: &str) -> Mock {
    server
        .mock("GET", format!("/v2/{}/manifests/{}", repository, tag).as_str())
        .with_status(200)
        .with_body(manifest(created))
        .create()
}

fn mock_status(server: &mut Server, path: &str, status: usize) -> Mock {
    server.mock("GET", path).with_status(status).create()
}

/// Registry with repositories A, B, C where B's tag listing fails.
fn registry_with_broken_repository(server: &mut Server) -> Vec<Mock> {
    vec![
        mock_catalog(server, &["a", "b", "c"]),
        mock_tags(server, "a", &["v1"]),
        mock_manifest(server, "a", "v1", "2021-01-01T00:00:00Z"),
        mock_status(server, "/v2/b/tags/list", 404),
        mock_tags(server, "c", &["v1"]),
        mock_manifest(server, "c", "v1", "2022-01-01T00:00:00Z"),
    ]
}

fn names(records: &[ImageRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| format!("{}:{}", r.repository, r.tag))
        .collect()
}

#[test]
fn test_policy_default_is_skip() {
    assert_eq!(
        RepositoryFailurePolicy::default(),
        RepositoryFailurePolicy::SkipRepository
    );
}

#[test]
fn test_policy_from_continue_flag() {
    assert_eq!(
        RepositoryFailurePolicy::from_continue_flag(true),
        RepositoryFailurePolicy::SkipRepository
    );
    assert_eq!(
        RepositoryFailurePolicy::from_continue_flag(false),
        RepositoryFailurePolicy::Abort
    );
}

#[test]
fn test_policy_serde_names() {
    assert_eq!(
        serde_json::to_string(&RepositoryFailurePolicy::SkipRepository).unwrap(),
        r#""skip_repository""#
    );
    let policy: RepositoryFailurePolicy = serde_json::from_str(r#""abort""#).unwrap();
    assert_eq!(policy, RepositoryFailurePolicy::Abort);
}

#[test]
fn test_get_image_data_list_one_record_per_tag() {
    let mut server = Server::new();
    let _mocks = vec![
        mock_tags(&mut server, "app", &["v1", "v2", "v3"]),
        mock_manifest(&mut server, "app", "v1", "2020-01-01T00:00:00Z"),
        mock_manifest(&mut server, "app", "v2", "2020-02-01T00:00:00Z"),
        mock_manifest(&mut server, "app", "v3", "2020-03-01T00:00:00Z"),
    ];

    let client = client_for(&[&server], ClientConfig::new().with_concurrency(3));
    let records = client
        .get_image_data_list(&server.host_with_port(), "app")
        .unwrap();

    assert_eq!(names(&records), vec!["app:v1", "app:v2", "app:v3"]);
    assert_eq!(records[1].created_at.to_rfc3339(), "2020-02-01T00:00:00+00:00");
    assert!(records.iter().all(|r| r.hostname == server.host_with_port()));
}

#[test]
fn test_get_image_data_list_no_tags() {
    let mut server = Server::new();
    let _tags = server
        .mock("GET", "/v2/app/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"app","tags":null}"#)
        .create();

    let client = client_for(&[&server], ClientConfig::new());
    let records = client
        .get_image_data_list(&server.host_with_port(), "app")
        .unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_get_image_data_list_failing_tag_fails_repository() {
    let mut server = Server::new();
    let _mocks = vec![
        mock_tags(&mut server, "app", &["v1", "broken"]),
        mock_manifest(&mut server, "app", "v1", "2020-01-01T00:00:00Z"),
        mock_status(&mut server, "/v2/app/manifests/broken", 500),
    ];

    let client = client_for(&[&server], ClientConfig::new());
    let err = client
        .get_image_data_list(&server.host_with_port(), "app")
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
}

#[test]
fn test_get_image_data_list_uses_registry_reported_name() {
    let mut server = Server::new();
    let _tags = server
        .mock("GET", "/v2/App/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"app","tags":["v1"]}"#)
        .create();
    let _manifest = mock_manifest(&mut server, "app", "v1", "2020-01-01T00:00:00Z");

    let client = client_for(&[&server], ClientConfig::new());
    let records = client
        .get_image_data_list(&server.host_with_port(), "App")
        .unwrap();
    assert_eq!(names(&records), vec!["app:v1"]);
}

#[test]
fn test_skip_policy_drops_failing_repository() {
    let mut server = Server::new();
    let _mocks = registry_with_broken_repository(&mut server);

    let client = client_for(&[&server], ClientConfig::new());
    let records = client
        .get_repos_by_hostname(&server.host_with_port())
        .unwrap();

    assert_eq!(names(&records), vec!["a:v1", "c:v1"]);
}

#[test]
fn test_abort_policy_returns_repository_error() {
    let mut server = Server::new();
    let _mocks = registry_with_broken_repository(&mut server);

    let client = client_for(
        &[&server],
        ClientConfig::new().with_failure_policy(RepositoryFailurePolicy::Abort),
    );
    let err = client
        .get_repos_by_hostname(&server.host_with_port())
        .unwrap_err();

    assert_eq!(err.status_code(), Some(404));
}

#[test]
fn test_with_policy_overrides_client_config() {
    let mut server = Server::new();
    let _mocks = registry_with_broken_repository(&mut server);

    let client = client_for(&[&server], ClientConfig::new());
    let result = ImageAggregator::new(&client)
        .with_policy(RepositoryFailurePolicy::Abort)
        .get_repos_by_hostname(&server.host_with_port());
    assert!(result.is_err());
}

#[test]
fn test_abort_policy_reports_first_failure_in_catalog_order() {
    let mut server = Server::new();
    let _mocks = vec![
        mock_catalog(&mut server, &["a", "b", "c"]),
        mock_tags(&mut server, "a", &["v1"]),
        mock_manifest(&mut server, "a", "v1", "2021-01-01T00:00:00Z"),
        mock_status(&mut server, "/v2/b/tags/list", 403),
        mock_status(&mut server, "/v2/c/tags/list", 404),
    ];

    let client = client_for(
        &[&server],
        ClientConfig::new()
            .with_concurrency(4)
            .with_failure_policy(RepositoryFailurePolicy::Abort),
    );
    let err = client
        .get_repos_by_hostname(&server.host_with_port())
        .unwrap_err();
    assert_eq!(err.status_code(), Some(403));
}

#[test]
fn test_catalog_failure_is_returned_regardless_of_policy() {
    let mut server = Server::new();
    let _catalog = mock_status(&mut server, "/v2/_catalog", 401);

    let client = client_for(&[&server], ClientConfig::new());
    let err = client
        .get_repos_by_hostname(&server.host_with_port())
        .unwrap_err();
    assert_eq!(err.status_code(), Some(401));
}

#[test]
fn test_empty_catalog_yields_no_records() {
    let mut server = Server::new();
    let _catalog = mock_catalog(&mut server, &[]);

    let client = client_for(&[&server], ClientConfig::new());
    let records = client
        .get_repos_by_hostname(&server.host_with_port())
        .unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_order_preserved_with_parallel_workers() {
    let mut server = Server::new();
    let repositories = ["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7"];
    let mut mocks = vec![mock_catalog(&mut server, &repositories)];
    for repo in repositories {
        mocks.push(mock_tags(&mut server, repo, &["x", "y"]));
        mocks.push(mock_manifest(&mut server, repo, "x", "2020-01-01T00:00:00Z"));
        mocks.push(mock_manifest(&mut server, repo, "y", "2020-01-02T00:00:00Z"));
    }

    let client = client_for(&[&server], ClientConfig::new().with_concurrency(8));
    let records = client
        .get_repos_by_hostname(&server.host_with_port())
        .unwrap();

    let expected: Vec<String> = repositories
        .iter()
        .flat_map(|r| [format!("{}:x", r), format!("{}:y", r)])
        .collect();
    assert_eq!(names(&records), expected);
}

#[test]
fn test_single_worker_matches_parallel_result() {
    let mut server = Server::new();
    let _mocks = registry_with_broken_repository(&mut server);

    let client = client_for(&[&server], ClientConfig::new());
    let serial = ImageAggregator::new(&client)
        .with_concurrency(1)
        .get_repos_by_hostname(&server.host_with_port())
        .unwrap();
    let parallel = ImageAggregator::new(&client)
        .with_concurrency(8)
        .get_repos_by_hostname(&server.host_with_port())
        .unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn test_zero_concurrency_still_runs() {
    let mut server = Server::new();
    let _catalog = mock_catalog(&mut server, &[]);

    let client = client_for(&[&server], ClientConfig::new().with_concurrency(0));
    assert!(client.get_repos_by_hostname(&server.host_with_port()).is_ok());
}

#[test]
fn test_get_repos_combines_registries() {
    let mut first = Server::new();
    let mut second = Server::new();
    let _first_mocks = vec![
        mock_catalog(&mut first, &["app"]),
        mock_tags(&mut first, "app", &["v1"]),
        mock_manifest(&mut first, "app", "v1", "2020-01-01T00:00:00Z"),
    ];
    let _second_mocks = vec![
        mock_catalog(&mut second, &["tool"]),
        mock_tags(&mut second, "tool", &["latest"]),
        mock_manifest(&mut second, "tool", "latest", "2021-01-01T00:00:00Z"),
    ];

    let client = client_for(&[&first, &second], ClientConfig::new());
    let records = client.get_repos().unwrap();

    assert_eq!(records.len(), 2);

    let mut hosts: Vec<String> = vec![first.host_with_port(), second.host_with_port()];
    hosts.sort();
    let record_hosts: Vec<String> = records.iter().map(|r| r.hostname.clone()).collect();
    assert_eq!(record_hosts, hosts);

    let app = records.iter().find(|r| r.repository == "app").unwrap();
    assert_eq!(app.hostname, first.host_with_port());
    let tool = records.iter().find(|r| r.repository == "tool").unwrap();
    assert_eq!(tool.hostname, second.host_with_port());
}

#[test]
fn test_get_repos_fails_when_any_registry_fails() {
    let mut healthy = Server::new();
    let mut broken = Server::new();
    let _healthy_mocks = vec![
        mock_catalog(&mut healthy, &["app"]),
        mock_tags(&mut healthy, "app", &["v1"]),
        mock_manifest(&mut healthy, "app", "v1", "2020-01-01T00:00:00Z"),
    ];
    let _broken_catalog = mock_status(&mut broken, "/v2/_catalog", 503);

    let client = client_for(&[&healthy, &broken], ClientConfig::new());
    let err = client.get_repos().unwrap_err();
    assert_eq!(err.status_code(), Some(503));
}

#[test]
fn test_get_repos_skips_repository_but_keeps_registry() {
    let mut first = Server::new();
    let mut second = Server::new();
    let _first_mocks = registry_with_broken_repository(&mut first);
    let _second_mocks = vec![
        mock_catalog(&mut second, &["tool"]),
        mock_tags(&mut second, "tool", &["latest"]),
        mock_manifest(&mut second, "tool", "latest", "2021-01-01T00:00:00Z"),
    ];

    let client = client_for(&[&first, &second], ClientConfig::new());
    let records = client.get_repos().unwrap();

    let mut repos: Vec<String> = records.iter().map(|r| r.repository.clone()).collect();
    repos.sort();
    assert_eq!(repos, vec!["a", "c", "tool"]);
}
