use libbupkis::auth::MemoryCredentialStore;
use libbupkis::{
    BupkisError, ClientConfig, Config, Credential, ImageName, RegistryClient,
    RepositoryFailurePolicy,
};

const MANIFEST: &str = r#"{"schemaVersion":1,"history":[{"v1Compatibility":"{\"created\":\"2020-01-01T00:00:00Z\"}"}]}"#;

#[test]
fn test_version_is_set() {
    assert!(!libbupkis::version().is_empty());
}

#[test]
fn test_client_from_store() {
    let store = MemoryCredentialStore::new().with(Credential::new("r.example.com", "u", "p"));
    let client = RegistryClient::new(None, &store, ClientConfig::new()).unwrap();
    assert_eq!(client.hostnames().collect::<Vec<_>>(), vec!["r.example.com"]);
}

#[test]
fn test_client_from_config() {
    let config = Config::from_yaml_str("policy:\n  continue_on_repository_error: false\n").unwrap();
    let client_config = config.to_client_config();
    assert_eq!(
        client_config.repository_failure_policy,
        RepositoryFailurePolicy::Abort
    );

    let client = RegistryClient::from_credentials(Vec::new(), client_config).unwrap();
    assert_eq!(client.hostnames().count(), 0);
}

#[test]
fn test_image_name_parse() {
    let name: ImageName = "registry.example.com/ns/app:v1.2".parse().unwrap();
    assert_eq!(name.hostname, "registry.example.com");
    assert_eq!(name.repository, "ns/app");
    assert_eq!(name.tag, "v1.2");

    let err = "".parse::<ImageName>().unwrap_err();
    assert!(matches!(err, BupkisError::Protocol { .. }));
}

#[test]
fn test_list_one_registry() {
    let mut server = mockito::Server::new();
    let _catalog = server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories":["app"]}"#)
        .create();
    let _tags = server
        .mock("GET", "/v2/app/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"app","tags":["v1"]}"#)
        .create();
    let _manifest = server
        .mock("GET", "/v2/app/manifests/v1")
        .with_status(200)
        .with_body(MANIFEST)
        .create();

    let store = MemoryCredentialStore::new();
    let host = server.host_with_port();
    let client = RegistryClient::new(
        Some(&host),
        &store,
        ClientConfig::new().with_plain_http(true),
    )
    .unwrap();

    let images = client.get_repos().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].to_string(), format!("{}/app:v1", host));
    assert_eq!(images[0].created_at.to_rfc3339(), "2020-01-01T00:00:00+00:00");
}
