use super::*;

#[test]
fn test_parse_with_namespace_and_tag() {
    let name = ImageName::parse("registry.example.com/ns/app:v1.2").unwrap();
    assert_eq!(name.hostname, "registry.example.com");
    assert_eq!(name.repository, "ns/app");
    assert_eq!(name.tag, "v1.2");
    assert!(name.has_tag());
}

#[test]
fn test_parse_without_tag() {
    let name = ImageName::parse("registry.example.com/app").unwrap();
    assert_eq!(name.hostname, "registry.example.com");
    assert_eq!(name.repository, "app");
    assert_eq!(name.tag, "");
    assert!(!name.has_tag());
}

#[test]
fn test_parse_hostname_with_port() {
    let name = ImageName::parse("localhost:5000/app:v1").unwrap();
    assert_eq!(name.hostname, "localhost:5000");
    assert_eq!(name.repository, "app");
    assert_eq!(name.tag, "v1");
}

#[test]
fn test_parse_port_is_not_a_tag() {
    let name = ImageName::parse("localhost:5000/team/app").unwrap();
    assert_eq!(name.hostname, "localhost:5000");
    assert_eq!(name.repository, "team/app");
    assert!(!name.has_tag());
}

#[test]
fn test_parse_deep_repository() {
    let name = ImageName::parse("r.example.com/a/b/c:latest").unwrap();
    assert_eq!(name.repository, "a/b/c");
    assert_eq!(name.tag, "latest");
}

#[test]
fn test_parse_trims_whitespace() {
    let name: ImageName = "  r.example.com/app:v1 \n".parse().unwrap();
    assert_eq!(name.repository, "app");
    assert_eq!(name.tag, "v1");
}

#[test]
fn test_parse_empty_fails() {
    let err = ImageName::parse("").unwrap_err();
    assert!(matches!(err, BupkisError::Protocol { .. }));
    assert!(err.to_string().contains("malformed image reference"));

    assert!(ImageName::parse("   ").is_err());
}

#[test]
fn test_parse_hostname_only_fails() {
    let err = ImageName::parse("registry.example.com").unwrap_err();
    assert!(matches!(err, BupkisError::Protocol { .. }));
}

#[test]
fn test_parse_empty_segments_fail() {
    assert!(ImageName::parse("registry.example.com/").is_err());
    assert!(ImageName::parse("/app").is_err());
    assert!(ImageName::parse("registry.example.com//app").is_err());
    assert!(ImageName::parse("registry.example.com/:v1").is_err());
    assert!(ImageName::parse("registry.example.com/app:").is_err());
}

#[test]
fn test_display() {
    let name = ImageName::parse("registry.example.com/ns/app:v1.2").unwrap();
    assert_eq!(name.to_string(), "registry.example.com/ns/app:v1.2");

    let name = ImageName::parse("localhost:5000/app").unwrap();
    assert_eq!(name.to_string(), "localhost:5000/app");
}
