use super::*;

#[test]
fn test_version_string_names_both_crates() {
    let output = get_version_string();
    assert!(output.starts_with("bupkis "));
    assert!(output.contains("\nlibbupkis "));
}

#[test]
fn test_version_string_contains_version_number() {
    assert!(get_version_string().contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_string_names_registry_protocol() {
    let output = get_version_string();
    assert_eq!(output.lines().count(), 3);
    assert!(output.lines().last().unwrap().contains("Registry v2"));
}
