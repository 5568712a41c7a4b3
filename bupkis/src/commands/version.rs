/// Builds the `version` output: CLI and library versions, then the registry
/// protocol this build speaks.
pub fn get_version_string() -> String {
    let lines = [
        format!("bupkis {}", env!("CARGO_PKG_VERSION")),
        format!("libbupkis {}", libbupkis::version()),
        "registry API: Docker Registry v2 (schema1 manifests)".to_string(),
    ];
    lines.join("\n")
}

pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
