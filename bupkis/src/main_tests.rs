use super::*;

#[test]
fn test_cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_get() {
    let cli = Cli::try_parse_from(["bupkis", "get", "registry.example.com/app:v1"]).unwrap();
    assert!(matches!(cli.command, Commands::Get { ref reference } if reference == "registry.example.com/app:v1"));
}

#[test]
fn test_parse_list_with_global_flags() {
    let cli = Cli::try_parse_from([
        "bupkis",
        "list",
        "localhost:5000",
        "--plain-http",
        "--strict",
        "--format",
        "json",
        "-vv",
    ])
    .unwrap();

    assert!(matches!(cli.command, Commands::List { hostname: Some(ref h) } if h == "localhost:5000"));
    assert_eq!(cli.verbose, 2);

    let overrides = cli.overrides();
    assert!(overrides.plain_http);
    assert!(overrides.strict);
    assert_eq!(overrides.format, Some(format::OutputFormat::Json));
    assert_eq!(overrides.color, None);
}

#[test]
fn test_parse_list_without_hostname() {
    let cli = Cli::try_parse_from(["bupkis", "ls"]).unwrap();
    assert!(matches!(cli.command, Commands::List { hostname: None }));
}

#[test]
fn test_parse_login() {
    let cli = Cli::try_parse_from([
        "bupkis",
        "login",
        "registry.example.com",
        "-u",
        "user",
        "--password-stdin",
    ])
    .unwrap();

    match cli.command {
        Commands::Login {
            hostname,
            username,
            password,
            password_stdin,
        } => {
            assert_eq!(hostname, "registry.example.com");
            assert_eq!(username.as_deref(), Some("user"));
            assert!(password.is_none());
            assert!(password_stdin);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_login_password_sources_conflict() {
    let result = Cli::try_parse_from([
        "bupkis",
        "login",
        "registry.example.com",
        "-p",
        "secret",
        "--password-stdin",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_get_requires_reference() {
    assert!(Cli::try_parse_from(["bupkis", "get"]).is_err());
}
