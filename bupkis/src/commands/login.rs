use crate::context::{AppContext, VerbosityLevel};
use crate::format;
use libbupkis::{Credential, RegistryClient};
use std::io::{self, BufRead, Read, Write};

/// Prompt for username if not provided
fn prompt_username(provided_username: Option<&str>) -> Result<String, String> {
    match provided_username {
        Some(username) => Ok(username.to_string()),
        None => {
            print!("Username: ");
            io::stdout()
                .flush()
                .map_err(|e| format!("Failed to flush stdout: {}", e))?;

            let mut username = String::new();
            io::stdin()
                .lock()
                .read_line(&mut username)
                .map_err(|e| format!("Failed to read username: {}", e))?;

            Ok(username.trim().to_string())
        }
    }
}

/// Reads a password piped on stdin, dropping the trailing newline
pub(crate) fn read_password_from<R: Read>(mut reader: R) -> Result<String, String> {
    let mut password = String::new();
    reader
        .read_to_string(&mut password)
        .map_err(|e| format!("Failed to read password from stdin: {}", e))?;

    let password = password.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err("Password required: stdin was empty".to_string());
    }
    Ok(password)
}

/// Resolve the password from the flag, stdin or an interactive prompt
fn resolve_password(provided_password: Option<&str>, from_stdin: bool) -> Result<String, String> {
    match (provided_password, from_stdin) {
        (Some(_), true) => {
            Err("--password and --password-stdin are mutually exclusive".to_string())
        }
        (Some(password), false) => Ok(password.to_string()),
        (None, true) => read_password_from(io::stdin().lock()),
        (None, false) => rpassword::prompt_password("Password: ")
            .map_err(|e| format!("Failed to read password: {}", e)),
    }
}

/// Gathers username and password from flags, stdin and prompts
fn collect_credentials(
    username: Option<&str>,
    password: Option<&str>,
    password_stdin: bool,
) -> Result<(String, String), String> {
    if password_stdin && username.is_none() {
        return Err("--password-stdin requires --username".to_string());
    }
    let username = prompt_username(username)?;
    let password = resolve_password(password, password_stdin)?;
    Ok((username, password))
}

/// Verifies a credential against `GET /v2/` and stores it on success.
pub(crate) fn login_registry(
    ctx: &AppContext,
    hostname: &str,
    username: &str,
    password: &str,
) -> Result<(), String> {
    if hostname.is_empty() {
        return Err("Registry hostname is required".to_string());
    }
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    let credential = Credential::new(hostname, username, password);

    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Verifying credentials for {}...", hostname),
    );
    let client = RegistryClient::from_credentials(vec![credential.clone()], ctx.client_config())
        .map_err(|e| e.to_string())?;

    client.check(hostname).map_err(|e| match e.status_code() {
        Some(401) => "Authentication failed. Please check your username and password.".to_string(),
        Some(403) => {
            "Access forbidden. Your credentials may not have the required permissions.".to_string()
        }
        _ => format!("Failed to verify credentials: {}", e),
    })?;

    let mut store = ctx.credential_store()?;
    tracing::debug!(hostname, username, "storing verified credential");
    store
        .store(&credential)
        .map_err(|e| format!("Failed to store credentials: {}", e))
}

/// Removes the stored credential for `hostname`. Returns whether one existed.
pub(crate) fn logout_registry(ctx: &AppContext, hostname: &str) -> Result<bool, String> {
    let mut store = ctx.credential_store()?;

    let existed = store
        .credential_for(hostname)
        .map_err(|e| e.to_string())?
        .is_some();

    tracing::debug!(hostname, existed, "removing stored credential");
    store
        .remove(hostname)
        .map_err(|e| format!("Failed to remove credentials: {}", e))?;

    Ok(existed)
}

/// Handle the `login` command
pub fn handle_login(
    ctx: &AppContext,
    hostname: &str,
    username: Option<&str>,
    password: Option<&str>,
    password_stdin: bool,
) {
    let credentials = collect_credentials(username, password, password_stdin);

    let result = credentials
        .and_then(|(username, password)| login_registry(ctx, hostname, &username, &password));

    match result {
        Ok(()) => format::success(ctx, "Login Succeeded"),
        Err(e) => {
            format::error(ctx, &e);
            std::process::exit(1);
        }
    }
}

/// Handle the `logout` command
pub fn handle_logout(ctx: &AppContext, hostname: &str) {
    match logout_registry(ctx, hostname) {
        Ok(true) => format::success(ctx, &format!("Removed login credentials for {}", hostname)),
        Ok(false) => format::warning(ctx, &format!("Not logged in to {}", hostname)),
        Err(e) => {
            format::error(ctx, &e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
