use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, OutputFormat};
use libbupkis::{ImageRecord, RegistryClient};

/// Lists images on one registry, or on every registry with stored
/// credentials when `hostname` is `None`.
///
/// With a hostname, repositories that fail are handled by the configured
/// repository failure policy. Without one, any failing registry fails the
/// whole listing.
pub(crate) fn list_images(
    ctx: &AppContext,
    hostname: Option<&str>,
) -> Result<Vec<ImageRecord>, String> {
    let hostname = hostname.filter(|h| !h.is_empty());

    let store = ctx.credential_store()?;
    let client = RegistryClient::new(hostname, store.as_ref(), ctx.client_config())
        .map_err(|e| e.to_string())?;

    match hostname {
        Some(hostname) => {
            format::print(
                ctx,
                VerbosityLevel::Verbose,
                &format!("Listing images on {}", hostname),
            );
            client
                .get_repos_by_hostname(hostname)
                .map_err(|e| e.to_string())
        }
        None => {
            let hosts: Vec<&str> = client.hostnames().collect();
            format::print(
                ctx,
                VerbosityLevel::Verbose,
                &format!("Listing images on {} registries: {}", hosts.len(), hosts.join(", ")),
            );
            client.get_repos().map_err(|e| e.to_string())
        }
    }
}

/// Handle the `list` command
pub fn handle_list(ctx: &AppContext, hostname: Option<&str>, format: OutputFormat) {
    let spinner = format::spinner(ctx, "Listing images...");
    let result = list_images(ctx, hostname);
    if let Ok(records) = &result {
        tracing::debug!(count = records.len(), "listing complete");
    }
    spinner.finish_and_clear();

    match result {
        Ok(records) => super::print_images(ctx, &records, format),
        Err(e) => {
            format::error(ctx, &e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
