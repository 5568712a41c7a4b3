use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, OutputFormat};
use libbupkis::{ImageName, ImageRecord, RegistryClient};

/// Fetches the images named by `reference`.
///
/// A reference with a tag yields exactly one record; without a tag every
/// tag of the repository is listed.
pub(crate) fn get_images(ctx: &AppContext, reference: &str) -> Result<Vec<ImageRecord>, String> {
    let name = reference
        .parse::<ImageName>()
        .map_err(|e| e.to_string())?;

    let store = ctx.credential_store()?;
    let client = RegistryClient::new(Some(&name.hostname), store.as_ref(), ctx.client_config())
        .map_err(|e| e.to_string())?;

    let records = if name.has_tag() {
        format::print(
            ctx,
            VerbosityLevel::Verbose,
            &format!("Fetching manifest for {}", name),
        );
        vec![
            client
                .fetch_image_data(&name.hostname, &name.repository, &name.tag)
                .map_err(|e| e.to_string())?,
        ]
    } else {
        format::print(
            ctx,
            VerbosityLevel::Verbose,
            &format!("Listing tags of {}", name),
        );
        client
            .get_image_data_list(&name.hostname, &name.repository)
            .map_err(|e| e.to_string())?
    };

    Ok(records)
}

/// Handle the `get` command
pub fn handle_get(ctx: &AppContext, reference: &str, format: OutputFormat) {
    let spinner = format::spinner(ctx, &format!("Fetching {}...", reference));
    let result = get_images(ctx, reference);
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
#[path = "get_tests.rs"]
mod tests;
