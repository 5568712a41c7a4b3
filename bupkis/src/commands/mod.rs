use crate::context::AppContext;
use crate::format::{self, OutputFormat};
use crate::image::images_to_rows;
use libbupkis::ImageRecord;

/// `get` command
pub mod get;

/// `list` command
pub mod list;

/// `login` and `logout` commands
pub mod login;

/// Version command handlers
pub mod version;

/// Prints records in the requested format, or a notice when there are none.
pub(crate) fn print_images(ctx: &AppContext, records: &[ImageRecord], format: OutputFormat) {
    let rows = images_to_rows(records);

    if rows.is_empty() && format == OutputFormat::Pretty {
        format::warning(ctx, "No images found.");
        return;
    }

    match format::render_rows(&rows, format) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            format::error(ctx, &e);
            std::process::exit(1);
        }
    }
}
