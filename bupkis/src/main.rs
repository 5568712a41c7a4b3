use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod format;
mod image;

/// bupkis - Docker Registry image lister
///
/// Lists the images stored on one or more Docker Registry v2 endpoints,
/// with their tags and creation times.
#[derive(Parser, Debug)]
#[command(name = "bupkis")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    /// Output format: pretty, json, yaml
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Number of worker threads for repository and tag fan-out
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Talk plain HTTP instead of HTTPS
    #[arg(long, global = true)]
    plain_http: bool,

    /// Fail the listing when any repository cannot be read
    #[arg(long, global = true)]
    strict: bool,

    /// Configuration file
    #[arg(long, global = true, env = "BUPKIS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show an image, or every tag of a repository
    Get {
        /// Image reference: hostname/repository[:tag]
        reference: String,
    },
    /// List every image on a registry, or on every registry you are logged in to
    #[command(visible_alias = "ls")]
    List {
        /// Registry hostname (optional, defaults to all stored logins)
        hostname: Option<String>,
    },
    /// Log in to a registry
    Login {
        /// Registry hostname
        hostname: String,
        /// Username (will prompt if not provided)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long, conflicts_with = "password_stdin")]
        password: Option<String>,
        /// Read the password from stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// Log out from a registry
    Logout {
        /// Registry hostname
        hostname: String,
    },
    /// Display version information
    Version,
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    fn overrides(&self) -> context::CliOverrides {
        context::CliOverrides {
            config_path: self.config.clone(),
            color: self.color.as_deref().map(format::ColorChoice::from),
            format: self.format.as_deref().map(format::OutputFormat::from),
            timeout: self.timeout,
            concurrency: self.concurrency,
            plain_http: self.plain_http,
            strict: self.strict,
        }
    }
}

fn init_tracing(verbosity: context::VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.tracing_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let verbosity = context::VerbosityLevel::from_count(cli.verbose);
    init_tracing(verbosity);

    match &cli.command {
        Commands::Version => {
            commands::version::print_version();
            return;
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
            return;
        }
        _ => {}
    }

    // Build context with precedence: defaults > config file > env vars > CLI flags
    let ctx = match context::AppContext::build(cli.overrides(), verbosity) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };
    let output_format = ctx.output_format();

    match cli.command {
        Commands::Get { reference } => {
            commands::get::handle_get(&ctx, &reference, output_format);
        }
        Commands::List { hostname } => {
            commands::list::handle_list(&ctx, hostname.as_deref(), output_format);
        }
        Commands::Login {
            hostname,
            username,
            password,
            password_stdin,
        } => {
            commands::login::handle_login(
                &ctx,
                &hostname,
                username.as_deref(),
                password.as_deref(),
                password_stdin,
            );
        }
        Commands::Logout { hostname } => {
            commands::login::handle_logout(&ctx, &hostname);
        }
        Commands::Version | Commands::Completion { .. } => {}
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
