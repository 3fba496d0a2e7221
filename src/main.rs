use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use maildown::backend::HttpConnector;
use maildown::cli::{
    handle_config_command, handle_init_command, handle_send_command, handle_verify_command,
    report_validation, InitArgs, SendArgs, VerifyArgs,
};
use maildown::config::{FileConfigStore, MaildownPaths};
use maildown::render::Renderer;

/// Environment variable holding the log filter
const LOG_ENV: &str = "MAILDOWN_LOG";

#[derive(Parser)]
#[command(
    name = "maildown",
    version,
    about = "Send Markdown emails through a transactional email provider",
    long_about = "Maildown renders Markdown into styled HTML email, inlining the CSS \
                  theme into every element so it survives strict mail clients, and \
                  sends it through Amazon SES with the Markdown as the plain-text part."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and store provider credentials
    Init(InitArgs),

    /// Verify a sender email address
    Verify(VerifyArgs),

    /// Render and send a Markdown email
    Send(SendArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let paths = MaildownPaths::new()?;
    let store = FileConfigStore::new(paths.config_file());
    let connector = HttpConnector;
    let mut out = std::io::stdout().lock();

    let result = match command {
        Commands::Init(args) => handle_init_command(&paths, &store, &connector, args, &mut out),
        Commands::Verify(args) => handle_verify_command(&store, &connector, args, &mut out),
        Commands::Send(args) => {
            handle_send_command(&store, &connector, &Renderer::new(), args, &mut out)
        }
        Commands::Config => handle_config_command(&paths, &store, &mut out),
    };
    report_validation(result)?;

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,maildown=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
