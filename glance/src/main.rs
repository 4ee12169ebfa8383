//! Glance CLI - describe an image with a vision model.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glance::config::{GlanceConfig, config_path};
use glance::{ImageFormat, OpenAI, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Ask an OpenAI-compatible vision model what is in an image
#[derive(Parser)]
#[command(name = "glance")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Image file to describe
    image: Option<PathBuf>,

    /// Prompt sent with the image
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// API base URL (e.g. http://localhost:8000/v1)
    #[arg(long)]
    base_url: Option<String>,

    /// Image format declared in the data URL (jpeg, png, gif, webp)
    #[arg(short, long)]
    format: Option<ImageFormat>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Configuration file path
    #[arg(short, long, env = "GLANCE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "glance={level},{}",
            if verbosity >= 2 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .init();
}

/// Resolve configuration and describe the image.
async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config_path);
    let mut config = GlanceConfig::load_from(&path).await?.with_env();

    if let Some(image) = cli.image {
        config = config.with_image(image);
    }
    if let Some(prompt) = cli.prompt {
        config = config.with_prompt(prompt);
    }
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(format) = cli.format {
        config = config.with_format(format);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(secs);
    }

    let client = OpenAI::from_config(&config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    glance::run(&config, &client, &mut out).await
}
