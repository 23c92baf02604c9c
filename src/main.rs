//! Docent CLI Entry Point
//!
//! - `docent chunk <file>` - Show how a document is chunked
//! - `docent ask <file> <question>` - Answer one question about a document
//! - `docent chat <file>` - Answer questions read from stdin
//! - `docent notes <file>` - Generate course notes
//! - `docent config` - Show or validate the configuration

use docent::cli::{commands, Cli};
use docent::utils::toml_config::{DocentConfig, LogFormat};
use docent::Result;
use owo_colors::OwoColorize;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // Secrets referenced by api_key_env may live in .env
    dotenvy::dotenv().ok();

    let config = DocentConfig::load_or_default(&cli.config)?;
    init_logging(&config, cli.verbose);

    commands::run(cli, config).await
}

fn init_logging(config: &DocentConfig, verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so answers on stdout stay pipeable
    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
