//! callgen: stream a file's lines through a callback-driven generator.

use anyhow::Result;
use callgen_core::constants::exit_codes;
use callgen_lib::{app, config};

fn main() -> Result<()> {
    let config = config::AppConfig::parse();

    // Initialize tracing
    let level = if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let code = app::run(&config)?;
    if code != exit_codes::SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}
