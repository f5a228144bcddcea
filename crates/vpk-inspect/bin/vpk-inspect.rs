//! vpk-inspect binary entry point.
//!
//! Parses arguments, initializes logging on stderr and prints the rendered
//! report on stdout. Set `RUST_LOG=debug` to trace part resolution.

use anyhow::Result;
use vpk_inspect::{InspectConfig, run};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = InspectConfig::from_args();
    tracing::debug!("Configuration loaded: {:?}", config);

    let output = run(&config)?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
