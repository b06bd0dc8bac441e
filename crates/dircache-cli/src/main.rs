//! Dircache lookup binary.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dircache_cli::{Lookup, build_service, config_path, run};
use dircache_core::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let lookup = Lookup::parse();

    let path = config_path();
    let settings = Settings::load(Some(&path))?;

    // Initialize tracing
    let default_level = if settings.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting dircache v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Settings file: {}", path.display());
    tracing::info!("Cache timeout: {} minutes", settings.cache_timeout);

    let service = build_service(&settings)?;

    match run(&service, &lookup).await? {
        Some(record) => println!("{}", serde_json::to_string_pretty(record.as_ref())?),
        None => {
            eprintln!("not found");
            std::process::exit(1);
        },
    }

    Ok(())
}
