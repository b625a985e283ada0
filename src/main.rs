use chrono::Local;
use clap::Parser;
use claps::{config::Config, info_time, process::process_site, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start_time = Local::now();
    let state = process_site(Config::parse()).await?;
    info_time!(
        start_time,
        "Full program time: {} authors, {} sections",
        state.authors.len(),
        state.language.len()
    );

    Ok(())
}
