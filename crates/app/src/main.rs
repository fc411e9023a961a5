use clap::Parser;
use client::reporting::{self, ReportingConfig};

mod commands;
mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = commands::Args::parse();
    let settings = settings::load(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "portal={level},client={level},formatting={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    reporting::install_panic_hook(ReportingConfig::for_mode(
        settings.reporting.access_token.clone(),
        &settings.app.mode,
    ));
    tracing::debug!(
        platform = settings.app.platform.as_str(),
        mode = %settings.app.mode,
        "settings loaded"
    );

    commands::run(args.command, &settings).await?;
    Ok(())
}
