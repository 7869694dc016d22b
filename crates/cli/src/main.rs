use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::Settings;

/// Operator CLI for the SHELF books API
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the merged OpenAPI document
    Openapi,
    /// Print the effective settings
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load SHELF settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            shelf_telemetry::init(&settings.telemetry)?;
            shelf_app::run(settings).await
        }
        Command::Openapi => {
            let app = shelf_app::App::bootstrap(settings).await?;
            let doc = serde_json::to_string_pretty(&app.openapi())
                .with_context(|| "failed to render OpenAPI document")?;
            println!("{}", doc);
            app.shutdown().await
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .with_context(|| "failed to render settings")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}
