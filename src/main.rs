//! Compass Trader - a terminal assistant for pricing and listing
//! Path of Exile charged compasses.

use compass_trader::{App, Config, Result, config::log_dir};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // The TUI owns stdout, so logs go to a daily file.
    let file_appender = tracing_appender::rolling::daily(log_dir()?, "compass-trader.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "compass_trader=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    // Load configuration
    let config = Config::load_or_default()?;

    // Run the application
    let mut app = App::new(config).await?;
    app.run().await?;

    Ok(())
}
