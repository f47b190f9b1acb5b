//! Tome Archive - interactive console

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tome_archive::{config::LoggingConfig, console::Console, AppConfig, Archive};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Held until exit so buffered log lines reach the file
    let _guard = init_tracing(&config.logging);

    tracing::info!("Starting Tome Archive v{}", env!("CARGO_PKG_VERSION"));

    let mut archive = Archive::from_config(&config.storage);

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(&mut archive, stdin.lock(), stdout.lock()).run()?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Install the global subscriber; the console owns stdout, so logs go to stderr or a file
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tome_archive={}", logging.level).into());

    match &logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or(path.as_os_str());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            install(filter, &logging.format, writer, false);
            Some(guard)
        }
        None => {
            install(filter, &logging.format, io::stderr, true);
            None
        }
    }
}

fn install<W>(filter: EnvFilter, format: &str, writer: W, ansi: bool)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(ansi).with_writer(writer))
            .init();
    }
}
