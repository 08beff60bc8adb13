mod devices;
mod monitor;

use devices::Vcgencmd;
use std::io::{self, Write};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Guard must live until exit or buffered log lines are lost
    let _guard = setup_logging();
    info!("Starting power stability monitor");

    let vc = Vcgencmd::new();
    let config = monitor::MonitorConfig::default();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", monitor::BANNER)?;

    match monitor::run_monitor(&vc, &config, &mut out) {
        Ok(Some(path)) => info!("Monitoring completed. Samples saved to: {}", path.display()),
        Ok(None) => info!("Monitoring completed without a CSV record"),
        Err(e) => {
            error!("Failed to write to standard output: {}", e);
            return Err(Box::new(e));
        }
    }

    info!("Application shutting down");
    Ok(())
}

fn setup_logging() -> WorkerGuard {
    // Daily rotated file in logs/, stdout stays reserved for readings
    let (non_blocking, guard) = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("power_monitor")
        .filename_suffix("log")
        .build("logs")
    {
        Ok(file_appender) => tracing_appender::non_blocking(file_appender),
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            tracing_appender::non_blocking(io::sink())
        }
    };

    fmt()
        .with_writer(non_blocking)
        .with_ansi(false) // Disable ANSI colors in log files
        .with_level(true)
        .init();

    guard
}
