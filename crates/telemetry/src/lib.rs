//! Logging bootstrap: stdout plus an appending log file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use booklib_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber.
///
/// Fails when the log file cannot be opened, which aborts startup.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let mut layers: Vec<BoxedLayer> = vec![stdout_layer(&settings.log_format)];

    if let Some(path) = &settings.log_file {
        let file = open_log_file(path)?;
        layers.push(file_layer(file, &settings.log_format));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(level(settings))
        .try_init()
        .with_context(|| "failed to install tracing subscriber")?;

    tracing::debug!(
        target: "booklib-telemetry",
        log_file = ?settings.log_file,
        format = ?settings.log_format,
        "telemetry initialized"
    );

    Ok(())
}

/// `DEBUG` in debug mode, `INFO` otherwise.
pub fn level(settings: &TelemetrySettings) -> LevelFilter {
    if settings.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("fail to save log: {}", path.display()))
}

fn stdout_layer(format: &LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Pretty => fmt::layer().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    }
}

fn file_layer(file: File, format: &LogFormat) -> BoxedLayer {
    let writer = Mutex::new(file);
    match format {
        LogFormat::Pretty => fmt::layer().with_ansi(false).with_writer(writer).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}
