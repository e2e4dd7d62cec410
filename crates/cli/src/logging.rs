//! Tracing subscriber setup.

use std::fs::{File, OpenOptions};
use std::sync::Mutex;

use souschef_config::LoggingConfig;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Install the global subscriber.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing::subscriber::set_global_default(build(config, verbose))
        .map_err(|e| format!("Failed to initialise logging: {e}").into())
}

/// `--verbose` forces `debug`; otherwise `RUST_LOG` wins over
/// `logging.level`. Output always goes to stderr, and additionally to
/// `logging.file` when it can be opened.
fn build(config: &LoggingConfig, verbose: bool) -> BoxedSubscriber {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match (open_log_file(config), config.json) {
        (Some(file), true) => Box::new(
            builder
                .json()
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .finish(),
        ),
        (Some(file), false) => Box::new(
            builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .finish(),
        ),
        (None, true) => Box::new(builder.json().with_writer(std::io::stderr).finish()),
        (None, false) => Box::new(builder.with_writer(std::io::stderr).finish()),
    }
}

fn open_log_file(config: &LoggingConfig) -> Option<File> {
    let path = config.file.as_ref()?;
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("  [warn] cannot open log file {}: {e}", path.display());
            None
        }
    }
}
