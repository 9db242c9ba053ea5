use std::{fs::File, path::Path, sync::Mutex};

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Send tracing output to `path`; `RUST_LOG` overrides the default filter.
pub(crate) fn init_file_logger(path: &Path, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,droplet=debug")
        } else {
            EnvFilter::new("warn,droplet=info")
        }
    });

    let file = File::create(path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
