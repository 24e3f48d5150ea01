use crate::error::{ModeParmError, Result};
use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(verbose: bool, json: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(false)
            .with_writer(io::stderr);
        registry.with(fmt_layer).try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(io::stderr);
        registry.with(fmt_layer).try_init()
    };

    result.map_err(|e| ModeParmError::config(format!("cannot install logger: {}", e)))
}
