//! Show Command Handler
//!
//! Reports catalog fields of every supported page, or of one page.

use std::io::{self, Write};
use tracing::info;

use super::{open_device, resolve_page};
use modeparm::config::Config;
use modeparm::display;
use modeparm::error::Result;
use modeparm::mode_page::{BatchExecutor, OutputFormat, ParameterCatalog, ReportOptions};

pub fn execute(
    device: Option<String>,
    all: bool,
    page: Option<String>,
    long: bool,
    json: bool,
    six: bool,
    config: &Config,
) -> Result<()> {
    let catalog = ParameterCatalog::standard();
    let options = ReportOptions {
        include_all: all,
        page: resolve_page(&catalog, page.as_deref())?,
        long,
        format: if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
    };

    let mut scsi = open_device(device, config, true)?;
    let mut executor = BatchExecutor::new(&mut scsi, catalog, six || config.six_byte_cdb);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !json {
        let identity = executor.identity()?;
        display::write_identity(&mut out, &identity)?;
    }
    executor.report(&options, &mut out)?;
    out.flush()?;

    info!("Report complete");
    Ok(())
}
