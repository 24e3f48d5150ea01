//! Get Command Handler

use std::io::{self, Write};

use super::{open_device, resolve_page};
use modeparm::config::Config;
use modeparm::display;
use modeparm::error::Result;
use modeparm::mode_page::{
    build_batch, BatchExecutor, BatchMode, GetOptions, OutputFormat, ParameterCatalog,
};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    fields: String,
    device: Option<String>,
    page: Option<String>,
    long: bool,
    hex: bool,
    json: bool,
    six: bool,
    config: &Config,
) -> Result<()> {
    let catalog = ParameterCatalog::standard();
    let page_id = resolve_page(&catalog, page.as_deref())?;
    // parse everything before touching the device
    let batch = build_batch(&catalog, &fields, BatchMode::Get, page_id)?;
    let options = GetOptions {
        long,
        format: match (json, hex) {
            (true, _) => OutputFormat::Json,
            (false, true) => OutputFormat::Hex,
            (false, false) => OutputFormat::Text,
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
    executor.get(&batch, &options, &mut out)?;
    out.flush()?;
    Ok(())
}
