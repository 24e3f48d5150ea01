//! Set/Clear Command Handler
//!
//! Both write one page: set stores the given values, clear stores zeros.

use std::io::{self, Write};
use tracing::info;

use super::{open_device, resolve_page};
use modeparm::config::Config;
use modeparm::display;
use modeparm::error::Result;
use modeparm::mode_page::{build_batch, BatchExecutor, BatchMode, ParameterCatalog, WriteOptions};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    mode: BatchMode,
    fields: String,
    device: Option<String>,
    page: Option<String>,
    save: bool,
    dummy: bool,
    six: bool,
    config: &Config,
) -> Result<()> {
    let catalog = ParameterCatalog::standard();
    let page_id = resolve_page(&catalog, page.as_deref())?;
    let batch = build_batch(&catalog, &fields, mode, page_id)?;
    let options = WriteOptions {
        save,
        dry_run: dummy,
    };

    let mut scsi = open_device(device, config, dummy)?;
    let mut executor = BatchExecutor::new(&mut scsi, catalog, six || config.six_byte_cdb);
    let param_list = executor.set(&batch, &options)?;

    if dummy {
        print_parameter_list(&param_list)?;
    } else {
        info!(
            "Updated {} field(s) of {}",
            batch.len(),
            catalog.page_label(batch.page_id())
        );
    }
    Ok(())
}

/// Hex dump of a MODE SELECT parameter list that was not sent
pub(crate) fn print_parameter_list(param_list: &[u8]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "MODE SELECT parameter list ({} bytes, not sent):",
        param_list.len()
    )?;
    display::write_hex_dump(&mut out, param_list)?;
    out.flush()?;
    Ok(())
}
