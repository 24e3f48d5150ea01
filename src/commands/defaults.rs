//! Defaults Command Handler

use tracing::info;

use super::{open_device, set::print_parameter_list};
use modeparm::config::Config;
use modeparm::error::Result;
use modeparm::mode_page::{parse_page_selector, BatchExecutor, ParameterCatalog, WriteOptions};

pub fn execute(
    page: String,
    device: Option<String>,
    save: bool,
    dummy: bool,
    six: bool,
    config: &Config,
) -> Result<()> {
    let catalog = ParameterCatalog::standard();
    let page_id = parse_page_selector(&catalog, &page)?;
    let options = WriteOptions {
        save,
        dry_run: dummy,
    };

    let mut scsi = open_device(device, config, dummy)?;
    let mut executor = BatchExecutor::new(&mut scsi, catalog, six || config.six_byte_cdb);
    let param_list = executor.defaults(page_id, &options)?;

    if dummy {
        print_parameter_list(&param_list)?;
    } else {
        info!("Restored default values of {}", catalog.page_label(page_id));
    }
    Ok(())
}
