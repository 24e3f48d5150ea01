//! Command handlers, one module per subcommand

pub mod defaults;
pub mod get;
pub mod inquiry;
pub mod list;
pub mod set;
pub mod show;

use tracing::debug;

use modeparm::config::Config;
use modeparm::error::Result;
use modeparm::mode_page::{parse_page_selector, PageId, ParameterCatalog};
use modeparm::scsi::ScsiInterface;

/// Open `device` (or the configured default) for pass-through
pub(crate) fn open_device(
    device: Option<String>,
    config: &Config,
    read_only: bool,
) -> Result<ScsiInterface> {
    let path = config.resolve_device(device)?;
    let mut scsi = ScsiInterface::new(config.timeout_secs);
    scsi.open_device(&path, read_only)?;
    debug!("Opened {} (read only: {})", path, read_only);
    Ok(scsi)
}

pub(crate) fn resolve_page(
    catalog: &ParameterCatalog,
    selector: Option<&str>,
) -> Result<Option<PageId>> {
    selector
        .map(|s| parse_page_selector(catalog, s))
        .transpose()
}
