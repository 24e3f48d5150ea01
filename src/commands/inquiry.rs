//! Inquiry Command Handler

use std::io::{self, Write};

use super::open_device;
use modeparm::config::Config;
use modeparm::display;
use modeparm::error::Result;

pub fn execute(device: Option<String>, config: &Config) -> Result<()> {
    let scsi = open_device(device, config, true)?;
    let identity = scsi.inquiry()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    display::write_identity(&mut out, &identity)?;
    writeln!(
        out,
        "    Peripheral qualifier: {}, device type: 0x{:02x}",
        identity.peripheral_qualifier, identity.peripheral_type
    )?;
    Ok(())
}
