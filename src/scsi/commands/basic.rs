//! SCSI Basic Commands
//!
//! This module contains INQUIRY.

use tracing::debug;

use super::super::{
    constants::*, sense, DeviceIdentity, ScsiInterface, TransportError,
};

impl ScsiInterface {
    /// Standard INQUIRY (EVPD=0)
    pub fn inquiry(&self) -> std::result::Result<DeviceIdentity, TransportError> {
        debug!("Executing INQUIRY command");

        let alloc = alloc_lengths::INQUIRY;
        let cdb = [scsi_commands::INQUIRY, 0x00, 0x00, 0x00, alloc as u8, 0x00];

        let mut data_buffer = vec![0u8; alloc];
        let mut sense_buffer = [0u8; SENSE_INFO_LEN];

        let good = self.scsi_io_control(
            &cdb,
            Some(&mut data_buffer),
            SCSI_IOCTL_DATA_IN,
            &mut sense_buffer,
        )?;

        if !good {
            return Err(sense::classify(&sense_buffer));
        }

        let identity = DeviceIdentity::parse(&data_buffer)?;
        debug!(
            "INQUIRY completed: {} ({})",
            identity,
            identity.peripheral_type_text()
        );
        Ok(identity)
    }
}
