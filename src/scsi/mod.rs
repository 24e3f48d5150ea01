//! SCSI pass-through transport
//!
//! [`ScsiTransport`] is the narrow interface the mode page layer talks to;
//! [`ScsiInterface`] implements it on top of the platform pass-through
//! (SG_IO on Linux, SCSI_PASS_THROUGH_DIRECT on Windows).

pub mod commands;
pub mod constants;
pub mod core;
pub mod device;
pub mod ffi;
pub mod sense;
pub mod types;

pub use self::core::ScsiInterface;
pub use constants::*;
pub use ffi::ScsiPassThroughDirect;
pub use sense::{SenseInfo, TransportError};
pub use types::{DeviceIdentity, PageControl};

/// Operations the mode page layer needs from a device.
pub trait ScsiTransport {
    /// MODE SENSE for one page control variant. Returns the full response:
    /// mode parameter header, block descriptors and the page.
    fn mode_sense(
        &mut self,
        page: u8,
        subpage: u8,
        pc: PageControl,
        six_byte: bool,
    ) -> std::result::Result<Vec<u8>, TransportError>;

    /// MODE SELECT with a complete parameter list (header, block descriptors, page).
    fn mode_select(
        &mut self,
        param_list: &[u8],
        save: bool,
        six_byte: bool,
    ) -> std::result::Result<(), TransportError>;

    fn inquiry(&mut self) -> std::result::Result<DeviceIdentity, TransportError>;
}

impl ScsiTransport for ScsiInterface {
    fn mode_sense(
        &mut self,
        page: u8,
        subpage: u8,
        pc: PageControl,
        six_byte: bool,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        ScsiInterface::mode_sense(self, page, subpage, pc, six_byte)
    }

    fn mode_select(
        &mut self,
        param_list: &[u8],
        save: bool,
        six_byte: bool,
    ) -> std::result::Result<(), TransportError> {
        ScsiInterface::mode_select(self, param_list, save, six_byte)
    }

    fn inquiry(&mut self) -> std::result::Result<DeviceIdentity, TransportError> {
        ScsiInterface::inquiry(self)
    }
}
