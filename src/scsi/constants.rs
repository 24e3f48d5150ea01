// SCSI constant definitions
pub const SENSE_INFO_LEN: usize = 64;

// SCSI data direction
pub const SCSI_IOCTL_DATA_IN: u8 = 1;
pub const SCSI_IOCTL_DATA_OUT: u8 = 0;
pub const SCSI_IOCTL_DATA_UNSPECIFIED: u8 = 2;

// Define IOCTL_SCSI_PASS_THROUGH_DIRECT constant
#[cfg(windows)]
pub const IOCTL_SCSI_PASS_THROUGH_DIRECT: u32 = 0x0004D014;

// Linux sg driver (see scsi/sg.h)
#[cfg(target_os = "linux")]
pub const SG_IO: u32 = 0x2285;
#[cfg(target_os = "linux")]
pub const SG_DXFER_NONE: i32 = -1;
#[cfg(target_os = "linux")]
pub const SG_DXFER_TO_DEV: i32 = -2;
#[cfg(target_os = "linux")]
pub const SG_DXFER_FROM_DEV: i32 = -3;
#[cfg(target_os = "linux")]
pub const SG_DRIVER_SENSE: u16 = 0x08;

/// Default pass-through timeout; fixed for the whole invocation.
pub const DEFAULT_TIMEOUT_SECS: u32 = 60;

// SCSI Commands Module
pub mod scsi_commands {
    pub const INQUIRY: u8 = 0x12;
    pub const MODE_SELECT_6: u8 = 0x15;
    pub const MODE_SENSE_6: u8 = 0x1A;
    pub const MODE_SELECT_10: u8 = 0x55;
    pub const MODE_SENSE_10: u8 = 0x5A;
}

// SAM status codes
pub mod scsi_status {
    pub const GOOD: u8 = 0x00;
    pub const CHECK_CONDITION: u8 = 0x02;
}

pub mod alloc_lengths {
    /// Standard INQUIRY data
    pub const INQUIRY: usize = 36;
    /// Largest response that fits the one-byte mode data length of MODE SENSE(6)
    pub const MODE_SENSE_6: usize = 252;
    pub const MODE_SENSE_10: usize = 4096;
}

/// Mode parameter header lengths
pub const MODE_HEADER_LEN_6: usize = 4;
pub const MODE_HEADER_LEN_10: usize = 8;

/// Mode page header bits (byte 0)
pub const MODE_PAGE_PS: u8 = 0x80;
pub const MODE_PAGE_SPF: u8 = 0x40;
pub const MODE_PAGE_CODE_MASK: u8 = 0x3F;

/// MODE SELECT byte 1 flags
pub const MODE_SELECT_PF: u8 = 0x10;
pub const MODE_SELECT_SP: u8 = 0x01;
