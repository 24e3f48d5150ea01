//! SCSI Sense Data Parsing
//!
//! This module handles parsing and interpretation of SCSI sense data, and the
//! error outcomes the transport reports to the mode page layer.

use thiserror::Error;
use tracing::debug;

//  SENSE KEYS
pub const SENSE_KEY_NO_SENSE: u8 = 0x00;
pub const SENSE_KEY_RECOVERED_ERROR: u8 = 0x01;
pub const SENSE_KEY_NOT_READY: u8 = 0x02;
pub const SENSE_KEY_ILLEGAL_REQUEST: u8 = 0x05;
pub const SENSE_KEY_UNIT_ATTENTION: u8 = 0x06;

/// ASC for INVALID COMMAND OPERATION CODE
pub const ASC_INVALID_OPCODE: u8 = 0x20;

/// Sense Key Descriptions
pub const SENSE_KEY_DESCRIPTIONS: [&str; 16] = [
    "No Sense",
    "Recovered Error",
    "Not Ready",
    "Medium Error",
    "Hardware Error",
    "Illegal Request",
    "Unit Attention",
    "Data Protect",
    "Blank Check",
    "Vendor specific",
    "Copy Aborted",
    "Aborted Command",
    "Equal",
    "Volume Overflow",
    "Miscompare",
    "Completed",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseInfo {
    pub sense_key: u8,
    pub asc: u8,
    pub ascq: u8,
}

impl std::fmt::Display for SenseInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sense_text = SENSE_KEY_DESCRIPTIONS[(self.sense_key & 0x0F) as usize];

        if self.asc == 0 && self.ascq == 0 {
            write!(f, "{}", sense_text)
        } else {
            match additional_sense_text(self.asc, self.ascq) {
                Some(text) => write!(f, "{}, {}", sense_text, text),
                None => write!(
                    f,
                    "{}, ASC/ASCQ: 0x{:02X}/0x{:02X}",
                    sense_text, self.asc, self.ascq
                ),
            }
        }
    }
}

/// Outcomes of a pass-through command other than plain success
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid command operation code ({0})")]
    InvalidOpcode(SenseInfo),

    #[error("illegal request ({0})")]
    IllegalRequest(SenseInfo),

    #[error("recovered error with no data ({0})")]
    Recovered(SenseInfo),

    #[error("{0}")]
    Sense(SenseInfo),

    #[error("SCSI status 0x{0:02X}")]
    Status(u8),

    #[error("device returned no data")]
    NoData,

    #[error("device not opened")]
    NotOpen,

    #[error("parameter list of {0} bytes too long for this CDB")]
    ParameterListTooLong(usize),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Unsupported(String),
}

/// Decode fixed (0x70/0x71) or descriptor (0x72/0x73) format sense data.
pub fn parse_sense(sense_data: &[u8]) -> Option<SenseInfo> {
    if sense_data.is_empty() {
        return None;
    }

    let response_code = sense_data[0] & 0x7F;
    let info = match response_code {
        0x70 | 0x71 => {
            if sense_data.len() < 3 {
                return None;
            }
            SenseInfo {
                sense_key: sense_data[2] & 0x0F,
                asc: sense_data.get(12).copied().unwrap_or(0),
                ascq: sense_data.get(13).copied().unwrap_or(0),
            }
        }
        0x72 | 0x73 => {
            if sense_data.len() < 2 {
                return None;
            }
            SenseInfo {
                sense_key: sense_data[1] & 0x0F,
                asc: sense_data.get(2).copied().unwrap_or(0),
                ascq: sense_data.get(3).copied().unwrap_or(0),
            }
        }
        _ => return None,
    };

    debug!(
        "Sense data - Key: 0x{:02X}, ASC: 0x{:02X}, ASCQ: 0x{:02X}",
        info.sense_key, info.asc, info.ascq
    );
    Some(info)
}

/// Map a CHECK CONDITION to the transport error taxonomy.
pub fn classify(sense_data: &[u8]) -> TransportError {
    match parse_sense(sense_data) {
        Some(info) => match info.sense_key {
            SENSE_KEY_ILLEGAL_REQUEST if info.asc == ASC_INVALID_OPCODE => {
                TransportError::InvalidOpcode(info)
            }
            SENSE_KEY_ILLEGAL_REQUEST => TransportError::IllegalRequest(info),
            SENSE_KEY_RECOVERED_ERROR => TransportError::Recovered(info),
            _ => TransportError::Sense(info),
        },
        None => TransportError::Status(super::constants::scsi_status::CHECK_CONDITION),
    }
}

fn additional_sense_text(asc: u8, ascq: u8) -> Option<&'static str> {
    let text = match (asc, ascq) {
        (0x04, 0x00) => "logical unit not ready, cause not reportable",
        (0x04, 0x01) => "logical unit is in process of becoming ready",
        (0x1A, 0x00) => "parameter list length error",
        (0x20, 0x00) => "invalid command operation code",
        (0x24, 0x00) => "invalid field in cdb",
        (0x25, 0x00) => "logical unit not supported",
        (0x26, 0x00) => "invalid field in parameter list",
        (0x26, 0x01) => "parameter not supported",
        (0x26, 0x02) => "parameter value invalid",
        (0x28, 0x00) => "not ready to ready change, medium may have changed",
        (0x29, _) => "power on, reset, or bus device reset occurred",
        (0x2A, 0x01) => "mode parameters changed",
        (0x39, 0x00) => "saving parameters not supported",
        (0x3A, _) => "medium not present",
        _ => return None,
    };
    Some(text)
}
