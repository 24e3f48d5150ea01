use serde::Serialize;
use std::fmt;

use super::sense::TransportError;

/// Page Control (PC) field of MODE SENSE, byte 2 bits 7..6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PageControl {
    Current = 0,
    Changeable = 1,
    Default = 2,
    Saved = 3,
}

impl PageControl {
    pub const ALL: [PageControl; 4] = [
        PageControl::Current,
        PageControl::Changeable,
        PageControl::Default,
        PageControl::Saved,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Bit used for this variant in an availability mask
    pub fn mask_bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn description(&self) -> &'static str {
        match self {
            PageControl::Current => "current",
            PageControl::Changeable => "changeable",
            PageControl::Default => "default",
            PageControl::Saved => "saved",
        }
    }
}

/// Peripheral device type text (see `inquiry` command)
///
/// see <https://en.wikipedia.org/wiki/SCSI_Peripheral_Device_Type>
pub const PERIPHERAL_DEVICE_TYPE_TEXT: [&str; 32] = [
    "Disk Drive",
    "Tape Drive",
    "Printer",
    "Processor",
    "Write-once",
    "CD-ROM", // 05h
    "Scanner",
    "Optical",
    "Medium Changer", // 08h
    "Communications",
    "ASC IT8",
    "ASC IT8",
    "RAID Array",
    "Enclosure Services",
    "Simplified direct-access",
    "Optical card reader/writer",
    "Bridging Expander",
    "Object-based Storage",
    "Automation/Drive Interface",
    "Security manager",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Unknown",
];

/// Identity decoded from standard INQUIRY data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub peripheral_qualifier: u8,
    pub peripheral_type: u8,
    pub vendor: String,
    pub product: String,
    pub revision: String,
}

impl DeviceIdentity {
    /// Decode standard INQUIRY data. Short responses leave the trailing
    /// strings empty.
    pub fn parse(data: &[u8]) -> std::result::Result<Self, TransportError> {
        if data.is_empty() {
            return Err(TransportError::NoData);
        }

        Ok(Self {
            peripheral_qualifier: data[0] >> 5,
            peripheral_type: data[0] & 0x1F,
            vendor: ascii_field(data, 8, 16),
            product: ascii_field(data, 16, 32),
            revision: ascii_field(data, 32, 36),
        })
    }

    pub fn peripheral_type_text(&self) -> &'static str {
        PERIPHERAL_DEVICE_TYPE_TEXT[(self.peripheral_type & 0x1F) as usize]
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8}  {:<16}  {:<4}", self.vendor, self.product, self.revision)
    }
}

fn ascii_field(data: &[u8], start: usize, end: usize) -> String {
    if data.len() <= start {
        return String::new();
    }
    let end = end.min(data.len());
    data[start..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { ' ' })
        .collect::<String>()
        .trim()
        .to_string()
}
