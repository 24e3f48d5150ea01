use thiserror::Error;

use crate::scsi::TransportError;

pub type Result<T> = std::result::Result<T, ModeParmError>;

#[derive(Error, Debug)]
pub enum ModeParmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Catalog lookup error: {0}")]
    CatalogLookup(String),

    #[error("Range error: {0}")]
    Range(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{name} mode page is not savable, retry without --save")]
    NotSavable { name: String },

    #[error("{name} mode page not supported")]
    PageNotSupported { name: String },

    #[error("{command}({cdb_size}) rejected as invalid opcode, try {hint}")]
    CdbSizeMismatch {
        command: &'static str,
        cdb_size: u8,
        hint: &'static str,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl ModeParmError {
    pub fn usage<T: Into<String>>(msg: T) -> Self {
        Self::Usage(msg.into())
    }

    pub fn catalog_lookup<T: Into<String>>(msg: T) -> Self {
        Self::CatalogLookup(msg.into())
    }

    pub fn range<T: Into<String>>(msg: T) -> Self {
        Self::Range(msg.into())
    }

    pub fn malformed<T: Into<String>>(msg: T) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn unsupported<T: Into<String>>(msg: T) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn not_savable<T: Into<String>>(name: T) -> Self {
        Self::NotSavable { name: name.into() }
    }

    pub fn page_not_supported<T: Into<String>>(name: T) -> Self {
        Self::PageNotSupported { name: name.into() }
    }

    /// Invalid opcode for the CDB size that was used; suggests the other one.
    pub fn cdb_size_mismatch(command: &'static str, six_byte: bool) -> Self {
        if six_byte {
            Self::CdbSizeMismatch {
                command,
                cdb_size: 6,
                hint: "without --six",
            }
        } else {
            Self::CdbSizeMismatch {
                command,
                cdb_size: 10,
                hint: "--six",
            }
        }
    }
}
