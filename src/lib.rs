//! modeparm Library
//!
//! Query and change SCSI mode page parameters by name: a catalog of named
//! fields in the generic mode pages, a big-endian bit-field codec, a small
//! field batch language, and MODE SENSE/MODE SELECT over the platform SCSI
//! pass-through.

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logger;
pub mod mode_page;
pub mod scsi;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export key types for easier use
pub use error::{ModeParmError, Result};
pub use mode_page::{
    build_batch, BatchExecutor, BatchMode, FieldValue, PageId, ParameterBatch, ParameterCatalog,
    ParameterDescriptor,
};
pub use scsi::{DeviceIdentity, PageControl, ScsiInterface, ScsiTransport, TransportError};
