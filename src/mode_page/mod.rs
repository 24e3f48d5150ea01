//! Mode page parameter model
//!
//! Named bit-fields within SCSI mode pages ([`catalog`]), the big-endian
//! bit-field codec ([`bitfield`]), page fetch and write-back ([`accessor`]),
//! the field batch mini-language ([`batch`]) and the command intents built
//! on top of them ([`executor`]).

pub mod accessor;
pub mod batch;
pub mod bitfield;
pub mod catalog;
pub mod executor;

#[cfg(test)]
pub mod testing;

pub use accessor::{ModePageAccessor, ModePageImage, PageVariants};
pub use batch::{
    build_batch, parse_page_selector, parse_value, BatchBuilder, BatchMode, FieldValue,
    ParameterBatch, ParameterValueAssignment,
};
pub use catalog::{ModePageInfo, PageId, ParameterCatalog, ParameterDescriptor};
pub use executor::{BatchExecutor, GetOptions, OutputFormat, ReportOptions, WriteOptions};
