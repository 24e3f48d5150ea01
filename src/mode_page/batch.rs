//! Field batch mini-language
//!
//! A batch is a comma separated list of `ACRONYM[=value]` or
//! `byte:bit:width[=value]` tokens that all address one mode page.

use tracing::{debug, warn};

use super::bitfield::{self, MAX_FIELD_BITS};
use super::catalog::{PageId, ParameterCatalog, ParameterDescriptor};
use crate::error::{ModeParmError, Result};
use crate::utils::{parse_hex, parse_number};

/// Most assignments one batch may hold
pub const MAX_BATCH: usize = 128;

/// Highest page code a selector may name (0x3f is "all pages")
pub const MAX_PAGE_CODE: u8 = 0x3E;

/// Longest page a device can return: a subpage header plus a 16 bit length
const MAX_PAGE_LEN: u64 = 0xFFFF + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Get,
    Set,
    Clear,
}

/// A value to place in a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Explicit(u32),
    /// `-1` on the command line
    AllBitsSet,
}

impl FieldValue {
    /// Raw bits for a field of `num_bits`
    pub fn resolve(self, num_bits: u8) -> u32 {
        match self {
            FieldValue::Explicit(v) => v,
            FieldValue::AllBitsSet => bitfield::all_ones(num_bits),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterValueAssignment {
    pub descriptor: ParameterDescriptor,
    pub value: FieldValue,
}

/// Assignments that all target one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBatch {
    page_id: PageId,
    assignments: Vec<ParameterValueAssignment>,
}

impl ParameterBatch {
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn assignments(&self) -> &[ParameterValueAssignment] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Builds a [`ParameterBatch`] one token at a time
pub struct BatchBuilder<'c> {
    catalog: &'c ParameterCatalog,
    mode: BatchMode,
    page_id: Option<PageId>,
    assignments: Vec<ParameterValueAssignment>,
}

impl<'c> BatchBuilder<'c> {
    /// `page_selector` establishes the page up front; without it the first
    /// named field does.
    pub fn new(catalog: &'c ParameterCatalog, mode: BatchMode, page_selector: Option<PageId>) -> Self {
        Self {
            catalog,
            mode,
            page_id: page_selector,
            assignments: Vec::new(),
        }
    }

    pub fn push_token(&mut self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ModeParmError::usage("empty field in list"));
        }
        if self.assignments.len() >= MAX_BATCH {
            return Err(ModeParmError::usage(format!(
                "too many fields, at most {} per command",
                MAX_BATCH
            )));
        }

        let (name, value_text) = match token.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (token, None),
        };
        if name.is_empty() {
            return Err(ModeParmError::usage(format!("missing field name in '{}'", token)));
        }

        let descriptor = if name.contains(':') {
            self.resolve_raw(name)?
        } else {
            self.resolve_acronym(name)?
        };

        let value = self.resolve_value(&descriptor, value_text)?;
        debug!(
            "Batch field {} on page {} value {:?}",
            descriptor.display_name(),
            descriptor.page_id(),
            value
        );
        self.assignments.push(ParameterValueAssignment { descriptor, value });
        Ok(())
    }

    pub fn finish(self) -> Result<ParameterBatch> {
        match self.page_id {
            Some(page_id) if !self.assignments.is_empty() => Ok(ParameterBatch {
                page_id,
                assignments: self.assignments,
            }),
            _ => Err(ModeParmError::usage("no fields given")),
        }
    }

    fn resolve_acronym(&mut self, name: &str) -> Result<ParameterDescriptor> {
        let mut candidates = self.catalog.candidates(name);
        let (_, first) = candidates.next().ok_or_else(|| {
            ModeParmError::catalog_lookup(format!("unknown field acronym '{}'", name))
        })?;

        let established = match self.page_id {
            None => {
                self.page_id = Some(first.page_id());
                return Ok(*first);
            }
            Some(page_id) => page_id,
        };
        if first.page_id() == established {
            return Ok(*first);
        }

        match self.mode {
            // a name may exist on several pages; look further for this one
            BatchMode::Get => candidates
                .find(|(_, d)| d.page_id() == established)
                .map(|(_, d)| *d)
                .ok_or_else(|| {
                    ModeParmError::catalog_lookup(format!(
                        "{} is not a field of {}",
                        first.acronym,
                        self.catalog.page_label(established)
                    ))
                }),
            BatchMode::Set | BatchMode::Clear => Err(ModeParmError::catalog_lookup(format!(
                "{} belongs to {}, other fields address {}; one page per command",
                first.acronym,
                self.catalog.page_label(first.page_id()),
                self.catalog.page_label(established)
            ))),
        }
    }

    fn resolve_raw(&self, name: &str) -> Result<ParameterDescriptor> {
        let page_id = self.page_id.ok_or_else(|| {
            ModeParmError::usage(format!(
                "'{}' needs a page selector (--page) to say which page it addresses",
                name
            ))
        })?;

        let parts: Vec<&str> = name.split(':').collect();
        if parts.len() != 3 {
            return Err(ModeParmError::usage(format!(
                "expected byte:bit:width, got '{}'",
                name
            )));
        }
        let number = |s: &str, what: &str| {
            parse_number(s)
                .ok_or_else(|| ModeParmError::usage(format!("bad {} '{}' in '{}'", what, s, name)))
        };
        let start_byte = number(parts[0], "byte offset")?;
        let start_bit = number(parts[1], "bit offset")?;
        let num_bits = number(parts[2], "width")?;

        if start_bit > 7 {
            return Err(ModeParmError::range(format!(
                "bit offset {} in '{}' must be 0..7",
                start_bit, name
            )));
        }
        if num_bits == 0 || num_bits > MAX_FIELD_BITS as u64 {
            return Err(ModeParmError::range(format!(
                "width {} in '{}' must be 1..{}",
                num_bits, name, MAX_FIELD_BITS
            )));
        }
        if start_byte >= MAX_PAGE_LEN {
            return Err(ModeParmError::range(format!(
                "byte offset {} in '{}' lies beyond any mode page",
                start_byte, name
            )));
        }
        let start_byte = usize::try_from(start_byte)
            .map_err(|_| ModeParmError::range(format!("byte offset in '{}' too large", name)))?;

        Ok(ParameterDescriptor::raw(
            page_id,
            start_byte,
            start_bit as u8,
            num_bits as u8,
        ))
    }

    fn resolve_value(
        &self,
        descriptor: &ParameterDescriptor,
        value_text: Option<&str>,
    ) -> Result<FieldValue> {
        let value = match (self.mode, value_text) {
            (BatchMode::Clear, Some(text)) => {
                warn!(
                    "Ignoring value '{}' for {}, clear always writes 0",
                    text,
                    descriptor.display_name()
                );
                return Ok(FieldValue::Explicit(0));
            }
            (BatchMode::Clear, None) | (BatchMode::Get, None) => FieldValue::Explicit(0),
            (BatchMode::Set, None) => FieldValue::AllBitsSet,
            (_, Some(text)) => parse_value(text)?,
        };

        if let FieldValue::Explicit(v) = value {
            if v > bitfield::all_ones(descriptor.num_bits) {
                return Err(ModeParmError::range(format!(
                    "value {} does not fit the {} bit field {}",
                    v,
                    descriptor.num_bits,
                    descriptor.display_name()
                )));
            }
        }
        Ok(value)
    }
}

/// Build a batch from a comma separated field list
pub fn build_batch(
    catalog: &ParameterCatalog,
    fields: &str,
    mode: BatchMode,
    page_selector: Option<PageId>,
) -> Result<ParameterBatch> {
    let mut builder = BatchBuilder::new(catalog, mode, page_selector);
    for token in fields.split(',') {
        builder.push_token(token)?;
    }
    builder.finish()
}

/// Decimal, `0x` hex, or `-1` for all bits set
pub fn parse_value(text: &str) -> Result<FieldValue> {
    let text = text.trim();
    if text == "-1" {
        return Ok(FieldValue::AllBitsSet);
    }
    let value = parse_number(text)
        .ok_or_else(|| ModeParmError::usage(format!("bad value '{}'", text)))?;
    u32::try_from(value)
        .map(FieldValue::Explicit)
        .map_err(|_| ModeParmError::range(format!("value {} exceeds 32 bits", text)))
}

/// Page acronym such as `ca`, or `page[,subpage]` in hex
pub fn parse_page_selector(catalog: &ParameterCatalog, text: &str) -> Result<PageId> {
    let text = text.trim();
    if let Some(page_id) = catalog.page_for_acronym(text) {
        return Ok(page_id);
    }

    let (page_text, subpage_text) = match text.split_once(',') {
        Some((page, subpage)) => (page, Some(subpage)),
        None => (text, None),
    };
    let bad = || {
        ModeParmError::usage(format!(
            "bad page '{}', expected a page acronym or hex page[,subpage]",
            text
        ))
    };

    let page = parse_hex(page_text).ok_or_else(bad)?;
    if page > MAX_PAGE_CODE as u64 {
        return Err(ModeParmError::range(format!(
            "page code 0x{:x} exceeds 0x{:x}",
            page, MAX_PAGE_CODE
        )));
    }
    let subpage = match subpage_text {
        Some(s) => parse_hex(s).ok_or_else(bad)?,
        None => 0,
    };
    if subpage > 0xFF {
        return Err(ModeParmError::range(format!(
            "subpage code 0x{:x} exceeds 0xff",
            subpage
        )));
    }
    Ok(PageId::new(page as u8, subpage as u8))
}
