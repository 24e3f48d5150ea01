//! Mode page fetch and write-back
//!
//! Wraps MODE SENSE / MODE SELECT: parses the mode parameter header to find
//! the page inside each response, fetches the page control variants, and
//! rebuilds the parameter list for MODE SELECT.

use tracing::{debug, info, warn};

use super::bitfield;
use super::catalog::{PageId, ParameterCatalog, ParameterDescriptor};
use crate::error::{ModeParmError, Result};
use crate::scsi::constants::{
    MODE_HEADER_LEN_10, MODE_HEADER_LEN_6, MODE_PAGE_CODE_MASK, MODE_PAGE_PS, MODE_PAGE_SPF,
};
use crate::scsi::{DeviceIdentity, PageControl, ScsiTransport, TransportError};

/// One MODE SENSE response with the located page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModePageImage {
    data: Vec<u8>,
    six_byte: bool,
    block_desc_len: usize,
    page_offset: usize,
    page_len: usize,
}

impl ModePageImage {
    /// Locate the page for `expected` inside a MODE SENSE response. The
    /// response is truncated to the declared mode data length.
    pub fn parse(mut data: Vec<u8>, six_byte: bool, expected: PageId) -> Result<Self> {
        let header_len = if six_byte {
            MODE_HEADER_LEN_6
        } else {
            MODE_HEADER_LEN_10
        };
        if data.len() < header_len {
            return Err(ModeParmError::malformed(format!(
                "response of {} bytes is shorter than the {} byte mode parameter header",
                data.len(),
                header_len
            )));
        }

        let (total_len, block_desc_len) = if six_byte {
            (data[0] as usize + 1, data[3] as usize)
        } else {
            (
                u16::from_be_bytes([data[0], data[1]]) as usize + 2,
                u16::from_be_bytes([data[6], data[7]]) as usize,
            )
        };

        if total_len <= header_len {
            return Err(TransportError::NoData.into());
        }
        if total_len > data.len() {
            return Err(ModeParmError::malformed(format!(
                "mode data length {} exceeds the {} byte response",
                total_len,
                data.len()
            )));
        }

        let page_offset = header_len + block_desc_len;
        if page_offset + 2 > total_len {
            return Err(ModeParmError::malformed(format!(
                "block descriptor length {} leaves no room for a page in {} bytes",
                block_desc_len, total_len
            )));
        }

        let spf = data[page_offset] & MODE_PAGE_SPF != 0;
        let page_len = if spf {
            if page_offset + 4 > total_len {
                return Err(ModeParmError::malformed(
                    "subpage header truncated".to_string(),
                ));
            }
            4 + u16::from_be_bytes([data[page_offset + 2], data[page_offset + 3]]) as usize
        } else {
            2 + data[page_offset + 1] as usize
        };

        if page_offset + page_len > total_len {
            return Err(ModeParmError::malformed(format!(
                "page length {} at offset {} exceeds mode data length {}",
                page_len, page_offset, total_len
            )));
        }

        let page_code = data[page_offset] & MODE_PAGE_CODE_MASK;
        let subpage = if spf { data[page_offset + 1] } else { 0 };
        if page_code != expected.page || subpage != expected.subpage {
            return Err(ModeParmError::malformed(format!(
                "asked for page {} but device returned {}",
                expected,
                PageId::new(page_code, subpage)
            )));
        }

        data.truncate(total_len);
        Ok(Self {
            data,
            six_byte,
            block_desc_len,
            page_offset,
            page_len,
        })
    }

    /// The mode page, starting at its PS/SPF/page code byte
    pub fn page(&self) -> &[u8] {
        &self.data[self.page_offset..self.page_offset + self.page_len]
    }

    /// Whole response up to the declared mode data length
    pub fn raw(&self) -> &[u8] {
        &self.data
    }

    /// Where field offsets start within `raw()`
    pub fn page_offset(&self) -> usize {
        self.page_offset
    }

    pub fn page_len(&self) -> usize {
        self.page_len
    }

    pub fn block_desc_len(&self) -> usize {
        self.block_desc_len
    }

    pub fn is_six_byte(&self) -> bool {
        self.six_byte
    }

    /// PS bit of the page header
    pub fn is_savable(&self) -> bool {
        self.data[self.page_offset] & MODE_PAGE_PS != 0
    }

    pub fn page_id(&self) -> PageId {
        let spf = self.data[self.page_offset] & MODE_PAGE_SPF != 0;
        PageId::new(
            self.data[self.page_offset] & MODE_PAGE_CODE_MASK,
            if spf { self.data[self.page_offset + 1] } else { 0 },
        )
    }

    /// Decode one field of the page
    pub fn read_field(&self, descriptor: &ParameterDescriptor) -> Result<u32> {
        check_field_fits(descriptor, self.page_len)?;
        Ok(bitfield::read_field(
            self.page(),
            descriptor.start_byte,
            descriptor.start_bit,
            descriptor.num_bits,
        ))
    }
}

/// Range error unless the field lies inside a page of `page_len` bytes
pub fn check_field_fits(descriptor: &ParameterDescriptor, page_len: usize) -> Result<()> {
    let end = descriptor
        .start_byte
        .checked_add(bitfield::field_span(descriptor.start_bit, descriptor.num_bits));
    if end.map_or(true, |end| end > page_len) {
        return Err(ModeParmError::range(format!(
            "{} (byte {}) lies outside the {} byte page",
            descriptor.display_name(),
            descriptor.start_byte,
            page_len
        )));
    }
    Ok(())
}

/// The page control variants retrieved for one page. Current is always
/// present; the others may be unavailable.
#[derive(Debug, Clone)]
pub struct PageVariants {
    pub current: ModePageImage,
    pub changeable: Option<ModePageImage>,
    pub default: Option<ModePageImage>,
    pub saved: Option<ModePageImage>,
}

impl PageVariants {
    pub fn get(&self, pc: PageControl) -> Option<&ModePageImage> {
        match pc {
            PageControl::Current => Some(&self.current),
            PageControl::Changeable => self.changeable.as_ref(),
            PageControl::Default => self.default.as_ref(),
            PageControl::Saved => self.saved.as_ref(),
        }
    }

    /// Bit n set when page control n was retrieved
    pub fn mask(&self) -> u8 {
        PageControl::ALL
            .iter()
            .filter(|pc| self.get(**pc).is_some())
            .fold(0, |mask, pc| mask | pc.mask_bit())
    }

    /// Field value from one variant; `None` when the variant is unavailable
    /// or too short to hold the field.
    pub fn field(&self, pc: PageControl, descriptor: &ParameterDescriptor) -> Option<u32> {
        self.get(pc).and_then(|image| image.read_field(descriptor).ok())
    }
}

/// MODE SENSE / MODE SELECT on one device
pub struct ModePageAccessor<'t, T: ScsiTransport + ?Sized> {
    transport: &'t mut T,
    catalog: ParameterCatalog,
    six_byte: bool,
}

impl<'t, T: ScsiTransport + ?Sized> ModePageAccessor<'t, T> {
    pub fn new(transport: &'t mut T, catalog: ParameterCatalog, six_byte: bool) -> Self {
        Self {
            transport,
            catalog,
            six_byte,
        }
    }

    pub fn catalog(&self) -> &ParameterCatalog {
        &self.catalog
    }

    pub fn inquiry(&mut self) -> Result<DeviceIdentity> {
        Ok(self.transport.inquiry()?)
    }

    /// Fetch the current page; every other operation depends on its layout.
    pub fn fetch_current(&mut self, page_id: PageId) -> Result<ModePageImage> {
        self.fetch(page_id, PageControl::Current)
            .map_err(|e| self.current_fetch_error(page_id, e))
    }

    /// Fetch current plus the requested variants. Only a failed current
    /// fetch is an error; other failures leave that variant unavailable.
    pub fn fetch_control_variants(
        &mut self,
        page_id: PageId,
        which: &[PageControl],
    ) -> Result<PageVariants> {
        let current = self.fetch_current(page_id)?;
        let mut variants = PageVariants {
            current,
            changeable: None,
            default: None,
            saved: None,
        };

        for &pc in which {
            if pc == PageControl::Current {
                continue;
            }
            match self.fetch(page_id, pc) {
                Ok(image) => {
                    if image.page_len() != variants.current.page_len() {
                        warn!(
                            "{} {} page is {} bytes, current is {}",
                            self.catalog.page_label(page_id),
                            pc.description(),
                            image.page_len(),
                            variants.current.page_len()
                        );
                    }
                    match pc {
                        PageControl::Changeable => variants.changeable = Some(image),
                        PageControl::Default => variants.default = Some(image),
                        PageControl::Saved => variants.saved = Some(image),
                        PageControl::Current => {}
                    }
                }
                Err(e) => {
                    debug!(
                        "{} values unavailable for {}: {}",
                        pc.description(),
                        self.catalog.page_label(page_id),
                        e
                    );
                }
            }
        }

        debug!(
            "{} availability mask 0x{:x}",
            self.catalog.page_label(page_id),
            variants.mask()
        );
        Ok(variants)
    }

    /// Send `modified_page` in place of the page in `current`. Returns the
    /// parameter list that was sent, or would have been with `dry_run`.
    pub fn write_back(
        &mut self,
        current: &ModePageImage,
        modified_page: &[u8],
        save: bool,
        dry_run: bool,
    ) -> Result<Vec<u8>> {
        let page_id = current.page_id();
        if save && !current.is_savable() {
            return Err(ModeParmError::not_savable(self.catalog.page_label(page_id)));
        }
        if modified_page.len() != current.page_len() {
            return Err(ModeParmError::range(format!(
                "replacement page is {} bytes, {} expects {}",
                modified_page.len(),
                self.catalog.page_label(page_id),
                current.page_len()
            )));
        }

        let offset = current.page_offset();
        let mut param_list = current.raw()[..offset + current.page_len()].to_vec();
        param_list[offset..].copy_from_slice(modified_page);

        // mode data length is reserved for MODE SELECT
        if current.is_six_byte() {
            param_list[0] = 0;
        } else {
            param_list[0] = 0;
            param_list[1] = 0;
        }
        param_list[offset] &= !MODE_PAGE_PS;

        if dry_run {
            info!(
                "Dry run: MODE SELECT for {} not sent",
                self.catalog.page_label(page_id)
            );
            return Ok(param_list);
        }

        info!(
            "Writing {}{}",
            self.catalog.page_label(page_id),
            if save { " (saved)" } else { "" }
        );
        self.transport
            .mode_select(&param_list, save, current.is_six_byte())
            .map_err(|e| match e {
                TransportError::InvalidOpcode(_) => {
                    ModeParmError::cdb_size_mismatch("MODE SELECT", current.is_six_byte())
                }
                other => ModeParmError::Transport(other),
            })?;

        Ok(param_list)
    }

    fn fetch(&mut self, page_id: PageId, pc: PageControl) -> Result<ModePageImage> {
        let data = self
            .transport
            .mode_sense(page_id.page, page_id.subpage, pc, self.six_byte)?;
        ModePageImage::parse(data, self.six_byte, page_id)
    }

    fn current_fetch_error(&self, page_id: PageId, err: ModeParmError) -> ModeParmError {
        match err {
            ModeParmError::Transport(TransportError::InvalidOpcode(_)) => {
                ModeParmError::cdb_size_mismatch("MODE SENSE", self.six_byte)
            }
            ModeParmError::Transport(TransportError::IllegalRequest(_))
            | ModeParmError::Transport(TransportError::NoData) => {
                ModeParmError::page_not_supported(self.catalog.page_label(page_id))
            }
            other => other,
        }
    }
}
