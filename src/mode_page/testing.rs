//! In-memory transport for tests

use std::collections::HashMap;

use super::catalog::{PageId, CACHING_MP};
use crate::scsi::constants::{MODE_PAGE_CODE_MASK, MODE_PAGE_PS, MODE_PAGE_SPF};
use crate::scsi::{DeviceIdentity, PageControl, ScsiTransport, SenseInfo, TransportError};

const ILLEGAL_REQUEST: SenseInfo = SenseInfo {
    sense_key: 0x05,
    asc: 0x24,
    ascq: 0x00,
};

const INVALID_OPCODE: SenseInfo = SenseInfo {
    sense_key: 0x05,
    asc: 0x20,
    ascq: 0x00,
};

fn device_gone() -> TransportError {
    TransportError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "no such device",
    ))
}

/// 20 byte caching page with the given first byte (PS and page code) and
/// byte 2 (WCE is bit 2, RCD bit 0).
pub fn caching_page(first: u8, byte2: u8) -> Vec<u8> {
    let mut page = vec![0u8; 20];
    page[0] = first;
    page[1] = 0x12;
    page[2] = byte2;
    page
}

/// Wrap a page in a mode parameter header and `block_desc_len` bytes of
/// block descriptors.
pub fn mode_sense_response(page: &[u8], six_byte: bool, block_desc_len: usize) -> Vec<u8> {
    let mut data = Vec::new();
    if six_byte {
        let total = 4 + block_desc_len + page.len();
        data.extend_from_slice(&[(total - 1) as u8, 0x00, 0x00, block_desc_len as u8]);
    } else {
        let total = 8 + block_desc_len + page.len();
        data.extend_from_slice(&((total - 2) as u16).to_be_bytes());
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&(block_desc_len as u16).to_be_bytes());
    }
    data.extend(std::iter::repeat(0xBD).take(block_desc_len));
    data.extend_from_slice(page);
    data
}

/// Answers MODE SENSE from stored pages and records every MODE SELECT.
/// A MODE SELECT replaces the stored current page.
pub struct MockTransport {
    six_byte: bool,
    pages: HashMap<(PageId, PageControl), Vec<u8>>,
    pub identity: DeviceIdentity,
    /// Reject every command as an invalid opcode
    pub fail_opcode: bool,
    /// Reject MODE SELECT with ILLEGAL REQUEST
    pub fail_select: bool,
    /// Reject MODE SELECT as an invalid opcode, MODE SENSE still works
    pub fail_select_opcode: bool,
    /// Fail every command as if the device went away
    pub fail_io: bool,
    pub senses: Vec<(PageId, PageControl, bool)>,
    /// Parameter list and save flag of each MODE SELECT
    pub selects: Vec<(Vec<u8>, bool)>,
}

impl MockTransport {
    /// `six_byte` is the CDB size the device accepts
    pub fn new(six_byte: bool) -> Self {
        Self {
            six_byte,
            pages: HashMap::new(),
            identity: DeviceIdentity {
                peripheral_qualifier: 0,
                peripheral_type: 0,
                vendor: "ACME".to_string(),
                product: "Disk 9000".to_string(),
                revision: "1.0".to_string(),
            },
            fail_opcode: false,
            fail_select: false,
            fail_select_opcode: false,
            fail_io: false,
            senses: Vec::new(),
            selects: Vec::new(),
        }
    }

    pub fn add_page(&mut self, page_id: PageId, pc: PageControl, page: Vec<u8>) {
        self.pages.insert((page_id, pc), page);
    }

    /// Caching page as a typical disk reports it: WCE set, savable, WCE and
    /// RCD changeable, nothing saved.
    pub fn with_caching_page(six_byte: bool) -> Self {
        let id = PageId::new(CACHING_MP, 0);
        let mut mock = Self::new(six_byte);
        mock.add_page(id, PageControl::Current, caching_page(0x88, 0x04));
        mock.add_page(id, PageControl::Changeable, caching_page(0x08, 0x05));
        mock.add_page(id, PageControl::Default, caching_page(0x08, 0x04));
        mock
    }

    pub fn current_page(&self, page_id: PageId) -> Option<&Vec<u8>> {
        self.pages.get(&(page_id, PageControl::Current))
    }
}

impl ScsiTransport for MockTransport {
    fn mode_sense(
        &mut self,
        page: u8,
        subpage: u8,
        pc: PageControl,
        six_byte: bool,
    ) -> Result<Vec<u8>, TransportError> {
        let page_id = PageId::new(page, subpage);
        self.senses.push((page_id, pc, six_byte));
        if self.fail_io {
            return Err(device_gone());
        }
        if self.fail_opcode || six_byte != self.six_byte {
            return Err(TransportError::InvalidOpcode(INVALID_OPCODE));
        }
        match self.pages.get(&(page_id, pc)) {
            Some(stored) => Ok(mode_sense_response(stored, six_byte, 8)),
            None => Err(TransportError::IllegalRequest(ILLEGAL_REQUEST)),
        }
    }

    fn mode_select(
        &mut self,
        param_list: &[u8],
        save: bool,
        six_byte: bool,
    ) -> Result<(), TransportError> {
        if self.fail_io {
            return Err(device_gone());
        }
        if self.fail_opcode || self.fail_select_opcode || six_byte != self.six_byte {
            return Err(TransportError::InvalidOpcode(INVALID_OPCODE));
        }
        if self.fail_select {
            return Err(TransportError::IllegalRequest(ILLEGAL_REQUEST));
        }
        self.selects.push((param_list.to_vec(), save));

        let (header_len, bd_len) = if six_byte {
            (4, param_list[3] as usize)
        } else {
            (8, u16::from_be_bytes([param_list[6], param_list[7]]) as usize)
        };
        let page = &param_list[header_len + bd_len..];
        let spf = page[0] & MODE_PAGE_SPF != 0;
        let page_id = PageId::new(
            page[0] & MODE_PAGE_CODE_MASK,
            if spf { page[1] } else { 0 },
        );
        if let Some(stored) = self.pages.get_mut(&(page_id, PageControl::Current)) {
            let ps = stored[0] & MODE_PAGE_PS;
            stored.clear();
            stored.extend_from_slice(page);
            stored[0] |= ps;
        }
        Ok(())
    }

    fn inquiry(&mut self) -> Result<DeviceIdentity, TransportError> {
        if self.fail_io {
            return Err(device_gone());
        }
        if self.fail_opcode {
            return Err(TransportError::InvalidOpcode(INVALID_OPCODE));
        }
        Ok(self.identity.clone())
    }
}
