//! SCSI Configuration Commands
//!
//! MODE SENSE and MODE SELECT, in both the 6-byte and 10-byte CDB forms.

use tracing::{debug, warn};

use super::super::{
    constants::*, sense, PageControl, ScsiInterface, TransportError,
};

/// Build a MODE SENSE CDB. Block descriptors are requested (DBD=0) so the
/// header layout is exercised the same way real devices answer.
pub fn mode_sense_cdb(
    page: u8,
    subpage: u8,
    pc: PageControl,
    six_byte: bool,
    allocation_len: usize,
) -> Vec<u8> {
    let page_byte = ((pc as u8) << 6) | (page & MODE_PAGE_CODE_MASK);
    if six_byte {
        vec![
            scsi_commands::MODE_SENSE_6,
            0x00,
            page_byte,
            subpage,
            allocation_len.min(0xFF) as u8,
            0x00,
        ]
    } else {
        let [msb, lsb] = (allocation_len.min(0xFFFF) as u16).to_be_bytes();
        vec![
            scsi_commands::MODE_SENSE_10,
            0x00,
            page_byte,
            subpage,
            0x00,
            0x00,
            0x00,
            msb,
            lsb,
            0x00,
        ]
    }
}

/// Build a MODE SELECT CDB with PF set and SP following `save`.
pub fn mode_select_cdb(
    param_len: usize,
    save: bool,
    six_byte: bool,
) -> std::result::Result<Vec<u8>, TransportError> {
    let flags = MODE_SELECT_PF | if save { MODE_SELECT_SP } else { 0 };
    if six_byte {
        if param_len > 0xFF {
            return Err(TransportError::ParameterListTooLong(param_len));
        }
        Ok(vec![
            scsi_commands::MODE_SELECT_6,
            flags,
            0x00,
            0x00,
            param_len as u8,
            0x00,
        ])
    } else {
        if param_len > 0xFFFF {
            return Err(TransportError::ParameterListTooLong(param_len));
        }
        let [msb, lsb] = (param_len as u16).to_be_bytes();
        Ok(vec![
            scsi_commands::MODE_SELECT_10,
            flags,
            0x00,
            0x00,
            0x00,
            0x00,
            0x00,
            msb,
            lsb,
            0x00,
        ])
    }
}

impl ScsiInterface {
    /// MODE SENSE for one page control variant; returns the whole response
    /// (mode parameter header, block descriptors, page).
    pub fn mode_sense(
        &self,
        page: u8,
        subpage: u8,
        pc: PageControl,
        six_byte: bool,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        debug!(
            "Executing MODE SENSE({}) page=0x{:02X} subpage=0x{:02X} pc={}",
            if six_byte { 6 } else { 10 },
            page,
            subpage,
            pc.description()
        );

        let alloc = if six_byte {
            alloc_lengths::MODE_SENSE_6
        } else {
            alloc_lengths::MODE_SENSE_10
        };
        let cdb = mode_sense_cdb(page, subpage, pc, six_byte, alloc);

        let mut data_buffer = vec![0u8; alloc];
        let mut sense_buffer = [0u8; SENSE_INFO_LEN];

        let good = self.scsi_io_control(
            &cdb,
            Some(&mut data_buffer),
            SCSI_IOCTL_DATA_IN,
            &mut sense_buffer,
        )?;

        if !good {
            match sense::classify(&sense_buffer) {
                TransportError::Recovered(info) if has_mode_data(&data_buffer, six_byte) => {
                    warn!("MODE SENSE recovered error: {}", info);
                }
                err => return Err(err),
            }
        }

        debug!("MODE SENSE completed successfully");
        Ok(data_buffer)
    }

    /// MODE SELECT with the given parameter list
    pub fn mode_select(
        &self,
        param_list: &[u8],
        save: bool,
        six_byte: bool,
    ) -> std::result::Result<(), TransportError> {
        debug!(
            "Executing MODE SELECT({}) save={} data={}",
            if six_byte { 6 } else { 10 },
            save,
            hex::encode(param_list)
        );

        let cdb = mode_select_cdb(param_list.len(), save, six_byte)?;
        let mut data_buffer = param_list.to_vec();
        let mut sense_buffer = [0u8; SENSE_INFO_LEN];

        let good = self.scsi_io_control(
            &cdb,
            Some(&mut data_buffer),
            SCSI_IOCTL_DATA_OUT,
            &mut sense_buffer,
        )?;

        if !good {
            match sense::classify(&sense_buffer) {
                TransportError::Recovered(info) => {
                    warn!("MODE SELECT recovered error: {}", info);
                }
                err => return Err(err),
            }
        }

        debug!("MODE SELECT completed successfully");
        Ok(())
    }
}

fn has_mode_data(data: &[u8], six_byte: bool) -> bool {
    if six_byte {
        data.first().map_or(false, |&len| len > 0)
    } else {
        data.len() >= 2 && (data[0] != 0 || data[1] != 0)
    }
}
