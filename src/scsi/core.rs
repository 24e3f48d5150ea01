//! SCSI Core Implementation
//!
//! This module contains the ScsiInterface struct and the platform pass-through
//! logic shared by every command.

use tracing::{debug, warn};

#[cfg(windows)]
use winapi::{
    shared::{
        minwindef::{DWORD, UCHAR, ULONG, USHORT},
        ntdef::PVOID,
    },
    um::ioapiset::DeviceIoControl,
};

use super::constants::*;
use super::device::DeviceHandle;
use super::sense::TransportError;

/// SCSI operation structure that encapsulates low-level SCSI commands
pub struct ScsiInterface {
    pub(crate) device_handle: Option<DeviceHandle>,
    pub(crate) timeout_secs: u32,
}

impl ScsiInterface {
    /// Create new SCSI interface instance
    pub fn new(timeout_secs: u32) -> Self {
        Self {
            device_handle: None,
            timeout_secs,
        }
    }

    pub fn device_path(&self) -> Option<&str> {
        self.device_handle.as_ref().map(|d| d.device_path.as_str())
    }

    /// Send a CDB through the platform pass-through.
    ///
    /// Returns `Ok(true)` on GOOD status and `Ok(false)` on CHECK CONDITION,
    /// in which case `sense_buffer` holds the sense data.
    pub fn scsi_io_control(
        &self,
        cdb: &[u8],
        data_buffer: Option<&mut [u8]>,
        data_in: u8,
        sense_buffer: &mut [u8; SENSE_INFO_LEN],
    ) -> std::result::Result<bool, TransportError> {
        let device = self
            .device_handle
            .as_ref()
            .ok_or(TransportError::NotOpen)?;

        debug!("CDB: {}", hex::encode(cdb));

        #[cfg(target_os = "linux")]
        {
            use std::os::unix::io::AsRawFd;

            let mut data_buffer = data_buffer;
            let (dxfer_len, dxferp) = match data_buffer.as_mut() {
                Some(buf) => (buf.len() as libc::c_uint, buf.as_mut_ptr() as *mut libc::c_void),
                None => (0, std::ptr::null_mut()),
            };
            let dxfer_direction = if dxfer_len == 0 {
                SG_DXFER_NONE
            } else if data_in == SCSI_IOCTL_DATA_IN {
                SG_DXFER_FROM_DEV
            } else {
                SG_DXFER_TO_DEV
            };

            let mut hdr = super::ffi::SgIoHdr {
                interface_id: 'S' as libc::c_int,
                dxfer_direction,
                cmd_len: cdb.len() as libc::c_uchar,
                mx_sb_len: SENSE_INFO_LEN as libc::c_uchar,
                iovec_count: 0,
                dxfer_len,
                dxferp,
                cmdp: cdb.as_ptr(),
                sbp: sense_buffer.as_mut_ptr(),
                timeout: self.timeout_secs.saturating_mul(1000),
                flags: 0,
                pack_id: 0,
                usr_ptr: std::ptr::null_mut(),
                status: 0,
                masked_status: 0,
                msg_status: 0,
                sb_len_wr: 0,
                host_status: 0,
                driver_status: 0,
                resid: 0,
                duration: 0,
                info: 0,
            };

            let rc = unsafe {
                libc::ioctl(
                    device.file.as_raw_fd(),
                    SG_IO as _,
                    &mut hdr as *mut super::ffi::SgIoHdr,
                )
            };
            if rc == -1 {
                return Err(TransportError::Io(std::io::Error::last_os_error()));
            }

            if hdr.host_status != 0 || (hdr.driver_status & 0x0F & !SG_DRIVER_SENSE) != 0 {
                warn!(
                    "SCSI command failed: host_status=0x{:02X}, driver_status=0x{:02X}",
                    hdr.host_status, hdr.driver_status
                );
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!(
                        "transport failure (host_status=0x{:02X}, driver_status=0x{:02X})",
                        hdr.host_status, hdr.driver_status
                    ),
                )));
            }

            match hdr.status {
                scsi_status::GOOD => Ok(true),
                scsi_status::CHECK_CONDITION => Ok(false),
                other => Err(TransportError::Status(other)),
            }
        }

        #[cfg(windows)]
        {
            let mut data_buffer = data_buffer;
            let buffer_length = data_buffer.as_ref().map_or(0, |buf| buf.len()) as ULONG;
            let data_ptr = data_buffer
                .as_mut()
                .map_or(std::ptr::null_mut(), |buf| buf.as_mut_ptr() as PVOID);

            // SCSI Pass Through Direct followed by the sense area
            let mut scsi_buffer =
                vec![0u8; std::mem::size_of::<super::ScsiPassThroughDirect>() + SENSE_INFO_LEN];

            unsafe {
                let scsi_direct = scsi_buffer.as_mut_ptr() as *mut super::ScsiPassThroughDirect;
                std::ptr::write_bytes(scsi_direct, 0, 1);

                (*scsi_direct).length =
                    std::mem::size_of::<super::ScsiPassThroughDirect>() as USHORT;
                (*scsi_direct).cdb_length = cdb.len() as UCHAR;
                (*scsi_direct).data_buffer = data_ptr;
                (*scsi_direct).sense_info_length = SENSE_INFO_LEN as UCHAR;
                (*scsi_direct).sense_info_offset =
                    std::mem::size_of::<super::ScsiPassThroughDirect>() as ULONG;
                (*scsi_direct).data_transfer_length = buffer_length;
                (*scsi_direct).timeout_value = self.timeout_secs;
                (*scsi_direct).data_in = if buffer_length == 0 {
                    SCSI_IOCTL_DATA_UNSPECIFIED
                } else {
                    data_in
                };

                std::ptr::copy_nonoverlapping(
                    cdb.as_ptr(),
                    (*scsi_direct).cdb.as_mut_ptr(),
                    cdb.len(),
                );

                let mut bytes_returned: DWORD = 0;
                let result = DeviceIoControl(
                    device.handle,
                    IOCTL_SCSI_PASS_THROUGH_DIRECT,
                    scsi_buffer.as_mut_ptr() as PVOID,
                    scsi_buffer.len() as DWORD,
                    scsi_buffer.as_mut_ptr() as PVOID,
                    scsi_buffer.len() as DWORD,
                    &mut bytes_returned,
                    std::ptr::null_mut(),
                ) != 0;

                if !result {
                    let err = std::io::Error::last_os_error();
                    warn!("SCSI command failed: {}, CDB: {}", err, hex::encode(cdb));
                    return Err(TransportError::Io(err));
                }

                std::ptr::copy_nonoverlapping(
                    scsi_buffer
                        .as_ptr()
                        .add(std::mem::size_of::<super::ScsiPassThroughDirect>()),
                    sense_buffer.as_mut_ptr(),
                    SENSE_INFO_LEN,
                );

                match (*scsi_direct).scsi_status {
                    scsi_status::GOOD => Ok(true),
                    scsi_status::CHECK_CONDITION => Ok(false),
                    other => Err(TransportError::Status(other)),
                }
            }
        }

        #[cfg(not(any(target_os = "linux", windows)))]
        {
            let _ = (device, data_buffer, data_in, sense_buffer);
            Err(TransportError::Unsupported(
                "SCSI pass-through is not available on this platform".to_string(),
            ))
        }
    }
}

impl Drop for ScsiInterface {
    fn drop(&mut self) {
        debug!("SCSI interface cleanup completed");
    }
}
