//! SCSI Device Management
//!
//! This module handles device opening and closing.

use crate::error::Result;
use tracing::debug;

#[cfg(windows)]
use std::ffi::CString;
#[cfg(windows)]
use winapi::{
    shared::ntdef::HANDLE,
    um::{
        fileapi::{CreateFileA, OPEN_EXISTING},
        handleapi::{CloseHandle, INVALID_HANDLE_VALUE},
        winnt::{FILE_SHARE_READ, FILE_SHARE_WRITE, GENERIC_READ, GENERIC_WRITE},
    },
};

use super::ScsiInterface;

/// Device handle wrapper that ensures proper resource cleanup
pub struct DeviceHandle {
    #[cfg(windows)]
    pub(crate) handle: HANDLE,
    #[cfg(unix)]
    pub(crate) file: std::fs::File,
    pub(crate) device_path: String,
}

impl ScsiInterface {
    /// Open the device node. `read_only` is enough for MODE SENSE and INQUIRY;
    /// MODE SELECT needs write access on most platforms.
    pub fn open_device(&mut self, device_path: &str, read_only: bool) -> Result<()> {
        debug!("Opening device: {} (read_only={})", device_path, read_only);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;

            let file = std::fs::OpenOptions::new()
                .read(true)
                .write(!read_only)
                .custom_flags(libc::O_NONBLOCK)
                .open(device_path)
                .map_err(|e| {
                    crate::error::ModeParmError::Io(std::io::Error::new(
                        e.kind(),
                        format!("cannot open {}: {}", device_path, e),
                    ))
                })?;

            self.device_handle = Some(DeviceHandle {
                file,
                device_path: device_path.to_string(),
            });

            debug!("Device opened successfully: {}", device_path);
            Ok(())
        }

        #[cfg(windows)]
        {
            // Accept "PhysicalDrive0", "CdRom0" or an already formatted \\.\ path
            let full_path = if device_path.starts_with(r"\\.\") {
                device_path.to_string()
            } else {
                format!(r"\\.\{}", device_path)
            };

            debug!("Full device path: {}", full_path);

            let path_cstring = CString::new(full_path.clone()).map_err(|e| {
                crate::error::ModeParmError::usage(format!("Device path conversion error: {}", e))
            })?;

            let access = if read_only {
                GENERIC_READ
            } else {
                GENERIC_READ | GENERIC_WRITE
            };

            unsafe {
                let handle = CreateFileA(
                    path_cstring.as_ptr(),
                    access,
                    FILE_SHARE_READ | FILE_SHARE_WRITE,
                    std::ptr::null_mut(),
                    OPEN_EXISTING,
                    0,
                    std::ptr::null_mut(),
                );

                if handle == INVALID_HANDLE_VALUE {
                    let err = std::io::Error::last_os_error();
                    return Err(crate::error::ModeParmError::Io(std::io::Error::new(
                        err.kind(),
                        format!("cannot open {}: {}", full_path, err),
                    )));
                }

                self.device_handle = Some(DeviceHandle {
                    handle,
                    device_path: full_path,
                });
            }

            debug!("Device opened successfully: {}", device_path);
            Ok(())
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = read_only;
            Err(crate::error::ModeParmError::unsupported(format!(
                "cannot open {}: unsupported platform",
                device_path
            )))
        }
    }
}

/// Implement Drop trait to ensure device handle is properly closed
impl Drop for DeviceHandle {
    fn drop(&mut self) {
        #[cfg(windows)]
        unsafe {
            if self.handle != INVALID_HANDLE_VALUE {
                CloseHandle(self.handle);
            }
        }
        debug!("Device handle closed: {}", self.device_path);
    }
}
