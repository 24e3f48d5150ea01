#[cfg(windows)]
use winapi::shared::{
    minwindef::{UCHAR, ULONG, USHORT},
    ntdef::PVOID,
};

// Type aliases for non-Windows platforms
#[cfg(not(windows))]
pub type UCHAR = u8;
#[cfg(not(windows))]
pub type USHORT = u16;
#[cfg(not(windows))]
pub type ULONG = u32;
#[cfg(not(windows))]
pub type PVOID = *mut std::ffi::c_void;

/// SCSI Pass Through Direct structure (SCSI_PASS_THROUGH_DIRECT in ntddscsi.h)
#[repr(C)]
#[derive(Debug)]
pub struct ScsiPassThroughDirect {
    pub length: USHORT,
    pub scsi_status: UCHAR,
    pub path_id: UCHAR,
    pub target_id: UCHAR,
    pub lun: UCHAR,
    pub cdb_length: UCHAR,
    pub sense_info_length: UCHAR,
    pub data_in: UCHAR,
    pub data_transfer_length: ULONG,
    pub timeout_value: ULONG,
    pub data_buffer: PVOID,
    pub sense_info_offset: ULONG,
    pub cdb: [UCHAR; 16],
}

/// sg v3 request header (struct sg_io_hdr in scsi/sg.h)
#[cfg(target_os = "linux")]
#[repr(C)]
#[derive(Debug)]
pub struct SgIoHdr {
    pub interface_id: libc::c_int,
    pub dxfer_direction: libc::c_int,
    pub cmd_len: libc::c_uchar,
    pub mx_sb_len: libc::c_uchar,
    pub iovec_count: libc::c_ushort,
    pub dxfer_len: libc::c_uint,
    pub dxferp: *mut libc::c_void,
    pub cmdp: *const libc::c_uchar,
    pub sbp: *mut libc::c_uchar,
    /// milliseconds
    pub timeout: libc::c_uint,
    pub flags: libc::c_uint,
    pub pack_id: libc::c_int,
    pub usr_ptr: *mut libc::c_void,
    pub status: libc::c_uchar,
    pub masked_status: libc::c_uchar,
    pub msg_status: libc::c_uchar,
    pub sb_len_wr: libc::c_uchar,
    pub host_status: libc::c_ushort,
    pub driver_status: libc::c_ushort,
    pub resid: libc::c_int,
    pub duration: libc::c_uint,
    pub info: libc::c_uint,
}
