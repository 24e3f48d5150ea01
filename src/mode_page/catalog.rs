//! Mode page parameter catalog
//!
//! Static table of named fields within the generic (SPC/SBC) mode pages. Byte
//! offsets count from the first byte of the mode page (the PS/SPF/page code
//! byte), as the standards number them.

use serde::Serialize;
use std::fmt;

/// A (page, subpage) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageId {
    pub page: u8,
    pub subpage: u8,
}

impl PageId {
    pub const fn new(page: u8, subpage: u8) -> Self {
        Self { page, subpage }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subpage == 0 {
            write!(f, "0x{:02x}", self.page)
        } else {
            write!(f, "0x{:02x},0x{:02x}", self.page, self.subpage)
        }
    }
}

/// One named bit-field within a mode page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    /// Empty for fields addressed as raw `byte:bit:width`
    pub acronym: &'static str,
    pub page: u8,
    pub subpage: u8,
    pub start_byte: usize,
    /// Position of the field's most significant bit, 7 = MSB
    pub start_bit: u8,
    pub num_bits: u8,
    /// Shown without `--all`
    pub common: bool,
    pub description: &'static str,
}

impl ParameterDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        acronym: &'static str,
        page: u8,
        subpage: u8,
        start_byte: usize,
        start_bit: u8,
        num_bits: u8,
        common: bool,
        description: &'static str,
    ) -> Self {
        Self {
            acronym,
            page,
            subpage,
            start_byte,
            start_bit,
            num_bits,
            common,
            description,
        }
    }

    /// Field addressed by position only
    pub const fn raw(page_id: PageId, start_byte: usize, start_bit: u8, num_bits: u8) -> Self {
        Self::new("", page_id.page, page_id.subpage, start_byte, start_bit, num_bits, false, "")
    }

    pub fn page_id(&self) -> PageId {
        PageId::new(self.page, self.subpage)
    }

    pub fn is_raw(&self) -> bool {
        self.acronym.is_empty()
    }

    /// Acronym, or the `byte:bit:width` triple for raw fields
    pub fn display_name(&self) -> String {
        if self.is_raw() {
            format!("0x{:x}:{}:{}", self.start_byte, self.start_bit, self.num_bits)
        } else {
            self.acronym.to_string()
        }
    }
}

/// A mode page known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModePageInfo {
    /// Two letter page selector, e.g. "ca"
    pub acronym: &'static str,
    pub page: u8,
    pub subpage: u8,
    pub name: &'static str,
}

impl ModePageInfo {
    pub fn page_id(&self) -> PageId {
        PageId::new(self.page, self.subpage)
    }
}

pub const RW_ERR_RECOVERY_MP: u8 = 0x01;
pub const DISCONNECT_MP: u8 = 0x02;
pub const V_ERR_RECOVERY_MP: u8 = 0x07;
pub const CACHING_MP: u8 = 0x08;
pub const CONTROL_MP: u8 = 0x0A;
pub const PROT_SPEC_LU_MP: u8 = 0x18;
pub const PROT_SPEC_PORT_MP: u8 = 0x19;
pub const POWER_MP: u8 = 0x1A;
pub const IEC_MP: u8 = 0x1C;

pub static MODE_PAGES: &[ModePageInfo] = &[
    ModePageInfo { acronym: "rw", page: RW_ERR_RECOVERY_MP, subpage: 0, name: "Read write error recovery" },
    ModePageInfo { acronym: "dr", page: DISCONNECT_MP, subpage: 0, name: "Disconnect-reconnect" },
    ModePageInfo { acronym: "ve", page: V_ERR_RECOVERY_MP, subpage: 0, name: "Verify error recovery" },
    ModePageInfo { acronym: "ca", page: CACHING_MP, subpage: 0, name: "Caching" },
    ModePageInfo { acronym: "co", page: CONTROL_MP, subpage: 0, name: "Control" },
    ModePageInfo { acronym: "pl", page: PROT_SPEC_LU_MP, subpage: 0, name: "Protocol specific logical unit" },
    ModePageInfo { acronym: "pp", page: PROT_SPEC_PORT_MP, subpage: 0, name: "Protocol specific port" },
    ModePageInfo { acronym: "po", page: POWER_MP, subpage: 0, name: "Power condition" },
    ModePageInfo { acronym: "ie", page: IEC_MP, subpage: 0, name: "Informational exceptions control" },
];

type Pd = ParameterDescriptor;

pub static PARAMETERS: &[ParameterDescriptor] = &[
    // Read write error recovery [0x1] sbc2
    Pd::new("AWRE", RW_ERR_RECOVERY_MP, 0, 2, 7, 1, true, "Automatic write reallocation enabled"),
    Pd::new("ARRE", RW_ERR_RECOVERY_MP, 0, 2, 6, 1, true, "Automatic read reallocation enabled"),
    Pd::new("TB", RW_ERR_RECOVERY_MP, 0, 2, 5, 1, false, "Transfer block"),
    Pd::new("RC", RW_ERR_RECOVERY_MP, 0, 2, 4, 1, false, "Read continuous"),
    Pd::new("EER", RW_ERR_RECOVERY_MP, 0, 2, 3, 1, false, "Enable early recovery"),
    Pd::new("PER", RW_ERR_RECOVERY_MP, 0, 2, 2, 1, true, "Post error"),
    Pd::new("DTE", RW_ERR_RECOVERY_MP, 0, 2, 1, 1, false, "Data terminate on error"),
    Pd::new("DCR", RW_ERR_RECOVERY_MP, 0, 2, 0, 1, false, "Disable correction"),
    Pd::new("RRC", RW_ERR_RECOVERY_MP, 0, 3, 7, 8, false, "Read retry count"),
    Pd::new("WRC", RW_ERR_RECOVERY_MP, 0, 8, 7, 8, false, "Write retry count"),
    Pd::new("RTL", RW_ERR_RECOVERY_MP, 0, 10, 7, 16, false, "Recovery time limit (ms)"),
    // Disconnect-reconnect [0x2] spc3
    Pd::new("BFR", DISCONNECT_MP, 0, 2, 7, 8, true, "Buffer full ratio"),
    Pd::new("BER", DISCONNECT_MP, 0, 3, 7, 8, true, "Buffer empty ratio"),
    Pd::new("BIL", DISCONNECT_MP, 0, 4, 7, 16, true, "Bus inactivity limit"),
    Pd::new("DTL", DISCONNECT_MP, 0, 6, 7, 16, true, "Disconnect time limit"),
    Pd::new("CTL", DISCONNECT_MP, 0, 8, 7, 16, true, "Connect time limit"),
    Pd::new("MBS", DISCONNECT_MP, 0, 10, 7, 16, true, "Maximum burst size"),
    Pd::new("EMDP", DISCONNECT_MP, 0, 12, 7, 1, true, "Enable modify data pointers"),
    Pd::new("FA", DISCONNECT_MP, 0, 12, 6, 3, false, "Fair arbitration"),
    Pd::new("DIMM", DISCONNECT_MP, 0, 12, 3, 1, false, "Disconnect immediate"),
    Pd::new("DTDC", DISCONNECT_MP, 0, 12, 2, 3, false, "Data transfer disconnect control"),
    Pd::new("FBS", DISCONNECT_MP, 0, 14, 7, 16, false, "First burst size"),
    // Verify error recovery [0x7] sbc2
    Pd::new("V_EER", V_ERR_RECOVERY_MP, 0, 2, 3, 1, false, "Enable early recovery"),
    Pd::new("V_PER", V_ERR_RECOVERY_MP, 0, 2, 2, 1, false, "Post error"),
    Pd::new("V_DTE", V_ERR_RECOVERY_MP, 0, 2, 1, 1, false, "Data terminate on error"),
    Pd::new("V_DCR", V_ERR_RECOVERY_MP, 0, 2, 0, 1, false, "Disable correction"),
    Pd::new("V_RC", V_ERR_RECOVERY_MP, 0, 3, 7, 8, false, "Verify retry count"),
    Pd::new("V_RTL", V_ERR_RECOVERY_MP, 0, 10, 7, 16, false, "Verify recovery time limit (ms)"),
    // Caching [0x8] sbc2
    Pd::new("IC", CACHING_MP, 0, 2, 7, 1, false, "Initiator control"),
    Pd::new("ABPF", CACHING_MP, 0, 2, 6, 1, false, "Abort pre-fetch"),
    Pd::new("CAP", CACHING_MP, 0, 2, 5, 1, false, "Caching analysis permitted"),
    Pd::new("DISC", CACHING_MP, 0, 2, 4, 1, false, "Discontinuity"),
    Pd::new("SIZE", CACHING_MP, 0, 2, 3, 1, false, "Size enable"),
    Pd::new("WCE", CACHING_MP, 0, 2, 2, 1, true, "Write cache enable"),
    Pd::new("MF", CACHING_MP, 0, 2, 1, 1, false, "Multiplication factor"),
    Pd::new("RCD", CACHING_MP, 0, 2, 0, 1, true, "Read cache disable"),
    Pd::new("DRRP", CACHING_MP, 0, 3, 7, 4, false, "Demand read retention priority"),
    Pd::new("WRP", CACHING_MP, 0, 3, 3, 4, false, "Write retention priority"),
    Pd::new("DPTL", CACHING_MP, 0, 4, 7, 16, false, "Disable pre-fetch transfer length"),
    Pd::new("MIPF", CACHING_MP, 0, 6, 7, 16, false, "Minimum pre-fetch"),
    Pd::new("MAPF", CACHING_MP, 0, 8, 7, 16, false, "Maximum pre-fetch"),
    Pd::new("MAPFC", CACHING_MP, 0, 10, 7, 16, false, "Maximum pre-fetch ceiling"),
    Pd::new("FSW", CACHING_MP, 0, 12, 7, 1, false, "Force sequential write"),
    Pd::new("LBCSS", CACHING_MP, 0, 12, 6, 1, false, "Logical block cache segment size"),
    Pd::new("DRA", CACHING_MP, 0, 12, 5, 1, false, "Disable read ahead"),
    Pd::new("NV_DIS", CACHING_MP, 0, 12, 0, 1, false, "Non-volatile cache disable"),
    Pd::new("NCS", CACHING_MP, 0, 13, 7, 8, false, "Number of cache segments"),
    Pd::new("CSS", CACHING_MP, 0, 14, 7, 16, false, "Cache segment size"),
    // Control [0xa] spc3
    Pd::new("TST", CONTROL_MP, 0, 2, 7, 3, false, "Task set type"),
    Pd::new("TMF_ONLY", CONTROL_MP, 0, 2, 4, 1, false, "Task management functions only"),
    Pd::new("D_SENSE", CONTROL_MP, 0, 2, 2, 1, false, "Descriptor format sense data"),
    Pd::new("GLTSD", CONTROL_MP, 0, 2, 1, 1, true, "Global logging target save disable"),
    Pd::new("RLEC", CONTROL_MP, 0, 2, 0, 1, false, "Report log exception condition"),
    Pd::new("QAM", CONTROL_MP, 0, 3, 7, 4, false, "Queue algorithm modifier"),
    Pd::new("QERR", CONTROL_MP, 0, 3, 2, 2, false, "Queue error management"),
    Pd::new("RAC", CONTROL_MP, 0, 4, 6, 1, false, "Report a check"),
    Pd::new("UA_INTLCK", CONTROL_MP, 0, 4, 5, 2, false, "Unit attention interlocks control"),
    Pd::new("SWP", CONTROL_MP, 0, 4, 3, 1, true, "Software write protect"),
    Pd::new("ATO", CONTROL_MP, 0, 5, 7, 1, false, "Application tag owner"),
    Pd::new("TAS", CONTROL_MP, 0, 5, 6, 1, false, "Task aborted status"),
    Pd::new("AUTOLOAD", CONTROL_MP, 0, 5, 2, 3, false, "Autoload mode"),
    Pd::new("BTP", CONTROL_MP, 0, 8, 7, 16, false, "Busy timeout period (100us)"),
    Pd::new("ESTCT", CONTROL_MP, 0, 10, 7, 16, false, "Extended self test completion time (sec)"),
    // Protocol specific logical unit [0x18] spc3
    Pd::new("LUPID", PROT_SPEC_LU_MP, 0, 2, 3, 4, true, "Logical unit's (transport) protocol identifier"),
    // Protocol specific port [0x19] spc3
    Pd::new("PPID", PROT_SPEC_PORT_MP, 0, 2, 3, 4, true, "Port's (transport) protocol identifier"),
    // Power condition [0x1a] spc3
    Pd::new("IDLE", POWER_MP, 0, 3, 1, 1, true, "Idle timer active"),
    Pd::new("STANDBY", POWER_MP, 0, 3, 0, 1, true, "Standby timer active"),
    Pd::new("ICT", POWER_MP, 0, 4, 7, 32, true, "Idle condition timer (100 ms)"),
    Pd::new("SCT", POWER_MP, 0, 8, 7, 32, true, "Standby condition timer (100 ms)"),
    // Informational exceptions control [0x1c] spc3
    Pd::new("PERF", IEC_MP, 0, 2, 7, 1, false, "Performance (impact of ie operations)"),
    Pd::new("EBF", IEC_MP, 0, 2, 5, 1, false, "Enable background function"),
    Pd::new("EWASC", IEC_MP, 0, 2, 4, 1, true, "Enable warning"),
    Pd::new("DEXCPT", IEC_MP, 0, 2, 3, 1, true, "Disable exceptions"),
    Pd::new("TEST", IEC_MP, 0, 2, 2, 1, false, "Test (simulate device failure)"),
    Pd::new("LOGERR", IEC_MP, 0, 2, 0, 1, false, "Log informational exception errors"),
    Pd::new("MRIE", IEC_MP, 0, 3, 3, 4, true, "Method of reporting informational exceptions"),
    Pd::new("INTT", IEC_MP, 0, 4, 7, 32, true, "Interval timer (100 ms)"),
    Pd::new("REPC", IEC_MP, 0, 8, 7, 32, true, "Report count"),
];

/// Read-only view over a page table and a field table
#[derive(Debug, Clone, Copy)]
pub struct ParameterCatalog {
    pages: &'static [ModePageInfo],
    fields: &'static [ParameterDescriptor],
}

impl Default for ParameterCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ParameterCatalog {
    pub const fn new(
        pages: &'static [ModePageInfo],
        fields: &'static [ParameterDescriptor],
    ) -> Self {
        Self { pages, fields }
    }

    /// The built-in SPC/SBC catalog
    pub const fn standard() -> Self {
        Self::new(MODE_PAGES, PARAMETERS)
    }

    pub fn pages(&self) -> &'static [ModePageInfo] {
        self.pages
    }

    pub fn fields(&self) -> &'static [ParameterDescriptor] {
        self.fields
    }

    /// Every entry named `name`, in declaration order; can be resumed from
    /// any index.
    pub fn candidates<'a>(&self, name: &'a str) -> AcronymCandidates<'a> {
        AcronymCandidates {
            fields: self.fields,
            name,
            next: 0,
        }
    }

    /// First entry named `name` at or after `start_index`, together with the
    /// index to continue a later search from.
    pub fn lookup_by_acronym(
        &self,
        name: &str,
        start_index: usize,
    ) -> Option<(&'static ParameterDescriptor, usize)> {
        self.candidates(name)
            .resume_from(start_index)
            .next()
            .map(|(index, descriptor)| (descriptor, index + 1))
    }

    pub fn mode_page_name(&self, page_id: PageId) -> Option<&'static str> {
        self.page_info(page_id).map(|info| info.name)
    }

    pub fn page_info(&self, page_id: PageId) -> Option<&'static ModePageInfo> {
        self.pages.iter().find(|info| info.page_id() == page_id)
    }

    /// Resolve a two letter page selector such as "ca"
    pub fn page_for_acronym(&self, acronym: &str) -> Option<PageId> {
        self.pages
            .iter()
            .find(|info| info.acronym.eq_ignore_ascii_case(acronym))
            .map(|info| info.page_id())
    }

    /// Fields of one page (or every page when `scope` is `None`), in
    /// declaration order. Only commonly displayed fields unless `include_all`.
    pub fn fields_for_page(&self, scope: Option<PageId>, include_all: bool) -> PageFields {
        PageFields {
            fields: self.fields,
            scope,
            include_all,
            next: 0,
        }
    }

    /// Human readable page label for headers and diagnostics
    pub fn page_label(&self, page_id: PageId) -> String {
        match self.page_info(page_id) {
            Some(info) => format!("{} [{}] ({})", info.name, info.acronym, page_id),
            None => format!("mode page {}", page_id),
        }
    }
}

/// Resumable scan for entries sharing an acronym
#[derive(Debug, Clone)]
pub struct AcronymCandidates<'a> {
    fields: &'static [ParameterDescriptor],
    name: &'a str,
    next: usize,
}

impl<'a> AcronymCandidates<'a> {
    pub fn resume_from(mut self, index: usize) -> Self {
        self.next = index;
        self
    }

    /// Index the next call to `next()` starts scanning at
    pub fn position(&self) -> usize {
        self.next
    }
}

impl<'a> Iterator for AcronymCandidates<'a> {
    type Item = (usize, &'static ParameterDescriptor);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.fields.len() {
            let index = self.next;
            self.next += 1;
            let descriptor = &self.fields[index];
            if descriptor.acronym.eq_ignore_ascii_case(self.name) {
                return Some((index, descriptor));
            }
        }
        None
    }
}

/// Lazy listing of catalog fields; clone it to restart
#[derive(Debug, Clone)]
pub struct PageFields {
    fields: &'static [ParameterDescriptor],
    scope: Option<PageId>,
    include_all: bool,
    next: usize,
}

impl Iterator for PageFields {
    type Item = &'static ParameterDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.fields.len() {
            let descriptor = &self.fields[self.next];
            self.next += 1;
            let in_scope = self.scope.map_or(true, |id| descriptor.page_id() == id);
            if in_scope && (self.include_all || descriptor.common) {
                return Some(descriptor);
            }
        }
        None
    }
}
