//! Runs field batches and page reports against a device

use serde::Serialize;
use std::io::Write;
use tracing::{debug, info, warn};

use super::accessor::{check_field_fits, ModePageAccessor, PageVariants};
use super::batch::ParameterBatch;
use super::bitfield;
use super::catalog::{PageId, ParameterCatalog, ParameterDescriptor};
use crate::display;
use crate::error::{ModeParmError, Result};
use crate::scsi::{DeviceIdentity, PageControl, ScsiTransport, TransportError};

/// How fields are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `NAME value [Changeable: y, def: v, saved: v]`
    #[default]
    Text,
    /// current/changeable/default/saved columns in hex
    Hex,
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Every catalog field, not only the common ones
    pub include_all: bool,
    /// Restrict to one page; an unsupported page is then an error
    pub page: Option<PageId>,
    /// Add field descriptions
    pub long: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    pub long: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Set SP so the device also stores the page
    pub save: bool,
    /// Build the parameter list but do not send it
    pub dry_run: bool,
}

/// One field decoded from every available variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReport {
    pub name: String,
    pub description: &'static str,
    pub current: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changeable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<i64>,
    /// Undecorated values indexed by page control
    #[serde(skip)]
    pub raw: [Option<u32>; 4],
}

impl FieldReport {
    /// `None` when the current page is too short to hold the field
    fn from_variants(descriptor: &ParameterDescriptor, variants: &PageVariants) -> Option<Self> {
        let mut raw = [None; 4];
        for pc in PageControl::ALL {
            raw[pc.index()] = variants.field(pc, descriptor);
        }
        let current = raw[PageControl::Current.index()]?;
        let shown = |v: u32| bitfield::to_display(v, descriptor.num_bits);

        Some(Self {
            name: descriptor.display_name(),
            description: descriptor.description,
            current: shown(current),
            changeable: raw[PageControl::Changeable.index()].map(|mask| mask != 0),
            default: raw[PageControl::Default.index()].map(shown),
            saved: raw[PageControl::Saved.index()].map(shown),
            raw,
        })
    }

    /// Current value only
    fn current_only(descriptor: &ParameterDescriptor, value: u32) -> Self {
        let mut raw = [None; 4];
        raw[PageControl::Current.index()] = Some(value);
        Self {
            name: descriptor.display_name(),
            description: descriptor.description,
            current: bitfield::to_display(value, descriptor.num_bits),
            changeable: None,
            default: None,
            saved: None,
            raw,
        }
    }
}

/// Fields of one page as reported
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub page: PageId,
    pub name: String,
    pub fields: Vec<FieldReport>,
    /// Current page bytes, kept for pages the catalog has no fields for
    #[serde(skip)]
    pub page_bytes: Vec<u8>,
    /// The catalog knows fields for this page, none of them commonly shown
    #[serde(skip)]
    pub fields_hidden: bool,
}

enum ReportState {
    /// Walking the catalog page by page, skipping pages the device lacks
    Scanning,
    /// One requested page that must be supported
    SingleTarget(PageId),
    Done,
}

/// Drives a [`ModePageAccessor`] for each command intent
pub struct BatchExecutor<'t, T: ScsiTransport + ?Sized> {
    accessor: ModePageAccessor<'t, T>,
}

impl<'t, T: ScsiTransport + ?Sized> BatchExecutor<'t, T> {
    pub fn new(transport: &'t mut T, catalog: ParameterCatalog, six_byte: bool) -> Self {
        Self {
            accessor: ModePageAccessor::new(transport, catalog, six_byte),
        }
    }

    pub fn identity(&mut self) -> Result<DeviceIdentity> {
        self.accessor.inquiry()
    }

    /// Print catalog fields with all variants, grouped by page
    pub fn report(&mut self, options: &ReportOptions, out: &mut dyn Write) -> Result<()> {
        let catalog = *self.accessor.catalog();
        let mut fields = catalog
            .fields_for_page(options.page, options.include_all)
            .peekable();
        let mut reports = Vec::new();

        let mut state = match options.page {
            Some(page_id) => ReportState::SingleTarget(page_id),
            None => ReportState::Scanning,
        };

        loop {
            state = match state {
                ReportState::Scanning => match fields.peek().map(|d| d.page_id()) {
                    None => ReportState::Done,
                    Some(page_id) => {
                        let mut group = Vec::new();
                        while let Some(d) = fields.next_if(|d| d.page_id() == page_id) {
                            group.push(d);
                        }
                        match self
                            .accessor
                            .fetch_control_variants(page_id, &PageControl::ALL)
                        {
                            Ok(variants) => {
                                reports.push(page_report(&catalog, page_id, &group, &variants))
                            }
                            Err(e @ ModeParmError::PageNotSupported { .. }) => {
                                debug!("Skipping {}: {}", catalog.page_label(page_id), e);
                            }
                            // the same failure would repeat on every page
                            Err(
                                e @ (ModeParmError::CdbSizeMismatch { .. }
                                | ModeParmError::Io(_)
                                | ModeParmError::Transport(TransportError::Io(_))
                                | ModeParmError::Transport(TransportError::NotOpen)
                                | ModeParmError::Transport(TransportError::Unsupported(_))),
                            ) => return Err(e),
                            Err(e) => {
                                warn!("Skipping {}: {}", catalog.page_label(page_id), e);
                            }
                        }
                        ReportState::Scanning
                    }
                },
                ReportState::SingleTarget(page_id) => {
                    let group: Vec<_> = fields.by_ref().collect();
                    let variants = self
                        .accessor
                        .fetch_control_variants(page_id, &PageControl::ALL)?;
                    reports.push(page_report(&catalog, page_id, &group, &variants));
                    ReportState::Done
                }
                ReportState::Done => break,
            };
        }

        match options.format {
            OutputFormat::Json => display::write_json(out, &reports)?,
            format => {
                for report in &reports {
                    display::write_page_report(out, report, options.long, format)?;
                }
            }
        }
        Ok(())
    }

    /// Print the batch's fields from the current page, or from every
    /// variant for long and hex output
    pub fn get(
        &mut self,
        batch: &ParameterBatch,
        options: &GetOptions,
        out: &mut dyn Write,
    ) -> Result<()> {
        let all_variants = options.long || options.format != OutputFormat::Text;
        let which: &[PageControl] = if all_variants {
            &PageControl::ALL
        } else {
            &[PageControl::Current]
        };
        let variants = self
            .accessor
            .fetch_control_variants(batch.page_id(), which)?;

        let mut reports = Vec::with_capacity(batch.len());
        for assignment in batch.assignments() {
            let descriptor = &assignment.descriptor;
            check_field_fits(descriptor, variants.current.page_len())?;
            let report = if all_variants {
                FieldReport::from_variants(descriptor, &variants)
            } else {
                None
            };
            match report {
                Some(report) => reports.push(report),
                None => {
                    let value = variants.current.read_field(descriptor)?;
                    reports.push(FieldReport::current_only(descriptor, value));
                }
            }
        }

        match options.format {
            OutputFormat::Json => display::write_json(out, &reports)?,
            OutputFormat::Hex => {
                for report in &reports {
                    writeln!(out, "{}", display::format_hex_line(report))?;
                }
            }
            OutputFormat::Text => {
                for report in &reports {
                    writeln!(out, "{}", display::format_field_line(report, options.long))?;
                }
            }
        }
        Ok(())
    }

    /// Overlay every assignment on the current page and write it back.
    /// Used for both set and clear; the batch already carries the values.
    pub fn set(&mut self, batch: &ParameterBatch, options: &WriteOptions) -> Result<Vec<u8>> {
        let current = self.accessor.fetch_current(batch.page_id())?;
        let mut page = current.page().to_vec();

        for assignment in batch.assignments() {
            let d = &assignment.descriptor;
            check_field_fits(d, page.len())?;
            let value = assignment.value.resolve(d.num_bits);
            debug!(
                "{}: 0x{:x} -> 0x{:x}",
                d.display_name(),
                bitfield::read_field(&page, d.start_byte, d.start_bit, d.num_bits),
                value
            );
            bitfield::write_field(&mut page, d.start_byte, d.start_bit, d.num_bits, value);
        }

        self.accessor
            .write_back(&current, &page, options.save, options.dry_run)
    }

    /// Write the device's default page over the current one
    pub fn defaults(&mut self, page_id: PageId, options: &WriteOptions) -> Result<Vec<u8>> {
        let variants = self
            .accessor
            .fetch_control_variants(page_id, &[PageControl::Default])?;

        let label = self.accessor.catalog().page_label(page_id);
        let default_page = match &variants.default {
            Some(image) => image.page().to_vec(),
            None => {
                info!("No default values reported for {}", label);
                return Err(ModeParmError::page_not_supported(label));
            }
        };

        self.accessor
            .write_back(&variants.current, &default_page, options.save, options.dry_run)
    }
}

fn page_report(
    catalog: &ParameterCatalog,
    page_id: PageId,
    fields: &[&ParameterDescriptor],
    variants: &PageVariants,
) -> PageReport {
    let reports = fields
        .iter()
        .filter_map(|d| {
            let report = FieldReport::from_variants(d, variants);
            if report.is_none() {
                debug!(
                    "{} lies beyond the {} byte page",
                    d.display_name(),
                    variants.current.page_len()
                );
            }
            report
        })
        .collect();

    let fields_hidden =
        fields.is_empty() && catalog.fields_for_page(Some(page_id), true).next().is_some();

    PageReport {
        page: page_id,
        name: catalog.page_label(page_id),
        fields: reports,
        page_bytes: variants.current.page().to_vec(),
        fields_hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode_page::batch::{build_batch, BatchMode};
    use crate::mode_page::catalog::{
        CACHING_MP, CONTROL_MP, RW_ERR_RECOVERY_MP, V_ERR_RECOVERY_MP,
    };
    use crate::mode_page::testing::{caching_page, MockTransport};

    const CACHING: PageId = PageId::new(CACHING_MP, 0);
    const RW: PageId = PageId::new(RW_ERR_RECOVERY_MP, 0);

    fn rw_page(rtl: u16) -> Vec<u8> {
        let mut page = vec![0u8; 12];
        page[0] = 0x81;
        page[1] = 0x0A;
        page[10..12].copy_from_slice(&rtl.to_be_bytes());
        page
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_set_wce_over_rcd() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::new(false);
        mock.add_page(CACHING, PageControl::Current, caching_page(0x88, 0x01));

        let batch = build_batch(&catalog, "WCE=1", BatchMode::Set, None).unwrap();
        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let sent = executor.set(&batch, &WriteOptions::default()).unwrap();

        // 10 byte header + 8 byte block descriptor
        let page = &sent[16..];
        let mut expected = caching_page(0x08, 0x05);
        expected[0] = 0x08;
        assert_eq!(page, &expected[..]);
        assert_eq!(mock.selects.len(), 1);
        assert!(!mock.selects[0].1);
    }

    #[test]
    fn test_set_not_savable_sends_nothing() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::new(false);
        mock.add_page(CACHING, PageControl::Current, caching_page(0x08, 0x08));

        let batch = build_batch(&catalog, "WCE=1", BatchMode::Set, None).unwrap();
        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let options = WriteOptions {
            save: true,
            dry_run: false,
        };
        assert!(matches!(
            executor.set(&batch, &options),
            Err(ModeParmError::NotSavable { .. })
        ));
        assert!(mock.selects.is_empty());

        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let sent = executor.set(&batch, &WriteOptions::default()).unwrap();
        assert_eq!(sent[16 + 2], 0x0C);
        assert_eq!(mock.current_page(CACHING).unwrap()[2], 0x0C);
    }

    #[test]
    fn test_set_rejected_by_device() {
        let catalog = ParameterCatalog::standard();
        let batch = build_batch(&catalog, "WCE=0", BatchMode::Set, None).unwrap();

        let mut mock = MockTransport::with_caching_page(false);
        mock.fail_select = true;
        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        assert!(matches!(
            executor.set(&batch, &WriteOptions::default()),
            Err(ModeParmError::Transport(TransportError::IllegalRequest(_)))
        ));
        assert!(mock.selects.is_empty());
        assert_eq!(mock.current_page(CACHING).unwrap()[2], 0x04);

        let mut mock = MockTransport::with_caching_page(true);
        mock.fail_select_opcode = true;
        let mut executor = BatchExecutor::new(&mut mock, catalog, true);
        assert!(matches!(
            executor.set(&batch, &WriteOptions::default()),
            Err(ModeParmError::CdbSizeMismatch { cdb_size: 6, .. })
        ));
        assert_eq!(mock.current_page(CACHING).unwrap()[2], 0x04);
    }

    #[test]
    fn test_clear_and_dry_run() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::with_caching_page(true);

        let batch = build_batch(&catalog, "WCE=1", BatchMode::Clear, None).unwrap();
        let mut executor = BatchExecutor::new(&mut mock, catalog, true);
        let options = WriteOptions {
            save: true,
            dry_run: true,
        };
        let preview = executor.set(&batch, &options).unwrap();
        assert_eq!(preview[4 + 8 + 2], 0x00);
        assert_eq!(preview[4 + 8], 0x08);
        assert!(mock.selects.is_empty());
    }

    #[test]
    fn test_get_plain_and_sentinel() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::new(false);
        mock.add_page(RW, PageControl::Current, rw_page(0xFFFF));

        let batch = build_batch(&catalog, "RTL", BatchMode::Get, None).unwrap();
        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        executor
            .get(&batch, &GetOptions::default(), &mut out)
            .unwrap();

        let text = output(out);
        assert!(text.contains("RTL"));
        assert!(text.contains("-1"));
        assert!(!text.contains("65535"));
        // current only
        assert_eq!(mock.senses.len(), 1);
    }

    #[test]
    fn test_get_rtl_value() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::new(false);
        mock.add_page(RW, PageControl::Current, rw_page(30));

        let batch = build_batch(&catalog, "RTL,0xa:7:16", BatchMode::Get, Some(RW)).unwrap();
        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        let options = GetOptions {
            long: false,
            format: OutputFormat::Json,
        };
        executor.get(&batch, &options, &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json[0]["name"], "RTL");
        assert_eq!(json[0]["current"], 30);
        assert_eq!(json[1]["name"], "0xa:7:16");
        assert_eq!(json[1]["current"], 30);
    }

    #[test]
    fn test_get_hex_columns() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::with_caching_page(false);

        let batch = build_batch(&catalog, "WCE,RCD", BatchMode::Get, None).unwrap();
        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        let options = GetOptions {
            long: false,
            format: OutputFormat::Hex,
        };
        executor.get(&batch, &options, &mut out).unwrap();

        let text = output(out);
        let wce: Vec<&str> = text.lines().next().unwrap().split_whitespace().collect();
        assert_eq!(wce, ["WCE", "0x1", "0x1", "0x1", "-"]);
        assert_eq!(mock.senses.len(), 4);
    }

    #[test]
    fn test_get_field_outside_page() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::new(false);
        mock.add_page(RW, PageControl::Current, rw_page(30));

        let batch = build_batch(&catalog, "0x20:7:8", BatchMode::Get, Some(RW)).unwrap();
        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        assert!(matches!(
            executor.get(&batch, &GetOptions::default(), &mut out),
            Err(ModeParmError::Range(_))
        ));
    }

    #[test]
    fn test_get_offset_beyond_any_page() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::with_caching_page(false);

        let result = build_batch(&catalog, "0xffffffffffffffff:7:8", BatchMode::Get, Some(CACHING))
            .and_then(|batch| {
                let mut out = Vec::new();
                BatchExecutor::new(&mut mock, catalog, false).get(
                    &batch,
                    &GetOptions::default(),
                    &mut out,
                )
            });
        assert!(matches!(result, Err(ModeParmError::Range(_))));
        assert!(mock.senses.is_empty());

        let batch = build_batch(&catalog, "0x10002:7:8", BatchMode::Get, Some(CACHING)).unwrap();
        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        assert!(matches!(
            executor.get(&batch, &GetOptions::default(), &mut out),
            Err(ModeParmError::Range(_))
        ));
    }

    #[test]
    fn test_defaults_without_default_variant() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::new(false);
        mock.add_page(CACHING, PageControl::Current, caching_page(0x88, 0x04));

        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        assert!(matches!(
            executor.defaults(CACHING, &WriteOptions::default()),
            Err(ModeParmError::PageNotSupported { .. })
        ));
        assert!(mock.selects.is_empty());
    }

    #[test]
    fn test_defaults_writes_default_page() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::new(false);
        mock.add_page(CACHING, PageControl::Current, caching_page(0x88, 0x05));
        mock.add_page(CACHING, PageControl::Default, caching_page(0x08, 0x04));

        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let options = WriteOptions {
            save: true,
            dry_run: false,
        };
        executor.defaults(CACHING, &options).unwrap();
        assert_eq!(mock.selects.len(), 1);
        assert_eq!(mock.current_page(CACHING).unwrap()[2], 0x04);
    }

    #[test]
    fn test_report_skips_missing_pages() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::with_caching_page(false);

        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        executor
            .report(&ReportOptions::default(), &mut out)
            .unwrap();

        let text = output(out);
        assert!(text.contains("Caching"));
        assert!(text.contains("WCE"));
        assert!(text.contains("Changeable: y"));
        assert!(!text.contains("RTL"));
    }

    #[test]
    fn test_report_stops_on_device_failure() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::with_caching_page(false);
        mock.fail_io = true;

        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        assert!(matches!(
            executor.report(&ReportOptions::default(), &mut out),
            Err(ModeParmError::Transport(TransportError::Io(_)))
        ));
        assert!(out.is_empty());
        assert_eq!(mock.senses.len(), 1);
    }

    #[test]
    fn test_report_reports_cdb_size_mismatch() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::with_caching_page(true);

        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        assert!(matches!(
            executor.report(&ReportOptions::default(), &mut out),
            Err(ModeParmError::CdbSizeMismatch { cdb_size: 10, .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_report_page_without_common_fields() {
        let catalog = ParameterCatalog::standard();
        let ve = PageId::new(V_ERR_RECOVERY_MP, 0);
        let mut page = vec![0u8; 12];
        page[0] = V_ERR_RECOVERY_MP;
        page[1] = 0x0A;
        page[3] = 5;
        let mut mock = MockTransport::new(false);
        mock.add_page(ve, PageControl::Current, page);

        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        let options = ReportOptions {
            page: Some(ve),
            ..Default::default()
        };
        executor.report(&options, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("--all"));
        assert!(!text.contains("0000"));

        let mut out = Vec::new();
        let options = ReportOptions {
            page: Some(ve),
            include_all: true,
            ..Default::default()
        };
        executor.report(&options, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("V_RC"));
        assert!(!text.contains("--all"));
    }

    #[test]
    fn test_report_single_page() {
        let catalog = ParameterCatalog::standard();
        let mut mock = MockTransport::with_caching_page(false);

        let mut executor = BatchExecutor::new(&mut mock, catalog, false);
        let mut out = Vec::new();
        let options = ReportOptions {
            page: Some(PageId::new(CONTROL_MP, 0)),
            ..Default::default()
        };
        assert!(matches!(
            executor.report(&options, &mut out),
            Err(ModeParmError::PageNotSupported { .. })
        ));

        let options = ReportOptions {
            page: Some(CACHING),
            include_all: true,
            format: OutputFormat::Json,
            ..Default::default()
        };
        executor.report(&options, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let fields = json[0]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 20);
        assert_eq!(fields[5]["name"], "WCE");
        assert_eq!(fields[5]["changeable"], true);
        assert_eq!(fields[5]["default"], 1);
        assert!(fields[5].get("saved").is_none());
    }
}
