use serde::Serialize;
use std::io::{self, Write};

use crate::error::Result;
use crate::mode_page::catalog::{ModePageInfo, ParameterDescriptor};
use crate::mode_page::executor::{FieldReport, OutputFormat, PageReport};
use crate::scsi::{DeviceIdentity, PageControl};
use crate::utils::truncate_string;

const NAME_WIDTH: usize = 10;
const VALUE_WIDTH: usize = 10;
const HEX_COLUMN_WIDTH: usize = 12;

/// `NAME value [Changeable: y, def: v, saved: v]`; the bracket only lists
/// variants the device returned.
pub fn format_field_line(field: &FieldReport, long: bool) -> String {
    let mut line = format!(
        "  {:<name$} {:>value$}",
        field.name,
        field.current,
        name = NAME_WIDTH,
        value = VALUE_WIDTH
    );

    let mut extras = Vec::new();
    if let Some(changeable) = field.changeable {
        extras.push(format!("Changeable: {}", if changeable { "y" } else { "n" }));
    }
    if let Some(default) = field.default {
        extras.push(format!("def: {:>3}", default));
    }
    if let Some(saved) = field.saved {
        extras.push(format!("saved: {:>3}", saved));
    }
    if !extras.is_empty() {
        line.push_str(&format!("  [{}]", extras.join(", ")));
    }
    if long && !field.description.is_empty() {
        line.push_str("  ");
        line.push_str(field.description);
    }
    line
}

/// Name then current, changeable, default and saved in hex; `-` when a
/// variant is unavailable.
pub fn format_hex_line(field: &FieldReport) -> String {
    let mut line = format!("  {:<name$}", field.name, name = NAME_WIDTH);
    for pc in PageControl::ALL {
        let column = match field.raw[pc.index()] {
            Some(value) => format!("0x{:x}", value),
            None => "-".to_string(),
        };
        line.push_str(&format!(" {:>width$}", column, width = HEX_COLUMN_WIDTH));
    }
    line
}

/// Header line and fields of one page
pub fn write_page_report(
    out: &mut dyn Write,
    report: &PageReport,
    long: bool,
    format: OutputFormat,
) -> io::Result<()> {
    writeln!(out, "{} mode page:", report.name)?;
    if report.fields_hidden {
        writeln!(out, "  no commonly displayed fields, use --all to list them")?;
        return Ok(());
    }
    if report.fields.is_empty() {
        write_hex_dump(out, &report.page_bytes)?;
        return Ok(());
    }
    for field in &report.fields {
        let line = match format {
            OutputFormat::Hex => format_hex_line(field),
            _ => format_field_line(field, long),
        };
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Offset, 16 hex bytes and their ASCII form per line
pub fn write_hex_dump(out: &mut dyn Write, content: &[u8]) -> io::Result<()> {
    for (i, chunk) in content.chunks(16).enumerate() {
        write!(out, "  {:04x}  ", i * 16)?;

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                write!(out, " ")?;
            }
            write!(out, "{:02x} ", byte)?;
        }

        // Padding for incomplete lines
        for j in chunk.len()..16 {
            if j == 8 {
                write!(out, " ")?;
            }
            write!(out, "   ")?;
        }

        write!(out, " |")?;
        for byte in chunk {
            let ch = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            write!(out, "{}", ch)?;
        }
        writeln!(out, "|")?;
    }
    Ok(())
}

/// Pretty JSON followed by a newline
pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_identity(out: &mut dyn Write, identity: &DeviceIdentity) -> io::Result<()> {
    writeln!(out, "    {}  [{}]", identity, identity.peripheral_type_text())
}

pub fn format_page_line(info: &ModePageInfo) -> String {
    format!("  {:<4}{:<10}{}", info.acronym, info.page_id().to_string(), info.name)
}

/// One catalog entry for listings
pub fn format_descriptor_line(descriptor: &ParameterDescriptor, long: bool) -> String {
    let position = format!(
        "[0x{:x}:{}:{}]",
        descriptor.start_byte, descriptor.start_bit, descriptor.num_bits
    );
    let description = if long {
        descriptor.description.to_string()
    } else {
        truncate_string(descriptor.description, 48)
    };
    format!(
        "  {:<name$} {:<14} {}",
        descriptor.display_name(),
        position,
        description,
        name = NAME_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode_page::catalog::PageId;

    fn wce_report() -> FieldReport {
        FieldReport {
            name: "WCE".to_string(),
            description: "Write cache enable",
            current: 1,
            changeable: Some(true),
            default: Some(1),
            saved: None,
            raw: [Some(1), Some(1), Some(1), None],
        }
    }

    #[test]
    fn test_format_field_line() {
        let report = wce_report();
        let line = format_field_line(&report, false);
        assert!(line.starts_with("  WCE"));
        assert!(line.ends_with("[Changeable: y, def:   1]"));

        let long = format_field_line(&report, true);
        assert!(long.ends_with("Write cache enable"));

        let bare = FieldReport {
            changeable: None,
            default: None,
            ..report
        };
        assert!(!format_field_line(&bare, false).contains('['));
    }

    #[test]
    fn test_format_hex_line() {
        let columns: Vec<String> = format_hex_line(&wce_report())
            .split_whitespace()
            .map(String::from)
            .collect();
        assert_eq!(columns, ["WCE", "0x1", "0x1", "0x1", "-"]);
    }

    #[test]
    fn test_hex_dump() {
        let mut out = Vec::new();
        write_hex_dump(&mut out, &[0x08, 0x12, 0x41, 0x42]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("  0000  08 12 41 42 "));
        assert!(text.trim_end().ends_with("|..AB|"));
    }

    #[test]
    fn test_page_report_without_fields() {
        let mut report = PageReport {
            page: PageId::new(0x07, 0),
            name: "Verify error recovery [ve] (0x07)".to_string(),
            fields: Vec::new(),
            page_bytes: vec![0x07, 0x0A, 0x00, 0x05],
            fields_hidden: true,
        };
        let mut out = Vec::new();
        write_page_report(&mut out, &report, false, OutputFormat::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("use --all"));
        assert!(!text.contains("0000"));

        report.fields_hidden = false;
        let mut out = Vec::new();
        write_page_report(&mut out, &report, false, OutputFormat::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("0000  07 0a 00 05"));
    }

    #[test]
    fn test_format_descriptor_line() {
        let d = ParameterDescriptor::new("RTL", 0x01, 0, 10, 7, 16, true, "Recovery time limit (ms)");
        let line = format_descriptor_line(&d, false);
        assert!(line.contains("RTL"));
        assert!(line.contains("[0xa:7:16]"));
    }
}
