//! List Command Handler
//!
//! Prints the catalog without touching a device.

use std::io::{self, Write};

use super::resolve_page;
use modeparm::display;
use modeparm::error::{ModeParmError, Result};
use modeparm::mode_page::ParameterCatalog;

pub fn execute(all: bool, page: Option<String>, long: bool) -> Result<()> {
    let catalog = ParameterCatalog::standard();
    let scope = resolve_page(&catalog, page.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let pages: Vec<_> = catalog
        .pages()
        .iter()
        .filter(|info| scope.map_or(true, |id| info.page_id() == id))
        .collect();
    if let (Some(id), true) = (scope, pages.is_empty()) {
        return Err(ModeParmError::catalog_lookup(format!(
            "no fields known for mode page {}",
            id
        )));
    }

    for info in pages {
        writeln!(out, "{}", display::format_page_line(info))?;
        for descriptor in catalog.fields_for_page(Some(info.page_id()), all) {
            writeln!(out, "  {}", display::format_descriptor_line(descriptor, long))?;
        }
    }
    Ok(())
}
