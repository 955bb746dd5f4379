//! Symbol table CSV output.
//!
//! One fixed schema, comma-delimited, header always present so downstream
//! loaders can rely on the column order even when a venue returns nothing.

use std::fs;
use std::path::Path;

use refdata_core::{RefdataError, SymbolRecord};

/// Column order of the emitted table.
pub const HEADER: [&str; 6] = ["symbol", "base", "quote", "instrument", "priceTick", "szTick"];

/// Write `records` as comma-delimited CSV at `path`, creating parent
/// directories as needed and replacing any existing file.
pub fn write_symbol_table(records: &[SymbolRecord], path: &Path) -> Result<(), RefdataError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                RefdataError::Output(format!("creating directory {}: {}", parent.display(), e))
            })?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| RefdataError::Output(format!("creating {}: {}", path.display(), e)))?;

    writer
        .write_record(HEADER)
        .map_err(|e| RefdataError::Output(format!("writing {}: {}", path.display(), e)))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| RefdataError::Output(format!("writing {}: {}", path.display(), e)))?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
