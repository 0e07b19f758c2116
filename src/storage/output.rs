use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::domain::VehicleRecord;

/// Write records as a pretty-printed JSON array, creating parent directories
/// as needed.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_records(path: &Path, records: &[VehicleRecord]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
