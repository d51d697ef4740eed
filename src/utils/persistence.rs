use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::LedgerError,
    ledger::{LedgerSnapshot, CURRENT_SCHEMA_VERSION},
};

const TMP_SUFFIX: &str = "tmp";

/// Writes the snapshot to disk atomically by staging to a temporary file.
pub fn save_snapshot_to_path(snapshot: &LedgerSnapshot, path: &Path) -> Result<(), LedgerError> {
    let json = serde_json::to_string_pretty(snapshot)?;
    write_atomic(path, &json)
}

/// Loads a snapshot from disk, rejecting schema versions this build cannot read.
pub fn load_snapshot_from_path(path: &Path) -> Result<LedgerSnapshot, LedgerError> {
    let data = fs::read_to_string(path)?;
    parse_snapshot(&data)
}

pub fn parse_snapshot(data: &str) -> Result<LedgerSnapshot, LedgerError> {
    let snapshot: LedgerSnapshot = serde_json::from_str(data)?;
    if !snapshot.is_supported() {
        return Err(LedgerError::UnsupportedSchema {
            found: snapshot.schema_version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    Ok(snapshot)
}

/// Stages `data` next to `path` and renames it into place, so a failed write
/// never leaves a truncated file behind.
pub fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
