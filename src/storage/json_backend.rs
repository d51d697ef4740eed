use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info};

use crate::{
    errors::Result,
    ledger::LedgerSnapshot,
    utils::persistence::{load_snapshot_from_path, save_snapshot_to_path},
};

use super::StorageBackend;

const LEDGER_FILE: &str = "ledger.json";
const BACKUP_DIR: &str = "backups";
const BACKUP_PREFIX: &str = "ledger_";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";
pub const DEFAULT_RETENTION: usize = 5;

/// A previous ledger file kept under `backups/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
}

/// Filesystem-backed JSON persistence with rotating backups.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    ledger_path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: PathBuf, retention: Option<usize>) -> Result<Self> {
        fs::create_dir_all(&root)?;
        let backups_dir = root.join(BACKUP_DIR);
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            ledger_path: root.join(LEDGER_FILE),
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    /// Storage rooted at the application ledger directory.
    pub fn new_default(retention: Option<usize>) -> Result<Self> {
        Self::new(crate::utils::ledger_dir(), retention)
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Backups sorted newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !name.starts_with(BACKUP_PREFIX)
                || path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION)
            {
                continue;
            }
            let created_at = parse_backup_timestamp(name);
            entries.push(BackupInfo { path, created_at });
        }
        entries.sort_by(|a, b| b.path.cmp(&a.path));
        Ok(entries)
    }

    pub fn restore_backup(&self, backup: &BackupInfo) -> Result<LedgerSnapshot> {
        info!(path = %backup.path.display(), "restoring ledger backup");
        load_snapshot_from_path(&backup.path)
    }

    fn backup_existing_file(&self) -> Result<()> {
        if !self.ledger_path.exists() {
            return Ok(());
        }
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let target = self.backups_dir.join(format!(
            "{BACKUP_PREFIX}{timestamp}.{BACKUP_EXTENSION}"
        ));
        fs::copy(&self.ledger_path, &target)?;
        debug!(path = %target.display(), "ledger backup written");
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        for stale in backups.iter().skip(self.retention) {
            fs::remove_file(&stale.path)?;
            debug!(path = %stale.path.display(), "pruned ledger backup");
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Option<LedgerSnapshot>> {
        if !self.ledger_path.exists() {
            return Ok(None);
        }
        let snapshot = load_snapshot_from_path(&self.ledger_path)?;
        info!(
            path = %self.ledger_path.display(),
            items = snapshot.items.len(),
            "ledger loaded"
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        self.backup_existing_file()?;
        save_snapshot_to_path(snapshot, &self.ledger_path)?;
        debug!(path = %self.ledger_path.display(), "ledger saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.ledger_path.display().to_string()
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let raw = name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_backup_names() {
        let parsed = parse_backup_timestamp("ledger_20240131_235959_123.json").expect("parse");
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.second(), 59);
        assert!(parse_backup_timestamp("notes.json").is_none());
    }
}
