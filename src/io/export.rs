use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::application::LedgerService;
use crate::domain::{Account, Favorite, Payment};

use super::{
    dump_writer, legacy_writer, payments_chunk_file, FavoriteRecord, ACCOUNTS_FILE,
    FAVORITES_FILE, PAYMENTS_FILE,
};

/// Full ledger snapshot for JSON export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
    pub payments: Vec<Payment>,
    pub favorites: Vec<Favorite>,
}

/// Number of records written per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub accounts: usize,
    pub payments: usize,
    pub favorites: usize,
}

/// Exporter for writing ledger data to flat files
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Append every account to `path` as `ID;Phone;Balance|`.
    ///
    /// The file is created if missing and never truncated.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {} for appending", path.display()))?;

        let mut writer = legacy_writer().from_writer(file);
        for account in self.service.accounts() {
            writer
                .serialize(account)
                .with_context(|| format!("Failed to write account to {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;

        let count = self.service.accounts().len();
        info!(path = %path.display(), accounts = count, "accounts appended to file");
        Ok(count)
    }

    /// Rewrite the dump directory: one file per non-empty collection.
    ///
    /// Files for empty collections are left as they are. A failure part way
    /// through leaves the files already written in place.
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<ExportSummary> {
        let dir = dir.as_ref();
        let mut summary = ExportSummary::default();

        let accounts = self.service.accounts();
        if !accounts.is_empty() {
            write_records(&dir.join(ACCOUNTS_FILE), accounts)?;
            summary.accounts = accounts.len();
        }

        let payments = self.service.payments();
        if !payments.is_empty() {
            write_records(&dir.join(PAYMENTS_FILE), payments)?;
            summary.payments = payments.len();
        }

        let favorites = self.service.favorites();
        if !favorites.is_empty() {
            let records: Vec<FavoriteRecord> = favorites.iter().map(FavoriteRecord::from).collect();
            write_records(&dir.join(FAVORITES_FILE), &records)?;
            summary.favorites = favorites.len();
        }

        info!(
            dir = %dir.display(),
            accounts = summary.accounts,
            payments = summary.payments,
            favorites = summary.favorites,
            "ledger exported"
        );
        Ok(summary)
    }

    /// Export the full ledger as a pretty-printed JSON snapshot
    pub fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            accounts: self.service.accounts().to_vec(),
            payments: self.service.payments().to_vec(),
            favorites: self.service.favorites().to_vec(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

/// Write a payment history into `dir`.
///
/// Histories of at most `records_per_file` payments go to `payments.dump`;
/// longer ones are split into `payments1.dump`, `payments2.dump`, ... with
/// `records_per_file` records each (the last file may hold fewer).
/// Returns the names of the files written.
pub fn history_to_files(
    payments: &[Payment],
    dir: impl AsRef<Path>,
    records_per_file: usize,
) -> Result<Vec<String>> {
    ensure!(records_per_file > 0, "records per file must be greater than 0");
    let dir = dir.as_ref();

    if payments.len() <= records_per_file {
        write_records(&dir.join(PAYMENTS_FILE), payments)?;
        return Ok(vec![PAYMENTS_FILE.to_string()]);
    }

    let mut files = Vec::new();
    for (i, chunk) in payments.chunks(records_per_file).enumerate() {
        let name = payments_chunk_file(i + 1);
        write_records(&dir.join(&name), chunk)?;
        files.push(name);
    }

    info!(dir = %dir.display(), files = files.len(), payments = payments.len(), "history split across files");
    Ok(files)
}

/// Truncate `path` and write one `;`-delimited line per record.
fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = dump_writer().from_writer(file);

    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write record to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;

    debug!(path = %path.display(), records = records.len(), "dump file written");
    Ok(())
}

/// Create `dir` if it does not exist yet.
pub fn ensure_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}
