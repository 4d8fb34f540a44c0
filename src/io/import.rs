use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::application::LedgerService;
use crate::domain::{Account, Favorite, Payment};
use crate::io::export::LedgerSnapshot;

use super::{
    dump_reader, legacy_reader, FavoriteRecord, ACCOUNTS_FILE, FAVORITES_FILE,
    LEGACY_RECORD_TERMINATOR, PAYMENTS_FILE,
};

/// Result of an import operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records that did not exist and were appended
    pub appended: usize,
    /// Records whose ID already existed and were overwritten in place
    pub merged: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.appended + self.merged
    }

    fn record(&mut self, merged: bool) {
        if merged {
            self.merged += 1;
        } else {
            self.appended += 1;
        }
    }
}

/// Importer for loading flat-file data into the ledger
pub struct Importer<'a> {
    service: &'a mut LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a mut LedgerService) -> Self {
        Self { service }
    }

    /// Append every `ID;Phone;Balance|` record in `path` as a new account.
    ///
    /// No merging or duplicate detection happens here. Anything after the
    /// last `|` is ignored. A malformed record aborts the import; accounts
    /// appended before it stay in the ledger.
    pub fn import_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content =
            fs::read(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let end = content
            .iter()
            .rposition(|&b| b == LEGACY_RECORD_TERMINATOR)
            .map_or(0, |i| i + 1);
        let mut reader = legacy_reader().from_reader(&content[..end]);

        let repo = self.service.repo_mut();
        let mut count = 0;
        for (i, result) in reader.deserialize::<Account>().enumerate() {
            let account = result
                .with_context(|| format!("Invalid account record {} in {}", i + 1, path.display()))?;
            repo.push_account(account);
            count += 1;
        }

        info!(path = %path.display(), accounts = count, "accounts imported from file");
        Ok(count)
    }

    /// Load whichever dump files exist in `dir`, merging records by ID.
    ///
    /// Each file is optional on its own. A malformed record aborts the
    /// import; records merged before it stay in the ledger.
    pub fn import(&mut self, dir: impl AsRef<Path>) -> Result<ImportSummary> {
        let dir = dir.as_ref();
        let mut summary = ImportSummary::default();

        let path = dir.join(ACCOUNTS_FILE);
        if path.exists() {
            for account in read_records::<Account>(&path)? {
                let merged = self.service.repo_mut().upsert_account(account?);
                summary.record(merged);
            }
        }

        let path = dir.join(PAYMENTS_FILE);
        if path.exists() {
            for payment in read_records::<Payment>(&path)? {
                let merged = self.service.repo_mut().upsert_payment(payment?);
                summary.record(merged);
            }
        }

        let path = dir.join(FAVORITES_FILE);
        if path.exists() {
            for record in read_records::<FavoriteRecord>(&path)? {
                let merged = self.service.repo_mut().upsert_favorite(Favorite::from(record?));
                summary.record(merged);
            }
        }

        info!(
            dir = %dir.display(),
            appended = summary.appended,
            merged = summary.merged,
            "ledger imported"
        );
        Ok(summary)
    }

    /// Merge a JSON snapshot into the ledger by ID
    pub fn import_snapshot_json<R: Read>(&mut self, reader: R) -> Result<ImportSummary> {
        let snapshot: LedgerSnapshot = serde_json::from_reader(reader)?;
        let repo = self.service.repo_mut();
        let mut summary = ImportSummary::default();

        for account in snapshot.accounts {
            summary.record(repo.upsert_account(account));
        }
        for payment in snapshot.payments {
            summary.record(repo.upsert_payment(payment));
        }
        for favorite in snapshot.favorites {
            summary.record(repo.upsert_favorite(favorite));
        }

        info!(
            version = %snapshot.version,
            appended = summary.appended,
            merged = summary.merged,
            "snapshot imported"
        );
        Ok(summary)
    }
}

/// Lazily parse the `;`-delimited lines of a dump file.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<impl Iterator<Item = Result<T>>> {
    let reader = dump_reader()
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    debug!(path = %path.display(), "reading dump file");

    let display = path.display().to_string();
    Ok(reader
        .into_deserialize::<T>()
        .enumerate()
        .map(move |(i, result)| {
            result.with_context(|| format!("Invalid record {} in {}", i + 1, display))
        }))
}
