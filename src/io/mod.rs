// Persistence adapter - flat-file dumps of the ledger collections.
//
// Two on-disk layouts coexist and are deliberately kept apart:
// - the legacy single file: `ID;Phone;Balance|...` accounts only, appended
// - the dump directory: one newline-delimited file per collection, merged by ID
//
// Fields are written raw, never quoted, so a `;` inside a phone or category
// cannot be read back. Blank lines in a dump are skipped on import.

mod export;
mod import;

pub use export::*;
pub use import::*;

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Favorite, FavoriteId, Money};

pub const ACCOUNTS_FILE: &str = "accounts.dump";
pub const PAYMENTS_FILE: &str = "payments.dump";
pub const FAVORITES_FILE: &str = "favorites.dump";

const FIELD_DELIMITER: u8 = b';';
const LEGACY_RECORD_TERMINATOR: u8 = b'|';

/// Name of the `n`th (1-based) chunk file of a split payment history.
pub fn payments_chunk_file(n: usize) -> String {
    format!("payments{}.dump", n)
}

/// On-disk shape of a favorite: `ID;AccountID;Amount;Category`.
/// The display name is not part of the dump format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FavoriteRecord {
    id: FavoriteId,
    account_id: AccountId,
    amount: Money,
    category: String,
}

impl From<&Favorite> for FavoriteRecord {
    fn from(favorite: &Favorite) -> Self {
        Self {
            id: favorite.id,
            account_id: favorite.account_id,
            amount: favorite.amount,
            category: favorite.category.clone(),
        }
    }
}

impl From<FavoriteRecord> for Favorite {
    fn from(record: FavoriteRecord) -> Self {
        Self {
            id: record.id,
            account_id: record.account_id,
            name: String::new(),
            amount: record.amount,
            category: record.category,
        }
    }
}

fn dump_writer() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .has_headers(false)
        .delimiter(FIELD_DELIMITER)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'));
    builder
}

fn dump_reader() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(FIELD_DELIMITER)
        .quoting(false)
        .terminator(Terminator::Any(b'\n'));
    builder
}

fn legacy_writer() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .has_headers(false)
        .delimiter(FIELD_DELIMITER)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(LEGACY_RECORD_TERMINATOR));
    builder
}

fn legacy_reader() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(FIELD_DELIMITER)
        .quoting(false)
        .terminator(Terminator::Any(LEGACY_RECORD_TERMINATOR));
    builder
}
