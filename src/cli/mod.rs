use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::application::LedgerService;
use crate::domain::{format_money, parse_money, Account, Currency, Money, Payment};
use crate::io::{ensure_dir, history_to_files, Exporter, Importer};

/// Wallet Ledger - accounts, payments and favorite payments
#[derive(Parser)]
#[command(name = "wallet-ledger")]
#[command(about = "An in-memory wallet ledger persisted to a directory of dump files")]
#[command(version)]
pub struct Cli {
    /// Directory holding accounts.dump, payments.dump and favorites.dump
    #[arg(short, long, env = "WALLET_LEDGER_DATA_DIR", default_value = "wallet-data")]
    pub data_dir: PathBuf,

    /// Currency label used when printing amounts (TJS, RUB, USD)
    #[arg(long, env = "WALLET_LEDGER_CURRENCY", default_value = "TJS", value_parser = parse_currency)]
    pub currency: Currency,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new account
    Register {
        /// Phone number (must be unique)
        phone: String,
    },

    /// Deposit money into an account
    Deposit {
        account_id: i64,

        /// Amount (e.g., "100.00" or "100")
        #[arg(value_parser = parse_amount)]
        amount: Money,
    },

    /// Pay from an account
    Pay {
        account_id: i64,

        /// Amount (e.g., "100.00" or "100")
        #[arg(value_parser = parse_amount)]
        amount: Money,

        /// Payment category (e.g., "auto", "mobile")
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Reject a payment and return its amount to the account
    Reject {
        payment_id: String,
    },

    /// Repeat an earlier payment
    Repeat {
        payment_id: String,
    },

    /// Save a payment as a favorite
    Favorite {
        payment_id: String,

        /// Display name for the favorite
        name: String,
    },

    /// Pay using a saved favorite
    PayFavorite {
        favorite_id: String,
    },

    /// Show an account
    Account {
        account_id: i64,
    },

    /// Show a payment
    Payment {
        payment_id: String,
    },

    /// Sum all payment amounts
    Sum {
        /// Number of concurrent workers (0 = single pass)
        #[arg(short, long, default_value = "0")]
        workers: usize,
    },

    /// Write an account's payment history to dump files
    History {
        account_id: i64,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Maximum number of payments per file
        #[arg(long, default_value = "100")]
        per_file: usize,
    },

    /// Append all accounts to a single pipe-delimited file
    ExportLegacy {
        file: PathBuf,
    },

    /// Append accounts from a single pipe-delimited file
    ImportLegacy {
        file: PathBuf,
    },

    /// Export the full ledger as JSON
    Snapshot {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    fn is_mutating(&self) -> bool {
        matches!(
            self,
            Commands::Register { .. }
                | Commands::Deposit { .. }
                | Commands::Pay { .. }
                | Commands::Reject { .. }
                | Commands::Repeat { .. }
                | Commands::Favorite { .. }
                | Commands::PayFavorite { .. }
                | Commands::ImportLegacy { .. }
        )
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mut service = load_ledger(&self.data_dir)?;
        let mutating = self.command.is_mutating();
        let currency = self.currency;

        match self.command {
            Commands::Register { phone } => {
                let account = service.register_account(&phone)?;
                println!("Registered account {} ({})", account.id, account.phone);
            }

            Commands::Deposit { account_id, amount } => {
                service.deposit(account_id, amount)?;
                print_account(service.find_account(account_id)?, currency);
            }

            Commands::Pay {
                account_id,
                amount,
                category,
            } => {
                let payment = service.pay(account_id, amount, category.as_deref().unwrap_or(""))?;
                print_payment(&payment, currency);
            }

            Commands::Reject { payment_id } => {
                let id = parse_id(&payment_id, "payment")?;
                service.reject(id)?;
                print_payment(service.find_payment(id)?, currency);
            }

            Commands::Repeat { payment_id } => {
                let payment = service.repeat(parse_id(&payment_id, "payment")?)?;
                print_payment(&payment, currency);
            }

            Commands::Favorite { payment_id, name } => {
                let favorite =
                    service.favorite_payment(parse_id(&payment_id, "payment")?, &name)?;
                println!(
                    "Saved favorite {} '{}': {} {} ({})",
                    favorite.id,
                    favorite.name,
                    format_money(favorite.amount),
                    currency,
                    favorite.category
                );
            }

            Commands::PayFavorite { favorite_id } => {
                let payment = service.pay_from_favorite(parse_id(&favorite_id, "favorite")?)?;
                print_payment(&payment, currency);
            }

            Commands::Account { account_id } => {
                print_account(service.find_account(account_id)?, currency);
            }

            Commands::Payment { payment_id } => {
                print_payment(service.find_payment(parse_id(&payment_id, "payment")?)?, currency);
            }

            Commands::Sum { workers } => {
                let total = service.sum_payments(workers)?;
                println!("{} {}", format_money(total), currency);
            }

            Commands::History {
                account_id,
                out,
                per_file,
            } => {
                let history = service.account_history(account_id)?;
                ensure_dir(&out)?;
                let files = history_to_files(&history, &out, per_file)?;
                println!(
                    "Wrote {} payments to {} file(s) in {}",
                    history.len(),
                    files.len(),
                    out.display()
                );
            }

            Commands::ExportLegacy { file } => {
                let count = Exporter::new(&service).export_to_file(&file)?;
                println!("Appended {} accounts to {}", count, file.display());
            }

            Commands::ImportLegacy { file } => {
                let count = Importer::new(&mut service).import_from_file(&file)?;
                println!("Imported {} accounts from {}", count, file.display());
            }

            Commands::Snapshot { output } => {
                let writer: Box<dyn Write> = match &output {
                    Some(path) => Box::new(File::create(path).with_context(|| {
                        format!("Failed to create output file: {}", path.display())
                    })?),
                    None => Box::new(stdout()),
                };
                let snapshot = Exporter::new(&service).export_snapshot_json(writer)?;
                if let Some(path) = output {
                    eprintln!(
                        "Exported {} accounts, {} payments, {} favorites to {}",
                        snapshot.accounts.len(),
                        snapshot.payments.len(),
                        snapshot.favorites.len(),
                        path.display()
                    );
                }
            }
        }

        if mutating {
            ensure_dir(&self.data_dir)?;
            Exporter::new(&service).export(&self.data_dir)?;
        }

        Ok(())
    }
}

/// Build a ledger from the data directory, or an empty one if it does not exist yet.
fn load_ledger(data_dir: &Path) -> Result<LedgerService> {
    let mut service = LedgerService::new();
    if data_dir.is_dir() {
        Importer::new(&mut service)
            .import(data_dir)
            .with_context(|| format!("Failed to load ledger from {}", data_dir.display()))?;
    }
    Ok(service)
}

fn parse_id(input: &str, kind: &str) -> Result<Uuid> {
    Uuid::parse_str(input).with_context(|| format!("Invalid {} ID: {}", kind, input))
}

fn parse_amount(input: &str) -> Result<Money, String> {
    parse_money(input).map_err(|e| e.to_string())
}

fn parse_currency(input: &str) -> Result<Currency, String> {
    Currency::from_str(input).ok_or_else(|| format!("unknown currency '{}'", input))
}

fn print_account(account: &Account, currency: Currency) {
    println!("Account {}", account.id);
    println!("  Phone:    {}", account.phone);
    println!("  Balance:  {} {}", format_money(account.balance), currency);
}

fn print_payment(payment: &Payment, currency: Currency) {
    println!("Payment {}", payment.id);
    println!("  Account:  {}", payment.account_id);
    println!("  Amount:   {} {}", format_money(payment.amount), currency);
    println!("  Category: {}", payment.category);
    println!("  Status:   {}", payment.status);
}
