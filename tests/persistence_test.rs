mod common;

use anyhow::Result;
use common::{service_with_payments, test_service, TestAccount};
use std::fs;
use wallet_ledger::application::LedgerService;
use wallet_ledger::domain::{Account, PaymentStatus};
use wallet_ledger::io::{
    history_to_files, Exporter, Importer, ACCOUNTS_FILE, FAVORITES_FILE, PAYMENTS_FILE,
};

#[test]
fn test_export_to_file_appends_pipe_records() -> Result<()> {
    let (mut service, temp) = test_service()?;
    let first = service.register_account("+992000000001")?;
    service.register_account("+992000000002")?;
    service.deposit(first.id, 500)?;

    let path = temp.path().join("accounts.txt");
    let exporter = Exporter::new(&service);
    assert_eq!(exporter.export_to_file(&path)?, 2);
    exporter.export_to_file(&path)?;

    let content = fs::read_to_string(&path)?;
    let once = "1;+992000000001;500|2;+992000000002;0|";
    assert_eq!(content, format!("{}{}", once, once));
    Ok(())
}

#[test]
fn test_import_from_file_appends_without_merging() -> Result<()> {
    let (_, temp) = test_service()?;
    let path = temp.path().join("accounts.txt");
    fs::write(&path, "1;+992000000001;500|2;+992000000002;0|1;+992000000001;500|")?;

    let mut service = LedgerService::new();
    let count = Importer::new(&mut service).import_from_file(&path)?;

    assert_eq!(count, 3);
    assert_eq!(service.accounts().len(), 3);
    assert_eq!(service.accounts()[0], Account::new(1, "+992000000001").with_balance(500));

    // Imported IDs are never handed out again
    assert_eq!(service.register_account("+992000000003")?.id, 3);
    Ok(())
}

#[test]
fn test_import_from_file_malformed_record() -> Result<()> {
    let (_, temp) = test_service()?;
    let path = temp.path().join("accounts.txt");
    fs::write(&path, "1;+992000000001;500|x;+992000000002;0|3;+992000000003;0|")?;

    let mut service = LedgerService::new();
    assert!(Importer::new(&mut service).import_from_file(&path).is_err());

    // Records before the bad one stay imported
    assert_eq!(service.accounts().len(), 1);
    Ok(())
}

#[test]
fn test_import_from_file_ignores_bytes_after_last_pipe() -> Result<()> {
    let (_, temp) = test_service()?;
    let path = temp.path().join("accounts.txt");
    fs::write(&path, "1;+992000000001;5|2;+992000000002;0|\n")?;

    let mut service = LedgerService::new();
    assert_eq!(Importer::new(&mut service).import_from_file(&path)?, 2);
    assert_eq!(service.accounts()[1], Account::new(2, "+992000000002"));

    // A file without any terminator holds no complete record
    fs::write(&path, "3;+992000000003;0")?;
    assert_eq!(Importer::new(&mut service).import_from_file(&path)?, 0);
    assert_eq!(service.accounts().len(), 2);
    Ok(())
}

#[test]
fn test_import_from_missing_file() -> Result<()> {
    let (mut service, temp) = test_service()?;
    let err = Importer::new(&mut service)
        .import_from_file(temp.path().join("absent.txt"))
        .unwrap_err();
    assert!(err.downcast_ref::<std::io::Error>().is_some());
    assert!(service.accounts().is_empty());
    Ok(())
}

#[test]
fn test_export_writes_dump_files() -> Result<()> {
    let (mut service, temp) = test_service()?;
    let (account, payments) = TestAccount::default().create(&mut service)?;
    let favorite = service.favorite_payment(payments[0].id, "Taxi")?;

    let summary = Exporter::new(&service).export(temp.path())?;
    assert_eq!((summary.accounts, summary.payments, summary.favorites), (1, 1, 1));

    let accounts = fs::read_to_string(temp.path().join(ACCOUNTS_FILE))?;
    assert_eq!(accounts, format!("{};+992000000000;9900\n", account.id));

    let payments_dump = fs::read_to_string(temp.path().join(PAYMENTS_FILE))?;
    assert_eq!(
        payments_dump,
        format!("{};{};100;auto;INPROGRESS\n", payments[0].id, account.id)
    );

    let favorites_dump = fs::read_to_string(temp.path().join(FAVORITES_FILE))?;
    assert_eq!(
        favorites_dump,
        format!("{};{};100;auto\n", favorite.id, account.id)
    );
    Ok(())
}

#[test]
fn test_export_skips_empty_collections_and_truncates() -> Result<()> {
    let (mut service, temp) = test_service()?;
    service.register_account("+992000000000")?;

    Exporter::new(&service).export(temp.path())?;
    assert!(temp.path().join(ACCOUNTS_FILE).exists());
    assert!(!temp.path().join(PAYMENTS_FILE).exists());
    assert!(!temp.path().join(FAVORITES_FILE).exists());

    // A second export rewrites rather than appends
    Exporter::new(&service).export(temp.path())?;
    let accounts = fs::read_to_string(temp.path().join(ACCOUNTS_FILE))?;
    assert_eq!(accounts.lines().count(), 1);
    Ok(())
}

#[test]
fn test_export_import_roundtrip() -> Result<()> {
    let (mut service, temp) = test_service()?;
    let (_, payments) = TestAccount::default().create(&mut service)?;
    let other = TestAccount {
        phone: "+992000000001",
        balance: 3_000,
        payments: vec![(250, "mobile"), (1_000, "food")],
    };
    let (_, other_payments) = other.create(&mut service)?;
    service.reject(other_payments[1].id)?;
    service.favorite_payment(payments[0].id, "Taxi")?;

    Exporter::new(&service).export(temp.path())?;

    let mut restored = LedgerService::new();
    let summary = Importer::new(&mut restored).import(temp.path())?;
    assert_eq!(summary.appended, 2 + 3 + 1);
    assert_eq!(summary.merged, 0);

    assert_eq!(restored.accounts(), service.accounts());
    assert_eq!(restored.payments(), service.payments());
    assert_eq!(
        restored.find_payment(other_payments[1].id)?.status,
        PaymentStatus::Fail
    );

    // Favorites keep everything but the display name
    let original = &service.favorites()[0];
    let loaded = &restored.favorites()[0];
    assert_eq!(loaded.id, original.id);
    assert_eq!(loaded.account_id, original.account_id);
    assert_eq!(loaded.amount, original.amount);
    assert_eq!(loaded.category, original.category);

    // New accounts continue after the highest imported ID
    assert_eq!(restored.register_account("+992000000002")?.id, 3);
    Ok(())
}

#[test]
fn test_import_merges_by_id() -> Result<()> {
    let (mut service, temp) = test_service()?;
    let (account, payments) = TestAccount::default().create(&mut service)?;
    service.favorite_payment(payments[0].id, "Taxi")?;
    Exporter::new(&service).export(temp.path())?;

    // Change in-memory state, then import the older dump over it
    service.deposit(account.id, 5_000)?;
    service.reject(payments[0].id)?;

    let summary = Importer::new(&mut service).import(temp.path())?;
    assert_eq!(summary.merged, 3);
    assert_eq!(summary.appended, 0);

    assert_eq!(service.accounts().len(), 1);
    assert_eq!(service.payments().len(), 1);
    assert_eq!(service.find_account(account.id)?.balance, 9_900);
    assert_eq!(
        service.find_payment(payments[0].id)?.status,
        PaymentStatus::InProgress
    );
    assert_eq!(service.favorites()[0].name, "Taxi");
    Ok(())
}

#[test]
fn test_import_reads_files_independently() -> Result<()> {
    let (mut service, temp) = test_service()?;
    TestAccount::default().create(&mut service)?;
    Exporter::new(&service).export(temp.path())?;
    fs::remove_file(temp.path().join(ACCOUNTS_FILE))?;

    let mut restored = LedgerService::new();
    let summary = Importer::new(&mut restored).import(temp.path())?;

    assert_eq!(summary.total(), 1);
    assert!(restored.accounts().is_empty());
    assert_eq!(restored.payments().len(), 1);
    Ok(())
}

#[test]
fn test_import_empty_directory() -> Result<()> {
    let (mut service, temp) = test_service()?;
    let summary = Importer::new(&mut service).import(temp.path())?;
    assert_eq!(summary.total(), 0);
    Ok(())
}

#[test]
fn test_import_skips_blank_dump_lines() -> Result<()> {
    let (mut service, temp) = test_service()?;
    fs::write(
        temp.path().join(ACCOUNTS_FILE),
        "1;+992000000001;5\n\n2;+992000000002;0\n",
    )?;

    let summary = Importer::new(&mut service).import(temp.path())?;
    assert_eq!(summary.appended, 2);
    assert_eq!(service.accounts().len(), 2);
    Ok(())
}

#[test]
fn test_dump_fields_are_written_unquoted() -> Result<()> {
    let (mut service, temp) = test_service()?;
    let fixture = TestAccount {
        payments: vec![(100, "say \"hi\"")],
        ..TestAccount::default()
    };
    let (account, payments) = fixture.create(&mut service)?;
    Exporter::new(&service).export(temp.path())?;

    let payments_dump = fs::read_to_string(temp.path().join(PAYMENTS_FILE))?;
    assert_eq!(
        payments_dump,
        format!("{};{};100;say \"hi\";INPROGRESS\n", payments[0].id, account.id)
    );

    let mut restored = LedgerService::new();
    Importer::new(&mut restored).import(temp.path())?;
    assert_eq!(restored.find_payment(payments[0].id)?.category, "say \"hi\"");
    Ok(())
}

#[test]
fn test_import_malformed_dump_keeps_earlier_records() -> Result<()> {
    let (mut service, temp) = test_service()?;
    fs::write(
        temp.path().join(ACCOUNTS_FILE),
        "1;+992000000001;100\n2;+992000000002;not-a-number\n3;+992000000003;0\n",
    )?;

    assert!(Importer::new(&mut service).import(temp.path()).is_err());
    assert_eq!(service.accounts().len(), 1);
    Ok(())
}

#[test]
fn test_history_to_files_single_file() -> Result<()> {
    let (_, temp) = test_service()?;
    let service = service_with_payments(100)?;

    let files = history_to_files(service.payments(), temp.path(), 100)?;
    assert_eq!(files, vec![PAYMENTS_FILE.to_string()]);

    let content = fs::read_to_string(temp.path().join(PAYMENTS_FILE))?;
    assert_eq!(content.lines().count(), 100);
    assert!(!temp.path().join("payments1.dump").exists());
    Ok(())
}

#[test]
fn test_history_to_files_chunks() -> Result<()> {
    let (_, temp) = test_service()?;
    let service = service_with_payments(250)?;

    let files = history_to_files(service.payments(), temp.path(), 100)?;
    assert_eq!(files, vec!["payments1.dump", "payments2.dump", "payments3.dump"]);

    let counts: Vec<usize> = files
        .iter()
        .map(|name| fs::read_to_string(temp.path().join(name)).map(|c| c.lines().count()))
        .collect::<std::io::Result<_>>()?;
    assert_eq!(counts, vec![100, 100, 50]);
    assert!(!temp.path().join(PAYMENTS_FILE).exists());

    // Chunk files use the same record format as the directory dump
    let first_line = fs::read_to_string(temp.path().join("payments3.dump"))?
        .lines()
        .next()
        .map(str::to_string)
        .unwrap_or_default();
    let expected = &service.payments()[200];
    assert_eq!(
        first_line,
        format!("{};{};201;bulk;INPROGRESS", expected.id, expected.account_id)
    );
    Ok(())
}

#[test]
fn test_history_to_files_rejects_zero_chunk_size() -> Result<()> {
    let (_, temp) = test_service()?;
    let service = service_with_payments(3)?;
    assert!(history_to_files(service.payments(), temp.path(), 0).is_err());
    Ok(())
}

#[test]
fn test_snapshot_json_roundtrip() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    let (_, payments) = TestAccount::default().create(&mut service)?;
    service.favorite_payment(payments[0].id, "Taxi")?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&service).export_snapshot_json(&mut buffer)?;
    assert_eq!(snapshot.accounts.len(), 1);

    let mut restored = LedgerService::new();
    let summary = Importer::new(&mut restored).import_snapshot_json(buffer.as_slice())?;

    assert_eq!(summary.appended, 3);
    assert_eq!(restored.accounts(), service.accounts());
    assert_eq!(restored.payments(), service.payments());
    assert_eq!(restored.favorites(), service.favorites());
    Ok(())
}
