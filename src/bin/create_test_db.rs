use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use caderneta::{
    ledger::{Frequency, LedgerConfig},
    models::{Transaction, TransactionKind, UserId},
    stores::{AccountStore, CardStore, CategoryStore, sqlite::create_ledger_service},
};

/// A utility for creating a database with demo data for manual testing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    let mut service = create_ledger_service(conn, LedgerConfig::default())?;

    let user_id = UserId::new(1);
    let today = OffsetDateTime::now_utc().date();

    println!("Creating test accounts, card and categories...");

    let checking = service.accounts.create(user_id, "Checking", 150_000)?;
    let savings = service.accounts.create(user_id, "Savings", 500_000)?;
    let card = service.cards.create(user_id, "Platinum", 28, 10, 500_000)?;
    let groceries = service.categories.create(user_id, "Groceries")?;
    service.categories.create(user_id, "Rent")?;
    service.categories.create(user_id, "Wages")?;

    println!("Creating a settled transaction...");
    service.create_simple_transaction(
        user_id,
        Transaction::draft(4_599, TransactionKind::Expense, today, "Weekly shop")
            .account(checking.id)
            .category(Some(groceries.id))
            .settled(true),
    )?;

    println!("Creating a monthly recurring series...");
    let instances = service.create_recurring_transaction(
        user_id,
        Transaction::draft(8_990, TransactionKind::Expense, today, "Gym membership")
            .account(checking.id),
        today,
        Frequency::Monthly,
        12,
        true,
    )?;
    println!("  created {} instances", instances.len());

    println!("Creating an installment purchase...");
    let installments = service.create_installment_purchase(
        user_id,
        card.id,
        today,
        89_990,
        6,
        "Noise-cancelling headphones",
        None,
    )?;
    println!("  created {} installments", installments.len());

    println!("Transferring between accounts...");
    let outcome = service.transfer(
        user_id,
        checking.id,
        savings.id,
        25_000,
        today,
        "Monthly savings",
    )?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    println!("Success!");

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
