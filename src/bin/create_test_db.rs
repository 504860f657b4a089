//! A utility for creating a database pre-filled with demo data.

use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::{Connection, params};
use time::{Duration, OffsetDateTime};

use money_trckr::{PasswordHash, ValidatedPassword, create_user, initialize_db};

/// A utility for creating a test database for the Money Trckr server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
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

    initialize_db(&conn)?;

    println!("Creating test user...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    create_user("test@example.com", password_hash, &conn)?;

    println!("Creating test accounts...");
    let now = OffsetDateTime::now_utc();
    conn.execute(
        "INSERT INTO account (name, balance, icon, owner, created_at) VALUES
            ('Salary card', 2500000.0, 'card', NULL, ?1),
            ('Cash wallet', 150000.0, 'wallet', NULL, ?1),
            ('Savings', 12000000.0, 'savings', 'Aziz', ?1)",
        params![now],
    )?;

    println!("Creating test history...");
    // Types: 0 expense, 1 withdrawal, 2 transfer, 3 topup.
    let history = [
        (1, 55_000.0, 0, 1, "Korzinka", "groceries"),
        (1, 3_200_000.0, 3, 3, "Employer", "salary"),
        (2, 200_000.0, 1, 5, "ATM Amir Temur", ""),
        (1, 500_000.0, 2, 7, "To savings", ""),
        (2, 18_000.0, 0, 9, "Chaikhana", "lunch"),
    ];
    for (account_id, amount, transaction_type, days_ago, location, description) in history {
        conn.execute(
            "INSERT INTO history (account_id, amount, transaction_type, date, location, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account_id,
                amount,
                transaction_type,
                now - Duration::days(days_ago),
                location,
                description
            ],
        )?;
    }

    println!("Creating test notifications...");
    conn.execute(
        "INSERT INTO notification (amount, transaction_type, date, location, description) VALUES
            (32000.0, 0, ?1, 'Yandex Go', ''),
            (1250000.0, 3, ?2, 'Employer', 'bonus')",
        params![now - Duration::hours(3), now - Duration::hours(26)],
    )?;

    println!("Success!");

    Ok(())
}
