use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tallybook::{
    Amount, Category, CategoryColor, CategoryName, Description, Transaction, TransactionName,
    TransactionType, create_category, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for tallybook.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// The default categories as (name, color, description).
const DEFAULT_CATEGORIES: [(&str, &str, &str); 8] = [
    ("Salary", "#10B981", "Monthly salary and wages"),
    ("Food & Dining", "#F59E0B", "Restaurants, groceries, and food expenses"),
    ("Transportation", "#3B82F6", "Gas, public transport, car expenses"),
    ("Entertainment", "#8B5CF6", "Movies, games, leisure activities"),
    ("Shopping", "#EF4444", "Clothing, electronics, general shopping"),
    ("Healthcare", "#06B6D4", "Medical expenses and insurance"),
    ("Utilities", "#84CC16", "Electricity, water, internet bills"),
    ("Investment", "#14B8A6", "Stocks, bonds, investment returns"),
];

/// Sample transactions as (name, amount in cents, type, days ago, category index).
const SAMPLE_TRANSACTIONS: [(&str, i64, TransactionType, i64, usize); 3] = [
    ("Monthly Salary", 500_000, TransactionType::Income, 5, 0),
    ("Grocery Shopping", 12_550, TransactionType::Expense, 2, 1),
    ("Gas Station", 4_500, TransactionType::Expense, 1, 2),
];

/// Recurring monthly transactions added for each of the previous months as
/// (name, amount in cents, type, day of month, category index).
const MONTHLY_TRANSACTIONS: [(&str, i64, TransactionType, u8, usize); 5] = [
    ("Salary", 500_000, TransactionType::Income, 1, 0),
    ("Supermarket", 32_075, TransactionType::Expense, 8, 1),
    ("Electricity Bill", 14_210, TransactionType::Expense, 12, 6),
    ("Cinema", 3_600, TransactionType::Expense, 20, 3),
    ("Dividend", 8_125, TransactionType::Income, 25, 7),
];

/// How many months before the current one get recurring transactions.
const HISTORY_MONTHS: u32 = 5;

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

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user = create_user("Test User", "test@example.com", &conn)?;

    println!("Creating default categories...");
    let mut category_ids = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for (name, color, description) in DEFAULT_CATEGORIES {
        let category = create_category(
            user.id,
            Category::build(CategoryName::new(name)?, CategoryColor::new(color)?)
                .description(Description::new(description)?),
            &conn,
        )?;
        category_ids.push(category.id);
    }

    println!("Creating sample transactions...");
    let today = OffsetDateTime::now_utc().date();

    for (name, cents, transaction_type, days_ago, category_index) in SAMPLE_TRANSACTIONS {
        create_transaction(
            user.id,
            Transaction::build(
                Amount::new(Decimal::new(cents, 2))?,
                transaction_type,
                today - Duration::days(days_ago),
                TransactionName::new(name)?,
                category_ids[category_index],
            ),
            &conn,
        )?;
    }

    let mut month_start = today.replace_day(1)?;
    for _ in 0..HISTORY_MONTHS {
        month_start = previous_month_start(month_start)?;

        for (name, cents, transaction_type, day, category_index) in MONTHLY_TRANSACTIONS {
            create_transaction(
                user.id,
                Transaction::build(
                    Amount::new(Decimal::new(cents, 2))?,
                    transaction_type,
                    month_start.replace_day(day)?,
                    TransactionName::new(name)?,
                    category_ids[category_index],
                ),
                &conn,
            )?;
        }
    }

    println!("Success! Created user {} with {} categories.", user.id, category_ids.len());

    Ok(())
}

fn previous_month_start(month_start: Date) -> Result<Date, Box<dyn Error>> {
    let last_day_of_previous_month = month_start
        .previous_day()
        .ok_or("ran out of dates before the first month")?;

    Ok(last_day_of_previous_month.replace_day(1)?)
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
