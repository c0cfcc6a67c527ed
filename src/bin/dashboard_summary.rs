use std::error::Error;

use clap::Parser;
use rusqlite::{Connection, OpenFlags};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tallybook::{
    BreakdownKey, SQLiteTransactionStore, SummaryAggregator, UserID, get_local_now, get_user,
};

/// Print the dashboard summary of a tallybook user as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The ID of the user to summarise.
    #[arg(long)]
    user_id: i64,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// How to group the category breakdown.
    #[arg(long, value_enum, default_value_t = BreakdownKey::CategoryName)]
    group_by: BreakdownKey,
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let conn = Connection::open_with_flags(&args.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let user = get_user(UserID::new(args.user_id), &conn)
        .inspect_err(|error| tracing::error!("could not find user {}: {error}", args.user_id))?;

    let now = get_local_now(&args.timezone)?;
    tracing::info!("Computing dashboard summary for {} as of {now}", user.name);

    let summary = SummaryAggregator::new(SQLiteTransactionStore::new(&conn))
        .breakdown_key(args.group_by)
        .compute_summary(user.id, now)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
