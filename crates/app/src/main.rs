use std::error::Error;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use migration::MigratorTrait;
use uuid::Uuid;

use engine::{
    BudgetUpdate, Engine, EntryKind, MoneyCents, NewBudgetCmd, NewCategoryCmd, NewTransactionCmd,
    TransactionListFilter,
};
use settings::Database;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "pecunia")]
#[command(about = "Personal finance tracker: transactions, categories, budgets, monthly reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Category(Category),
    Budget(Budget),
    Transaction(Transaction),
    /// Monthly summary grouped by category.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Add {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_kind)]
        kind: EntryKind,
        #[arg(long)]
        budget: Option<Uuid>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    List {
        #[arg(long)]
        user: Uuid,
    },
    /// Signed net total over all of the category's transactions.
    Total {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
    },
    Remove {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct Budget {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    Add {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_date)]
        starts: DateTime<Utc>,
        #[arg(long, value_parser = parse_date)]
        ends: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_amount)]
        limit: MoneyCents,
    },
    List {
        #[arg(long)]
        user: Uuid,
    },
    /// Budget total: `spent` plus the linked categories' signed totals.
    Total {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
    },
    /// Adds to the budget's independently tracked `spent` accumulator.
    Spend {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long, value_parser = parse_amount)]
        amount: MoneyCents,
    },
    /// Sets the budget's spending ceiling.
    Limit {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long, value_parser = parse_amount)]
        limit: MoneyCents,
    },
    Remove {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct Transaction {
    #[command(subcommand)]
    command: TransactionCommand,
}

#[derive(Subcommand, Debug)]
enum TransactionCommand {
    Add {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        category: Uuid,
        #[arg(long, value_parser = parse_amount)]
        amount: MoneyCents,
        #[arg(long, value_parser = parse_kind)]
        kind: EntryKind,
        /// Date of occurrence (`YYYY-MM-DD` or RFC 3339).
        #[arg(long, value_parser = parse_date)]
        date: DateTime<Utc>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        account: Option<String>,
    },
    List {
        #[arg(long)]
        user: Uuid,
        /// Inclusive lower bound.
        #[arg(long, value_parser = parse_date)]
        from: Option<DateTime<Utc>>,
        /// Exclusive upper bound.
        #[arg(long, value_parser = parse_date)]
        to: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_kind)]
        kind: Option<EntryKind>,
        #[arg(long)]
        category: Option<Uuid>,
    },
    Remove {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[arg(long)]
    user: Uuid,
    /// Month in `YYYY-MM` form; defaults to the current month.
    #[arg(long)]
    month: Option<String>,
}

fn parse_kind(raw: &str) -> Result<EntryKind, String> {
    EntryKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_amount(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
        .map_err(|_| format!("invalid date '{raw}': expected YYYY-MM-DD or RFC 3339"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pecunia={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let database = settings
        .database
        .unwrap_or_else(|| Database::Sqlite("./pecunia.db".to_string()));
    let db = connect_database(&database).await?;
    let engine = Engine::builder().database(db).build().await?;

    run(&engine, cli.command).await
}

async fn connect_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
    };

    let database = sea_orm::Database::connect(url).await?;
    migration::Migrator::up(&database, None).await?;
    Ok(database)
}

async fn run(engine: &Engine, command: Command) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        Command::User(user) => match user.command {
            UserCommand::Create { email, name } => {
                let id = engine.new_user(&email, &name).await?;
                tracing::info!("created user {id}");
                println!("{id}");
            }
        },
        Command::Category(category) => match category.command {
            CategoryCommand::Add {
                user,
                name,
                kind,
                budget,
                color,
                icon,
            } => {
                let mut cmd = NewCategoryCmd::new(user, name, kind);
                if let Some(budget) = budget {
                    cmd = cmd.budget_id(budget);
                }
                if let Some(color) = color {
                    cmd = cmd.color(color);
                }
                if let Some(icon) = icon {
                    cmd = cmd.icon(icon);
                }
                let id = engine.new_category(cmd).await?;
                println!("{id}");
            }
            CategoryCommand::List { user } => {
                let categories = engine.categories(user).await?;
                println!("{}", serde_json::to_string_pretty(&categories)?);
            }
            CategoryCommand::Total { user, id } => {
                let rollup = engine.category_rollup(user, id).await?;
                println!("{}", serde_json::to_string_pretty(&rollup)?);
            }
            CategoryCommand::Remove { user, id } => {
                engine.delete_category(user, id).await?;
            }
        },
        Command::Budget(budget) => match budget.command {
            BudgetCommand::Add {
                user,
                name,
                starts,
                ends,
                limit,
            } => {
                let mut cmd = NewBudgetCmd::new(user, name, starts, limit);
                if let Some(ends) = ends {
                    cmd = cmd.ends_at(ends);
                }
                let id = engine.new_budget(cmd).await?;
                println!("{id}");
            }
            BudgetCommand::List { user } => {
                let budgets = engine.budgets(user).await?;
                println!("{}", serde_json::to_string_pretty(&budgets)?);
            }
            BudgetCommand::Total { user, id } => {
                let rollup = engine.budget_rollup(user, id).await?;
                println!("{}", serde_json::to_string_pretty(&rollup)?);
            }
            BudgetCommand::Spend { user, id, amount } => {
                let spent = engine.record_spent(user, id, amount).await?;
                println!("{spent}");
            }
            BudgetCommand::Limit { user, id, limit } => {
                engine
                    .update_budget(user, id, BudgetUpdate::default().limit(limit))
                    .await?;
            }
            BudgetCommand::Remove { user, id } => {
                engine.delete_budget(user, id).await?;
            }
        },
        Command::Transaction(transaction) => match transaction.command {
            TransactionCommand::Add {
                user,
                category,
                amount,
                kind,
                date,
                note,
                account,
            } => {
                let mut cmd = NewTransactionCmd::new(user, category, amount, kind, date);
                if let Some(note) = note {
                    cmd = cmd.note(note);
                }
                if let Some(account) = account {
                    cmd = cmd.account(account);
                }
                let id = engine.new_transaction(cmd).await?;
                println!("{id}");
            }
            TransactionCommand::List {
                user,
                from,
                to,
                kind,
                category,
            } => {
                let filter = TransactionListFilter {
                    from,
                    to,
                    kind,
                    category_id: category,
                };
                let transactions = engine.transactions(user, &filter).await?;
                println!("{}", serde_json::to_string_pretty(&transactions)?);
            }
            TransactionCommand::Remove { user, id } => {
                engine.delete_transaction(user, id).await?;
            }
        },
        Command::Report(report) => {
            let report = engine.monthly_report(report.user, report.month.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
