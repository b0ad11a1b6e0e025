use std::{error::Error, io::Write};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
};
use engine::{Engine, NewExpense, NewParticipant, ShareValue, SplitMode};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "splitmint_admin")]
#[command(about = "Admin utilities for SplitMint (bootstrap users, seed demo data)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitmint.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Wipe the database and load the demo users, groups and expenses.
    Seed,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    display_name: Option<String>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(out, Print(prompt))?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let first = prompt_password("Password: ")?;
    if first.is_empty() {
        return Err("password must not be empty".into());
    }
    let second = prompt_password("Confirm password: ")?;
    if first != second {
        return Err("passwords do not match".into());
    }
    Ok(first)
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            let engine = Engine::builder().database(db).build().await?;
            engine
                .new_user(
                    &args.username,
                    &password,
                    &args.email,
                    args.display_name.as_deref(),
                )
                .await?;

            println!("created user: {}", args.username);
        }
        Command::Seed => {
            migration::Migrator::fresh(&db).await?;
            let engine = Engine::builder().database(db).build().await?;
            seed(&engine).await?;
        }
    }

    Ok(())
}

const SEED_PASSWORD: &str = "Test@123";

async fn seed(engine: &Engine) -> Result<(), Box<dyn Error + Send + Sync>> {
    let users = [
        ("john", "john@test.com", "John"),
        ("alice", "alice@test.com", "Alice"),
        ("bob", "bob@test.com", "Bob"),
        ("chris", "chris@test.com", "Chris"),
        ("diana", "diana@test.com", "Diana"),
    ];
    for (username, email, name) in users {
        engine
            .new_user(username, SEED_PASSWORD, email, Some(name))
            .await?;
    }

    println!("\n=== TEST CREDENTIALS ===");
    for (_, email, _) in users {
        println!("{email} / {SEED_PASSWORD}");
    }
    println!("========================\n");

    let hackathon = engine
        .new_group(
            "Hackathon Expenses",
            "john",
            vec![
                participant("Alice", "alice@test.com", "#f97316"),
                participant("Bob", "bob@test.com", "#0ea5e9"),
            ],
        )
        .await?;
    let john = participant_id(engine, &hackathon, "john", "john@test.com").await?;
    let alice = participant_id(engine, &hackathon, "john", "alice@test.com").await?;
    let bob = participant_id(engine, &hackathon, "john", "bob@test.com").await?;

    engine
        .add_expense(
            &hackathon,
            "john",
            equal("Lunch for team", "food", 150.0, "2026-02-05", john)?,
        )
        .await?;
    engine
        .add_expense(
            &hackathon,
            "alice",
            custom(
                "Coffee and snacks",
                "food",
                75.50,
                "2026-02-06",
                alice,
                &[(john, 25.0), (alice, 30.0), (bob, 20.50)],
            )?,
        )
        .await?;
    engine
        .add_expense(
            &hackathon,
            "bob",
            percentage(
                "Venue booking",
                "uncategorized",
                500.0,
                "2026-02-07",
                bob,
                &[(john, 50.0), (alice, 30.0), (bob, 20.0)],
            )?,
        )
        .await?;

    let trip = engine
        .new_group(
            "Weekend Trip",
            "alice",
            vec![
                participant("Chris", "chris@test.com", "#22c55e"),
                participant("Diana", "diana@test.com", "#ec4899"),
            ],
        )
        .await?;
    let alice = participant_id(engine, &trip, "alice", "alice@test.com").await?;
    let chris = participant_id(engine, &trip, "alice", "chris@test.com").await?;
    let diana = participant_id(engine, &trip, "alice", "diana@test.com").await?;

    engine
        .add_expense(
            &trip,
            "alice",
            equal("Hotel booking", "lodging", 450.0, "2026-02-08", alice)?,
        )
        .await?;
    engine
        .add_expense(
            &trip,
            "chris",
            custom(
                "Dinner",
                "food",
                180.0,
                "2026-02-08",
                chris,
                &[(alice, 60.0), (chris, 60.0), (diana, 60.0)],
            )?,
        )
        .await?;
    engine
        .add_expense(
            &trip,
            "diana",
            percentage(
                "Gas for car",
                "transport",
                120.0,
                "2026-02-08",
                diana,
                &[(alice, 40.0), (chris, 40.0), (diana, 20.0)],
            )?,
        )
        .await?;

    let meeting = engine
        .new_group(
            "Project Meeting",
            "bob",
            vec![
                participant("John", "john@test.com", "#111827"),
                participant("Diana", "diana@test.com", "#ec4899"),
            ],
        )
        .await?;
    let bob = participant_id(engine, &meeting, "bob", "bob@test.com").await?;
    let john = participant_id(engine, &meeting, "bob", "john@test.com").await?;
    let diana = participant_id(engine, &meeting, "bob", "diana@test.com").await?;

    engine
        .add_expense(
            &meeting,
            "bob",
            equal(
                "Meeting room rental",
                "uncategorized",
                200.0,
                "2026-02-09",
                bob,
            )?,
        )
        .await?;
    engine
        .add_expense(
            &meeting,
            "john",
            custom(
                "Catering",
                "food",
                300.0,
                "2026-02-09",
                john,
                &[(bob, 100.0), (john, 120.0), (diana, 80.0)],
            )?,
        )
        .await?;

    println!("=== GROUPS CREATED ===");
    println!("1. Hackathon Expenses (Owner: John) - 3 members, 3 expenses");
    println!("2. Weekend Trip (Owner: Alice) - 3 members, 3 expenses");
    println!("3. Project Meeting (Owner: Bob) - 3 members, 2 expenses");
    println!("========================\n");

    Ok(())
}

fn participant(name: &str, email: &str, color: &str) -> NewParticipant {
    NewParticipant {
        name: name.to_string(),
        email: email.to_string(),
        color: Some(color.to_string()),
        avatar: None,
    }
}

async fn participant_id(
    engine: &Engine,
    group_id: &str,
    username: &str,
    email: &str,
) -> Result<uuid::Uuid, Box<dyn Error + Send + Sync>> {
    let summary = engine.group_summary(group_id, username).await?;
    summary
        .participants
        .iter()
        .find(|p| p.email == email)
        .map(|p| p.id)
        .ok_or_else(|| format!("participant not found: {email}").into())
}

fn date(day: &str) -> Result<DateTime<Utc>, Box<dyn Error + Send + Sync>> {
    Ok(format!("{day}T12:00:00Z").parse::<DateTime<Utc>>()?)
}

fn equal(
    description: &str,
    category: &str,
    amount: f64,
    day: &str,
    payer: uuid::Uuid,
) -> Result<NewExpense, Box<dyn Error + Send + Sync>> {
    Ok(NewExpense {
        description: description.to_string(),
        category: Some(category.to_string()),
        amount,
        date: date(day)?,
        payer_id: payer,
        split_mode: SplitMode::Equal,
        shares: Vec::new(),
    })
}

fn custom(
    description: &str,
    category: &str,
    amount: f64,
    day: &str,
    payer: uuid::Uuid,
    shares: &[(uuid::Uuid, f64)],
) -> Result<NewExpense, Box<dyn Error + Send + Sync>> {
    Ok(NewExpense {
        description: description.to_string(),
        category: Some(category.to_string()),
        amount,
        date: date(day)?,
        payer_id: payer,
        split_mode: SplitMode::Custom,
        shares: share_values(shares),
    })
}

fn percentage(
    description: &str,
    category: &str,
    amount: f64,
    day: &str,
    payer: uuid::Uuid,
    shares: &[(uuid::Uuid, f64)],
) -> Result<NewExpense, Box<dyn Error + Send + Sync>> {
    Ok(NewExpense {
        description: description.to_string(),
        category: Some(category.to_string()),
        amount,
        date: date(day)?,
        payer_id: payer,
        split_mode: SplitMode::Percentage,
        shares: share_values(shares),
    })
}

fn share_values(shares: &[(uuid::Uuid, f64)]) -> Vec<ShareValue> {
    shares
        .iter()
        .map(|&(participant_id, value)| ShareValue {
            participant_id,
            value,
        })
        .collect()
}
