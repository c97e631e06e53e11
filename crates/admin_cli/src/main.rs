use std::{error::Error, io::Write};

use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{AccountKind, Engine, EngineError, InstituteType, NewAccount};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "sadaqah_admin")]
#[command(about = "Admin utilities for Sadaqah (bootstrap accounts, run the stale-item sweep)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./sadaqah.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    /// Release items held for longer than the hold period.
    Sweep(SweepArgs),
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Create(AccountCreateArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    User,
    Institute,
    Admin,
}

impl From<Kind> for AccountKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::User => AccountKind::User,
            Kind::Institute => AccountKind::Institute,
            Kind::Admin => AccountKind::Admin,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Institute {
    Masjid,
    Madrasa,
    Khanqah,
    Kabristan,
}

impl From<Institute> for InstituteType {
    fn from(kind: Institute) -> Self {
        match kind {
            Institute::Masjid => InstituteType::Masjid,
            Institute::Madrasa => InstituteType::Madrasa,
            Institute::Khanqah => InstituteType::Khanqah,
            Institute::Kabristan => InstituteType::Kabristan,
        }
    }
}

#[derive(Args, Debug)]
struct AccountCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, value_enum, default_value_t = Kind::User)]
    kind: Kind,
    /// Defaults to the username.
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long)]
    location: Option<String>,
    /// Required for institutes.
    #[arg(long, value_enum)]
    institute_type: Option<Institute>,
}

impl AccountCreateArgs {
    fn into_command(self, password: String) -> NewAccount {
        let display_name = self
            .display_name
            .unwrap_or_else(|| self.username.clone());
        let mut cmd =
            NewAccount::new(self.username, password, self.kind.into()).display_name(display_name);
        if let Some(location) = self.location {
            cmd = cmd.location(location);
        }
        if let Some(institute_type) = self.institute_type {
            cmd = cmd.institute_type(institute_type.into());
        }
        cmd
    }
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Items held at least this many days are released.
    #[arg(long, default_value_t = 7)]
    hold_days: i64,
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
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
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
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
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
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Account(Account {
            command: AccountCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let cmd = args.into_command(password);

            match engine.create_account(cmd, Utc::now()).await {
                Ok(account) => {
                    println!(
                        "created {} account: {} ({})",
                        account.kind.as_str(),
                        account.username,
                        account.id
                    );
                }
                Err(EngineError::ExistingKey(username)) => {
                    eprintln!("account already exists: {username}");
                    std::process::exit(1);
                }
                Err(EngineError::Validation(msg)) => {
                    eprintln!("{msg}");
                    std::process::exit(2);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Sweep(args) => {
            let report = engine
                .release_stale_items(Utc::now(), Duration::days(args.hold_days))
                .await?;
            println!(
                "released {} items across {} requests",
                report.items, report.requests
            );
        }
    }

    Ok(())
}
