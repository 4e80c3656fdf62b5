use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;

use frogs_core::tasks::Priority;
use frogs_core::{BigFrogTask, Clock, DailyTask, StorageError, SystemClock, TaskId};
use frogs_engine::{BigFrogStore, DailyTaskStore, ReminderConfig, ReminderOutcome};
use frogs_settings::FrogsSettings;
use frogs_store::{Database, SqliteKv, SqliteNotifier};
use frogs_telemetry::{LogQuery, TelemetryConfig};

#[derive(Parser)]
#[command(name = "frogs", version, about = "Eat the frog first: big frogs and daily tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// High-priority tasks. Unfinished ones carry over to the next day at priority 1.
    Frogs {
        #[command(subcommand)]
        action: Option<FrogAction>,
    },
    /// Recurring tasks. Reset every day, with an evening reminder while any is open.
    Daily {
        #[command(subcommand)]
        action: Option<DailyAction>,
    },
    /// Show queued reminders.
    Reminders {
        /// Print and remove reminders that are due.
        #[arg(long)]
        deliver: bool,
    },
    /// Show persisted warnings and errors.
    Logs {
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        store: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum FrogAction {
    List,
    Add {
        #[arg(required = true)]
        text: Vec<String>,
        #[arg(short, long, default_value = "1")]
        priority: String,
    },
    Toggle {
        id: String,
    },
}

#[derive(Subcommand)]
enum DailyAction {
    List,
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    Toggle {
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (settings, settings_err) = frogs_settings::load_or_default();

    let telemetry = frogs_telemetry::init_telemetry(telemetry_config(&settings));
    if let Some(e) = settings_err {
        tracing::warn!(error = %e, path = %e.path().display(), "failed to load settings, using defaults");
    }
    let _ = frogs_settings::init_settings(settings.clone());

    let db_path = PathBuf::from(&settings.storage.db_path);
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    let kv = Arc::new(SqliteKv::new(db.clone()));
    let notifier = Arc::new(SqliteNotifier::new(db, settings.reminder.enabled));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match cli.command {
        Command::Frogs { action } => {
            let mut store = BigFrogStore::new(kv, clock, settings.storage.big_frogs_key.clone());
            let loaded = store.load().await;
            let result = match action.unwrap_or(FrogAction::List) {
                FrogAction::List => loaded,
                FrogAction::Add { text, priority } => {
                    store.add(&text.join(" "), Priority::parse(&priority)).await
                }
                FrogAction::Toggle { id } => store.toggle(&TaskId::from_raw(id)).await,
            };
            if !store.is_loaded() {
                eprintln!("warning: stored big frogs could not be loaded; nothing was changed");
            }
            print_frogs(&settled(result, || store.tasks()));
        }
        Command::Daily { action } => {
            let reminder = ReminderConfig {
                enabled: settings.reminder.enabled,
                at: settings.reminder.time(),
                title: settings.reminder.title.clone(),
                body: settings.reminder.body.clone(),
            };
            let mut store = DailyTaskStore::new(
                kv,
                notifier,
                clock,
                settings.storage.daily_key.clone(),
                reminder,
            );
            let loaded = store.load().await;
            let result = match action.unwrap_or(DailyAction::List) {
                DailyAction::List => loaded,
                DailyAction::Add { text } => store.add(&text.join(" ")).await,
                DailyAction::Toggle { id } => store.toggle(&TaskId::from_raw(id)).await,
            };
            if !store.is_loaded() {
                eprintln!("warning: stored daily tasks could not be loaded; nothing was changed");
            }
            print_daily(&settled(result, || store.tasks()));
            if let Some(outcome) = store.last_reminder() {
                print_reminder(outcome);
            }
        }
        Command::Reminders { deliver } => {
            let listed = if deliver {
                notifier.take_due(clock.now())?
            } else {
                notifier.pending()?
            };
            if listed.is_empty() {
                println!("no reminders");
            }
            for n in listed {
                if deliver {
                    tracing::info!(handle = %n.handle, "delivering reminder");
                }
                println!("{}  {}: {}", n.fire_at.format("%Y-%m-%d %H:%M"), n.title, n.body);
            }
        }
        Command::Logs { level, store, limit } => match telemetry.logs() {
            Some(sink) => {
                let records = sink.query(&LogQuery {
                    level,
                    store,
                    limit: Some(limit),
                    ..LogQuery::default()
                })?;
                for r in records {
                    println!(
                        "{} {:5} [{}] {}",
                        r.timestamp,
                        r.level,
                        r.store.as_deref().unwrap_or("-"),
                        r.message
                    );
                }
            }
            None => println!("log persistence is disabled"),
        },
    }

    Ok(())
}

/// Storage failures are already logged by the store; show the last good view.
fn settled<T>(result: Result<Vec<T>, StorageError>, fallback: impl FnOnce() -> Vec<T>) -> Vec<T> {
    result.unwrap_or_else(|_| fallback())
}

fn telemetry_config(settings: &FrogsSettings) -> TelemetryConfig {
    TelemetryConfig {
        log_level: settings.logging.level.parse().unwrap_or(Level::WARN),
        json: settings.logging.json,
        log_to_sqlite: settings.logging.log_to_sqlite,
        log_db_path: PathBuf::from(&settings.logging.log_db_path),
        ..TelemetryConfig::default()
    }
}

fn mark(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

fn print_frogs(tasks: &[BigFrogTask]) {
    if tasks.is_empty() {
        println!("no big frogs today");
    }
    for t in tasks {
        println!("{} [{}] {}  ({})", mark(t.completed), t.priority, t.text, t.id);
    }
}

fn print_daily(tasks: &[DailyTask]) {
    if tasks.is_empty() {
        println!("no daily tasks");
    }
    for t in tasks {
        println!("{} {}  ({})", mark(t.completed), t.text, t.id);
    }
}

fn print_reminder(outcome: &ReminderOutcome) {
    match outcome {
        ReminderOutcome::Scheduled { fire_at, .. } => {
            println!("reminder set for {}", fire_at.format("%a %H:%M"));
        }
        ReminderOutcome::Suppressed => println!("all done, no reminder"),
        ReminderOutcome::Disabled => {}
        ReminderOutcome::PermissionDenied | ReminderOutcome::Failed(_) => {
            println!("reminder unavailable");
        }
    }
}
