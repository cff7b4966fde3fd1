use bump_core::*;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "bump")]
#[command(about = "Personal pregnancy tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the due date and create the profile
    Setup {
        /// Estimated due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: NaiveDate,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing profile
        #[arg(long)]
        force: bool,
    },

    /// Show pregnancy progress (default)
    Status,

    /// Run a kick counting session
    Count {
        /// Record N kicks non-interactively and save (for testing)
        #[arg(long)]
        auto_kicks: Option<u32>,
    },

    /// List saved counting sessions
    History {
        /// Maximum sessions to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// List oldest sessions first
        #[arg(long)]
        oldest_first: bool,

        /// Restrict to one month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },

    /// Manage prenatal checkups
    Checkup {
        #[command(subcommand)]
        command: CheckupCommands,
    },

    /// Roll up WAL sessions to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },

    /// Delete the profile and all recorded data
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CheckupCommands {
    /// Schedule a checkup
    Add {
        /// Kind: first-visit, nt-scan, serum-screening, anomaly-scan,
        /// glucose-tolerance, routine, other
        #[arg(long, default_value = "routine")]
        kind: String,

        /// Date and time ("YYYY-MM-DD HH:MM" or "YYYY-MM-DD")
        #[arg(long)]
        date: String,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Don't schedule reminders for this checkup
        #[arg(long)]
        no_reminder: bool,
    },

    /// List scheduled checkups with their reminder times
    List {
        /// Only checkups inside the upcoming window
        #[arg(long)]
        upcoming: bool,
    },

    /// Print the suggested checkup schedule
    Templates,

    /// Mark a checkup completed
    Done { id: Uuid },

    /// Remove a checkup
    Remove { id: Uuid },
}

fn main() -> Result<()> {
    bump_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(data_dir);

    match cli.command {
        Some(Commands::Setup {
            due_date,
            name,
            force,
        }) => cmd_setup(&paths, due_date, name, force),
        Some(Commands::Status) | None => cmd_status(&paths, &config),
        Some(Commands::Count { auto_kicks }) => cmd_count(&paths, &config, auto_kicks),
        Some(Commands::History {
            limit,
            oldest_first,
            month,
        }) => cmd_history(&paths, limit, oldest_first, month),
        Some(Commands::Checkup { command }) => cmd_checkup(&paths, &config, command),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        Some(Commands::Reset { yes }) => cmd_reset(&paths, yes),
    }
}

// ============================================================================
// Setup and status
// ============================================================================

fn cmd_setup(
    paths: &DataPaths,
    due_date: NaiveDate,
    name: Option<String>,
    force: bool,
) -> Result<()> {
    if bump_core::profile::is_onboarded(&paths.profile()) && !force {
        println!("A profile already exists. Re-run with --force to replace it.");
        return Ok(());
    }

    let profile = UserProfile::onboard(due_date, name);
    profile.save(&paths.profile())?;

    println!("✓ Profile saved");
    println!("  Due date: {}", profile.due_date);
    println!("  Pregnancy started: {}", profile.pregnancy_start_date);
    Ok(())
}

fn cmd_status(paths: &DataPaths, config: &Config) -> Result<()> {
    let chart_errors = bump_core::growth::validate();
    if !chart_errors.is_empty() {
        eprintln!("Growth chart validation errors:");
        for error in chart_errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Chart("Invalid growth chart".into()));
    }

    let Some(profile) = UserProfile::load(&paths.profile())? else {
        println!("No profile yet. Run `bump setup --due-date YYYY-MM-DD` first.");
        return Ok(());
    };

    let today = Local::now().date_naive();
    let info = pregnancy_info(profile.due_date, today);

    println!();
    if let Some(name) = &profile.user_name {
        println!("  Hello, {}!", name);
    }
    println!(
        "  {} weeks {} days pregnant ({} trimester)",
        info.weeks,
        info.days,
        trimester_label(info.trimester)
    );
    println!(
        "  Baby is about the size of a {} {} (~{} cm)",
        info.baby_size.name, info.baby_size.emoji, info.baby_size.length_cm
    );

    match info.days_until_due {
        d if d > 0 => println!("  {} days until the due date ({})", d, profile.due_date),
        0 => println!("  Today is the due date!"),
        d => println!("  {} days past the due date ({})", -d, profile.due_date),
    }

    let book = CheckupBook::load(&paths.checkups())?;
    let now = Local::now().naive_local();
    let upcoming = book.upcoming(now, config.reminders.upcoming_window_hours);
    if !upcoming.is_empty() {
        println!();
        println!("  Upcoming checkups:");
        for checkup in upcoming {
            println!(
                "    {}  {}",
                checkup.date.format("%Y-%m-%d %H:%M"),
                checkup.kind.label()
            );
        }
    }
    println!();

    Ok(())
}

fn trimester_label(trimester: Trimester) -> &'static str {
    match trimester {
        Trimester::Early => "early",
        Trimester::Mid => "mid",
        Trimester::Late => "late",
    }
}

// ============================================================================
// Counting sessions
// ============================================================================

fn cmd_count(paths: &DataPaths, config: &Config, auto_kicks: Option<u32>) -> Result<()> {
    std::fs::create_dir_all(paths.wal_dir())?;

    let mut tracker = SessionTracker::from_config(&config.tracking);
    tracker.start(Utc::now());

    if let Some(kicks) = auto_kicks {
        for _ in 0..kicks {
            if let Some(SessionEvent::Completed { count }) = tracker.record_movement(Utc::now()) {
                println!("✨ {} kicks recorded! Session complete.", count);
            }
        }
        return save_session(paths, &mut tracker);
    }

    println!();
    println!(
        "Counting kicks: press Enter for each kick (target {}).",
        tracker.kick_target()
    );
    println!("  's' + Enter to save, 'c' + Enter to cancel");

    loop {
        let count = tracker.current().map(|s| s.count).unwrap_or(0);
        let elapsed = tracker
            .current()
            .map(|s| (Utc::now() - s.started_at).num_seconds().max(0))
            .unwrap_or(0);
        print!(
            "[{:02}:{:02}] {} / {} > ",
            elapsed / 60,
            elapsed % 60,
            count,
            tracker.kick_target()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        match input.trim().to_lowercase().as_str() {
            "c" => {
                tracker.reset();
                println!("Session cancelled, nothing was recorded.");
                return Ok(());
            }
            "s" => return save_session(paths, &mut tracker),
            _ => {
                if let Some(SessionEvent::Completed { count }) =
                    tracker.record_movement(Utc::now())
                {
                    println!("✨ {} kicks recorded! Saving shortly...", count);
                    std::thread::sleep(std::time::Duration::from_secs(
                        config.tracking.auto_save_delay_seconds,
                    ));
                    if tracker.auto_save_due(Utc::now()) {
                        return save_session(paths, &mut tracker);
                    }
                }
            }
        }
    }
}

/// End the active session, persist it, and clear the slot.
///
/// A session with zero kicks is discarded rather than saved, matching the
/// save control being unavailable before the first kick.
fn save_session(paths: &DataPaths, tracker: &mut SessionTracker) -> Result<()> {
    if tracker.current().map(|s| s.count).unwrap_or(0) == 0 {
        tracker.reset();
        println!("No kicks recorded, session discarded.");
        return Ok(());
    }

    tracker.end(Utc::now());
    let session = tracker
        .current()
        .cloned()
        .ok_or_else(|| Error::Other("no session to save".into()))?;

    let mut sink = JsonlSink::new(paths.wal());
    sink.append(&session)?;
    tracker.reset();

    println!(
        "✓ Session saved: {} kicks in {} min",
        session.count,
        session.duration_minutes.unwrap_or(0)
    );
    Ok(())
}

// ============================================================================
// History
// ============================================================================

fn cmd_history(
    paths: &DataPaths,
    limit: usize,
    oldest_first: bool,
    month: Option<String>,
) -> Result<()> {
    let mut sessions = load_sessions(&paths.wal(), &paths.sessions_csv())?;

    if let Some(month) = month {
        let (from, to) = month_bounds(&month)?;
        sessions = bump_core::history::sessions_in_range(&sessions, from, to)
            .into_iter()
            .cloned()
            .collect();
    }

    let order = if oldest_first {
        SortOrder::OldestFirst
    } else {
        SortOrder::NewestFirst
    };
    let listed = bump_core::history::ordered(&sessions, order, Some(limit));

    if listed.is_empty() {
        println!("No saved sessions yet. Run `bump count` to record one.");
        return Ok(());
    }

    for session in &listed {
        println!(
            "{}  {}  {:>2} kicks  {:>3} min  {}",
            session.date,
            session.started_at.format("%H:%M"),
            session.count,
            session.duration_minutes.unwrap_or(0),
            if session.completed { "✓" } else { " " }
        );
    }

    let stats = bump_core::history::movement_stats(&sessions);
    println!(
        "{} sessions, avg {:.1} kicks / {:.0} min, {:.1} sessions per week",
        stats.total_sessions,
        stats.average_count,
        stats.average_duration_minutes,
        stats.sessions_per_week
    );

    Ok(())
}

fn month_bounds(month: &str) -> Result<(NaiveDate, NaiveDate)> {
    let from = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| Error::Other(format!("invalid month '{}', expected YYYY-MM", month)))?;
    let to = if from.month() == 12 {
        NaiveDate::from_ymd_opt(from.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(from.year(), from.month() + 1, 1)
    }
    .expect("first of month is always valid")
        - chrono::Duration::days(1);
    Ok((from, to))
}

// ============================================================================
// Checkups
// ============================================================================

fn cmd_checkup(paths: &DataPaths, config: &Config, command: CheckupCommands) -> Result<()> {
    match command {
        CheckupCommands::Add {
            kind,
            date,
            location,
            notes,
            no_reminder,
        } => {
            let kind = parse_kind(&kind)?;
            let date = parse_checkup_date(&date)?;

            let checkup = Checkup::new(
                kind,
                date,
                location,
                notes,
                !no_reminder,
                &config.reminders.offsets_minutes,
                Utc::now(),
            );
            let reminder_count = checkup.reminder_offsets_minutes.len();
            let id = checkup.id;

            CheckupBook::update(&paths.checkups(), |book| {
                book.add(checkup);
                Ok(())
            })?;

            println!("✓ Added checkup {} ({})", id, kind.label());
            if reminder_count > 0 {
                for offset in &config.reminders.offsets_minutes {
                    println!("  Reminder {}", bump_core::reminders::format_offset(*offset));
                }
            }
            Ok(())
        }

        CheckupCommands::List { upcoming } => {
            let book = CheckupBook::load(&paths.checkups())?;
            let now = Local::now().naive_local();

            let listed: Vec<&Checkup> = if upcoming {
                book.upcoming(now, config.reminders.upcoming_window_hours)
            } else {
                book.ordered()
            };

            if listed.is_empty() {
                println!("No checkups scheduled.");
                return Ok(());
            }

            for checkup in listed {
                println!(
                    "{}  {}  {}{}",
                    checkup.id,
                    checkup.date.format("%Y-%m-%d %H:%M"),
                    checkup.kind.label(),
                    if checkup.completed { "  (done)" } else { "" }
                );
                if let Some(location) = &checkup.location {
                    println!("    at {}", location);
                }
                for instant in bump_core::reminders::reminder_instants(checkup, now) {
                    println!(
                        "    reminder {} ({})",
                        instant.at.format("%Y-%m-%d %H:%M"),
                        bump_core::reminders::format_offset(instant.offset_minutes)
                    );
                }
            }
            Ok(())
        }

        CheckupCommands::Templates => {
            println!("Suggested checkup schedule:");
            for template in &CHECKUP_TEMPLATES {
                println!(
                    "  week {:>2}  {}: {}",
                    template.week,
                    template.kind.label(),
                    template.description
                );
            }
            Ok(())
        }

        CheckupCommands::Done { id } => {
            CheckupBook::update(&paths.checkups(), |book| book.set_completed(id, true))?;
            println!("✓ Checkup {} marked done", id);
            Ok(())
        }

        CheckupCommands::Remove { id } => {
            let mut removed = false;
            CheckupBook::update(&paths.checkups(), |book| {
                removed = book.remove(id);
                Ok(())
            })?;
            if removed {
                println!("✓ Checkup {} removed", id);
            } else {
                println!("No checkup with id {}", id);
            }
            Ok(())
        }
    }
}

fn parse_kind(s: &str) -> Result<CheckupKind> {
    match s.to_lowercase().as_str() {
        "first-visit" => Ok(CheckupKind::FirstVisit),
        "nt-scan" => Ok(CheckupKind::NtScan),
        "serum-screening" => Ok(CheckupKind::SerumScreening),
        "anomaly-scan" => Ok(CheckupKind::AnomalyScan),
        "glucose-tolerance" => Ok(CheckupKind::GlucoseTolerance),
        "routine" => Ok(CheckupKind::Routine),
        "other" => Ok(CheckupKind::Other),
        other => Err(Error::Other(format!(
            "unknown checkup kind '{}' (expected one of: first-visit, nt-scan, \
             serum-screening, anomaly-scan, glucose-tolerance, routine, other)",
            other
        ))),
    }
}

fn parse_checkup_date(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
    }
    Err(Error::Other(format!(
        "invalid date '{}' (expected \"YYYY-MM-DD HH:MM\" or \"YYYY-MM-DD\")",
        s
    )))
}

// ============================================================================
// Rollup and reset
// ============================================================================

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.wal().exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = bump_core::csv_rollup::wal_to_csv_and_archive(&paths.wal(), &paths.sessions_csv())?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", paths.sessions_csv().display());

    if cleanup {
        let cleaned = bump_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir())?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

fn cmd_reset(paths: &DataPaths, yes: bool) -> Result<()> {
    if !yes {
        print!("This deletes the profile, all sessions, and all checkups. Continue? [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }

    paths.purge_all()?;
    println!("✓ All data deleted");
    Ok(())
}
