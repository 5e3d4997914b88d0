use chrono::Utc;
use clap::{Parser, Subcommand};
use liftlog_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Workout session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a workout session from a plan day
    Start {
        /// Path to the plan JSON file
        #[arg(long)]
        plan: PathBuf,

        /// Day index within the plan (0-based)
        #[arg(long, default_value_t = 0)]
        day: usize,

        /// Explicitly skip today's readiness check
        #[arg(long)]
        skip_readiness: bool,
    },

    /// Log a completed set for an exercise
    Log {
        /// Exercise index within the day (0-based)
        exercise: usize,

        /// Set number (1-based)
        #[arg(long)]
        set: u32,

        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        /// Reps in reserve (0-5)
        #[arg(long, conflicts_with = "rpe")]
        rir: Option<f64>,

        /// Rate of perceived exertion (6-10); converted to RIR
        #[arg(long)]
        rpe: Option<f64>,

        /// Weight was entered in pounds
        #[arg(long)]
        lb: bool,
    },

    /// Skip an exercise for this session
    Skip {
        /// Exercise index within the day (0-based)
        exercise: usize,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Show or adjust the rest timer
    Rest {
        /// Shift the deadline by this many seconds (may be negative)
        #[arg(long, allow_hyphen_values = true)]
        adjust: Option<i64>,

        /// Cancel the current rest period
        #[arg(long)]
        cancel: bool,
    },

    /// Show the active session
    Status,

    /// Discard the active session without logging it
    Cancel,

    /// Finish the session and write the workout log
    Complete {
        /// too_easy, just_right, or too_hard
        #[arg(long, default_value = "just_right")]
        difficulty: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Readiness diary
    Readiness {
        #[command(subcommand)]
        command: ReadinessCommands,
    },

    /// Export workout history to CSV
    ExportCsv {
        /// Output path (defaults to <data_dir>/export.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ReadinessCommands {
    /// Submit today's readiness entry (1-5 scales)
    Submit {
        #[arg(long)]
        energy: u8,
        #[arg(long)]
        sleep: u8,
        #[arg(long)]
        soreness: u8,
        #[arg(long)]
        mood: u8,
    },
    /// Show today's entry
    Show,
}

/// Resolved file layout under the data directory
struct Paths {
    state: PathBuf,
    history_dir: PathBuf,
    readiness: PathBuf,
    export: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        Self {
            state: data_dir.join("active_workout.json"),
            history_dir: data_dir.join("history"),
            readiness: data_dir.join("readiness.jsonl"),
            export: data_dir.join("export.csv"),
        }
    }
}

fn main() -> Result<()> {
    liftlog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);

    match cli.command {
        Commands::Start {
            plan,
            day,
            skip_readiness,
        } => cmd_start(&paths, &plan, day, skip_readiness),
        Commands::Log {
            exercise,
            set,
            weight,
            reps,
            rir,
            rpe,
            lb,
        } => cmd_log(&paths, exercise, set, weight, reps, rir, rpe, lb),
        Commands::Skip { exercise, reason } => cmd_skip(&paths, exercise, reason),
        Commands::Rest { adjust, cancel } => cmd_rest(&paths, adjust, cancel, &config),
        Commands::Status => cmd_status(&paths),
        Commands::Cancel => cmd_cancel(&paths),
        Commands::Complete { difficulty, notes } => cmd_complete(&paths, &difficulty, notes),
        Commands::Readiness { command } => cmd_readiness(&paths, command),
        Commands::ExportCsv { out } => cmd_export_csv(&paths, out),
    }
}

/// Engine with the persisted session (if any) adopted, plus a bell-printing
/// rest notifier
fn load_engine(paths: &Paths) -> Result<SessionEngine> {
    let mut engine = SessionEngine::new();
    engine.set_rest_notifier(Box::new(|| {
        // \x07 rings the terminal bell where supported
        println!("\x07Rest over - next set!");
    }));
    if let Some(workout) = ActiveWorkout::load(&paths.state)? {
        engine.resume(workout);
    }
    Ok(engine)
}

/// Persist or clear the engine's session after a mutation
fn save_engine(paths: &Paths, engine: &SessionEngine) -> Result<()> {
    match engine.active() {
        Some(workout) => workout.save(&paths.state),
        None => ActiveWorkout::clear(&paths.state),
    }
}

fn cmd_start(paths: &Paths, plan_path: &Path, day: usize, skip_readiness: bool) -> Result<()> {
    let plan = load_plan(plan_path)?
        .ok_or_else(|| Error::Plan(format!("no plan file at {:?}", plan_path)))?;

    let problems = plan.validate();
    if !problems.is_empty() {
        eprintln!("Plan validation errors:");
        for problem in &problems {
            eprintln!("  - {}", problem);
        }
        return Err(Error::Plan("invalid plan".into()));
    }

    let history = JsonlHistory::new(&paths.history_dir);
    let prior_logs = history.read_logs()?;

    let now = Utc::now();
    let diary = ReadinessDiary::new(&paths.readiness);
    let readiness = diary.today_entry(now)?;

    let mut engine = load_engine(paths)?;
    if skip_readiness {
        engine.resolve_readiness(&plan.id, day, ReadinessResolution::Skipped);
    }

    match engine.start_workout(&plan, day, readiness.as_ref(), &prior_logs, now) {
        Ok(StartOutcome::Started { reduce_volume_hint }) => {
            let day_prescription = plan.day(day)?;
            println!(
                "Started '{}' ({} exercises).",
                day_prescription.day_name,
                day_prescription.exercises.len()
            );
            if let Some(score) = reduce_volume_hint {
                println!(
                    "Readiness is low today ({:.2}/5) - consider reducing volume.",
                    score
                );
            }
            save_engine(paths, &engine)
        }
        Ok(StartOutcome::AlreadyActive) => {
            println!("A session is already active; use 'liftlog status'.");
            Ok(())
        }
        Err(Error::ReadinessPending) => {
            eprintln!("No readiness entry for today.");
            eprintln!("Run 'liftlog readiness submit ...' or start with --skip-readiness.");
            Err(Error::ReadinessPending)
        }
        Err(e) => Err(e),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_log(
    paths: &Paths,
    exercise: usize,
    set_number: u32,
    weight: f64,
    reps: u32,
    rir: Option<f64>,
    rpe: Option<f64>,
    lb: bool,
) -> Result<()> {
    let mut engine = load_engine(paths)?;
    let now = Utc::now();

    let effort_mode = if rpe.is_some() {
        EffortMode::Rpe
    } else {
        EffortMode::Rir
    };
    let set = SetLog {
        set_number,
        weight,
        weight_unit: if lb { WeightUnit::Lb } else { WeightUnit::Kg },
        reps,
        rir: rir.unwrap_or(0.0),
        rpe,
        effort_mode,
        completed: false,
    };

    let outcome = engine.log_set(exercise, set, now)?;

    if let Some(e1rm) = estimate_one_rep_max(weight, reps) {
        println!("Set {} logged ({} x {}). Est. 1RM: {}", set_number, weight, reps, e1rm);
    } else {
        println!("Set {} logged.", set_number);
    }

    if outcome.session_complete {
        println!("All exercises done - finish with 'liftlog complete'.");
    }
    if let Some(next) = outcome.next_exercise {
        if let Some(snap) = engine.snapshot(now) {
            println!("Superset: next up [{}] {}.", next, snap.exercises[next].name);
        }
    }
    if let Some(seconds) = outcome.rest_armed {
        println!("Rest: {}s.", seconds);
    }

    save_engine(paths, &engine)
}

fn cmd_skip(paths: &Paths, exercise: usize, reason: Option<String>) -> Result<()> {
    let mut engine = load_engine(paths)?;
    engine.skip_exercise(exercise, reason)?;
    println!("Exercise {} skipped.", exercise);
    save_engine(paths, &engine)
}

fn cmd_rest(paths: &Paths, adjust: Option<i64>, cancel: bool, config: &Config) -> Result<()> {
    let mut engine = load_engine(paths)?;
    let now = Utc::now();

    if cancel {
        engine.cancel_rest_timer();
        println!("Rest timer cancelled.");
        return save_engine(paths, &engine);
    }

    if let Some(delta) = adjust {
        // Bare +/- 0 means "apply the configured step"
        let delta = if delta == 0 {
            i64::from(config.timer.adjust_step_seconds)
        } else {
            delta
        };
        match engine.adjust_rest_timer(delta, now) {
            TimerEvent::Running => {}
            TimerEvent::Completed => {}
            TimerEvent::Inactive => println!("No rest timer running."),
        }
        save_engine(paths, &engine)?;
    }

    // Poll so an expired deadline fires its notification, then report
    match engine.poll_rest_timer(now) {
        TimerEvent::Completed => save_engine(paths, &engine)?,
        TimerEvent::Running | TimerEvent::Inactive => {}
    }

    match engine
        .snapshot(now)
        .and_then(|s| s.rest_remaining_seconds)
    {
        Some(remaining) => println!("Rest remaining: {}s.", remaining),
        None => println!("No rest timer running."),
    }
    Ok(())
}

fn cmd_status(paths: &Paths) -> Result<()> {
    let mut engine = load_engine(paths)?;
    let now = Utc::now();

    // Let an expired rest timer fire before rendering
    if engine.poll_rest_timer(now) == TimerEvent::Completed {
        save_engine(paths, &engine)?;
    }

    let Some(snap) = engine.snapshot(now) else {
        println!("No active session.");
        return Ok(());
    };

    println!("{} - {} min elapsed", snap.day_name, snap.elapsed_minutes);
    for (i, ex) in snap.exercises.iter().enumerate() {
        let marker = if i == snap.focused_exercise { ">" } else { " " };
        let state = if ex.skipped {
            "skipped".to_string()
        } else {
            format!("{}/{} sets", ex.completed_sets, ex.total_sets)
        };
        println!("{} [{}] {} ({})", marker, i, ex.name, state);
    }
    if let Some(remaining) = snap.rest_remaining_seconds {
        println!("Rest remaining: {}s", remaining);
    }
    Ok(())
}

fn cmd_cancel(paths: &Paths) -> Result<()> {
    let mut engine = load_engine(paths)?;
    engine.cancel_workout()?;
    println!("Session discarded; nothing was logged.");
    save_engine(paths, &engine)
}

fn cmd_complete(paths: &Paths, difficulty: &str, notes: String) -> Result<()> {
    let difficulty = parse_difficulty(difficulty)?;

    let mut history = JsonlHistory::new(&paths.history_dir);
    let prior_logs = history.read_logs()?;

    let mut engine = load_engine(paths)?;
    let done = engine.complete_workout(difficulty, notes, &prior_logs, Utc::now())?;

    history.append_log(&done.log)?;
    for record in &done.records {
        history.append_record(record)?;
    }
    save_engine(paths, &engine)?;

    println!(
        "Workout complete: {} min, {:.0} total volume.",
        done.log.duration_minutes, done.log.total_volume
    );
    for record in &done.records {
        let kind = match record.kind {
            RecordKind::Weight => "Weight",
            RecordKind::Volume => "Volume",
        };
        println!(
            "  {} PR - {}: {:.1} (was {:.1})",
            kind, record.exercise_name, record.new_value, record.previous_value
        );
    }
    Ok(())
}

fn cmd_readiness(paths: &Paths, command: ReadinessCommands) -> Result<()> {
    let now = Utc::now();
    match command {
        ReadinessCommands::Submit {
            energy,
            sleep,
            soreness,
            mood,
        } => {
            for (label, value) in [
                ("energy", energy),
                ("sleep", sleep),
                ("soreness", soreness),
                ("mood", mood),
            ] {
                if !(1..=5).contains(&value) {
                    return Err(Error::Other(format!(
                        "{} must be between 1 and 5 (got {})",
                        label, value
                    )));
                }
            }

            let entry = ReadinessEntry::new(now.date_naive(), energy, sleep, soreness, mood);
            let score = entry.overall_score;
            ReadinessDiary::new(&paths.readiness).append(&entry)?;
            println!("Readiness logged: {:.2}/5.", score);
            if score < REDUCE_VOLUME_THRESHOLD {
                println!("Low readiness - consider reducing volume today.");
            }
            Ok(())
        }
        ReadinessCommands::Show => {
            match ReadinessDiary::new(&paths.readiness).today_entry(now)? {
                Some(entry) => println!(
                    "Today: {:.2}/5 (energy {}, sleep {}, soreness {}, mood {})",
                    entry.overall_score, entry.energy, entry.sleep, entry.soreness, entry.mood
                ),
                None => println!("No readiness entry for today."),
            }
            Ok(())
        }
    }
}

fn cmd_export_csv(paths: &Paths, out: Option<PathBuf>) -> Result<()> {
    let history = JsonlHistory::new(&paths.history_dir);
    let logs = history.read_logs()?;
    let out = out.unwrap_or_else(|| paths.export.clone());

    let rows = export_logs_csv(&logs, &out)?;
    println!("Exported {} set rows to {:?}.", rows, out);
    Ok(())
}

fn parse_difficulty(s: &str) -> Result<PerceivedDifficulty> {
    match s.to_lowercase().as_str() {
        "too_easy" => Ok(PerceivedDifficulty::TooEasy),
        "just_right" => Ok(PerceivedDifficulty::JustRight),
        "too_hard" => Ok(PerceivedDifficulty::TooHard),
        other => Err(Error::Other(format!(
            "unknown difficulty '{}' (expected too_easy, just_right, or too_hard)",
            other
        ))),
    }
}
