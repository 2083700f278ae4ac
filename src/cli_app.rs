//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Color, Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use switch_challenge::core::config::Config;
use switch_challenge::core::errors::SwcError;
use switch_challenge::logger::activity::{ActivityEvent, ActivityLoggerConfig, spawn_logger};
use switch_challenge::puzzle::builder::{Puzzle, PuzzleBuilder};
use switch_challenge::puzzle::level::LevelCatalog;
use switch_challenge::puzzle::symbol::{Symbol, SymbolSet};
use switch_challenge::session::driver::NullSink;
use switch_challenge::session::model::{FinishReason, Mode, PracticeType, Session};
use switch_challenge::session::simulate::{SimulationPlan, SimulationReport, simulate};
use switch_challenge::session::summary::{SessionSummary, format_time};
use switch_challenge::terminal::runtime::{PlayOptions, run_play};

/// Switch Challenge: find the hidden codes that turn one row of symbols into another.
#[derive(Debug, Parser)]
#[command(
    name = "swc",
    author,
    version,
    about = "Switch Challenge - permutation reasoning game",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Play in the terminal.
    Play(PlayArgs),
    /// Print one generated puzzle.
    Puzzle(PuzzleArgs),
    /// List the level catalog.
    Levels,
    /// Run a headless game with a scripted player.
    Simulate(SimulateArgs),
    /// Inspect configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct PlayArgs {
    /// Skip the menu and start practicing with this type (progressive, level, random).
    #[arg(long, value_name = "TYPE")]
    practice: Option<PracticeType>,
    /// Practice start level, 1-based position in `swc levels`.
    #[arg(long, value_name = "N")]
    start_level: Option<usize>,
}

#[derive(Debug, Clone, Args)]
struct PuzzleArgs {
    /// Level to generate, 1-based position in `swc levels`.
    #[arg(long, default_value_t = 1, value_name = "N")]
    level: usize,
    /// Random seed (defaults to the configured seed, then entropy).
    #[arg(long, value_name = "S")]
    seed: Option<u64>,
    /// Show mystery codes in human output. JSON output always includes them.
    #[arg(long)]
    reveal: bool,
}

#[derive(Debug, Clone, Args)]
struct SimulateArgs {
    /// Probability that each answer is correct.
    #[arg(long, default_value_t = 0.8, value_name = "P", value_parser = parse_probability)]
    accuracy: f64,
    /// Random seed for puzzles and the scripted player.
    #[arg(long, value_name = "S")]
    seed: Option<u64>,
    /// Simulate a practice run of this type instead of an assessment.
    #[arg(long, value_name = "TYPE")]
    practice: Option<PracticeType>,
    /// Practice start level, 1-based.
    #[arg(long, value_name = "N", requires = "practice")]
    start_level: Option<usize>,
    /// Rounds to play (defaults to the assessment round count).
    #[arg(long, value_name = "N")]
    rounds: Option<u32>,
    /// Synthetic time spent on each answer.
    #[arg(long, default_value_t = 4000, value_name = "MS")]
    answer_ms: u64,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the config file path in use.
    Path,
    /// Print the effective configuration.
    Show,
    /// Validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

impl From<SwcError> for CliError {
    fn from(e: SwcError) -> Self {
        if e.is_user_error() {
            Self::User(e.to_string())
        } else {
            Self::Runtime(e.to_string())
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Play(args) => run_play_command(cli, args),
        Command::Puzzle(args) => run_puzzle(cli, args),
        Command::Levels => run_levels(cli),
        Command::Simulate(args) => run_simulate(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            generate(args.shell, &mut command, name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── play ────────────────────

fn run_play_command(cli: &Cli, args: &PlayArgs) -> Result<(), CliError> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(CliError::User(
            "play needs an interactive terminal (try `swc simulate`)".to_string(),
        ));
    }

    let config = Config::load(cli.config.as_deref())?;
    let catalog = config.catalog();

    let mut draft = config.practice_defaults();
    if let Some(practice_type) = args.practice {
        draft.practice_type = practice_type;
    }
    if let Some(level) = args.start_level {
        draft.start_level = level_index(&catalog, level)?;
    }
    let options = PlayOptions {
        color: !cli.no_color,
        practice_draft: draft,
        start_practice: args.practice.is_some(),
    };

    let session = Session::new(config.session_settings());
    let builder = PuzzleBuilder::new(catalog, config.seed);

    let session = if config.logging.enabled {
        let (logger, join) = spawn_logger(ActivityLoggerConfig {
            jsonl_config: config.jsonl_config(),
            ..ActivityLoggerConfig::default()
        })?;
        logger.send(ActivityEvent::ConfigLoaded {
            source: config.paths.config_file.display().to_string(),
            config_hash: config.stable_hash()?,
        });

        let outcome = run_play(session, builder, logger.clone(), &options);
        if let Err(e) = &outcome {
            logger.send(ActivityEvent::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            });
        }
        logger.shutdown();
        if join.join().is_err() {
            eprintln!("swc: activity logger thread panicked");
        }
        outcome?.0
    } else {
        run_play(session, builder, NullSink, &options)?.0
    };

    if session.history.is_empty() {
        return Ok(());
    }
    let summary = SessionSummary::from_history(&session.history);
    match output_mode(cli) {
        OutputMode::Human => {
            println!(
                "Last run: {} rounds, {} correct ({}%), score {}",
                summary.rounds_played, summary.correct, summary.accuracy_pct, summary.score
            );
        }
        OutputMode::Json => {
            write_json_line(&json!({
                "command": "play",
                "summary": serde_json::to_value(&summary)?,
            }))?;
        }
    }
    Ok(())
}

// ──────────────────── puzzle / levels ────────────────────

fn run_puzzle(cli: &Cli, args: &PuzzleArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let catalog = config.catalog();
    let index = level_index(&catalog, args.level)?;
    let mut builder = PuzzleBuilder::new(catalog, args.seed.or(config.seed));
    let puzzle = builder.generate_puzzle(index);

    match output_mode(cli) {
        OutputMode::Human => print_puzzle(&puzzle, args.reveal),
        OutputMode::Json => write_json_line(&json!({
            "command": "puzzle",
            "puzzle": serde_json::to_value(&puzzle)?,
        }))?,
    }
    Ok(())
}

fn print_puzzle(puzzle: &Puzzle, reveal: bool) {
    let level = &puzzle.level;
    println!(
        "{}  {}",
        level.to_string().bold(),
        format!("[{}] {} pts", level.structure_tag(), level.points).dimmed()
    );
    println!("  {:<8}{}", "input", colored_set(&puzzle.input));

    let sets = puzzle.intermediate_sets();
    for (i, (layer, after)) in puzzle.layers.iter().zip(&sets).enumerate() {
        let hidden = layer.is_mystery() && !reveal;
        let code = if hidden {
            "????".yellow()
        } else {
            layer.code.to_string().cyan()
        };
        let shown_after = if hidden {
            "? ? ? ?".dimmed().to_string()
        } else {
            colored_set(after)
        };
        println!(
            "  {:<8}{} {code}  ->  {shown_after}",
            format!("[{}]", i + 1),
            layer.kind.tag()
        );
        if let Some(options) = layer.options.filter(|_| layer.is_mystery()) {
            let listed: Vec<String> = options
                .iter()
                .enumerate()
                .map(|(n, c)| format!("{}) {c}", n + 1))
                .collect();
            println!("  {:<8}{}", "", listed.join("  ").dimmed());
        }
    }
    println!("  {:<8}{}", "output", colored_set(&puzzle.output));
}

fn run_levels(cli: &Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let catalog = config.catalog();

    match output_mode(cli) {
        OutputMode::Human => {
            println!(
                "{}",
                format!("{:>3}  {:>3}  {:<6}  {:>5}  {}", "#", "ID", "CHAIN", "PTS", "LABEL")
                    .bold()
            );
            for (i, level) in catalog.iter().enumerate() {
                println!(
                    "{:>3}  {:>3}  {:<6}  {:>5}  {}",
                    i + 1,
                    level.id,
                    level.structure_tag(),
                    level.points,
                    level.label
                );
            }
        }
        OutputMode::Json => {
            let levels: Vec<Value> = catalog
                .iter()
                .enumerate()
                .map(|(i, level)| {
                    json!({
                        "position": i + 1,
                        "id": level.id,
                        "structure": level.structure_tag(),
                        "mystery_layers": level.mystery_count(),
                        "points": level.points,
                        "label": level.label,
                    })
                })
                .collect();
            write_json_line(&json!({ "command": "levels", "levels": levels }))?;
        }
    }
    Ok(())
}

// ──────────────────── simulate ────────────────────

fn run_simulate(cli: &Cli, args: &SimulateArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let catalog = config.catalog();

    let practice = match args.practice {
        Some(practice_type) => {
            let mut settings = config.practice_defaults();
            settings.practice_type = practice_type;
            if let Some(level) = args.start_level {
                settings.start_level = level_index(&catalog, level)?;
            }
            Some(settings)
        }
        None => None,
    };
    let rounds = args.rounds.unwrap_or(config.assessment.rounds);
    if rounds == 0 {
        return Err(CliError::User("--rounds must be at least 1".to_string()));
    }

    let seed = args.seed.or(config.seed);
    let plan = SimulationPlan {
        practice,
        rounds,
        accuracy: args.accuracy,
        answer_time: Duration::from_millis(args.answer_ms),
        seed,
    };
    let report = simulate(config.session_settings(), catalog, &plan);

    match output_mode(cli) {
        OutputMode::Human => print_report(&report, &plan),
        OutputMode::Json => write_json_line(&json!({
            "command": "simulate",
            "seed": seed,
            "accuracy": args.accuracy,
            "report": serde_json::to_value(&report)?,
        }))?,
    }
    Ok(())
}

fn print_report(report: &SimulationReport, plan: &SimulationPlan) {
    let title = match (report.mode, plan.practice) {
        (Mode::PracticePlay, Some(p)) => format!("Practice simulation ({})", p.practice_type),
        _ => "Assessment simulation".to_string(),
    };
    println!("{}", title.bold());

    let outcome = match report.finish_reason {
        Some(FinishReason::RoundsExhausted) => "all rounds played".green(),
        Some(FinishReason::TimeExpired) => "time expired".yellow(),
        None => "stopped after round target".normal(),
    };
    println!("  Outcome:     {outcome}");

    let s = &report.summary;
    println!(
        "  Rounds:      {} ({} correct, {}%)",
        s.rounds_played, s.correct, s.accuracy_pct
    );
    println!("  Score:       {}", s.score.to_string().bold());
    println!("  Peak level:  {}", s.peak_level);
    if report.mode == Mode::Assessment {
        println!("  Time left:   {}", format_time(report.time_left));
    }
    if !s.mistakes.is_empty() {
        let rounds: Vec<String> = s.mistakes.iter().map(|i| (i + 1).to_string()).collect();
        println!("  Mistakes:    rounds {}", rounds.join(", ").red());
    }
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("{}", "Configuration is valid.".green());
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Levels: {}", config.catalog().len());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("{} {e}", "Configuration is INVALID:".red());
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ──────────────────── helpers ────────────────────

/// Map a 1-based catalog position to an index.
fn level_index(catalog: &LevelCatalog, position: usize) -> Result<usize, CliError> {
    if position == 0 || position > catalog.len() {
        return Err(CliError::User(format!(
            "level {position} is out of range (1-{})",
            catalog.len()
        )));
    }
    Ok(position - 1)
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{raw:?} is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside 0.0..=1.0"))
    }
}

const fn symbol_color(symbol: Symbol) -> Color {
    match symbol {
        Symbol::Circle => Color::Blue,
        Symbol::Square => Color::Red,
        Symbol::Triangle => Color::Green,
        Symbol::Diamond => Color::Yellow,
        Symbol::Star => Color::Magenta,
        Symbol::Hexagon => Color::TrueColor {
            r: 255,
            g: 165,
            b: 0,
        },
    }
}

fn colored_set(set: &SymbolSet) -> String {
    set.iter()
        .map(|s| s.glyph().to_string().color(symbol_color(s)).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("SWC_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
