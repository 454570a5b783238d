//! Sprig - plant care tracker
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use sprig::config::{crash_log_path, Config};
use sprig::error::{exit_codes, SprigError};
use sprig::identify::UnconfiguredIdentifier;
use sprig::service::CareService;
use sprig::storage::FilePlantStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Sprig - track watering schedules and plant health
#[derive(Parser)]
#[command(name = "sprig")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Act as this owner instead of the configured one
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output flags shared by every command.
#[derive(Args, Debug, Clone, Copy, Default)]
struct OutputFlags {
    /// Output as JSON
    #[arg(long, short)]
    json: bool,
    /// Suppress output
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a plant from an image reference
    Add {
        /// Path or URL of the plant photo
        image: String,
        /// Species name (skips identification)
        #[arg(long, short)]
        species: Option<String>,
        /// Nickname shown instead of the species
        #[arg(long, short)]
        nickname: Option<String>,
        /// Water every N days
        #[arg(long, short = 'f')]
        frequency: Option<u32>,
        /// Sunlight hint
        #[arg(long)]
        sunlight: Option<String>,
        /// Record a watering now so the schedule starts immediately
        #[arg(long, short)]
        watered: bool,
        #[command(flatten)]
        output: OutputFlags,
    },

    /// List your plants
    List {
        /// Only plants that need attention
        #[arg(long, short)]
        attention: bool,
        #[command(flatten)]
        output: OutputFlags,
    },

    /// Show one plant's details
    Show {
        /// Plant ID
        id: String,
        #[command(flatten)]
        output: OutputFlags,
    },

    /// Record a watering
    Water {
        /// Plant ID
        id: String,
        #[command(flatten)]
        output: OutputFlags,
    },

    /// Remove a plant
    Remove {
        /// Plant ID
        id: String,
        #[command(flatten)]
        output: OutputFlags,
    },

    /// Recompute and save every plant's care state
    Sweep {
        #[command(flatten)]
        output: OutputFlags,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("sprig error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.sprig/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("sprig panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Some(parent) = crash_log.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();
    let owner = cli.owner.unwrap_or_else(|| config.owner_id());

    match cli.command {
        Commands::Add {
            image,
            species,
            nickname,
            frequency,
            sunlight,
            watered,
            output,
        } => run_add(
            &config,
            &owner,
            &image,
            AddArgs {
                species,
                nickname,
                frequency,
                sunlight,
                watered,
            },
            output,
        ),
        Commands::List { attention, output } => run_list(&config, &owner, attention, output),
        Commands::Show { id, output } => run_show(&config, &owner, &id, output),
        Commands::Water { id, output } => run_water(&config, &owner, &id, output),
        Commands::Remove { id, output } => run_remove(&config, &owner, &id, output),
        Commands::Sweep { output } => run_sweep(&config, &owner, output),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

type CliResult = Result<ExitCode, Box<dyn std::error::Error>>;

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
}

/// Open the file-backed care service described by `config`.
fn open_service(config: &Config) -> Result<CareService<FilePlantStore>, SprigError> {
    let dir = config.plants_dir().ok_or_else(|| {
        SprigError::config("Could not determine plants directory (no home directory)")
    })?;
    let store = FilePlantStore::with_dir(dir)?;
    Ok(CareService::new(store, config.care.clone()))
}

struct AddArgs {
    species: Option<String>,
    nickname: Option<String>,
    frequency: Option<u32>,
    sunlight: Option<String>,
    watered: bool,
}

fn run_add(
    config: &Config,
    owner: &str,
    image: &str,
    args: AddArgs,
    flags: OutputFlags,
) -> CliResult {
    use sprig::cli::add::{AddCommand, AddOptions};

    let service = open_service(config)?;
    let identifier = UnconfiguredIdentifier;
    let cmd = AddCommand::new(&service, &identifier, owner);
    let options = AddOptions {
        json: flags.json,
        quiet: flags.quiet,
        species: args.species,
        nickname: args.nickname,
        frequency_days: args.frequency,
        sunlight: args.sunlight,
        watered: args.watered,
    };

    let output = cmd.run(image, &options, Utc::now());
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_list(config: &Config, owner: &str, attention: bool, flags: OutputFlags) -> CliResult {
    use sprig::cli::list::{ListCommand, ListOptions};

    let service = open_service(config)?;
    let cmd = ListCommand::new(&service, owner);
    let options = ListOptions {
        json: flags.json,
        quiet: flags.quiet,
        attention,
    };

    let output = cmd.run(&options, Utc::now());
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_show(config: &Config, owner: &str, id: &str, flags: OutputFlags) -> CliResult {
    use sprig::cli::show::{ShowCommand, ShowOptions};

    let service = open_service(config)?;
    let cmd = ShowCommand::new(&service, owner);
    let options = ShowOptions {
        json: flags.json,
        quiet: flags.quiet,
    };

    let output = cmd.run(id, Utc::now());
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_water(config: &Config, owner: &str, id: &str, flags: OutputFlags) -> CliResult {
    use sprig::cli::water::{WaterCommand, WaterOptions};

    let service = open_service(config)?;
    let cmd = WaterCommand::new(&service, owner);
    let options = WaterOptions {
        json: flags.json,
        quiet: flags.quiet,
    };

    let output = cmd.run(id, Utc::now());
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_remove(config: &Config, owner: &str, id: &str, flags: OutputFlags) -> CliResult {
    use sprig::cli::remove::{RemoveCommand, RemoveOptions};

    let service = open_service(config)?;
    let cmd = RemoveCommand::new(&service, owner);
    let options = RemoveOptions {
        json: flags.json,
        quiet: flags.quiet,
    };

    let output = cmd.run(id);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_sweep(config: &Config, owner: &str, flags: OutputFlags) -> CliResult {
    use sprig::cli::sweep::{SweepCommand, SweepOptions};

    let service = open_service(config)?;
    let cmd = SweepCommand::new(&service, owner);
    let options = SweepOptions {
        json: flags.json,
        quiet: flags.quiet,
    };

    let output = cmd.run(Utc::now());
    print_formatted(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
