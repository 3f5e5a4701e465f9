//! `atomfs` command-line front-end.
//!
//! # Responsibility
//! - Map subcommands onto `atomfs_core::Instance` operations.
//! - Own process concerns: argument parsing, logging init, exit codes.
//!
//! # Invariants
//! - Every opened store is closed before the process exits.
//! - `fsck` exits with status 1 when it reports any problem.

use atomfs_core::{
    default_log_level, init_logging, with_instance, AtomHash, Config, Instance, LogConfig,
    StoreError,
};
use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Content-addressed atom store with named molecule snapshots.
#[derive(Parser, Debug)]
#[command(name = "atomfs", version, about, long_about = None)]
struct Cli {
    /// Store root directory
    #[arg(short, long, global = true, default_value = "atomfs")]
    root: PathBuf,

    /// Log level (trace|debug|info|warn|error); requires --log-dir
    #[arg(long, global = true, requires = "log_dir")]
    log_level: Option<String>,

    /// Absolute directory for log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify every atom's content against its hash
    Fsck,
    /// Remove unreferenced atoms and orphaned content files
    Gc {
        /// Report what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Snapshot a molecule under a new name
    Copy { dest: String, src: String },
    /// Delete a molecule (its atoms are reclaimed by a later gc)
    Delete { name: String },
    /// List molecules and their atoms
    List,
    /// Store a file's content as an atom and print its hash
    Put { file: PathBuf },
    /// Create a molecule from atom hashes, bottom layer first
    Create {
        name: String,
        #[arg(required = true)]
        atoms: Vec<String>,
    },
}

#[derive(Debug)]
enum CliError {
    Store(StoreError),
    Usage(String),
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Usage(message) => f.write_str(message),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let mut config = LogConfig::new(level, log_dir);
        config.mirror_to_stderr = true;
        if let Err(err) = init_logging(&config) {
            eprintln!("atomfs: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("atomfs: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let config = Config::new(&cli.root);

    // Hashes are validated before the store is opened.
    let create_atoms = match &cli.command {
        Command::Create { atoms, .. } => atoms
            .iter()
            .map(|value| AtomHash::parse(value.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| CliError::Usage(err.to_string()))?,
        _ => Vec::new(),
    };
    let put_bytes = match &cli.command {
        Command::Put { file } => Some(std::fs::read(file).map_err(|err| {
            CliError::Usage(format!("cannot read `{}`: {err}", file.display()))
        })?),
        _ => None,
    };

    let code = with_instance(config, |instance| {
        execute(cli, instance, &create_atoms, put_bytes.as_deref())
    })?;
    Ok(code)
}

fn execute(
    cli: &Cli,
    instance: &Instance,
    create_atoms: &[AtomHash],
    put_bytes: Option<&[u8]>,
) -> Result<ExitCode, StoreError> {
    match &cli.command {
        Command::Fsck => {
            let problems = instance.fsck()?;
            if cli.json {
                print_json(&problems);
            } else {
                for problem in &problems {
                    println!("{problem}");
                }
            }
            Ok(if problems.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Gc { dry_run } => {
            let report = instance.gc(*dry_run)?;
            if cli.json {
                print_json(&report);
            } else {
                let verb = if report.dry_run { "would remove" } else { "removed" };
                for hash in &report.pruned_atoms {
                    println!("{verb} atom record {hash}");
                }
                for name in &report.removed_files {
                    println!("{verb} file {name}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Copy { dest, src } => {
            let molecule = instance.copy_molecule(dest, src)?;
            if cli.json {
                print_json(&molecule);
            } else {
                println!("{} ({} atoms)", molecule.name, molecule.atoms.len());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Delete { name } => {
            instance.delete_molecule(name)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            let molecules = instance.list_molecules()?;
            if cli.json {
                print_json(&molecules);
            } else {
                for molecule in &molecules {
                    println!("{}", molecule.name);
                    for hash in &molecule.atoms {
                        println!("  {hash}");
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Put { .. } => {
            let atom = instance.put_atom(put_bytes.unwrap_or_default())?;
            if cli.json {
                print_json(&atom);
            } else {
                println!("{}", atom.hash);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Create { name, .. } => {
            let molecule = instance.create_molecule(name, create_atoms)?;
            if cli.json {
                print_json(&molecule);
            } else {
                println!("{} ({} atoms)", molecule.name, molecule.atoms.len());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("atomfs: failed to encode output: {err}"),
    }
}
