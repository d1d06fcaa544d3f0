//! photobak - Command-line interface for the backup engine.
//!
//! Resolves settings from flags and config files, sets up logging, runs one
//! backup and prints a one-line summary. Exits 0 whenever the run completes,
//! even if individual files failed; exits 2 on run-level errors.

mod settings;
mod logging;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use engine::{
    run_backup, BackupOptions, BackupResult, ChecksumAlgorithm, CommandConverter, ExifResolver,
    TracingLogger,
};
use tracing::info;

use crate::settings::{
    expand_home, load_config_file, load_env_file, parse_extensions, resolve_setting, SOURCE_KEY,
    TARGET_KEY,
};

/// photobak - Back up photos and videos into a year/month tree
#[derive(Parser, Debug)]
#[command(name = "photobak")]
#[command(version)]
#[command(about = "Back up photos and videos into a year/month tree, converting HEIC to JPEG")]
struct Args {
    /// Source directory (or SOURCE_DIR in the config or .env file)
    #[arg(long, value_name = "DIR")]
    source: Option<PathBuf>,

    /// Target directory (or TARGET_DIR in the config or .env file)
    #[arg(long, value_name = "DIR")]
    target: Option<PathBuf>,

    /// Config file: .json/.toml/.yaml, or a KEY=value env file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log what would be done without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Confirm same-size duplicates by content digest
    #[arg(long)]
    hash: bool,

    /// Digest used with --hash: sha256 or blake3
    #[arg(long, value_name = "ALGORITHM", default_value = "sha256")]
    hash_algorithm: String,

    /// Copy the original HEIC when conversion to JPEG fails
    #[arg(long)]
    copy_heic_on_fail: bool,

    /// Worker count (backups currently run single-threaded)
    #[arg(long, value_name = "N", default_value_t = 1)]
    workers: usize,

    /// Comma-separated extensions to back up (default: .jpg,.jpeg,.png,.heic,.mp4,.mov)
    #[arg(long, value_name = "LIST")]
    extensions: Option<String>,

    /// HEIC decoder command, called as `<command> -q <quality> <input> <output>`
    #[arg(long, value_name = "COMMAND", default_value = engine::convert::DEFAULT_CONVERTER_PROGRAM)]
    converter: String,

    /// Directory for the daily log file
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let exit_code = match run_cli(&args) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main CLI logic - separated for testability
fn run_cli(args: &Args) -> Result<BackupResult> {
    let options = resolve_options(args, Path::new(".env"))?;

    let _guard = logging::init_logging(&args.log_dir, args.verbose)?;

    info!("Starting backup");
    info!("Source: {}", options.source_dir.display());
    info!("Target: {}", options.target_dir.display());
    info!("Extensions: {}", options.extensions.join(", "));
    info!("Dry run: {}", options.dry_run);
    info!("Hash dedup: {} ({})", options.use_hash, options.hash_algorithm);
    info!("Copy HEIC on fail: {}", options.copy_heic_on_fail);

    let result = execute(args, &options)?;

    println!("{}", result);
    info!("Summary: {}", result);
    Ok(result)
}

/// Turn flags plus config files into validated `BackupOptions`.
fn resolve_options(args: &Args, env_path: &Path) -> Result<BackupOptions> {
    let config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => Default::default(),
    };
    let env_file = load_env_file(env_path)?;

    let source = resolve_setting(args.source.as_deref(), &config, &env_file, SOURCE_KEY);
    let target = resolve_setting(args.target.as_deref(), &config, &env_file, TARGET_KEY);
    let (source, target) = match (source, target) {
        (Some(source), Some(target)) => (source, target),
        _ => {
            return Err(anyhow!(
                "source and target are required (via --source/--target, --config, or .env)"
            ))
        }
    };

    let hash_algorithm = ChecksumAlgorithm::parse(&args.hash_algorithm).ok_or_else(|| {
        anyhow!(
            "Invalid hash algorithm '{}'. Must be 'sha256' or 'blake3'",
            args.hash_algorithm
        )
    })?;

    let mut options = BackupOptions::new(expand_home(&source), expand_home(&target));
    if let Some(extensions) = parse_extensions(args.extensions.as_deref()) {
        options = options.with_extensions(extensions);
    }
    options.dry_run = args.dry_run;
    options.use_hash = args.hash;
    options.hash_algorithm = hash_algorithm;
    options.copy_heic_on_fail = args.copy_heic_on_fail;
    options.workers = args.workers;

    options.validate()?;
    Ok(options)
}

/// Run the engine with the production collaborators.
fn execute(args: &Args, options: &BackupOptions) -> Result<BackupResult> {
    let converter = CommandConverter::from_command_line(&args.converter)
        .ok_or_else(|| anyhow!("--converter must name a program"))?;

    run_backup(options, &ExifResolver, &converter, &TracingLogger).context("Backup failed")
}
