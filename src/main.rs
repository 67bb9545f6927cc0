use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use theme_publisher::config::{Cli, Config};
use theme_publisher::git::GitCli;
use theme_publisher::paths::relative_posix;
use theme_publisher::prompt::TerminalPrompter;
use theme_publisher::publisher::{Outcome, Publisher, StashRestore};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;

    // Validate repository root
    if !config.repo_root.is_dir() {
        bail!("Repository root not found: {}", config.repo_root.display());
    }
    if !config.repo_root.join(".git").exists() {
        bail!(
            "Not a git repository: {} (.git not found)",
            config.repo_root.display()
        );
    }

    // Setup Ctrl+C handler
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    if config.verbose {
        eprintln!(
            "Publishing into {} ({}/{}), files served from {}",
            config.repo_root.display(),
            config.remote,
            config.branch,
            config.base_url
        );
    }

    let start = Instant::now();
    let git = GitCli::new(
        &config.repo_root,
        &config.remote,
        &config.branch,
        config.verbose,
    );
    let report = Publisher::new(&config, git, TerminalPrompter, &shutdown).run();

    if let Outcome::Completed(summary) = &report.outcome {
        println!(
            "Published {} '{}' ({}) v{} in {:.2}s",
            summary.item.as_str().to_lowercase(),
            summary.id,
            summary.resolution,
            summary.version,
            start.elapsed().as_secs_f64()
        );
        if config.verbose {
            println!("  archive: {}", relative_posix(&config.repo_root, &summary.archive));
            println!("  preview: {}", relative_posix(&config.repo_root, &summary.preview));
            println!("  catalog: {}", relative_posix(&config.repo_root, &summary.catalog));
        }
    }

    if let StashRestore::Failed(reason) = &report.stash {
        if config.verbose {
            eprintln!("stash pop: {reason}");
        }
    }

    Ok(ExitCode::from(report.exit_code()))
}
