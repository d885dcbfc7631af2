mod capture;
mod chooser;
mod cli;
mod config;
mod defaults;
mod error;
mod extract;
mod open;
mod registry;
mod resolve;
mod scheme;
mod user;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;
use crate::extract::Candidate;
use crate::registry::Registry;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_file.as_deref())?;
    let config = cli.into_config()?;

    if let Some(dir) = config.path_extension.clone() {
        extend_path(&dir)?;
    }

    // Build the registry
    let loaded = user::load(config.schemes_path.as_deref())?;
    let registry = Registry::merge(defaults::default_schemes(), loaded.schemes, &loaded.remove);

    // Grab the pane text; relative paths resolve against the pane directory
    if !config.read_stdin {
        capture::enter_pane_dir()?;
    }
    let text = capture::screen_text(&config)?;

    let candidates = extract::extract(&text, &registry, &config);
    if candidates.is_empty() {
        info!("no link found");
        return Ok(());
    }

    let lines = extract::display_lines(&candidates);
    match chooser::choose(&lines, &config)? {
        chooser::Outcome::Cancelled => Ok(()),
        chooser::Outcome::Picked(picked) => {
            // One bad selection must not stop the rest of the batch.
            for line in &picked {
                if let Err(err) = open_selection(line, &candidates, &registry, &config) {
                    error!("{err}");
                }
            }
            Ok(())
        }
    }
}

/// Round trip one chooser line: recover the candidate by index, re-derive
/// the command from its raw text, and hand it to an opener.
fn open_selection(
    line: &str,
    candidates: &[Candidate],
    registry: &Registry,
    config: &Config,
) -> error::Result<()> {
    let selection = chooser::parse_selection(line)?;
    let candidate = candidates.get(selection.index - 1).ok_or_else(|| {
        error::Error::Protocol(format!(
            "selection index {} is out of range",
            selection.index
        ))
    })?;
    let (payload, kind) = resolve::resolve(&candidate.raw, &selection.tag, registry, config)?;
    debug!(
        index = selection.index,
        scheme = candidate.scheme_index,
        opener = %kind,
        "opening selection"
    );
    open::open(payload, kind, config)
}

fn init_logging(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();
    match file {
        Some(path) => {
            let sink = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("could not open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(sink))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Prepend the configured directory to `PATH` so program probing and
/// spawning see user-installed openers.
fn extend_path(dir: &Path) -> Result<()> {
    let current = std::env::var_os("PATH").unwrap_or_default();
    let mut parts = vec![dir.to_path_buf()];
    parts.extend(std::env::split_paths(&current));
    let joined =
        std::env::join_paths(parts).context("the PATH extension contains an invalid character")?;
    // No other threads exist this early in the run.
    unsafe { std::env::set_var("PATH", joined) };
    Ok(())
}
