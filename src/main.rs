// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CLI entry point for apt-repo-manager
//!
//! Provides command-line interface for adding and removing APT
//! repositories and listing the configured sources.

use anyhow::Context;
use apt_repo_manager::config::AptPaths;
use apt_repo_manager::core::SourcesList;
use apt_repo_manager::manager::{
    list_filename, ApplyOutcome, ApplyRequest, RepoState, SourcesManager,
};
use apt_repo_manager::system::distro::OS_RELEASE_PATH;
use apt_repo_manager::system::{
    AptClient, ClientMode, Distribution, LaunchpadClient, SigningKeyInstaller, SystemRunner,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apt-repo-manager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Primary sources list (default: from apt-config)
    #[arg(long, env = "APT_REPO_SOURCES_LIST", global = true)]
    sources_list: Option<PathBuf>,

    /// Source-parts directory (default: from apt-config)
    #[arg(long, env = "APT_REPO_SOURCES_DIR", global = true)]
    sources_dir: Option<PathBuf>,

    /// os-release file used for distribution detection
    #[arg(long, default_value = OS_RELEASE_PATH, global = true)]
    os_release: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StateArg {
    Present,
    Absent,
}

impl From<StateArg> for RepoState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => RepoState::Present,
            StateArg::Absent => RepoState::Absent,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add or remove a repository
    Apply {
        /// Source line (`deb ...`) or PPA shorthand (`ppa:owner/name`)
        repo: String,

        /// Whether the repository should be present or absent
        #[arg(long, value_enum, default_value = "present")]
        state: StateArg,

        /// File for a newly added line (`.list` is appended when missing)
        #[arg(long)]
        filename: Option<String>,

        /// Trailing comment for a newly added line
        #[arg(long, default_value = "")]
        comment: String,

        /// Octal mode for newly created list files
        #[arg(long, value_parser = parse_mode, default_value = "0644")]
        mode: u32,

        /// Release codename for PPA expansion (default: detected)
        #[arg(long)]
        codename: Option<String>,

        /// Skip `apt-get update` after a change
        #[arg(long)]
        no_update_cache: bool,

        /// Report what would change without writing anything
        #[arg(long)]
        check: bool,

        /// Print a unified diff of changed files
        #[arg(long)]
        diff: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all configured sources
    List {
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = resolve_paths(cli.sources_list.as_deref(), cli.sources_dir.as_deref())?;
    debug!("Using {:?}", paths);

    match cli.command {
        Commands::Apply {
            repo,
            state,
            filename,
            comment,
            mode,
            codename,
            no_update_cache,
            check,
            diff,
            json,
        } => {
            let request = ApplyRequest {
                repo,
                state: state.into(),
                comment,
                filename: filename.as_deref().map(list_filename),
                mode,
                update_cache: !no_update_cache,
            };
            let outcome = apply(&cli.os_release, paths, &request, codename, check)?;
            print_outcome(&outcome, check, diff, json)?;
        }
        Commands::List { json } => list_sources(paths, json)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the `-v` count picks the level
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_mode(value: &str) -> Result<u32, String> {
    let digits = value.trim_start_matches("0o");
    u32::from_str_radix(digits, 8).map_err(|_| format!("'{value}' is not an octal file mode"))
}

fn expand(path: &Path) -> anyhow::Result<PathBuf> {
    let raw = path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid path encoding"))?;
    Ok(PathBuf::from(shellexpand::tilde(raw).as_ref()))
}

/// Explicit locations override what apt-config reports
fn resolve_paths(
    sources_list: Option<&Path>,
    sources_dir: Option<&Path>,
) -> anyhow::Result<AptPaths> {
    let discovered = match (sources_list, sources_dir) {
        (Some(_), Some(_)) => AptPaths::default(),
        _ => AptPaths::discover(&SystemRunner),
    };

    Ok(AptPaths::new(
        match sources_list {
            Some(path) => expand(path)?,
            None => discovered.sources_list,
        },
        match sources_dir {
            Some(path) => expand(path)?,
            None => discovered.sources_dir,
        },
    ))
}

fn apply(
    os_release: &Path,
    paths: AptPaths,
    request: &ApplyRequest,
    codename: Option<String>,
    check: bool,
) -> anyhow::Result<ApplyOutcome> {
    let distro = Distribution::detect(&expand(os_release)?)?;
    let sources = SourcesList::load(paths)?;

    let (mode, key_installer) = if check {
        (ClientMode::DryRun, None)
    } else {
        let installer =
            SigningKeyInstaller::new(Box::new(LaunchpadClient::new()?), Box::new(SystemRunner));
        (ClientMode::Live, Some(installer))
    };

    let mut manager = SourcesManager::for_distribution(&distro, sources, codename, key_installer)?;
    let apt = AptClient::new(mode, Box::new(SystemRunner));

    manager
        .apply(request, &apt)
        .with_context(|| format!("Failed to set '{}' {}", request.repo, request.state))
}

fn print_outcome(
    outcome: &ApplyOutcome,
    check: bool,
    diff: bool,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    if outcome.changed {
        let verb = if check { "Would change" } else { "Changed" };
        println!(
            "{} {}: {} {}",
            "✓".green().bold(),
            verb.bold(),
            outcome.repo.cyan(),
            format!("({})", outcome.state).dimmed()
        );
    } else {
        println!(
            "{} Unchanged: {} {}",
            "✓".green(),
            outcome.repo.cyan(),
            format!("({})", outcome.state).dimmed()
        );
    }

    if diff {
        for file in &outcome.diff {
            println!("\n{}", file.path.display().to_string().bold());
            for line in file.unified().lines() {
                if line.starts_with('+') && !line.starts_with("+++") {
                    println!("{}", line.green());
                } else if line.starts_with('-') && !line.starts_with("---") {
                    println!("{}", line.red());
                } else {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

/// List every valid source across all files
fn list_sources(paths: AptPaths, json: bool) -> anyhow::Result<()> {
    let sources = SourcesList::load(paths)?;

    if json {
        let entries: Vec<_> = sources.iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let mut total = 0;
    for entry in sources.iter() {
        total += 1;
        let location = format!("{}:{}", entry.file.display(), entry.index + 1).dimmed();
        let state = if entry.enabled {
            "enabled ".green()
        } else {
            "disabled".yellow()
        };
        if entry.comment.is_empty() {
            println!("{} {} {}", location, state, entry.source);
        } else {
            println!(
                "{} {} {} {}",
                location,
                state,
                entry.source,
                format!("# {}", entry.comment).dimmed()
            );
        }
    }

    println!("\n{} Total: {} sources", "✓".green(), total);

    Ok(())
}
