//! termlaunch - launch a project's terminals as tmux windows
//!
//! Reads `.termlaunch.json` / `.termlaunch` files from the workspace roots
//! and opens one tmux window per configured terminal.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, error, info};

use termlaunch::commands;
use termlaunch::config::loader::{ConfigFormat, ConfigLoader};
use termlaunch::config::Settings;
use termlaunch::models::LaunchOutcome;
use termlaunch::session::{
    ConflictPolicy, Orchestrator, PromptProvider, StdinPrompt, TmuxHost, TokioClock,
};

#[derive(Parser)]
#[command(name = "termlaunch", version)]
#[command(about = "Launch a project's terminals as named tmux windows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace root searched for configs (repeatable, defaults to the
    /// current directory)
    #[arg(short, long = "workspace", global = true)]
    workspace: Vec<PathBuf>,

    /// tmux session that owns the launched windows
    #[arg(long, global = true)]
    tmux_session: Option<String>,

    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the terminals of the current project
    Launch {
        /// Config file to launch instead of discovering one
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Answer name collisions without asking
        #[arg(long, value_parser = parse_policy)]
        on_conflict: Option<ConflictPolicy>,
        /// Stay running and close the launched windows on Ctrl-C
        #[arg(long)]
        hold: bool,
    },
    /// Launch the terminals of every discovered project
    LaunchAll {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Answer name collisions without asking
        #[arg(long, value_parser = parse_policy)]
        on_conflict: Option<ConflictPolicy>,
        /// Stay running and close the launched windows on Ctrl-C
        #[arg(long)]
        hold: bool,
    },
    /// Write a starter config into the first workspace root
    Init {
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatArg,
    },
    /// Report config files as they are created
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Text,
}

impl From<FormatArg> for ConfigFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ConfigFormat::Json,
            FormatArg::Text => ConfigFormat::Text,
        }
    }
}

fn parse_policy(value: &str) -> std::result::Result<ConflictPolicy, String> {
    value.parse()
}

/// Interactive prompts with a fixed answer for name collisions
struct FixedPolicyPrompt {
    policy: ConflictPolicy,
    inner: StdinPrompt,
}

impl PromptProvider for FixedPolicyPrompt {
    fn choose_conflict_policy(&self, conflicting: &[String]) -> ConflictPolicy {
        debug!("{} collision(s), using {}", conflicting.len(), self.policy);
        self.policy
    }

    fn select_config(&self, candidates: &[PathBuf]) -> Option<usize> {
        self.inner.select_config(candidates)
    }

    fn confirm(&self, question: &str) -> bool {
        self.inner.confirm(question)
    }
}

fn init_logging(debug: bool) {
    let log_level = if debug
        || env::var("TERMLAUNCH_DEBUG").map_or(false, |v| v == "1" || v.to_lowercase() == "true")
    {
        "debug"
    } else {
        "info"
    };

    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };

    if let Some(session) = &cli.tmux_session {
        settings.tmux.session = session.clone();
    }
    settings
        .validate()
        .map_err(|reason| anyhow::anyhow!("Invalid settings: {}", reason))?;

    Ok(settings)
}

fn workspace_roots(cli: &Cli, cwd: &Path) -> Vec<PathBuf> {
    if cli.workspace.is_empty() {
        vec![cwd.to_path_buf()]
    } else {
        cli.workspace.iter().map(|root| cwd.join(root)).collect()
    }
}

fn prompt_for(on_conflict: Option<ConflictPolicy>) -> Arc<dyn PromptProvider> {
    match on_conflict {
        Some(policy) => Arc::new(FixedPolicyPrompt {
            policy,
            inner: StdinPrompt::new(),
        }),
        None => Arc::new(StdinPrompt::new()),
    }
}

/// Print the outcome and map it to an exit code
fn report(outcome: &LaunchOutcome) -> ExitCode {
    println!("{}", outcome.summary());
    match outcome {
        LaunchOutcome::Success { .. } | LaunchOutcome::UserCancelled => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let settings = load_settings(&cli)?;
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let roots = workspace_roots(&cli, &cwd);
    let loader = ConfigLoader::new(roots.clone(), &settings.discovery);

    debug!("Workspace roots: {:?}", roots);

    let (on_conflict, hold) = match &cli.command {
        Commands::Init { format } => {
            let path = commands::init_config(&loader, (*format).into())?;
            println!("Created {}", path.display());
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Watch => {
            let watcher = commands::watch_workspace(&loader)?;
            let handle = watcher.start_background_watch(|path| {
                info!(
                    "New terminal configuration: {} (run `termlaunch launch` to start it)",
                    path.display()
                );
            });
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Stopped watching"),
                _ = handle.stopped() => {}
            }
            handle.stop();
            handle.join().await;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Launch {
            on_conflict, hold, ..
        }
        | Commands::LaunchAll {
            on_conflict, hold, ..
        } => (*on_conflict, *hold),
    };

    let prompt = prompt_for(on_conflict);
    let host = Arc::new(TmuxHost::new(&settings.tmux));
    let mut orchestrator = Orchestrator::new(host, prompt.clone(), Arc::new(TokioClock::new()))
        .with_timing(settings.timing.to_launch_timing())
        .with_workspace_roots(roots);

    let outcome = match &cli.command {
        Commands::Launch { config, .. } => {
            let explicit = config.as_ref().map(|path| cwd.join(path));
            commands::launch_current_project(
                &mut orchestrator,
                prompt.as_ref(),
                &loader,
                explicit.as_deref(),
            )
            .await?
        }
        Commands::LaunchAll { yes, .. } => {
            commands::launch_all_projects(&mut orchestrator, prompt.as_ref(), &loader, *yes)
                .await?
        }
        Commands::Init { .. } | Commands::Watch => return Ok(ExitCode::SUCCESS),
    };

    orchestrator.run_dispatches().await;
    let code = report(&outcome);

    if hold && !orchestrator.tracked().is_empty() {
        info!(
            "Holding {} terminal(s), press Ctrl-C to close them",
            orchestrator.tracked().len()
        );
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        orchestrator.dispose_all().await;
    }

    Ok(code)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    debug!("Starting {} v{}", termlaunch::NAME, termlaunch::VERSION);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
