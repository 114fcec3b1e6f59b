mod config_cmd;
mod live;
mod replay;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use posture_coach::config::PostureConfig;
use posture_coach::models::PoseFrame;
use posture_coach::services::{AlertTimer, MessagePicker, PostureSession};

use crate::recording::RecordedEvent;
use crate::report::Reporter;

pub use live::{run_live, LiveCommand};
pub use replay::ReplayCommand;

#[derive(Parser)]
#[command(name = "posture-coach")]
#[command(about = "Posture scoring and alerts from pose landmarks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "POSTURE_COACH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a recorded landmark session
    Replay(ReplayCommand),

    /// Score landmark events streamed on stdin
    Live(LiveCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = config_path(self.config.as_deref())?;

        match self.command {
            Commands::Replay(cmd) => cmd.execute(load_config(&config_path)?).await,
            Commands::Live(cmd) => cmd.execute(load_config(&config_path)?).await,
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(&config_path).await,
                ConfigSubcommands::Init { force } => {
                    config_cmd::init_config(&config_path, force).await
                }
                ConfigSubcommands::Path => {
                    println!("{}", config_path.display());
                    Ok(())
                }
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(PostureConfig::config_file()?),
    }
}

/// Load the config file (defaults when missing) and apply environment overrides
fn load_config(path: &Path) -> Result<PostureConfig> {
    let config = PostureConfig::load_from(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok(config.with_env_overrides()?)
}

/// Apply one recorded event to the session and report what happened
fn apply_event<T: AlertTimer, P: MessagePicker, W: Write>(
    session: &mut PostureSession<T, P>,
    event: RecordedEvent,
    reporter: &mut Reporter<W>,
) -> Result<()> {
    match event {
        RecordedEvent::Frame {
            timestamp_ms,
            landmarks,
        } => {
            let frame = PoseFrame::new(timestamp_ms, landmarks);
            if let Some(outcome) = session.process_frame(&frame) {
                reporter.frame(&outcome)?;
            }
        }
        RecordedEvent::Calibrate { timestamp_ms } => {
            let result = session.calibrate();
            reporter.calibration(timestamp_ms, &result)?;
        }
        RecordedEvent::Reset { timestamp_ms } => {
            session.reset();
            reporter.reset(timestamp_ms)?;
        }
    }
    Ok(())
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
