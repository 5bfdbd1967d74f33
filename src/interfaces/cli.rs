use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Installer and lifecycle manager for the FlowAI-ICT Trading Bot",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install the bot: clone, virtualenv, packages, config, supervision
    Install {
        /// Recreate the virtualenv and reinstall packages even when present
        #[arg(long)]
        force: bool,
    },
    /// Start the bot
    Start,
    /// Stop the bot
    Stop,
    /// Restart the bot
    Restart,
    /// Show install, process and configuration status
    Status {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the tail of logs/bot.log
    Logs {
        /// Number of lines (defaults to FLOWAI_LOG_TAIL_LINES)
        #[arg(short = 'n', long)]
        lines: Option<usize>,
    },
    /// Inspect or edit the bot's .env
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Train the AI model (foreground)
    Train {
        /// Use the reduced training pipeline
        #[arg(long)]
        simple: bool,
    },
    /// Run the backtest engine (foreground)
    Backtest,
    /// Update the checkout to the latest remote state
    Update,
    /// Remove the installation
    Uninstall {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,

        /// Save the .env next to the removed tree
        #[arg(long)]
        keep_config: bool,
    },
    /// Interactive management menu
    Menu,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the whole .env
    Show,
    /// Print one value
    Get { key: String },
    /// Set one value, touching only that line
    Set { key: String, value: String },
    /// Validate the .env against the expected key set
    Validate,
    /// Launch the bot's own interactive configuration wizard
    Wizard,
}
