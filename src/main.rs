use clap::Parser;
use flowaictl::config::Config;
use flowaictl::infrastructure::command::{ProcfsProbe, SystemCommandRunner};
use flowaictl::interfaces::cli::Cli;
use flowaictl::interfaces::dispatch::Dispatcher;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false) // cleaner
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let runner = SystemCommandRunner;
    let probe = ProcfsProbe;

    let dispatcher = Dispatcher {
        config: &config,
        runner: &runner,
        probe: &probe,
    };

    dispatcher.execute(cli.command)
}
