//! Oido CLI - drive the stimulus/response engine from a terminal.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "oido")]
#[command(author, version, about = "Oido stimulus/response engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render stimuli to WAV files
    Render(commands::render::RenderArgs),

    /// Play a stimulus live through the output device
    Play(commands::play::PlayArgs),

    /// Measure tap tempo from the terminal
    Tap(commands::tap::TapArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Tap(args) => commands::tap::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
