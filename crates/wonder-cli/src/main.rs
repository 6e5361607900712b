use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "wonder-cli", version, about = "Wonder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's question
    Daily {
        #[command(subcommand)]
        action: commands::daily::DailyAction,
    },
    /// Thought journal
    Thought {
        #[command(subcommand)]
        action: commands::thought::ThoughtAction,
    },
    /// Themed journeys
    Journey {
        #[command(subcommand)]
        action: commands::journey::JourneyAction,
    },
    /// Streak status
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Morning ritual notifications
    Ritual {
        #[command(subcommand)]
        action: commands::ritual::RitualAction,
    },
    /// Stored data inspection
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Daily { action } => commands::daily::run(action).await,
        Commands::Thought { action } => commands::thought::run(action).await,
        Commands::Journey { action } => commands::journey::run(action).await,
        Commands::Streak { action } => commands::streak::run(action).await,
        Commands::Ritual { action } => commands::ritual::run(action).await,
        Commands::Data { action } => commands::data::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
