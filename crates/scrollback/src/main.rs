use clap::Parser;
use eyre::Result;
use scrollback::cli::{Cli, Commands, PreferencesCommands};
use scrollback::commands::Command;
use scrollback::commands::preferences::{PreferencesAction, PreferencesCommand};
use scrollback::commands::render::RenderCommand;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Install color-eyre for better error reports
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load .env file if it exists
    scrollback::cli::config::load_env()?;

    // RUST_LOG wins over --debug
    let default_level = if cli.debug { "scrollback=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            messages,
            selected,
            index,
            narrow,
            time_zone,
            now,
            collapse,
        } => RenderCommand {
            messages,
            selected,
            index,
            narrow,
            time_zone,
            now,
            collapse,
            preferences: cli.preferences,
        }
        .execute(),
        Commands::Preferences { action } => PreferencesCommand {
            action: match action {
                PreferencesCommands::Show => PreferencesAction::Show,
                PreferencesCommands::Reset => PreferencesAction::Reset,
                PreferencesCommands::Path => PreferencesAction::Path,
            },
            path: cli.preferences,
        }
        .execute(),
    }
}
