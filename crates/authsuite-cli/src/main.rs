//! AuthSuite CLI - sign in to an AuthSuite server and manage its theme.
//!
//! The session is kept in memory: `login` holds it open and refreshes the
//! access token in the background until interrupted.

mod commands;
mod logging;

use anyhow::Result;
use authsuite_core::Config;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use commands::ThemeChanges;

#[derive(Parser, Debug)]
#[command(name = "authsuite", version, about = "AuthSuite command line client")]
struct Cli {
    /// Auth API base URL (overrides config and AUTHSUITE_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and keep the session alive until Ctrl+C
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Show or change the suite theme
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },
    /// Show which page a path leads to
    Route {
        path: String,
        /// Resolve as a signed-in user
        #[arg(long)]
        authenticated: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    /// Print the current theme settings
    Show,
    /// Change theme settings (requires login)
    Save {
        #[arg(short, long)]
        username: Option<String>,
        #[command(flatten)]
        changes: ThemeChanges,
    },
    /// Restore the default theme (requires login)
    Reset {
        #[arg(short, long)]
        username: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
    .with_env_overrides();
    if let Some(url) = cli.base_url {
        config.api_base_url = Some(url);
    }

    let _log_guard = logging::init_tracing(&config);
    info!("AuthSuite CLI starting");

    let result = match cli.command {
        Command::Login { username } => commands::hold_session(&mut config, username).await,
        Command::Theme { action } => match action {
            ThemeCommand::Show => commands::show_theme(&config).await,
            ThemeCommand::Save { username, changes } => {
                commands::save_theme(&mut config, username, changes).await
            }
            ThemeCommand::Reset { username } => commands::reset_theme(&mut config, username).await,
        },
        Command::Route {
            path,
            authenticated,
        } => {
            println!("{}", commands::describe_route(&path, authenticated));
            Ok(())
        }
    };

    if let Err(ref e) = result {
        warn!(error = %e, "Command failed");
    }
    info!("AuthSuite CLI shutting down");
    result
}
