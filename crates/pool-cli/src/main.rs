//! Userpool CLI - command-line interface for the userpool session manager.

mod commands;
mod output;

use clap::{Parser, Subcommand};

/// Userpool CLI - manage accounts and sessions against a hosted user pool.
#[derive(Parser)]
#[command(name = "userpool")]
#[command(about = "Userpool CLI for registration, authentication and session management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Signup,

    /// Login with username and password
    Login,

    /// Show the current session and profile attributes
    Session,

    /// Change the signed-in user's password
    ChangePassword,

    /// Logout and clear the persisted session
    Logout,

    /// Check authentication status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    pool_config::init_logging(&cli.log_level);

    let engine = match commands::build_engine() {
        Ok(engine) => engine,
        Err(e) => {
            output::print_error(&format!("{:#}", e), &cli.format);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Signup => commands::signup(&engine, &cli.format).await,
        Commands::Login => commands::login(&engine, &cli.format).await,
        Commands::Session => commands::session(&engine, &cli.format).await,
        Commands::ChangePassword => commands::change_password(&engine, &cli.format).await,
        Commands::Logout => commands::logout(&engine, &cli.format).await,
        Commands::Status => commands::status(&engine, &cli.format).await,
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e), &cli.format);
        std::process::exit(1);
    }
}
