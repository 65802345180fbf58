//! H3 CLI - your bank account in the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{auth, card, chat, demo, doctor, logs, profile, status, transactions, transfer};
use h3_core::LogEvent;

/// H3 - banking in your terminal
#[derive(Parser)]
#[command(name = "h3", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with your phone number and an SMS code
    Login {
        /// Phone number (prompted if omitted)
        phone: Option<String>,
        /// Six-digit verification code (prompted if omitted)
        #[arg(long)]
        code: Option<String>,
        /// Interface language for a new account (en or ar)
        #[arg(long)]
        language: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open an account: verify your email and complete your profile
    Signup(auth::SignupArgs),

    /// End the current session
    Logout,

    /// Show account status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show this session's transactions (not saved between runs; demo mode lists samples)
    Transactions {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send money to a recipient
    Transfer {
        /// Recipient name or account
        recipient: String,
        /// Amount to send
        amount: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or pay the zakat due on your balance
    Zakat {
        /// Pay the amount due now
        #[arg(long)]
        pay: bool,
        /// Recipient of the payment
        #[arg(long)]
        recipient: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: profile::ProfileCommands,
    },

    /// Manage virtual cards
    Card {
        #[command(subcommand)]
        command: card::CardCommands,
    },

    /// Chat with the support assistant
    Chat {
        /// Send a single message instead of starting a conversation
        message: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// Check stored records for problems
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Login { .. } => "login",
            Commands::Signup(_) => "signup",
            Commands::Logout => "logout",
            Commands::Status { .. } => "status",
            Commands::Transactions { .. } => "transactions",
            Commands::Transfer { .. } => "transfer",
            Commands::Zakat { .. } => "zakat",
            Commands::Profile { .. } => "profile",
            Commands::Card { .. } => "card",
            Commands::Chat { .. } => "chat",
            Commands::Demo { .. } => "demo",
            Commands::Doctor { .. } => "doctor",
            Commands::Logs { .. } => "logs",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();

    let result = run(cli).await;

    // The logs command manages the log itself
    if command != "logs" {
        let logger = commands::get_logger();
        let event = match &result {
            Ok(()) => LogEvent::new("command_executed").with_command(command),
            Err(e) => LogEvent::new("command_failed")
                .with_command(command)
                .with_error(e.to_string()),
        };
        commands::log_event(&logger, event);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { phone, code, language, json } => {
            auth::run_login(phone, code, language, json).await
        }
        Commands::Signup(args) => auth::run_signup(args).await,
        Commands::Logout => auth::run_logout(),
        Commands::Status { json } => status::run(json),
        Commands::Transactions { limit, json } => transactions::run(limit, json),
        Commands::Transfer { recipient, amount, yes, json } => {
            transfer::run(&recipient, &amount, yes, json).await
        }
        Commands::Zakat { pay, recipient, yes, json } => {
            transfer::run_zakat(recipient, pay, yes, json).await
        }
        Commands::Profile { command } => profile::run(command),
        Commands::Card { command } => card::run(command).await,
        Commands::Chat { message, json } => chat::run(message, json).await,
        Commands::Demo { command } => demo::run(command),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_transactions_help_mentions_session_scope() {
        let cli = Cli::command();
        let about = cli
            .find_subcommand("transactions")
            .and_then(|c| c.get_about())
            .map(|a| a.to_string())
            .unwrap_or_default();
        assert!(about.contains("session"));
        assert!(about.contains("not saved between runs"));
    }
}
