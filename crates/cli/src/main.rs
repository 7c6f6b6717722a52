//! Bazaar CLI - database migrations and dashboard accounts.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bazaar migrate
//!
//! # Create the first admin
//! bazaar user create -e admin@example.com -n "Admin Name" -r admin --password '...'
//!
//! # Create a vendor account
//! bazaar user create -e sam@example.com -n "Sam" -r vendor --vendor sams-goods --password '...'
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use bazaar_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage dashboard users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new dashboard user
    Create {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin` or `vendor`)
        #[arg(short, long)]
        role: UserRole,

        /// Slug of the vendor a vendor user manages
        #[arg(long)]
        vendor: Option<String>,

        /// Initial password
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                vendor,
                password,
            } => {
                commands::user::create(commands::user::NewUser {
                    email,
                    name,
                    role,
                    vendor_slug: vendor,
                    password,
                })
                .await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "bazaar", "user", "create", "-e", "sam@example.com", "-n", "Sam", "-r", "vendor",
            "--vendor", "sams-goods", "--password", "a long password",
        ]);
        let Ok(Cli {
            command: Commands::User {
                action: UserAction::Create { role, vendor, .. },
            },
        }) = cli
        else {
            panic!("expected user create");
        };
        assert_eq!(role, UserRole::Vendor);
        assert_eq!(vendor.as_deref(), Some("sams-goods"));
    }

    #[test]
    fn test_rejects_unknown_role() {
        assert!(
            Cli::try_parse_from([
                "bazaar", "user", "create", "-e", "a@b.co", "-n", "A", "-r", "owner",
                "--password", "x",
            ])
            .is_err()
        );
    }
}
