//! PSS CLI - Database migrations, account management, and demo data.
//!
//! # Usage
//!
//! ```bash
//! # Run the site migrations
//! pss-cli migrate
//!
//! # Create an admin that can sign in immediately
//! pss-cli admin create -u admin -e admin@example.com -p 'a long password'
//!
//! # Inspect and activate accounts
//! pss-cli user list
//! pss-cli user show pss416
//! pss-cli user verify pss416
//!
//! # Replace the customer analytics tables with random demo data
//! pss-cli seed customers --customers 1000 --campaigns 50
//! ```
//!
//! All commands read `PSS_DATABASE_URL` (or `DATABASE_URL`), loading `.env`
//! when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pss-cli")]
#[command(author, version, about = "PSS portfolio site CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect and activate user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database with demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a verified, approved admin account
    Create {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        /// At least 8 characters
        #[arg(short, long)]
        password: String,

        #[arg(long, default_value = "Admin")]
        first_name: String,

        #[arg(long, default_value = "User")]
        last_name: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List every account with its status
    List,
    /// Mark an account verified and approved (for use without SMTP)
    Verify { username: String },
    /// Show one account
    Show { username: String },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Replace customers, campaigns, and their metrics with random data
    Customers {
        #[arg(long, default_value_t = 1000)]
        customers: u32,

        #[arg(long, default_value_t = 50)]
        campaigns: u32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                password,
                first_name,
                last_name,
            } => {
                commands::admin::create(commands::admin::NewAdmin {
                    username,
                    email,
                    password,
                    first_name,
                    last_name,
                })
                .await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::List => commands::user::list().await?,
            UserAction::Verify { username } => commands::user::verify(&username).await?,
            UserAction::Show { username } => commands::user::show(&username).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Customers {
                customers,
                campaigns,
            } => {
                commands::seed::customers(commands::seed::SeedSize {
                    customers,
                    campaigns,
                })
                .await?;
            }
        },
    }
    Ok(())
}
