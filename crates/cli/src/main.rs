//! Marché CLI - database migrations, seeding and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (marketplace schema and session table)
//! marche-cli migrate
//!
//! # Create an account
//! marche-cli user create -e awa@example.com -n "Awa Diop" -p "motdepasse"
//!
//! # Seed the catalog for a seller
//! marche-cli seed --file seed/products.yaml --seller-email awa@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `MARCHE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "marche-cli")]
#[command(author, version, about = "Marché CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert catalog products from a YAML file
    Seed {
        /// Path to the YAML seed file
        #[arg(short, long)]
        file: String,

        /// Seller account owning the products (overrides the file)
        #[arg(short, long)]
        seller_email: Option<String>,
    },
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a password account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Seed { file, seller_email } => {
            commands::seed::products(&file, seller_email.as_deref()).await?;
        }
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
            } => {
                commands::user::create(&email, &name, &password).await?;
            }
        },
    }
    Ok(())
}
