//! Gifty CLI - wishlists from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password account) and persist the session
//! gifty auth login -e you@example.com -p <password>
//! export GIFTY_REFRESH_TOKEN=<printed token>
//!
//! # Work with wishlists
//! gifty wishlist list
//! gifty wishlist create "Birthday"
//! gifty item add <wishlist-id> "Book" http://example.com/book
//!
//! # Reserve from a share link someone sent you
//! gifty share show <share-code>
//! gifty share reserve <share-code> <item-id>
//! ```
//!
//! Configuration comes from the environment / `.env`
//! (`GIFTY_API_BASE_URL`, `GIFTY_IDENTITY_*`, `GIFTY_REFRESH_TOKEN`).

#![cfg_attr(not(test), forbid(unsafe_code))]
// CLI output belongs on stdout.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod commands;
mod context;

use commands::{auth, item, profile, share, wishlist};

#[derive(Parser)]
#[command(name = "gifty")]
#[command(author, version, about = "Gifty wishlists from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, register, or sign out
    Auth {
        #[command(subcommand)]
        action: auth::AuthAction,
    },
    /// Manage your wishlists
    Wishlist {
        #[command(subcommand)]
        action: wishlist::WishlistAction,
    },
    /// Manage the items on your own wishlists
    Item {
        #[command(subcommand)]
        action: item::ItemAction,
    },
    /// Show or update your profile
    Profile {
        #[command(subcommand)]
        action: profile::ProfileAction,
    },
    /// Generate, resolve, and reserve from share links
    Share {
        #[command(subcommand)]
        action: share::ShareAction,
    },
    /// List wishlists other people shared with you
    SharedWithMe,
    /// Show the current identity and profile
    Whoami,
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
        Commands::Auth { action } => auth::run(action).await?,
        Commands::Wishlist { action } => wishlist::run(action).await?,
        Commands::Item { action } => item::run(action).await?,
        Commands::Profile { action } => profile::run(action).await?,
        Commands::Share { action } => share::run(action).await?,
        Commands::SharedWithMe => share::shared_with_me().await?,
        Commands::Whoami => auth::whoami().await?,
    }
    Ok(())
}
