//! Command-line interface, parsed with clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// YaMDB - reviews and ratings for books, films and music
#[derive(Parser)]
#[command(name = "yamdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an active admin account with superuser rights
    CreateSuperuser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },

    /// Change the role of an existing user
    SetRole {
        username: String,
        /// One of: user, moderator, admin
        role: String,
    },
}
