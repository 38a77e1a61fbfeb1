//! Command-line surface of the `statehouse` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Statehouse: drive the application store from the command line
#[derive(Parser, Debug)]
#[command(name = "statehouse")]
#[command(about = "Predictable state container with effects", long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/statehouse/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the persisted state tree as JSON
    State,
    /// Manage the shopping list
    #[command(subcommand)]
    Shopping(ShoppingCommand),
    /// Manage recipes and their remote copy
    #[command(subcommand)]
    Recipes(RecipesCommand),
    /// Sign in, sign up or out
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShoppingCommand {
    /// List ingredients with their index
    List,
    /// Add an ingredient
    Add {
        name: String,
        #[arg(default_value_t = 1)]
        amount: u32,
    },
    /// Replace the ingredient at INDEX
    Edit {
        index: usize,
        name: String,
        amount: u32,
    },
    /// Delete the ingredient at INDEX
    Delete { index: usize },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum RecipesCommand {
    /// List local recipes
    List,
    /// Replace local recipes with the remote ones
    Fetch,
    /// Upload local recipes
    Save,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum AuthCommand {
    /// Sign in with email and password
    Login(CredentialsArgs),
    /// Create an account and sign in
    Signup(CredentialsArgs),
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Status,
}

#[derive(Parser, Debug, PartialEq, Eq)]
pub struct CredentialsArgs {
    pub email: String,

    #[arg(long)]
    pub password: String,
}
