//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a new cddm repository
//! - `info`: Show repository information
//! - `login`: Sign in with the authentication stub
//! - `add` / `list` / `show` / `update` / `remove`: Manage records
//! - `graph`: Derive the dependency graph view, optionally as SVG
//! - `move`: Pin a task node to a canvas coordinate
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! cddm init --sample --company "Acme Corp"
//! cddm add task --name "Write docs" --department 1
//! cddm add dependency --from 1 --to 3 --link requires
//! cddm graph --select 1 --output graph.svg
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    AddArgs, GraphArgs, InfoArgs, InitArgs, ListArgs, LoginArgs, MoveArgs, RecordFields,
    RemoveArgs, ShowArgs, UpdateArgs,
};
pub use types::{EntityKindArg, LinkTypeArg};
pub use validators::{validate_company_name, validate_coordinate, validate_name};

/// CDDM - company departments and task dependency maps
///
/// Keep departments, users, tasks and the dependencies between tasks in
/// `.cddm/data.json`, and lay the tasks out as a dependency graph.
#[derive(Parser, Debug)]
#[command(name = "cddm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new cddm repository
    ///
    /// Creates the `.cddm/` directory with configuration and a dataset
    /// document. Use `--sample` to start from the demo dataset.
    Init(InitArgs),

    /// Show repository information
    ///
    /// Displays the company name, storage backend, record counts and any
    /// problems found while loading the dataset.
    Info(InfoArgs),

    /// Sign in
    ///
    /// Any non-empty username and password are accepted after a short delay.
    Login(LoginArgs),

    /// Add a record
    ///
    /// Unset fields take defaults: placeholder names, the first department,
    /// and for dependencies the first two distinct tasks linked by `blocks`.
    Add(AddArgs),

    /// List records, optionally of one kind
    List(ListArgs),

    /// Show one record with its references resolved
    Show(ShowArgs),

    /// Update a record
    ///
    /// All given fields are applied together or not at all.
    Update(UpdateArgs),

    /// Remove a record
    ///
    /// Nothing cascades: records referring to it keep the dangling id.
    Remove(RemoveArgs),

    /// Show the dependency graph
    ///
    /// Prints node positions, dependencies and the selection detail, or
    /// writes an SVG document with `--output`.
    Graph(GraphArgs),

    /// Move a task node to a canvas coordinate
    ///
    /// The position is kept across later edits and saved with the layout.
    Move(MoveArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args, output_mode).await,
            Some(Commands::Login(args)) => execute::execute_login(args, output_mode).await,
            Some(Commands::Info(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_info(&app, args, output_mode).await
            }
            Some(Commands::Add(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_add(&mut app, args, output_mode).await
            }
            Some(Commands::List(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_list(&app, args, output_mode).await
            }
            Some(Commands::Show(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_show(&app, args, output_mode).await
            }
            Some(Commands::Update(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_update(&mut app, args, output_mode).await
            }
            Some(Commands::Remove(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_remove(&mut app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_graph(&mut app, args, output_mode).await
            }
            Some(Commands::Move(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_move(&mut app, args, output_mode).await
            }
            None => {
                println!("CDDM dependency mapping");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
