//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{Args, Parser};
use std::path::PathBuf;

use super::types::{EntityKindArg, LinkTypeArg};
use super::validators::{validate_company_name, validate_coordinate, validate_name};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Company name shown in the UI chrome and graph exports
    ///
    /// 1-60 characters. Defaults to "Editable Company Name".
    #[arg(short, long, value_parser = validate_company_name)]
    pub company: Option<String>,

    /// Seed the demo dataset (two departments, users and tasks, one dependency)
    #[arg(long)]
    pub sample: bool,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

/// Arguments for the `login` command
#[derive(Parser, Debug, Clone)]
pub struct LoginArgs {
    /// Username, shown as the display name once signed in
    #[arg(short, long, default_value = "")]
    pub username: String,

    /// Password (any non-empty value is accepted)
    #[arg(short, long, default_value = "")]
    pub password: String,
}

/// Field flags shared by `add` and `update`.
#[derive(Args, Debug, Clone, Default)]
pub struct RecordFields {
    /// Record name (departments, users, tasks)
    #[arg(short, long, value_parser = validate_name)]
    pub name: Option<String>,

    /// Owning department id (users, tasks)
    #[arg(short, long)]
    pub department: Option<u64>,

    /// Source task id (dependencies)
    #[arg(long)]
    pub from: Option<u64>,

    /// Target task id (dependencies)
    #[arg(long)]
    pub to: Option<u64>,

    /// Link type (dependencies)
    #[arg(short, long, value_enum)]
    pub link: Option<LinkTypeArg>,
}

/// Arguments for the `add` command
#[derive(Parser, Debug, Clone)]
pub struct AddArgs {
    /// Kind of record to add
    #[arg(value_enum)]
    pub kind: EntityKindArg,

    #[command(flatten)]
    pub fields: RecordFields,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Only list this kind (default: all four)
    #[arg(value_enum)]
    pub kind: Option<EntityKindArg>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Kind of record
    #[arg(value_enum)]
    pub kind: EntityKindArg,

    /// Record id
    pub id: u64,
}

/// Arguments for the `update` command
#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Kind of record
    #[arg(value_enum)]
    pub kind: EntityKindArg,

    /// Record id
    pub id: u64,

    #[command(flatten)]
    pub fields: RecordFields,
}

/// Arguments for the `remove` command
#[derive(Parser, Debug, Clone)]
pub struct RemoveArgs {
    /// Kind of record
    #[arg(value_enum)]
    pub kind: EntityKindArg,

    /// Record id
    pub id: u64,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Select a task before deriving the view
    #[arg(short, long)]
    pub select: Option<u64>,

    /// Write an SVG document instead of printing the view
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `move` command
#[derive(Parser, Debug, Clone)]
pub struct MoveArgs {
    /// Task id
    pub task: u64,

    /// Horizontal canvas coordinate
    #[arg(allow_negative_numbers = true, value_parser = validate_coordinate)]
    pub x: f64,

    /// Vertical canvas coordinate
    #[arg(allow_negative_numbers = true, value_parser = validate_coordinate)]
    pub y: f64,
}
