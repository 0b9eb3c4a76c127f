//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{EntityKind, LinkType};

/// Record kind for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKindArg {
    /// A department
    #[value(alias = "dept")]
    Department,
    /// A user
    User,
    /// A task (graph node)
    Task,
    /// A dependency between tasks (graph edge)
    #[value(alias = "dep")]
    Dependency,
}

impl std::fmt::Display for EntityKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", EntityKind::from(*self))
    }
}

/// Dependency link type for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTypeArg {
    /// Hard blocker
    Blocks,
    /// Prerequisite
    Requires,
    /// Informational link
    Related,
}

impl std::fmt::Display for LinkTypeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(LinkType::from(*self).as_str())
    }
}

// ============================================================================
// Type Conversions
// ============================================================================

impl From<EntityKindArg> for EntityKind {
    fn from(arg: EntityKindArg) -> Self {
        match arg {
            EntityKindArg::Department => EntityKind::Department,
            EntityKindArg::User => EntityKind::User,
            EntityKindArg::Task => EntityKind::Task,
            EntityKindArg::Dependency => EntityKind::Dependency,
        }
    }
}

impl From<LinkTypeArg> for LinkType {
    fn from(arg: LinkTypeArg) -> Self {
        match arg {
            LinkTypeArg::Blocks => LinkType::Blocks,
            LinkTypeArg::Requires => LinkType::Requires,
            LinkTypeArg::Related => LinkType::Related,
        }
    }
}
