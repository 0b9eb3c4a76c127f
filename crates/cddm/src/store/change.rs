//! Change notifications emitted by store mutations.

use crate::domain::{EntityKind, EntityRef};
use serde::Serialize;

/// A single successful mutation of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "change", content = "target", rename_all = "lowercase")]
pub enum Change {
    /// A record was appended
    Added(EntityRef),

    /// A record's fields were replaced by a committed patch
    Updated(EntityRef),

    /// A record was deleted
    Removed(EntityRef),
}

impl Change {
    /// The record the change applies to.
    pub fn target(self) -> EntityRef {
        match self {
            Self::Added(target) | Self::Updated(target) | Self::Removed(target) => target,
        }
    }

    /// Kind of the changed record.
    pub fn kind(self) -> EntityKind {
        self.target().kind()
    }

    /// Whether the task collection changed, which invalidates graph layout.
    pub fn touches_tasks(self) -> bool {
        self.kind() == EntityKind::Task
    }
}
