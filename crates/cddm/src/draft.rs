//! Detached edit drafts for the record-editing surface.
//!
//! A [`Draft`] is a copy of one record's editable fields, taken when editing
//! starts. It can be changed freely without touching the store; nothing is
//! written until [`Draft::commit`], which applies every field as one atomic
//! update. Abandoning an edit is just dropping the draft.

use crate::domain::{
    DepartmentId, DepartmentUpdate, DependencyId, DependencyUpdate, Entity, EntityKind, EntityRef,
    LinkType, TaskId, TaskUpdate, UserId, UserUpdate,
};
use crate::error::{Error, Result};
use crate::store::Store;
use serde::Serialize;

/// Editable fields of one record, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Draft {
    /// Editing a department
    Department {
        /// Record being edited
        id: DepartmentId,
        /// Name; must be non-empty at commit
        name: String,
    },
    /// Editing a user
    User {
        /// Record being edited
        id: UserId,
        /// Display name
        name: String,
        /// Department reference, not checked
        department_id: DepartmentId,
    },
    /// Editing a task
    Task {
        /// Record being edited
        id: TaskId,
        /// Display name
        name: String,
        /// Department reference, not checked
        department_id: DepartmentId,
    },
    /// Editing a dependency
    Dependency {
        /// Record being edited
        id: DependencyId,
        /// Source task; must differ from `to_task_id` at commit
        from_task_id: TaskId,
        /// Target task
        to_task_id: TaskId,
        /// Link type
        link_type: LinkType,
    },
}

/// Field edits gathered from a form or the command line.
#[derive(Debug, Clone, Default)]
pub struct DraftEdits {
    /// New name (departments, users, tasks)
    pub name: Option<String>,
    /// New department (users, tasks)
    pub department_id: Option<DepartmentId>,
    /// New source task (dependencies)
    pub from_task_id: Option<TaskId>,
    /// New target task (dependencies)
    pub to_task_id: Option<TaskId>,
    /// New link type (dependencies)
    pub link_type: Option<LinkType>,
}

impl DraftEdits {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.department_id.is_none()
            && self.from_task_id.is_none()
            && self.to_task_id.is_none()
            && self.link_type.is_none()
    }
}

fn not_editable(field: &str, kind: EntityKind) -> Error {
    Error::Validation(format!("{field} cannot be set on a {kind}"))
}

impl Draft {
    /// Start editing the record `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the record doesn't exist.
    pub fn load(store: &Store, target: EntityRef) -> Result<Self> {
        let entity = store
            .entity(target)
            .ok_or_else(|| Error::not_found(target.kind(), target.raw_id()))?;

        Ok(match entity {
            Entity::Department(d) => Self::Department {
                id: d.id,
                name: d.name,
            },
            Entity::User(u) => Self::User {
                id: u.id,
                name: u.name,
                department_id: u.department_id,
            },
            Entity::Task(t) => Self::Task {
                id: t.id,
                name: t.name,
                department_id: t.department_id,
            },
            Entity::Dependency(d) => Self::Dependency {
                id: d.id,
                from_task_id: d.from_task_id,
                to_task_id: d.to_task_id,
                link_type: d.link_type,
            },
        })
    }

    /// The record being edited.
    pub fn target(&self) -> EntityRef {
        match self {
            Self::Department { id, .. } => EntityRef::Department(*id),
            Self::User { id, .. } => EntityRef::User(*id),
            Self::Task { id, .. } => EntityRef::Task(*id),
            Self::Dependency { id, .. } => EntityRef::Dependency(*id),
        }
    }

    /// Apply field edits to the draft.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if an edit names a field this kind does
    /// not have. The draft is left unchanged in that case.
    pub fn apply(&mut self, edits: DraftEdits) -> Result<()> {
        let kind = self.target().kind();
        match self {
            Self::Department { name, .. } => {
                if edits.department_id.is_some() {
                    return Err(not_editable("department", kind));
                }
                reject_link_fields(&edits, kind)?;
                if let Some(new_name) = edits.name {
                    *name = new_name;
                }
            }
            Self::User {
                name,
                department_id,
                ..
            }
            | Self::Task {
                name,
                department_id,
                ..
            } => {
                reject_link_fields(&edits, kind)?;
                if let Some(new_name) = edits.name {
                    *name = new_name;
                }
                if let Some(dept) = edits.department_id {
                    *department_id = dept;
                }
            }
            Self::Dependency {
                from_task_id,
                to_task_id,
                link_type,
                ..
            } => {
                if edits.name.is_some() {
                    return Err(not_editable("name", kind));
                }
                if edits.department_id.is_some() {
                    return Err(not_editable("department", kind));
                }
                if let Some(from) = edits.from_task_id {
                    *from_task_id = from;
                }
                if let Some(to) = edits.to_task_id {
                    *to_task_id = to;
                }
                if let Some(link) = edits.link_type {
                    *link_type = link;
                }
            }
        }
        Ok(())
    }

    /// Write the draft back to the store in a single update.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the record was removed while being edited
    /// - `Error::InvalidReference` if a dependency would link a task to itself
    /// - `Error::Validation` if a department name is empty
    pub fn commit(self, store: &mut Store) -> Result<Entity> {
        Ok(match self {
            Self::Department { id, name } => store
                .update(id, DepartmentUpdate { name: Some(name) })?
                .into(),
            Self::User {
                id,
                name,
                department_id,
            } => store
                .update(
                    id,
                    UserUpdate {
                        name: Some(name),
                        department_id: Some(department_id),
                    },
                )?
                .into(),
            Self::Task {
                id,
                name,
                department_id,
            } => store
                .update(
                    id,
                    TaskUpdate {
                        name: Some(name),
                        department_id: Some(department_id),
                    },
                )?
                .into(),
            Self::Dependency {
                id,
                from_task_id,
                to_task_id,
                link_type,
            } => store
                .update(
                    id,
                    DependencyUpdate {
                        from_task_id: Some(from_task_id),
                        to_task_id: Some(to_task_id),
                        link_type: Some(link_type),
                    },
                )?
                .into(),
        })
    }
}

fn reject_link_fields(edits: &DraftEdits, kind: EntityKind) -> Result<()> {
    if edits.from_task_id.is_some() {
        return Err(not_editable("from", kind));
    }
    if edits.to_task_id.is_some() {
        return Err(not_editable("to", kind));
    }
    if edits.link_type.is_some() {
        return Err(not_editable("link", kind));
    }
    Ok(())
}

/// One option in a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    /// Raw id of the record
    pub id: u64,
    /// Text shown for it
    pub label: String,
}

/// Existing departments, in display order.
pub fn department_choices(store: &Store) -> Vec<Choice> {
    store
        .departments()
        .iter()
        .map(|d| Choice {
            id: d.id.0,
            label: d.name.clone(),
        })
        .collect()
}

/// Existing tasks, in display order.
pub fn task_choices(store: &Store) -> Vec<Choice> {
    store
        .tasks()
        .iter()
        .map(|t| Choice {
            id: t.id.0,
            label: t.name.clone(),
        })
        .collect()
}

/// Tasks a dependency from `from` may point to.
pub fn to_task_choices(store: &Store, from: TaskId) -> Vec<Choice> {
    task_choices(store)
        .into_iter()
        .filter(|c| c.id != from.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, NewTask, Task};

    fn sample() -> Store {
        Store::load(Dataset::sample()).0
    }

    #[test]
    fn test_edits_stay_detached_until_commit() {
        let mut store = sample();
        let mut draft = Draft::load(&store, EntityRef::Task(TaskId(1))).unwrap();
        draft
            .apply(DraftEdits {
                name: Some("Renamed".to_string()),
                department_id: Some(DepartmentId(2)),
                ..DraftEdits::default()
            })
            .unwrap();

        assert_eq!(store.get(TaskId(1)).unwrap().name, "Task 1");

        draft.commit(&mut store).unwrap();
        let task = store.get(TaskId(1)).unwrap();
        assert_eq!(task.name, "Renamed");
        assert_eq!(task.department_id, DepartmentId(2));
    }

    #[test]
    fn test_self_loop_commit_leaves_record_untouched() {
        let mut store = sample();
        let mut draft = Draft::load(&store, EntityRef::Dependency(DependencyId(1))).unwrap();
        draft
            .apply(DraftEdits {
                to_task_id: Some(TaskId(1)),
                link_type: Some(LinkType::Related),
                ..DraftEdits::default()
            })
            .unwrap();

        let result = draft.commit(&mut store);

        assert!(matches!(result, Err(Error::InvalidReference(_))));
        let dep = store.get(DependencyId(1)).unwrap();
        assert_eq!(dep.to_task_id, TaskId(2));
        assert_eq!(dep.link_type, LinkType::Blocks);
    }

    #[test]
    fn test_commit_after_removal_is_not_found() {
        let mut store = sample();
        let draft = Draft::load(&store, EntityRef::User(UserId(1))).unwrap();
        store.remove(UserId(1)).unwrap();

        assert!(matches!(draft.commit(&mut store), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_apply_rejects_foreign_fields() {
        let store = sample();
        let mut draft = Draft::load(&store, EntityRef::Department(DepartmentId(1))).unwrap();
        let before = draft.clone();

        let result = draft.apply(DraftEdits {
            name: Some("Ops".to_string()),
            link_type: Some(LinkType::Requires),
            ..DraftEdits::default()
        });

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_to_choices_exclude_from() {
        let mut store = sample();
        store.add::<Task>(NewTask::named("Third")).unwrap();

        let labels: Vec<_> = to_task_choices(&store, TaskId(1))
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["Task 2", "Third"]);
        assert_eq!(department_choices(&store).len(), 2);
    }
}
