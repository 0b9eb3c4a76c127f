//! The entity store: single authoritative owner of all four collections.
//!
//! # Shape
//!
//! Every kind gets the same four operations, selected by type:
//!
//! - `add::<K>(fields)` merges fields over the kind's defaults and appends
//! - `get(id)` looks a record up; absence is an ordinary outcome
//! - `update(id, patch)` merges a patch atomically
//! - `remove(id)` deletes outright
//!
//! The id newtype (`TaskId`, `UserId`, ...) picks the collection, so a task
//! id can never address a user.
//!
//! # Tolerant foreign keys
//!
//! Removing a department leaves its users and tasks pointing at it; removing
//! a task leaves dependencies pointing at it. Nothing cascades. Lookup
//! helpers such as [`Store::department_name`] and [`Store::task_name`]
//! resolve dangling references to fallback labels instead of failing. The
//! only reference rule enforced here is that a dependency cannot link a task
//! to itself.
//!
//! # Change notifications
//!
//! Each successful mutation appends a [`Change`] and bumps
//! [`Store::revision`]. Owners drain them with [`Store::drain_changes`] to
//! keep derived state (the graph layout) in step.
//!
//! # Example
//!
//! ```
//! use cddm::domain::{NewTask, Task, TaskUpdate};
//! use cddm::store::Store;
//!
//! let mut store = Store::new();
//! let id = store.add::<Task>(NewTask::named("Write docs")).unwrap();
//!
//! store
//!     .update(id, TaskUpdate { name: Some("Write more docs".into()), ..Default::default() })
//!     .unwrap();
//! assert_eq!(store.get(id).unwrap().name, "Write more docs");
//!
//! store.remove(id).unwrap();
//! assert!(store.get(id).is_none());
//! ```

mod change;
mod load;

pub use change::Change;
pub use load::LoadWarning;

use crate::domain::{
    Dataset, Department, DepartmentId, Dependency, Entity, EntityId, EntityRef, Record, Task,
    TaskId, User,
};
use crate::error::{Error, Result};
use crate::id_generation::IdGenerator;
use std::borrow::Cow;
use tracing::debug;

/// Display value for a department that cannot be resolved.
pub const MISSING_DEPARTMENT_LABEL: &str = "—";

/// Display value for a department with no members.
pub const NO_MEMBERS_LABEL: &str = "None";

/// In-memory entity store.
#[derive(Debug, Default)]
pub struct Store {
    /// The four collections, in display order
    data: Dataset,

    /// Id source shared by all kinds
    id_generator: IdGenerator,

    /// Mutations not yet drained by the owner
    changes: Vec<Change>,

    /// Count of successful mutations since construction
    revision: u64,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_parts(data: Dataset, id_generator: IdGenerator) -> Self {
        Self {
            data,
            id_generator,
            changes: Vec::new(),
            revision: 0,
        }
    }

    // ========== CRUD ==========

    /// Create a record of kind `R` and return its fresh id.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidReference` for a dependency whose endpoints resolve to
    ///   the same task, or when no second task exists to default to
    /// - `Error::Storage` if the id space is exhausted
    pub fn add<R: Record>(&mut self, fields: R::Fields) -> Result<R::Id> {
        let raw = self
            .id_generator
            .generate()
            .map_err(|e| Error::Storage(format!("ID generation failed: {e}")))?;
        let id = <R::Id as EntityId>::from_raw(raw);

        let record = R::seed(id, fields, &self.data)?;
        R::rows_mut(&mut self.data).push(record);

        debug!(kind = %R::KIND, %id, "Added record");
        self.record(Change::Added(id.to_ref()));
        Ok(id)
    }

    /// Look a record up by id.
    pub fn get<I: EntityId>(&self, id: I) -> Option<&I::Record> {
        <I::Record as Record>::rows(&self.data).iter().find(|r| r.id() == id)
    }

    /// Whether a record with this id exists.
    pub fn contains<I: EntityId>(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Merge `patch` over an existing record and return the result.
    ///
    /// The patch is applied all-or-nothing. Foreign keys are not checked;
    /// the editing surface only offers existing records.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the record doesn't exist
    /// - `Error::InvalidReference` if a dependency would link a task to itself
    /// - `Error::Validation` if a department name would become empty
    pub fn update<I: EntityId>(
        &mut self,
        id: I,
        patch: <I::Record as Record>::Patch,
    ) -> Result<I::Record> {
        let record = <I::Record as Record>::rows_mut(&mut self.data)
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Error::not_found(<I::Record as Record>::KIND, id.raw()))?;

        record.merge(patch)?;
        let updated = record.clone();

        let kind = <I::Record as Record>::KIND;
        debug!(%kind, %id, "Updated record");
        self.record(Change::Updated(id.to_ref()));
        Ok(updated)
    }

    /// Delete a record and return it. Nothing else is touched.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the record doesn't exist.
    pub fn remove<I: EntityId>(&mut self, id: I) -> Result<I::Record> {
        let rows = <I::Record as Record>::rows_mut(&mut self.data);
        let index = rows
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| Error::not_found(<I::Record as Record>::KIND, id.raw()))?;
        let removed = rows.remove(index);

        match id.to_ref() {
            EntityRef::Department(dept) => debug!(
                %id,
                orphaned_users = self.users_of_department(dept).len(),
                orphaned_tasks = self.data.tasks.iter().filter(|t| t.department_id == dept).count(),
                "Removed department"
            ),
            EntityRef::Task(task) => debug!(
                %id,
                orphaned_dependencies = self.dependencies_of_task(task).len(),
                "Removed task"
            ),
            other => debug!(target_ref = %other, "Removed record"),
        }

        self.record(Change::Removed(id.to_ref()));
        Ok(removed)
    }

    /// Look up a record of any kind.
    pub fn entity(&self, target: EntityRef) -> Option<Entity> {
        match target {
            EntityRef::Department(id) => self.get(id).cloned().map(Entity::from),
            EntityRef::User(id) => self.get(id).cloned().map(Entity::from),
            EntityRef::Task(id) => self.get(id).cloned().map(Entity::from),
            EntityRef::Dependency(id) => self.get(id).cloned().map(Entity::from),
        }
    }

    /// Delete a record of any kind.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the record doesn't exist.
    pub fn remove_entity(&mut self, target: EntityRef) -> Result<Entity> {
        Ok(match target {
            EntityRef::Department(id) => self.remove(id)?.into(),
            EntityRef::User(id) => self.remove(id)?.into(),
            EntityRef::Task(id) => self.remove(id)?.into(),
            EntityRef::Dependency(id) => self.remove(id)?.into(),
        })
    }

    // ========== Collections ==========

    /// Departments in display order.
    pub fn departments(&self) -> &[Department] {
        &self.data.departments
    }

    /// Users in display order.
    pub fn users(&self) -> &[User] {
        &self.data.users
    }

    /// Tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    /// Dependencies in display order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.data.dependencies
    }

    /// Read-only view of all four collections.
    pub fn snapshot(&self) -> &Dataset {
        &self.data
    }

    // ========== Queries ==========

    /// Users whose department is `dept`, in display order.
    pub fn users_of_department(&self, dept: DepartmentId) -> Vec<&User> {
        self.data
            .users
            .iter()
            .filter(|u| u.department_id == dept)
            .collect()
    }

    /// Dependencies with `task` at either endpoint, in display order.
    pub fn dependencies_of_task(&self, task: TaskId) -> Vec<&Dependency> {
        self.data
            .dependencies
            .iter()
            .filter(|d| d.touches(task))
            .collect()
    }

    /// Ordinal position of a department in the department collection.
    pub fn department_index(&self, dept: DepartmentId) -> Option<usize> {
        self.data.departments.iter().position(|d| d.id == dept)
    }

    /// Colour index of a task: the ordinal of its department.
    ///
    /// `None` when the task or its department is missing. Reordering
    /// departments changes the result.
    pub fn color_index_for_task(&self, task: TaskId) -> Option<usize> {
        let task = self.get(task)?;
        self.department_index(task.department_id)
    }

    /// Department name, or `—` if it no longer exists.
    pub fn department_name(&self, dept: DepartmentId) -> &str {
        self.get(dept)
            .map_or(MISSING_DEPARTMENT_LABEL, |d| d.name.as_str())
    }

    /// Task name, or `Task {id}` if it no longer exists.
    pub fn task_name(&self, task: TaskId) -> Cow<'_, str> {
        match self.get(task) {
            Some(t) => Cow::Borrowed(t.name.as_str()),
            None => Cow::Owned(format!("Task {task}")),
        }
    }

    /// Comma-separated member names of a department, or `None`.
    pub fn member_names(&self, dept: DepartmentId) -> String {
        let names: Vec<&str> = self
            .users_of_department(dept)
            .into_iter()
            .map(|u| u.name.as_str())
            .collect();
        if names.is_empty() {
            NO_MEMBERS_LABEL.to_string()
        } else {
            names.join(", ")
        }
    }

    // ========== Change tracking ==========

    fn record(&mut self, change: Change) {
        self.revision += 1;
        self.changes.push(change);
    }

    /// Number of successful mutations so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether mutations are waiting to be drained.
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Take all pending change notifications, oldest first.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }
}
