//! Tolerant construction of a store from a persisted dataset.
//!
//! Loading never fails. Records that would break a store invariant are
//! skipped and reported; dangling foreign keys are kept (they are legal in
//! this model) and reported for information only.

use super::Store;
use crate::domain::{Dataset, DepartmentId, EntityId, EntityKind, EntityRef, Record, TaskId};
use crate::id_generation::IdGenerator;
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

/// Non-fatal problems found while loading a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A second record reused an id within its collection
    ///
    /// **Effect**: the later record is skipped; the first one wins.
    DuplicateId {
        /// Kind of the collection
        kind: EntityKind,
        /// The repeated raw id
        id: u64,
    },

    /// A dependency linked a task to itself
    ///
    /// **Effect**: the dependency is skipped.
    SelfDependency {
        /// Raw id of the skipped dependency
        id: u64,
        /// The task on both ends
        task: TaskId,
    },

    /// A record references a department or task that is not in the dataset
    ///
    /// **Effect**: none; the record is kept and displays a fallback label.
    OrphanedReference {
        /// The record holding the reference
        holder: EntityRef,
        /// The missing target
        missing: EntityRef,
    },
}

impl LoadWarning {
    /// Whether the warning caused data to be dropped.
    pub fn is_lossy(&self) -> bool {
        !matches!(self, Self::OrphanedReference { .. })
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { kind, id } => write!(f, "skipped duplicate {kind} id {id}"),
            Self::SelfDependency { id, task } => {
                write!(f, "skipped dependency {id} linking task {task} to itself")
            }
            Self::OrphanedReference { holder, missing } => {
                write!(f, "{holder} references missing {missing}")
            }
        }
    }
}

fn dedupe<R: Record>(
    rows: Vec<R>,
    ids: &mut IdGenerator,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<R> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            let id = row.id();
            if seen.insert(id) {
                ids.register_id(id.raw());
                true
            } else {
                warnings.push(LoadWarning::DuplicateId {
                    kind: R::KIND,
                    id: id.raw(),
                });
                false
            }
        })
        .collect()
}

impl Store {
    /// Build a store from a dataset, returning the store and any warnings.
    ///
    /// Collection order is preserved. The id counter resumes after the
    /// largest id present in any collection.
    pub fn load(data: Dataset) -> (Self, Vec<LoadWarning>) {
        let mut ids = IdGenerator::new();
        let mut warnings = Vec::new();

        let departments = dedupe(data.departments, &mut ids, &mut warnings);
        let users = dedupe(data.users, &mut ids, &mut warnings);
        let tasks = dedupe(data.tasks, &mut ids, &mut warnings);
        let dependencies: Vec<_> = dedupe(data.dependencies, &mut ids, &mut warnings)
            .into_iter()
            .filter(|dep| {
                if dep.from_task_id == dep.to_task_id {
                    warnings.push(LoadWarning::SelfDependency {
                        id: dep.id.0,
                        task: dep.from_task_id,
                    });
                    false
                } else {
                    true
                }
            })
            .collect();

        let department_ids: HashSet<DepartmentId> = departments.iter().map(|d| d.id).collect();
        let task_ids: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();

        for user in &users {
            if !department_ids.contains(&user.department_id) {
                warnings.push(LoadWarning::OrphanedReference {
                    holder: EntityRef::User(user.id),
                    missing: EntityRef::Department(user.department_id),
                });
            }
        }
        for task in &tasks {
            if !department_ids.contains(&task.department_id) {
                warnings.push(LoadWarning::OrphanedReference {
                    holder: EntityRef::Task(task.id),
                    missing: EntityRef::Department(task.department_id),
                });
            }
        }
        for dep in &dependencies {
            for endpoint in [dep.from_task_id, dep.to_task_id] {
                if !task_ids.contains(&endpoint) {
                    warnings.push(LoadWarning::OrphanedReference {
                        holder: EntityRef::Dependency(dep.id),
                        missing: EntityRef::Task(endpoint),
                    });
                }
            }
        }

        for warning in &warnings {
            if warning.is_lossy() {
                warn!(%warning, "Dataset load warning");
            }
        }

        let data = Dataset {
            departments,
            users,
            tasks,
            dependencies,
        };
        info!(
            records = data.len(),
            warnings = warnings.len(),
            "Loaded dataset"
        );

        (Self::with_parts(data, ids), warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, DependencyId, LinkType, Task};

    #[test]
    fn test_sample_loads_cleanly() {
        let (store, warnings) = Store::load(Dataset::sample());
        assert!(warnings.is_empty());
        assert_eq!(store.tasks().len(), 2);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut data = Dataset::sample();
        data.tasks.push(Task {
            id: TaskId(1),
            name: "Shadow".to_string(),
            department_id: DepartmentId(1),
        });

        let (store, warnings) = Store::load(data);

        assert_eq!(store.tasks().len(), 2);
        assert_eq!(store.tasks()[0].name, "Task 1");
        assert_eq!(
            warnings,
            vec![LoadWarning::DuplicateId {
                kind: EntityKind::Task,
                id: 1
            }]
        );
    }

    #[test]
    fn test_self_dependency_skipped_and_orphans_kept() {
        let mut data = Dataset::sample();
        data.dependencies.push(Dependency {
            id: DependencyId(2),
            from_task_id: TaskId(2),
            to_task_id: TaskId(2),
            link_type: LinkType::Related,
        });
        data.dependencies.push(Dependency {
            id: DependencyId(3),
            from_task_id: TaskId(1),
            to_task_id: TaskId(99),
            link_type: LinkType::Requires,
        });

        let (store, warnings) = Store::load(data);

        assert_eq!(store.dependencies().len(), 2);
        assert!(warnings.contains(&LoadWarning::SelfDependency {
            id: 2,
            task: TaskId(2)
        }));
        assert!(warnings.contains(&LoadWarning::OrphanedReference {
            holder: EntityRef::Dependency(DependencyId(3)),
            missing: EntityRef::Task(TaskId(99)),
        }));
    }

    #[test]
    fn test_counter_resumes_after_largest_id() {
        let mut data = Dataset::sample();
        data.tasks[1].id = TaskId(500);
        let (mut store, _) = Store::load(data);

        let id = store.add::<Task>(crate::domain::NewTask::default()).unwrap();
        assert_eq!(id, TaskId(501));
    }
}
