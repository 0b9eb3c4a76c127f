//! Integration tests for the entity store.
//!
//! Covers the uniform CRUD surface across all four kinds, tolerant foreign
//! keys, creation defaults and change notifications.

use cddm::domain::{
    Department, DepartmentId, DepartmentUpdate, Dependency, DependencyId, DependencyUpdate,
    EntityKind, EntityRef, LinkType, NewDepartment, NewDependency, NewTask, NewUser, Task, TaskId,
    TaskUpdate, User, UserId, FALLBACK_DEPARTMENT_ID,
};
use cddm::error::Error;
use cddm::store::{Change, Store, MISSING_DEPARTMENT_LABEL};
use rstest::rstest;

mod common;
use common::sample_store;

// ========== CRUD ==========

#[test]
fn test_get_after_add_returns_merged_record() {
    let mut store = sample_store();

    let dept = store.add::<Department>(NewDepartment::named("Ops")).unwrap();
    let user = store
        .add::<User>(NewUser::named("Grace").in_department(dept))
        .unwrap();
    let task = store.add::<Task>(NewTask::named("Audit")).unwrap();

    assert_eq!(store.get(dept).unwrap().name, "Ops");
    assert_eq!(store.get(user).unwrap().department_id, dept);
    let task = store.get(task).unwrap();
    assert_eq!(task.name, "Audit");
    assert_eq!(task.department_id, DepartmentId(1));
}

#[test]
fn test_get_after_remove_is_none() {
    let mut store = sample_store();

    let removed = store.remove(UserId(2)).unwrap();

    assert_eq!(removed.name, "User 2");
    assert!(store.get(UserId(2)).is_none());
    assert!(matches!(
        store.remove(UserId(2)),
        Err(Error::NotFound {
            kind: EntityKind::User,
            id: 2
        })
    ));
}

#[test]
fn test_ids_are_unique_across_rapid_adds() {
    let mut store = Store::new();
    let ids: Vec<DepartmentId> = (0..100)
        .map(|_| store.add::<Department>(NewDepartment::default()).unwrap())
        .collect();

    let mut sorted = ids.clone();
    sorted.dedup();
    assert_eq!(sorted.len(), 100);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_update_missing_record_is_not_found() {
    let mut store = sample_store();
    let result = store.update(TaskId(42), TaskUpdate::default());
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[test]
fn test_empty_department_name_is_rejected() {
    let mut store = sample_store();
    let result = store.update(
        DepartmentId(1),
        DepartmentUpdate {
            name: Some("   ".to_string()),
        },
    );
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(store.get(DepartmentId(1)).unwrap().name, "Dept 1");
}

// ========== Self-loop rule ==========

#[rstest]
#[case(LinkType::Blocks)]
#[case(LinkType::Requires)]
#[case(LinkType::Related)]
fn test_self_dependency_always_invalid(#[case] link: LinkType) {
    let mut store = sample_store();

    let added = store.add::<Dependency>(NewDependency::link(TaskId(2), TaskId(2), link));
    assert!(matches!(added, Err(Error::InvalidReference(_))));

    let updated = store.update(
        DependencyId(1),
        DependencyUpdate {
            to_task_id: Some(TaskId(1)),
            link_type: Some(link),
            ..DependencyUpdate::default()
        },
    );
    assert!(matches!(updated, Err(Error::InvalidReference(_))));
    assert_eq!(store.get(DependencyId(1)).unwrap().link_type, LinkType::Blocks);
}

#[test]
fn test_dependency_defaults_need_two_tasks() {
    let mut store = Store::new();
    store.add::<Task>(NewTask::named("Only")).unwrap();

    let result = store.add::<Dependency>(NewDependency::default());
    assert!(matches!(result, Err(Error::InvalidReference(_))));

    let second = store.add::<Task>(NewTask::named("Second")).unwrap();
    let id = store.add::<Dependency>(NewDependency::default()).unwrap();
    let dep = store.get(id).unwrap();
    assert_eq!(dep.to_task_id, second);
    assert_eq!(dep.link_type, LinkType::Blocks);
}

// ========== Tolerant foreign keys ==========

#[test]
fn test_removing_department_leaves_members_intact() {
    let mut store = sample_store();
    store.add::<User>(NewUser::named("Extra").in_department(DepartmentId(1))).unwrap();

    store.remove(DepartmentId(1)).unwrap();

    let orphans: Vec<&User> = store
        .users()
        .iter()
        .filter(|u| u.department_id == DepartmentId(1))
        .collect();
    assert_eq!(orphans.len(), 2);
    assert_eq!(store.get(TaskId(1)).unwrap().department_id, DepartmentId(1));
    assert_eq!(store.department_name(DepartmentId(1)), MISSING_DEPARTMENT_LABEL);
}

#[test]
fn test_removing_task_leaves_dependency() {
    let mut store = sample_store();

    store.remove(TaskId(1)).unwrap();

    let dep = store.get(DependencyId(1)).unwrap();
    assert_eq!(dep.from_task_id, TaskId(1));
    assert_eq!(store.task_name(TaskId(1)), "Task 1");
    assert_eq!(store.dependencies_of_task(TaskId(1)).len(), 1);
}

#[test]
fn test_member_names() {
    let mut store = sample_store();
    assert_eq!(store.member_names(DepartmentId(1)), "User 1");

    store.remove(UserId(1)).unwrap();
    assert_eq!(store.member_names(DepartmentId(1)), "None");
}

// ========== Default department ==========

#[test]
fn test_new_task_defaults_to_first_department() {
    let mut store = sample_store();
    store.remove(DepartmentId(1)).unwrap();

    let id = store.add::<Task>(NewTask::named("New Task")).unwrap();

    assert_eq!(store.get(id).unwrap().department_id, DepartmentId(2));
}

#[test]
fn test_new_task_without_departments_uses_fallback_id() {
    let mut store = Store::new();

    let id = store.add::<Task>(NewTask::default()).unwrap();

    let task = store.get(id).unwrap();
    assert_eq!(task.name, "New Task");
    assert_eq!(task.department_id, FALLBACK_DEPARTMENT_ID);
}

// ========== Change notifications ==========

#[test]
fn test_changes_are_recorded_in_order() {
    let mut store = sample_store();
    let start = store.revision();

    let task = store.add::<Task>(NewTask::named("T")).unwrap();
    store
        .update(
            task,
            TaskUpdate {
                name: Some("T2".to_string()),
                ..TaskUpdate::default()
            },
        )
        .unwrap();
    let _ = store.remove(UserId(99));
    store.remove(task).unwrap();

    assert_eq!(store.revision(), start + 3);
    assert_eq!(
        store.drain_changes(),
        vec![
            Change::Added(EntityRef::Task(task)),
            Change::Updated(EntityRef::Task(task)),
            Change::Removed(EntityRef::Task(task)),
        ]
    );
    assert!(!store.has_pending_changes());
}
