//! Domain types for the department/task dependency model.
//!
//! This module contains the four entity records (departments, users, tasks and
//! dependencies), their id newtypes, and the [`Record`] / [`EntityId`] traits
//! that give the entity store one uniform shape across every kind.
//!
//! Foreign keys are plain ids. Nothing here guarantees that a referenced
//! record exists: dangling references are tolerated everywhere and resolved to
//! fallback display values by the store.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Placeholder name given to a department created without one.
pub const DEFAULT_DEPARTMENT_NAME: &str = "New Dept";

/// Placeholder name given to a user created without one.
pub const DEFAULT_USER_NAME: &str = "New User";

/// Placeholder name given to a task created without one.
pub const DEFAULT_TASK_NAME: &str = "New Task";

/// Department id assigned when no department exists to default to.
pub const FALLBACK_DEPARTMENT_ID: DepartmentId = DepartmentId(1);

/// Unique identifier for a department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(pub u64);

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

/// Unique identifier for a dependency link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyId(pub u64);

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four entity kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Organisational unit owning users and tasks
    Department,

    /// Person belonging to a department
    User,

    /// Unit of work, drawn as a node in the graph
    Task,

    /// Directed link between two tasks, drawn as an edge
    Dependency,
}

impl EntityKind {
    /// All kinds in display order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Department,
        EntityKind::User,
        EntityKind::Task,
        EntityKind::Dependency,
    ];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Department => write!(f, "department"),
            Self::User => write!(f, "user"),
            Self::Task => write!(f, "task"),
            Self::Dependency => write!(f, "dependency"),
        }
    }
}

/// Classification of a directed task relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Hard blocker
    #[default]
    Blocks,

    /// Prerequisite
    Requires,

    /// Informational link
    Related,
}

impl LinkType {
    /// All link types in picker order.
    pub const ALL: [LinkType; 3] = [LinkType::Blocks, LinkType::Requires, LinkType::Related];

    /// Wire/display name of the link type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::Requires => "requires",
            Self::Related => "related",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier
    pub id: DepartmentId,

    /// Display name
    pub name: String,
}

/// A user assigned to a department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Owning department (may dangle after the department is removed)
    #[serde(rename = "department")]
    pub department_id: DepartmentId,
}

/// A task owned by a department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Display name, also the graph node label
    pub name: String,

    /// Owning department (may dangle after the department is removed)
    #[serde(rename = "department")]
    pub department_id: DepartmentId,
}

/// A directed dependency between two tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Unique identifier
    pub id: DependencyId,

    /// Source task
    #[serde(rename = "from")]
    pub from_task_id: TaskId,

    /// Target task
    #[serde(rename = "to")]
    pub to_task_id: TaskId,

    /// Relationship kind
    #[serde(rename = "link")]
    pub link_type: LinkType,
}

impl Dependency {
    /// Whether `task` is either endpoint of this dependency.
    pub fn touches(&self, task: TaskId) -> bool {
        self.from_task_id == task || self.to_task_id == task
    }
}

/// Fields for creating a department. Unset fields take placeholder defaults.
#[derive(Debug, Clone, Default)]
pub struct NewDepartment {
    /// Department name
    pub name: Option<String>,
}

/// Fields for creating a user. Unset fields take placeholder defaults.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// User name
    pub name: Option<String>,

    /// Owning department (defaults to the first department)
    pub department_id: Option<DepartmentId>,
}

/// Fields for creating a task. Unset fields take placeholder defaults.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Task name
    pub name: Option<String>,

    /// Owning department (defaults to the first department)
    pub department_id: Option<DepartmentId>,
}

/// Fields for creating a dependency. Unset fields take defaults.
#[derive(Debug, Clone, Default)]
pub struct NewDependency {
    /// Source task (defaults to the first task)
    pub from_task_id: Option<TaskId>,

    /// Target task (defaults to the first task other than the source)
    pub to_task_id: Option<TaskId>,

    /// Relationship kind (defaults to `blocks`)
    pub link_type: Option<LinkType>,
}

impl NewDepartment {
    /// Fields with only the name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl NewUser {
    /// Fields with only the name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the owning department.
    #[must_use]
    pub fn in_department(mut self, department: DepartmentId) -> Self {
        self.department_id = Some(department);
        self
    }
}

impl NewTask {
    /// Fields with only the name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the owning department.
    #[must_use]
    pub fn in_department(mut self, department: DepartmentId) -> Self {
        self.department_id = Some(department);
        self
    }
}

impl NewDependency {
    /// Fields for a `from -> to` link of the given type.
    pub fn link(from: TaskId, to: TaskId, link_type: LinkType) -> Self {
        Self {
            from_task_id: Some(from),
            to_task_id: Some(to),
            link_type: Some(link_type),
        }
    }
}

/// Data for updating an existing department
#[derive(Debug, Clone, Default)]
pub struct DepartmentUpdate {
    /// New name (if updating)
    pub name: Option<String>,
}

/// Data for updating an existing user
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New name (if updating)
    pub name: Option<String>,

    /// New department (if updating)
    pub department_id: Option<DepartmentId>,
}

/// Data for updating an existing task
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    /// New name (if updating)
    pub name: Option<String>,

    /// New department (if updating)
    pub department_id: Option<DepartmentId>,
}

/// Data for updating an existing dependency
#[derive(Debug, Clone, Default)]
pub struct DependencyUpdate {
    /// New source task (if updating)
    pub from_task_id: Option<TaskId>,

    /// New target task (if updating)
    pub to_task_id: Option<TaskId>,

    /// New link type (if updating)
    pub link_type: Option<LinkType>,
}

/// The whole relational dataset, also the persisted document shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Departments in display order
    #[serde(default)]
    pub departments: Vec<Department>,

    /// Users in display order
    #[serde(default)]
    pub users: Vec<User>,

    /// Tasks in display order
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// Dependencies in display order
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Dataset {
    /// The demo dataset: two departments, one user and one task in each,
    /// and a single `blocks` dependency from the first task to the second.
    pub fn sample() -> Self {
        Self {
            departments: vec![
                Department {
                    id: DepartmentId(1),
                    name: "Dept 1".to_string(),
                },
                Department {
                    id: DepartmentId(2),
                    name: "Dept 2".to_string(),
                },
            ],
            users: vec![
                User {
                    id: UserId(1),
                    name: "User 1".to_string(),
                    department_id: DepartmentId(1),
                },
                User {
                    id: UserId(2),
                    name: "User 2".to_string(),
                    department_id: DepartmentId(2),
                },
            ],
            tasks: vec![
                Task {
                    id: TaskId(1),
                    name: "Task 1".to_string(),
                    department_id: DepartmentId(1),
                },
                Task {
                    id: TaskId(2),
                    name: "Task 2".to_string(),
                    department_id: DepartmentId(2),
                },
            ],
            dependencies: vec![Dependency {
                id: DependencyId(1),
                from_task_id: TaskId(1),
                to_task_id: TaskId(2),
                link_type: LinkType::Blocks,
            }],
        }
    }

    /// Total number of records across all four collections.
    pub fn len(&self) -> usize {
        self.departments.len() + self.users.len() + self.tasks.len() + self.dependencies.len()
    }

    /// Whether all four collections are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Weak, kind-tagged reference to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    /// A department id
    Department(DepartmentId),
    /// A user id
    User(UserId),
    /// A task id
    Task(TaskId),
    /// A dependency id
    Dependency(DependencyId),
}

impl EntityRef {
    /// Build a reference from a kind and a raw id.
    pub fn new(kind: EntityKind, raw: u64) -> Self {
        match kind {
            EntityKind::Department => Self::Department(DepartmentId(raw)),
            EntityKind::User => Self::User(UserId(raw)),
            EntityKind::Task => Self::Task(TaskId(raw)),
            EntityKind::Dependency => Self::Dependency(DependencyId(raw)),
        }
    }

    /// Kind of the referenced record.
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Department(_) => EntityKind::Department,
            Self::User(_) => EntityKind::User,
            Self::Task(_) => EntityKind::Task,
            Self::Dependency(_) => EntityKind::Dependency,
        }
    }

    /// Raw numeric id.
    pub fn raw_id(self) -> u64 {
        match self {
            Self::Department(id) => id.0,
            Self::User(id) => id.0,
            Self::Task(id) => id.0,
            Self::Dependency(id) => id.0,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.raw_id())
    }
}

/// An owned record of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    /// A department record
    Department(Department),
    /// A user record
    User(User),
    /// A task record
    Task(Task),
    /// A dependency record
    Dependency(Dependency),
}

impl Entity {
    /// Reference to this record.
    pub fn entity_ref(&self) -> EntityRef {
        match self {
            Self::Department(d) => EntityRef::Department(d.id),
            Self::User(u) => EntityRef::User(u.id),
            Self::Task(t) => EntityRef::Task(t.id),
            Self::Dependency(d) => EntityRef::Dependency(d.id),
        }
    }
}

/// Typed id of a [`Record`]. The id type alone selects the collection.
pub trait EntityId: Copy + Eq + Hash + fmt::Debug + fmt::Display {
    /// The record kind this id addresses.
    type Record: Record<Id = Self>;

    /// Wrap a raw id.
    fn from_raw(raw: u64) -> Self;

    /// Unwrap to the raw id.
    fn raw(self) -> u64;

    /// Kind-tagged reference to the same record.
    fn to_ref(self) -> EntityRef {
        EntityRef::new(<Self::Record as Record>::KIND, self.raw())
    }
}

/// Uniform per-kind behavior used by the entity store.
///
/// `seed` merges add-fields over the kind's placeholder defaults; `merge`
/// applies an update patch and enforces the kind's commit-time invariants.
/// Neither checks that foreign keys resolve.
pub trait Record: Clone + fmt::Debug + Into<Entity> {
    /// Id type of this record.
    type Id: EntityId<Record = Self>;

    /// Partial fields accepted by `add`.
    type Fields: Default + fmt::Debug;

    /// Partial fields accepted by `update`.
    type Patch: Default + fmt::Debug;

    /// The record's kind tag.
    const KIND: EntityKind;

    /// This record's id.
    fn id(&self) -> Self::Id;

    /// The collection holding this kind.
    fn rows(data: &Dataset) -> &Vec<Self>;

    /// Mutable access to the collection holding this kind.
    fn rows_mut(data: &mut Dataset) -> &mut Vec<Self>;

    /// Build a new record from add-fields, filling defaults from `data`.
    ///
    /// # Errors
    ///
    /// Only dependencies can fail, with `Error::InvalidReference`, when the
    /// resolved endpoints are equal or no second task exists to default to.
    fn seed(id: Self::Id, fields: Self::Fields, data: &Dataset) -> Result<Self>;

    /// Apply an update patch.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidReference` for a self-referencing dependency and
    /// `Error::Validation` for an empty department name.
    fn merge(&mut self, patch: Self::Patch) -> Result<()>;
}

fn first_department(data: &Dataset) -> DepartmentId {
    data.departments
        .first()
        .map_or(FALLBACK_DEPARTMENT_ID, |d| d.id)
}

impl EntityId for DepartmentId {
    type Record = Department;

    fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    fn raw(self) -> u64 {
        self.0
    }
}

impl EntityId for UserId {
    type Record = User;

    fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    fn raw(self) -> u64 {
        self.0
    }
}

impl EntityId for TaskId {
    type Record = Task;

    fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    fn raw(self) -> u64 {
        self.0
    }
}

impl EntityId for DependencyId {
    type Record = Dependency;

    fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    fn raw(self) -> u64 {
        self.0
    }
}

impl From<Department> for Entity {
    fn from(value: Department) -> Self {
        Self::Department(value)
    }
}

impl From<User> for Entity {
    fn from(value: User) -> Self {
        Self::User(value)
    }
}

impl From<Task> for Entity {
    fn from(value: Task) -> Self {
        Self::Task(value)
    }
}

impl From<Dependency> for Entity {
    fn from(value: Dependency) -> Self {
        Self::Dependency(value)
    }
}

impl Record for Department {
    type Id = DepartmentId;
    type Fields = NewDepartment;
    type Patch = DepartmentUpdate;
    const KIND: EntityKind = EntityKind::Department;

    fn id(&self) -> DepartmentId {
        self.id
    }

    fn rows(data: &Dataset) -> &Vec<Self> {
        &data.departments
    }

    fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> {
        &mut data.departments
    }

    fn seed(id: DepartmentId, fields: NewDepartment, _data: &Dataset) -> Result<Self> {
        Ok(Self {
            id,
            name: fields
                .name
                .unwrap_or_else(|| DEFAULT_DEPARTMENT_NAME.to_string()),
        })
    }

    fn merge(&mut self, patch: DepartmentUpdate) -> Result<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(Error::Validation(
                    "Department name cannot be empty".to_string(),
                ));
            }
            self.name = name;
        }
        Ok(())
    }
}

impl Record for User {
    type Id = UserId;
    type Fields = NewUser;
    type Patch = UserUpdate;
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> UserId {
        self.id
    }

    fn rows(data: &Dataset) -> &Vec<Self> {
        &data.users
    }

    fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> {
        &mut data.users
    }

    fn seed(id: UserId, fields: NewUser, data: &Dataset) -> Result<Self> {
        Ok(Self {
            id,
            name: fields.name.unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            department_id: fields
                .department_id
                .unwrap_or_else(|| first_department(data)),
        })
    }

    fn merge(&mut self, patch: UserUpdate) -> Result<()> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(department_id) = patch.department_id {
            self.department_id = department_id;
        }
        Ok(())
    }
}

impl Record for Task {
    type Id = TaskId;
    type Fields = NewTask;
    type Patch = TaskUpdate;
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> TaskId {
        self.id
    }

    fn rows(data: &Dataset) -> &Vec<Self> {
        &data.tasks
    }

    fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> {
        &mut data.tasks
    }

    fn seed(id: TaskId, fields: NewTask, data: &Dataset) -> Result<Self> {
        Ok(Self {
            id,
            name: fields.name.unwrap_or_else(|| DEFAULT_TASK_NAME.to_string()),
            department_id: fields
                .department_id
                .unwrap_or_else(|| first_department(data)),
        })
    }

    fn merge(&mut self, patch: TaskUpdate) -> Result<()> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(department_id) = patch.department_id {
            self.department_id = department_id;
        }
        Ok(())
    }
}

impl Record for Dependency {
    type Id = DependencyId;
    type Fields = NewDependency;
    type Patch = DependencyUpdate;
    const KIND: EntityKind = EntityKind::Dependency;

    fn id(&self) -> DependencyId {
        self.id
    }

    fn rows(data: &Dataset) -> &Vec<Self> {
        &data.dependencies
    }

    fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> {
        &mut data.dependencies
    }

    fn seed(id: DependencyId, fields: NewDependency, data: &Dataset) -> Result<Self> {
        let from = fields
            .from_task_id
            .or_else(|| data.tasks.first().map(|t| t.id))
            .ok_or_else(|| {
                Error::InvalidReference("a dependency needs two distinct tasks".to_string())
            })?;
        let to = fields
            .to_task_id
            .or_else(|| data.tasks.iter().map(|t| t.id).find(|&t| t != from))
            .ok_or_else(|| {
                Error::InvalidReference("a dependency needs two distinct tasks".to_string())
            })?;

        if from == to {
            return Err(Error::InvalidReference(format!(
                "dependency {id} cannot link task {from} to itself"
            )));
        }

        Ok(Self {
            id,
            from_task_id: from,
            to_task_id: to,
            link_type: fields.link_type.unwrap_or_default(),
        })
    }

    fn merge(&mut self, patch: DependencyUpdate) -> Result<()> {
        let from = patch.from_task_id.unwrap_or(self.from_task_id);
        let to = patch.to_task_id.unwrap_or(self.to_task_id);

        if from == to {
            return Err(Error::InvalidReference(format!(
                "dependency {} cannot link task {from} to itself",
                self.id
            )));
        }

        self.from_task_id = from;
        self.to_task_id = to;
        if let Some(link_type) = patch.link_type {
            self.link_type = link_type;
        }
        Ok(())
    }
}
