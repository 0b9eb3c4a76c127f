//! Layout engine: one stable canvas coordinate per task.
//!
//! Positions are presentation state. They are owned here rather than by the
//! entity store and survive unrelated edits: [`reconcile`] carries every
//! existing node's coordinate forward untouched and only places tasks it has
//! never seen, on a fixed grid keyed by the task's position in the current
//! ordering.
//!
//! There is no automatic layout. Once placed, a node only moves through
//! [`LayoutEngine::set_position`] (a drag) or [`LayoutEngine::restore`]
//! (previously saved pins).

use crate::domain::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Nodes per grid row for freshly placed tasks.
pub const GRID_COLUMNS: usize = 4;

/// Horizontal distance between grid columns.
pub const COLUMN_SPACING: f64 = 140.0;

/// Vertical distance between grid rows.
pub const ROW_SPACING: f64 = 120.0;

/// Canvas position of grid slot 0.
pub const GRID_ORIGIN: Point = Point { x: 100.0, y: 80.0 };

/// A 2-D canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between `self` and `other`.
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Visual record of a task on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Task this node draws
    pub task_id: TaskId,
    /// Task name at the last reconcile
    pub label: String,
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl LayoutNode {
    /// The node's coordinate.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A saved node coordinate, persisted apart from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinnedPosition {
    /// Task the position belongs to
    pub task: TaskId,
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// Grid slot for the task at `index` in the current task ordering.
#[allow(clippy::cast_precision_loss)]
pub fn grid_position(index: usize) -> Point {
    let column = (index % GRID_COLUMNS) as f64;
    let row = (index / GRID_COLUMNS) as f64;
    Point::new(
        GRID_ORIGIN.x + column * COLUMN_SPACING,
        GRID_ORIGIN.y + row * ROW_SPACING,
    )
}

/// Synchronize layout nodes with the current task collection.
///
/// Output order follows `tasks`. A task with a node in `previous` keeps that
/// node's coordinate and gets its label refreshed; any other task is placed
/// at its grid slot. Nodes whose task is gone are dropped. Running this again
/// on its own output with the same tasks changes nothing.
pub fn reconcile(tasks: &[Task], previous: &[LayoutNode]) -> Vec<LayoutNode> {
    let existing: HashMap<TaskId, &LayoutNode> =
        previous.iter().map(|n| (n.task_id, n)).collect();

    tasks
        .iter()
        .enumerate()
        .map(|(index, task)| match existing.get(&task.id) {
            Some(node) => LayoutNode {
                task_id: task.id,
                label: task.name.clone(),
                x: node.x,
                y: node.y,
            },
            None => {
                let slot = grid_position(index);
                LayoutNode {
                    task_id: task.id,
                    label: task.name.clone(),
                    x: slot.x,
                    y: slot.y,
                }
            }
        })
        .collect()
}

/// Counts from one reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    /// Tasks placed for the first time
    pub placed: usize,
    /// Nodes dropped because their task is gone
    pub dropped: usize,
}

/// Owner of the current layout nodes.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    nodes: Vec<LayoutNode>,
}

impl LayoutEngine {
    /// Create an engine with no nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine and place every task on the grid.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut engine = Self::new();
        engine.reconcile(tasks);
        engine
    }

    /// Bring the nodes in line with `tasks`, preserving known coordinates.
    pub fn reconcile(&mut self, tasks: &[Task]) -> ReconcileReport {
        let next = reconcile(tasks, &self.nodes);

        let kept = self
            .nodes
            .iter()
            .filter(|n| next.iter().any(|m| m.task_id == n.task_id))
            .count();
        let report = ReconcileReport {
            placed: next.len() - kept,
            dropped: self.nodes.len() - kept,
        };

        self.nodes = next;
        if report != ReconcileReport::default() {
            debug!(
                placed = report.placed,
                dropped = report.dropped,
                nodes = self.nodes.len(),
                "Reconciled layout"
            );
        }
        report
    }

    /// All nodes, in task order.
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    /// The node drawing `task`, if any.
    pub fn node(&self, task: TaskId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.task_id == task)
    }

    /// Overwrite one node's coordinate. Values are stored as given.
    ///
    /// Returns `false` if no node draws `task`.
    pub fn set_position(&mut self, task: TaskId, x: f64, y: f64) -> bool {
        match self.nodes.iter_mut().find(|n| n.task_id == task) {
            Some(node) => {
                node.x = x;
                node.y = y;
                true
            }
            None => {
                debug!(%task, "Ignoring position for task without a layout node");
                false
            }
        }
    }

    /// Current coordinates of every node, for persisting.
    pub fn pins(&self) -> Vec<PinnedPosition> {
        self.nodes
            .iter()
            .map(|n| PinnedPosition {
                task: n.task_id,
                x: n.x,
                y: n.y,
            })
            .collect()
    }

    /// Apply saved coordinates to existing nodes; returns how many applied.
    ///
    /// Pins for tasks without a node are ignored.
    pub fn restore(&mut self, pins: &[PinnedPosition]) -> usize {
        pins.iter()
            .filter(|pin| self.set_position(pin.task, pin.x, pin.y))
            .count()
    }

    /// Smallest box containing every node coordinate, as `(min, max)`.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = self.nodes.first()?.position();
        Some(self.nodes.iter().fold((first, first), |(min, max), n| {
            (
                Point::new(min.x.min(n.x), min.y.min(n.y)),
                Point::new(max.x.max(n.x), max.y.max(n.y)),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DepartmentId;
    use rstest::rstest;

    fn task(id: u64, name: &str) -> Task {
        Task {
            id: TaskId(id),
            name: name.to_string(),
            department_id: DepartmentId(1),
        }
    }

    #[rstest]
    #[case(0, 100.0, 80.0)]
    #[case(3, 520.0, 80.0)]
    #[case(4, 100.0, 200.0)]
    #[case(9, 240.0, 320.0)]
    fn test_grid_position(#[case] index: usize, #[case] x: f64, #[case] y: f64) {
        assert_eq!(grid_position(index), Point::new(x, y));
    }

    #[test]
    fn test_rename_refreshes_label_only() {
        let mut engine = LayoutEngine::from_tasks(&[task(1, "a"), task(2, "b")]);
        engine.set_position(TaskId(2), 7.0, 9.0);

        engine.reconcile(&[task(1, "a"), task(2, "renamed")]);

        let node = engine.node(TaskId(2)).unwrap();
        assert_eq!(node.label, "renamed");
        assert_eq!(node.position(), Point::new(7.0, 9.0));
    }

    #[test]
    fn test_new_task_placed_by_current_index() {
        let mut engine = LayoutEngine::from_tasks(&[task(1, "a"), task(2, "b")]);
        engine.reconcile(&[task(2, "b")]);
        let report = engine.reconcile(&[task(2, "b"), task(3, "c")]);

        assert_eq!(report, ReconcileReport { placed: 1, dropped: 0 });
        assert_eq!(engine.node(TaskId(3)).unwrap().position(), grid_position(1));
        assert_eq!(engine.node(TaskId(2)).unwrap().position(), grid_position(1));
    }

    #[test]
    fn test_removed_task_drops_node() {
        let mut engine = LayoutEngine::from_tasks(&[task(1, "a"), task(2, "b")]);
        let report = engine.reconcile(&[task(2, "b")]);

        assert_eq!(report.dropped, 1);
        assert!(engine.node(TaskId(1)).is_none());
        assert_eq!(engine.nodes().len(), 1);
    }

    #[test]
    fn test_set_position_accepts_out_of_range_values() {
        let mut engine = LayoutEngine::from_tasks(&[task(1, "a")]);
        assert!(engine.set_position(TaskId(1), -5000.0, 1e9));
        assert!(!engine.set_position(TaskId(2), 0.0, 0.0));
        assert_eq!(engine.node(TaskId(1)).unwrap().y, 1e9);
    }

    #[test]
    fn test_restore_skips_unknown_tasks() {
        let mut engine = LayoutEngine::from_tasks(&[task(1, "a")]);
        let applied = engine.restore(&[
            PinnedPosition {
                task: TaskId(1),
                x: 1.0,
                y: 2.0,
            },
            PinnedPosition {
                task: TaskId(8),
                x: 3.0,
                y: 4.0,
            },
        ]);

        assert_eq!(applied, 1);
        assert_eq!(engine.pins()[0].x, 1.0);
    }

    #[test]
    fn test_bounds() {
        let mut engine = LayoutEngine::from_tasks(&[task(1, "a"), task(2, "b")]);
        engine.set_position(TaskId(2), 10.0, 500.0);

        let (min, max) = engine.bounds().unwrap();
        assert_eq!(min, Point::new(10.0, 80.0));
        assert_eq!(max, Point::new(100.0, 500.0));
        assert!(LayoutEngine::new().bounds().is_none());
    }
}
