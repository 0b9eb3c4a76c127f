//! Selection and drag state for the graph canvas.
//!
//! Two independent values: the selected task and a two-state drag machine
//! ([`DragState::Idle`] / [`DragState::Dragging`]). Pointer events arrive in
//! the order a canvas delivers them:
//!
//! ```text
//! pointer_down(node) -> [pointer_move ...] -> pointer_up -> click_node(node)
//! ```
//!
//! A press selects the node immediately. The click that follows the same
//! press resolves the toggle against the selection as it was *before* the
//! press, so pressing an already-selected node and releasing without moving
//! deselects it. A press that moved is a drag and leaves the selection alone.
//!
//! The press also swallows the next empty-canvas click, so releasing a drag
//! over the background never clears the selection.

use crate::domain::TaskId;
use crate::layout::{LayoutEngine, Point};
use serde::Serialize;
use std::fmt;
use tracing::trace;

/// Drag machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No node is held
    #[default]
    Idle,

    /// A node is held and follows the pointer
    Dragging(TaskId),
}

/// Cursor to show over a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    /// Node can be picked up
    Grab,

    /// Node is being dragged
    Grabbing,
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grab => write!(f, "grab"),
            Self::Grabbing => write!(f, "grabbing"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    task: TaskId,
    was_selected: bool,
    moved: bool,
}

/// Selection and interaction controller.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    selected: Option<TaskId>,
    drag: DragState,
    press: Option<Press>,
    suppress_canvas_click: bool,
}

impl InteractionController {
    /// Create a controller with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected task, if any.
    pub fn selected(&self) -> Option<TaskId> {
        self.selected
    }

    /// The task being dragged, if any.
    pub fn dragging(&self) -> Option<TaskId> {
        match self.drag {
            DragState::Idle => None,
            DragState::Dragging(task) => Some(task),
        }
    }

    /// Current drag machine state.
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Cursor hint for the node drawing `task`.
    pub fn cursor_for(&self, task: TaskId) -> Cursor {
        if self.dragging() == Some(task) {
            Cursor::Grabbing
        } else {
            Cursor::Grab
        }
    }

    // ========== Pointer entry points ==========

    /// Pointer pressed on a node: start dragging it and select it.
    pub fn pointer_down(&mut self, task: TaskId) {
        self.press = Some(Press {
            task,
            was_selected: self.selected == Some(task),
            moved: false,
        });
        self.drag = DragState::Dragging(task);
        self.selected = Some(task);
        self.suppress_canvas_click = true;
        trace!(%task, "Pointer down");
    }

    /// Pointer moved to `pointer`; the canvas origin is `origin`.
    ///
    /// Moves the dragged node to the pointer position relative to the
    /// origin. Returns whether a node moved; does nothing while idle.
    pub fn pointer_move(&mut self, pointer: Point, origin: Point, layout: &mut LayoutEngine) -> bool {
        let DragState::Dragging(task) = self.drag else {
            return false;
        };
        let moved = layout.set_position(task, pointer.x - origin.x, pointer.y - origin.y);
        if let Some(press) = self.press.as_mut().filter(|p| p.task == task) {
            press.moved |= moved;
        }
        moved
    }

    /// Pointer released. Ends a drag; the selection is kept.
    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Pointer left the canvas. Ends a drag and abandons the pending press.
    pub fn pointer_leave(&mut self) {
        self.drag = DragState::Idle;
        self.press = None;
        self.suppress_canvas_click = false;
    }

    /// Click on a node.
    ///
    /// After a press on the same node, a drag keeps the selection and a
    /// plain click toggles it relative to the pre-press state. A click with
    /// no preceding press simply toggles.
    pub fn click_node(&mut self, task: TaskId) {
        self.suppress_canvas_click = false;
        match self.press.take() {
            Some(press) if press.task == task => {
                if !press.moved && press.was_selected {
                    self.selected = None;
                }
            }
            _ => self.toggle(task),
        }
        trace!(%task, selected = ?self.selected, "Node click");
    }

    /// Click on empty canvas: clears the selection unless a node press is
    /// still being resolved.
    pub fn click_canvas(&mut self) {
        if std::mem::take(&mut self.suppress_canvas_click) {
            self.press = None;
            return;
        }
        self.selected = None;
    }

    // ========== Direct selection ==========

    /// Select `task`, or clear the selection.
    pub fn select(&mut self, task: Option<TaskId>) {
        self.selected = task;
    }

    /// Select `task`, or deselect it if it is already selected.
    pub fn toggle(&mut self, task: TaskId) {
        self.selected = if self.selected == Some(task) {
            None
        } else {
            Some(task)
        };
    }

    /// Drop any state that refers to a removed task.
    pub fn forget(&mut self, task: TaskId) {
        if self.selected == Some(task) {
            self.selected = None;
        }
        if self.dragging() == Some(task) {
            self.drag = DragState::Idle;
        }
        if self.press.is_some_and(|p| p.task == task) {
            self.press = None;
            self.suppress_canvas_click = false;
        }
    }
}
