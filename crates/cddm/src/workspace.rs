//! The explicit owner of everything a graph session mutates.
//!
//! A [`Workspace`] holds the entity store, the layout engine and the
//! interaction controller side by side. Store mutations go through it so
//! that the change notifications they emit are drained straight away:
//! any change to the task collection re-runs layout reconciliation, and a
//! removed task is forgotten by the controller. Visuals are never stored;
//! [`Workspace::scene`] derives a fresh frame on every call.

use crate::domain::{Entity, EntityId, EntityKind, EntityRef, Record, TaskId};
use crate::draft::Draft;
use crate::error::{Error, Result};
use crate::interaction::InteractionController;
use crate::layout::{LayoutEngine, PinnedPosition, Point, ReconcileReport};
use crate::render::{Palette, Scene};
use crate::store::{Change, Store};
use tracing::debug;

/// Store, layout and interaction state for one session.
#[derive(Debug, Default)]
pub struct Workspace {
    store: Store,
    layout: LayoutEngine,
    interaction: InteractionController,
    palette: Palette,
}

impl Workspace {
    /// Wrap `store`, placing every task on the layout grid.
    pub fn new(mut store: Store) -> Self {
        store.drain_changes();
        let layout = LayoutEngine::from_tasks(store.tasks());
        Self {
            store,
            layout,
            interaction: InteractionController::new(),
            palette: Palette::default(),
        }
    }

    /// Use `palette` for derived scenes.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Get the entity store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get the node layout.
    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    /// Get the selection and drag state.
    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// Get the colour scheme.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    // ========== Store mutations ==========

    /// Add a record; see [`Store::add`].
    ///
    /// # Errors
    ///
    /// Same as [`Store::add`].
    pub fn add<R: Record>(&mut self, fields: R::Fields) -> Result<R::Id> {
        let id = self.store.add::<R>(fields)?;
        self.sync();
        Ok(id)
    }

    /// Patch a record; see [`Store::update`].
    ///
    /// # Errors
    ///
    /// Same as [`Store::update`].
    pub fn update<I: EntityId>(
        &mut self,
        id: I,
        patch: <I::Record as Record>::Patch,
    ) -> Result<I::Record> {
        let record = self.store.update(id, patch)?;
        self.sync();
        Ok(record)
    }

    /// Remove a record; see [`Store::remove`].
    ///
    /// # Errors
    ///
    /// Same as [`Store::remove`].
    pub fn remove<I: EntityId>(&mut self, id: I) -> Result<I::Record> {
        let record = self.store.remove(id)?;
        self.sync();
        Ok(record)
    }

    /// Remove a record of any kind.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the record doesn't exist.
    pub fn remove_entity(&mut self, target: EntityRef) -> Result<Entity> {
        let entity = self.store.remove_entity(target)?;
        self.sync();
        Ok(entity)
    }

    /// Start editing `target`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the record doesn't exist.
    pub fn draft(&self, target: EntityRef) -> Result<Draft> {
        Draft::load(&self.store, target)
    }

    /// Commit an edit draft.
    ///
    /// # Errors
    ///
    /// Same as [`Draft::commit`].
    pub fn commit(&mut self, draft: Draft) -> Result<Entity> {
        let entity = draft.commit(&mut self.store)?;
        self.sync();
        Ok(entity)
    }

    /// Drain pending store changes into the layout and the controller.
    pub fn sync(&mut self) -> ReconcileReport {
        let changes = self.store.drain_changes();
        if changes.is_empty() {
            return ReconcileReport::default();
        }

        for change in &changes {
            if let Change::Removed(EntityRef::Task(task)) = *change {
                self.interaction.forget(task);
            }
        }

        if changes.iter().any(|c| c.touches_tasks()) {
            self.layout.reconcile(self.store.tasks())
        } else {
            ReconcileReport::default()
        }
    }

    // ========== Layout ==========

    /// Place `task`'s node at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the task has no node.
    pub fn move_task(&mut self, task: TaskId, x: f64, y: f64) -> Result<()> {
        if !self.layout.set_position(task, x, y) {
            return Err(Error::not_found(EntityKind::Task, task.0));
        }
        debug!(%task, x, y, "Moved task node");
        Ok(())
    }

    /// Apply saved coordinates; returns how many applied.
    pub fn restore_pins(&mut self, pins: &[PinnedPosition]) -> usize {
        self.layout.restore(pins)
    }

    /// Current coordinates of every node.
    pub fn pins(&self) -> Vec<PinnedPosition> {
        self.layout.pins()
    }

    // ========== Pointer entry points ==========

    /// Press on the node for `task`.
    pub fn pointer_down(&mut self, task: TaskId) {
        self.interaction.pointer_down(task);
    }

    /// Pointer moved to `pointer`, relative to the canvas `origin`.
    ///
    /// Returns whether a node moved.
    pub fn pointer_move(&mut self, pointer: Point, origin: Point) -> bool {
        self.interaction
            .pointer_move(pointer, origin, &mut self.layout)
    }

    /// Release the pointer, ending any drag.
    pub fn pointer_up(&mut self) {
        self.interaction.pointer_up();
    }

    /// Pointer left the canvas, ending any drag.
    pub fn pointer_leave(&mut self) {
        self.interaction.pointer_leave();
    }

    /// Click on the node for `task`.
    pub fn click_node(&mut self, task: TaskId) {
        self.interaction.click_node(task);
    }

    /// Click on empty canvas.
    pub fn click_canvas(&mut self) {
        self.interaction.click_canvas();
    }

    /// Select `task` directly, or clear the selection.
    pub fn select(&mut self, task: Option<TaskId>) {
        self.interaction.select(task);
    }

    // ========== Rendering ==========

    /// Derive the current frame.
    pub fn scene(&self) -> Scene {
        Scene::derive(&self.store, &self.layout, &self.interaction, &self.palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Dataset, Department, DepartmentId, DependencyId, NewDepartment, NewTask, Task, TaskUpdate,
    };
    use crate::draft::DraftEdits;

    fn sample() -> Workspace {
        Workspace::new(Store::load(Dataset::sample()).0)
    }

    #[test]
    fn test_new_places_every_task() {
        let ws = sample();
        assert_eq!(ws.layout().nodes().len(), 2);
        assert!(!ws.store().has_pending_changes());
    }

    #[test]
    fn test_adding_task_adds_node_without_moving_others() {
        let mut ws = sample();
        ws.move_task(TaskId(1), 500.0, 500.0).unwrap();

        let id = ws.add::<Task>(NewTask::named("Third")).unwrap();

        assert_eq!(ws.layout().nodes().len(), 3);
        assert!(ws.layout().node(id).is_some());
        assert_eq!(ws.layout().node(TaskId(1)).unwrap().x, 500.0);
    }

    #[test]
    fn test_rename_refreshes_label_only() {
        let mut ws = sample();
        ws.move_task(TaskId(2), 7.0, 8.0).unwrap();

        ws.update(
            TaskId(2),
            TaskUpdate {
                name: Some("Shipping".to_string()),
                ..TaskUpdate::default()
            },
        )
        .unwrap();

        let node = ws.layout().node(TaskId(2)).unwrap();
        assert_eq!(node.label, "Shipping");
        assert_eq!((node.x, node.y), (7.0, 8.0));
    }

    #[test]
    fn test_removing_selected_task_clears_selection() {
        let mut ws = sample();
        ws.pointer_down(TaskId(1));
        ws.pointer_up();
        ws.click_node(TaskId(1));
        assert_eq!(ws.interaction().selected(), Some(TaskId(1)));

        ws.remove(TaskId(1)).unwrap();

        assert_eq!(ws.interaction().selected(), None);
        assert_eq!(ws.layout().nodes().len(), 1);
        assert!(ws.store().contains(DependencyId(1)));
    }

    #[test]
    fn test_department_changes_do_not_reconcile() {
        let mut ws = sample();
        ws.move_task(TaskId(1), 1.0, 1.0).unwrap();

        ws.add::<Department>(NewDepartment::named("Ops")).unwrap();
        ws.remove(DepartmentId(1)).unwrap();

        assert_eq!(ws.layout().node(TaskId(1)).unwrap().x, 1.0);
        assert_eq!(ws.sync(), ReconcileReport::default());
    }

    #[test]
    fn test_commit_syncs_layout_label() {
        let mut ws = sample();
        let mut draft = ws.draft(EntityRef::Task(TaskId(1))).unwrap();
        draft
            .apply(DraftEdits {
                name: Some("Design".to_string()),
                ..DraftEdits::default()
            })
            .unwrap();

        ws.commit(draft).unwrap();

        assert_eq!(ws.layout().node(TaskId(1)).unwrap().label, "Design");
    }

    #[test]
    fn test_move_unknown_task_is_not_found() {
        let mut ws = sample();
        assert!(matches!(
            ws.move_task(TaskId(99), 0.0, 0.0),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_drag_through_workspace() {
        let mut ws = sample();
        let before = ws.layout().node(TaskId(2)).unwrap().position();

        ws.pointer_down(TaskId(1));
        assert!(ws.pointer_move(Point::new(310.0, 220.0), Point::new(10.0, 20.0)));
        ws.pointer_up();

        let node = ws.layout().node(TaskId(1)).unwrap();
        assert_eq!((node.x, node.y), (300.0, 200.0));
        assert_eq!(ws.layout().node(TaskId(2)).unwrap().position(), before);
        assert_eq!(ws.scene().nodes.len(), 2);
    }
}
