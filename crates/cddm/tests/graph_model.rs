//! Integration tests for the layout engine, interaction controller and the
//! derived render model, driven through a workspace.

use cddm::domain::{DependencyId, NewTask, Task, TaskId};
use cddm::interaction::{Cursor, DragState};
use cddm::layout::{grid_position, reconcile, LayoutNode, Point};
use cddm::render::svg::render_svg;
use cddm::render::NodeEmphasis;

mod common;
use common::{sample_store, sample_workspace};

fn positions(nodes: &[LayoutNode]) -> Vec<(TaskId, f64, f64)> {
    nodes.iter().map(|n| (n.task_id, n.x, n.y)).collect()
}

// ========== Layout ==========

#[test]
fn test_reconcile_is_idempotent() {
    let mut store = sample_store();
    for name in ["A", "B", "C", "D", "E"] {
        store.add::<Task>(NewTask::named(name)).unwrap();
    }
    let tasks = store.tasks();

    let first = reconcile(tasks, &[]);
    let second = reconcile(tasks, &first);
    let third = reconcile(tasks, &second);

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(first[4].position(), grid_position(4));
    assert_eq!(first[4].position(), Point::new(100.0, 200.0));
}

#[test]
fn test_drag_moves_only_the_dragged_node() {
    let mut ws = sample_workspace();
    ws.add::<Task>(NewTask::named("Third")).unwrap();
    let before = positions(ws.layout().nodes());

    ws.pointer_down(TaskId(2));
    ws.pointer_move(Point::new(400.0, 330.0), Point::new(0.0, 10.0));
    ws.pointer_move(Point::new(420.0, 340.0), Point::new(0.0, 10.0));
    ws.pointer_up();

    let after = positions(ws.layout().nodes());
    for (b, a) in before.iter().zip(&after) {
        if b.0 == TaskId(2) {
            assert_eq!(*a, (TaskId(2), 420.0, 330.0));
        } else {
            assert_eq!(a, b);
        }
    }
}

#[test]
fn test_pointer_move_while_idle_changes_nothing() {
    let mut ws = sample_workspace();
    let before = positions(ws.layout().nodes());

    assert!(!ws.pointer_move(Point::new(5.0, 5.0), Point::new(0.0, 0.0)));

    assert_eq!(positions(ws.layout().nodes()), before);
}

#[test]
fn test_positions_survive_unrelated_edits() {
    let mut ws = sample_workspace();
    ws.move_task(TaskId(1), -30.0, 12.5).unwrap();

    ws.add::<Task>(NewTask::named("Later")).unwrap();
    ws.remove(TaskId(2)).unwrap();

    let node = ws.layout().node(TaskId(1)).unwrap();
    assert_eq!((node.x, node.y), (-30.0, 12.5));
}

// ========== Selection ==========

#[test]
fn test_click_canvas_clears_selection() {
    let mut ws = sample_workspace();
    ws.click_node(TaskId(1));
    assert_eq!(ws.interaction().selected(), Some(TaskId(1)));

    ws.click_canvas();

    assert_eq!(ws.interaction().selected(), None);
}

#[test]
fn test_clicking_selected_node_toggles_off() {
    let mut ws = sample_workspace();

    // Full gesture: press, release, click.
    ws.pointer_down(TaskId(1));
    ws.pointer_up();
    ws.click_node(TaskId(1));
    assert_eq!(ws.interaction().selected(), Some(TaskId(1)));

    ws.pointer_down(TaskId(1));
    ws.pointer_up();
    ws.click_node(TaskId(1));
    assert_eq!(ws.interaction().selected(), None);
}

#[test]
fn test_drag_release_over_canvas_keeps_selection() {
    let mut ws = sample_workspace();

    ws.pointer_down(TaskId(2));
    assert_eq!(ws.interaction().drag_state(), DragState::Dragging(TaskId(2)));
    assert_eq!(ws.interaction().cursor_for(TaskId(2)), Cursor::Grabbing);
    ws.pointer_move(Point::new(50.0, 50.0), Point::new(0.0, 0.0));
    ws.pointer_up();
    ws.click_canvas();

    assert_eq!(ws.interaction().selected(), Some(TaskId(2)));
    assert_eq!(ws.interaction().drag_state(), DragState::Idle);
}

#[test]
fn test_pointer_leave_ends_drag() {
    let mut ws = sample_workspace();
    ws.pointer_down(TaskId(1));

    ws.pointer_leave();

    assert_eq!(ws.interaction().dragging(), None);
    assert_eq!(ws.interaction().selected(), Some(TaskId(1)));
    assert!(!ws.pointer_move(Point::new(1.0, 1.0), Point::new(0.0, 0.0)));
}

// ========== Render model ==========

#[test]
fn test_selection_emphasis() {
    let mut ws = sample_workspace();
    ws.add::<Task>(NewTask::named("Loner")).unwrap();
    ws.select(Some(TaskId(1)));

    let scene = ws.scene();

    assert_eq!(scene.node(TaskId(1)).unwrap().emphasis, NodeEmphasis::Selected);
    assert_eq!(scene.node(TaskId(2)).unwrap().emphasis, NodeEmphasis::Connected);
    let loner = scene.nodes.last().unwrap();
    assert_eq!(loner.emphasis, NodeEmphasis::Dimmed);
    assert!(loner.opacity < 1.0);
    assert!(scene.edge(DependencyId(1)).unwrap().highlighted);
}

#[test]
fn test_scene_is_repeatable() {
    let mut ws = sample_workspace();
    ws.select(Some(TaskId(2)));

    assert_eq!(ws.scene(), ws.scene());
}

#[test]
fn test_long_labels_truncate() {
    let mut ws = sample_workspace();
    let id = ws.add::<Task>(NewTask::named("Quarterly planning")).unwrap();

    let scene = ws.scene();
    let node = scene.node(id).unwrap();

    assert_eq!(node.label, "Quarterl…");
    assert_eq!(node.full_label, "Quarterly planning");
}

// ========== Orphan scenario ==========

#[test]
fn test_deleting_task_orphans_dependency_without_error() {
    let mut ws = sample_workspace();
    assert_eq!(ws.layout().nodes().len(), 2);

    ws.remove(TaskId(1)).unwrap();

    let dep = ws.store().get(DependencyId(1)).unwrap();
    assert_eq!(dep.from_task_id, TaskId(1));
    assert_eq!(ws.layout().nodes().len(), 1);
    assert!(ws.layout().node(TaskId(1)).is_none());

    let scene = ws.scene();
    assert!(scene.edges.is_empty());
    let row = &scene.dependency_rows[0];
    assert_eq!(row.from_label, "Task 1");
    assert_eq!(row.to_label, "Task 2");
    assert!(row.dangling);

    let svg = render_svg(&scene, ws.palette(), "Acme");
    assert!(svg.starts_with("<svg"));
}
