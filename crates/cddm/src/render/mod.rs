//! Graph render model.
//!
//! [`Scene::derive`] turns the current store, layout and selection into
//! everything a canvas needs to draw one frame: node and edge attributes,
//! the sidebar rows, and the selection detail panel. Derivation only reads
//! its inputs, so it can be repeated at any time and always yields the same
//! scene for the same state.
//!
//! Visual attributes are computed here and never stored anywhere else.

mod palette;
pub mod svg;

pub use palette::{link_dash, Palette};

use crate::domain::{DependencyId, LinkType, TaskId};
use crate::graph::TaskGraph;
use crate::interaction::{Cursor, InteractionController};
use crate::layout::{LayoutEngine, LayoutNode, Point};
use crate::store::Store;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;

/// Task labels longer than this are truncated.
pub const LABEL_MAX_CHARS: usize = 9;

/// Characters kept from a truncated task label.
pub const LABEL_KEEP_CHARS: usize = 8;

/// Department subtitles longer than this are truncated.
pub const SUBTITLE_MAX_CHARS: usize = 7;

/// Characters kept from a truncated department subtitle.
pub const SUBTITLE_KEEP_CHARS: usize = 6;

/// Appended to truncated text.
pub const ELLIPSIS: char = '…';

/// Radius of a node circle.
pub const NODE_RADIUS: f64 = 24.0;

/// Radius of the glow ring around a selected node.
pub const GLOW_RING_RADIUS: f64 = 32.0;

/// Radius of the dashed ring around a node linked to the selection.
pub const CONNECTED_RING_RADIUS: f64 = 28.0;

/// Control point offset as a fraction of the endpoint displacement.
pub const CURVE_BEND: f64 = 0.2;

/// Distance of an edge label above the straight-line midpoint.
pub const EDGE_LABEL_LIFT: f64 = 6.0;

/// Vertical offset of a node subtitle.
pub const SUBTITLE_OFFSET: f64 = 8.0;

/// Vertical offset of a node label when a subtitle is shown.
pub const LABEL_OFFSET_WITH_SUBTITLE: f64 = -4.0;

/// Shorten `text` to `keep` characters plus an ellipsis if it is longer
/// than `max` characters.
pub fn truncate(text: &str, max: usize, keep: usize) -> Cow<'_, str> {
    if text.chars().count() > max {
        let mut short: String = text.chars().take(keep).collect();
        short.push(ELLIPSIS);
        Cow::Owned(short)
    } else {
        Cow::Borrowed(text)
    }
}

/// Node label as drawn on the canvas.
pub fn truncate_label(label: &str) -> Cow<'_, str> {
    truncate(label, LABEL_MAX_CHARS, LABEL_KEEP_CHARS)
}

/// Department subtitle as drawn under a node label.
pub fn truncate_subtitle(name: &str) -> Cow<'_, str> {
    truncate(name, SUBTITLE_MAX_CHARS, SUBTITLE_KEEP_CHARS)
}

/// Quadratic Bézier between two node centres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadCurve {
    /// Centre of the source node
    pub start: Point,
    /// Bézier control point
    pub control: Point,
    /// Centre of the target node
    pub end: Point,
}

impl QuadCurve {
    /// Curve from `from` to `to`, bowed to one side of the straight line.
    ///
    /// The control point is the midpoint shifted by the displacement
    /// rotated a quarter turn and scaled by [`CURVE_BEND`]. Swapping the
    /// endpoints bows to the opposite side, so `a -> b` and `b -> a` never
    /// overlap.
    pub fn between(from: Point, to: Point) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let mid = from.midpoint(to);
        Self {
            start: from,
            control: Point::new(mid.x - dy * CURVE_BEND, mid.y + dx * CURVE_BEND),
            end: to,
        }
    }

    /// SVG path data.
    pub fn path_data(&self) -> String {
        format!(
            "M {} {} Q {} {} {} {}",
            self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
        )
    }
}

/// How a node relates to the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeEmphasis {
    /// No selection is active
    Normal,
    /// The selected node
    Selected,
    /// Linked to the selected node by some dependency
    Connected,
    /// Unrelated to an active selection
    Dimmed,
}

/// A decorative circle drawn behind a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ring {
    /// Ring radius
    pub radius: f64,
    /// Stroke colour, the node's department colour
    pub color: String,
    /// Stroke width
    pub stroke_width: f64,
    /// Stroke opacity
    pub opacity: f64,
    /// SVG dash pattern; solid when `None`
    pub dash: Option<&'static str>,
}

/// Everything needed to draw one task node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    /// The task this node draws
    pub task_id: TaskId,
    /// Horizontal centre
    pub x: f64,
    /// Vertical centre
    pub y: f64,
    /// Untruncated task name
    pub full_label: String,
    /// Task name as drawn
    pub label: String,
    /// Vertical offset of the label
    pub label_offset: f64,
    /// Truncated department name; absent when the department is missing
    pub subtitle: Option<String>,
    /// Department colour
    pub color: String,
    /// Circle fill
    pub fill: String,
    /// Circle stroke width
    pub stroke_width: f64,
    /// Opacity of the whole node
    pub opacity: f64,
    /// Label colour
    pub text_color: String,
    /// Subtitle colour
    pub subtitle_color: String,
    /// Relation to the current selection
    pub emphasis: NodeEmphasis,
    /// Decoration behind the circle
    pub ring: Option<Ring>,
    /// Pointer cursor over the node
    pub cursor: Cursor,
}

/// Everything needed to draw one dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    /// The dependency this edge draws
    pub dependency_id: DependencyId,
    /// Source task
    pub from: TaskId,
    /// Target task
    pub to: TaskId,
    /// Link type, also the label text
    pub link_type: LinkType,
    /// Curve geometry
    pub curve: QuadCurve,
    /// `curve` as SVG path data
    pub path: String,
    /// Link type colour
    pub color: String,
    /// Stroke width
    pub stroke_width: f64,
    /// Stroke opacity
    pub opacity: f64,
    /// SVG dash pattern; solid when `None`
    pub dash: Option<&'static str>,
    /// Arrowhead marker id, one per link type
    pub marker: String,
    /// Anchor of the link type label
    pub label_position: Point,
    /// Opacity of the label
    pub label_opacity: f64,
    /// Touches the selected task
    pub highlighted: bool,
}

/// Sidebar entry for a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    /// Task id
    pub task_id: TaskId,
    /// Full task name
    pub name: String,
    /// Department colour of the swatch
    pub color: String,
    /// Whether this task is selected
    pub selected: bool,
}

/// Sidebar entry for a dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyRow {
    /// Dependency id
    pub dependency_id: DependencyId,
    /// Link type shown in the badge
    pub link_type: LinkType,
    /// Badge colour
    pub badge_color: String,
    /// Source task name, or `Task {id}` when missing
    pub from_label: String,
    /// Target task name, or `Task {id}` when missing
    pub to_label: String,
    /// At least one endpoint task no longer exists
    pub dangling: bool,
}

/// Which way a dependency points relative to the selected task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// The selected task is the source
    Outgoing,
    /// The selected task is the target
    Incoming,
}

impl LinkDirection {
    /// Arrow shown in the detail panel.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Outgoing => "→",
            Self::Incoming => "←",
        }
    }
}

/// One dependency in the selection detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRow {
    /// Dependency id
    pub dependency_id: DependencyId,
    /// Link type shown in the badge
    pub link_type: LinkType,
    /// Badge colour
    pub badge_color: String,
    /// Which end the selected task is on
    pub direction: LinkDirection,
    /// Name of the task at the other end
    pub other_label: String,
}

/// Detail panel for the selected task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionDetail {
    /// Selected task
    pub task_id: TaskId,
    /// Its full name
    pub name: String,
    /// Department name, or `—` when it is missing
    pub department: String,
    /// Every dependency touching the task, in store order
    pub links: Vec<LinkRow>,
}

/// One derived frame of the graph view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    /// One view per layout node
    pub nodes: Vec<NodeView>,
    /// Dependencies whose endpoints both have a node
    pub edges: Vec<EdgeView>,
    /// Sidebar task list
    pub task_rows: Vec<TaskRow>,
    /// Sidebar dependency list, dangling ones included
    pub dependency_rows: Vec<DependencyRow>,
    /// Detail panel, when a live task is selected
    pub selection: Option<SelectionDetail>,
    /// Smallest box holding every node centre, as `(min, max)`
    pub bounds: Option<(Point, Point)>,
    /// No tasks exist; the canvas shows its empty state
    pub is_empty: bool,
}

struct Context<'a> {
    store: &'a Store,
    palette: &'a Palette,
    selected: Option<TaskId>,
    connected: HashSet<TaskId>,
}

impl Scene {
    /// Derive a frame from current state.
    ///
    /// A selection pointing at a task that no longer exists is treated as
    /// no selection.
    pub fn derive(
        store: &Store,
        layout: &LayoutEngine,
        controller: &InteractionController,
        palette: &Palette,
    ) -> Self {
        let graph = TaskGraph::build(store);
        let selected = controller.selected().filter(|&t| store.contains(t));
        let connected = selected.map(|t| graph.neighbors(t)).unwrap_or_default();
        let cx = Context {
            store,
            palette,
            selected,
            connected,
        };

        let edges = store
            .dependencies()
            .iter()
            .filter_map(|dep| {
                let from = layout.node(dep.from_task_id)?;
                let to = layout.node(dep.to_task_id)?;
                Some(cx.edge(dep.id, dep.link_type, from, to))
            })
            .collect();

        Self {
            nodes: layout
                .nodes()
                .iter()
                .map(|n| cx.node(n, controller.cursor_for(n.task_id)))
                .collect(),
            edges,
            task_rows: cx.task_rows(),
            dependency_rows: cx.dependency_rows(),
            selection: cx.selection_detail(),
            bounds: layout.bounds(),
            is_empty: store.tasks().is_empty(),
        }
    }

    /// The node view for `task`, if it is drawn.
    pub fn node(&self, task: TaskId) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.task_id == task)
    }

    /// The edge view for `dependency`, if it is drawn.
    pub fn edge(&self, dependency: DependencyId) -> Option<&EdgeView> {
        self.edges.iter().find(|e| e.dependency_id == dependency)
    }
}

impl Context<'_> {
    fn task_color(&self, task: TaskId) -> String {
        self.palette
            .department_color(self.store.color_index_for_task(task))
            .to_string()
    }

    fn node(&self, node: &LayoutNode, cursor: Cursor) -> NodeView {
        let task = node.task_id;
        let color = self.task_color(task);

        let emphasis = match self.selected {
            None => NodeEmphasis::Normal,
            Some(s) if s == task => NodeEmphasis::Selected,
            Some(_) if self.connected.contains(&task) => NodeEmphasis::Connected,
            Some(_) => NodeEmphasis::Dimmed,
        };

        let subtitle = self
            .store
            .get(task)
            .and_then(|t| self.store.get(t.department_id))
            .map(|d| truncate_subtitle(&d.name).into_owned());

        let (fill, stroke_width, text_color, subtitle_color, ring) = match emphasis {
            NodeEmphasis::Selected => (
                color.clone(),
                0.0,
                self.palette.selected_text.clone(),
                self.palette.selected_subtitle.clone(),
                Some(Ring {
                    radius: GLOW_RING_RADIUS,
                    color: color.clone(),
                    stroke_width: 1.5,
                    opacity: 0.3,
                    dash: None,
                }),
            ),
            NodeEmphasis::Connected => (
                self.palette.node_fill.clone(),
                2.0,
                color.clone(),
                self.palette.muted_text.clone(),
                Some(Ring {
                    radius: CONNECTED_RING_RADIUS,
                    color: color.clone(),
                    stroke_width: 1.0,
                    opacity: 0.4,
                    dash: Some("3 3"),
                }),
            ),
            NodeEmphasis::Normal | NodeEmphasis::Dimmed => (
                self.palette.node_fill.clone(),
                1.5,
                color.clone(),
                self.palette.muted_text.clone(),
                None,
            ),
        };

        NodeView {
            task_id: task,
            x: node.x,
            y: node.y,
            full_label: node.label.clone(),
            label: truncate_label(&node.label).into_owned(),
            label_offset: if subtitle.is_some() {
                LABEL_OFFSET_WITH_SUBTITLE
            } else {
                0.0
            },
            subtitle,
            color,
            fill,
            stroke_width,
            opacity: if emphasis == NodeEmphasis::Dimmed {
                0.4
            } else {
                1.0
            },
            text_color,
            subtitle_color,
            emphasis,
            ring,
            cursor,
        }
    }

    fn edge(
        &self,
        id: DependencyId,
        link_type: LinkType,
        from: &LayoutNode,
        to: &LayoutNode,
    ) -> EdgeView {
        let highlighted = self
            .selected
            .is_some_and(|s| s == from.task_id || s == to.task_id);
        let curve = QuadCurve::between(from.position(), to.position());
        let mid = from.position().midpoint(to.position());

        EdgeView {
            dependency_id: id,
            from: from.task_id,
            to: to.task_id,
            link_type,
            path: curve.path_data(),
            curve,
            color: self.palette.link_color(link_type).to_string(),
            stroke_width: if highlighted { 2.5 } else { 1.5 },
            opacity: if highlighted { 1.0 } else { 0.45 },
            dash: link_dash(link_type),
            marker: format!("arrow-{link_type}"),
            label_position: Point::new(mid.x, mid.y - EDGE_LABEL_LIFT),
            label_opacity: if highlighted { 1.0 } else { 0.5 },
            highlighted,
        }
    }

    fn task_rows(&self) -> Vec<TaskRow> {
        self.store
            .tasks()
            .iter()
            .map(|t| TaskRow {
                task_id: t.id,
                name: t.name.clone(),
                color: self.task_color(t.id),
                selected: self.selected == Some(t.id),
            })
            .collect()
    }

    fn dependency_rows(&self) -> Vec<DependencyRow> {
        self.store
            .dependencies()
            .iter()
            .map(|d| DependencyRow {
                dependency_id: d.id,
                link_type: d.link_type,
                badge_color: self.palette.link_color(d.link_type).to_string(),
                from_label: self.store.task_name(d.from_task_id).into_owned(),
                to_label: self.store.task_name(d.to_task_id).into_owned(),
                dangling: !(self.store.contains(d.from_task_id)
                    && self.store.contains(d.to_task_id)),
            })
            .collect()
    }

    fn selection_detail(&self) -> Option<SelectionDetail> {
        let task = self.store.get(self.selected?)?;
        let links = self
            .store
            .dependencies_of_task(task.id)
            .into_iter()
            .map(|d| {
                let (direction, other) = if d.from_task_id == task.id {
                    (LinkDirection::Outgoing, d.to_task_id)
                } else {
                    (LinkDirection::Incoming, d.from_task_id)
                };
                LinkRow {
                    dependency_id: d.id,
                    link_type: d.link_type,
                    badge_color: self.palette.link_color(d.link_type).to_string(),
                    direction,
                    other_label: self.store.task_name(other).into_owned(),
                }
            })
            .collect();

        Some(SelectionDetail {
            task_id: task.id,
            name: task.name.clone(),
            department: self.store.department_name(task.department_id).to_string(),
            links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, DepartmentId};
    use rstest::rstest;

    fn sample() -> (Store, LayoutEngine) {
        let (store, _) = Store::load(Dataset::sample());
        let layout = LayoutEngine::from_tasks(store.tasks());
        (store, layout)
    }

    #[rstest]
    #[case("Task 1", "Task 1")]
    #[case("Nine char", "Nine char")]
    #[case("Ten chars!", "Ten char…")]
    #[case("ÄÖÜäöüßéèà", "ÄÖÜäöüßé…")]
    fn test_truncate_label(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(truncate_label(input), expected);
    }

    #[rstest]
    #[case("Dept 1", "Dept 1")]
    #[case("Finance", "Finance")]
    #[case("Engineering", "Engine…")]
    fn test_truncate_subtitle(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(truncate_subtitle(input), expected);
    }

    #[test]
    fn test_curve_control_point() {
        let curve = QuadCurve::between(Point::new(100.0, 80.0), Point::new(240.0, 80.0));
        assert_eq!(curve.control, Point::new(170.0, 108.0));
        assert_eq!(curve.path_data(), "M 100 80 Q 170 108 240 80");

        let back = QuadCurve::between(Point::new(240.0, 80.0), Point::new(100.0, 80.0));
        assert_eq!(back.control, Point::new(170.0, 52.0));
    }

    #[test]
    fn test_no_selection_is_neutral() {
        let (store, layout) = sample();
        let scene = Scene::derive(&store, &layout, &InteractionController::new(), &Palette::default());

        assert!(scene.nodes.iter().all(|n| n.emphasis == NodeEmphasis::Normal));
        assert!(scene.edges.iter().all(|e| !e.highlighted && e.opacity == 0.45));
        assert!(scene.selection.is_none());
        assert!(!scene.is_empty);
    }

    #[test]
    fn test_selection_emphasis() {
        let (mut store, mut layout) = sample();
        let extra = store
            .add::<crate::domain::Task>(crate::domain::NewTask::named("Loner"))
            .unwrap();
        layout.reconcile(store.tasks());
        let mut controller = InteractionController::new();
        controller.select(Some(TaskId(1)));

        let scene = Scene::derive(&store, &layout, &controller, &Palette::default());

        let selected = scene.node(TaskId(1)).unwrap();
        assert_eq!(selected.emphasis, NodeEmphasis::Selected);
        assert_eq!(selected.fill, "#4a90d9");
        assert_eq!(selected.ring.as_ref().unwrap().radius, GLOW_RING_RADIUS);

        let connected = scene.node(TaskId(2)).unwrap();
        assert_eq!(connected.emphasis, NodeEmphasis::Connected);
        assert_eq!(connected.ring.as_ref().unwrap().dash, Some("3 3"));

        let loner = scene.node(extra).unwrap();
        assert_eq!(loner.emphasis, NodeEmphasis::Dimmed);
        assert_eq!(loner.opacity, 0.4);

        let edge = scene.edge(DependencyId(1)).unwrap();
        assert!(edge.highlighted);
        assert_eq!(edge.stroke_width, 2.5);
        assert_eq!(edge.marker, "arrow-blocks");
        assert_eq!(edge.label_position, Point::new(170.0, 74.0));
    }

    #[test]
    fn test_selection_detail_directions() {
        let (store, layout) = sample();
        let mut controller = InteractionController::new();
        controller.select(Some(TaskId(2)));

        let detail = Scene::derive(&store, &layout, &controller, &Palette::default())
            .selection
            .unwrap();

        assert_eq!(detail.department, "Dept 2");
        assert_eq!(detail.links.len(), 1);
        assert_eq!(detail.links[0].direction, LinkDirection::Incoming);
        assert_eq!(detail.links[0].direction.arrow(), "←");
        assert_eq!(detail.links[0].other_label, "Task 1");
    }

    #[test]
    fn test_missing_department_drops_subtitle() {
        let (mut store, layout) = sample();
        store.remove(DepartmentId(1)).unwrap();

        let scene = Scene::derive(&store, &layout, &InteractionController::new(), &Palette::default());
        let node = scene.node(TaskId(1)).unwrap();

        assert_eq!(node.subtitle, None);
        assert_eq!(node.label_offset, 0.0);
        assert_eq!(node.color, "#5a5a6a");
        assert_eq!(scene.node(TaskId(2)).unwrap().color, "#4a90d9");
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::derive(
            &Store::new(),
            &LayoutEngine::new(),
            &InteractionController::new(),
            &Palette::default(),
        );
        assert!(scene.is_empty);
        assert!(scene.nodes.is_empty());
        assert!(scene.bounds.is_none());
    }

    #[test]
    fn test_derive_is_repeatable() {
        let (store, layout) = sample();
        let mut controller = InteractionController::new();
        controller.select(Some(TaskId(1)));
        let palette = Palette::default();

        let first = Scene::derive(&store, &layout, &controller, &palette);
        let second = Scene::derive(&store, &layout, &controller, &palette);
        assert_eq!(first, second);
    }
}
