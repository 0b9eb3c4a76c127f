//! SVG export of a derived [`Scene`].

use super::{link_dash, Palette, Scene, NODE_RADIUS, SUBTITLE_OFFSET};
use crate::domain::LinkType;

/// Space kept around the outermost nodes.
const MARGIN: f64 = 60.0;

/// Smallest canvas dimension.
const MIN_SIZE: f64 = 200.0;

/// Render `scene` as a standalone SVG document titled `title`.
pub fn render_svg(scene: &Scene, palette: &Palette, title: &str) -> String {
    let Canvas {
        x,
        y,
        width,
        height,
    } = Canvas::fit(scene);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{x} {y} {width} {height}\">",
    ));
    svg.push_str(&format!("<title>{}</title>", escape_xml(title)));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<pattern id=\"dots\" x=\"0\" y=\"0\" width=\"28\" height=\"28\" patternUnits=\"userSpaceOnUse\"><circle cx=\"1\" cy=\"1\" r=\"0.8\" fill=\"{}\"/></pattern>",
        escape_xml(&palette.grid_dot)
    ));
    for link in LinkType::ALL {
        svg.push_str(&format!(
            "<marker id=\"arrow-{link}\" markerWidth=\"8\" markerHeight=\"8\" refX=\"6\" refY=\"3\" orient=\"auto\"><path d=\"M0,0 L0,6 L8,3 z\" fill=\"{}\" opacity=\"0.8\"/></marker>",
            escape_xml(palette.link_color(link))
        ));
    }
    svg.push_str("</defs>");

    let backdrop = format!("x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\"");
    svg.push_str(&format!(
        "<rect {backdrop} fill=\"{}\"/>",
        escape_xml(&palette.background)
    ));
    svg.push_str(&format!("<rect {backdrop} fill=\"url(#dots)\"/>"));

    for edge in &scene.edges {
        let dash = link_dash(edge.link_type)
            .map(|d| format!(" stroke-dasharray=\"{d}\""))
            .unwrap_or_default();
        svg.push_str(&format!(
            "<g><path d=\"{}\" stroke=\"{}\" stroke-width=\"{}\" fill=\"none\" opacity=\"{}\"{dash} marker-end=\"url(#{})\"/>",
            edge.path,
            escape_xml(&edge.color),
            edge.stroke_width,
            edge.opacity,
            edge.marker
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" fill=\"{}\" font-size=\"9\" font-weight=\"700\" opacity=\"{}\">{}</text></g>",
            edge.label_position.x,
            edge.label_position.y,
            escape_xml(&edge.color),
            edge.label_opacity,
            edge.link_type
        ));
    }

    for node in &scene.nodes {
        svg.push_str(&format!(
            "<g transform=\"translate({},{})\" data-task=\"{}\" style=\"cursor: {}\">",
            node.x, node.y, node.task_id, node.cursor
        ));
        if let Some(ring) = &node.ring {
            let dash = ring
                .dash
                .map(|d| format!(" stroke-dasharray=\"{d}\""))
                .unwrap_or_default();
            svg.push_str(&format!(
                "<circle r=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" opacity=\"{}\"{dash}/>",
                ring.radius,
                escape_xml(&ring.color),
                ring.stroke_width,
                ring.opacity
            ));
        }
        svg.push_str(&format!(
            "<circle r=\"{NODE_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" opacity=\"{}\"/>",
            escape_xml(&node.fill),
            escape_xml(&node.color),
            node.stroke_width,
            node.opacity
        ));
        svg.push_str(&format!(
            "<text text-anchor=\"middle\" dominant-baseline=\"middle\" y=\"{}\" fill=\"{}\" font-size=\"10\" font-weight=\"700\">{}</text>",
            node.label_offset,
            escape_xml(&node.text_color),
            escape_xml(&node.label)
        ));
        if let Some(subtitle) = &node.subtitle {
            svg.push_str(&format!(
                "<text text-anchor=\"middle\" dominant-baseline=\"middle\" y=\"{SUBTITLE_OFFSET}\" fill=\"{}\" font-size=\"7\">{}</text>",
                escape_xml(&node.subtitle_color),
                escape_xml(subtitle)
            ));
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

/// Visible region in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Canvas {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Canvas {
    /// Region covering every node plus [`MARGIN`].
    ///
    /// The origin stays at `0,0` unless a node lies above or left of it.
    fn fit(scene: &Scene) -> Self {
        let Some((min, max)) = scene.bounds else {
            return Self {
                x: 0.0,
                y: 0.0,
                width: MIN_SIZE,
                height: MIN_SIZE,
            };
        };
        let x = (min.x - MARGIN).min(0.0);
        let y = (min.y - MARGIN).min(0.0);
        Self {
            x,
            y,
            width: (max.x + MARGIN - x).max(MIN_SIZE),
            height: (max.y + MARGIN - y).max(MIN_SIZE),
        }
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, NewTask, Task, TaskId};
    use crate::interaction::InteractionController;
    use crate::layout::LayoutEngine;
    use crate::store::Store;

    fn scene_for(store: &Store) -> Scene {
        let layout = LayoutEngine::from_tasks(store.tasks());
        Scene::derive(store, &layout, &InteractionController::new(), &Palette::default())
    }

    #[test]
    fn test_render_sample() {
        let (store, _) = Store::load(Dataset::sample());
        let svg = render_svg(&scene_for(&store), &Palette::default(), "Acme");

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<title>Acme</title>"));
        assert!(svg.contains("id=\"arrow-related\""));
        assert!(svg.contains("M 100 80 Q 170 108 240 80"));
        assert!(svg.contains(">Task 1</text>"));
        assert!(svg.contains(">Dept 2</text>"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let mut store = Store::new();
        store.add::<Task>(NewTask::named("<a&b>")).unwrap();
        let svg = render_svg(&scene_for(&store), &Palette::default(), "R&D");

        assert!(svg.contains("&lt;a&amp;b&gt;"));
        assert!(svg.contains("<title>R&amp;D</title>"));
    }

    #[test]
    fn test_empty_scene_has_minimum_size() {
        let svg = render_svg(&scene_for(&Store::new()), &Palette::default(), "");
        assert!(svg.contains("width=\"200\" height=\"200\" viewBox=\"0 0 200 200\""));
    }

    #[test]
    fn test_canvas_covers_negative_positions() {
        let (store, _) = Store::load(Dataset::sample());
        let mut layout = LayoutEngine::from_tasks(store.tasks());
        layout.set_position(TaskId(1), -300.0, -200.0);
        let scene = Scene::derive(&store, &layout, &InteractionController::new(), &Palette::default());

        let canvas = Canvas::fit(&scene);
        assert_eq!((canvas.x, canvas.y), (-360.0, -260.0));
        assert_eq!((canvas.width, canvas.height), (660.0, 400.0));

        let svg = render_svg(&scene, &Palette::default(), "");
        assert!(svg.contains("translate(-300,-200)"));
        assert!(svg.contains("viewBox=\"-360 -260 660 400\""));
        assert!(svg.contains("<rect x=\"-360\" y=\"-260\" width=\"660\" height=\"400\""));
    }

    #[test]
    fn test_canvas_keeps_origin_for_positive_positions() {
        let (store, _) = Store::load(Dataset::sample());
        let canvas = Canvas::fit(&scene_for(&store));

        assert_eq!((canvas.x, canvas.y), (0.0, 0.0));
        assert_eq!((canvas.width, canvas.height), (300.0, 200.0));
    }

    #[test]
    fn test_palette_values_are_escaped() {
        let (store, _) = Store::load(Dataset::sample());
        let palette = Palette {
            background: "red\" onload=\"x".to_string(),
            ..Palette::default()
        };

        let svg = render_svg(&scene_for(&store), &palette, "");

        assert!(svg.contains("fill=\"red&quot; onload=&quot;x\""));
        assert!(!svg.contains("onload=\"x\""));
    }
}
