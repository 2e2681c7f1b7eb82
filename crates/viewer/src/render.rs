//! SVG snapshot of the current graph view.

use std::path::Path;

use anyhow::{Context, Result};
use graphview::{
    Connection, EdgeEmphasis, GraphView, NODE_EXTENT, Node, NodeStyle, ProofGraph, Transform,
};
use svg::Document;
use svg::node::element::{Group, Line, Rectangle, Text};

const NODE_WRAP: usize = 18;
const NODE_LINES: usize = 5;
const PANEL_WIDTH: f64 = 320.0;
const PANEL_WRAP: usize = 44;

pub fn render(graph: &ProofGraph) -> Document {
    let container = graph.viewport().container();
    let view = graph.view();

    let mut scene = Group::new()
        .set("class", "scene")
        .set("transform", transform_attr(view.transform));
    for connection in view.connections {
        if let Some(line) = connection_line(&view, connection) {
            scene = scene.add(line);
        }
    }
    for node in view.nodes {
        scene = scene.add(node_group(node, view.style(node)));
    }

    let mut document = Document::new()
        .set("width", container.width)
        .set("height", container.height)
        .set("viewBox", (0.0, 0.0, container.width, container.height))
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "#fafafa"),
        )
        .add(scene);

    if let Some(selected) = graph.selected_node() {
        document = document.add(details_panel(selected, container.width));
    }

    let status = graph.status();
    document.add(
        Text::new(format!("{} ({}%)", status.text, status.progress))
            .set("class", "status")
            .set("x", 16)
            .set("y", container.height - 16.0)
            .set("font-family", "sans-serif")
            .set("font-size", 14),
    )
}

pub fn save(graph: &ProofGraph, path: &Path) -> Result<()> {
    svg::save(path, &render(graph))
        .with_context(|| format!("writing snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), nodes = graph.model().size(), "snapshot written");
    Ok(())
}

fn transform_attr(t: Transform) -> String {
    format!("translate({} {}) scale({})", t.pan_x, t.pan_y, t.zoom)
}

fn connection_line(view: &GraphView<'_>, connection: &Connection) -> Option<Line> {
    let from = view.node(&connection.from_id)?;
    let to = view.node(&connection.to_id)?;
    let (stroke, width, class) = match view.emphasis(connection) {
        EdgeEmphasis::None => ("#999999", 2, "connection"),
        EdgeEmphasis::Upstream => ("#4488ff", 4, "connection upstream"),
        EdgeEmphasis::Downstream => ("#ff8844", 4, "connection downstream"),
    };
    let mut line = Line::new()
        .set("class", class)
        .set("x1", from.position.x)
        .set("y1", from.position.y)
        .set("x2", to.position.x)
        .set("y2", to.position.y)
        .set("stroke", stroke)
        .set("stroke-width", width);
    if view.highlight.is_some() && class == "connection" {
        line = line.set("opacity", 0.3);
    }
    Some(line)
}

fn style_classes(style: NodeStyle) -> String {
    let flags = [
        (style.root, "root"),
        (style.elementary, "elementary"),
        (style.analyzing, "analyzing"),
        (style.appearing, "appearing"),
        (style.highlighted, "highlighted"),
        (style.dimmed, "dimmed"),
    ];
    let mut classes = String::from("node");
    for (_, class) in flags.iter().filter(|(on, _)| *on) {
        classes.push(' ');
        classes.push_str(class);
    }
    classes
}

fn node_fill(style: NodeStyle) -> &'static str {
    if style.root {
        "#FF9800"
    } else if style.elementary {
        "#4CAF50"
    } else {
        "#2196F3"
    }
}

fn node_group(node: &Node, style: NodeStyle) -> Group {
    let half = NODE_EXTENT / 2.0;
    let (stroke, stroke_width) = if style.highlighted {
        ("#FFD54F", 4)
    } else {
        ("#333333", 1)
    };

    let mut group = Group::new()
        .set("class", style_classes(style))
        .set("data-id", node.id.as_str())
        .add(
            Rectangle::new()
                .set("x", node.position.x - half)
                .set("y", node.position.y - half)
                .set("width", NODE_EXTENT)
                .set("height", NODE_EXTENT)
                .set("rx", 10)
                .set("fill", node_fill(style))
                .set("stroke", stroke)
                .set("stroke-width", stroke_width),
        );
    if style.dimmed {
        group = group.set("opacity", 0.3);
    }

    let lines = wrap(&node.display_text(), NODE_WRAP, NODE_LINES);
    let top = node.position.y - (lines.len() as f64 - 1.0) * 7.0 - 8.0;
    for (i, line) in lines.into_iter().enumerate() {
        group = group.add(
            Text::new(line)
                .set("x", node.position.x)
                .set("y", top + i as f64 * 14.0)
                .set("text-anchor", "middle")
                .set("font-family", "sans-serif")
                .set("font-size", 11)
                .set("fill", "white"),
        );
    }
    group.add(
        Text::new(node.kind_label())
            .set("x", node.position.x)
            .set("y", node.position.y + half - 10.0)
            .set("text-anchor", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", 9)
            .set("fill", "white"),
    )
}

fn details_panel(node: &Node, container_width: f64) -> Group {
    let x = container_width - PANEL_WIDTH - 16.0;
    let mut rows = vec![("Statement", node.statement.as_str())];
    rows.push(("Type", node.kind_label()));
    if !node.explanation.is_empty() {
        rows.push(("Explanation", node.explanation.as_str()));
    }
    if !node.proof_text.is_empty() {
        rows.push(("Proof", node.proof_text.as_str()));
    }

    let mut texts = Vec::new();
    let mut y = 40.0;
    for (label, value) in rows {
        texts.push(
            Text::new(label)
                .set("x", x + 12.0)
                .set("y", y)
                .set("font-weight", "bold"),
        );
        y += 18.0;
        for line in wrap(value, PANEL_WRAP, usize::MAX) {
            texts.push(Text::new(line).set("x", x + 12.0).set("y", y));
            y += 16.0;
        }
        y += 8.0;
    }

    let mut panel = Group::new()
        .set("class", "details")
        .set("font-family", "sans-serif")
        .set("font-size", 12)
        .add(
            Rectangle::new()
                .set("x", x)
                .set("y", 16)
                .set("width", PANEL_WIDTH)
                .set("height", y - 16.0)
                .set("rx", 6)
                .set("fill", "white")
                .set("stroke", "#cccccc"),
        );
    for text in texts {
        panel = panel.add(text);
    }
    panel
}

/// Greedy word wrap. Overlong words are split; overflowing lines end in "...".
fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }
        if current.is_empty() {
            current = word;
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    }
    lines
}
