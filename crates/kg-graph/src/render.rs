//! Graph rendering
//!
//! SVG draws the graph itself (spring layout, light-blue nodes, arrowed
//! edges, colored relation labels). DOT hands layout to Graphviz `neato`,
//! which uses the same spring model. JSON is a plain node/edge listing.

use std::collections::HashMap;
use std::fmt::Write as _;

use kg_core::{KgError, OutputFormat, RenderConfig, Result};
use petgraph::dot::{Config as DotConfig, Dot};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::layout::{Layout, Point, SpringLayout};
use crate::KnowledgeGraph;

const NODE_RADIUS: f64 = 30.0;
const TITLE: &str = "Knowledge Graph";

/// Render a graph in the configured format
pub fn render(graph: &KnowledgeGraph, config: &RenderConfig) -> Result<String> {
    let output = match config.format {
        OutputFormat::Svg => {
            let layout = SpringLayout::new(config.width as f64, config.height as f64)
                .with_iterations(config.iterations)
                .with_seed(config.seed)
                .compute(graph);
            render_svg(graph, &layout, config)
        }
        OutputFormat::Dot => render_dot(graph, config),
        OutputFormat::Json => render_json(graph)?,
    };

    tracing::debug!(format = %config.format, bytes = output.len(), "Graph rendered");
    Ok(output)
}

// ============================================================================
// SVG
// ============================================================================

/// Draw the graph as an SVG image using precomputed positions
pub fn render_svg(graph: &KnowledgeGraph, layout: &Layout, config: &RenderConfig) -> String {
    let inner = graph.inner();
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = layout.width(),
        h = layout.height()
    );
    let _ = writeln!(
        svg,
        r#"  <defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="black"/></marker></defs>"#
    );
    let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"  <text x="{}" y="30" text-anchor="middle" font-size="20">{TITLE}</text>"#,
        layout.width() / 2.0
    );

    // Parallel edges between the same pair fan out on separate curves
    let mut seen: HashMap<(usize, usize), usize> = HashMap::new();

    for edge in inner.edge_references() {
        let (s, t) = (edge.source().index(), edge.target().index());
        let (Some(a), Some(b)) = (layout.position(s), layout.position(t)) else {
            continue;
        };
        let slot = seen.entry((s, t)).or_insert(0);
        let nth = *slot;
        *slot += 1;

        let label = escape_xml(edge.weight());
        if s == t {
            write_self_loop(&mut svg, a, nth, &label, config);
        } else {
            write_edge(&mut svg, a, b, nth, &label, config);
        }
    }

    for index in inner.node_indices() {
        let Some(p) = layout.position(index.index()) else {
            continue;
        };
        let _ = writeln!(
            svg,
            r#"  <circle cx="{:.1}" cy="{:.1}" r="{NODE_RADIUS}" fill="{}" stroke="steelblue"/>"#,
            p.x,
            p.y,
            escape_xml(&config.node_color)
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" dominant-baseline="middle" font-size="12">{}</text>"#,
            p.x,
            p.y,
            escape_xml(&inner[index])
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn write_edge(
    svg: &mut String,
    a: Point,
    b: Point,
    nth: usize,
    label: &str,
    config: &RenderConfig,
) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length = (dx * dx + dy * dy).sqrt().max(1.0);
    let (ux, uy) = (dx / length, dy / length);

    // Start and end on the node circles
    let start = Point {
        x: a.x + ux * NODE_RADIUS,
        y: a.y + uy * NODE_RADIUS,
    };
    let end = Point {
        x: b.x - ux * NODE_RADIUS,
        y: b.y - uy * NODE_RADIUS,
    };

    // Alternate sides: 0, +1, -1, +2, -2, ...
    let bend = if nth == 0 {
        0.0
    } else {
        let magnitude = nth.div_ceil(2) as f64 * 25.0;
        if nth % 2 == 1 {
            magnitude
        } else {
            -magnitude
        }
    };
    let control = Point {
        x: (start.x + end.x) / 2.0 - uy * bend,
        y: (start.y + end.y) / 2.0 + ux * bend,
    };
    // Midpoint of the quadratic curve
    let mid = Point {
        x: 0.25 * start.x + 0.5 * control.x + 0.25 * end.x,
        y: 0.25 * start.y + 0.5 * control.y + 0.25 * end.y,
    };

    let _ = writeln!(
        svg,
        r#"  <path d="M {:.1} {:.1} Q {:.1} {:.1} {:.1} {:.1}" fill="none" stroke="black" marker-end="url(#arrow)"/>"#,
        start.x, start.y, control.x, control.y, end.x, end.y
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11" fill="{}">{label}</text>"#,
        mid.x,
        mid.y,
        escape_xml(&config.edge_label_color)
    );
}

fn write_self_loop(svg: &mut String, p: Point, nth: usize, label: &str, config: &RenderConfig) {
    let rise = NODE_RADIUS * (1.5 + nth as f64 * 0.6);
    let top = p.y - NODE_RADIUS;
    let _ = writeln!(
        svg,
        r#"  <path d="M {:.1} {:.1} C {:.1} {:.1} {:.1} {:.1} {:.1} {:.1}" fill="none" stroke="black" marker-end="url(#arrow)"/>"#,
        p.x - 10.0,
        top,
        p.x - rise,
        top - rise,
        p.x + rise,
        top - rise,
        p.x + 10.0,
        top
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11" fill="{}">{label}</text>"#,
        p.x,
        top - rise * 0.75,
        escape_xml(&config.edge_label_color)
    );
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// DOT
// ============================================================================

/// Graphviz source laid out with the spring model (`neato`)
pub fn render_dot(graph: &KnowledgeGraph, config: &RenderConfig) -> String {
    let body = Dot::with_attr_getters(
        graph.inner(),
        &[
            DotConfig::GraphContentOnly,
            DotConfig::NodeNoLabel,
            DotConfig::EdgeNoLabel,
        ],
        &dot_edge_attributes,
        &dot_node_attributes,
    );

    format!(
        "digraph knowledge_graph {{\n    \
         graph [layout=neato, overlap=false, label=\"{TITLE}\", labelloc=t];\n    \
         node [shape=ellipse, style=filled, fillcolor=\"{}\"];\n    \
         edge [fontcolor=\"{}\"];\n\
         {body}}}\n",
        escape_dot(&config.node_color),
        escape_dot(&config.edge_label_color),
    )
}

fn dot_node_attributes(_: &DiGraph<String, String>, (_, label): (NodeIndex, &String)) -> String {
    format!("label = \"{}\" ", escape_dot(label))
}

fn dot_edge_attributes(_: &DiGraph<String, String>, edge: EdgeReference<'_, String>) -> String {
    format!("label = \"{}\" ", escape_dot(edge.weight()))
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct GraphExport<'a> {
    nodes: Vec<&'a str>,
    edges: Vec<EdgeExport<'a>>,
}

#[derive(Serialize)]
struct EdgeExport<'a> {
    source: &'a str,
    target: &'a str,
    relation: &'a str,
}

/// Node and edge listing as pretty-printed JSON
pub fn render_json(graph: &KnowledgeGraph) -> Result<String> {
    let export = GraphExport {
        nodes: graph.nodes(),
        edges: graph
            .edges()
            .into_iter()
            .map(|(source, target, relation)| EdgeExport {
                source,
                target,
                relation,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&export)
        .map_err(|e| KgError::RenderError(format!("Failed to serialize graph: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kg_core::Triplet;

    fn sample_graph() -> KnowledgeGraph {
        KnowledgeGraph::from_triplets(&[
            Triplet::new("Alice", "wrote", "letter"),
            Triplet::new("Alice", "signed", "letter"),
            Triplet::new("Tom & Jerry", "chase", "<cheese>"),
        ])
    }

    fn config(format: OutputFormat) -> RenderConfig {
        RenderConfig {
            format,
            seed: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_svg_contains_nodes_edges_and_title() {
        let svg = render(&sample_graph(), &config(OutputFormat::Svg)).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(">Knowledge Graph</text>"));
        assert_eq!(svg.matches("<circle").count(), 4);
        assert_eq!(svg.matches("marker-end=\"url(#arrow)\"").count(), 3);
        assert!(svg.contains(">wrote</text>"));
        assert!(svg.contains(">signed</text>"));
        assert!(svg.contains("fill=\"lightblue\""));
        assert!(svg.contains("fill=\"red\""));
    }

    #[test]
    fn test_svg_escapes_labels() {
        let svg = render(&sample_graph(), &config(OutputFormat::Svg)).unwrap();
        assert!(svg.contains("Tom &amp; Jerry"));
        assert!(svg.contains("&lt;cheese&gt;"));
        assert!(!svg.contains("<cheese>"));
    }

    #[test]
    fn test_svg_self_loop() {
        let graph = KnowledgeGraph::from_triplets(&[Triplet::new("it", "loops", "it")]);
        let svg = render(&graph, &config(OutputFormat::Svg)).unwrap();
        assert!(svg.contains(" C "));
        assert!(svg.contains(">loops</text>"));
    }

    #[test]
    fn test_seeded_svg_is_stable() {
        let cfg = config(OutputFormat::Svg);
        assert_eq!(
            render(&sample_graph(), &cfg).unwrap(),
            render(&sample_graph(), &cfg).unwrap()
        );
    }

    #[test]
    fn test_dot_output() {
        let dot = render(&sample_graph(), &config(OutputFormat::Dot)).unwrap();

        assert!(dot.starts_with("digraph knowledge_graph {"));
        assert!(dot.trim_end().ends_with('}'));
        assert_eq!(dot.matches("digraph").count(), 1);
        assert!(dot.contains("layout=neato"));
        assert!(dot.contains("fillcolor=\"lightblue\""));
        assert!(dot.contains(r#"label = "Alice""#));
        assert!(dot.contains(r#"label = "Tom & Jerry""#));

        // One line per triplet, parallel edges included
        let edges: Vec<&str> = dot.lines().filter(|l| l.contains(" -> ")).collect();
        assert_eq!(edges.len(), 3);
        assert!(edges[0].contains("0 -> 1") && edges[0].contains(r#"label = "wrote""#));
        assert!(edges[1].contains("0 -> 1") && edges[1].contains(r#"label = "signed""#));
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let graph = KnowledgeGraph::from_triplets(&[Triplet::new("say \"hi\"", "is", "a\\b")]);
        let dot = render_dot(&graph, &RenderConfig::default());
        assert!(dot.contains(r#"label = "say \"hi\"""#));
        assert!(dot.contains(r#"label = "a\\b""#));
    }

    #[test]
    fn test_json_output() {
        let json = render(&sample_graph(), &config(OutputFormat::Json)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value["nodes"],
            serde_json::json!(["Alice", "letter", "Tom & Jerry", "<cheese>"])
        );
        assert_eq!(value["edges"].as_array().unwrap().len(), 3);
        assert_eq!(
            value["edges"][1],
            serde_json::json!({"source": "Alice", "target": "letter", "relation": "signed"})
        );
    }
}
