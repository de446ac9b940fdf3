//! Ontology graph rendering.
//!
//! One node per class, one edge per relation. Classes are placed on a
//! grid: relation sources sit above their targets where the topology
//! allows, cycles fall back to a bottom row. Output is a
//! self-contained SVG string.

use crate::ontology::{Class, Ontology, Relation};
use std::collections::HashMap;
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

const MARGIN: f64 = 40.0;
const H_GAP: f64 = 60.0;
const V_GAP: f64 = 80.0;

// Monospace sizing for the emitted text
const CHAR_WIDTH: f64 = 7.5;
const LINE_HEIGHT: f64 = 18.0;
const PAD_X: f64 = 10.0;
const PAD_Y: f64 = 6.0;
const HEADER_PAD: f64 = 4.0;
const MIN_NODE_WIDTH: f64 = 90.0;
const MIN_NODE_HEIGHT: f64 = 44.0;

fn text_width(text: &str) -> f64 {
    UnicodeWidthStr::width(text) as f64 * CHAR_WIDTH
}

fn header_height() -> f64 {
    LINE_HEIGHT + HEADER_PAD * 2.0
}

/// Box size for a class node: header with the class name above one
/// line per attribute.
fn node_size(label: &str, lines: &[String]) -> (f64, f64) {
    let widest_line = lines.iter().map(|line| text_width(line)).fold(0.0, f64::max);
    let width = (text_width(label).max(widest_line) + PAD_X * 2.0).max(MIN_NODE_WIDTH);

    let body = if lines.is_empty() {
        0.0
    } else {
        lines.len() as f64 * LINE_HEIGHT + PAD_Y * 2.0
    };
    let height = (header_height() + body).max(MIN_NODE_HEIGHT);

    (width, height)
}

#[derive(Debug, Clone)]
struct NodeBox {
    name: String,
    lines: Vec<String>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl NodeBox {
    fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Point on the box border along the ray from the center toward
    /// `(tx, ty)`.
    fn border_toward(&self, tx: f64, ty: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        let dx = tx - cx;
        let dy = ty - cy;
        if dx == 0.0 && dy == 0.0 {
            return (cx, cy);
        }
        let sx = (self.width / 2.0) / dx.abs();
        let sy = (self.height / 2.0) / dy.abs();
        let s = sx.min(sy);
        (cx + dx * s, cy + dy * s)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphRenderer;

impl GraphRenderer {
    pub fn render(&self, ontology: &Ontology) -> String {
        let nodes = self.place_nodes(ontology);
        let node_index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.as_str(), i))
            .collect();

        let width = nodes
            .iter()
            .map(|n| n.x + n.width)
            .fold(0.0, f64::max)
            + MARGIN;
        let height = nodes
            .iter()
            .map(|n| n.y + n.height)
            .fold(0.0, f64::max)
            + MARGIN;

        let mut svg = String::new();
        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            width, height, width, height
        )
        .unwrap();

        writeln!(
            &mut svg,
            r#"<style>
  .node-bg {{ fill: #fff; }}
  .node-header {{ fill: #e0e0e0; }}
  .node-border {{ fill: none; stroke: #333; stroke-width: 1.5; }}
  .node-name {{ font-family: monospace; font-size: 14px; font-weight: bold; }}
  .attr-text {{ font-family: monospace; font-size: 12px; }}
  .edge {{ stroke: #666; stroke-width: 1.5; fill: none; }}
  .edge-label {{ font-family: monospace; font-size: 11px; fill: #666; }}
  .cardinality {{ font-family: monospace; font-size: 11px; fill: #333; }}
</style>"#
        )
        .unwrap();

        // Edges first so that nodes cover the line ends
        for relation in &ontology.relations {
            let (Some(&from), Some(&to)) = (
                node_index.get(relation.source.as_str()),
                node_index.get(relation.target.as_str()),
            ) else {
                continue;
            };
            if from == to {
                self.render_self_edge(&mut svg, &nodes[from], relation);
            } else {
                self.render_edge(&mut svg, &nodes[from], &nodes[to], relation);
            }
        }

        for node in &nodes {
            self.render_node(&mut svg, node);
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    /// Size every class box and arrange them on a grid, one row per
    /// topology level.
    fn place_nodes(&self, ontology: &Ontology) -> Vec<NodeBox> {
        let mut nodes: Vec<NodeBox> = ontology
            .classes
            .iter()
            .map(|class| {
                let lines = attribute_lines(class);
                let (width, height) = node_size(&class.name, &lines);
                NodeBox {
                    name: class.name.clone(),
                    lines,
                    x: 0.0,
                    y: 0.0,
                    width,
                    height,
                }
            })
            .collect();

        let rows = level_rows(ontology);

        let mut y = MARGIN;
        for row in rows {
            let row_nodes: Vec<usize> = row
                .iter()
                .filter_map(|name| nodes.iter().position(|n| &n.name == name))
                .collect();

            let mut x = MARGIN;
            let mut row_height: f64 = 0.0;
            for &i in &row_nodes {
                nodes[i].x = x;
                nodes[i].y = y;
                x += nodes[i].width + H_GAP;
                row_height = row_height.max(nodes[i].height);
            }
            y += row_height + V_GAP;
        }

        nodes
    }

    fn render_node(&self, svg: &mut String, node: &NodeBox) {
        let header_h = header_height();

        writeln!(
            svg,
            r#"<rect class="node-bg" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            node.x, node.y, node.width, node.height
        )
        .unwrap();

        if node.lines.is_empty() {
            writeln!(
                svg,
                r#"<rect class="node-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
                node.x, node.y, node.width, node.height
            )
            .unwrap();
        } else {
            writeln!(
                svg,
                r#"<rect class="node-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
                node.x, node.y, node.width, header_h
            )
            .unwrap();
            writeln!(
                svg,
                r#"<rect class="node-header" x="{}" y="{}" width="{}" height="{}" />"#,
                node.x,
                node.y + header_h - 4.0,
                node.width,
                4.0
            )
            .unwrap();
        }

        writeln!(
            svg,
            r#"<text class="node-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            node.x + node.width / 2.0,
            node.y + header_h / 2.0 + 5.0,
            escape_xml(&node.name)
        )
        .unwrap();

        if !node.lines.is_empty() {
            writeln!(
                svg,
                r##"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#333" stroke-width="1" />"##,
                node.x,
                node.y + header_h,
                node.x + node.width,
                node.y + header_h
            )
            .unwrap();

            let mut line_y = node.y + header_h + PAD_Y + LINE_HEIGHT * 0.7;
            for line in &node.lines {
                writeln!(
                    svg,
                    r#"<text class="attr-text" x="{}" y="{}">{}</text>"#,
                    node.x + PAD_X,
                    line_y,
                    escape_xml(line)
                )
                .unwrap();
                line_y += LINE_HEIGHT;
            }
        }

        writeln!(
            svg,
            r#"<rect class="node-border" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            node.x, node.y, node.width, node.height
        )
        .unwrap();
    }

    fn render_edge(&self, svg: &mut String, from: &NodeBox, to: &NodeBox, relation: &Relation) {
        let (tcx, tcy) = to.center();
        let (fcx, fcy) = from.center();
        let (x1, y1) = from.border_toward(tcx, tcy);
        let (x2, y2) = to.border_toward(fcx, fcy);

        writeln!(
            svg,
            r#"<line class="edge" x1="{}" y1="{}" x2="{}" y2="{}" />"#,
            x1, y1, x2, y2
        )
        .unwrap();

        let dx = x2 - x1;
        let dy = y2 - y1;
        let len = (dx * dx + dy * dy).sqrt();
        if len > 0.0 {
            let offset = 15.0;
            let ux = dx / len;
            let uy = dy / len;

            writeln!(
                svg,
                r#"<text class="cardinality" x="{}" y="{}">{}</text>"#,
                x1 + ux * offset,
                y1 + uy * offset - 5.0,
                escape_xml(&relation.source_cardinality)
            )
            .unwrap();
            writeln!(
                svg,
                r#"<text class="cardinality" x="{}" y="{}">{}</text>"#,
                x2 - ux * offset,
                y2 - uy * offset - 5.0,
                escape_xml(&relation.target_cardinality)
            )
            .unwrap();
        }

        if !relation.name.is_empty() {
            writeln!(
                svg,
                r#"<text class="edge-label" x="{}" y="{}" text-anchor="middle">{}</text>"#,
                (x1 + x2) / 2.0,
                (y1 + y2) / 2.0 - 5.0,
                escape_xml(&relation.name)
            )
            .unwrap();
        }
    }

    /// Self-relations loop out of the top-right corner.
    fn render_self_edge(&self, svg: &mut String, node: &NodeBox, relation: &Relation) {
        let x1 = node.x + node.width;
        let y1 = node.y + node.height / 2.0;
        let x2 = node.x + node.width / 2.0;
        let y2 = node.y;

        writeln!(
            svg,
            r#"<path class="edge" d="M {} {} C {} {}, {} {}, {} {}" />"#,
            x1,
            y1,
            x1 + 50.0,
            y1,
            x2,
            y2 - 50.0,
            x2,
            y2
        )
        .unwrap();

        if !relation.name.is_empty() {
            writeln!(
                svg,
                r#"<text class="edge-label" x="{}" y="{}">{}</text>"#,
                x1 + 20.0,
                node.y - 20.0,
                escape_xml(&relation.name)
            )
            .unwrap();
        }
    }
}

fn attribute_lines(class: &Class) -> Vec<String> {
    class
        .attributes
        .iter()
        .map(|attr| {
            if attr.cardinality == "1" {
                format!("{}: {}", attr.name, attr.typ)
            } else {
                format!("{}: {} [{}]", attr.name, attr.typ, attr.cardinality)
            }
        })
        .collect()
}

/// Group class names into rows: relation sources above their targets,
/// classes caught in a cycle on a final row. Rows keep declaration
/// order.
fn level_rows(ontology: &Ontology) -> Vec<Vec<String>> {
    let class_names: Vec<&str> = ontology.classes.iter().map(|c| c.name.as_str()).collect();

    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for &name in &class_names {
        parents.insert(name, Vec::new());
    }
    for rel in &ontology.relations {
        if rel.source == rel.target {
            continue;
        }
        if !class_names.contains(&rel.source.as_str()) {
            continue;
        }
        if let Some(deps) = parents.get_mut(rel.target.as_str())
            && !deps.contains(&rel.source.as_str())
        {
            deps.push(&rel.source);
        }
    }

    let mut levels: HashMap<&str, usize> = HashMap::new();
    for (&name, deps) in &parents {
        if deps.is_empty() {
            levels.insert(name, 0);
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for (&name, deps) in &parents {
            if levels.contains_key(name) {
                continue;
            }
            let parent_levels: Vec<usize> = deps
                .iter()
                .filter_map(|p| levels.get(p).copied())
                .collect();
            if parent_levels.len() == deps.len() {
                let level = parent_levels.iter().max().copied().unwrap_or(0) + 1;
                levels.insert(name, level);
                changed = true;
            }
        }
    }

    let max_level = levels.values().copied().max().unwrap_or(0);
    for &name in &class_names {
        levels.entry(name).or_insert(max_level + 1);
    }

    let row_count = levels.values().copied().max().unwrap_or(0) + 1;
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_count];
    for &name in &class_names {
        rows[levels[name]].push(name.to_string());
    }
    rows.into_iter().filter(|r| !r.is_empty()).collect()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
