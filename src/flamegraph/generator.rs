//! SVG flamegraph of an object reference report.
//!
//! Every record becomes a root-first stack weighted by its leftover, so the
//! widths add up to the printed size. Layout is inverted (roots at the
//! bottom), colors follow the segment kind:
//! - roots are blue
//! - field labels are gray
//! - objects get a warm color derived from their type name

use crate::report::{sanitize_segment, RefReport, SegmentKind};
use crate::utils::config::DEFAULT_FLAMEGRAPH_WIDTH;
use crate::utils::error::FlamegraphError;
use crate::utils::format_bytes;
use log::info;
use std::collections::HashMap;
use std::fmt::Write;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Heap Retention".to_string(),
            width: DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Internal node of the merged stack tree
struct Node {
    name: String,
    kind: SegmentKind,
    value: u64,
    children: Vec<usize>,
}

/// Stacks merged by common prefix, arena-allocated
struct StackTree {
    nodes: Vec<Node>,
    lookup: HashMap<(usize, String), usize>,
    max_depth: usize,
}

impl StackTree {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: "all".to_string(),
                kind: SegmentKind::Root,
                value: 0,
                children: Vec::new(),
            }],
            lookup: HashMap::new(),
            max_depth: 0,
        }
    }

    fn insert(&mut self, stack: &[(String, SegmentKind)], value: u64) {
        let mut current = 0;
        self.nodes[current].value += value;
        for (name, kind) in stack {
            let key = (current, name.clone());
            let next = match self.lookup.get(&key) {
                Some(&id) => id,
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(Node {
                        name: name.clone(),
                        kind: *kind,
                        value: 0,
                        children: Vec::new(),
                    });
                    self.nodes[current].children.push(id);
                    self.lookup.insert(key, id);
                    id
                }
            };
            self.nodes[next].value += value;
            current = next;
        }
        self.max_depth = self.max_depth.max(stack.len());
    }
}

/// Generate SVG flamegraph from the records of a report
pub fn generate_flamegraph(report: &RefReport, config: Option<&FlamegraphConfig>) -> Result<String, FlamegraphError> {
    if report.records.is_empty() {
        return Err(FlamegraphError::EmptyReport);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} records", report.records.len());

    // 1. Build Tree
    let mut tree = StackTree::new();
    for record in &report.records {
        let stack: Vec<(String, SegmentKind)> = record
            .segments
            .iter()
            .map(|s| (sanitize_segment(&s.text), s.kind))
            .collect();
        tree.insert(&stack, record.leftover);
    }

    // 2. Render SVG
    let width = config.width;
    let height_per_level = 20;
    let graph_height = (tree.max_depth + 1) * height_per_level;
    let total_height = graph_height + 40;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, total_height, width, total_height
    );
    svg.push_str(
        r#"<style>.func { font: 12px sans-serif; } .func:hover { stroke: black; stroke-width: 1; cursor: pointer; opacity: 0.9; }</style>"#,
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&config.title)
    );

    render_nodes(&tree, width as f64, height_per_level, graph_height, &mut svg);

    svg.push_str("</svg>");
    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

/// Draw every node, children left to right by decreasing value
fn render_nodes(tree: &StackTree, width: f64, h: usize, graph_height: usize, out: &mut String) {
    let mut stack = vec![(0usize, 0usize, 0.0f64, width)];

    while let Some((id, level, x, w)) = stack.pop() {
        // Don't render invisible blocks
        if w < 0.5 {
            continue;
        }
        let node = &tree.nodes[id];

        // Inverted: graph bottom minus level height, plus title margin
        let y = graph_height - (level + 1) * h + 30;
        let _ = write!(
            out,
            r#"<rect x="{:.2}" y="{}" width="{:.2}" height="{}" fill="{}" class="func"><title>{} ({})</title></rect>"#,
            x,
            y,
            w,
            h,
            node_color(&node.name, node.kind),
            escape_xml(&node.name),
            format_bytes(node.value)
        );

        if let Some(label) = get_truncated_name(&node.name, w) {
            let _ = write!(
                out,
                r#"<text x="{:.2}" y="{}" dx="4" dy="14" font-size="12" fill="white" pointer-events="none">{}</text>"#,
                x,
                y,
                escape_xml(&label)
            );
        }

        let mut children: Vec<&usize> = node.children.iter().collect();
        children.sort_by(|a, b| {
            let (a, b) = (&tree.nodes[**a], &tree.nodes[**b]);
            b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name))
        });

        let mut current_x = x;
        for &child in children {
            let child_w = if node.value > 0 {
                (tree.nodes[child].value as f64 / node.value as f64) * w
            } else {
                0.0
            };
            stack.push((child, level + 1, current_x, child_w));
            current_x += child_w;
        }
    }
}

/// Fit a label into a block `width` pixels wide, or `None` if nothing fits
pub fn get_truncated_name(name: &str, width: f64) -> Option<String> {
    if width <= 35.0 || name.is_empty() {
        return None;
    }
    let char_width = 7.0;
    let max_chars = (width / char_width) as usize;
    let chars = name.chars().count();
    if chars <= max_chars {
        Some(name.to_string())
    } else if max_chars > 3 {
        let head: String = name.chars().take(max_chars - 3).collect();
        Some(format!("{}...", head))
    } else {
        None
    }
}

fn node_color(name: &str, kind: SegmentKind) -> String {
    match kind {
        SegmentKind::Root => "rgb(100, 149, 237)".to_string(), // Cornflower Blue
        SegmentKind::Field => "rgb(169, 169, 169)".to_string(), // Gray
        SegmentKind::Object => {
            // Stable warm color per type name
            let hash = name
                .bytes()
                .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
            let g = 80 + (hash % 120);
            let b = (hash >> 8) % 55;
            format!("rgb(220, {}, {})", g, b)
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
