//! Object reference report: size-thresholded, path-compressed lines.
//!
//! Walks each root tree top-down. A subtree whose retained size is below
//! `min_width` percent of the total is dropped as a whole. For the rest,
//! children are visited first and a node only gets its own record when
//! the part of its retained size not already printed by its children
//! (the leftover) is still above the threshold.
//!
//! Record format, one per emitted node:
//!
//! ```text
//! main.cache
//! entries
//! [64]main.entry
//!     4096
//! ```
//!
//! i.e. the path segments joined by newlines, then a tab and the leftover
//! byte count on the last line.

use crate::tree::{Forest, TreeId, TreeNode};
use crate::utils::config::DEFAULT_MIN_WIDTH;
use std::io::{self, Write};

/// Display order of a record's path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathOrder {
    /// Root segment first, deepest segment last
    #[default]
    RootFirst,
    /// Deepest segment first, like a stack trace
    LeafFirst,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Percent of the total below which a branch or leftover is elided
    pub min_width: f64,
    /// Suffix every node segment with its hex address
    pub print_addr: bool,
    pub order: PathOrder,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_WIDTH,
            print_addr: false,
            order: PathOrder::RootFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Root,
    Field,
    Object,
}

/// One element of a reference path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
}

impl AsRef<str> for Segment {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// One emitted line group: the path to a node and its leftover bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    /// Root first, as accumulated during the walk
    pub segments: Vec<Segment>,
    pub leftover: u64,
}

impl ReportRecord {
    pub fn path(&self, order: PathOrder) -> String {
        render_path(&self.segments, order)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RefReport {
    pub records: Vec<ReportRecord>,
    /// Denominator of every threshold test
    pub total_size: u64,
    /// Bytes accounted for by the emitted records and their subtrees
    pub printed_size: u64,
}

impl RefReport {
    /// Write every record in the report file format
    pub fn write_to<W: Write>(&self, writer: &mut W, order: PathOrder) -> io::Result<()> {
        for record in &self.records {
            write!(writer, "{}\n\t{}\n", record.path(order), record.leftover)?;
        }
        Ok(())
    }

    pub fn to_text(&self, order: PathOrder) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out, order);
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Render every root tree of an aggregated forest
pub fn render_forest(forest: &Forest, total: u64, options: &RenderOptions) -> RefReport {
    let mut report = RefReport {
        total_size: total,
        ..Default::default()
    };
    for &root in forest.roots() {
        report.printed_size += render_tree(forest, root, total, options, &mut report.records);
    }
    report
}

struct Frame {
    node: TreeId,
    /// Path length including this node's own segment
    path_len: usize,
    next_child: usize,
    printed: u64,
}

/// Render one tree and return the bytes it printed
fn render_tree(
    forest: &Forest,
    root: TreeId,
    total: u64,
    options: &RenderOptions,
    records: &mut Vec<ReportRecord>,
) -> u64 {
    let root_node = forest.node(root);
    if is_elided(root_node.retained_size, total, options.min_width) {
        return 0;
    }

    let mut path = vec![Segment {
        text: node_label(root_node, options.print_addr),
        kind: SegmentKind::Root,
    }];
    let mut stack = vec![Frame {
        node: root,
        path_len: 1,
        next_child: 0,
        printed: 0,
    }];
    let mut tree_printed = 0;

    while let Some(top) = stack.last_mut() {
        let node = forest.node(top.node);

        if let Some(edge) = node.children.get(top.next_child) {
            top.next_child += 1;
            let child = forest.node(edge.child);
            if is_elided(child.retained_size, total, options.min_width) {
                continue;
            }

            path.truncate(top.path_len);
            if !edge.label.is_empty() {
                path.push(Segment {
                    text: edge.label.clone(),
                    kind: SegmentKind::Field,
                });
            }
            path.push(Segment {
                text: node_label(child, options.print_addr),
                kind: SegmentKind::Object,
            });
            stack.push(Frame {
                node: edge.child,
                path_len: path.len(),
                next_child: 0,
                printed: 0,
            });
            continue;
        }

        let leftover = node.retained_size.saturating_sub(top.printed);
        let printed = if is_elided(leftover, total, options.min_width) {
            top.printed
        } else {
            path.truncate(top.path_len);
            records.push(ReportRecord {
                segments: path.clone(),
                leftover,
            });
            node.retained_size
        };

        stack.pop();
        match stack.last_mut() {
            Some(parent) => parent.printed += printed,
            None => tree_printed = printed,
        }
    }

    tree_printed
}

/// Whether `size` is too small a share of `total` to print.
/// Zero bytes are never printed.
fn is_elided(size: u64, total: u64, min_width: f64) -> bool {
    size == 0 || (size as f64 / total as f64) < min_width / 100.0
}

fn node_label(node: &TreeNode, print_addr: bool) -> String {
    if print_addr {
        format!("{} 0x{:x}", node.name, node.address)
    } else {
        node.name.clone()
    }
}

/// Make a path segment safe for line-oriented tools: `+` and `?` become
/// `.`, non-printable characters are dropped.
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .filter_map(|c| match c {
            '+' | '?' => Some('.'),
            c if !is_printable(c) => None,
            c => Some(c),
        })
        .collect()
}

/// Visible characters plus the ASCII space. Controls, other whitespace,
/// format characters, private-use code points and noncharacters are not.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    !matches!(c as u32,
        // Format (Cf)
        0x00AD
        | 0x0600..=0x0605
        | 0x061C
        | 0x06DD
        | 0x070F
        | 0x0890..=0x0891
        | 0x08E2
        | 0x180E
        | 0x200B..=0x200F
        | 0x202A..=0x202E
        | 0x2060..=0x2064
        | 0x2066..=0x206F
        | 0xFEFF
        | 0xFFF9..=0xFFFB
        | 0x110BD
        | 0x110CD
        | 0x13430..=0x1343F
        | 0x1BCA0..=0x1BCA3
        | 0x1D173..=0x1D17A
        | 0xE0001
        | 0xE0020..=0xE007F
        // Private use (Co)
        | 0xE000..=0xF8FF
        | 0xF0000..=0xFFFFD
        | 0x100000..=0x10FFFD
        // Noncharacters
        | 0xFDD0..=0xFDEF
    ) && (c as u32 & 0xFFFE) != 0xFFFE
}

/// Join sanitized segments with newlines in the requested order.
/// `segments` are given root first.
pub fn render_path<S: AsRef<str>>(segments: &[S], order: PathOrder) -> String {
    let mut parts: Vec<String> = segments.iter().map(|s| sanitize_segment(s.as_ref())).collect();
    if order == PathOrder::LeafFirst {
        parts.reverse();
    }
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("[2+1?]main.T"), "[2.1.]main.T");
        assert_eq!(sanitize_segment("a\tb\u{7}c"), "abc");
        assert_eq!(sanitize_segment("main.T 0x10"), "main.T 0x10");
        assert_eq!(sanitize_segment("a\u{200B}b\u{E000}c\u{FEFF}"), "abc");
        assert_eq!(sanitize_segment("map[string]*main.Ünïcode\u{00A0}"), "map[string]*main.Ünïcode");
    }

    #[test]
    fn test_render_path_orders() {
        let segments = ["root", "field+8", "leaf"];
        assert_eq!(render_path(&segments, PathOrder::RootFirst), "root\nfield.8\nleaf");
        assert_eq!(render_path(&segments, PathOrder::LeafFirst), "leaf\nfield.8\nroot");
    }

    #[test]
    fn test_is_elided() {
        assert!(is_elided(0, 100, 0.0));
        assert!(!is_elided(1, 100, 0.0));
        assert!(is_elided(4, 100, 5.0));
        assert!(!is_elided(5, 100, 5.0));
        assert!(is_elided(0, 0, 0.0));
    }

    #[test]
    fn test_write_format() {
        let report = RefReport {
            records: vec![ReportRecord {
                segments: vec![
                    Segment { text: "main.x".to_string(), kind: SegmentKind::Root },
                    Segment { text: "f".to_string(), kind: SegmentKind::Field },
                    Segment { text: "main.T".to_string(), kind: SegmentKind::Object },
                ],
                leftover: 42,
            }],
            total_size: 42,
            printed_size: 42,
        };
        assert_eq!(report.to_text(PathOrder::RootFirst), "main.x\nf\nmain.T\n\t42\n");
        assert_eq!(report.to_text(PathOrder::LeafFirst), "main.T\nf\nmain.x\n\t42\n");
    }
}
