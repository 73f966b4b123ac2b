//! Top-by-type report: where do all objects of one type hang from?
//!
//! Every object of the requested type is traced back to the root that owns
//! it (shortest chain, globals before goroutines). Objects are grouped by
//! the first segment of that chain, the root. Groups are ranked by total
//! size.

use super::objref::{render_path, PathOrder};
use crate::graph::{Address, HeapGraph};
use crate::provider::GraphProvider;
use crate::tree::ReachIndex;
use crate::utils::error::TreeError;
use crate::utils::format_bytes;
use log::debug;
use std::collections::HashMap;

/// Signature of objects no root reaches
pub const UNREACHABLE: &str = "<unreachable>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGroup {
    pub count: usize,
    pub total_size: u64,
    /// Multi-line reference signature, root first
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReport {
    pub object_type: String,
    /// Sorted by total size, largest first
    pub groups: Vec<TypeGroup>,
}

/// Group objects of `object_type` by reference signature.
///
/// `top` limits the number of groups; non-positive means no limit.
pub fn top_by_type<P: GraphProvider + ?Sized>(
    provider: &P,
    heap: &HeapGraph,
    object_type: &str,
    top: i64,
) -> Result<TypeReport, TreeError> {
    let reach = ReachIndex::build(&heap.graph, &heap.roots)?;

    let mut objects: Vec<(Address, u64)> = Vec::new();
    provider.for_each_object(&mut |object| {
        if provider.type_name(object) == object_type {
            objects.push((object.address, object.size));
        }
        true
    });
    debug!("Found {} objects of type {}", objects.len(), object_type);

    let mut by_signature: HashMap<String, (usize, u64)> = HashMap::new();
    for (address, size) in objects {
        let signature = signature_of(heap, &reach, address);
        let entry = by_signature.entry(signature).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += size;
    }

    let mut groups: Vec<TypeGroup> = by_signature
        .into_iter()
        .map(|(signature, (count, total_size))| TypeGroup {
            count,
            total_size,
            signature,
        })
        .collect();
    groups.sort_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then_with(|| a.signature.cmp(&b.signature))
    });

    if top > 0 {
        groups.truncate(top as usize);
    }

    Ok(TypeReport {
        object_type: object_type.to_string(),
        groups,
    })
}

/// First segment of the owning chain: the root the object hangs from
pub fn signature_of(heap: &HeapGraph, reach: &ReachIndex, address: Address) -> String {
    let Some(chain) = reach.chain(address) else {
        return UNREACHABLE.to_string();
    };
    match chain.first() {
        Some(root) => render_path(&[heap.graph.node(root.node).name.as_str()], PathOrder::RootFirst),
        None => UNREACHABLE.to_string(),
    }
}

impl TypeReport {
    /// Right-aligned table: count, human total, then the signature with
    /// continuation lines under the first.
    pub fn render_table(&self) -> String {
        let totals: Vec<String> = self.groups.iter().map(|g| format_bytes(g.total_size)).collect();
        let count_width = self
            .groups
            .iter()
            .map(|g| g.count.to_string().len())
            .chain(std::iter::once("Count".len()))
            .max()
            .unwrap_or(0);
        let total_width = totals
            .iter()
            .map(String::len)
            .chain(std::iter::once("Total".len()))
            .max()
            .unwrap_or(0);

        let mut out = format!("Object type : [{}], reference path info\n", self.object_type);
        out.push_str(&format!(
            "{:>cw$} {:>tw$}  {}\n",
            "Count",
            "Total",
            "Info",
            cw = count_width,
            tw = total_width
        ));

        for (group, total) in self.groups.iter().zip(&totals) {
            for (i, line) in group.signature.lines().enumerate() {
                if i == 0 {
                    out.push_str(&format!(
                        "{:>cw$} {:>tw$}  {}\n",
                        group.count,
                        total,
                        line,
                        cw = count_width,
                        tw = total_width
                    ));
                } else {
                    out.push_str(&format!(
                        "{:>cw$} {:>tw$}  {}\n",
                        "",
                        "",
                        line,
                        cw = count_width,
                        tw = total_width
                    ));
                }
            }
        }
        out
    }
}
