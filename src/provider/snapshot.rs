//! JSON heap snapshot provider.
//!
//! The snapshot is an already-reconstructed heap: objects with their sizes,
//! types and pointer fields, plus the global and goroutine roots. Pointers
//! may land inside an object; they resolve to the object that contains the
//! target address. Pointers that hit no known object are dropped.
//!
//! ```json
//! {
//!   "captured_at": "2024-05-01T12:00:00Z",
//!   "types": { "main.Node": { "size": 16, "fields": [{ "offset": 8, "name": "next" }] } },
//!   "objects": [
//!     { "address": "0xc000010000", "size": 16, "type": "main.Node",
//!       "pointers": [{ "offset": 8, "target": "0xc000010010" }] }
//!   ],
//!   "globals": [{ "name": "main.head", "address": "0x5a0000", "type": "*main.Node",
//!                 "pointers": [{ "offset": 0, "target": "0xc000010000" }] }],
//!   "goroutines": [{ "address": "0xc000001000" }]
//! }
//! ```

use super::{GlobalRoot, Goroutine, GraphProvider, HeapObject, PointerEdge};
use crate::graph::Address;
use crate::utils::config::PLACEHOLDER_PREFIX;
use crate::utils::error::SnapshotError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Top-level snapshot document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeapSnapshot {
    /// When the snapshot was taken, if the producer recorded it
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub types: HashMap<String, TypeLayout>,

    #[serde(default)]
    pub objects: Vec<ObjectRecord>,

    #[serde(default)]
    pub globals: Vec<GlobalRecord>,

    #[serde(default)]
    pub goroutines: Vec<GoroutineRecord>,
}

/// Pointer field layout of a named type
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeLayout {
    /// Size of one value of the type; 0 when unknown
    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub fields: Vec<FieldLayout>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldLayout {
    pub offset: u64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRecord {
    pub address: Address,
    pub size: u64,

    #[serde(rename = "type", default)]
    pub type_name: Option<String>,

    /// How many leading array elements are known to have the type.
    /// Defaults to all of them.
    #[serde(default)]
    pub repeat: Option<u64>,

    #[serde(default)]
    pub pointers: Vec<PointerRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointerRecord {
    pub offset: u64,
    pub target: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalRecord {
    pub name: String,
    pub address: Address,

    #[serde(rename = "type", default)]
    pub type_name: Option<String>,

    #[serde(default)]
    pub pointers: Vec<PointerRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoroutineRecord {
    pub address: Address,
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Address(n)),
            Raw::Text(s) => parse_address(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Parse `"0x1f"` (hex) or `"31"` (decimal)
pub fn parse_address(s: &str) -> Result<Address, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed
        .map(Address)
        .map_err(|e| format!("invalid address {:?}: {}", s, e))
}

/// [`GraphProvider`] over a [`HeapSnapshot`]
#[derive(Debug)]
pub struct SnapshotProvider {
    snapshot: HeapSnapshot,
    /// (start address, object index), sorted by address
    starts: Vec<(Address, usize)>,
}

impl SnapshotProvider {
    /// Load a snapshot from a JSON file
    ///
    /// # Errors
    /// * `SnapshotError::IoError` - file cannot be opened
    /// * `SnapshotError::JsonError` - malformed JSON or addresses
    /// * `SnapshotError::InvalidFormat` - inconsistent pointer records
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        debug!("Reading snapshot from: {}", path.display());

        let file = File::open(path)?;
        let snapshot: HeapSnapshot = serde_json::from_reader(BufReader::new(file))?;
        Self::new(snapshot)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: HeapSnapshot = serde_json::from_str(json)?;
        Self::new(snapshot)
    }

    pub fn new(mut snapshot: HeapSnapshot) -> Result<Self, SnapshotError> {
        for object in &snapshot.objects {
            if let Some(bad) = object.pointers.iter().find(|p| p.offset >= object.size) {
                return Err(SnapshotError::InvalidFormat(format!(
                    "object {} of size {} has a pointer at offset {}",
                    object.address, object.size, bad.offset
                )));
            }
        }
        for layout in snapshot.types.values_mut() {
            layout.fields.sort_by_key(|f| f.offset);
        }

        let mut starts: Vec<(Address, usize)> = snapshot
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.address, i))
            .collect();
        // Stable sort keeps the first record first when addresses repeat.
        starts.sort_by_key(|&(addr, _)| addr);

        info!(
            "Loaded snapshot: {} objects, {} globals, {} goroutines",
            snapshot.objects.len(),
            snapshot.globals.len(),
            snapshot.goroutines.len()
        );

        Ok(Self { snapshot, starts })
    }

    pub fn snapshot(&self) -> &HeapSnapshot {
        &self.snapshot
    }

    fn record_at(&self, address: Address) -> Option<&ObjectRecord> {
        let idx = self.starts.partition_point(|&(start, _)| start < address);
        match self.starts.get(idx) {
            Some(&(start, i)) if start == address => Some(&self.snapshot.objects[i]),
            _ => None,
        }
    }

    /// Object whose extent covers `address`, with the offset inside it
    fn containing(&self, address: Address) -> Option<(&ObjectRecord, u64)> {
        let idx = self.starts.partition_point(|&(start, _)| start <= address);
        let &(start, i) = self.starts.get(idx.checked_sub(1)?)?;
        let record = &self.snapshot.objects[i];
        let offset = address.0 - start.0;
        if offset < record.size.max(1) {
            Some((record, offset))
        } else {
            None
        }
    }

    fn resolve_pointers(&self, pointers: &[PointerRecord], visit: &mut dyn FnMut(&PointerEdge) -> bool) {
        for pointer in pointers {
            let Some((target, target_offset)) = self.containing(pointer.target) else {
                continue;
            };
            let edge = PointerEdge {
                offset: pointer.offset,
                target: HeapObject {
                    address: target.address,
                    size: target.size,
                },
                target_offset,
            };
            if !visit(&edge) {
                return;
            }
        }
    }

    /// Layout of the record's type when the object is an array of it
    fn element_layout<'a>(&'a self, record: &'a ObjectRecord) -> Option<(&'a str, &'a TypeLayout, u64)> {
        let name = record.type_name.as_deref()?;
        let layout = self.snapshot.types.get(name)?;
        if layout.size == 0 {
            return None;
        }
        Some((name, layout, record.size / layout.size))
    }
}

impl GraphProvider for SnapshotProvider {
    fn for_each_object(&self, visit: &mut dyn FnMut(&HeapObject) -> bool) {
        for record in &self.snapshot.objects {
            let object = HeapObject {
                address: record.address,
                size: record.size,
            };
            if !visit(&object) {
                return;
            }
        }
    }

    fn for_each_pointer(&self, object: &HeapObject, visit: &mut dyn FnMut(&PointerEdge) -> bool) {
        if let Some(record) = self.record_at(object.address) {
            self.resolve_pointers(&record.pointers, visit);
        }
    }

    fn for_each_global(&self, visit: &mut dyn FnMut(&GlobalRoot) -> bool) {
        for record in &self.snapshot.globals {
            let root = GlobalRoot {
                name: record.name.clone(),
                address: record.address,
                type_name: record.type_name.clone(),
            };
            if !visit(&root) {
                return;
            }
        }
    }

    fn for_each_root_pointer(&self, root: &GlobalRoot, visit: &mut dyn FnMut(&PointerEdge) -> bool) {
        let record = self
            .snapshot
            .globals
            .iter()
            .find(|g| g.address == root.address && g.name == root.name);
        if let Some(record) = record {
            self.resolve_pointers(&record.pointers, visit);
        }
    }

    fn for_each_goroutine(&self, visit: &mut dyn FnMut(&Goroutine) -> bool) {
        for record in &self.snapshot.goroutines {
            if !visit(&Goroutine {
                address: record.address,
            }) {
                return;
            }
        }
    }

    fn type_name(&self, object: &HeapObject) -> String {
        let Some(record) = self.record_at(object.address) else {
            return format!("{}{}", PLACEHOLDER_PREFIX, object.size);
        };
        let Some(name) = record.type_name.as_deref() else {
            return format!("{}{}", PLACEHOLDER_PREFIX, record.size);
        };

        match self.element_layout(record) {
            Some((_, _, count)) if count > 1 => {
                let repeat = record.repeat.unwrap_or(count).min(count);
                if repeat < count {
                    format!("[{}+{}?]{}", repeat, count - repeat, name)
                } else {
                    format!("[{}]{}", count, name)
                }
            }
            _ => name.to_string(),
        }
    }

    fn field_name(&self, object: &HeapObject, offset: u64) -> String {
        let Some(record) = self.record_at(object.address) else {
            return format!("?+{}", offset);
        };

        match self.element_layout(record) {
            Some((name, layout, count)) if count > 1 => {
                let index = offset / layout.size;
                let inner = self.type_field_name(Some(name), offset % layout.size);
                format!("[{}].{}", index, inner)
            }
            _ => self.type_field_name(record.type_name.as_deref(), offset),
        }
    }

    fn type_field_name(&self, type_name: Option<&str>, offset: u64) -> String {
        let layout = type_name.and_then(|name| self.snapshot.types.get(name));
        let field = layout.and_then(|layout| layout.fields.iter().rev().find(|f| f.offset <= offset));

        match field {
            Some(f) if f.offset == offset => f.name.clone(),
            Some(f) => format!("{}+{}", f.name, offset - f.offset),
            // A single pointer word, e.g. a `*T` global
            None if layout.is_none() && offset == 0 => String::new(),
            None => format!("?+{}", offset),
        }
    }

    fn size_at(&self, address: Address) -> u64 {
        self.record_at(address).map(|r| r.size).unwrap_or(0)
    }
}
