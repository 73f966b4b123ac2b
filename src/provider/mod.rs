//! Graph providers: the source of objects, pointers and roots.
//!
//! A provider knows how to enumerate a reconstructed heap. The ingester
//! only talks to this trait, so any snapshot format can be plugged in.
//! Every enumeration takes a visitor that returns `false` to stop early.

pub mod snapshot;

pub use snapshot::{HeapSnapshot, SnapshotProvider};

use crate::graph::Address;

/// A heap object as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapObject {
    pub address: Address,
    pub size: u64,
}

/// One pointer found inside an object or a root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEdge {
    /// Offset of the pointer field inside the source
    pub offset: u64,
    /// Object the pointer lands in
    pub target: HeapObject,
    /// Offset of the pointed-at byte inside the target
    pub target_offset: u64,
}

/// A global variable root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalRoot {
    pub name: String,
    pub address: Address,
    pub type_name: Option<String>,
}

/// A goroutine root, identified by its own address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goroutine {
    pub address: Address,
}

/// Enumeration capabilities the ingester needs from a heap snapshot
pub trait GraphProvider {
    fn for_each_object(&self, visit: &mut dyn FnMut(&HeapObject) -> bool);

    fn for_each_pointer(&self, object: &HeapObject, visit: &mut dyn FnMut(&PointerEdge) -> bool);

    fn for_each_global(&self, visit: &mut dyn FnMut(&GlobalRoot) -> bool);

    fn for_each_root_pointer(&self, root: &GlobalRoot, visit: &mut dyn FnMut(&PointerEdge) -> bool);

    fn for_each_goroutine(&self, visit: &mut dyn FnMut(&Goroutine) -> bool);

    /// Display name of an object's type, or a placeholder when unknown
    fn type_name(&self, object: &HeapObject) -> String;

    /// Human field name for a pointer at `offset` inside `object`
    fn field_name(&self, object: &HeapObject, offset: u64) -> String;

    /// Human field name for a pointer at `offset` inside a value of `type_name`
    fn type_field_name(&self, type_name: Option<&str>, offset: u64) -> String;

    /// Size of the object starting at `address`, 0 if there is none
    fn size_at(&self, address: Address) -> u64;
}
