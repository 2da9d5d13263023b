use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte address in a file, relative or absolute depending on context.
pub type Address = u64;

/// Reserved address meaning "undefined". Distinct from zero.
pub const ADDR_UNDEF: Address = u64::MAX;

#[inline]
pub fn addr_defined(addr: Address) -> bool {
    addr != ADDR_UNDEF
}

/// Tag partitioning the logical address space into independently tracked regions.
///
/// Backends may keep a separate end-of-allocation per kind; the dispatch
/// layer only forwards the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryKind {
    Default,
    /// Superblock and other global file metadata
    Super,
    BTree,
    /// Raw dataset storage
    RawData,
    GlobalHeap,
    LocalHeap,
    ObjectHeader,
}

impl MemoryKind {
    pub const ALL: [MemoryKind; 7] = [
        MemoryKind::Default,
        MemoryKind::Super,
        MemoryKind::BTree,
        MemoryKind::RawData,
        MemoryKind::GlobalHeap,
        MemoryKind::LocalHeap,
        MemoryKind::ObjectHeader,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MemoryKind::Default => "default",
            MemoryKind::Super => "superblock",
            MemoryKind::BTree => "b-tree",
            MemoryKind::RawData => "raw data",
            MemoryKind::GlobalHeap => "global heap",
            MemoryKind::LocalHeap => "local heap",
            MemoryKind::ObjectHeader => "object header",
        }
    }

    /// Position of this kind in [`MemoryKind::ALL`]
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether I/O on a handle takes part in a coordinated (collective) operation.
///
/// Under `Collective`, zero-sized reads and writes are still forwarded to the
/// backend so every participant issues the same sequence of calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoCoordination {
    #[default]
    Independent,
    Collective,
}

impl IoCoordination {
    #[inline]
    pub fn is_collective(&self) -> bool {
        matches!(self, IoCoordination::Collective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_is_not_zero() {
        assert!(addr_defined(0));
        assert!(!addr_defined(ADDR_UNDEF));
    }

    #[test]
    fn test_kind_index_matches_all() {
        for (i, kind) in MemoryKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_coordination_serde() {
        let c: IoCoordination = serde_json::from_str("\"collective\"").unwrap();
        assert!(c.is_collective());
        assert_eq!(
            serde_json::to_string(&IoCoordination::Independent).unwrap(),
            "\"independent\""
        );
    }
}
