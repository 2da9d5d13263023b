//! Transfer context handed through to backend read/write callbacks.
//!
//! The dispatch layer never looks inside a context. It only checks that the
//! context belongs to the data-transfer family before forwarding it.

use std::fmt;

/// Property-list classes, arranged as a small tree rooted at `Root`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyClass {
    Root,
    ObjectCreate,
    FileCreate,
    DatasetCreate,
    FileAccess,
    DatasetTransfer,
}

impl PropertyClass {
    pub fn parent(&self) -> Option<PropertyClass> {
        match self {
            PropertyClass::Root => None,
            PropertyClass::ObjectCreate
            | PropertyClass::FileAccess
            | PropertyClass::DatasetTransfer => Some(PropertyClass::Root),
            PropertyClass::FileCreate | PropertyClass::DatasetCreate => {
                Some(PropertyClass::ObjectCreate)
            }
        }
    }

    /// Returns true if `self` is `ancestor` or derives from it
    pub fn is_a(&self, ancestor: PropertyClass) -> bool {
        let mut current = Some(*self);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = class.parent();
        }
        false
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyClass::Root => "root",
            PropertyClass::ObjectCreate => "object create",
            PropertyClass::FileCreate => "file create",
            PropertyClass::DatasetCreate => "dataset create",
            PropertyClass::FileAccess => "file access",
            PropertyClass::DatasetTransfer => "dataset transfer",
        }
    }
}

impl fmt::Display for PropertyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Caller-supplied transfer configuration, forwarded unmodified to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferContext {
    class: PropertyClass,
    id: u64,
}

impl TransferContext {
    pub fn new(id: u64) -> Self {
        Self {
            class: PropertyClass::DatasetTransfer,
            id,
        }
    }

    /// Builds a context of an arbitrary class. Only data-transfer contexts
    /// pass the dispatch layer's capability check.
    pub fn with_class(class: PropertyClass, id: u64) -> Self {
        Self { class, id }
    }

    pub fn class(&self) -> PropertyClass {
        self.class
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn is_data_transfer(&self) -> bool {
        self.class.is_a(PropertyClass::DatasetTransfer)
    }
}

impl Default for TransferContext {
    fn default() -> Self {
        Self::new(0)
    }
}
