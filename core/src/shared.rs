use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::index::Index;

/// The index currently being served. Readers take a snapshot; a rebuilt index
/// is published with [`SharedIndex::swap`] and never mutated in place.
pub struct SharedIndex<D> {
    current: RwLock<Arc<Index<D>>>,
}

impl<D> SharedIndex<D> {
    pub fn new(index: Index<D>) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn current(&self) -> Arc<Index<D>> { self.current.read().clone() }

    /// Publishes `index` and returns the one it replaced. Queries already
    /// holding the old snapshot finish against it.
    pub fn swap(&self, index: Index<D>) -> Arc<Index<D>> {
        std::mem::replace(&mut *self.current.write(), Arc::new(index))
    }
}

impl<D> fmt::Debug for SharedIndex<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedIndex").field(&*self.current.read()).finish()
    }
}
