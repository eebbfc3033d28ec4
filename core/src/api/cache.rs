//! Bounded cache of parsed programs.

use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::parser::Program;

/// Programs are keyed by source text and the depth limit they were parsed with.
type CacheKey = (String, usize);

/// First-in first-out cache shared between an engine and its sessions.
#[derive(Debug, Default)]
pub(crate) struct ProgramCache {
    inner: Mutex<CacheInner>,
}

#[derive(Debug, Default)]
struct CacheInner {
    programs: HashMap<CacheKey, Arc<Program>>,
    order: VecDeque<CacheKey>,
}

impl ProgramCache {
    pub fn get(&self, source: &str, max_depth: usize) -> Option<Arc<Program>> {
        let key = (source.to_string(), max_depth);
        self.inner.lock().programs.get(&key).cloned()
    }

    /// Store a program, evicting the oldest entries beyond `capacity`.
    pub fn insert(&self, source: &str, max_depth: usize, program: Arc<Program>, capacity: usize) {
        if capacity == 0 {
            return;
        }
        let key = (source.to_string(), max_depth);
        let mut inner = self.inner.lock();
        if inner.programs.insert(key.clone(), program).is_none() {
            inner.order.push_back(key);
        }
        while inner.order.len() > capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.programs.remove(&oldest);
            }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.programs.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().programs.len()
    }
}
