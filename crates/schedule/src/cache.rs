//! Memo of parsed schedules keyed by the exact input string.
//!
//! Memoization is an optimization only: two threads racing on the same miss
//! both parse and both insert the same value, which is harmless.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::parser::Schedule;

/// Cache capability injected into the [`ScheduleParser`](crate::ScheduleParser).
pub trait ExpressionCache: Send + Sync {
    fn get(&self, expression: &str) -> Option<Arc<Schedule>>;
    fn insert(&self, expression: String, schedule: Arc<Schedule>);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reader/writer-locked map. Readers never block each other; inserts take
/// the write lock briefly. With a capacity set, new keys are dropped once
/// the map is full.
#[derive(Default)]
pub struct RwLockCache {
    entries: RwLock<HashMap<String, Arc<Schedule>>>,
    capacity: Option<usize>,
}

impl RwLockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }
}

impl ExpressionCache for RwLockCache {
    fn get(&self, expression: &str) -> Option<Arc<Schedule>> {
        self.entries.read().get(expression).cloned()
    }

    fn insert(&self, expression: String, schedule: Arc<Schedule>) {
        let mut entries = self.entries.write();
        if let Some(cap) = self.capacity {
            if entries.len() >= cap && !entries.contains_key(&expression) {
                tracing::trace!(capacity = cap, "schedule cache full, not inserting");
                return;
            }
        }
        entries.insert(expression, schedule);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Cache that remembers nothing; every parse goes to the oracle.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl ExpressionCache for NoopCache {
    fn get(&self, _expression: &str) -> Option<Arc<Schedule>> {
        None
    }

    fn insert(&self, _expression: String, _schedule: Arc<Schedule>) {}

    fn len(&self) -> usize {
        0
    }
}
