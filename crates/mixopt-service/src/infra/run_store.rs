//! Recent optimization results

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use mixopt_genetic::OptimizationResult;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Bounded store of optimization results, evicting the oldest run first
pub struct RunStore {
    runs: DashMap<Uuid, Arc<OptimizationResult>>,
    order: Mutex<VecDeque<Uuid>>,
    max_runs: usize,
}

impl RunStore {
    pub fn new(max_runs: usize) -> Self {
        Self {
            runs: DashMap::new(),
            order: Mutex::new(VecDeque::with_capacity(max_runs)),
            max_runs: max_runs.max(1),
        }
    }

    pub fn insert(&self, result: Arc<OptimizationResult>) {
        let mut order = self.order.lock();
        let run_id = result.run_id;

        if self.runs.insert(run_id, result).is_none() {
            order.push_back(run_id);
        }

        while order.len() > self.max_runs {
            if let Some(oldest) = order.pop_front() {
                self.runs.remove(&oldest);
                debug!(run_id = %oldest, "Evicted optimization run");
            }
        }
    }

    pub fn get(&self, run_id: &Uuid) -> Option<Arc<OptimizationResult>> {
        self.runs.get(run_id).map(|r| Arc::clone(r.value()))
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl Default for RunStore {
    fn default() -> Self {
        Self::new(crate::MAX_STORED_RUNS)
    }
}
