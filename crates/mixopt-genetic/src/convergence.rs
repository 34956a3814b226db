//! Convergence policy: stop after `patience` generations without meaningful improvement

pub struct ConvergencePolicy {
    tolerance: f64,
    patience: usize,
    best: f64,
    stale_generations: usize,
}

impl ConvergencePolicy {
    pub fn new(tolerance: f64, patience: usize) -> Self {
        Self {
            tolerance,
            patience,
            best: f64::NEG_INFINITY,
            stale_generations: 0,
        }
    }

    /// Record the best fitness of a generation; returns true once the search
    /// has stalled for `patience` generations
    pub fn observe(&mut self, best_fitness: f64) -> bool {
        if best_fitness > self.best + self.tolerance {
            self.best = best_fitness;
            self.stale_generations = 0;
        } else {
            self.stale_generations += 1;
        }
        self.stale_generations >= self.patience
    }

    pub fn stale_generations(&self) -> usize {
        self.stale_generations
    }
}
