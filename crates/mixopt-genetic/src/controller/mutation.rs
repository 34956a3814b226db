//! PID-controlled mutation scale
//!
//! Population diversity is the process variable. When the population
//! collapses below the target, the controller output rises and mutation
//! widens; when it is too scattered, mutation narrows.

use pid::Pid;

const KP: f64 = 20.0;
const KI: f64 = 1.0;
const KD: f64 = 2.0;
/// Bound on each PID term and on the total output
const OUTPUT_LIMIT: f64 = 4.0;
/// Scale stays within this multiple range of the base scale
const MIN_FACTOR: f64 = 0.1;
const MAX_FACTOR: f64 = 5.0;

pub struct MutationController {
    pid: Pid<f64>,
    base_scale: f64,
    target: f64,
}

impl MutationController {
    pub fn new(base_scale: f64, target_diversity: f64) -> Self {
        let mut pid = Pid::new(target_diversity, OUTPUT_LIMIT);
        pid.p(KP, OUTPUT_LIMIT);
        pid.i(KI, OUTPUT_LIMIT);
        pid.d(KD, OUTPUT_LIMIT);

        Self {
            pid,
            base_scale,
            target: target_diversity,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Mutation scale for the next generation given the current diversity
    pub fn update(&mut self, diversity: f64) -> f64 {
        let output = self.pid.next_control_output(diversity).output;
        self.base_scale * (1.0 + output).clamp(MIN_FACTOR, MAX_FACTOR)
    }
}
