use tracing::trace;

use crate::error::Result;
use crate::robot::Robot;

/// Hard cap on lockstep ticks per scoring run, one below the trace capacity.
pub const TICK_LIMIT: usize = 254;

/// Outcome of a leader/imitator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationResult {
    /// Sum of per-tick Chebyshev distances between the two robots.
    pub penalty_points: u64,
    pub steps_taken: usize,
    pub leader_finished: bool,
    pub imitator_finished: bool,
}

impl SimulationResult {
    /// Zero penalty: the imitator matched the leader on every tick.
    pub fn is_perfect(&self) -> bool {
        self.penalty_points == 0
    }
}

/// Chebyshev distance between two grid points.
pub fn chebyshev(a: (i32, i32), b: (i32, i32)) -> u64 {
    let dx = u64::from(a.0.abs_diff(b.0));
    let dy = u64::from(a.1.abs_diff(b.1));
    dx.max(dy)
}

/// A leader and an imitator advanced one tick at a time.
///
/// A robot that finishes early stays where it stopped while the other keeps
/// moving, and those ticks still count towards the penalty.
pub struct Lockstep {
    leader: Robot,
    imitator: Robot,
    result: SimulationResult,
    done: bool,
}

impl Lockstep {
    pub fn new(leader: &str, imitator: &str) -> Self {
        Self {
            leader: Robot::new(leader),
            imitator: Robot::new(imitator),
            result: SimulationResult::default(),
            done: false,
        }
    }

    /// Advance both robots once. Returns true when the run is over, either
    /// because both programs finished or because `TICK_LIMIT` was reached.
    pub fn step(&mut self) -> Result<bool> {
        if self.done || self.result.steps_taken >= TICK_LIMIT {
            self.done = true;
            return Ok(true);
        }
        self.result.steps_taken += 1;
        self.result.leader_finished = self.leader.tick()?;
        self.result.imitator_finished = self.imitator.tick()?;

        if self.result.leader_finished && self.result.imitator_finished {
            self.done = true;
        } else {
            self.result.penalty_points +=
                chebyshev(self.leader.position(), self.imitator.position());
        }
        trace!(
            tick = self.result.steps_taken,
            penalty = self.result.penalty_points,
            "lockstep tick"
        );
        Ok(self.done)
    }

    pub fn result(&self) -> SimulationResult {
        self.result
    }

    /// Step until the run is over and return the final result.
    pub fn run(mut self) -> Result<SimulationResult> {
        while !self.step()? {}
        Ok(self.result)
    }
}

/// Score how closely `imitator` follows `leader`.
pub fn score(leader: &str, imitator: &str) -> Result<SimulationResult> {
    Lockstep::new(leader, imitator).run()
}


#[cfg(test)]
mod proptests {
    use super::{TICK_LIMIT, score};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn self_score_is_zero(program in "([FBlr-]|[0-9][FBlr-]{1,3}\\.){0,40}") {
            let result = score(&program, &program).unwrap();
            prop_assert!(result.is_perfect());
        }

        #[test]
        fn run_never_exceeds_tick_limit(
            leader in "([FBlr-]|[0-9][FBlr-]{1,3}\\.){0,80}",
            imitator in "([FBlr-]|[0-9][FBlr-]{1,3}\\.){0,80}",
        ) {
            let result = score(&leader, &imitator).unwrap();
            prop_assert!(result.steps_taken <= TICK_LIMIT);
        }
    }
}
