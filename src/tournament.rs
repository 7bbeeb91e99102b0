use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use tracing::info;

use crate::choreography::{pick_lead, random_program};
use crate::compress::{Heuristic, TRACE_CAPACITY, compress};
use crate::error::Result;
use crate::metrics::TraceStats;
use crate::robot::realized_trace;
use crate::scoring::score;

/// Configuration for a batch of leader/imitator rounds.
pub struct TournamentConfig {
    /// Number of rounds to play.
    pub rounds: usize,
    /// Moves the transport buffer keeps from each leader.
    pub trace_capacity: usize,
    /// Generate random leaders instead of drawing from the canned pool.
    pub random_leaders: bool,
    /// Maximum length of a random leader program.
    pub program_length: usize,
    /// Maximum loop nesting of a random leader program.
    pub max_depth: usize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            rounds: 64,
            trace_capacity: TRACE_CAPACITY,
            random_leaders: false,
            program_length: 16,
            max_depth: 3,
        }
    }
}

/// What happened in one round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: usize,
    /// The program the leader danced.
    pub leader: String,
    /// The leader's moves as carried by the transport buffer.
    pub trace: String,
    /// The program the imitator danced back.
    pub imitation: String,
    /// `None` when no heuristic beat the raw trace.
    pub heuristic: Option<Heuristic>,
    pub penalty: u64,
    /// Imitation size against the trace and a brotli baseline.
    pub stats: TraceStats,
}

/// Play one round: realize the leader's trace, imitate it as compactly as
/// possible and score the imitation against the leader's own program.
pub fn play_round(round: usize, leader: &str, trace_capacity: usize) -> Result<RoundReport> {
    let trace = realized_trace(leader, trace_capacity)?;
    let (imitation, heuristic) = match compress(&trace) {
        Some(candidate) => (candidate.program, Some(candidate.heuristic)),
        None => (trace.clone(), None),
    };
    let result = score(leader, &imitation)?;
    info!(
        round,
        leader,
        trace_len = trace.len(),
        imitation = %imitation,
        penalty = result.penalty_points,
        "round played"
    );
    Ok(RoundReport {
        round,
        leader: leader.to_owned(),
        stats: TraceStats::measure(&trace, &imitation),
        trace,
        imitation,
        heuristic,
        penalty: result.penalty_points,
    })
}

/// A seeded batch of rounds.
///
/// Leaders are drawn up front from the seed, so a tournament is
/// reproducible regardless of how rayon schedules the rounds.
pub struct Tournament {
    pub leaders: Vec<String>,
    pub config: TournamentConfig,
}

impl Tournament {
    pub fn new(config: TournamentConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let leaders = (0..config.rounds)
            .map(|_| {
                if config.random_leaders {
                    random_program(&mut rng, config.program_length, config.max_depth)
                } else {
                    pick_lead(&mut rng).to_owned()
                }
            })
            .collect();
        Self { leaders, config }
    }

    /// Play every round in parallel. Each round runs single-threaded.
    pub fn run(&self) -> Result<Vec<RoundReport>> {
        let capacity = self.config.trace_capacity;
        self.leaders
            .par_iter()
            .enumerate()
            .map(|(round, leader)| play_round(round, leader, capacity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreography::LEAD_PROGRAMS;

    #[test]
    fn test_deterministic_leaders() {
        let a = Tournament::new(TournamentConfig::default(), 42);
        let b = Tournament::new(TournamentConfig::default(), 42);
        assert_eq!(a.leaders, b.leaders);
        assert_eq!(a.leaders.len(), 64);
        let c = Tournament::new(TournamentConfig::default(), 99);
        assert_ne!(a.leaders, c.leaders);
    }

    #[test]
    fn test_canned_leaders_come_from_pool() {
        let tournament = Tournament::new(TournamentConfig::default(), 5);
        for leader in &tournament.leaders {
            assert!(LEAD_PROGRAMS.contains(&leader.as_str()));
        }
    }

    #[test]
    fn test_play_round_canned() {
        for (round, leader) in LEAD_PROGRAMS.iter().enumerate() {
            let report = play_round(round, leader, TRACE_CAPACITY).unwrap();
            assert_eq!(report.penalty, 0, "{leader} imitated as {}", report.imitation);
            assert!(report.heuristic.is_some());
            assert!(report.stats.loop_ratio() < 1.0);
        }
    }

    #[test]
    fn test_play_round_without_gain_sends_trace() {
        let report = play_round(0, "FlBr", TRACE_CAPACITY).unwrap();
        assert_eq!(report.imitation, "FlBr");
        assert_eq!(report.heuristic, None);
        assert_eq!(report.penalty, 0);
    }

    #[test]
    fn test_play_round_rejects_corrupt_leader() {
        assert!(play_round(0, "FFk", TRACE_CAPACITY).is_err());
    }

    #[test]
    fn test_run_keeps_round_order() {
        let config = TournamentConfig {
            rounds: 12,
            ..Default::default()
        };
        let tournament = Tournament::new(config, 11);
        let reports = tournament.run().unwrap();
        assert_eq!(reports.len(), 12);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.round, i);
            assert_eq!(report.leader, tournament.leaders[i]);
            assert_eq!(report.penalty, 0);
        }
    }

    #[test]
    fn test_random_leaders_imitated_perfectly() {
        let config = TournamentConfig {
            rounds: 32,
            random_leaders: true,
            ..Default::default()
        };
        let reports = Tournament::new(config, 2024).run().unwrap();
        for report in reports {
            let (leader, imitation) = (&report.leader, &report.imitation);
            assert_eq!(report.penalty, 0, "{leader} imitated as {imitation}");
        }
    }
}
