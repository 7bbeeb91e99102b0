use std::fmt;

use tracing::{debug, warn};

use crate::error::{DanceError, Result};
use crate::instruction::{LOOP_END, is_move_token};
use crate::scoring::score;
use crate::validate::{check, is_valid};

/// Length of the move buffer that carries a leader's trace. A trace of
/// exactly this length may have been cut off mid-loop.
pub const TRACE_CAPACITY: usize = 255;

/// Loop prefix for a trace that is one unit repeated to the end of the
/// buffer: 9 * 9 * 4 = 324 passes, more than any scoring run can observe.
const SATURATED_PREFIX: &str = "994";

/// Which unit length wins when several tandem repeats start at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Prefer the shortest repeating unit.
    ShortestUnit,
    /// Prefer the longest repeating unit.
    LongestUnit,
}

/// How a candidate program was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    Fold(Strategy),
    AutoComplete { matching: Strategy, folding: Strategy },
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::ShortestUnit => f.write_str("shortest"),
            Strategy::LongestUnit => f.write_str("longest"),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heuristic::Fold(strategy) => write!(f, "fold/{strategy}"),
            Heuristic::AutoComplete { matching, folding } => {
                write!(f, "autocomplete/{matching}/{folding}")
            }
        }
    }
}

/// A compressed program and the heuristic that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub program: String,
    pub heuristic: Heuristic,
}

/// `count` contiguous copies of a `unit_len`-token unit starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TandemRepeat {
    pub start: usize,
    pub unit_len: usize,
    pub count: usize,
}

impl TandemRepeat {
    pub fn end(&self) -> usize {
        self.start + self.unit_len * self.count
    }
}

/// Whether every loop opened in `unit` is closed inside it and no
/// terminator closes a loop opened before it.
fn is_balanced(unit: &[u8]) -> bool {
    let mut depth = 0usize;
    for &b in unit {
        if b.is_ascii_digit() {
            depth += 1;
        } else if b == LOOP_END {
            match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            }
        }
    }
    depth == 0
}

/// Find a tandem repeat starting exactly at `start`.
///
/// The unit may not begin with a loop terminator or end with a loop digit,
/// and has to be loop-balanced, so a fold never splits a loop header from
/// its body. The run extends over every contiguous copy of the chosen unit.
pub fn tandem_repeat_at(seq: &[u8], start: usize, strategy: Strategy) -> Option<TandemRepeat> {
    let rest = seq.get(start..)?;
    if rest.first().is_none_or(|&b| b == LOOP_END) {
        return None;
    }
    let repeat_of = |unit_len: usize| {
        let unit = &rest[..unit_len];
        if unit[unit_len - 1].is_ascii_digit() || !is_balanced(unit) {
            return None;
        }
        let count = rest
            .chunks_exact(unit_len)
            .take_while(|chunk| *chunk == unit)
            .count();
        (count >= 2).then_some(TandemRepeat {
            start,
            unit_len,
            count,
        })
    };
    let max_unit = rest.len() / 2;
    match strategy {
        Strategy::ShortestUnit => (1..=max_unit).find_map(repeat_of),
        Strategy::LongestUnit => (1..=max_unit).rev().find_map(repeat_of),
    }
}

/// Encode `count` repetitions of `unit` with single-digit loops.
///
/// Counts above nine are factored by the largest divisor in 9..=2, nesting
/// loops; a count with no such divisor peels off one loop of nine and
/// continues with the rest.
pub fn encode_repeat(unit: &str, count: usize) -> String {
    match count {
        0 => String::new(),
        1 => unit.to_owned(),
        2..=9 => format!("{count}{unit}."),
        _ => match (2..=9).rev().find(|d| count % d == 0) {
            Some(d) => encode_repeat(&format!("{d}{unit}."), count / d),
            None => format!("9{unit}.{}", encode_repeat(unit, count - 9)),
        },
    }
}

/// One left-to-right pass replacing every tandem repeat with a loop.
fn fold_pass(seq: &[u8], strategy: Strategy) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    let mut i = 0;
    while i < seq.len() {
        match tandem_repeat_at(seq, i, strategy) {
            Some(run) => {
                let unit: String = seq[i..i + run.unit_len]
                    .iter()
                    .map(|&b| char::from(b))
                    .collect();
                out.extend_from_slice(encode_repeat(&unit, run.count).as_bytes());
                i = run.end();
            }
            None => {
                out.push(seq[i]);
                i += 1;
            }
        }
    }
    out
}

/// Rewrite every `2X.` around a single move token as `XX`, which is
/// one token shorter and runs the same.
pub fn collapse_pairs(seq: &str) -> String {
    let bytes = seq.as_bytes();
    let mut out = String::with_capacity(seq.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i..] {
            [b'2', token, LOOP_END, ..] if is_move_token(token) => {
                out.push(char::from(token));
                out.push(char::from(token));
                i += 3;
            }
            _ => {
                out.push(char::from(bytes[i]));
                i += 1;
            }
        }
    }
    out
}

/// Fold tandem repeats pass after pass until nothing changes or a pass
/// would grow the sequence.
///
/// Expects an ASCII sequence. Callers still verify the result with the
/// scorer before using it.
pub fn fold(seq: &str, strategy: Strategy) -> String {
    let mut current = seq.to_owned();
    // Equal-length passes are accepted, so the number of passes is capped.
    for _ in 0..=seq.len() {
        let folded = fold_pass(current.as_bytes(), strategy);
        let next = collapse_pairs(&String::from_utf8_lossy(&folded));
        if next.len() > current.len() || next == current {
            break;
        }
        current = next;
    }
    current
}

/// Rebuild a trace that was cut off by the move buffer.
///
/// Only applies to traces of exactly [`TRACE_CAPACITY`] tokens. A unit
/// repeated from index 0 to the very end becomes a saturated loop. Otherwise
/// the leftover tail must be a prefix of the unit, i.e. the buffer ended
/// mid-repeat; the trace is then completed by one more copy of the unit and
/// folded. A tail that does not fit is reported as `MalformedAutoComplete`.
pub fn auto_complete(trace: &str, matching: Strategy, folding: Strategy) -> Result<Option<String>> {
    if trace.len() != TRACE_CAPACITY || !trace.is_ascii() {
        return Ok(None);
    }
    let Some(run) = tandem_repeat_at(trace.as_bytes(), 0, matching) else {
        return Ok(None);
    };
    let unit = &trace[..run.unit_len];
    if run.end() == trace.len() {
        return Ok(Some(format!("{SATURATED_PREFIX}{unit}...")));
    }
    let tail = &trace[run.end()..];
    if !unit.starts_with(tail) {
        return Err(DanceError::MalformedAutoComplete {
            unit: unit.to_owned(),
            tail: tail.to_owned(),
        });
    }
    debug!(missing = &unit[tail.len()..], "completing truncated trace");
    Ok(Some(fold(&encode_repeat(unit, run.count + 1), folding)))
}

/// Every candidate the heuristics produce for `leader`, unverified.
pub fn candidates(leader: &str) -> Vec<Candidate> {
    use Strategy::{LongestUnit, ShortestUnit};

    let plan = [
        Heuristic::AutoComplete {
            matching: ShortestUnit,
            folding: ShortestUnit,
        },
        Heuristic::Fold(ShortestUnit),
        Heuristic::AutoComplete {
            matching: LongestUnit,
            folding: LongestUnit,
        },
        Heuristic::Fold(LongestUnit),
        Heuristic::AutoComplete {
            matching: LongestUnit,
            folding: ShortestUnit,
        },
    ];

    plan.into_iter()
        .filter_map(|heuristic| {
            let program = match heuristic {
                Heuristic::Fold(strategy) => fold(leader, strategy),
                Heuristic::AutoComplete { matching, folding } => {
                    match auto_complete(leader, matching, folding) {
                        Ok(Some(program)) => program,
                        Ok(None) => return None,
                        Err(err) => {
                            debug!(%heuristic, %err, "no candidate");
                            return None;
                        }
                    }
                }
            };
            debug!(%heuristic, %program, "candidate");
            Some(Candidate { program, heuristic })
        })
        .collect()
}

/// Whether `program` is well-formed and replays `leader` with zero penalty.
pub fn reproduces(leader: &str, program: &str) -> bool {
    if !is_valid(program) {
        return false;
    }
    match score(leader, program) {
        Ok(result) => result.is_perfect(),
        Err(err) => {
            debug!(%program, %err, "candidate failed to run");
            false
        }
    }
}

/// Find a shorter program that replays `leader` exactly.
///
/// Returns the shortest verified candidate, or `None` when no heuristic
/// beats the leader itself; the caller then sends the leader unchanged.
pub fn compress(leader: &str) -> Option<Candidate> {
    if let Err(err) = check(leader) {
        warn!(%err, "refusing to compress malformed leader");
        return None;
    }
    let best = candidates(leader)
        .into_iter()
        .filter(|candidate| {
            let accepted =
                candidate.program.len() < leader.len() && reproduces(leader, &candidate.program);
            debug!(heuristic = %candidate.heuristic, accepted, "verified candidate");
            accepted
        })
        .min_by_key(|candidate| candidate.program.len());
    if let Some(best) = &best {
        debug!(
            heuristic = %best.heuristic,
            from = leader.len(),
            to = best.program.len(),
            "compressed"
        );
    }
    best
}


#[cfg(test)]
mod proptests {
    use super::{Strategy as Unit, TRACE_CAPACITY, candidates, compress, fold, reproduces};
    use crate::choreography::random_program;
    use crate::scoring::score;
    use crate::validate::is_valid;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn moves(max_len: usize) -> impl Strategy<Value = String> {
        let token = prop::sample::select(vec!['F', 'B', 'l', 'r', '-']);
        prop::collection::vec(token, 0..max_len).prop_map(|v| v.into_iter().collect())
    }

    /// Well-formed leaders that already contain nested loops.
    fn looped_leader() -> impl Strategy<Value = String> {
        (any::<u64>(), 1usize..48, 1usize..4).prop_map(|(seed, length, depth)| {
            random_program(&mut SmallRng::seed_from_u64(seed), length, depth)
        })
    }

    proptest! {
        #[test]
        fn compressed_programs_round_trip(trace in moves(120)) {
            if let Some(best) = compress(&trace) {
                prop_assert!(is_valid(&best.program));
                prop_assert!(best.program.len() < trace.len());
                prop_assert!(score(&trace, &best.program).unwrap().is_perfect());
            }
        }

        #[test]
        fn repeated_units_round_trip(unit in moves(6), reps in 1usize..80) {
            let trace: String = unit.repeat(reps).chars().take(TRACE_CAPACITY).collect();
            if let Some(best) = compress(&trace) {
                prop_assert!(score(&trace, &best.program).unwrap().is_perfect());
            }
        }

        #[test]
        fn single_token_runs_compress(
            token in prop::sample::select(vec!['F', 'B', 'l', 'r', '-']),
            reps in 4usize..200,
        ) {
            let trace = token.to_string().repeat(reps);
            let best = compress(&trace);
            prop_assert!(best.is_some());
        }

        #[test]
        fn looped_leaders_round_trip(leader in looped_leader()) {
            if let Some(best) = compress(&leader) {
                prop_assert!(is_valid(&best.program), "{} -> {}", leader, best.program);
                prop_assert!(best.program.len() < leader.len());
                prop_assert!(score(&leader, &best.program).unwrap().is_perfect());
            }
        }

        #[test]
        fn folding_looped_leaders_keeps_them_valid(leader in looped_leader()) {
            for strategy in [Unit::ShortestUnit, Unit::LongestUnit] {
                let folded = fold(&leader, strategy);
                prop_assert!(is_valid(&folded), "{} -> {}", leader, folded);
                prop_assert!(folded.len() <= leader.len());
                prop_assert!(score(&leader, &folded).unwrap().is_perfect());
            }
        }

        #[test]
        fn compress_is_shortest_verified(trace in moves(60)) {
            let best = compress(&trace);
            let shortest = candidates(&trace)
                .into_iter()
                .filter(|c| c.program.len() < trace.len() && reproduces(&trace, &c.program))
                .map(|c| c.program.len())
                .min();
            prop_assert_eq!(best.map(|c| c.program.len()), shortest);
        }
    }
}
