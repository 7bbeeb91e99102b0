use rand::Rng;

use crate::instruction::{BACKWARD, FORWARD, LOOP_END, PAUSE, TURN_LEFT, TURN_RIGHT};

/// Lead programs a leader broadcasts. Most expand past the 255-move buffer,
/// so imitators only ever see a truncated trace of them.
pub const LEAD_PROGRAMS: [&str; 8] = [
    "464F-.B-..",
    "Fl9FFr9B..",
    "566F..2l..",
    "499B..ll-.",
    "999l3B....",
    "999lBrB...",
    "99B-.9-F..",
    "789rFlF...",
];

const MOVES: [u8; 5] = [FORWARD, BACKWARD, TURN_LEFT, TURN_RIGHT, PAUSE];

/// Pick one of the canned lead programs uniformly at random.
pub fn pick_lead<R: Rng>(rng: &mut R) -> &'static str {
    LEAD_PROGRAMS[rng.gen_range(0..LEAD_PROGRAMS.len())]
}

/// Generate a random well-formed program of at most `length` tokens with
/// loops nested at most `max_depth` deep.
///
/// Loop counts are drawn from 2..=9 and every loop body holds at least one
/// move, so the program always passes validation.
pub fn random_program<R: Rng>(rng: &mut R, length: usize, max_depth: usize) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(length);
    let mut open = 0usize;

    while out.len() + open < length {
        let last = out.last().copied();
        let can_close = open > 0 && last.is_some_and(|b| !b.is_ascii_digit());
        // Room for a digit, one move and the closing terminator.
        let can_open = open < max_depth && out.len() + open + 3 <= length;

        if can_close && rng.gen_bool(0.3) {
            out.push(LOOP_END);
            open -= 1;
        } else if can_open && rng.gen_bool(0.2) {
            out.push(b'0' + rng.gen_range(2..=9u8));
            open += 1;
        } else {
            out.push(MOVES[rng.gen_range(0..MOVES.len())]);
        }
    }
    out.extend(std::iter::repeat_n(LOOP_END, open));

    out.into_iter().map(char::from).collect()
}


#[cfg(test)]
mod proptests {
    use super::random_program;
    use crate::validate::is_valid;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    proptest! {
        #[test]
        fn random_programs_are_valid(
            seed in any::<u64>(),
            length in 0usize..64,
            depth in 0usize..4,
        ) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let program = random_program(&mut rng, length, depth);
            prop_assert!(is_valid(&program), "{}", program);
        }
    }
}
